//! Page parser adapter
//!
//! This module turns an HTML body into anchors and image references and
//! records what they contribute to the link graph:
//! - internal anchors become Links (with titles) and queue their destination
//! - external anchors only get a URL row and a log line
//! - images get a URL row and an image row, and are never queued

use crate::crawler::scheduler::CrawlItem;
use crate::storage::{GraphStore, UrlRecord};
use crate::url::{resolve_href, Resolution};
use crate::WeaverError;
use scraper::{Html, Selector};

/// An `<a>` element as seen in the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    /// Raw `href` attribute
    pub href: String,
    /// Raw `title` attribute, if present
    pub title: Option<String>,
    /// Inner text, whitespace-trimmed
    pub text: String,
}

/// Everything the crawler reads from one HTML document
#[derive(Debug, Clone, Default)]
pub struct ParsedDocument {
    pub anchors: Vec<Anchor>,
    /// Raw `src` attributes of `<img>` elements
    pub images: Vec<String>,
}

/// Parses an HTML body into anchors and image sources
///
/// Elements without the attribute are skipped here; elements with an empty
/// attribute are kept and skipped by [`record_document`].
///
/// # Example
///
/// ```
/// use link_weaver::crawler::parse_document;
///
/// let html = r#"<a href="/about" title="About Us">About</a><img src="logo.png">"#;
/// let document = parse_document(html);
/// assert_eq!(document.anchors[0].href, "/about");
/// assert_eq!(document.images, vec!["logo.png".to_string()]);
/// ```
pub fn parse_document(html: &str) -> ParsedDocument {
    let document = Html::parse_document(html);

    ParsedDocument {
        anchors: extract_anchors(&document),
        images: extract_images(&document),
    }
}

fn extract_anchors(document: &Html) -> Vec<Anchor> {
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|element| {
            let href = element.value().attr("href")?;
            Some(Anchor {
                href: href.to_string(),
                title: element.value().attr("title").map(str::to_string),
                text: element.text().collect::<String>().trim().to_string(),
            })
        })
        .collect()
}

fn extract_images(document: &Html) -> Vec<String> {
    let Ok(selector) = Selector::parse("img[src]") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("src").map(str::to_string))
        .collect()
}

/// Records the links and images of a parsed page in the graph store
///
/// For each anchor with a non-empty `href`:
/// 1. Resolve it against the page URL
/// 2. External → find-or-create its URL, log it, stop
/// 3. Internal → find-or-create the destination URL, increment-or-create
///    the Link, add the `title` attribute (if non-empty) and the inner text
///    as Link titles, and return the destination for queueing
///
/// Images with a non-empty `src` are resolved the same way and recorded as
/// URL + image rows only.
///
/// # Returns
///
/// The crawl items for every internal anchor, in document order. Repeated
/// destinations are returned each time; the scheduler drops duplicates.
pub fn record_document<S: GraphStore>(
    store: &mut S,
    page_url: &UrlRecord,
    document: &ParsedDocument,
) -> Result<Vec<CrawlItem>, WeaverError> {
    let mut discovered = Vec::new();

    for anchor in &document.anchors {
        if anchor.href.is_empty() {
            continue;
        }

        let resolution = match resolve_href(&anchor.href, &page_url.url) {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!("Cannot resolve {} on {}: {}", anchor.href, page_url.url, e);
                continue;
            }
        };

        match resolution {
            Resolution::Ignored => {
                tracing::trace!("Ignoring href {}", anchor.href);
            }
            Resolution::External(address) => {
                tracing::debug!("External URL {}", address);
                store.find_or_create_url(&address)?;
            }
            Resolution::Internal(address) => {
                tracing::debug!("Adding link to {}", address);
                let destination = store.find_or_create_url(&address)?;
                let link = store.increment_or_create_link(page_url.id, destination.id)?;

                if let Some(title) = anchor.title.as_deref().filter(|t| !t.is_empty()) {
                    store.add_link_title(link.id, title)?;
                }
                store.add_link_title(link.id, &anchor.text)?;

                discovered.push(CrawlItem::from_link(destination.url, link.id));
            }
        }
    }

    for src in &document.images {
        if src.is_empty() {
            continue;
        }

        match resolve_href(src, &page_url.url) {
            Ok(Resolution::Internal(address)) | Ok(Resolution::External(address)) => {
                tracing::trace!("Image {}", address);
                let image_url = store.find_or_create_url(&address)?;
                store.find_or_create_image(image_url.id)?;
            }
            Ok(Resolution::Ignored) => {}
            Err(e) => tracing::warn!("Cannot resolve image {} on {}: {}", src, page_url.url, e),
        }
    }

    Ok(discovered)
}
