//! Link report built from the graph store
//!
//! For each page the report lists its outgoing links and the titles each
//! link was seen with.

use crate::storage::GraphStore;
use crate::WeaverError;
use std::fmt;

/// One outgoing link of a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkEntry {
    pub destination: String,
    pub occurances: u32,
    pub titles: Vec<String>,
}

/// A page and its outgoing links
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageEntry {
    pub url: String,
    pub redirected_from: Vec<String>,
    pub links: Vec<LinkEntry>,
}

/// All pages of the graph, in creation order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphReport {
    pub pages: Vec<PageEntry>,
}

impl GraphReport {
    /// Finds the entry for a page url
    pub fn page(&self, url: &str) -> Option<&PageEntry> {
        self.pages.iter().find(|p| p.url == url)
    }
}

impl fmt::Display for GraphReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for page in &self.pages {
            writeln!(f, "Page {}", page.url)?;
            for source in &page.redirected_from {
                writeln!(f, "  (redirected from {})", source)?;
            }
            writeln!(f, "Links from this page")?;
            for link in &page.links {
                writeln!(f, "{}", link.destination)?;
                for title in &link.titles {
                    writeln!(f, "    {}", title)?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Builds the report for every page in the store
pub fn build_report(storage: &dyn GraphStore) -> Result<GraphReport, WeaverError> {
    let mut pages = Vec::new();

    for page in storage.list_pages()? {
        let url = storage.get_url(page.url_id)?;

        let redirected_from = storage
            .page_redirections(page.id)?
            .into_iter()
            .map(|u| u.url)
            .collect();

        let mut links = Vec::new();
        for link in storage.links_from(url.id)? {
            let destination = storage.get_url(link.destination_url_id)?;
            links.push(LinkEntry {
                destination: destination.url,
                occurances: link.occurances,
                titles: storage.link_titles(link.id)?,
            });
        }

        pages.push(PageEntry {
            url: url.url,
            redirected_from,
            links,
        });
    }

    Ok(GraphReport { pages })
}

/// Prints the report to stdout
pub fn print_report(report: &GraphReport) {
    print!("{}", report);
}
