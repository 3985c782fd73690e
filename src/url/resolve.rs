use crate::url::canonical::canonicalize;
use crate::url::domain::{domain_root, extract_host, folder_root};
use crate::UrlError;

/// Schemes that can point away from the site being crawled
const WEB_SCHEMES: &[&str] = &["http", "https", "ftp", "ftps", "mailto"];

/// Outcome of resolving an href found on a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Points to another host; recorded but never followed
    External(String),

    /// Same-site address, canonicalized and ready to be linked and queued
    Internal(String),

    /// Nothing to record (empty href, or a scheme such as `javascript:`)
    Ignored,
}

/// Returns the explicit scheme of an href, lowercased, if it has one
pub fn explicit_scheme(href: &str) -> Option<String> {
    let (scheme, _) = href.split_once(':')?;
    let mut chars = scheme.chars();
    let first = chars.next()?;
    if !first.is_ascii_alphabetic()
        || !chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
    {
        return None;
    }
    Some(scheme.to_ascii_lowercase())
}

/// Checks whether an href points to a different host than the current page
///
/// An href is external when it carries an explicit `http`, `https`, `ftp`,
/// `ftps` or `mailto` scheme and, if `current_url` is non-empty, its host
/// differs from the host of `current_url`. Scheme-relative and bare-path
/// hrefs are never external.
///
/// # Examples
///
/// ```
/// use link_weaver::url::is_external;
///
/// assert!(is_external("http://b.com/y", "http://a.com/x"));
/// assert!(!is_external("http://a.com/y", "http://a.com/x"));
/// assert!(!is_external("/y", "http://a.com/x"));
/// ```
pub fn is_external(href: &str, current_url: &str) -> bool {
    let is_web_scheme = explicit_scheme(href)
        .map(|scheme| WEB_SCHEMES.contains(&scheme.as_str()))
        .unwrap_or(false);

    if !is_web_scheme {
        return false;
    }

    if current_url.is_empty() {
        return true;
    }

    extract_host(href) != extract_host(current_url)
}

/// True iff the href is a root-relative path (begins with `/`)
pub fn is_absolute_path(href: &str) -> bool {
    href.starts_with('/')
}

/// Resolves an href found on `page_url` and classifies it
///
/// # Resolution Rules
///
/// 1. Empty href → ignored
/// 2. External (see [`is_external`]) → recorded as-is, never followed
/// 3. Any other explicit scheme: same-host web address kept verbatim,
///    non-web schemes (`javascript:`, `tel:`, `data:`) ignored
/// 4. Fragment-only (`#top`) → the page itself; query-only (`?q`) → the
///    page path with the new query
/// 5. Scheme-relative (`//host/path`) → page scheme prepended; recorded as
///    external when the host differs from the page host
/// 6. Root-relative (`/path`) → domain root of the page + path
/// 7. Anything else → folder root of the page + href
///
/// The resolved address is canonicalized before it is returned.
pub fn resolve_href(href: &str, page_url: &str) -> Result<Resolution, UrlError> {
    let href = href.trim();
    if href.is_empty() {
        return Ok(Resolution::Ignored);
    }

    if is_external(href, page_url) {
        return Ok(Resolution::External(canonicalize(href)));
    }

    if let Some(scheme) = explicit_scheme(href) {
        if WEB_SCHEMES.contains(&scheme.as_str()) {
            return Ok(Resolution::Internal(canonicalize(href)));
        }
        return Ok(Resolution::Ignored);
    }

    let absolute = if href.starts_with('#') {
        page_url.to_string()
    } else if href.starts_with('?') {
        format!("{}{}", page_url.split('?').next().unwrap_or(page_url), href)
    } else if href.starts_with("//") {
        let scheme = explicit_scheme(page_url)
            .ok_or_else(|| UrlError::Parse(format!("no scheme in {}", page_url)))?;
        let absolute = format!("{}:{}", scheme, href);
        if extract_host(&absolute) != extract_host(page_url) {
            return Ok(Resolution::External(canonicalize(&absolute)));
        }
        absolute
    } else if is_absolute_path(href) {
        format!("{}{}", domain_root(page_url)?, &href[1..])
    } else {
        format!("{}{}", folder_root(page_url), href)
    };

    Ok(Resolution::Internal(canonicalize(&absolute)))
}
