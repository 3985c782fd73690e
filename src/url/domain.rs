use crate::UrlError;
use url::Url;

/// Extracts the lowercase host of an absolute address
///
/// Returns `None` when the address does not parse or has no host
/// (for example `mailto:` addresses).
///
/// # Examples
///
/// ```
/// use link_weaver::url::extract_host;
///
/// assert_eq!(extract_host("https://EXAMPLE.COM/path"), Some("example.com".to_string()));
/// assert_eq!(extract_host("mailto:someone@example.com"), None);
/// ```
pub fn extract_host(address: &str) -> Option<String> {
    Url::parse(address)
        .ok()?
        .host_str()
        .map(|h| h.to_lowercase())
}

/// Returns `scheme://host[:port]` for an absolute address
///
/// The port is only present when it differs from the scheme's default.
pub fn origin_of(address: &str) -> Result<String, UrlError> {
    let url = Url::parse(address).map_err(|e| UrlError::Parse(format!("{}: {}", address, e)))?;
    let host = url
        .host_str()
        .ok_or_else(|| UrlError::MissingHost(address.to_string()))?;

    Ok(match url.port() {
        Some(port) => format!("{}://{}:{}", url.scheme(), host, port),
        None => format!("{}://{}", url.scheme(), host),
    })
}

/// Returns the root of the site an address belongs to: `scheme://host/`
///
/// # Examples
///
/// ```
/// use link_weaver::url::domain_root;
///
/// assert_eq!(domain_root("http://a.com/dir/page").unwrap(), "http://a.com/");
/// ```
pub fn domain_root(address: &str) -> Result<String, UrlError> {
    Ok(format!("{}/", origin_of(address)?))
}

/// Returns the address truncated after the last `/` of its path
///
/// An address without any path (`http://a.com`) has its domain root as
/// folder. The query string is ignored when looking for the last `/`.
///
/// # Examples
///
/// ```
/// use link_weaver::url::folder_root;
///
/// assert_eq!(folder_root("http://a.com/dir/page"), "http://a.com/dir/");
/// assert_eq!(folder_root("http://a.com"), "http://a.com/");
/// ```
pub fn folder_root(address: &str) -> String {
    let without_query = address.split('?').next().unwrap_or(address);
    let authority_start = without_query.find("://").map(|i| i + 3).unwrap_or(0);

    if without_query[authority_start..].find('/').is_none() {
        return format!("{}/", without_query);
    }

    match without_query.rfind('/') {
        Some(last) => without_query[..=last].to_string(),
        None => format!("{}/", without_query),
    }
}
