/// Reduces a raw href to the canonical string used as URL identity
///
/// # Canonicalization Steps
///
/// 1. Remove the fragment (everything from the first `#`)
/// 2. Remove path parameters (everything from the first `;`)
///
/// Nothing else is touched: no percent-decoding, no case folding and no
/// trailing-slash normalization. Two hrefs are the same URL exactly when
/// their canonical strings are equal.
///
/// # Examples
///
/// ```
/// use link_weaver::url::canonicalize;
///
/// assert_eq!(canonicalize("http://a.com/p;jsessionid=1#frag"), "http://a.com/p");
/// assert_eq!(canonicalize("http://a.com/p?q=1"), "http://a.com/p?q=1");
/// ```
pub fn canonicalize(raw: &str) -> String {
    let without_fragment = strip_fragment(raw);
    strip_path_params(without_fragment).to_string()
}

fn strip_fragment(href: &str) -> &str {
    href.split('#').next().unwrap_or(href)
}

fn strip_path_params(href: &str) -> &str {
    href.split(';').next().unwrap_or(href)
}
