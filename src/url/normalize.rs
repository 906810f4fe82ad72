use url::Url;

/// Returns the URL with any `#fragment` suffix removed
///
/// This is the only canonicalization applied to discovered links: two URLs that
/// differ only after the first `#` are the same page for dedup purposes.
///
/// # Examples
///
/// ```
/// use site_ripple::url::strip_fragment;
///
/// assert_eq!(strip_fragment("http://x.test/page#a"), "http://x.test/page");
/// assert_eq!(strip_fragment("http://x.test/page"), "http://x.test/page");
/// ```
pub fn strip_fragment(url: &str) -> &str {
    match url.find('#') {
        Some(index) => &url[..index],
        None => url,
    }
}

/// Parses a seed URL into the serialized form used for links
///
/// Links found on pages are resolved through [`Url::join`], so seeds go through
/// the same serializer (`http://x.test` becomes `http://x.test/`). Otherwise a link
/// back to the root would not dedup against the seed.
///
/// # Examples
///
/// ```
/// use site_ripple::url::normalize_url;
///
/// assert_eq!(normalize_url("http://x.test").unwrap(), "http://x.test/");
/// assert_eq!(normalize_url("http://x.test/a#top").unwrap(), "http://x.test/a");
/// ```
pub fn normalize_url(url_str: &str) -> Result<String, url::ParseError> {
    let mut url = Url::parse(url_str)?;
    url.set_fragment(None);
    Ok(url.into())
}

/// Serialized form of the root URL used for the same-site substring check
///
/// Discovered links come out of the same serializer as `root`, so the host is
/// lowercase and a default port is gone in both. A bare `/` path is dropped so
/// `http://x.test` matches every page on the site rather than only `http://x.test/`.
///
/// # Examples
///
/// ```
/// use site_ripple::url::site_prefix;
/// use url::Url;
///
/// let root = Url::parse("http://X.test:80").unwrap();
/// assert_eq!(site_prefix(&root), "http://x.test");
/// ```
pub fn site_prefix(root: &Url) -> String {
    let mut root = root.clone();
    root.set_fragment(None);

    let serialized = root.as_str();
    if root.path() == "/" && root.query().is_none() {
        serialized.trim_end_matches('/').to_string()
    } else {
        serialized.to_string()
    }
}
