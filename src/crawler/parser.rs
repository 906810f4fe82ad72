//! HTML parser for extracting links and page text
//!
//! This module turns a response body into a [`Document`]:
//! - Every link-bearing attribute, resolved to an absolute URL and tagged with its element
//! - Page title
//! - Whitespace-collapsed body text for page handlers
//!
//! The crawler follows only `<a>` links; the other tags are kept so handlers can
//! see the full link set of a page.

use crate::ParseError;
use scraper::{Html, Selector};
use url::Url;

/// Element/attribute pairs scanned for links, in document-independent order
const LINK_ATTRIBUTES: &[(&str, &str)] = &[
    ("a", "href"),
    ("area", "href"),
    ("link", "href"),
    ("img", "src"),
    ("script", "src"),
    ("iframe", "src"),
    ("form", "action"),
];

/// A link found in a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    /// Absolute URL after resolution against the base URL
    pub url: String,

    /// Lowercase name of the element the link came from (`a`, `img`, ...)
    pub tag: String,
}

impl Link {
    /// Returns true if the link came from an anchor tag
    pub fn is_anchor(&self) -> bool {
        self.tag == "a"
    }
}

/// A parsed page as seen by page handlers
#[derive(Debug, Clone, Default)]
pub struct Document {
    title: Option<String>,
    text: String,
    links: Vec<Link>,
}

impl Document {
    pub fn new(title: Option<String>, text: String, links: Vec<Link>) -> Self {
        Self { title, text, links }
    }

    /// The page title (from the `<title>` tag), if any
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Plain text content of the page
    pub fn text(&self) -> &str {
        &self.text
    }

    /// All links in the page, absolute
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// Absolute URLs of `<a>` links only
    pub fn anchor_links(&self) -> impl Iterator<Item = &str> {
        self.links
            .iter()
            .filter(|link| link.is_anchor())
            .map(|link| link.url.as_str())
    }
}

/// Parsing capability: body bytes to [`Document`]
pub trait Parser: Send + Sync {
    /// Parses a body, resolving relative links against `base_url`
    fn parse(&self, body: &[u8], base_url: &Url) -> Result<Document, ParseError>;
}

/// Default parser over `scraper`
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlParser;

impl Parser for HtmlParser {
    fn parse(&self, body: &[u8], base_url: &Url) -> Result<Document, ParseError> {
        let html = String::from_utf8(body.to_vec())?;
        parse_html(&html, base_url)
    }
}

/// Parses HTML content into a [`Document`]
///
/// # Link Extraction Rules
///
/// **Include:** `href`/`src`/`action` of `a`, `area`, `link`, `img`, `script`,
/// `iframe`, `form`
///
/// **Exclude:**
/// - `javascript:`, `mailto:`, `tel:` links
/// - Data URIs
/// - Empty attributes
/// - Anything that does not resolve to an http(s) URL
///
/// Fragment-only links (`#top`) resolve to the base URL plus fragment and are kept;
/// fragment stripping happens when links are filtered.
///
/// # Example
///
/// ```
/// use site_ripple::crawler::parse_html;
/// use url::Url;
///
/// let html = r#"<html><head><title>Test</title></head><body><a href="/page">Link</a></body></html>"#;
/// let base_url = Url::parse("https://example.com/").unwrap();
/// let document = parse_html(html, &base_url).unwrap();
/// assert_eq!(document.title(), Some("Test"));
/// assert_eq!(document.links()[0].url, "https://example.com/page");
/// ```
pub fn parse_html(html: &str, base_url: &Url) -> Result<Document, ParseError> {
    let document = Html::parse_document(html);

    let title = extract_title(&document);
    let text = extract_text(&document);
    let links = extract_links(&document, base_url)?;

    Ok(Document { title, text, links })
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Collects visible text, skipping script and style contents
fn extract_text(document: &Html) -> String {
    let Ok(body_selector) = Selector::parse("body") else {
        return String::new();
    };

    let mut words = Vec::new();
    for body in document.select(&body_selector) {
        for node in body.descendants() {
            let Some(text) = node.value().as_text() else {
                continue;
            };
            let inside_code = node
                .parent()
                .and_then(|parent| parent.value().as_element())
                .map_or(false, |element| {
                    matches!(element.name(), "script" | "style" | "noscript")
                });
            if inside_code {
                continue;
            }
            words.extend(text.split_whitespace());
        }
    }

    words.join(" ")
}

/// Extracts all valid links from the HTML document
fn extract_links(document: &Html, base_url: &Url) -> Result<Vec<Link>, ParseError> {
    let mut links = Vec::new();

    for (tag, attribute) in LINK_ATTRIBUTES {
        let selector = Selector::parse(&format!("{}[{}]", tag, attribute))
            .map_err(|e| ParseError::Malformed(format!("bad selector for {}: {:?}", tag, e)))?;

        for element in document.select(&selector) {
            if let Some(value) = element.value().attr(attribute) {
                if let Some(url) = resolve_link(value, base_url) {
                    links.push(Link {
                        url,
                        tag: (*tag).to_string(),
                    });
                }
            }
        }
    }

    Ok(links)
}

/// Resolves a link attribute to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
pub fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if lower.starts_with("javascript:")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
        || lower.starts_with("data:")
    {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) => {
            if absolute_url.scheme() == "http" || absolute_url.scheme() == "https" {
                Some(absolute_url.to_string())
            } else {
                None
            }
        }
        Err(_) => None,
    }
}
