use crate::config::{compile_exclude_pattern, parse_root_url, CrawlConfig};
use crate::crawler::Frontier;
use crate::url::{site_prefix, strip_fragment};
use crate::ConfigError;
use regex::Regex;

/// Why a discovered link was accepted or rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkDecision {
    /// The link should be enqueued
    Accept,
    /// The frontier has already seen this URL
    AlreadySeen,
    /// The root URL is not a substring of the link
    OffSite,
    /// The link matches the exclusion pattern
    Excluded,
}

impl LinkDecision {
    pub fn is_accept(&self) -> bool {
        matches!(self, Self::Accept)
    }
}

/// Decides whether a discovered URL is eligible for the frontier
///
/// The same-site check is plain substring containment of the root URL, so
/// `http://x.test.evil/` and `http://other.test/?from=http://x.test` both pass it.
#[derive(Debug, Clone)]
pub struct LinkFilter {
    root_url: String,
    exclude: Regex,
}

impl LinkFilter {
    pub fn new(root_url: impl Into<String>, exclude: Regex) -> Self {
        Self {
            root_url: root_url.into(),
            exclude,
        }
    }

    /// Builds a filter from the crawl configuration, compiling its exclusion pattern
    ///
    /// The root is matched in its serialized form (see [`site_prefix`]), the same
    /// form every resolved link takes.
    pub fn from_config(config: &CrawlConfig) -> Result<Self, ConfigError> {
        let root = parse_root_url(&config.root_url)?;
        let exclude = compile_exclude_pattern(&config.exclude_pattern)?;
        Ok(Self::new(site_prefix(&root), exclude))
    }

    pub fn root_url(&self) -> &str {
        &self.root_url
    }

    /// Classifies a candidate URL
    ///
    /// Rules are applied in order to the fragment-stripped candidate:
    /// 1. already seen by the frontier
    /// 2. root URL not contained in the candidate
    /// 3. candidate matches the exclusion pattern
    pub fn evaluate(&self, candidate: &str, frontier: &Frontier) -> LinkDecision {
        let candidate = strip_fragment(candidate);

        if frontier.has_seen(candidate) {
            return LinkDecision::AlreadySeen;
        }

        self.evaluate_unseen(candidate)
    }

    /// Returns true if the candidate should be enqueued
    pub fn is_eligible(&self, candidate: &str, frontier: &Frontier) -> bool {
        self.evaluate(candidate, frontier).is_accept()
    }

    /// Applies the site and exclusion rules without consulting a frontier
    pub fn evaluate_unseen(&self, candidate: &str) -> LinkDecision {
        let candidate = strip_fragment(candidate);

        if !candidate.contains(self.root_url.as_str()) {
            return LinkDecision::OffSite;
        }

        if self.exclude.is_match(candidate) {
            return LinkDecision::Excluded;
        }

        LinkDecision::Accept
    }
}
