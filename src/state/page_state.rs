/// Page outcome definitions for tracking crawl progress
///
/// Every URL a worker dequeues ends in exactly one of these outcomes.
use std::fmt;

/// How the fetch attempt for a URL ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PageOutcome {
    // ===== Terminal Success States =====
    /// Fetched with status 200, parsed, handed to the page handler
    Processed,

    // ===== Terminal Error States =====
    /// Server answered with a status other than 200
    HttpStatus(u16),

    /// Transport-level failure (connect, timeout, body read)
    FetchFailed,

    /// Body could not be turned into a document
    ParseFailed,

    /// The page handler returned an error; links on the page were not followed
    CallbackFailed,
}

impl PageOutcome {
    /// Returns true if this represents a successful completion
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Processed)
    }

    /// Returns true if this represents an error state
    pub fn is_error(&self) -> bool {
        !self.is_success()
    }

    /// Returns true if the failure happened in caller code rather than on the wire
    pub fn is_callback_failure(&self) -> bool {
        matches!(self, Self::CallbackFailed)
    }

    /// Short machine-friendly label, used in logs and summaries
    pub fn label(&self) -> &'static str {
        match self {
            Self::Processed => "processed",
            Self::HttpStatus(404) | Self::HttpStatus(410) => "dead_link",
            Self::HttpStatus(_) => "http_error",
            Self::FetchFailed => "fetch_failed",
            Self::ParseFailed => "parse_failed",
            Self::CallbackFailed => "callback_failed",
        }
    }
}

impl fmt::Display for PageOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HttpStatus(status) => write!(f, "{} ({})", self.label(), status),
            _ => write!(f, "{}", self.label()),
        }
    }
}
