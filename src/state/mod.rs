//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `PageOutcome`: how the fetch attempt for a single URL ended

mod page_state;

// Re-export main types
pub use page_state::PageOutcome;
