//! URL handling module for Site-Ripple
//!
//! This module provides fragment stripping, seed normalization, and the link
//! filter that decides which discovered URLs enter the frontier.

mod filter;
mod normalize;

// Re-export main functions
pub use filter::{LinkDecision, LinkFilter};
pub use normalize::{normalize_url, site_prefix, strip_fragment};
