//! Terminal styling utilities
//!
//! Consistent color scheme for CLI output. Uses crossterm for cross-platform
//! terminal colors.

use crate::service::LookupStatus;
use crossterm::style::{StyledContent, Stylize};

/// Record id styling, zero-padded like a dex number
pub fn record_id(id: i64) -> StyledContent<String> {
    format!("#{:04}", id).cyan()
}

/// Lookup status colors
/// - cached: Green
/// - pending: Yellow
/// - unknown: Dim grey
pub fn lookup_status(status: &LookupStatus) -> StyledContent<String> {
    match status {
        LookupStatus::Cached(_) => "cached".to_string().green(),
        LookupStatus::Pending => "pending".to_string().yellow(),
        LookupStatus::Unknown => "unknown".to_string().dark_grey(),
    }
}

/// Count styling for population summaries
/// - Zero: Dim
/// - Positive: Green (cached) or Red (dropped)
pub fn count_cached(n: u64) -> StyledContent<String> {
    if n == 0 {
        n.to_string().dark_grey()
    } else {
        n.to_string().green()
    }
}

pub fn count_dropped(n: u64) -> StyledContent<String> {
    if n == 0 {
        n.to_string().dark_grey()
    } else {
        n.to_string().red()
    }
}

pub fn count_retries(n: u64) -> StyledContent<String> {
    if n == 0 {
        n.to_string().dark_grey()
    } else {
        n.to_string().yellow()
    }
}

/// Section headers
pub fn header(text: &str) -> StyledContent<String> {
    text.to_string().bold()
}

/// Dim/muted text
pub fn dim(text: &str) -> StyledContent<String> {
    text.to_string().dark_grey()
}

/// Success text
pub fn success(text: &str) -> StyledContent<String> {
    text.to_string().green()
}

/// Error text
pub fn error(text: &str) -> StyledContent<String> {
    text.to_string().red()
}

/// Path styling
pub fn path(p: &str) -> StyledContent<String> {
    p.to_string().blue()
}
