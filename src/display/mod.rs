//! Display formatting for terminal output
//!
//! Plain-text tables and detail views for labels and transactions. Reports
//! carry their own `format_terminal`.

pub mod label;
pub mod transaction;

pub use label::{format_label_details, format_label_list};
pub use transaction::{format_transaction_details, format_transaction_register};

/// Truncate to a display width, marking the cut with an ellipsis
pub(crate) fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_chars.saturating_sub(1)).collect();
        format!("{}…", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("KROGER", 10), "KROGER");
        assert_eq!(truncate("KROGER #123 CINCINNATI", 8), "KROGER …");
    }
}
