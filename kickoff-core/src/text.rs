//! Case-insensitive comparisons shared by both scoring models.

use std::collections::HashSet;

/// Exact, case-insensitive equality of two required fields.
pub fn same_text(a: &str, b: &str) -> bool {
    !is_blank(a) && !is_blank(b) && a.to_lowercase() == b.to_lowercase()
}

/// Like [`same_text`], but an absent side is a non-match.
pub fn same_optional(a: Option<&str>, b: Option<&str>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => same_text(a, b),
        _ => false,
    }
}

/// Size of the case-insensitive set intersection of two interest lists.
///
/// Duplicates on either side count once.
pub fn shared_interest_count(a: &[String], b: &[String]) -> usize {
    let left = interest_set(a);
    interest_set(b).intersection(&left).count()
}

fn interest_set(interests: &[String]) -> HashSet<String> {
    interests
        .iter()
        .filter(|i| !is_blank(i))
        .map(|i| i.to_lowercase())
        .collect()
}

fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_same_text_ignores_case() {
        assert!(same_text("London", "london"));
        assert!(!same_text("London", "London Bridge"));
    }

    /// Regression test: two blank fields are not a match.
    #[test]
    fn test_blank_never_matches() {
        assert!(!same_text("", ""));
        assert!(!same_text("  ", "  "));
        assert!(!same_optional(None, None));
        assert!(!same_optional(Some("Arsenal"), None));
        assert!(same_optional(Some("ARSENAL"), Some("arsenal")));
    }

    #[test]
    fn test_shared_interests_is_set_overlap() {
        let a = list(&["Music", "music", "Beer", "Chess"]);
        let b = list(&["MUSIC", "beer", "Darts"]);
        assert_eq!(shared_interest_count(&a, &b), 2);
        assert_eq!(shared_interest_count(&b, &a), 2);
        assert_eq!(shared_interest_count(&a, &[]), 0);
    }
}
