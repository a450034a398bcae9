//! Snapshot parsers and the text clean-up they share.

pub mod json_snapshot;
pub mod csv_export;

use anyhow::Result;
use kickoff_core::User;
use regex::Regex;

/// Splits flat list cells such as `"music; beer, darts|golf"` (interests,
/// passenger and trip id lists).
pub struct InterestSplitter {
    separator: Regex,
}

impl InterestSplitter {
    pub fn new() -> Result<Self> {
        Ok(Self {
            separator: Regex::new(r"\s*[;,|]\s*")?,
        })
    }

    pub fn split(&self, s: &str) -> Vec<String> {
        self.separator
            .split(s.trim())
            .filter(|i| !i.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// One-off form of [`InterestSplitter::split`].
pub fn parse_interest_list(s: &str) -> Result<Vec<String>> {
    Ok(InterestSplitter::new()?.split(s))
}

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Trim every free-text field; blank values become absent.
pub fn normalize_user(user: User) -> User {
    User {
        id: user.id,
        full_name: clean(user.full_name),
        favourite_team: clean(user.favourite_team),
        supporter_group: clean(user.supporter_group),
        region: clean(user.region),
        city: clean(user.city),
        entry_center: clean(user.entry_center),
        interests: user
            .interests
            .into_iter()
            .filter_map(|i| clean(Some(i)))
            .collect(),
    }
}
