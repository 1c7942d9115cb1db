//! Editable note sections and single tracked fields.
//!
//! Both carry the last saved value plus an optional snapshot of the value
//! it replaced, which is what the history view diffs against.

use serde::{Deserialize, Serialize};

/// Whether a snapshot is worth showing as history next to `content`.
///
/// An absent or empty snapshot never counts. Otherwise the two values are
/// compared after trimming, so whitespace-only edits leave no visible
/// history even though the snapshot is stored.
pub fn has_visible_history(previous: Option<&str>, content: &str) -> bool {
    match previous {
        Some(previous) if !previous.is_empty() => previous.trim() != content.trim(),
        _ => false,
    }
}

/// One titled, editable note section belonging to a record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TextBlock {
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_content: Option<String>,
}

impl TextBlock {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            content: String::new(),
            previous_content: None,
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn with_previous(mut self, previous: impl Into<String>) -> Self {
        self.previous_content = Some(previous.into());
        self
    }

    pub fn has_history(&self) -> bool {
        has_visible_history(self.previous_content.as_deref(), &self.content)
    }

    /// Case-insensitive substring match over title and content.
    pub fn matches_query(&self, query: &str) -> bool {
        let needle = query.to_lowercase();
        self.title.to_lowercase().contains(&needle) || self.content.to_lowercase().contains(&needle)
    }
}

/// A scalar field (e.g. a key insight column) with its previous value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TrackedField {
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous: Option<String>,
}

impl TrackedField {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            previous: None,
        }
    }

    pub fn has_history(&self) -> bool {
        has_visible_history(self.previous.as_deref(), &self.value)
    }

    /// Stores `value`, keeping the replaced value as the snapshot when it
    /// differs. Returns whether anything changed.
    pub fn commit(&mut self, value: impl Into<String>) -> bool {
        let value = value.into();
        if value == self.value {
            return false;
        }
        self.previous = Some(std::mem::replace(&mut self.value, value));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_after_trim_hides_history() {
        let block = TextBlock::new("r-0", "Founders Notes")
            .with_content("Strong team ")
            .with_previous("  Strong team");
        assert!(block.previous_content.is_some());
        assert!(!block.has_history());
    }

    #[test]
    fn differing_snapshot_shows_history() {
        let block = TextBlock::new("r-0", "Founders Notes")
            .with_content("Strong team, second-time founders")
            .with_previous("Strong team");
        assert!(block.has_history());
    }

    #[test]
    fn empty_or_missing_snapshot_is_not_history() {
        let block = TextBlock::new("r-0", "Company Notes").with_content("First draft");
        assert!(!block.has_history());
        assert!(!block.clone().with_previous("").has_history());
    }

    #[test]
    fn query_matches_title_or_content_ignoring_case() {
        let block = TextBlock::new("r-2", "Tech Due Diligence").with_content("Rust backend, Postgres");
        assert!(block.matches_query("tech"));
        assert!(block.matches_query("POSTGRES"));
        assert!(block.matches_query(""));
        assert!(!block.matches_query("legal"));
    }

    #[test]
    fn serializes_camel_case_and_omits_missing_snapshot() {
        let block = TextBlock::new("r-1", "Legal Due Diligence").with_content("clean");
        let json = serde_json::to_value(&block).unwrap();
        assert_eq!(json["title"], "Legal Due Diligence");
        assert!(json.get("previousContent").is_none());

        let with_prev = block.with_previous("pending");
        let json = serde_json::to_value(&with_prev).unwrap();
        assert_eq!(json["previousContent"], "pending");
    }

    #[test]
    fn tracked_field_commit_keeps_replaced_value() {
        let mut insight = TrackedField::new("Strong retention metrics in beta.");
        assert!(!insight.commit("Strong retention metrics in beta."));
        assert_eq!(insight.previous, None);

        assert!(insight.commit("Strong retention. Pilot with a Fortune 500 retailer."));
        assert_eq!(insight.previous.as_deref(), Some("Strong retention metrics in beta."));
        assert!(insight.has_history());
    }
}
