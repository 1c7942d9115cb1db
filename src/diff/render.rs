use serde::Serialize;

use super::engine::{DiffKind, DiffToken};

/// Per-kind token counts for a diff.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DiffSummary {
    pub same: usize,
    pub added: usize,
    pub removed: usize,
}

impl DiffSummary {
    pub fn is_unchanged(&self) -> bool {
        self.added == 0 && self.removed == 0
    }
}

pub fn summarize(tokens: &[DiffToken]) -> DiffSummary {
    tokens
        .iter()
        .fold(DiffSummary::default(), |mut summary, token| {
            match token.kind {
                DiffKind::Same => summary.same += 1,
                DiffKind::Added => summary.added += 1,
                DiffKind::Removed => summary.removed += 1,
            }
            summary
        })
}

/// Plain-text rendering of a diff: `[-word-]` for removed, `{+word+}` for added.
pub fn render_inline(tokens: &[DiffToken]) -> String {
    tokens
        .iter()
        .map(|token| match token.kind {
            DiffKind::Same => token.value.clone(),
            DiffKind::Added => format!("{{+{}+}}", token.value),
            DiffKind::Removed => format!("[-{}-]", token.value),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::compute_diff;

    #[test]
    fn renders_markers_around_changed_words() {
        let tokens = compute_diff("valuation $12M", "valuation $15M");
        assert_eq!(render_inline(&tokens), "valuation [-$12M-] {+$15M+}");
    }

    #[test]
    fn summary_counts_each_kind() {
        let tokens = compute_diff("a b c", "a c d e");
        let summary = summarize(&tokens);
        assert_eq!(
            summary,
            DiffSummary {
                same: 2,
                added: 2,
                removed: 1
            }
        );
        assert!(!summary.is_unchanged());
        assert!(summarize(&compute_diff("x", "x")).is_unchanged());
    }
}
