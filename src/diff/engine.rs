use serde::{Deserialize, Serialize};

/// Which side of the alignment a word belongs to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum DiffKind {
    Same,
    Added,
    Removed,
}

/// One word of a word-level edit script.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DiffToken {
    pub kind: DiffKind,
    pub value: String,
}

impl DiffToken {
    pub fn same(value: impl Into<String>) -> Self {
        Self {
            kind: DiffKind::Same,
            value: value.into(),
        }
    }

    pub fn added(value: impl Into<String>) -> Self {
        Self {
            kind: DiffKind::Added,
            value: value.into(),
        }
    }

    pub fn removed(value: impl Into<String>) -> Self {
        Self {
            kind: DiffKind::Removed,
            value: value.into(),
        }
    }
}

/// Word-level diff between two texts using an LCS table.
///
/// Both inputs are split on whitespace, so runs of spaces and newlines
/// collapse and empty inputs contribute no words. Runs in O(m·n) time and
/// space over the word counts; fine for note fields, not for whole documents.
///
/// When the backtrack hits a cell where moving up and moving left keep the
/// same LCS length, it emits `Added` first. Because the script is built
/// back to front, removed words end up ahead of the added words that
/// replace them.
pub fn compute_diff(old_text: &str, new_text: &str) -> Vec<DiffToken> {
    let a: Vec<&str> = old_text.split_whitespace().collect();
    let b: Vec<&str> = new_text.split_whitespace().collect();
    let m = a.len();
    let n = b.len();

    let table = lcs_table(&a, &b);

    let mut i = m;
    let mut j = n;
    let mut reversed = Vec::with_capacity(m + n);

    while i > 0 && j > 0 {
        if a[i - 1] == b[j - 1] {
            reversed.push(DiffToken::same(a[i - 1]));
            i -= 1;
            j -= 1;
        } else if table[i - 1][j] > table[i][j - 1] {
            reversed.push(DiffToken::removed(a[i - 1]));
            i -= 1;
        } else {
            reversed.push(DiffToken::added(b[j - 1]));
            j -= 1;
        }
    }

    // Flush whichever prefix is left once a boundary is reached.
    while i > 0 {
        reversed.push(DiffToken::removed(a[i - 1]));
        i -= 1;
    }
    while j > 0 {
        reversed.push(DiffToken::added(b[j - 1]));
        j -= 1;
    }

    reversed.reverse();
    reversed
}

/// `table[i][j]` is the LCS length of `a[..i]` and `b[..j]`.
fn lcs_table(a: &[&str], b: &[&str]) -> Vec<Vec<usize>> {
    let mut table = vec![vec![0usize; b.len() + 1]; a.len() + 1];

    for i in 1..=a.len() {
        for j in 1..=b.len() {
            table[i][j] = if a[i - 1] == b[j - 1] {
                table[i - 1][j - 1] + 1
            } else {
                table[i][j - 1].max(table[i - 1][j])
            };
        }
    }

    table
}

/// Words of the old text, rebuilt from `Same` and `Removed` tokens.
pub fn old_words(tokens: &[DiffToken]) -> Vec<&str> {
    tokens
        .iter()
        .filter(|token| token.kind != DiffKind::Added)
        .map(|token| token.value.as_str())
        .collect()
}

/// Words of the new text, rebuilt from `Same` and `Added` tokens.
pub fn new_words(tokens: &[DiffToken]) -> Vec<&str> {
    tokens
        .iter()
        .filter(|token| token.kind != DiffKind::Removed)
        .map(|token| token.value.as_str())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn kinds(tokens: &[DiffToken]) -> Vec<DiffKind> {
        tokens.iter().map(|t| t.kind).collect()
    }

    #[test]
    fn identical_text_is_all_same() {
        let tokens = compute_diff("alpha beta gamma", "alpha beta gamma");
        assert_eq!(
            tokens,
            vec![
                DiffToken::same("alpha"),
                DiffToken::same("beta"),
                DiffToken::same("gamma"),
            ]
        );
    }

    #[test]
    fn empty_old_text_is_all_added() {
        let tokens = compute_diff("", "a b c");
        assert_eq!(
            tokens,
            vec![
                DiffToken::added("a"),
                DiffToken::added("b"),
                DiffToken::added("c"),
            ]
        );
    }

    #[test]
    fn empty_new_text_is_all_removed() {
        let tokens = compute_diff("a b c", "");
        assert_eq!(
            tokens,
            vec![
                DiffToken::removed("a"),
                DiffToken::removed("b"),
                DiffToken::removed("c"),
            ]
        );
    }

    #[test]
    fn both_empty_yields_nothing() {
        assert!(compute_diff("", "").is_empty());
        assert!(compute_diff("   \n\t ", "").is_empty());
    }

    #[test]
    fn whitespace_runs_collapse() {
        let tokens = compute_diff("  one \n\n two  ", "one two");
        assert_eq!(kinds(&tokens), vec![DiffKind::Same, DiffKind::Same]);
    }

    #[test]
    fn single_substitution_puts_removed_before_added() {
        let tokens = compute_diff("a", "b");
        assert_eq!(tokens, vec![DiffToken::removed("a"), DiffToken::added("b")]);
    }

    #[test]
    fn tie_break_keeps_the_later_common_word() {
        // "x y" vs "y x": both one-word alignments have length 1. The
        // backtrack moves left on the tie at (2, 2), so "y" is kept.
        let tokens = compute_diff("x y", "y x");
        assert_eq!(
            tokens,
            vec![
                DiffToken::removed("x"),
                DiffToken::same("y"),
                DiffToken::added("x"),
            ]
        );
    }

    #[test]
    fn strictly_greater_up_cell_emits_removed() {
        let tokens = compute_diff("keep drop", "keep");
        assert_eq!(tokens, vec![DiffToken::same("keep"), DiffToken::removed("drop")]);
    }

    #[test]
    fn revenue_edit_surfaces_inserted_and_removed_words() {
        let tokens = compute_diff("Q3 revenue up 20%", "Q3 revenue up 25%, confirmed by CFO");
        assert_eq!(
            tokens,
            vec![
                DiffToken::same("Q3"),
                DiffToken::same("revenue"),
                DiffToken::same("up"),
                DiffToken::removed("20%"),
                DiffToken::added("25%,"),
                DiffToken::added("confirmed"),
                DiffToken::added("by"),
                DiffToken::added("CFO"),
            ]
        );
    }

    #[test]
    fn same_tokens_form_the_longest_common_subsequence() {
        let tokens = compute_diff("the quick brown fox jumps", "the slow brown dog jumps high");
        let common: Vec<&str> = tokens
            .iter()
            .filter(|t| t.kind == DiffKind::Same)
            .map(|t| t.value.as_str())
            .collect();
        assert_eq!(common, vec!["the", "brown", "jumps"]);
    }

    fn words() -> impl Strategy<Value = String> {
        prop::collection::vec(prop::sample::select(vec!["a", "b", "c", "d", "deal", "memo"]), 0..12)
            .prop_map(|w| w.join(" "))
    }

    proptest! {
        #[test]
        fn prop_tokens_rebuild_both_sides(old in words(), new in words()) {
            let tokens = compute_diff(&old, &new);
            let expected_old: Vec<&str> = old.split_whitespace().collect();
            let expected_new: Vec<&str> = new.split_whitespace().collect();
            prop_assert_eq!(old_words(&tokens), expected_old);
            prop_assert_eq!(new_words(&tokens), expected_new);
        }

        #[test]
        fn prop_self_diff_is_identity(text in words()) {
            let tokens = compute_diff(&text, &text);
            prop_assert!(tokens.iter().all(|t| t.kind == DiffKind::Same));
            prop_assert_eq!(new_words(&tokens), text.split_whitespace().collect::<Vec<_>>());
        }
    }
}
