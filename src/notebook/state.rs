use serde::{Deserialize, Serialize};

use crate::{
    diff::{compute_diff, DiffToken},
    models::TextBlock,
};

/// Display state of one field of an open notebook.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", tag = "state")]
pub enum FieldState {
    /// Draft matches the saved content and there is nothing to diff.
    Clean,
    /// Draft matches the saved content, which differs from its snapshot.
    CleanWithHistory,
    /// Draft differs from the saved content.
    Dirty,
    /// Field has edit focus.
    Editing { dirty: bool },
}

impl FieldState {
    pub fn is_dirty(&self) -> bool {
        matches!(self, FieldState::Dirty | FieldState::Editing { dirty: true })
    }

    /// The history affordance is only offered on a clean, unfocused field.
    pub fn shows_history_indicator(&self) -> bool {
        matches!(self, FieldState::CleanWithHistory)
    }
}

/// Flattened per-field view handed to the rendering layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FieldView {
    pub id: String,
    pub title: String,
    pub content: String,
    pub state: FieldState,
    pub is_dirty: bool,
    pub has_history: bool,
    pub show_history_indicator: bool,
}

/// Drafts of one record's blocks next to their last saved values.
#[derive(Debug, Clone)]
pub struct NotebookSession {
    record_id: String,
    saved: Vec<TextBlock>,
    drafts: Vec<TextBlock>,
    editing: Option<String>,
}

impl NotebookSession {
    pub fn new(record_id: impl Into<String>, saved: Vec<TextBlock>) -> Self {
        Self {
            record_id: record_id.into(),
            drafts: saved.clone(),
            saved,
            editing: None,
        }
    }

    pub fn record_id(&self) -> &str {
        &self.record_id
    }

    pub fn saved(&self) -> &[TextBlock] {
        &self.saved
    }

    pub fn drafts(&self) -> &[TextBlock] {
        &self.drafts
    }

    fn saved_block(&self, id: &str) -> Option<&TextBlock> {
        self.saved.iter().find(|block| block.id == id)
    }

    /// Replaces a draft's content. Saved content is untouched.
    pub fn edit(&mut self, id: &str, content: impl Into<String>) -> bool {
        match self.drafts.iter_mut().find(|block| block.id == id) {
            Some(draft) => {
                draft.content = content.into();
                true
            }
            None => false,
        }
    }

    /// Adds a draft block; an id unknown to the saved batch is a new field.
    pub fn insert_draft(&mut self, block: TextBlock) {
        match self.drafts.iter_mut().find(|draft| draft.id == block.id) {
            Some(existing) => *existing = block,
            None => self.drafts.push(block),
        }
    }

    pub fn begin_editing(&mut self, id: &str) -> bool {
        if self.drafts.iter().any(|block| block.id == id) {
            self.editing = Some(id.to_string());
            true
        } else {
            false
        }
    }

    pub fn end_editing(&mut self) {
        self.editing = None;
    }

    pub fn field_state(&self, id: &str) -> Option<FieldState> {
        let draft = self.drafts.iter().find(|block| block.id == id)?;
        // A draft without a saved counterpart is compared with itself.
        let saved = self.saved_block(id).unwrap_or(draft);
        let dirty = draft.content != saved.content;

        let state = if self.editing.as_deref() == Some(id) {
            FieldState::Editing { dirty }
        } else if dirty {
            FieldState::Dirty
        } else if saved.has_history() {
            FieldState::CleanWithHistory
        } else {
            FieldState::Clean
        };
        Some(state)
    }

    pub fn field_view(&self, id: &str) -> Option<FieldView> {
        let draft = self.drafts.iter().find(|block| block.id == id)?;
        let state = self.field_state(id)?;
        let has_history = self.saved_block(id).unwrap_or(draft).has_history();

        Some(FieldView {
            id: draft.id.clone(),
            title: draft.title.clone(),
            content: draft.content.clone(),
            state,
            is_dirty: state.is_dirty(),
            has_history,
            show_history_indicator: state.shows_history_indicator(),
        })
    }

    /// Whether any draft with a saved counterpart differs from it.
    pub fn has_unsaved_changes(&self) -> bool {
        self.drafts.iter().any(|draft| {
            self.saved_block(&draft.id)
                .is_some_and(|saved| saved.content != draft.content)
        })
    }

    /// Fields whose title or draft content matches `query`, in draft order.
    pub fn visible_fields(&self, query: &str) -> Vec<FieldView> {
        self.drafts
            .iter()
            .filter(|draft| draft.matches_query(query))
            .filter_map(|draft| self.field_view(&draft.id))
            .collect()
    }

    /// Word diff from the saved snapshot to the saved content, when the
    /// field has visible history.
    pub fn history_diff(&self, id: &str) -> Option<Vec<DiffToken>> {
        let saved = self.saved_block(id)?;
        if !saved.has_history() {
            return None;
        }
        let previous = saved.previous_content.as_deref()?;
        Some(compute_diff(previous, &saved.content))
    }

    /// The batch to hand to the save operation.
    pub fn save_batch(&self) -> Vec<TextBlock> {
        self.drafts.clone()
    }

    /// Adopts the blocks returned by a successful save. Edit focus is kept.
    pub fn mark_saved(&mut self, saved: Vec<TextBlock>) {
        self.drafts = saved.clone();
        self.saved = saved;
    }

    /// Replaces everything with freshly loaded data. Local drafts are dropped.
    pub fn reload(&mut self, saved: Vec<TextBlock>) {
        self.mark_saved(saved);
        self.editing = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notebook::apply_save;

    fn session() -> NotebookSession {
        NotebookSession::new(
            "app-1",
            vec![
                TextBlock::new("a", "Founders Notes").with_content("foo"),
                TextBlock::new("b", "Company Notes")
                    .with_content("Series A")
                    .with_previous("Seed"),
            ],
        )
    }

    #[test]
    fn reverting_a_draft_clears_unsaved_changes() {
        let mut session = session();
        assert!(!session.has_unsaved_changes());

        assert!(session.edit("a", "bar"));
        assert!(session.has_unsaved_changes());
        assert_eq!(session.field_state("a"), Some(FieldState::Dirty));

        session.edit("a", "foo");
        assert!(!session.has_unsaved_changes());
        assert_eq!(session.field_state("a"), Some(FieldState::Clean));
    }

    #[test]
    fn dirty_suppresses_history_indicator() {
        let mut session = session();
        assert_eq!(session.field_state("b"), Some(FieldState::CleanWithHistory));
        assert!(session.field_view("b").unwrap().show_history_indicator);

        session.edit("b", "Series A extension");
        let view = session.field_view("b").unwrap();
        assert_eq!(view.state, FieldState::Dirty);
        assert!(view.has_history);
        assert!(!view.show_history_indicator);
    }

    #[test]
    fn editing_focus_hides_history_but_keeps_dirty_flag() {
        let mut session = session();
        assert!(session.begin_editing("b"));
        assert_eq!(session.field_state("b"), Some(FieldState::Editing { dirty: false }));
        assert!(!session.field_view("b").unwrap().show_history_indicator);

        session.edit("b", "Series B");
        assert!(session.field_view("b").unwrap().is_dirty);

        session.end_editing();
        assert_eq!(session.field_state("b"), Some(FieldState::Dirty));
        assert!(!session.begin_editing("missing"));
    }

    #[test]
    fn dirty_check_is_exact_while_history_check_trims() {
        let mut session = NotebookSession::new(
            "app-1",
            vec![TextBlock::new("a", "Founders Notes")
                .with_content("same ")
                .with_previous("same")],
        );
        assert_eq!(session.field_state("a"), Some(FieldState::Clean));

        session.edit("a", "same");
        assert_eq!(session.field_state("a"), Some(FieldState::Dirty));
    }

    #[test]
    fn unknown_draft_is_a_new_unsaved_field() {
        let mut session = session();
        assert!(!session.edit("z", "ghost"));

        session.insert_draft(TextBlock::new("z", "Extra").with_content("ghost"));
        assert_eq!(session.drafts().len(), 3);
        assert_eq!(session.field_state("z"), Some(FieldState::Clean));
        assert!(!session.has_unsaved_changes());

        let saved = apply_save(session.saved(), &session.save_batch());
        assert_eq!(saved[2].previous_content, None);
    }

    #[test]
    fn reload_discards_drafts_and_focus() {
        let mut session = session();
        session.begin_editing("a");
        session.edit("a", "in flight");

        session.reload(vec![TextBlock::new("a", "Founders Notes").with_content("remote")]);
        assert!(!session.has_unsaved_changes());
        assert_eq!(session.drafts()[0].content, "remote");
        assert_eq!(session.field_state("a"), Some(FieldState::Clean));
    }

    #[test]
    fn history_diff_compares_snapshot_with_saved_content() {
        let session = session();
        let tokens = session.history_diff("b").unwrap();
        assert_eq!(
            tokens,
            vec![DiffToken::removed("Seed"), DiffToken::added("Series"), DiffToken::added("A")]
        );
        assert!(session.history_diff("a").is_none());
    }

    #[test]
    fn search_filters_on_draft_content() {
        let mut session = session();
        session.edit("a", "Met the CTO");

        let ids: Vec<String> = session.visible_fields("cto").into_iter().map(|f| f.id).collect();
        assert_eq!(ids, vec!["a"]);
        assert_eq!(session.visible_fields("notes").len(), 2);
        assert!(session.visible_fields("board").is_empty());
    }
}
