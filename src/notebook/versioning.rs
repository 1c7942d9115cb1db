use crate::models::TextBlock;

/// Builds the block batch to persist from the drafts and what is currently
/// saved for the record.
///
/// A draft whose content differs from its saved counterpart (exact
/// comparison) carries the saved content forward as `previous_content`.
/// Unchanged drafts, and drafts with no saved counterpart, are kept as they
/// are, including any snapshot they already hold. Each block is handled on
/// its own, so saving the same batch twice does not move any snapshot.
pub fn apply_save(saved: &[TextBlock], drafts: &[TextBlock]) -> Vec<TextBlock> {
    drafts
        .iter()
        .map(|draft| match saved.iter().find(|old| old.id == draft.id) {
            Some(old) if old.content != draft.content => TextBlock {
                previous_content: Some(old.content.clone()),
                ..draft.clone()
            },
            _ => draft.clone(),
        })
        .collect()
}
