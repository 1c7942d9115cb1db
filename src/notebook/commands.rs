//! Notebook commands exposed to the UI shell.

use crate::{
    db::SummaryRecordInfo,
    diff::{compute_diff, DiffToken},
    models::{RecordKind, TextBlock},
    notebook::{FieldView, NotebookSession},
    AppState,
};

pub async fn get_summaries(
    state: &AppState,
    record_id: String,
    kind: RecordKind,
) -> Result<Vec<TextBlock>, String> {
    state
        .summaries
        .init_summaries(&record_id, kind)
        .await
        .map_err(|e| format!("{e:#}"))
}

pub async fn get_notebook_view(
    state: &AppState,
    record_id: String,
    kind: RecordKind,
    query: Option<String>,
) -> Result<Vec<FieldView>, String> {
    let blocks = get_summaries(state, record_id.clone(), kind).await?;
    let session = NotebookSession::new(record_id, blocks);
    Ok(session.visible_fields(query.as_deref().unwrap_or("")))
}

pub async fn save_summaries(
    state: &AppState,
    record_id: String,
    drafts: Vec<TextBlock>,
) -> Result<Vec<TextBlock>, String> {
    state
        .summaries
        .save(&record_id, drafts)
        .await
        .map_err(|e| format!("{e:#}"))
}

pub async fn reload_summaries(
    state: &AppState,
    record_id: String,
    kind: RecordKind,
) -> Result<Vec<TextBlock>, String> {
    state
        .summaries
        .reload(&record_id, kind)
        .await
        .map_err(|e| format!("{e:#}"))
}

pub async fn get_block_history(
    state: &AppState,
    record_id: String,
    kind: RecordKind,
    block_id: String,
) -> Result<Option<Vec<DiffToken>>, String> {
    let blocks = get_summaries(state, record_id.clone(), kind).await?;
    let session = NotebookSession::new(record_id, blocks);
    Ok(session.history_diff(&block_id))
}

pub fn compute_text_diff(old_text: String, new_text: String) -> Vec<DiffToken> {
    compute_diff(&old_text, &new_text)
}

pub async fn list_notebooks(state: &AppState) -> Result<Vec<SummaryRecordInfo>, String> {
    state
        .db
        .list_summary_records()
        .await
        .map_err(|e| format!("{e:#}"))
}
