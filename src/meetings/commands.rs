use chrono::Utc;
use log::info;

use crate::{
    models::{apply_meeting_blocks, meeting_blocks, MeetingData, MeetingStatus, TextBlock},
    AppState,
};

async fn load_meeting(state: &AppState, meeting_id: &str) -> Result<MeetingData, String> {
    state
        .db
        .get_meeting(meeting_id)
        .await
        .map_err(|e| format!("{e:#}"))?
        .ok_or_else(|| format!("meeting {meeting_id} not found"))
}

/// Opens a new in-progress meeting for the given VC.
pub async fn start_meeting(state: &AppState, vc_id: String) -> Result<MeetingData, String> {
    let now = Utc::now();
    let meeting = MeetingData::new(
        format!("meet-{}", now.timestamp_millis()),
        vc_id,
        now.to_rfc3339(),
    );

    state
        .db
        .upsert_meeting(&meeting)
        .await
        .map_err(|e| format!("{e:#}"))?;

    info!("Started meeting {}", meeting.id);
    Ok(meeting)
}

pub async fn end_meeting(
    state: &AppState,
    meeting_id: String,
    status: MeetingStatus,
) -> Result<MeetingData, String> {
    if status == MeetingStatus::InProgress {
        return Err("a meeting can only end as completed or canceled".into());
    }

    let mut meeting = load_meeting(state, &meeting_id).await?;
    meeting.status = status;
    meeting.end_time = Some(Utc::now().to_rfc3339());

    state
        .db
        .upsert_meeting(&meeting)
        .await
        .map_err(|e| format!("{e:#}"))?;
    Ok(meeting)
}

pub async fn list_meetings(state: &AppState) -> Result<Vec<MeetingData>, String> {
    state.db.list_meetings().await.map_err(|e| format!("{e:#}"))
}

pub async fn get_meeting_notes(state: &AppState, meeting_id: String) -> Result<Vec<TextBlock>, String> {
    let meeting = load_meeting(state, &meeting_id).await?;
    Ok(meeting_blocks(&meeting))
}

pub async fn save_meeting_notes(
    state: &AppState,
    meeting_id: String,
    blocks: Vec<TextBlock>,
) -> Result<MeetingData, String> {
    let meeting = load_meeting(state, &meeting_id).await?;
    let updated = apply_meeting_blocks(&meeting, &blocks);

    state
        .db
        .upsert_meeting(&updated)
        .await
        .map_err(|e| format!("{e:#}"))?;
    Ok(updated)
}
