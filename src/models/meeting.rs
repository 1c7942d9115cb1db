//! Meeting records and their note blocks.
//!
//! A meeting keeps its summary and the VC's notes as plain optional fields;
//! the notebook edits them as two blocks so they get the same draft and
//! history handling as record notes.

use serde::{Deserialize, Serialize};

use super::TextBlock;

pub const MEETING_SUMMARY_TITLE: &str = "Meeting Summary";
pub const VC_NOTES_TITLE: &str = "VC Notes";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MeetingStatus {
    InProgress,
    Completed,
    Canceled,
}

impl MeetingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MeetingStatus::InProgress => "in_progress",
            MeetingStatus::Completed => "completed",
            MeetingStatus::Canceled => "canceled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "in_progress" => Some(MeetingStatus::InProgress),
            "completed" => Some(MeetingStatus::Completed),
            "canceled" => Some(MeetingStatus::Canceled),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TranscriptChunk {
    pub speaker: String,
    pub text: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MeetingData {
    pub id: String,
    pub vc_id: String,
    pub start_time: String,
    pub end_time: Option<String>,
    pub status: MeetingStatus,
    #[serde(default)]
    pub transcript: Vec<TranscriptChunk>,
    #[serde(default)]
    pub chat_history: Vec<TranscriptChunk>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vc_notes: Option<String>,
}

impl MeetingData {
    pub fn new(id: impl Into<String>, vc_id: impl Into<String>, start_time: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            vc_id: vc_id.into(),
            start_time: start_time.into(),
            end_time: None,
            status: MeetingStatus::InProgress,
            transcript: Vec::new(),
            chat_history: Vec::new(),
            summary: None,
            vc_notes: None,
        }
    }

    pub fn summary_block_id(&self) -> String {
        format!("{}-summary", self.id)
    }

    pub fn notes_block_id(&self) -> String {
        format!("{}-notes", self.id)
    }
}

/// The two editable blocks of a meeting, summary first.
pub fn meeting_blocks(meeting: &MeetingData) -> Vec<TextBlock> {
    vec![
        TextBlock::new(meeting.summary_block_id(), MEETING_SUMMARY_TITLE)
            .with_content(meeting.summary.clone().unwrap_or_default()),
        TextBlock::new(meeting.notes_block_id(), VC_NOTES_TITLE)
            .with_content(meeting.vc_notes.clone().unwrap_or_default()),
    ]
}

/// Copies a saved block batch back onto the meeting, looked up by title.
/// A block missing from the batch clears its field.
pub fn apply_meeting_blocks(meeting: &MeetingData, blocks: &[TextBlock]) -> MeetingData {
    let content_for = |title: &str| {
        blocks
            .iter()
            .find(|block| block.title == title)
            .map(|block| block.content.clone())
    };

    MeetingData {
        summary: content_for(MEETING_SUMMARY_TITLE),
        vc_notes: content_for(VC_NOTES_TITLE),
        ..meeting.clone()
    }
}
