pub mod deal;
pub mod meeting;
pub mod record;
pub mod text_block;

pub use deal::{
    sort_applications, ApplicationData, ApplicationStatus, NewApplication, StartupData,
};
pub use meeting::{apply_meeting_blocks, meeting_blocks, MeetingData, MeetingStatus, TranscriptChunk};
pub use record::{generate_empty_summaries, RecordKind};
pub use text_block::{has_visible_history, TextBlock, TrackedField};
