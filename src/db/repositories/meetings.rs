use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Row};

use crate::{
    db::{helpers::parse_meeting_status, Database},
    models::MeetingData,
};

const MEETING_COLUMNS: &str =
    "id, vc_id, start_time, end_time, status, transcript_json, chat_history_json, summary, vc_notes";

fn row_to_meeting(row: &Row) -> Result<MeetingData> {
    let status: String = row.get("status")?;
    let transcript_json: String = row.get("transcript_json")?;
    let chat_history_json: String = row.get("chat_history_json")?;

    Ok(MeetingData {
        id: row.get("id")?,
        vc_id: row.get("vc_id")?,
        start_time: row.get("start_time")?,
        end_time: row.get("end_time")?,
        status: parse_meeting_status(&status)?,
        transcript: serde_json::from_str(&transcript_json).context("malformed transcript_json")?,
        chat_history: serde_json::from_str(&chat_history_json)
            .context("malformed chat_history_json")?,
        summary: row.get("summary")?,
        vc_notes: row.get("vc_notes")?,
    })
}

impl Database {
    pub async fn upsert_meeting(&self, meeting: &MeetingData) -> Result<()> {
        let record = meeting.clone();
        self.execute(move |conn| {
            let transcript_json = serde_json::to_string(&record.transcript)?;
            let chat_history_json = serde_json::to_string(&record.chat_history)?;

            conn.execute(
                "INSERT INTO meetings (
                    id, vc_id, start_time, end_time, status,
                    transcript_json, chat_history_json, summary, vc_notes, updated_at
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                 ON CONFLICT(id) DO UPDATE SET
                    vc_id = excluded.vc_id,
                    start_time = excluded.start_time,
                    end_time = excluded.end_time,
                    status = excluded.status,
                    transcript_json = excluded.transcript_json,
                    chat_history_json = excluded.chat_history_json,
                    summary = excluded.summary,
                    vc_notes = excluded.vc_notes,
                    updated_at = excluded.updated_at",
                params![
                    record.id,
                    record.vc_id,
                    record.start_time,
                    record.end_time,
                    record.status.as_str(),
                    transcript_json,
                    chat_history_json,
                    record.summary,
                    record.vc_notes,
                    Utc::now().to_rfc3339(),
                ],
            )
            .with_context(|| format!("failed to upsert meeting {}", record.id))?;
            Ok(())
        })
        .await
    }

    pub async fn get_meeting(&self, meeting_id: &str) -> Result<Option<MeetingData>> {
        let meeting_id = meeting_id.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MEETING_COLUMNS} FROM meetings WHERE id = ?1"
            ))?;
            let mut rows = stmt.query(params![meeting_id])?;
            match rows.next()? {
                Some(row) => Ok(Some(row_to_meeting(row)?)),
                None => Ok(None),
            }
        })
        .await
    }

    /// All meetings, newest first.
    pub async fn list_meetings(&self) -> Result<Vec<MeetingData>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MEETING_COLUMNS} FROM meetings ORDER BY start_time DESC"
            ))?;
            let mut rows = stmt.query([])?;
            let mut meetings = Vec::new();
            while let Some(row) = rows.next()? {
                meetings.push(row_to_meeting(row)?);
            }
            Ok(meetings)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MeetingStatus, TranscriptChunk};

    fn meeting(id: &str, start: &str) -> MeetingData {
        let mut meeting = MeetingData::new(id, "vc-1", start);
        meeting.transcript.push(TranscriptChunk {
            speaker: "Founder".into(),
            text: "We closed two pilots".into(),
            timestamp: start.into(),
        });
        meeting
    }

    #[tokio::test]
    async fn upsert_inserts_then_updates() {
        let db = Database::open_in_memory().unwrap();
        let mut record = meeting("meet-1", "2026-10-01T09:00:00Z");
        db.upsert_meeting(&record).await.unwrap();

        record.status = MeetingStatus::Completed;
        record.vc_notes = Some("Ask for cohort data".into());
        db.upsert_meeting(&record).await.unwrap();

        let stored = db.get_meeting("meet-1").await.unwrap().unwrap();
        assert_eq!(stored, record);
        assert!(db.get_meeting("meet-404").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn meetings_list_newest_first() {
        let db = Database::open_in_memory().unwrap();
        db.upsert_meeting(&meeting("early", "2026-09-01T09:00:00Z")).await.unwrap();
        db.upsert_meeting(&meeting("late", "2026-10-01T09:00:00Z")).await.unwrap();

        let ids: Vec<String> = db
            .list_meetings()
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.id)
            .collect();
        assert_eq!(ids, vec!["late", "early"]);
    }
}
