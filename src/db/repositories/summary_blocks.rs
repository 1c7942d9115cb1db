use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Row};

use crate::{
    db::{
        helpers::{parse_datetime, to_i64, to_u64},
        models::SummaryRecordInfo,
        Database,
    },
    models::TextBlock,
    notebook::{PersistFuture, SummaryPersistence},
};

/// Whitespace stripped before comparing a snapshot with its content, so the
/// history count agrees with `has_visible_history` for ASCII text.
const TRIMMED_CHARS: &str = " \t\n\r";

fn row_to_block(row: &Row) -> rusqlite::Result<TextBlock> {
    Ok(TextBlock {
        id: row.get("block_id")?,
        title: row.get("title")?,
        content: row.get("content")?,
        previous_content: row.get("previous_content")?,
    })
}

impl Database {
    /// Blocks stored for a record, in their original order.
    pub async fn load_summary_blocks(&self, record_id: &str) -> Result<Vec<TextBlock>> {
        let record_id = record_id.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT block_id, title, content, previous_content
                 FROM summary_blocks
                 WHERE record_id = ?1
                 ORDER BY position ASC",
            )?;

            let blocks = stmt
                .query_map(params![record_id], row_to_block)?
                .collect::<rusqlite::Result<Vec<_>>>()
                .context("failed to read summary blocks")?;

            Ok(blocks)
        })
        .await
    }

    /// Replaces every block of a record in one transaction.
    pub async fn replace_summary_blocks(&self, record_id: &str, blocks: &[TextBlock]) -> Result<()> {
        let record_id = record_id.to_string();
        let blocks = blocks.to_vec();
        self.execute(move |conn| {
            let now = Utc::now().to_rfc3339();
            let tx = conn.transaction()?;

            tx.execute(
                "DELETE FROM summary_blocks WHERE record_id = ?1",
                params![record_id],
            )
            .context("failed to clear summary blocks")?;

            {
                let mut stmt = tx.prepare(
                    "INSERT INTO summary_blocks (
                        record_id,
                        block_id,
                        position,
                        title,
                        content,
                        previous_content,
                        updated_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                )?;

                for (position, block) in blocks.iter().enumerate() {
                    stmt.execute(params![
                        record_id,
                        block.id,
                        to_i64(position)?,
                        block.title,
                        block.content,
                        block.previous_content,
                        now,
                    ])
                    .with_context(|| format!("failed to insert summary block {}", block.id))?;
                }
            }

            tx.commit().context("failed to commit summary blocks")?;
            Ok(())
        })
        .await
    }

    /// Every record with stored notes, most recently saved first. Only
    /// snapshots that show up as history are counted as versioned.
    pub async fn list_summary_records(&self) -> Result<Vec<SummaryRecordInfo>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(
                "SELECT record_id,
                        COUNT(*) AS block_count,
                        SUM(CASE WHEN previous_content IS NOT NULL
                                  AND previous_content <> ''
                                  AND TRIM(previous_content, ?1) <> TRIM(content, ?1)
                             THEN 1 ELSE 0 END) AS versioned_count,
                        MAX(updated_at) AS updated_at
                 FROM summary_blocks
                 GROUP BY record_id
                 ORDER BY updated_at DESC",
            )?;

            let mut rows = stmt.query(params![TRIMMED_CHARS])?;
            let mut records = Vec::new();
            while let Some(row) = rows.next()? {
                let updated_at: String = row.get("updated_at")?;
                records.push(SummaryRecordInfo {
                    record_id: row.get("record_id")?,
                    block_count: to_u64(row.get("block_count")?, "block_count")?,
                    versioned_count: to_u64(row.get("versioned_count")?, "versioned_count")?,
                    updated_at: parse_datetime(&updated_at, "updated_at")?,
                });
            }

            Ok(records)
        })
        .await
    }
}

impl SummaryPersistence for Database {
    fn load<'a>(&'a self, record_id: &'a str) -> PersistFuture<'a, Option<Vec<TextBlock>>> {
        Box::pin(async move {
            let blocks = self.load_summary_blocks(record_id).await?;
            Ok((!blocks.is_empty()).then_some(blocks))
        })
    }

    fn persist<'a>(&'a self, record_id: &'a str, blocks: &'a [TextBlock]) -> PersistFuture<'a, ()> {
        Box::pin(self.replace_summary_blocks(record_id, blocks))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blocks() -> Vec<TextBlock> {
        vec![
            TextBlock::new("app-1-0", "Financial Due Diligence").with_content("Runway 18 months"),
            TextBlock::new("app-1-1", "Customer Due Diligence")
                .with_content("3 paying pilots")
                .with_previous("2 paying pilots"),
        ]
    }

    #[tokio::test]
    async fn blocks_round_trip_in_order() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.load_summary_blocks("app-1").await.unwrap().is_empty());

        db.replace_summary_blocks("app-1", &blocks()).await.unwrap();
        assert_eq!(db.load_summary_blocks("app-1").await.unwrap(), blocks());
    }

    #[tokio::test]
    async fn replace_drops_blocks_missing_from_batch() {
        let db = Database::open_in_memory().unwrap();
        db.replace_summary_blocks("app-1", &blocks()).await.unwrap();
        db.replace_summary_blocks("app-1", &blocks()[..1]).await.unwrap();

        let stored = db.load_summary_blocks("app-1").await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, "app-1-0");
    }

    #[tokio::test]
    async fn duplicate_ids_roll_back_the_whole_batch() {
        let db = Database::open_in_memory().unwrap();
        db.replace_summary_blocks("app-1", &blocks()).await.unwrap();

        let mut batch = blocks();
        batch[1].id = batch[0].id.clone();
        assert!(db.replace_summary_blocks("app-1", &batch).await.is_err());
        assert_eq!(db.load_summary_blocks("app-1").await.unwrap(), blocks());
    }

    #[tokio::test]
    async fn records_are_listed_with_counts() {
        let db = Database::open_in_memory().unwrap();
        db.replace_summary_blocks("app-1", &blocks()).await.unwrap();

        let records = db.list_summary_records().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].record_id, "app-1");
        assert_eq!(records[0].block_count, 2);
        assert_eq!(records[0].versioned_count, 1);
    }

    #[tokio::test]
    async fn empty_and_whitespace_snapshots_are_not_counted_as_history() {
        let db = Database::open_in_memory().unwrap();
        let mut batch = blocks();
        batch.push(TextBlock::new("app-1-2", "Team").with_content("Two founders").with_previous(""));
        batch.push(
            TextBlock::new("app-1-3", "Market")
                .with_content("EU SMBs\n")
                .with_previous("  EU SMBs"),
        );
        db.replace_summary_blocks("app-1", &batch).await.unwrap();

        let records = db.list_summary_records().await.unwrap();
        assert_eq!(records[0].block_count, 4);
        assert_eq!(records[0].versioned_count, 1);
        assert_eq!(
            batch.iter().filter(|block| block.has_history()).count() as u64,
            records[0].versioned_count
        );
    }

    #[tokio::test]
    async fn persistence_reports_missing_record_as_none() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.load("nobody").await.unwrap(), None);

        db.persist("app-1", &blocks()).await.unwrap();
        assert_eq!(db.load("app-1").await.unwrap(), Some(blocks()));
    }
}
