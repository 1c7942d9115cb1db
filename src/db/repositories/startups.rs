use anyhow::{Context, Result};
use rusqlite::{params, Connection, Row};

use crate::{
    db::{helpers::parse_date, Database},
    models::{StartupData, TrackedField},
};

const STARTUP_COLUMNS: &str = "id, application_id, company_name, industry, location, founder_name, \
     founder_contact, round, amount_raising, valuation, stage, deal_lead, next_action, vc_notes, \
     key_insight, previous_key_insight, context, previous_context, date_accepted";

const INSERT_STARTUP: &str = "INSERT INTO startups (
        id, application_id, company_name, industry, location, founder_name,
        founder_contact, round, amount_raising, valuation, stage, deal_lead,
        next_action, vc_notes, key_insight, previous_key_insight, context,
        previous_context, date_accepted
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)";

fn row_to_startup(row: &Row) -> Result<StartupData> {
    let date_accepted: String = row.get("date_accepted")?;

    Ok(StartupData {
        id: row.get("id")?,
        application_id: row.get("application_id")?,
        company_name: row.get("company_name")?,
        industry: row.get("industry")?,
        location: row.get("location")?,
        founder_name: row.get("founder_name")?,
        founder_contact: row.get("founder_contact")?,
        round: row.get("round")?,
        amount_raising: row.get("amount_raising")?,
        valuation: row.get("valuation")?,
        stage: row.get("stage")?,
        deal_lead: row.get("deal_lead")?,
        next_action: row.get("next_action")?,
        vc_notes: row.get("vc_notes")?,
        key_insight: TrackedField {
            value: row.get("key_insight")?,
            previous: row.get("previous_key_insight")?,
        },
        context: TrackedField {
            value: row.get("context")?,
            previous: row.get("previous_context")?,
        },
        date_accepted: parse_date(&date_accepted, "date_accepted")?,
    })
}

fn write_startup(conn: &Connection, sql: &str, startup: &StartupData) -> Result<usize> {
    conn.execute(
        sql,
        params![
            startup.id,
            startup.application_id,
            startup.company_name,
            startup.industry,
            startup.location,
            startup.founder_name,
            startup.founder_contact,
            startup.round,
            startup.amount_raising,
            startup.valuation,
            startup.stage,
            startup.deal_lead,
            startup.next_action,
            startup.vc_notes,
            startup.key_insight.value,
            startup.key_insight.previous,
            startup.context.value,
            startup.context.previous,
            startup.date_accepted.format("%Y-%m-%d").to_string(),
        ],
    )
    .with_context(|| format!("failed to write startup {}", startup.id))
}

/// Inserts the startup unless one already exists for its id. Returns
/// whether a row was written.
pub(crate) fn insert_startup_if_missing(conn: &Connection, startup: &StartupData) -> Result<bool> {
    let sql = format!("{INSERT_STARTUP} ON CONFLICT(id) DO NOTHING");
    Ok(write_startup(conn, &sql, startup)? > 0)
}

impl Database {
    pub async fn upsert_startup(&self, startup: &StartupData) -> Result<()> {
        let record = startup.clone();
        self.execute(move |conn| {
            let sql = format!(
                "{INSERT_STARTUP}
                 ON CONFLICT(id) DO UPDATE SET
                    company_name = excluded.company_name,
                    industry = excluded.industry,
                    location = excluded.location,
                    founder_name = excluded.founder_name,
                    founder_contact = excluded.founder_contact,
                    round = excluded.round,
                    amount_raising = excluded.amount_raising,
                    valuation = excluded.valuation,
                    stage = excluded.stage,
                    deal_lead = excluded.deal_lead,
                    next_action = excluded.next_action,
                    vc_notes = excluded.vc_notes,
                    key_insight = excluded.key_insight,
                    previous_key_insight = excluded.previous_key_insight,
                    context = excluded.context,
                    previous_context = excluded.previous_context"
            );
            write_startup(conn, &sql, &record)?;
            Ok(())
        })
        .await
    }

    pub async fn get_startup(&self, startup_id: &str) -> Result<Option<StartupData>> {
        let startup_id = startup_id.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {STARTUP_COLUMNS} FROM startups WHERE id = ?1"
            ))?;
            let mut rows = stmt.query(params![startup_id])?;
            match rows.next()? {
                Some(row) => Ok(Some(row_to_startup(row)?)),
                None => Ok(None),
            }
        })
        .await
    }

    /// All startups, most recently accepted first.
    pub async fn list_startups(&self) -> Result<Vec<StartupData>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {STARTUP_COLUMNS} FROM startups ORDER BY date_accepted DESC, company_name"
            ))?;
            let mut rows = stmt.query([])?;
            let mut startups = Vec::new();
            while let Some(row) = rows.next()? {
                startups.push(row_to_startup(row)?);
            }
            Ok(startups)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::models::{ApplicationData, ApplicationStatus, NewApplication};

    async fn accepted(db: &Database, id: &str, day: u32) -> StartupData {
        let mut application = ApplicationData::from_submission(
            id,
            NewApplication {
                company_name: format!("Company {id}"),
                ..NewApplication::default()
            },
            Utc.with_ymd_and_hms(2026, 9, 1, 9, 0, 0).unwrap(),
        );
        let startup = application
            .set_status(
                ApplicationStatus::Accepted,
                Utc.with_ymd_and_hms(2026, 10, day, 9, 0, 0).unwrap(),
            )
            .unwrap();
        db.record_status_change(&application, Some(&startup)).await.unwrap();
        startup
    }

    #[tokio::test]
    async fn upsert_keeps_tracked_columns() {
        let db = Database::open_in_memory().unwrap();
        let mut startup = accepted(&db, "a1", 2).await;

        startup.valuation = "$15M".into();
        startup.context.commit("Term sheet expected next week");
        db.upsert_startup(&startup).await.unwrap();

        let stored = db.get_startup(&startup.id).await.unwrap().unwrap();
        assert_eq!(stored, startup);
        assert!(stored.context.has_history());
    }

    #[tokio::test]
    async fn insert_if_missing_leaves_existing_row() {
        let db = Database::open_in_memory().unwrap();
        let mut startup = accepted(&db, "a1", 2).await;
        startup.deal_lead = "Grace".into();
        db.upsert_startup(&startup).await.unwrap();

        let fresh = StartupData {
            deal_lead: String::new(),
            ..startup.clone()
        };
        let written = db
            .execute(move |conn| insert_startup_if_missing(conn, &fresh))
            .await
            .unwrap();
        assert!(!written);
        assert_eq!(db.get_startup(&startup.id).await.unwrap().unwrap().deal_lead, "Grace");
    }

    #[tokio::test]
    async fn startups_list_latest_acceptance_first() {
        let db = Database::open_in_memory().unwrap();
        accepted(&db, "early", 1).await;
        accepted(&db, "late", 9).await;

        let ids: Vec<String> = db
            .list_startups()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(ids, vec!["startup-late", "startup-early"]);
    }
}
