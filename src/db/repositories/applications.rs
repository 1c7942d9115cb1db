use anyhow::{Context, Result};
use rusqlite::{params, Connection, Row};

use crate::{
    db::{
        helpers::{parse_application_status, parse_datetime},
        repositories::startups::insert_startup_if_missing,
        Database,
    },
    models::{ApplicationData, StartupData, TrackedField},
};

const APPLICATION_COLUMNS: &str = "id, company_name, industry, location, founder_name, founder_contact, \
     email, startup_description, key_insight, previous_key_insight, status, created_at, updated_at";

fn row_to_application(row: &Row) -> Result<ApplicationData> {
    let status: String = row.get("status")?;
    let created_at: String = row.get("created_at")?;
    let updated_at: String = row.get("updated_at")?;

    Ok(ApplicationData {
        id: row.get("id")?,
        company_name: row.get("company_name")?,
        industry: row.get("industry")?,
        location: row.get("location")?,
        founder_name: row.get("founder_name")?,
        founder_contact: row.get("founder_contact")?,
        email: row.get("email")?,
        startup_description: row.get("startup_description")?,
        key_insight: TrackedField {
            value: row.get("key_insight")?,
            previous: row.get("previous_key_insight")?,
        },
        status: parse_application_status(&status)?,
        created_at: parse_datetime(&created_at, "created_at")?,
        updated_at: parse_datetime(&updated_at, "updated_at")?,
    })
}

fn upsert_application_row(conn: &Connection, application: &ApplicationData) -> Result<()> {
    conn.execute(
        "INSERT INTO applications (
            id, company_name, industry, location, founder_name, founder_contact,
            email, startup_description, key_insight, previous_key_insight,
            status, created_at, updated_at
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
         ON CONFLICT(id) DO UPDATE SET
            company_name = excluded.company_name,
            industry = excluded.industry,
            location = excluded.location,
            founder_name = excluded.founder_name,
            founder_contact = excluded.founder_contact,
            email = excluded.email,
            startup_description = excluded.startup_description,
            key_insight = excluded.key_insight,
            previous_key_insight = excluded.previous_key_insight,
            status = excluded.status,
            updated_at = excluded.updated_at",
        params![
            application.id,
            application.company_name,
            application.industry,
            application.location,
            application.founder_name,
            application.founder_contact,
            application.email,
            application.startup_description,
            application.key_insight.value,
            application.key_insight.previous,
            application.status.as_str(),
            application.created_at.to_rfc3339(),
            application.updated_at.to_rfc3339(),
        ],
    )
    .with_context(|| format!("failed to upsert application {}", application.id))?;
    Ok(())
}

impl Database {
    pub async fn upsert_application(&self, application: &ApplicationData) -> Result<()> {
        let record = application.clone();
        self.execute(move |conn| upsert_application_row(conn, &record))
            .await
    }

    pub async fn get_application(&self, application_id: &str) -> Result<Option<ApplicationData>> {
        let application_id = application_id.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {APPLICATION_COLUMNS} FROM applications WHERE id = ?1"
            ))?;
            let mut rows = stmt.query(params![application_id])?;
            match rows.next()? {
                Some(row) => Ok(Some(row_to_application(row)?)),
                None => Ok(None),
            }
        })
        .await
    }

    /// All applications, newest first.
    pub async fn list_applications(&self) -> Result<Vec<ApplicationData>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {APPLICATION_COLUMNS} FROM applications ORDER BY created_at DESC, id"
            ))?;
            let mut rows = stmt.query([])?;
            let mut applications = Vec::new();
            while let Some(row) = rows.next()? {
                applications.push(row_to_application(row)?);
            }
            Ok(applications)
        })
        .await
    }

    /// Stores a status change together with the startup it created, if any.
    /// Either both land or neither does. Returns whether a startup row was
    /// written; an existing one for the same application is kept.
    pub async fn record_status_change(
        &self,
        application: &ApplicationData,
        startup: Option<&StartupData>,
    ) -> Result<bool> {
        let application = application.clone();
        let startup = startup.cloned();
        self.execute(move |conn| {
            let tx = conn
                .transaction()
                .context("failed to begin status change transaction")?;
            upsert_application_row(&tx, &application)?;
            let written = match &startup {
                Some(startup) => insert_startup_if_missing(&tx, startup)?,
                None => false,
            };
            tx.commit().context("failed to commit status change")?;
            Ok(written)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::models::{ApplicationStatus, NewApplication};

    fn application(id: &str, day: u32) -> ApplicationData {
        ApplicationData::from_submission(
            id,
            NewApplication {
                company_name: format!("Company {id}"),
                key_insight: "Strong retention metrics in beta.".into(),
                ..NewApplication::default()
            },
            Utc.with_ymd_and_hms(2026, 10, day, 9, 0, 0).unwrap(),
        )
    }

    #[tokio::test]
    async fn applications_round_trip_with_tracked_insight() {
        let db = Database::open_in_memory().unwrap();
        let mut record = application("a1", 1);
        record.key_insight.commit("Pilot with a Fortune 500 retailer");
        db.upsert_application(&record).await.unwrap();

        let stored = db.get_application("a1").await.unwrap().unwrap();
        assert_eq!(stored, record);
        assert!(stored.key_insight.has_history());
        assert!(db.get_application("a404").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn applications_list_newest_first() {
        let db = Database::open_in_memory().unwrap();
        db.upsert_application(&application("early", 1)).await.unwrap();
        db.upsert_application(&application("late", 5)).await.unwrap();

        let ids: Vec<String> = db
            .list_applications()
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.id)
            .collect();
        assert_eq!(ids, vec!["late", "early"]);
    }

    #[tokio::test]
    async fn acceptance_stores_application_and_startup_together() {
        let db = Database::open_in_memory().unwrap();
        let mut record = application("a1", 1);
        db.upsert_application(&record).await.unwrap();

        let now = Utc.with_ymd_and_hms(2026, 10, 2, 9, 0, 0).unwrap();
        let startup = record.set_status(ApplicationStatus::Accepted, now).unwrap();
        assert!(db.record_status_change(&record, Some(&startup)).await.unwrap());

        let stored = db.get_application("a1").await.unwrap().unwrap();
        assert_eq!(stored.status, ApplicationStatus::Accepted);
        assert_eq!(db.get_startup("startup-a1").await.unwrap(), Some(startup));
    }

    #[tokio::test]
    async fn failed_startup_insert_rolls_back_status() {
        let db = Database::open_in_memory().unwrap();
        let mut record = application("a1", 1);
        db.upsert_application(&record).await.unwrap();

        let now = Utc.with_ymd_and_hms(2026, 10, 2, 9, 0, 0).unwrap();
        let mut startup = record.set_status(ApplicationStatus::Accepted, now).unwrap();
        // Points at an application that does not exist.
        startup.application_id = "a404".into();
        assert!(db.record_status_change(&record, Some(&startup)).await.is_err());

        let stored = db.get_application("a1").await.unwrap().unwrap();
        assert_eq!(stored.status, ApplicationStatus::Pending);
        assert!(db.get_startup("startup-a1").await.unwrap().is_none());
    }
}
