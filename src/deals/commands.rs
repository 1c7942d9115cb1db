//! Application and startup commands exposed to the UI shell.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    log_info, log_warn,
    models::{
        sort_applications, ApplicationData, ApplicationStatus, NewApplication, StartupData,
    },
    review::{ChangeSuggestion, ReviewSession},
    AppState,
};

const ENABLE_LOGS: bool = true;

/// Outcome of a status change: the updated application and, on first
/// acceptance, the startup entry it produced.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StatusChange {
    pub application: ApplicationData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_startup: Option<StartupData>,
}

pub async fn create_application(
    state: &AppState,
    submission: NewApplication,
) -> Result<ApplicationData, String> {
    if submission.company_name.trim().is_empty() {
        return Err("company name is required".into());
    }

    let application =
        ApplicationData::from_submission(format!("app-{}", Uuid::new_v4()), submission, Utc::now());
    state
        .db
        .upsert_application(&application)
        .await
        .map_err(|e| format!("{e:#}"))?;

    log_info!("Created application {} for {}", application.id, application.company_name);
    Ok(application)
}

/// Applications matching `query`, in dashboard order.
pub async fn list_applications(
    state: &AppState,
    query: Option<String>,
) -> Result<Vec<ApplicationData>, String> {
    let query = query.unwrap_or_default();
    let mut applications: Vec<ApplicationData> = state
        .db
        .list_applications()
        .await
        .map_err(|e| format!("{e:#}"))?
        .into_iter()
        .filter(|application| application.matches_query(&query))
        .collect();
    sort_applications(&mut applications);
    Ok(applications)
}

pub async fn set_application_status(
    state: &AppState,
    application_id: String,
    status: ApplicationStatus,
) -> Result<StatusChange, String> {
    let mut application = state
        .db
        .get_application(&application_id)
        .await
        .map_err(|e| format!("{e:#}"))?
        .ok_or_else(|| format!("application {application_id} not found"))?;

    let candidate = application.set_status(status, Utc::now());
    let written = match state
        .db
        .record_status_change(&application, candidate.as_ref())
        .await
    {
        Ok(written) => written,
        Err(err) => {
            log_warn!("Status change for {application_id} failed, nothing stored: {err:#}");
            return Err(format!("{err:#}"));
        }
    };
    let created_startup = candidate.filter(|_| written);

    if let Some(startup) = &created_startup {
        log_info!("Application {application_id} accepted as {}", startup.id);
    }

    Ok(StatusChange {
        application,
        created_startup,
    })
}

pub async fn list_startups(
    state: &AppState,
    query: Option<String>,
) -> Result<Vec<StartupData>, String> {
    let query = query.unwrap_or_default();
    Ok(state
        .db
        .list_startups()
        .await
        .map_err(|e| format!("{e:#}"))?
        .into_iter()
        .filter(|startup| startup.matches_query(&query))
        .collect())
}

async fn load_startup(state: &AppState, startup_id: &str) -> Result<StartupData, String> {
    state
        .db
        .get_startup(startup_id)
        .await
        .map_err(|e| format!("{e:#}"))?
        .ok_or_else(|| format!("startup {startup_id} not found"))
}

pub async fn get_startup(state: &AppState, startup_id: String) -> Result<StartupData, String> {
    load_startup(state, &startup_id).await
}

/// Applies a finished post-meeting review to a startup.
pub async fn apply_review(
    state: &AppState,
    startup_id: String,
    suggestions: Vec<ChangeSuggestion>,
) -> Result<StartupData, String> {
    let mut startup = load_startup(state, &startup_id).await?;
    let review = ReviewSession::new(suggestions);
    let changed = review
        .apply_accepted(&mut startup)
        .map_err(|e| format!("{e:#}"))?;

    if changed > 0 {
        state
            .db
            .upsert_startup(&startup)
            .await
            .map_err(|e| format!("{e:#}"))?;
    }

    log_info!("Applied review to {startup_id} ({changed} fields changed)");
    Ok(startup)
}
