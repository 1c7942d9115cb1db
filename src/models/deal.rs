//! Applications in the intake pipeline and the startups they turn into.
//!
//! Free-text columns that reviewers revise over time (`keyInsight`,
//! `context`) are [`TrackedField`]s so the dashboard can show what changed.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::TrackedField;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Accepted,
    Rejected,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Rejected => "rejected",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(ApplicationStatus::Pending),
            "accepted" => Some(ApplicationStatus::Accepted),
            "rejected" => Some(ApplicationStatus::Rejected),
            _ => None,
        }
    }

    /// Dashboard order: pending first, then rejected, then accepted.
    pub fn sort_rank(&self) -> u8 {
        match self {
            ApplicationStatus::Pending => 0,
            ApplicationStatus::Rejected => 1,
            ApplicationStatus::Accepted => 2,
        }
    }
}

/// Fields a founder submits; everything else is filled in on creation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct NewApplication {
    pub company_name: String,
    pub industry: String,
    pub location: String,
    pub founder_name: String,
    pub founder_contact: String,
    pub email: String,
    pub startup_description: String,
    pub key_insight: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationData {
    pub id: String,
    pub company_name: String,
    pub industry: String,
    pub location: String,
    pub founder_name: String,
    pub founder_contact: String,
    pub email: String,
    pub startup_description: String,
    pub key_insight: TrackedField,
    pub status: ApplicationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ApplicationData {
    pub fn from_submission(id: impl Into<String>, submission: NewApplication, now: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            company_name: submission.company_name,
            industry: submission.industry,
            location: submission.location,
            founder_name: submission.founder_name,
            founder_contact: submission.founder_contact,
            email: submission.email,
            startup_description: submission.startup_description,
            key_insight: TrackedField::new(submission.key_insight),
            status: ApplicationStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn matches_query(&self, query: &str) -> bool {
        let needle = query.to_lowercase();
        [
            self.company_name.as_str(),
            self.founder_name.as_str(),
            self.industry.as_str(),
            self.status.as_str(),
            self.location.as_str(),
        ]
        .iter()
        .any(|value| value.to_lowercase().contains(&needle))
    }

    /// Moves the application to `status`. Returns the startup entry when
    /// this is the application's first acceptance.
    pub fn set_status(&mut self, status: ApplicationStatus, now: DateTime<Utc>) -> Option<StartupData> {
        let previous = self.status;
        self.status = status;
        self.updated_at = now;

        (status == ApplicationStatus::Accepted && previous != ApplicationStatus::Accepted)
            .then(|| StartupData::from_application(self, previous, now.date_naive()))
    }
}

/// Stable sort into dashboard order, keeping the incoming order per status.
pub fn sort_applications(applications: &mut [ApplicationData]) {
    applications.sort_by_key(|application| application.status.sort_rank());
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StartupData {
    pub id: String,
    pub application_id: String,
    pub company_name: String,
    pub industry: String,
    pub location: String,
    pub founder_name: String,
    pub founder_contact: String,
    pub round: String,
    pub amount_raising: String,
    pub valuation: String,
    pub stage: String,
    pub deal_lead: String,
    pub next_action: String,
    pub vc_notes: String,
    pub key_insight: TrackedField,
    pub context: TrackedField,
    pub date_accepted: NaiveDate,
}

impl StartupData {
    pub fn startup_id(application_id: &str) -> String {
        format!("startup-{application_id}")
    }

    pub fn from_application(
        application: &ApplicationData,
        previous_status: ApplicationStatus,
        date_accepted: NaiveDate,
    ) -> Self {
        Self {
            id: Self::startup_id(&application.id),
            application_id: application.id.clone(),
            company_name: application.company_name.clone(),
            industry: application.industry.clone(),
            location: application.location.clone(),
            founder_name: application.founder_name.clone(),
            founder_contact: application.founder_contact.clone(),
            round: String::new(),
            amount_raising: String::new(),
            valuation: String::new(),
            stage: String::new(),
            deal_lead: String::new(),
            next_action: String::new(),
            vc_notes: String::new(),
            key_insight: TrackedField::new(application.key_insight.value.clone()),
            context: TrackedField::new(format!(
                "Manually accepted from Application dashboard. Previous status: {}.",
                previous_status.as_str()
            )),
            date_accepted,
        }
    }

    pub fn matches_query(&self, query: &str) -> bool {
        let needle = query.to_lowercase();
        self.company_name.to_lowercase().contains(&needle)
            || self.context.value.to_lowercase().contains(&needle)
    }
}
