//! Walkthrough of suggested field changes after a meeting.
//!
//! Each suggestion proposes a new value for one startup field. The reviewer
//! accepts or rejects them one by one (optionally editing the proposed
//! value first). Once nothing is left pending the accepted ones are written
//! onto the startup, with tracked fields keeping the replaced value.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::{
    diff::{compute_diff, DiffToken},
    models::StartupData,
};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SuggestionStatus {
    Pending,
    Accepted,
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChangeSuggestion {
    pub id: String,
    /// Record field the change targets, e.g. `keyInsight` or `context`.
    pub field: String,
    pub field_name: String,
    pub old_value: String,
    pub new_value: String,
    pub status: SuggestionStatus,
}

impl ChangeSuggestion {
    pub fn new(
        id: impl Into<String>,
        field: impl Into<String>,
        field_name: impl Into<String>,
        old_value: impl Into<String>,
        new_value: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            field: field.into(),
            field_name: field_name.into(),
            old_value: old_value.into(),
            new_value: new_value.into(),
            status: SuggestionStatus::Pending,
        }
    }

    pub fn diff(&self) -> Vec<DiffToken> {
        compute_diff(&self.old_value, &self.new_value)
    }

    /// Writes the proposed value onto the matching startup field and
    /// returns whether it changed anything.
    pub fn apply_to(&self, startup: &mut StartupData) -> Result<bool> {
        let value = self.new_value.as_str();
        let slot = match self.field.as_str() {
            "keyInsight" => return Ok(startup.key_insight.commit(value)),
            "context" => return Ok(startup.context.commit(value)),
            "valuation" => &mut startup.valuation,
            "round" => &mut startup.round,
            "amountRaising" => &mut startup.amount_raising,
            "stage" | "status" => &mut startup.stage,
            "dealLead" => &mut startup.deal_lead,
            "nextAction" => &mut startup.next_action,
            "vc_notes" | "vcNotes" => &mut startup.vc_notes,
            other => bail!("suggestion {} targets unknown field {other}", self.id),
        };

        if *slot == value {
            return Ok(false);
        }
        *slot = value.to_string();
        Ok(true)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReviewSession {
    suggestions: Vec<ChangeSuggestion>,
    active_index: usize,
}

impl ReviewSession {
    pub fn new(suggestions: Vec<ChangeSuggestion>) -> Self {
        Self {
            suggestions,
            active_index: 0,
        }
    }

    pub fn suggestions(&self) -> &[ChangeSuggestion] {
        &self.suggestions
    }

    pub fn active_index(&self) -> usize {
        self.active_index
    }

    pub fn focus(&mut self, index: usize) -> bool {
        if index < self.suggestions.len() {
            self.active_index = index;
            true
        } else {
            false
        }
    }

    /// Marks a suggestion and moves the focus one step forward unless the
    /// focus is already on the last suggestion.
    pub fn set_status(&mut self, id: &str, status: SuggestionStatus) -> bool {
        let Some(suggestion) = self.suggestions.iter_mut().find(|s| s.id == id) else {
            return false;
        };
        suggestion.status = status;

        if self.active_index + 1 < self.suggestions.len() {
            self.active_index += 1;
        }
        true
    }

    pub fn update_new_value(&mut self, id: &str, value: impl Into<String>) -> bool {
        match self.suggestions.iter_mut().find(|s| s.id == id) {
            Some(suggestion) => {
                suggestion.new_value = value.into();
                true
            }
            None => false,
        }
    }

    pub fn pending_count(&self) -> usize {
        self.suggestions
            .iter()
            .filter(|s| s.status == SuggestionStatus::Pending)
            .count()
    }

    /// Share of decided suggestions, in percent.
    pub fn progress(&self) -> f64 {
        if self.suggestions.is_empty() {
            return 0.0;
        }
        let decided = self.suggestions.len() - self.pending_count();
        decided as f64 / self.suggestions.len() as f64 * 100.0
    }

    pub fn can_finish(&self) -> bool {
        self.pending_count() == 0
    }

    pub fn finish(&self) -> Result<Vec<ChangeSuggestion>> {
        let pending = self.pending_count();
        if pending > 0 {
            bail!("{pending} suggestion(s) still pending review");
        }
        Ok(self
            .suggestions
            .iter()
            .filter(|s| s.status == SuggestionStatus::Accepted)
            .cloned()
            .collect())
    }

    /// Finishes the review and writes every accepted suggestion onto
    /// `startup`. Returns how many fields changed. Nothing is written when
    /// the review is unfinished or a suggestion targets an unknown field.
    pub fn apply_accepted(&self, startup: &mut StartupData) -> Result<usize> {
        let accepted = self.finish()?;
        let mut updated = startup.clone();
        let mut changed = 0;
        for suggestion in &accepted {
            if suggestion.apply_to(&mut updated)? {
                changed += 1;
            }
        }
        *startup = updated;
        Ok(changed)
    }
}
