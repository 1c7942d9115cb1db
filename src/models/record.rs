use std::{fmt, str::FromStr};

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use super::TextBlock;

pub const APPLICATION_SUMMARY_SECTIONS: [&str; 6] = [
    "Financial Due Diligence",
    "Customer Due Diligence",
    "Tech Due Diligence",
    "Legal Due Diligence",
    "Founders Notes",
    "Company Notes",
];

pub const STARTUP_SUMMARY_SECTIONS: [&str; 6] = [
    "Monthly Updates",
    "Board Meeting Minutes",
    "Key Metrics (KPIs)",
    "Hiring Needs",
    "Cap Table Changes",
    "Product Roadmap",
];

/// Kind of record a notebook belongs to; decides its fixed sections.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum RecordKind {
    Application,
    Startup,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Application => "application",
            RecordKind::Startup => "startup",
        }
    }

    pub fn sections(&self) -> &'static [&'static str] {
        match self {
            RecordKind::Application => &APPLICATION_SUMMARY_SECTIONS,
            RecordKind::Startup => &STARTUP_SUMMARY_SECTIONS,
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordKind {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "application" => Ok(RecordKind::Application),
            "startup" => Ok(RecordKind::Startup),
            other => Err(anyhow!("unknown record kind '{other}'")),
        }
    }
}

/// Empty blocks for every section of `kind`, with ids `"{record_id}-{index}"`.
pub fn generate_empty_summaries(record_id: &str, kind: RecordKind) -> Vec<TextBlock> {
    kind.sections()
        .iter()
        .enumerate()
        .map(|(idx, title)| TextBlock::new(format!("{record_id}-{idx}"), *title))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn application_notebook_has_six_empty_sections() {
        let blocks = generate_empty_summaries("app-42", RecordKind::Application);
        assert_eq!(blocks.len(), 6);
        assert_eq!(blocks[0].id, "app-42-0");
        assert_eq!(blocks[0].title, "Financial Due Diligence");
        assert_eq!(blocks[5].id, "app-42-5");
        assert!(blocks
            .iter()
            .all(|b| b.content.is_empty() && b.previous_content.is_none()));
    }

    #[test]
    fn startup_notebook_uses_portfolio_sections() {
        let titles: Vec<String> = generate_empty_summaries("s-1", RecordKind::Startup)
            .into_iter()
            .map(|b| b.title)
            .collect();
        assert_eq!(titles, STARTUP_SUMMARY_SECTIONS);
    }

    #[test]
    fn kind_parses_from_its_own_name() {
        for kind in [RecordKind::Application, RecordKind::Startup] {
            assert_eq!(kind.as_str().parse::<RecordKind>().unwrap(), kind);
        }
        assert!("meeting".parse::<RecordKind>().is_err());
    }
}
