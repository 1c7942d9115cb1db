pub mod config;
pub mod db;
pub mod deals;
pub mod diff;
pub mod meetings;
pub mod models;
pub mod notebook;
pub mod review;
pub mod settings;
mod utils;

use std::{path::PathBuf, sync::Arc};

use anyhow::{anyhow, Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};

use config::AppConfig;
use db::Database;
use deals::commands::{
    apply_review, create_application, list_applications, list_startups, set_application_status,
};
use diff::{render_inline, summarize};
use models::{ApplicationStatus, NewApplication, RecordKind};
use notebook::{
    commands::{
        compute_text_diff, get_block_history, get_notebook_view, get_summaries, list_notebooks,
        save_summaries,
    },
    NotebookSession, SummaryStore,
};
use review::ChangeSuggestion;
use settings::{NotebookSettings, SettingsStore};

const ENABLE_LOGS: bool = true;

/// Shared handles every command works against.
pub struct AppState {
    pub(crate) db: Database,
    pub(crate) summaries: SummaryStore,
    pub(crate) settings: Arc<SettingsStore>,
}

impl AppState {
    pub fn new(db: Database, settings: Arc<SettingsStore>) -> Self {
        let summaries = SummaryStore::new(Arc::new(db.clone()), settings.clone());
        Self {
            db,
            summaries,
            settings,
        }
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }
}

pub fn get_notebook_settings(state: &AppState) -> Result<NotebookSettings, String> {
    Ok(state.settings().notebook())
}

pub fn set_notebook_settings(state: &AppState, settings: NotebookSettings) -> Result<(), String> {
    state
        .settings()
        .update_notebook(settings)
        .map_err(|e| format!("{e:#}"))?;
    log_info!(
        "Notebook settings updated: serialize_saves={}, track_history={}",
        settings.serialize_saves,
        settings.track_history
    );
    Ok(())
}

#[cfg(test)]
pub(crate) fn scratch_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("dealnotes-test-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).expect("scratch directory");
    dir
}

#[cfg(test)]
pub(crate) fn test_settings() -> Arc<SettingsStore> {
    Arc::new(SettingsStore::new(scratch_dir().join("settings.json")).expect("settings store"))
}

#[cfg(test)]
pub(crate) fn test_state() -> AppState {
    let db = Database::open_in_memory().expect("in-memory database");
    AppState::new(db, test_settings())
}

fn parse_record_kind(raw: &str) -> Result<RecordKind, String> {
    raw.parse().map_err(|e: anyhow::Error| e.to_string())
}

fn parse_application_status(raw: &str) -> Result<ApplicationStatus, String> {
    ApplicationStatus::parse(raw)
        .ok_or_else(|| format!("expected pending, accepted or rejected, got '{raw}'"))
}

fn record_args(command: Command) -> Command {
    command
        .arg(Arg::new("record-id").required(true).help("Application or startup id"))
        .arg(
            Arg::new("kind")
                .required(true)
                .value_parser(parse_record_kind)
                .help("Record kind: application or startup"),
        )
}

fn section_arg() -> Arg {
    Arg::new("section")
        .required(true)
        .value_parser(value_parser!(usize))
        .help("Zero-based section index")
}

pub fn cli() -> Command {
    Command::new("dealnotes")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Deal-flow notebook with versioned notes and word-level history")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("diff")
                .about("Word-level diff of two texts")
                .arg(Arg::new("old").required(true))
                .arg(Arg::new("new").required(true)),
        )
        .subcommand(
            record_args(Command::new("show").about("Show a record's note sections"))
                .arg(Arg::new("query").help("Only sections whose title or content match")),
        )
        .subcommand(
            record_args(Command::new("edit").about("Replace one section and save"))
                .arg(section_arg())
                .arg(
                    Arg::new("content")
                        .required(true)
                        .num_args(1..)
                        .allow_hyphen_values(true)
                        .help("New section content"),
                ),
        )
        .subcommand(
            record_args(Command::new("history").about("Diff a section against its snapshot"))
                .arg(section_arg()),
        )
        .subcommand(Command::new("records").about("List records with stored notes"))
        .subcommand(Command::new("meetings").about("List meetings, newest first"))
        .subcommand(
            Command::new("applications")
                .about("List applications in dashboard order")
                .arg(Arg::new("query").help("Filter by company, founder, industry, status or location")),
        )
        .subcommand(
            Command::new("add-application")
                .about("Register a new application")
                .arg(Arg::new("company").required(true))
                .arg(Arg::new("industry").long("industry"))
                .arg(Arg::new("location").long("location"))
                .arg(Arg::new("founder").long("founder"))
                .arg(Arg::new("insight").long("insight").help("Key insight")),
        )
        .subcommand(
            Command::new("status")
                .about("Move an application to pending, accepted or rejected")
                .arg(Arg::new("application-id").required(true))
                .arg(
                    Arg::new("status")
                        .required(true)
                        .value_parser(parse_application_status),
                ),
        )
        .subcommand(
            Command::new("startups")
                .about("List startups, latest acceptance first")
                .arg(Arg::new("query").help("Filter by company name or context")),
        )
        .subcommand(
            Command::new("review")
                .about("Apply a decided post-meeting review to a startup")
                .arg(Arg::new("startup-id").required(true))
                .arg(
                    Arg::new("file")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("JSON list of suggestions"),
                ),
        )
        .subcommand(
            Command::new("settings")
                .about("Show or change notebook settings")
                .arg(
                    Arg::new("track-history")
                        .long("track-history")
                        .value_parser(value_parser!(bool))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("serialize-saves")
                        .long("serialize-saves")
                        .value_parser(value_parser!(bool))
                        .action(ArgAction::Set),
                ),
        )
}

fn required<'a, T>(args: &'a ArgMatches, id: &str) -> Result<&'a T>
where
    T: Clone + Send + Sync + 'static,
{
    args.get_one::<T>(id)
        .ok_or_else(|| anyhow!("missing argument <{id}>"))
}

fn block_id_at(blocks: &[models::TextBlock], index: usize) -> Result<String> {
    blocks
        .get(index)
        .map(|block| block.id.clone())
        .ok_or_else(|| anyhow!("section index {index} out of range (0..{})", blocks.len()))
}

async fn dispatch(state: &AppState, matches: &ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("diff", args)) => {
            let old_text = required::<String>(args, "old")?.clone();
            let new_text = required::<String>(args, "new")?.clone();
            let tokens = compute_text_diff(old_text, new_text);
            let summary = summarize(&tokens);
            println!("{}", render_inline(&tokens));
            println!(
                "{} same, {} added, {} removed",
                summary.same, summary.added, summary.removed
            );
        }
        Some(("show", args)) => {
            let record_id = required::<String>(args, "record-id")?.clone();
            let kind = *required::<RecordKind>(args, "kind")?;
            let query = args.get_one::<String>("query").cloned();
            let fields = get_notebook_view(state, record_id, kind, query)
                .await
                .map_err(|e| anyhow!(e))?;
            for field in fields {
                let marker = if field.show_history_indicator { " (history)" } else { "" };
                println!("[{}] {}{}", field.id, field.title, marker);
                if !field.content.is_empty() {
                    println!("    {}", field.content);
                }
            }
        }
        Some(("edit", args)) => {
            let record_id = required::<String>(args, "record-id")?.clone();
            let kind = *required::<RecordKind>(args, "kind")?;
            let index = *required::<usize>(args, "section")?;
            let content = args
                .get_many::<String>("content")
                .map(|words| words.cloned().collect::<Vec<_>>().join(" "))
                .unwrap_or_default();

            let blocks = get_summaries(state, record_id.clone(), kind)
                .await
                .map_err(|e| anyhow!(e))?;
            let block_id = block_id_at(&blocks, index)?;
            let mut session = NotebookSession::new(record_id.clone(), blocks);
            session.edit(&block_id, content);

            if !session.has_unsaved_changes() {
                println!("No changes to save");
                return Ok(());
            }

            let saved = save_summaries(state, record_id, session.save_batch())
                .await
                .map_err(|e| anyhow!(e))?;
            session.mark_saved(saved);
            println!("Saved {block_id}: {:?}", session.field_state(&block_id));
        }
        Some(("history", args)) => {
            let record_id = required::<String>(args, "record-id")?.clone();
            let kind = *required::<RecordKind>(args, "kind")?;
            let index = *required::<usize>(args, "section")?;
            let blocks = get_summaries(state, record_id.clone(), kind)
                .await
                .map_err(|e| anyhow!(e))?;
            let block_id = block_id_at(&blocks, index)?;

            match get_block_history(state, record_id, kind, block_id)
                .await
                .map_err(|e| anyhow!(e))?
            {
                Some(tokens) => println!("{}", render_inline(&tokens)),
                None => println!("No history"),
            }
        }
        Some(("records", _)) => {
            for record in list_notebooks(state).await.map_err(|e| anyhow!(e))? {
                println!(
                    "{}  {} sections, {} with history, saved {}",
                    record.record_id,
                    record.block_count,
                    record.versioned_count,
                    record.updated_at.to_rfc3339()
                );
            }
        }
        Some(("meetings", _)) => {
            for meeting in meetings::commands::list_meetings(state)
                .await
                .map_err(|e| anyhow!(e))?
            {
                println!(
                    "{}  {}  {}  {}",
                    meeting.id,
                    meeting.vc_id,
                    meeting.status.as_str(),
                    meeting.start_time
                );
            }
        }
        Some(("applications", args)) => {
            let query = args.get_one::<String>("query").cloned();
            for application in list_applications(state, query).await.map_err(|e| anyhow!(e))? {
                let marker = if application.key_insight.has_history() { " (history)" } else { "" };
                println!(
                    "{}  {:<8}  {}  {}{}",
                    application.id,
                    application.status.as_str(),
                    application.company_name,
                    application.industry,
                    marker
                );
            }
        }
        Some(("add-application", args)) => {
            let optional = |id: &str| args.get_one::<String>(id).cloned().unwrap_or_default();
            let submission = NewApplication {
                company_name: required::<String>(args, "company")?.clone(),
                industry: optional("industry"),
                location: optional("location"),
                founder_name: optional("founder"),
                key_insight: optional("insight"),
                ..NewApplication::default()
            };
            let application = create_application(state, submission)
                .await
                .map_err(|e| anyhow!(e))?;
            println!("Created {}", application.id);
        }
        Some(("status", args)) => {
            let application_id = required::<String>(args, "application-id")?.clone();
            let status = *required::<ApplicationStatus>(args, "status")?;
            let change = set_application_status(state, application_id, status)
                .await
                .map_err(|e| anyhow!(e))?;
            println!("{} is now {}", change.application.id, change.application.status.as_str());
            if let Some(startup) = change.created_startup {
                println!("Added startup {}", startup.id);
            }
        }
        Some(("startups", args)) => {
            let query = args.get_one::<String>("query").cloned();
            for startup in list_startups(state, query).await.map_err(|e| anyhow!(e))? {
                println!(
                    "{}  {}  accepted {}",
                    startup.id, startup.company_name, startup.date_accepted
                );
                if !startup.context.value.is_empty() {
                    println!("    {}", startup.context.value);
                }
            }
        }
        Some(("review", args)) => {
            let startup_id = required::<String>(args, "startup-id")?.clone();
            let path = required::<PathBuf>(args, "file")?;
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read review file {}", path.display()))?;
            let suggestions: Vec<ChangeSuggestion> = serde_json::from_str(&contents)
                .with_context(|| format!("malformed review file {}", path.display()))?;

            let startup = apply_review(state, startup_id, suggestions)
                .await
                .map_err(|e| anyhow!(e))?;
            println!("Updated {}", startup.id);
        }
        Some(("settings", args)) => {
            let mut settings = get_notebook_settings(state).map_err(|e| anyhow!(e))?;
            let track_history = args.get_one::<bool>("track-history").copied();
            let serialize_saves = args.get_one::<bool>("serialize-saves").copied();

            if track_history.is_some() || serialize_saves.is_some() {
                settings.track_history = track_history.unwrap_or(settings.track_history);
                settings.serialize_saves = serialize_saves.unwrap_or(settings.serialize_saves);
                set_notebook_settings(state, settings).map_err(|e| anyhow!(e))?;
            }
            println!(
                "track-history={} serialize-saves={}",
                settings.track_history, settings.serialize_saves
            );
        }
        Some((other, _)) => return Err(anyhow!("unknown command {other}")),
        None => return Err(anyhow!("no command given")),
    }

    Ok(())
}

pub fn run() -> Result<()> {
    let matches = cli().get_matches();
    let config = AppConfig::from_env();

    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_default_env()
        .filter_level(if config.debug {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .init();

    log_debug!("Using data directory {}", config.data_dir.display());

    std::fs::create_dir_all(&config.data_dir).with_context(|| {
        format!("failed to create data directory {}", config.data_dir.display())
    })?;

    let database = Database::new(config.db_path())?;
    let settings = Arc::new(SettingsStore::new(config.settings_path())?);
    let state = AppState::new(database, settings);

    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;

    let result = runtime.block_on(dispatch(&state, &matches));
    if let Err(err) = &result {
        log_error!("Command failed: {err:#}");
    }
    result
}
