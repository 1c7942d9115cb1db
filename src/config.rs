use std::path::PathBuf;

const DATA_DIR_ENV: &str = "DEALNOTES_DATA_DIR";
const DEBUG_ENV: &str = "DEALNOTES_DEBUG";
const DEFAULT_DATA_DIR: &str = ".dealnotes";

/// Process-level configuration resolved from the environment at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub debug: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_vars(
            std::env::var(DATA_DIR_ENV).ok(),
            std::env::var(DEBUG_ENV).ok(),
        )
    }

    fn from_vars(data_dir: Option<String>, debug: Option<String>) -> Self {
        let data_dir = data_dir
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
        let debug = debug
            .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Self { data_dir, debug }
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("dealnotes.sqlite3")
    }

    pub fn settings_path(&self) -> PathBuf {
        self.data_dir.join("settings.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_env() {
        let config = AppConfig::from_vars(None, None);
        assert_eq!(config.data_dir, PathBuf::from(".dealnotes"));
        assert!(!config.debug);
        assert_eq!(config.db_path(), PathBuf::from(".dealnotes/dealnotes.sqlite3"));
    }

    #[test]
    fn env_values_override_defaults() {
        let config = AppConfig::from_vars(Some("/var/lib/dealnotes".into()), Some("TRUE".into()));
        assert_eq!(config.settings_path(), PathBuf::from("/var/lib/dealnotes/settings.json"));
        assert!(config.debug);

        let blank = AppConfig::from_vars(Some("  ".into()), Some("0".into()));
        assert_eq!(blank.data_dir, PathBuf::from(".dealnotes"));
        assert!(!blank.debug);
    }
}
