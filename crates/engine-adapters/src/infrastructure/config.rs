//! Environment-driven configuration.
//!
//! `QUESTWRIGHT_DATA_DIR` points at a writable directory for the SQLite
//! database; when unset (or when the test flag is set) the engine runs on an
//! in-memory store.

use std::path::PathBuf;

pub const DATA_DIR_VAR: &str = "QUESTWRIGHT_DATA_DIR";
pub const IN_MEMORY_VAR: &str = "QUESTWRIGHT_IN_MEMORY";

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// None means an in-memory store
    pub data_dir: Option<PathBuf>,
    /// Bind address for the optional WebSocket listener
    pub ws_bind: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let in_memory = std::env::var(IN_MEMORY_VAR)
            .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        let data_dir = if in_memory {
            None
        } else {
            std::env::var(DATA_DIR_VAR).ok().map(PathBuf::from)
        };
        let ws_bind = std::env::var("QUESTWRIGHT_WS_BIND").ok();
        Self { data_dir, ws_bind }
    }

    pub fn in_memory() -> Self {
        Self {
            data_dir: None,
            ws_bind: None,
        }
    }

    /// SQLite connection URL for this configuration.
    pub fn database_url(&self) -> String {
        match &self.data_dir {
            Some(dir) => format!(
                "sqlite://{}?mode=rwc",
                dir.join("questwright.db").display()
            ),
            None => "sqlite::memory:".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_url() {
        assert_eq!(AppConfig::in_memory().database_url(), "sqlite::memory:");
    }

    #[test]
    fn test_file_backed_url() {
        let config = AppConfig {
            data_dir: Some(PathBuf::from("/tmp/qw")),
            ws_bind: None,
        };
        assert_eq!(
            config.database_url(),
            "sqlite:///tmp/qw/questwright.db?mode=rwc"
        );
    }
}
