//! Process configuration from environment variables.

use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 4170;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// TCP port to listen on (`PORT`).
    pub port: u16,
    /// Optional question catalog override (`QUESTIONS_FILE`); the embedded
    /// catalog is used when unset.
    pub questions_file: Option<PathBuf>,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let questions_file = std::env::var("QUESTIONS_FILE")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);

        Self {
            port,
            questions_file,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            questions_file: None,
        }
    }
}
