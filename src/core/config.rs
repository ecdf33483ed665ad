use std::collections::HashMap;
use std::env;
use std::path::Path;

/// Env file read by the CLI when no other path is given.
pub const DEFAULT_ENV_FILE: &str = "settings.env";

/// Page size used for `conversations.history` when none is configured.
pub const DEFAULT_PAGE_SIZE: u16 = 200;

/// Slack caps `conversations.history` pages at 1000 messages.
const MAX_PAGE_SIZE: u16 = 1000;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub slack_bot_token: String,
    pub history_page_size: u16,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read the config from the process environment, falling back to `path`.
    ///
    /// Variables already set in the environment win over the file. A missing
    /// file is treated as empty.
    pub fn from_env_file(path: &Path) -> Result<Self, String> {
        let file_vars = read_env_file(path)?;
        Self::from_lookup(|key| env::var(key).ok().or_else(|| file_vars.get(key).cloned()))
    }

    /// Build the config from any key lookup, e.g. a map in tests.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let slack_bot_token = lookup("SLACK_BOT_TOKEN")
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| "SLACK_BOT_TOKEN: environment variable not found".to_string())?;

        let history_page_size = match lookup("HISTORY_PAGE_SIZE") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|e| format!("HISTORY_PAGE_SIZE: {}", e))?
                .clamp(1, MAX_PAGE_SIZE),
            None => DEFAULT_PAGE_SIZE,
        };

        Ok(Self {
            slack_bot_token,
            history_page_size,
        })
    }
}

/// Parse a `KEY=value` env file without touching the process environment.
pub fn read_env_file(path: &Path) -> Result<HashMap<String, String>, String> {
    let iter = match dotenvy::from_path_iter(path) {
        Ok(iter) => iter,
        Err(e) if e.not_found() => return Ok(HashMap::new()),
        Err(e) => return Err(format!("{}: {}", path.display(), e)),
    };

    iter.map(|item| item.map_err(|e| format!("{}: {}", path.display(), e)))
        .collect()
}
