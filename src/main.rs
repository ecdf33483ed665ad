use anyhow::{Context, Result};
use backscroll::core::config::{AppConfig, DEFAULT_ENV_FILE};
use backscroll::core::models::{ChannelRef, TimestampInput};
use backscroll::errors::FetchError;
use backscroll::slack::SlackSource;
use backscroll::utils::filters::drop_empty_text;
use backscroll::utils::format::preview_line;
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(
    name = "backscroll",
    version,
    about = "Print the messages a channel received inside a time window"
)]
struct Cli {
    /// Channel ID, numeric ID or `#name`
    channel: String,

    /// Exclusive lower bound, ISO-8601 (naive values are UTC)
    #[arg(long)]
    since: String,

    /// Inclusive upper bound, ISO-8601
    #[arg(long)]
    until: Option<String>,

    /// Print the result as a JSON array
    #[arg(long)]
    json: bool,

    /// Drop messages without text
    #[arg(long)]
    skip_empty: bool,

    /// `KEY=value` file with credentials; skipped if it does not exist
    #[arg(long, default_value = DEFAULT_ENV_FILE)]
    env_file: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    backscroll::setup_logging();
    let cli = Cli::parse();

    let config = AppConfig::from_env_file(&cli.env_file).map_err(|e| {
        error!("Config error: {}", e);
        FetchError::Config(e)
    })?;
    let source = SlackSource::from_config(&config);

    let channel: ChannelRef = cli.channel.parse()?;
    let messages = backscroll::fetch_window(
        &source,
        channel,
        TimestampInput::from(cli.since),
        cli.until.map(TimestampInput::from),
    )
    .await
    .context("Failed to fetch channel window")?;

    let messages = if cli.skip_empty {
        drop_empty_text(messages)
    } else {
        messages
    };
    info!("Printing {} messages", messages.len());

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&messages)?);
    } else {
        for message in &messages {
            println!("{}", preview_line(message));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_file_defaults_to_settings_env() {
        let cli = Cli::try_parse_from(["backscroll", "#general", "--since", "2025-10-18"]).unwrap();
        assert_eq!(cli.env_file, PathBuf::from("settings.env"));
        assert!(cli.until.is_none());
    }

    #[test]
    fn test_env_file_flag() {
        let cli = Cli::try_parse_from([
            "backscroll",
            "-1001234",
            "--since",
            "2025-10-18T00:00:00",
            "--until",
            "2025-10-19T00:00:00",
            "--env-file",
            "/etc/backscroll.env",
            "--json",
        ])
        .unwrap();
        assert_eq!(cli.env_file, PathBuf::from("/etc/backscroll.env"));
        assert_eq!(cli.until.as_deref(), Some("2025-10-19T00:00:00"));
        assert!(cli.json);
    }
}
