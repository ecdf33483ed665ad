use slack_morphism::errors::SlackClientError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Malformed timestamp, expected ISO-8601: {0}")]
    MalformedTimestamp(String),

    #[error("Failed to resolve channel: {0}")]
    ChannelResolution(String),

    #[error("Failed to read channel history: {0}")]
    Transport(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl From<SlackClientError> for FetchError {
    fn from(error: SlackClientError) -> Self {
        FetchError::Transport(error.to_string())
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(error: reqwest::Error) -> Self {
        FetchError::Transport(error.to_string())
    }
}
