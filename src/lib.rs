//! Backscroll - fetch what a messaging channel received since a point in time.
//!
//! The crate pages backward through a channel's history, newest first, stops as
//! soon as it crosses the lower time boundary, and returns the messages inside
//! the window `(start, end]` in chronological order. It is meant to feed a
//! summarizer or archiver that asks "what was said since last time".
//!
//! # Architecture
//!
//! - `features::collect` owns traversal, window filtering and reordering
//! - `source` defines the session seam to a messaging platform
//! - `slack` implements that seam with slack-morphism and the Slack Web API
//! - Tokio for the async runtime
//!
//! # Example
//!
//! ```no_run
//! use backscroll::core::config::AppConfig;
//! use backscroll::slack::SlackSource;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     backscroll::setup_logging();
//!
//!     let config = AppConfig {
//!         slack_bot_token: "xoxb-dummy".to_string(),
//!         history_page_size: 200,
//!     };
//!     let source = SlackSource::from_config(&config);
//!
//!     let messages = backscroll::fetch_window(
//!         &source,
//!         "#general",
//!         "2025-10-18T00:00:00",
//!         Some("2025-10-19T00:00:00".into()),
//!     )
//!     .await?;
//!
//!     for message in &messages {
//!         println!("{} {}", message.date(), message.text());
//!     }
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod core;
pub mod errors;
pub mod features;
pub mod slack;
pub mod source;
pub mod utils;

pub use crate::core::models::{ChannelRef, Message, SourceMessage, TimestampInput};
pub use errors::FetchError;
pub use features::{PartialWindow, collect_window, fetch_window, fetch_window_partial};
pub use source::{ChannelSession, SessionProvider};

/// Configure structured JSON logging on stderr.
///
/// Stdout stays free for command output. Calling this more than once is a no-op.
///
/// # Example
///
/// ```
/// backscroll::setup_logging();
/// ```
pub fn setup_logging() {
    use tracing_subscriber::prelude::*;
    let fmt_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_target(true)
        .with_writer(std::io::stderr);

    let _ = tracing_subscriber::registry().with(fmt_layer).try_init();
}
