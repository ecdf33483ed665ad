use futures::{Stream, StreamExt};
use tracing::{debug, info, warn};

use crate::core::models::{ChannelRef, Message, SourceMessage, TimestampInput};
use crate::core::window::{Position, Window};
use crate::errors::FetchError;
use crate::source::{ChannelSession, SessionProvider};

/// Messages collected before a fetch stopped, plus the failure that stopped it.
#[derive(Debug)]
pub struct PartialWindow {
    /// Ascending by timestamp, like a complete result.
    pub messages: Vec<Message>,
    pub error: Option<FetchError>,
    /// Messages pulled from the source, including skipped ones.
    pub examined: usize,
    /// Traversal stopped at a message at or before the window start.
    pub stopped_early: bool,
}

impl PartialWindow {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }

    /// Convert to the all-or-nothing form.
    ///
    /// # Errors
    ///
    /// Returns the failure that interrupted the fetch, discarding partial messages.
    pub fn into_result(self) -> Result<Vec<Message>, FetchError> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.messages),
        }
    }
}

/// Fetch the messages of `channel` posted in `(start, end]`, oldest first.
///
/// Boundaries are validated before the session is opened. The session is
/// closed whether the fetch succeeds or fails.
///
/// # Errors
///
/// - `FetchError::MalformedTimestamp` if `start` or `end` is not ISO-8601
/// - `FetchError::ChannelResolution` if the channel cannot be resolved
/// - `FetchError::Transport` if the session or the history stream fails
pub async fn fetch_window<P>(
    provider: &P,
    channel: impl Into<ChannelRef>,
    start: impl Into<TimestampInput>,
    end: Option<TimestampInput>,
) -> Result<Vec<Message>, FetchError>
where
    P: SessionProvider,
{
    fetch_window_partial(provider, channel, start, end)
        .await?
        .into_result()
}

/// Like [`fetch_window`], but keeps the messages collected before a history
/// failure instead of discarding them.
///
/// # Errors
///
/// Boundary, session and resolution failures are returned as `Err` since
/// nothing has been collected yet. History failures land in `PartialWindow::error`.
pub async fn fetch_window_partial<P>(
    provider: &P,
    channel: impl Into<ChannelRef>,
    start: impl Into<TimestampInput>,
    end: Option<TimestampInput>,
) -> Result<PartialWindow, FetchError>
where
    P: SessionProvider,
{
    let window = Window::from_inputs(&start.into(), end.as_ref())?;
    let channel = channel.into();

    if window.is_empty() {
        warn!(
            "Window end {:?} is not after start {}; result will be empty",
            window.end(),
            window.start()
        );
    }

    let session = provider.open().await?;
    let outcome = collect_from_session(&session, &channel, &window).await;
    session.close().await;

    outcome
}

async fn collect_from_session<S>(
    session: &S,
    channel: &ChannelRef,
    window: &Window,
) -> Result<PartialWindow, FetchError>
where
    S: ChannelSession,
{
    let handle = session.resolve(channel).await?;
    let outcome = scan(session.messages(&handle), window).await;

    match &outcome.error {
        Some(e) => warn!(
            "History of channel {} failed after {} examined messages ({} kept): {}",
            channel,
            outcome.examined,
            outcome.messages.len(),
            e
        ),
        None => info!(
            "Collected {} of {} examined messages from channel {} after {} (stopped early: {})",
            outcome.messages.len(),
            outcome.examined,
            channel,
            window.start(),
            outcome.stopped_early
        ),
    }

    Ok(outcome)
}

/// Apply the window to a newest-first message stream.
///
/// Stops pulling from the stream at the first message at or before the window
/// start.
///
/// # Errors
///
/// Returns the first error yielded by the stream.
pub async fn collect_window<S>(messages: S, window: &Window) -> Result<Vec<Message>, FetchError>
where
    S: Stream<Item = Result<SourceMessage, FetchError>>,
{
    scan(messages, window).await.into_result()
}

async fn scan<S>(messages: S, window: &Window) -> PartialWindow
where
    S: Stream<Item = Result<SourceMessage, FetchError>>,
{
    let mut messages = std::pin::pin!(messages);
    let mut collected = Vec::new();
    let mut examined = 0usize;
    let mut stopped_early = false;
    let mut error = None;

    while let Some(item) = messages.next().await {
        let message = match item {
            Ok(message) => message,
            Err(e) => {
                error = Some(e);
                break;
            }
        };
        examined += 1;

        let Some(timestamp) = message.timestamp else {
            debug!("Skipping message without a timestamp");
            continue;
        };

        match window.position(timestamp) {
            Position::AtOrBeforeStart => {
                debug!("Reached {} at or before window start, stopping", timestamp);
                stopped_early = true;
                break;
            }
            Position::AfterEnd => continue,
            Position::Inside(utc) => {
                collected.push(Message::new(utc, message.text.unwrap_or_default()));
            }
        }
    }

    collected.reverse();
    PartialWindow {
        messages: collected,
        error,
        examined,
        stopped_early,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, FixedOffset, TimeZone, Utc};
    use futures::stream;

    fn at(d: u32, h: u32) -> DateTime<FixedOffset> {
        Utc.with_ymd_and_hms(2025, 10, d, h, 0, 0).unwrap().fixed_offset()
    }

    fn msg(
        ts: Option<DateTime<FixedOffset>>,
        text: Option<&str>,
    ) -> Result<SourceMessage, FetchError> {
        Ok(SourceMessage {
            timestamp: ts,
            text: text.map(str::to_string),
        })
    }

    fn window(start: DateTime<FixedOffset>, end: Option<DateTime<FixedOffset>>) -> Window {
        Window::new(start.with_timezone(&Utc), end.map(|e| e.with_timezone(&Utc)))
    }

    #[tokio::test]
    async fn test_skips_messages_without_timestamp_or_text() {
        let history = stream::iter(vec![
            msg(Some(at(19, 3)), None),
            msg(None, Some("service message")),
            msg(Some(at(19, 1)), Some("hello")),
            msg(Some(at(18, 0)), Some("old")),
        ]);

        let result = collect_window(history, &window(at(18, 12), None)).await.unwrap();
        let texts: Vec<_> = result.iter().map(|m| m.text()).collect();
        assert_eq!(texts, vec!["hello", ""]);
    }

    #[tokio::test]
    async fn test_stops_pulling_after_start_boundary() {
        let history = stream::iter(vec![
            msg(Some(at(19, 1)), Some("in")),
            msg(Some(at(18, 0)), Some("boundary")),
            Err(FetchError::Transport("must not be reached".into())),
        ]);

        let result = collect_window(history, &window(at(18, 0), None)).await.unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].text(), "in");
    }

    #[tokio::test]
    async fn test_ties_keep_reversed_delivery_order() {
        let history = stream::iter(vec![
            msg(Some(at(19, 1)), Some("second")),
            msg(Some(at(19, 1)), Some("first")),
        ]);

        let result = collect_window(history, &window(at(18, 0), None)).await.unwrap();
        let texts: Vec<_> = result.iter().map(|m| m.text()).collect();
        assert_eq!(texts, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_scan_keeps_partial_messages_on_error() {
        let history = stream::iter(vec![
            msg(Some(at(19, 2)), Some("b")),
            msg(Some(at(19, 1)), Some("a")),
            Err(FetchError::Transport("connection reset".into())),
        ]);

        let outcome = scan(history, &window(at(18, 0), None)).await;
        assert!(!outcome.is_complete());
        let texts: Vec<_> = outcome.messages.iter().map(|m| m.text()).collect();
        assert_eq!(texts, vec!["a", "b"]);
        assert!(matches!(outcome.into_result(), Err(FetchError::Transport(_))));
    }

    #[tokio::test]
    async fn test_scan_reports_examined_and_early_stop() {
        let history = stream::iter(vec![
            msg(Some(at(19, 5)), Some("late")),
            msg(None, None),
            msg(Some(at(19, 1)), Some("in")),
            msg(Some(at(18, 0)), Some("boundary")),
            msg(Some(at(17, 0)), Some("never pulled")),
        ]);

        let outcome = scan(history, &window(at(18, 0), Some(at(19, 2)))).await;
        assert!(outcome.is_complete());
        assert!(outcome.stopped_early);
        assert_eq!(outcome.examined, 4);
        assert_eq!(outcome.messages.len(), 1);
    }

    #[tokio::test]
    async fn test_scan_runs_to_exhaustion_without_early_stop() {
        let history = stream::iter(vec![msg(Some(at(19, 1)), Some("only"))]);

        let outcome = scan(history, &window(at(18, 0), None)).await;
        assert!(!outcome.stopped_early);
        assert_eq!(outcome.examined, 1);
    }
}
