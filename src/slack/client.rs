//! Slack-backed channel history source
//!
//! Opens a session with `auth.test`, resolves channels through
//! `conversations.info` / `conversations.list`, and pages `conversations.history`
//! newest-first using Slack's cursors. No retries: failures surface to the caller.

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use reqwest::Client;
use serde::Deserialize;
use slack_morphism::hyper_tokio::{SlackClientHyperConnector, SlackHyperClient};
use slack_morphism::prelude::SlackApiConversationsHistoryRequest;
use slack_morphism::{
    SlackApiToken, SlackApiTokenValue, SlackChannelId, SlackCursorId, SlackHistoryMessage,
};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::core::config::{AppConfig, DEFAULT_PAGE_SIZE};
use crate::core::models::{ChannelRef, SourceMessage};
use crate::errors::FetchError;
use crate::source::{ChannelSession, SessionProvider};

const SLACK_API_BASE: &str = "https://slack.com/api";

// Build the Slack client connector without panicking.
// If construction fails, store None and surface a FetchError when a session is opened.
static SLACK_CLIENT: std::sync::LazyLock<Option<SlackHyperClient>> =
    std::sync::LazyLock::new(|| match SlackClientHyperConnector::new() {
        Ok(connector) => Some(SlackHyperClient::new(connector)),
        Err(e) => {
            warn!("Failed to create Slack HTTP connector: {}", e);
            None
        }
    });

static HTTP_CLIENT: std::sync::LazyLock<Client> = std::sync::LazyLock::new(|| {
    Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .unwrap_or_else(|_| Client::new())
});

#[derive(Debug, Deserialize)]
struct ConversationInfoResponse {
    ok: bool,
    channel: Option<ConversationSummary>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ConversationListResponse {
    ok: bool,
    #[serde(default)]
    channels: Vec<ConversationSummary>,
    response_metadata: Option<ResponseMetadata>,
    error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct ConversationSummary {
    id: String,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseMetadata {
    next_cursor: Option<String>,
}

/// A resolved Slack conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlackChannelHandle {
    pub id: String,
    pub name: Option<String>,
}

/// Opens Slack sessions for a bot token.
pub struct SlackSource {
    token: SlackApiToken,
    page_size: u16,
}

impl SlackSource {
    #[must_use]
    pub fn new(token: String) -> Self {
        Self {
            token: SlackApiToken::new(SlackApiTokenValue::new(token)),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.slack_bot_token.clone()).with_page_size(config.history_page_size)
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: u16) -> Self {
        self.page_size = page_size.max(1);
        self
    }
}

#[async_trait]
impl SessionProvider for SlackSource {
    type Session = SlackSession;

    async fn open(&self) -> Result<SlackSession, FetchError> {
        let client = SLACK_CLIENT.as_ref().ok_or_else(|| {
            FetchError::Transport("Slack HTTP connector not initialized".to_string())
        })?;

        let auth = client.open_session(&self.token).auth_test().await?;
        info!("Opened Slack session as user {}", auth.user_id.0);

        Ok(SlackSession {
            client,
            token: self.token.clone(),
            page_size: self.page_size,
        })
    }
}

/// An authenticated Slack session for a single fetch.
pub struct SlackSession {
    client: &'static SlackHyperClient,
    token: SlackApiToken,
    page_size: u16,
}

struct HistoryPage {
    messages: Vec<SourceMessage>,
    next_cursor: Option<SlackCursorId>,
}

enum PageCursor {
    First,
    Next(SlackCursorId),
    Done,
}

impl PageCursor {
    /// Slack signals the last page with a missing or empty `next_cursor`.
    fn after(next_cursor: Option<SlackCursorId>) -> Self {
        next_cursor
            .filter(|next| !next.0.is_empty())
            .map_or(PageCursor::Done, PageCursor::Next)
    }
}

/// How a channel reference is looked up: `#name` by listing, anything else by ID.
#[derive(Debug, PartialEq, Eq)]
enum ChannelLookup<'a> {
    Id(String),
    Name(&'a str),
}

impl<'a> ChannelLookup<'a> {
    fn for_channel(channel: &'a ChannelRef) -> Self {
        match channel {
            ChannelRef::Id(id) => ChannelLookup::Id(id.to_string()),
            ChannelRef::Handle(raw) => match raw.strip_prefix('#') {
                Some(name) => ChannelLookup::Name(name),
                None => ChannelLookup::Id(raw.clone()),
            },
        }
    }
}

/// A failed Web API call is a transport problem, even while resolving a channel.
fn http_failure(call: &str, error: reqwest::Error) -> FetchError {
    FetchError::Transport(format!("{call}: {error}"))
}

fn non_empty_cursor(cursor: Option<String>) -> Option<String> {
    cursor.filter(|next| !next.is_empty())
}

/// Turn a page fetcher into a lazy message stream.
///
/// A page is only requested when the previous one has been consumed, so
/// dropping the stream stops paging.
fn paged_messages<'a, F, Fut>(fetch_page: F) -> BoxStream<'a, Result<SourceMessage, FetchError>>
where
    F: Fn(Option<SlackCursorId>) -> Fut + Send + Sync + 'a,
    Fut: Future<Output = Result<HistoryPage, FetchError>> + Send + 'a,
{
    stream::try_unfold(PageCursor::First, move |cursor| {
        let request = match cursor {
            PageCursor::First => Some(fetch_page(None)),
            PageCursor::Next(next) => Some(fetch_page(Some(next))),
            PageCursor::Done => None,
        };

        async move {
            let Some(request) = request else {
                return Ok::<_, FetchError>(None);
            };
            let page = request.await?;
            Ok(Some((page.messages, PageCursor::after(page.next_cursor))))
        }
    })
    .map_ok(|batch| stream::iter(batch.into_iter().map(Ok::<_, FetchError>)))
    .try_flatten()
    .boxed()
}

impl SlackSession {
    async fn channel_info(&self, channel_id: &str) -> Result<SlackChannelHandle, FetchError> {
        let resp = HTTP_CLIENT
            .get(format!("{SLACK_API_BASE}/conversations.info"))
            .bearer_auth(&self.token.token_value.0)
            .query(&[("channel", channel_id)])
            .send()
            .await
            .map_err(|e| http_failure("conversations.info HTTP", e))?;

        let body: ConversationInfoResponse = resp
            .json()
            .await
            .map_err(|e| http_failure("conversations.info parse", e))?;

        if !body.ok {
            return Err(FetchError::ChannelResolution(format!(
                "{channel_id}: {}",
                body.error.unwrap_or_else(|| "unknown error".to_string())
            )));
        }

        body.channel
            .map(|channel| SlackChannelHandle {
                id: channel.id,
                name: channel.name,
            })
            .ok_or_else(|| {
                FetchError::ChannelResolution(format!("{channel_id}: no channel in response"))
            })
    }

    async fn find_channel_by_name(&self, name: &str) -> Result<SlackChannelHandle, FetchError> {
        let mut cursor: Option<String> = None;

        loop {
            let limit = self.page_size.to_string();
            let mut query = vec![
                ("limit", limit.as_str()),
                ("exclude_archived", "true"),
                ("types", "public_channel,private_channel"),
            ];
            if let Some(ref c) = cursor {
                query.push(("cursor", c.as_str()));
            }

            let resp = HTTP_CLIENT
                .get(format!("{SLACK_API_BASE}/conversations.list"))
                .bearer_auth(&self.token.token_value.0)
                .query(&query)
                .send()
                .await
                .map_err(|e| http_failure("conversations.list HTTP", e))?;

            let body: ConversationListResponse = resp
                .json()
                .await
                .map_err(|e| http_failure("conversations.list parse", e))?;

            if !body.ok {
                return Err(FetchError::ChannelResolution(format!(
                    "#{name}: {}",
                    body.error.unwrap_or_else(|| "unknown error".to_string())
                )));
            }

            if let Some(found) = body
                .channels
                .into_iter()
                .find(|channel| channel.name.as_deref() == Some(name))
            {
                return Ok(SlackChannelHandle {
                    id: found.id,
                    name: found.name,
                });
            }

            cursor = non_empty_cursor(body.response_metadata.and_then(|meta| meta.next_cursor));
            if cursor.is_none() {
                return Err(FetchError::ChannelResolution(format!(
                    "#{name}: channel not found"
                )));
            }
        }
    }

    async fn history_page(
        &self,
        handle: &SlackChannelHandle,
        cursor: Option<SlackCursorId>,
    ) -> Result<HistoryPage, FetchError> {
        let session = self.client.open_session(&self.token);

        let mut request = SlackApiConversationsHistoryRequest::new()
            .with_channel(SlackChannelId(handle.id.clone()))
            .with_limit(self.page_size);
        if let Some(cursor) = cursor {
            request = request.with_cursor(cursor);
        }

        let result = session.conversations_history(&request).await?;
        debug!(
            "Fetched {} history messages from {}",
            result.messages.len(),
            handle.id
        );

        Ok(HistoryPage {
            messages: result.messages.iter().map(to_source_message).collect(),
            next_cursor: result.response_metadata.and_then(|meta| meta.next_cursor),
        })
    }
}

#[async_trait]
impl ChannelSession for SlackSession {
    type Handle = SlackChannelHandle;

    async fn resolve(&self, channel: &ChannelRef) -> Result<SlackChannelHandle, FetchError> {
        let handle = match ChannelLookup::for_channel(channel) {
            ChannelLookup::Id(id) => self.channel_info(&id).await?,
            ChannelLookup::Name(name) => self.find_channel_by_name(name).await?,
        };

        info!(
            "Resolved channel {} to {} ({})",
            channel,
            handle.id,
            handle.name.as_deref().unwrap_or("unnamed")
        );
        Ok(handle)
    }

    fn messages<'a>(
        &'a self,
        handle: &'a SlackChannelHandle,
    ) -> BoxStream<'a, Result<SourceMessage, FetchError>> {
        paged_messages(move |cursor| self.history_page(handle, cursor))
    }

    async fn close(self) {
        debug!("Closed Slack session");
    }
}

fn to_source_message(message: &SlackHistoryMessage) -> SourceMessage {
    SourceMessage {
        timestamp: ts_to_datetime(&message.origin.ts.0),
        text: message.content.text.clone(),
    }
}

/// Convert a Slack `ts` such as `"1697600000.000100"` to a UTC timestamp.
pub(crate) fn ts_to_datetime(ts: &str) -> Option<DateTime<FixedOffset>> {
    let (secs, frac) = ts.split_once('.').unwrap_or((ts, ""));
    let secs: i64 = secs.parse().ok()?;
    if !frac.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let micros: u32 = format!("{frac:0<6}").get(..6)?.parse().ok()?;
    DateTime::from_timestamp(secs, micros * 1_000).map(|date| date.fixed_offset())
}
