//! The seam between the window fetcher and a remote messaging platform.
//!
//! A `SessionProvider` opens one authenticated `ChannelSession` per fetch. The
//! session resolves channel references and streams a channel's history
//! newest-first. Sessions are closed by the fetcher on every exit path.

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::core::models::{ChannelRef, SourceMessage};
use crate::errors::FetchError;

#[async_trait]
pub trait SessionProvider: Send + Sync {
    type Session: ChannelSession;

    /// Open an authenticated session.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Transport` if the platform cannot be reached or
    /// rejects the credentials.
    async fn open(&self) -> Result<Self::Session, FetchError>;
}

#[async_trait]
pub trait ChannelSession: Send + Sync + Sized {
    type Handle: Send + Sync;

    /// # Errors
    ///
    /// Returns `FetchError::ChannelResolution` for unknown or inaccessible channels.
    async fn resolve(&self, channel: &ChannelRef) -> Result<Self::Handle, FetchError>;

    /// Stream the channel's messages, strictly newest to oldest.
    ///
    /// The stream is lazy: dropping it stops any further remote requests.
    fn messages<'a>(
        &'a self,
        handle: &'a Self::Handle,
    ) -> BoxStream<'a, Result<SourceMessage, FetchError>>;

    /// Release the session.
    async fn close(self);
}
