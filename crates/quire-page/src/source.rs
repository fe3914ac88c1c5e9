//! Bibliography lookup seam.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use quire_zotero::{ZoteroClient, ZoteroError};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("cancelled")]
    Cancelled,
    #[error("transport error: {0}")]
    Transport(String),
    #[error("unexpected status code {0}")]
    Status(u16),
}

/// Looks up bibliography item keys for a manuscript title.
///
/// Implementations must stop promptly once `cancel` fires; the page is
/// being torn down and the answer will not be used.
pub trait BibliographySource: Send + Sync {
    fn fetch_keys<'a>(
        &'a self,
        title: &'a str,
        cancel: &'a CancellationToken,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<String>, SourceError>> + Send + 'a>>;
}

/// Source backed by the Zotero web API.
pub struct ZoteroSource {
    client: ZoteroClient,
    timeout: Duration,
}

impl ZoteroSource {
    pub fn new(client: ZoteroClient, timeout: Duration) -> Self {
        Self { client, timeout }
    }
}

impl BibliographySource for ZoteroSource {
    fn fetch_keys<'a>(
        &'a self,
        title: &'a str,
        cancel: &'a CancellationToken,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<String>, SourceError>> + Send + 'a>> {
        Box::pin(async move {
            tokio::select! {
                _ = cancel.cancelled() => Err(SourceError::Cancelled),
                result = self.client.item_keys(title, self.timeout) => {
                    result.map_err(|e| match e {
                        ZoteroError::RateLimited => SourceError::Status(429),
                        ZoteroError::Status(code) => SourceError::Status(code),
                        ZoteroError::Request(e) => SourceError::Transport(e.to_string()),
                    })
                }
            }
        })
    }
}
