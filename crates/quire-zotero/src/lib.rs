//! Zotero Web API client for the catalogue's bibliography panel.
//!
//! Looks up item keys by tag (the tag is a URL-encoded manuscript title) and
//! builds the public tag-page link shown to readers. Supports both the user
//! library the catalogue fetches from and the shared group library, with
//! overridable base URLs for tests.

use std::time::Duration;

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use thiserror::Error;

/// User library the catalogue queries for tagged items.
pub const DEFAULT_USER_ID: u64 = 3_118_282;
/// Group library holding the shared bibliography.
pub const DEFAULT_GROUP_ID: u64 = 434_020;
/// URL slug of the group library on zotero.org.
pub const DEFAULT_LINK_SLUG: &str = "bodleianwmss";

pub const DEFAULT_API_BASE: &str = "https://api.zotero.org";
pub const DEFAULT_LINK_BASE: &str = "https://www.zotero.org";

#[derive(Error, Debug)]
pub enum ZoteroError {
    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),
    #[error("rate limited (429)")]
    RateLimited,
    #[error("HTTP {0}")]
    Status(u16),
}

/// Which Zotero library to address in API requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Library {
    User(u64),
    Group(u64),
}

impl Default for Library {
    fn default() -> Self {
        Library::User(DEFAULT_USER_ID)
    }
}

impl Library {
    /// Path segment under the API base, e.g. `users/3118282`.
    fn api_path(&self) -> String {
        match self {
            Library::User(id) => format!("users/{}", id),
            Library::Group(id) => format!("groups/{}", id),
        }
    }
}

/// Characters percent-encoded by `encodeURI`: controls, space, and the ASCII
/// punctuation that is neither a URI reserved character nor unreserved.
const ENCODE_URI: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// URL-encode a manuscript title into a Zotero tag.
///
/// Uses the `encodeURI` character set, then additionally escapes literal
/// apostrophes as `%27` because Zotero tags treat them specially. Non-ASCII
/// characters are percent-encoded as UTF-8 bytes.
pub fn encode_tag(title: &str) -> String {
    utf8_percent_encode(title, ENCODE_URI)
        .to_string()
        .replace('\'', "%27")
}

/// Split a `format=keys` response body into item keys, dropping blank lines.
///
/// The API returns one key per line and may include trailing or embedded
/// blank lines.
pub fn parse_key_lines(body: &str) -> Vec<String> {
    body.split('\n')
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

/// Client for the Zotero Web API and the public zotero.org tag pages.
pub struct ZoteroClient {
    http: reqwest::Client,
    api_base: String,
    link_base: String,
    link_slug: String,
    library: Library,
}

impl Default for ZoteroClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ZoteroClient {
    /// Client addressing the default user library.
    pub fn new() -> Self {
        Self::with_library(Library::default())
    }

    /// Client addressing a specific library.
    pub fn with_library(library: Library) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: DEFAULT_API_BASE.to_string(),
            link_base: DEFAULT_LINK_BASE.to_string(),
            link_slug: DEFAULT_LINK_SLUG.to_string(),
            library,
        }
    }

    /// Override the API base URL (tests, proxies).
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into();
        self
    }

    /// Override the public link base URL.
    pub fn with_link_base(mut self, base: impl Into<String>) -> Self {
        self.link_base = base.into();
        self
    }

    /// Override the group slug used in tag-page links.
    pub fn with_link_slug(mut self, slug: impl Into<String>) -> Self {
        self.link_slug = slug.into();
        self
    }

    /// API URL listing item keys carrying the tag derived from `title`.
    pub fn keys_url(&self, title: &str) -> String {
        format!(
            "{}/{}/items?tag={}&format=keys",
            self.api_base,
            self.library.api_path(),
            encode_tag(title)
        )
    }

    /// Base of the public tag pages, `{link_base}/{slug}/items/tag/`.
    pub fn tag_page_base(&self) -> String {
        format!("{}/{}/items/tag/", self.link_base, self.link_slug)
    }

    /// Public tag page on zotero.org for `title`, rendered as a hyperlink in
    /// the bibliography panel (never fetched).
    pub fn tag_page_url(&self, title: &str) -> String {
        format!("{}{}", self.tag_page_base(), encode_tag(title))
    }

    /// Fetch the item keys tagged with `title`'s tag.
    ///
    /// Returns the keys with blank lines dropped; an empty vector means the
    /// library has no items for this tag.
    pub async fn item_keys(
        &self,
        title: &str,
        timeout: Duration,
    ) -> Result<Vec<String>, ZoteroError> {
        let url = self.keys_url(title);
        tracing::debug!(%url, "querying zotero item keys");

        let resp = self
            .http
            .get(&url)
            .header("User-Agent", "QuireCatalogue/0.1")
            .timeout(timeout)
            .send()
            .await?;

        read_keys(resp).await
    }
}

/// Interpret a keys response: status checks, then newline-delimited parsing.
async fn read_keys(resp: reqwest::Response) -> Result<Vec<String>, ZoteroError> {
    let status = resp.status();
    if status.as_u16() == 429 {
        return Err(ZoteroError::RateLimited);
    }
    if !status.is_success() {
        return Err(ZoteroError::Status(status.as_u16()));
    }

    let body = resp.text().await?;
    Ok(parse_key_lines(&body))
}
