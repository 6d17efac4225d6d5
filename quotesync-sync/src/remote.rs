//! Remote fetch adapter.
//!
//! The mock server publishes "posts" (`{userId, id, title, body}`); each post
//! becomes a quote with `text = title` and `category = "Server-<userId>"`.
//! Only the first [`DEFAULT_REMOTE_LIMIT`] posts are used.

use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use quotesync_core::{QuoteList, QuoteRecord};

use crate::error::RemoteError;

pub const DEFAULT_REMOTE_URL: &str = "https://jsonplaceholder.typicode.com/posts";
pub const DEFAULT_REMOTE_LIMIT: usize = 10;
pub const DEFAULT_REMOTE_TIMEOUT: Duration = Duration::from_secs(10);

/// Anything that can produce the remote side of a reconciliation.
pub trait RemoteSource {
    fn fetch(&self) -> Result<QuoteList, RemoteError>;
}

impl<F> RemoteSource for F
where
    F: Fn() -> Result<QuoteList, RemoteError>,
{
    fn fetch(&self) -> Result<QuoteList, RemoteError> {
        self()
    }
}

/// One item of the server's post listing. Extra fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemotePost {
    #[serde(rename = "userId")]
    pub user_id: u64,
    pub title: String,
}

impl From<RemotePost> for QuoteRecord {
    fn from(post: RemotePost) -> Self {
        QuoteRecord::new(post.title, format!("Server-{}", post.user_id))
    }
}

/// First `limit` posts mapped to quotes, in server order.
pub fn posts_to_quotes(posts: Vec<RemotePost>, limit: usize) -> QuoteList {
    posts.into_iter().take(limit).map(QuoteRecord::from).collect()
}

/// Blocking HTTP GET against a JSON post listing.
#[derive(Debug, Clone)]
pub struct HttpRemoteSource {
    url: String,
    limit: usize,
    timeout: Duration,
}

impl HttpRemoteSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            limit: DEFAULT_REMOTE_LIMIT,
            timeout: DEFAULT_REMOTE_TIMEOUT,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Default for HttpRemoteSource {
    fn default() -> Self {
        Self::new(DEFAULT_REMOTE_URL)
    }
}

impl RemoteSource for HttpRemoteSource {
    fn fetch(&self) -> Result<QuoteList, RemoteError> {
        debug!("fetching remote quotes from {}", self.url);
        let response = ureq::get(&self.url).timeout(self.timeout).call()?;
        let posts: Vec<RemotePost> = response
            .into_json()
            .map_err(|e| RemoteError::Decode(e.to_string()))?;
        let quotes = posts_to_quotes(posts, self.limit);
        debug!("fetched {} remote quotes", quotes.len());
        Ok(quotes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_maps_title_and_owner() {
        let post: RemotePost = serde_json::from_str(
            r#"{"userId": 3, "id": 21, "title": "asperiores ea ipsam", "body": "ignored"}"#,
        )
        .expect("decode post");
        assert_eq!(
            QuoteRecord::from(post),
            QuoteRecord::new("asperiores ea ipsam", "Server-3")
        );
    }

    #[test]
    fn only_first_page_is_kept() {
        let posts: Vec<RemotePost> = (1..=25)
            .map(|i| RemotePost {
                user_id: (i - 1) / 10 + 1,
                title: format!("post {i}"),
            })
            .collect();
        let quotes = posts_to_quotes(posts, DEFAULT_REMOTE_LIMIT);
        assert_eq!(quotes.len(), 10);
        assert_eq!(quotes[0], QuoteRecord::new("post 1", "Server-1"));
        assert_eq!(quotes[9], QuoteRecord::new("post 10", "Server-1"));
    }

    #[test]
    fn listing_missing_title_fails_to_decode() {
        let result = serde_json::from_str::<Vec<RemotePost>>(r#"[{"userId": 1}]"#);
        assert!(result.is_err());
    }

    #[test]
    fn closures_are_remote_sources() {
        let source = || -> Result<QuoteList, RemoteError> { Ok(vec![QuoteRecord::new("a", "b")]) };
        assert_eq!(source.fetch().unwrap().len(), 1);
    }

    #[test]
    fn unreachable_host_is_transport_error() {
        // Nothing listens on the loopback discard port.
        let source = HttpRemoteSource::new("http://127.0.0.1:9/posts")
            .with_timeout(Duration::from_secs(2));
        let err = source.fetch().unwrap_err();
        assert!(matches!(err, RemoteError::Transport(_)), "got: {err}");
    }
}
