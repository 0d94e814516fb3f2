use async_trait::async_trait;
use er_api_types::PostsQuery;

use crate::error::FetchError;
use crate::token::CancelSignal;

/// One page of the listing as returned by the endpoint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostsPage {
    pub posts: Vec<serde_json::Value>,
    /// Value of the `X-WP-Total` header, when present.
    pub total: Option<u64>,
}

impl PostsPage {
    pub fn new(posts: Vec<serde_json::Value>, total: Option<u64>) -> Self {
        Self { posts, total }
    }

    /// Body parsed leniently: anything but an array counts as no posts.
    pub fn from_body(body: serde_json::Value, total: Option<u64>) -> Self {
        let posts = match body {
            serde_json::Value::Array(posts) => posts,
            _ => Vec::new(),
        };
        Self { posts, total }
    }
}

/// Where pages come from. The browser build fetches over HTTP; tests script it.
#[async_trait(?Send)]
pub trait PostsSource {
    /// Fetch one page. Implementations should abort transport when `signal`
    /// fires and then return [`FetchError::Cancelled`], never an empty page.
    async fn fetch(&self, query: PostsQuery, signal: CancelSignal) -> Result<PostsPage, FetchError>;
}

/// Parse an `X-WP-Total` header value.
pub fn parse_total(header: Option<&str>) -> Option<u64> {
    header.and_then(|raw| raw.trim().parse().ok())
}
