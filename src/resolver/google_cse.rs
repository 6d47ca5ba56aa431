//! Google Custom Search image lookup, the last rung of the chain.
//!
//! Needs an API key and a search engine id; without both the resolver is a
//! configured no-op and never touches the network.

use anyhow::Context as _;
use async_trait::async_trait;
use url::Url;

use crate::config::GoogleCseCredentials;
use crate::formats::BookQuery;
use crate::http::{self, RetryPolicy};
use crate::resolver::CoverResolver;

pub struct GoogleCseResolver {
    client: reqwest::Client,
    policy: RetryPolicy,
    base_url: String,
    credentials: Option<GoogleCseCredentials>,
}

impl GoogleCseResolver {
    pub fn new(
        client: reqwest::Client,
        policy: RetryPolicy,
        base_url: String,
        credentials: Option<GoogleCseCredentials>,
    ) -> Self {
        Self {
            client,
            policy,
            base_url,
            credentials,
        }
    }
}

#[async_trait]
impl CoverResolver for GoogleCseResolver {
    fn name(&self) -> &'static str {
        "google-cse"
    }

    async fn resolve(&self, query: &BookQuery) -> anyhow::Result<Option<String>> {
        let Some(credentials) = &self.credentials else {
            return Ok(None);
        };

        let endpoint = format!("{}/customsearch/v1", self.base_url.trim_end_matches('/'));
        let mut url =
            Url::parse(&endpoint).with_context(|| format!("build image search url: {endpoint}"))?;
        url.query_pairs_mut()
            .append_pair("key", &credentials.api_key)
            .append_pair("cx", &credentials.engine_id)
            .append_pair("searchType", "image")
            .append_pair("num", "5")
            .append_pair("q", &image_query(query));

        let body = http::get_json(&self.client, &self.policy, &url).await?;
        Ok(pick_cover_link(&body))
    }
}

fn image_query(query: &BookQuery) -> String {
    format!("\"{}\" {} book cover", query.title, query.author)
}

/// Prefers a result that looks like an actual cover; otherwise falls back
/// to the first raw result.
fn pick_cover_link(body: &serde_json::Value) -> Option<String> {
    let items = body.get("items")?.as_array()?;

    for item in items {
        let link = item.get("link").and_then(|v| v.as_str());
        let title = item.get("title").and_then(|v| v.as_str()).unwrap_or("");
        if let Some(link) = link
            && (link.to_ascii_lowercase().contains("cover")
                || title.to_ascii_lowercase().contains("cover"))
        {
            return Some(link.to_owned());
        }
    }

    items
        .first()?
        .get("link")?
        .as_str()
        .map(|link| link.to_owned())
}
