//! Open Library resolvers.
//!
//! Two strategies against the same upstream: a direct ISBN-keyed cover
//! lookup on covers.openlibrary.org, and a bibliographic search on
//! openlibrary.org whose first hit carries a cover id.

use anyhow::Context as _;
use async_trait::async_trait;
use url::Url;

use crate::formats::BookQuery;
use crate::http::{self, RetryPolicy};
use crate::resolver::CoverResolver;

pub struct IsbnCoverResolver {
    client: reqwest::Client,
    policy: RetryPolicy,
    covers_base_url: String,
}

impl IsbnCoverResolver {
    pub fn new(client: reqwest::Client, policy: RetryPolicy, covers_base_url: String) -> Self {
        Self {
            client,
            policy,
            covers_base_url,
        }
    }
}

#[async_trait]
impl CoverResolver for IsbnCoverResolver {
    fn name(&self) -> &'static str {
        "openlibrary-isbn"
    }

    async fn resolve(&self, query: &BookQuery) -> anyhow::Result<Option<String>> {
        let Some(isbn) = query.isbn.as_deref() else {
            return Ok(None);
        };

        let cover_url = isbn_cover_url(&self.covers_base_url, isbn);

        // `default=false` turns the upstream's placeholder image into a 404,
        // which is what makes this an existence check.
        let mut probe_url = Url::parse(&cover_url)
            .with_context(|| format!("build isbn cover url: {cover_url}"))?;
        probe_url.query_pairs_mut().append_pair("default", "false");

        if http::probe(&self.client, &self.policy, &probe_url).await? {
            Ok(Some(cover_url))
        } else {
            Ok(None)
        }
    }
}

pub struct SearchResolver {
    client: reqwest::Client,
    policy: RetryPolicy,
    api_base_url: String,
    covers_base_url: String,
}

impl SearchResolver {
    pub fn new(
        client: reqwest::Client,
        policy: RetryPolicy,
        api_base_url: String,
        covers_base_url: String,
    ) -> Self {
        Self {
            client,
            policy,
            api_base_url,
            covers_base_url,
        }
    }
}

#[async_trait]
impl CoverResolver for SearchResolver {
    fn name(&self) -> &'static str {
        "openlibrary-search"
    }

    async fn resolve(&self, query: &BookQuery) -> anyhow::Result<Option<String>> {
        let endpoint = format!("{}/search.json", self.api_base_url.trim_end_matches('/'));
        let mut url =
            Url::parse(&endpoint).with_context(|| format!("build search url: {endpoint}"))?;
        url.query_pairs_mut()
            .append_pair("title", &query.title)
            .append_pair("author", &query.author)
            .append_pair("limit", "1");

        let body = http::get_json(&self.client, &self.policy, &url).await?;
        Ok(cover_id_from_search(&body)
            .map(|cover_id| cover_id_url(&self.covers_base_url, cover_id)))
    }
}

fn isbn_cover_url(covers_base_url: &str, isbn: &str) -> String {
    format!(
        "{}/b/isbn/{isbn}-L.jpg",
        covers_base_url.trim_end_matches('/')
    )
}

fn cover_id_url(covers_base_url: &str, cover_id: i64) -> String {
    format!(
        "{}/b/id/{cover_id}-L.jpg",
        covers_base_url.trim_end_matches('/')
    )
}

fn cover_id_from_search(body: &serde_json::Value) -> Option<i64> {
    body.get("docs")?
        .as_array()?
        .first()?
        .get("cover_i")?
        .as_i64()
}
