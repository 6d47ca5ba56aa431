//! Google Books volume lookup: query by title and author, take the best
//! image link on the first volume.

use anyhow::Context as _;
use async_trait::async_trait;
use url::Url;

use crate::formats::BookQuery;
use crate::http::{self, RetryPolicy};
use crate::resolver::CoverResolver;

// Largest first; thumbnails are the usual case on the volumes API.
const IMAGE_LINK_PREFERENCE: [&str; 5] =
    ["extraLarge", "large", "medium", "thumbnail", "smallThumbnail"];

pub struct GoogleBooksResolver {
    client: reqwest::Client,
    policy: RetryPolicy,
    base_url: String,
}

impl GoogleBooksResolver {
    pub fn new(client: reqwest::Client, policy: RetryPolicy, base_url: String) -> Self {
        Self {
            client,
            policy,
            base_url,
        }
    }
}

#[async_trait]
impl CoverResolver for GoogleBooksResolver {
    fn name(&self) -> &'static str {
        "google-books"
    }

    async fn resolve(&self, query: &BookQuery) -> anyhow::Result<Option<String>> {
        let endpoint = format!(
            "{}/books/v1/volumes",
            self.base_url.trim_end_matches('/')
        );
        let mut url =
            Url::parse(&endpoint).with_context(|| format!("build volumes url: {endpoint}"))?;
        url.query_pairs_mut()
            .append_pair(
                "q",
                &format!("intitle:\"{}\" inauthor:\"{}\"", query.title, query.author),
            )
            .append_pair("maxResults", "1");

        let body = http::get_json(&self.client, &self.policy, &url).await?;
        Ok(image_link_from_volumes(&body))
    }
}

fn image_link_from_volumes(body: &serde_json::Value) -> Option<String> {
    let image_links = body
        .get("items")?
        .as_array()?
        .first()?
        .get("volumeInfo")?
        .get("imageLinks")?;

    for key in IMAGE_LINK_PREFERENCE {
        if let Some(link) = image_links.get(key).and_then(|v| v.as_str()) {
            return Some(force_https(link));
        }
    }
    None
}

// The volumes API still hands out http:// thumbnail links.
fn force_https(link: &str) -> String {
    match link.strip_prefix("http://") {
        Some(rest) => format!("https://{rest}"),
        None => link.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_the_largest_image_link() {
        let body = serde_json::json!({
            "items": [{
                "volumeInfo": {
                    "imageLinks": {
                        "smallThumbnail": "http://books.google.com/small.jpg",
                        "thumbnail": "http://books.google.com/thumb.jpg",
                        "large": "http://books.google.com/large.jpg"
                    }
                }
            }]
        });
        assert_eq!(
            image_link_from_volumes(&body),
            Some("https://books.google.com/large.jpg".to_owned())
        );
    }

    #[test]
    fn upgrades_plain_http_links() {
        let body = serde_json::json!({
            "items": [{
                "volumeInfo": {
                    "imageLinks": { "thumbnail": "http://books.google.com/thumb.jpg" }
                }
            }]
        });
        assert_eq!(
            image_link_from_volumes(&body),
            Some("https://books.google.com/thumb.jpg".to_owned())
        );
    }

    #[test]
    fn missing_items_or_links_is_a_miss() {
        assert_eq!(image_link_from_volumes(&serde_json::json!({})), None);
        assert_eq!(
            image_link_from_volumes(&serde_json::json!({ "items": [] })),
            None
        );
        assert_eq!(
            image_link_from_volumes(&serde_json::json!({
                "items": [{ "volumeInfo": {} }]
            })),
            None
        );
    }
}
