pub mod google_books;
pub mod google_cse;
pub mod open_library;

use async_trait::async_trait;

use crate::formats::{BookQuery, ResolvedCover};

/// One upstream source for cover image URLs.
///
/// `Ok(None)` means the source has nothing for this book (including "source
/// not configured"); `Err` means the source was asked and failed. The chain
/// treats both as "try the next source".
#[async_trait]
pub trait CoverResolver: Send + Sync {
    fn name(&self) -> &'static str;

    async fn resolve(&self, query: &BookQuery) -> anyhow::Result<Option<String>>;
}

/// Ordered fallback chain over the resolvers. Sources are tried one at a
/// time and the first hit wins; there is no parallel fan-out so upstream
/// rate limits stay respected.
pub struct ResolverChain {
    resolvers: Vec<Box<dyn CoverResolver>>,
}

impl ResolverChain {
    pub fn new(resolvers: Vec<Box<dyn CoverResolver>>) -> Self {
        Self { resolvers }
    }

    pub async fn resolve(&self, query: &BookQuery) -> Option<ResolvedCover> {
        for resolver in &self.resolvers {
            match resolver.resolve(query).await {
                Ok(Some(url)) => {
                    return Some(ResolvedCover {
                        url,
                        source: resolver.name(),
                    });
                }
                Ok(None) => {
                    tracing::debug!(source = resolver.name(), title = %query.title, "no result");
                }
                Err(err) => {
                    tracing::warn!(
                        source = resolver.name(),
                        title = %query.title,
                        error = format!("{err:#}"),
                        "resolver failed; falling through"
                    );
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    #[derive(Clone)]
    enum Outcome {
        Hit(String),
        Miss,
        Broken,
    }

    struct FakeResolver {
        name: &'static str,
        outcome: Outcome,
        calls: Arc<AtomicU32>,
    }

    fn fake(name: &'static str, outcome: Outcome) -> (Box<dyn CoverResolver>, Arc<AtomicU32>) {
        let calls = Arc::new(AtomicU32::new(0));
        let resolver = FakeResolver {
            name,
            outcome,
            calls: Arc::clone(&calls),
        };
        (Box::new(resolver), calls)
    }

    #[async_trait]
    impl CoverResolver for FakeResolver {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn resolve(&self, _query: &BookQuery) -> anyhow::Result<Option<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.outcome {
                Outcome::Hit(url) => Ok(Some(url.clone())),
                Outcome::Miss => Ok(None),
                Outcome::Broken => Err(anyhow::anyhow!("boom")),
            }
        }
    }

    fn query() -> BookQuery {
        BookQuery {
            title: "Dune".to_owned(),
            author: "Frank Herbert".to_owned(),
            isbn: Some("9780441013593".to_owned()),
        }
    }

    #[tokio::test]
    async fn first_hit_short_circuits_later_resolvers() {
        let (first, first_calls) = fake(
            "isbn",
            Outcome::Hit("https://example.com/dune.jpg".to_owned()),
        );
        let (second, second_calls) = fake(
            "search",
            Outcome::Hit("https://example.com/other.jpg".to_owned()),
        );
        let chain = ResolverChain::new(vec![first, second]);

        let resolved = chain.resolve(&query()).await.expect("cover");
        assert_eq!(resolved.url, "https://example.com/dune.jpg");
        assert_eq!(resolved.source, "isbn");
        assert_eq!(first_calls.load(Ordering::SeqCst), 1);
        assert_eq!(second_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn misses_and_failures_fall_through_in_order() {
        let (first, first_calls) = fake("isbn", Outcome::Miss);
        let (second, second_calls) = fake("search", Outcome::Broken);
        let (third, third_calls) = fake(
            "google-books",
            Outcome::Hit("https://example.com/fallback.jpg".to_owned()),
        );
        let chain = ResolverChain::new(vec![first, second, third]);

        let resolved = chain.resolve(&query()).await.expect("cover");
        assert_eq!(resolved.source, "google-books");
        assert_eq!(first_calls.load(Ordering::SeqCst), 1);
        assert_eq!(second_calls.load(Ordering::SeqCst), 1);
        assert_eq!(third_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn exhausted_chain_yields_none() {
        let (first, _) = fake("isbn", Outcome::Miss);
        let (second, _) = fake("search", Outcome::Broken);
        let chain = ResolverChain::new(vec![first, second]);

        assert!(chain.resolve(&query()).await.is_none());
    }

    #[tokio::test]
    async fn chain_is_deterministic_for_fixed_outcomes() {
        let (first, _) = fake("isbn", Outcome::Miss);
        let (second, _) = fake(
            "search",
            Outcome::Hit("https://example.com/stable.jpg".to_owned()),
        );
        let chain = ResolverChain::new(vec![first, second]);

        let a = chain.resolve(&query()).await.expect("cover");
        let b = chain.resolve(&query()).await.expect("cover");
        assert_eq!(a, b);
    }
}
