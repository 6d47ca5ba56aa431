use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context as _;

use crate::book_store;
use crate::cli::FetchArgs;
use crate::config::GoogleCseCredentials;
use crate::formats::BookQuery;
use crate::http::{self, RetryPolicy};
use crate::resolver::google_books::GoogleBooksResolver;
use crate::resolver::google_cse::GoogleCseResolver;
use crate::resolver::open_library::{IsbnCoverResolver, SearchResolver};
use crate::resolver::{CoverResolver, ResolverChain};

pub async fn run(args: FetchArgs) -> anyhow::Result<()> {
    let books_path = PathBuf::from(&args.books);
    let mut book_file = book_store::read(&books_path).context("load book records")?;

    let credentials = GoogleCseCredentials::from_env();
    if credentials.is_none() {
        tracing::debug!("google cse credentials not set; image search disabled");
    }

    let client = http::build_client(Duration::from_secs(args.timeout_secs))?;
    let policy = RetryPolicy {
        max_attempts: args.retries.max(1),
        ..RetryPolicy::default()
    };
    let chain = build_chain(&args, client, policy, credentials);

    let record_delay = Duration::from_millis(args.delay_ms);
    let mut resolved = 0usize;
    let mut skipped = 0usize;
    let mut missed = 0usize;
    let mut touched_network = false;

    for record in &mut book_file.records {
        if record.cover_image.is_some() && !args.force {
            tracing::debug!(slug = %record.slug, "cover already present; skipping");
            skipped += 1;
            continue;
        }

        // Pace records that reach upstream APIs; per-attempt retry backoff
        // is handled separately inside the http layer.
        if touched_network && !record_delay.is_zero() {
            tokio::time::sleep(record_delay).await;
        }
        touched_network = true;

        let query = BookQuery::from_record(record);
        match chain.resolve(&query).await {
            Some(cover) => {
                tracing::info!(slug = %record.slug, source = cover.source, url = %cover.url, "cover resolved");
                record.cover_image = Some(cover.url);
                resolved += 1;
            }
            None => {
                tracing::warn!(slug = %record.slug, title = %record.title, "no cover found");
                missed += 1;
            }
        }
    }

    if args.dry_run {
        tracing::info!(resolved, skipped, missed, "dry run; records file left untouched");
        return Ok(());
    }

    book_store::write(&books_path, &book_file).context("rewrite book records")?;
    tracing::info!(resolved, skipped, missed, "cover fetch finished");

    Ok(())
}

/// Fixed priority order: ISBN lookup, bibliographic search, Google Books,
/// then keyword image search.
fn build_chain(
    args: &FetchArgs,
    client: reqwest::Client,
    policy: RetryPolicy,
    credentials: Option<GoogleCseCredentials>,
) -> ResolverChain {
    let resolvers: Vec<Box<dyn CoverResolver>> = vec![
        Box::new(IsbnCoverResolver::new(
            client.clone(),
            policy,
            args.covers_base_url.clone(),
        )),
        Box::new(SearchResolver::new(
            client.clone(),
            policy,
            args.openlibrary_base_url.clone(),
            args.covers_base_url.clone(),
        )),
        Box::new(GoogleBooksResolver::new(
            client.clone(),
            policy,
            args.google_books_base_url.clone(),
        )),
        Box::new(GoogleCseResolver::new(
            client,
            policy,
            args.google_cse_base_url.clone(),
            credentials,
        )),
    ];

    ResolverChain::new(resolvers)
}
