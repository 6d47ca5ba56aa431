use std::path::PathBuf;

use anyhow::Context as _;

use crate::book_store;
use crate::cli::StatusArgs;

/// Prints cover coverage for the records file: totals first, then the slugs
/// still waiting for a cover.
pub fn run(args: StatusArgs) -> anyhow::Result<()> {
    let books_path = PathBuf::from(&args.books);
    let book_file = book_store::read(&books_path).context("load book records")?;

    let total = book_file.records.len();
    let missing: Vec<&str> = book_file
        .records
        .iter()
        .filter(|record| record.cover_image.is_none())
        .map(|record| record.slug.as_str())
        .collect();

    println!("{total} records, {} with covers", total - missing.len());
    for slug in &missing {
        println!("missing: {slug}");
    }

    Ok(())
}
