use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    Fetch(FetchArgs),
    Status(StatusArgs),
    Export(ExportArgs),
}

#[derive(Debug, Args)]
pub struct FetchArgs {
    /// Path to the book records file (YAML).
    #[arg(long, default_value = "data/books.yaml")]
    pub books: String,

    /// Re-resolve covers even for records that already have one.
    #[arg(long, default_value_t = false)]
    pub force: bool,

    /// Resolve covers but do not rewrite the records file.
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,

    /// Delay between records that hit the network (rate-limit politeness).
    #[arg(long, default_value_t = 500)]
    pub delay_ms: u64,

    /// Timeout per HTTP attempt.
    #[arg(long, default_value_t = 10)]
    pub timeout_secs: u64,

    /// Maximum HTTP attempts per request (including the first).
    #[arg(long, default_value_t = 3)]
    pub retries: u32,

    /// Open Library API base URL (override for mirrors/tests).
    #[arg(long, default_value = "https://openlibrary.org")]
    pub openlibrary_base_url: String,

    /// Open Library covers base URL (override for mirrors/tests).
    #[arg(long, default_value = "https://covers.openlibrary.org")]
    pub covers_base_url: String,

    /// Google Books API base URL (override for mirrors/tests).
    #[arg(long, default_value = "https://www.googleapis.com")]
    pub google_books_base_url: String,

    /// Google Custom Search API base URL (override for mirrors/tests).
    #[arg(long, default_value = "https://www.googleapis.com")]
    pub google_cse_base_url: String,
}

#[derive(Debug, Args)]
pub struct StatusArgs {
    /// Path to the book records file (YAML).
    #[arg(long, default_value = "data/books.yaml")]
    pub books: String,
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Directory of markdown content files with YAML front matter.
    #[arg(long)]
    pub content: String,

    /// Output path for the flattened text export.
    #[arg(long)]
    pub out: String,

    /// Overwrite the output file if it already exists.
    #[arg(long, default_value_t = false)]
    pub force: bool,
}
