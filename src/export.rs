use std::fs::OpenOptions;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::cli::ExportArgs;
use crate::formats::ContentFrontMatter;

/// Flattens a directory of markdown content files (front matter + body)
/// into one plain-text artifact for SEO tooling. Inputs are read-only.
pub fn run(args: ExportArgs) -> anyhow::Result<()> {
    let content_dir = PathBuf::from(&args.content);
    let out_path = PathBuf::from(&args.out);

    if out_path.exists() && !args.force {
        anyhow::bail!("export output already exists: {}", out_path.display());
    }
    if let Some(parent) = out_path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create export output dir: {}", parent.display()))?;
    }

    let mut paths = Vec::new();
    for entry in std::fs::read_dir(&content_dir)
        .with_context(|| format!("read content dir: {}", content_dir.display()))?
    {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) == Some("md") {
            paths.push(path);
        }
    }
    paths.sort();

    if paths.is_empty() {
        anyhow::bail!("no markdown files in: {}", content_dir.display());
    }

    let mut export = format!(
        "# Content export\n# generated: {}\n",
        chrono::Utc::now().to_rfc3339()
    );
    for path in &paths {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("read content page: {}", path.display()))?;
        let (front, body) = parse_page(&contents)
            .with_context(|| format!("parse content page: {}", path.display()))?;

        export.push_str("\n## ");
        export.push_str(&front.title);
        export.push('\n');
        if let Some(description) = &front.description {
            export.push('\n');
            export.push_str(description);
            export.push('\n');
        }
        let body = body.trim();
        if !body.is_empty() {
            export.push('\n');
            export.push_str(body);
            export.push('\n');
        }
    }

    write_export(&out_path, &export, args.force)?;
    tracing::info!(pages = paths.len(), out = %out_path.display(), "content export written");

    Ok(())
}

fn write_export(out_path: &Path, export: &str, force: bool) -> anyhow::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true);
    if force {
        options.create(true).truncate(true);
    } else {
        options.create_new(true);
    }
    let mut out = options
        .open(out_path)
        .with_context(|| format!("open export output: {}", out_path.display()))?;
    out.write_all(export.as_bytes())
        .with_context(|| format!("write export: {}", out_path.display()))?;
    out.flush().context("flush export")?;
    Ok(())
}

fn parse_page(contents: &str) -> anyhow::Result<(ContentFrontMatter, &str)> {
    let Some(rest) = contents.strip_prefix("---") else {
        anyhow::bail!("content page must start with YAML front matter ('---')");
    };
    let Some((yaml, body)) = rest.split_once("\n---") else {
        anyhow::bail!("content page front matter is not closed");
    };

    let front: ContentFrontMatter =
        serde_yaml::from_str(yaml).context("deserialize content front matter")?;
    let body = body.strip_prefix('\n').unwrap_or(body);
    Ok((front, body))
}
