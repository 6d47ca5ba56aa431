use std::collections::HashSet;
use std::io::Write as _;
use std::path::Path;

use anyhow::Context as _;

use crate::formats::BookRecord;

/// The book records file: a leading comment header carried verbatim through
/// rewrites, followed by a YAML sequence of records.
#[derive(Debug, Clone, PartialEq)]
pub struct BookFile {
    pub header: String,
    pub records: Vec<BookRecord>,
}

pub fn read(path: &Path) -> anyhow::Result<BookFile> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read book records: {}", path.display()))?;
    parse(&text).with_context(|| format!("parse book records: {}", path.display()))
}

pub fn parse(text: &str) -> anyhow::Result<BookFile> {
    let (header, body) = split_header(text);

    if body.trim().is_empty() {
        anyhow::bail!("no record list found after header");
    }

    let records: Vec<BookRecord> =
        serde_yaml::from_str(body).context("deserialize record list")?;

    let mut seen = HashSet::new();
    for record in &records {
        if !seen.insert(record.slug.as_str()) {
            anyhow::bail!("duplicate slug: {}", record.slug);
        }
    }

    Ok(BookFile {
        header: header.to_owned(),
        records,
    })
}

pub fn render(file: &BookFile) -> anyhow::Result<String> {
    let yaml = serde_yaml::to_string(&file.records).context("serialize record list")?;
    Ok(format!("{}{yaml}", file.header))
}

/// Rewrites the records file in one shot: the new contents land in a temp
/// file next to the original and are persisted over it, so an interrupted
/// run never leaves a half-written file behind.
pub fn write(path: &Path, file: &BookFile) -> anyhow::Result<()> {
    let contents = render(file)?;

    let dir = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("create temp file in: {}", dir.display()))?;
    tmp.write_all(contents.as_bytes())
        .context("write book records")?;
    tmp.flush().context("flush book records")?;
    tmp.persist(path)
        .with_context(|| format!("replace book records: {}", path.display()))?;

    Ok(())
}

/// Splits the contiguous run of `#` comment and blank lines off the top of
/// the document. The header keeps its trailing newline so that
/// `header + body` reassembles the original text.
fn split_header(text: &str) -> (&str, &str) {
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            offset += line.len();
        } else {
            break;
        }
    }
    text.split_at(offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
# Books read and recommended.
# Edit by hand; covers are filled in by `coverfetch fetch`.

- slug: dune
  title: Dune
  author: Frank Herbert
  isbn: \"9780441013593\"
- slug: the-pragmatic-programmer
  title: The Pragmatic Programmer
  author: Andrew Hunt and David Thomas
  coverImage: https://example.com/pragprog.jpg
  category: engineering
  rating: 5
";

    #[test]
    fn parse_splits_header_and_records() -> anyhow::Result<()> {
        let file = parse(SAMPLE)?;

        assert!(file.header.starts_with("# Books read"));
        assert!(file.header.ends_with("\n\n"));
        assert_eq!(file.records.len(), 2);
        assert_eq!(file.records[0].slug, "dune");
        assert_eq!(file.records[0].isbn.as_deref(), Some("9780441013593"));
        assert_eq!(file.records[1].category.as_deref(), Some("engineering"));

        Ok(())
    }

    #[test]
    fn round_trip_preserves_header_order_and_unknown_fields() -> anyhow::Result<()> {
        let file = parse(SAMPLE)?;
        let rendered = render(&file)?;
        let reparsed = parse(&rendered)?;

        assert_eq!(reparsed, file);
        assert_eq!(reparsed.records[1].extra.get("rating"), file.records[1].extra.get("rating"));
        assert!(file.records[1].extra.contains_key("rating"));

        Ok(())
    }

    #[test]
    fn cover_update_keeps_every_other_field() -> anyhow::Result<()> {
        let mut file = parse(SAMPLE)?;
        file.records[0].cover_image = Some("https://example.com/dune.jpg".to_owned());

        let reparsed = parse(&render(&file)?)?;
        assert_eq!(
            reparsed.records[0].cover_image.as_deref(),
            Some("https://example.com/dune.jpg")
        );
        assert_eq!(reparsed.records[0].title, "Dune");
        assert_eq!(reparsed.records[0].isbn.as_deref(), Some("9780441013593"));

        Ok(())
    }

    #[test]
    fn header_only_file_is_an_error() {
        let err = parse("# just a header\n").unwrap_err();
        assert!(err.to_string().contains("no record list"));
    }

    #[test]
    fn duplicate_slugs_are_an_error() {
        let text = "\
- slug: dune
  title: Dune
  author: Frank Herbert
- slug: dune
  title: Dune Messiah
  author: Frank Herbert
";
        let err = parse(text).unwrap_err();
        assert!(err.to_string().contains("duplicate slug"));
    }

    #[test]
    fn non_sequence_body_is_an_error() {
        assert!(parse("# header\nnot: a-list\n").is_err());
    }
}
