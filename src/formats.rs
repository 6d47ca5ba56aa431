use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One book entry in the persisted records file.
///
/// `slug` is the stable identity; a fetch run only ever touches
/// `cover_image`. Fields this tool does not know about are kept in
/// `extra` so a rewrite cannot drop them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookRecord {
    pub slug: String,
    pub title: String,
    pub author: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

/// Lookup input handed to the resolver chain. Not persisted.
#[derive(Debug, Clone)]
pub struct BookQuery {
    pub title: String,
    pub author: String,
    pub isbn: Option<String>,
}

impl BookQuery {
    pub fn from_record(record: &BookRecord) -> Self {
        Self {
            title: record.title.clone(),
            author: record.author.clone(),
            isbn: record.isbn.clone(),
        }
    }
}

/// A cover URL together with the resolver that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCover {
    pub url: String,
    pub source: &'static str,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentFrontMatter {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}
