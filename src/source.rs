//! Content sources: where items and taxonomies come from.
//!
//! The pipeline only ever sees fetched `Vec<ContentItem>`s. Anything that can
//! produce them implements [`ContentSource`]. Errors are passed through to the
//! caller untouched; the mapping core never retries or recovers them.
//!
//! [`JsonExportSource`] reads delivery API responses saved to disk:
//!
//! ```text
//! export/
//! ├── items.json        # { "items": [...], "modular_content": { codename: item } }
//! └── taxonomies.json   # { "taxonomies": [...] }   (optional)
//! ```
//!
//! Only `items` are candidates for records. Entries of `modular_content` that
//! are not listed themselves are returned separately by
//! [`ContentSource::fetch_linked_items`] and only serve link resolution.

use crate::types::{ContentItem, Taxonomy};
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

pub const ITEMS_FILE: &str = "items.json";
pub const TAXONOMIES_FILE: &str = "taxonomies.json";

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A provider of content items and taxonomy groups.
pub trait ContentSource {
    /// Listed items, the ones records are made from.
    fn fetch_items(&self) -> Result<Vec<ContentItem>, SourceError>;

    /// Items that are only reachable as links from listed items.
    fn fetch_linked_items(&self) -> Result<Vec<ContentItem>, SourceError> {
        Ok(Vec::new())
    }

    fn fetch_taxonomies(&self) -> Result<Vec<Taxonomy>, SourceError>;
}

/// Items listing response.
#[derive(Debug, Deserialize)]
struct ItemListing {
    #[serde(default)]
    items: Vec<ContentItem>,
    #[serde(default)]
    modular_content: BTreeMap<String, ContentItem>,
}

#[derive(Debug, Deserialize)]
struct TaxonomyListing {
    #[serde(default)]
    taxonomies: Vec<Taxonomy>,
}

/// Reads a saved delivery API export from a directory.
#[derive(Debug, Clone)]
pub struct JsonExportSource {
    dir: PathBuf,
}

impl JsonExportSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn read_listing(&self) -> Result<ItemListing, SourceError> {
        let content = fs::read_to_string(self.dir.join(ITEMS_FILE))?;
        Ok(serde_json::from_str(&content)?)
    }
}

impl ContentSource for JsonExportSource {
    fn fetch_items(&self) -> Result<Vec<ContentItem>, SourceError> {
        Ok(self.read_listing()?.items)
    }

    fn fetch_linked_items(&self) -> Result<Vec<ContentItem>, SourceError> {
        Ok(linked_only(self.read_listing()?))
    }

    fn fetch_taxonomies(&self) -> Result<Vec<Taxonomy>, SourceError> {
        let path = self.dir.join(TAXONOMIES_FILE);
        if !path.exists() {
            debug!(path = %path.display(), "no taxonomy export");
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(path)?;
        let listing: TaxonomyListing = serde_json::from_str(&content)?;
        Ok(listing.taxonomies)
    }
}

/// `modular_content` entries that are not listed items themselves.
fn linked_only(listing: ItemListing) -> Vec<ContentItem> {
    let listed: HashSet<&str> = listing.items.iter().map(|i| i.codename()).collect();
    let linked: Vec<ContentItem> = listing
        .modular_content
        .into_values()
        .filter(|item| !listed.contains(item.codename()))
        .collect();
    debug!(count = linked.len(), "linked-only items");
    linked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ElementValue;
    use tempfile::TempDir;

    const ITEMS: &str = r#"{
        "items": [
            {
                "system": {"id": "1", "name": "Home", "codename": "home", "type": "page"},
                "elements": {
                    "title": {"type": "text", "name": "Title", "value": "Welcome"},
                    "sections": {"type": "modular_content", "name": "Sections", "value": ["hero", "home"]}
                }
            }
        ],
        "modular_content": {
            "hero": {
                "system": {"id": "2", "name": "Hero", "codename": "hero", "type": "section"},
                "elements": {}
            },
            "home": {
                "system": {"id": "1", "name": "Home", "codename": "home", "type": "page"},
                "elements": {}
            }
        },
        "pagination": {"skip": 0, "limit": 0, "count": 1, "next_page": ""}
    }"#;

    fn export(items: &str, taxonomies: Option<&str>) -> TempDir {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(ITEMS_FILE), items).unwrap();
        if let Some(taxonomies) = taxonomies {
            fs::write(tmp.path().join(TAXONOMIES_FILE), taxonomies).unwrap();
        }
        tmp
    }

    #[test]
    fn reads_only_listed_items() {
        let tmp = export(ITEMS, None);
        let items = JsonExportSource::new(tmp.path()).fetch_items().unwrap();
        let codenames: Vec<&str> = items.iter().map(|i| i.codename()).collect();
        assert_eq!(codenames, vec!["home"]);
        assert_eq!(
            items[0].element("title"),
            Some(&ElementValue::Text("Welcome".into()))
        );
        assert_eq!(items[0].elements.len(), 2);
    }

    #[test]
    fn linked_items_exclude_listed_ones() {
        let tmp = export(ITEMS, None);
        let linked = JsonExportSource::new(tmp.path())
            .fetch_linked_items()
            .unwrap();
        let codenames: Vec<&str> = linked.iter().map(|i| i.codename()).collect();
        assert_eq!(codenames, vec!["hero"]);
    }

    #[test]
    fn element_order_is_kept() {
        let tmp = export(ITEMS, None);
        let items = JsonExportSource::new(tmp.path()).fetch_items().unwrap();
        assert_eq!(
            items[0].elements.keys().collect::<Vec<_>>(),
            vec!["title", "sections"]
        );
    }

    #[test]
    fn missing_items_file_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let result = JsonExportSource::new(tmp.path()).fetch_items();
        assert!(matches!(result, Err(SourceError::Io(_))));
    }

    #[test]
    fn invalid_json_is_json_error() {
        let tmp = export("{ not json", None);
        let result = JsonExportSource::new(tmp.path()).fetch_items();
        assert!(matches!(result, Err(SourceError::Json(_))));
    }

    #[test]
    fn taxonomies_are_optional() {
        let tmp = export(ITEMS, None);
        let taxonomies = JsonExportSource::new(tmp.path()).fetch_taxonomies().unwrap();
        assert!(taxonomies.is_empty());
    }

    #[test]
    fn reads_taxonomies() {
        let tmp = export(
            ITEMS,
            Some(
                r#"{"taxonomies": [{
                    "system": {"id": "t1", "name": "Colors", "codename": "colors"},
                    "terms": [{"name": "Red", "codename": "red", "terms": []}]
                }]}"#,
            ),
        );
        let taxonomies = JsonExportSource::new(tmp.path()).fetch_taxonomies().unwrap();
        assert_eq!(taxonomies.len(), 1);
        assert_eq!(taxonomies[0].system.codename, "colors");
        assert_eq!(taxonomies[0].terms[0].codename, "red");
    }
}
