//! The site side: documents, collections and the data store.
//!
//! Records from the pipeline are delivered into a [`Site`] the way a Jekyll
//! plugin would hand them to Jekyll:
//!
//! | Destination | Goes to |
//! |-------------|---------|
//! | `Pages` | site pages |
//! | `Collection(name)` | site pages *and* collection `name` |
//! | `Posts` | the `posts` collection |
//! | `Data(key)` | appended to the data store array under `key` |
//! | taxonomies | data store key `taxonomies` |
//!
//! Collections are created on first use.
//!
//! ## On disk
//!
//! [`Site::write_to`] lays the result out as a Jekyll source tree:
//!
//! ```text
//! site/
//! ├── index.html            # page: JSON front matter + content
//! ├── about-us.html
//! ├── _landing/
//! │   └── spring-promo.html # collection document
//! ├── _posts/
//! │   └── hello-world.html
//! └── _data/
//!     ├── authors.json
//!     └── taxonomies.json
//! ```
//!
//! Front matter is written as pretty JSON between `---` lines. JSON is a
//! subset of YAML, so Jekyll reads it unchanged.

use crate::pipeline::{Destination, ImportOutput, RecordBatch, ResolvedRecord};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

pub const POSTS_COLLECTION: &str = "posts";
pub const TAXONOMIES_KEY: &str = "taxonomies";
const DATA_DIR: &str = "_data";

#[derive(Error, Debug)]
pub enum SiteError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A renderable file: front matter plus body, at a site-relative path.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub path: PathBuf,
    pub content: String,
    pub data: Map<String, Value>,
}

impl Document {
    /// Front matter block followed by the content.
    pub fn render(&self) -> Result<String, SiteError> {
        let front_matter = serde_json::to_string_pretty(&self.data)?;
        Ok(format!("---\n{front_matter}\n---\n{}", self.content))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Collection {
    pub label: String,
    pub docs: Vec<Document>,
}

impl Collection {
    fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            docs: Vec::new(),
        }
    }

    /// Directory documents of this collection live in, e.g. `_posts`.
    pub fn dir(&self) -> PathBuf {
        PathBuf::from(format!("_{}", self.label))
    }
}

/// Files written by [`Site::write_to`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteSummary {
    pub documents: usize,
    pub data_files: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Site {
    pub pages: Vec<Document>,
    pub collections: BTreeMap<String, Collection>,
    pub data: Map<String, Value>,
}

impl Site {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_document(
        path: impl Into<PathBuf>,
        content: &str,
        data: &Map<String, Value>,
    ) -> Document {
        Document {
            path: path.into(),
            content: content.to_string(),
            data: data.clone(),
        }
    }

    /// The named collection, created empty if it doesn't exist yet.
    pub fn collection_mut(&mut self, label: &str) -> &mut Collection {
        self.collections
            .entry(label.to_string())
            .or_insert_with(|| Collection::new(label))
    }

    /// Deliver every record of a batch to its destination.
    pub fn deliver_batch(&mut self, batch: &RecordBatch) {
        for record in &batch.records {
            self.deliver_record(record);
        }
    }

    fn deliver_record(&mut self, record: &ResolvedRecord) {
        match &record.destination {
            Destination::Pages => {
                self.pages.push(Self::create_document(
                    &record.filename,
                    &record.content,
                    &record.data,
                ));
            }
            Destination::Collection(label) => {
                self.pages.push(Self::create_document(
                    &record.filename,
                    &record.content,
                    &record.data,
                ));
                let collection = self.collection_mut(label);
                let doc =
                    Self::create_document(collection.dir().join(&record.filename), &record.content, &record.data);
                collection.docs.push(doc);
            }
            Destination::Posts => {
                let posts = self.collection_mut(POSTS_COLLECTION);
                let doc =
                    Self::create_document(posts.dir().join(&record.filename), &record.content, &record.data);
                posts.docs.push(doc);
            }
            Destination::Data(key) => self.push_data(key, Value::Object(record.data.clone())),
        }
    }

    /// Append to the array stored under `key`. A non-array value already
    /// there becomes the first element.
    fn push_data(&mut self, key: &str, value: Value) {
        let slot = self
            .data
            .entry(key.to_string())
            .or_insert_with(|| Value::Array(Vec::new()));
        match slot {
            Value::Array(values) => values.push(value),
            other => {
                let previous = other.take();
                *other = Value::Array(vec![previous, value]);
            }
        }
    }

    /// Store taxonomy groups under the `taxonomies` data key.
    pub fn deliver_taxonomies(&mut self, taxonomies: &Map<String, Value>) {
        if taxonomies.is_empty() {
            return;
        }
        self.data
            .insert(TAXONOMIES_KEY.to_string(), Value::Object(taxonomies.clone()));
    }

    /// Deliver a whole import run.
    pub fn deliver(&mut self, output: &ImportOutput) {
        self.deliver_batch(&output.pages);
        self.deliver_batch(&output.posts);
        self.deliver_batch(&output.data);
        self.deliver_taxonomies(&output.taxonomies);
    }

    /// Write pages, collection documents and data files under `root`.
    ///
    /// A path delivered more than once is written once, first delivery wins.
    pub fn write_to(&self, root: &Path) -> Result<WriteSummary, SiteError> {
        fs::create_dir_all(root)?;
        let mut summary = WriteSummary::default();
        let mut written: HashSet<&Path> = HashSet::new();

        let documents = self
            .pages
            .iter()
            .chain(self.collections.values().flat_map(|c| &c.docs));
        for doc in documents {
            if !written.insert(&doc.path) {
                debug!(path = %doc.path.display(), "document already written");
                continue;
            }
            let target = root.join(&doc.path);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&target, doc.render()?)?;
            summary.documents += 1;
        }

        if !self.data.is_empty() {
            let data_dir = root.join(DATA_DIR);
            fs::create_dir_all(&data_dir)?;
            for (key, value) in &self.data {
                let json = serde_json::to_string_pretty(value)?;
                fs::write(data_dir.join(format!("{key}.json")), json)?;
                summary.data_files += 1;
            }
        }

        Ok(summary)
    }
}
