//! Type dispatch: content items → resolved records.
//!
//! A [`Pipeline`] is one import run over an already-fetched item set. It
//! groups items by content type once, then walks the configured entries of
//! each output kind. Linked-only items added with [`Pipeline::with_linked`]
//! are visible to link lookups but never become records themselves:
//!
//! ```text
//! items ──group by type──▶ { type: [item, ...] }
//!                               │  per configured entry
//!                               ▼
//!            resolve filename/date/content ─▶ run mapper ─▶ ResolvedRecord
//! ```
//!
//! ## Records
//!
//! | Kind  | Filename      | Destination                         |
//! |-------|---------------|-------------------------------------|
//! | pages | `<slug>.html` | `Collection(name)` or `Pages`       |
//! | posts | `<slug>.html` | `Posts`                             |
//! | data  | `<slug>`      | `Data(key)`, key defaults to type   |
//!
//! The first page whose codename equals `pages.index` is renamed
//! `index.html`. A record's `layout` is chosen per item (`layouts`), then per
//! entry (`layout`), then per kind (`pages.default_layout`, `posts.layout`).
//! `layout` and `date` are only added to the data when they resolve, and they
//! override keys of the same name produced by the mapper.
//!
//! ## Failures
//!
//! Failures are contained and reported as [`Issue`]s next to the records:
//! - a malformed field or failing mapper skips that item only,
//! - an unknown mapper identifier aborts that entry only.
//!
//! Items are mapped in parallel per entry. Rayon's indexed collect keeps
//! input order, so output order is fetch order regardless of worker count.

use crate::config::{ImportConfig, OutputKind, TypeEntry};
use crate::mappers::{LinkLookup, MapperArgs, MapperError, MapperRegistry};
use crate::naming::Slugifier;
use crate::normalize::{normalize_map, normalize_taxonomy};
use crate::resolve::{FieldError, ItemResolver};
use crate::types::{ContentItem, Taxonomy};
use rayon::prelude::*;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::OnceLock;
use thiserror::Error;
use tracing::{debug, error, info, warn};

const DEFAULT_DATE_FIELD: &str = "date";
const DEFAULT_CONTENT_FIELD: &str = "content";
const INDEX_FILENAME: &str = "index.html";

/// Where a record is delivered on the site.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum Destination {
    Pages,
    Collection(String),
    Posts,
    Data(String),
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Destination::Pages => f.write_str("pages"),
            Destination::Collection(name) => write!(f, "collection {name}"),
            Destination::Posts => f.write_str("posts"),
            Destination::Data(key) => write!(f, "data {key}"),
        }
    }
}

/// One mapped content item, ready for the site.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedRecord {
    /// Source item codename.
    pub codename: String,
    /// Source item content type.
    pub content_type: String,
    /// Body text, possibly empty.
    pub content: String,
    /// Front matter / data fields, in mapper order.
    pub data: Map<String, Value>,
    pub destination: Destination,
    /// URL-safe output filename.
    pub filename: String,
}

/// A failure the run recovered from.
#[derive(Debug, Clone, PartialEq)]
pub enum Issue {
    /// One item was left out.
    SkippedItem {
        content_type: String,
        codename: String,
        reason: String,
    },
    /// A whole type entry produced nothing.
    FailedEntry {
        content_type: String,
        reason: String,
    },
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Issue::SkippedItem {
                content_type,
                codename,
                reason,
            } => write!(f, "skipped {content_type} '{codename}': {reason}"),
            Issue::FailedEntry {
                content_type,
                reason,
            } => write!(f, "failed {content_type}: {reason}"),
        }
    }
}

/// Errors that skip a single item.
#[derive(Error, Debug)]
pub enum ItemError {
    #[error(transparent)]
    Field(#[from] FieldError),
    #[error(transparent)]
    Mapper(#[from] MapperError),
}

/// Records of one output kind plus the issues hit producing them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordBatch {
    pub records: Vec<ResolvedRecord>,
    pub issues: Vec<Issue>,
}

impl RecordBatch {
    /// Records grouped by destination, each group in record order.
    pub fn grouped(&self) -> BTreeMap<&Destination, Vec<&ResolvedRecord>> {
        let mut groups: BTreeMap<&Destination, Vec<&ResolvedRecord>> = BTreeMap::new();
        for record in &self.records {
            groups.entry(&record.destination).or_default().push(record);
        }
        groups
    }
}

/// Everything one import run produces.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportOutput {
    pub pages: RecordBatch,
    pub posts: RecordBatch,
    pub data: RecordBatch,
    /// Taxonomy codename → `{system, terms}`, in allow-list order.
    pub taxonomies: Map<String, Value>,
}

impl ImportOutput {
    pub fn record_count(&self) -> usize {
        self.pages.records.len() + self.posts.records.len() + self.data.records.len()
    }

    pub fn issues(&self) -> impl Iterator<Item = &Issue> {
        self.pages
            .issues
            .iter()
            .chain(&self.posts.issues)
            .chain(&self.data.issues)
    }
}

// =============================================================================
// Link lookup
// =============================================================================

/// Codename → item over listed and linked-only items. The first item wins
/// when a codename repeats, so listed items shadow linked copies.
struct LinkIndex<'a> {
    items: HashMap<&'a str, &'a ContentItem>,
}

impl<'a> LinkIndex<'a> {
    fn new(items: &'a [ContentItem]) -> Self {
        let mut index = Self {
            items: HashMap::with_capacity(items.len()),
        };
        index.extend(items);
        index
    }

    fn extend(&mut self, items: &'a [ContentItem]) {
        for item in items {
            self.items.entry(item.codename()).or_insert(item);
        }
    }
}

/// Link lookup for one item being mapped.
struct ItemLinks<'p, 'a> {
    item: &'a ContentItem,
    index: &'p LinkIndex<'a>,
}

impl LinkLookup for ItemLinks<'_, '_> {
    fn linked(&self, role: &str) -> Vec<&ContentItem> {
        let codenames = self
            .item
            .element(role)
            .map(|value| value.linked_codenames())
            .unwrap_or_default();
        codenames
            .iter()
            .filter_map(|codename| {
                let linked = self.index.items.get(codename.as_str()).copied();
                if linked.is_none() {
                    debug!(
                        codename = %self.item.codename(),
                        role,
                        missing = %codename,
                        "linked item not in fetched set"
                    );
                }
                linked
            })
            .collect()
    }
}

// =============================================================================
// Pipeline
// =============================================================================

/// One import run over a fetched item set.
pub struct Pipeline<'a> {
    config: &'a ImportConfig,
    registry: &'a MapperRegistry,
    items: &'a [ContentItem],
    links: LinkIndex<'a>,
    groups: OnceLock<BTreeMap<&'a str, Vec<&'a ContentItem>>>,
    slugify: Slugifier,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        config: &'a ImportConfig,
        registry: &'a MapperRegistry,
        items: &'a [ContentItem],
    ) -> Self {
        Self {
            config,
            registry,
            items,
            links: LinkIndex::new(items),
            groups: OnceLock::new(),
            slugify: config.filenames.slug.slugifier(),
        }
    }

    /// Make linked-only items available to link lookups.
    pub fn with_linked(mut self, linked: &'a [ContentItem]) -> Self {
        self.links.extend(linked);
        self
    }

    /// Replace the configured slug policy.
    pub fn with_slugifier(mut self, slugify: Slugifier) -> Self {
        self.slugify = slugify;
        self
    }

    /// Items grouped by content type, input order kept within each group.
    ///
    /// Computed on first use and reused for the rest of the run.
    pub fn items_by_type(&self) -> &BTreeMap<&'a str, Vec<&'a ContentItem>> {
        self.groups.get_or_init(|| {
            let mut groups: BTreeMap<&'a str, Vec<&'a ContentItem>> = BTreeMap::new();
            for item in self.items {
                groups.entry(item.content_type()).or_default().push(item);
            }
            for (content_type, items) in &groups {
                if !self.is_configured(content_type) {
                    debug!(content_type, count = items.len(), "content type not configured, skipping");
                }
            }
            groups
        })
    }

    fn is_configured(&self, content_type: &str) -> bool {
        self.config
            .type_entries()
            .any(|(_, configured, _)| configured == content_type)
    }

    pub fn pages(&self) -> RecordBatch {
        let mut batch = RecordBatch::default();
        for (content_type, entry) in &self.config.pages.content_type {
            self.map_entry(OutputKind::Pages, content_type, entry, &mut batch);
        }
        if let Some(index) = &self.config.pages.index {
            apply_index(&mut batch.records, index);
        }
        log_batch(OutputKind::Pages, &batch);
        batch
    }

    pub fn posts(&self) -> RecordBatch {
        let mut batch = RecordBatch::default();
        for (content_type, entry) in &self.config.posts.content_type {
            self.map_entry(OutputKind::Posts, content_type, entry, &mut batch);
        }
        log_batch(OutputKind::Posts, &batch);
        batch
    }

    pub fn data(&self) -> RecordBatch {
        let mut batch = RecordBatch::default();
        for (content_type, entry) in &self.config.data {
            self.map_entry(OutputKind::Data, content_type, entry, &mut batch);
        }
        log_batch(OutputKind::Data, &batch);
        batch
    }

    /// Allow-listed taxonomy groups as plain data.
    pub fn taxonomies(&self, all: &[Taxonomy]) -> Map<String, Value> {
        filter_taxonomies(all, &self.config.taxonomies)
    }

    /// Pages, posts, data and taxonomies in one go.
    pub fn run_all(&self, taxonomies: &[Taxonomy]) -> ImportOutput {
        ImportOutput {
            pages: self.pages(),
            posts: self.posts(),
            data: self.data(),
            taxonomies: self.taxonomies(taxonomies),
        }
    }

    fn map_entry(
        &self,
        kind: OutputKind,
        content_type: &str,
        entry: &TypeEntry,
        batch: &mut RecordBatch,
    ) {
        if let Err(err) = self.check_mappers(entry) {
            error!(%kind, content_type, error = %err, "type entry aborted");
            batch.issues.push(Issue::FailedEntry {
                content_type: content_type.to_string(),
                reason: err.to_string(),
            });
            return;
        }
        let Some(items) = self.items_by_type().get(content_type) else {
            debug!(%kind, content_type, "no items of configured type");
            return;
        };

        let results: Vec<Result<ResolvedRecord, ItemError>> = items
            .par_iter()
            .map(|item| self.resolve_item(kind, content_type, entry, item))
            .collect();

        for (item, result) in items.iter().zip(results) {
            match result {
                Ok(record) => batch.records.push(record),
                Err(err) => {
                    warn!(%kind, content_type, codename = %item.codename(), error = %err, "skipping item");
                    batch.issues.push(Issue::SkippedItem {
                        content_type: content_type.to_string(),
                        codename: item.codename().to_string(),
                        reason: err.to_string(),
                    });
                }
            }
        }
    }

    /// Resolve the entry's mapper and every link-role mapper.
    fn check_mappers(&self, entry: &TypeEntry) -> Result<(), MapperError> {
        self.registry.mapper_for(&entry.data)?;
        for identifier in entry.linked_items.values() {
            self.registry.mapper_for(identifier)?;
        }
        Ok(())
    }

    fn resolve_item(
        &self,
        kind: OutputKind,
        content_type: &str,
        entry: &TypeEntry,
        item: &ContentItem,
    ) -> Result<ResolvedRecord, ItemError> {
        let resolver = ItemResolver::new(item, self.slugify);
        let slug = resolver.resolve_filename(entry.name.as_ref());
        let date = resolver.resolve_date(entry.date.as_ref(), DEFAULT_DATE_FIELD)?;
        let content = resolver.resolve_element(entry.content.as_ref(), DEFAULT_CONTENT_FIELD);

        let factory = self.registry.mapper_for(&entry.data)?;
        let links = ItemLinks {
            item,
            index: &self.links,
        };
        let mapper = factory(MapperArgs {
            item,
            linked_mappers: &entry.linked_items,
            links: &links,
            registry: self.registry,
        });
        let mut data = normalize_map(mapper.execute()?);

        if let Some(layout) = self.layout_for(kind, entry, item) {
            data.insert("layout".into(), Value::String(layout.to_string()));
        }
        if let Some(date) = date {
            data.insert("date".into(), Value::String(date));
        }

        let (filename, destination) = match kind {
            OutputKind::Pages => (
                format!("{slug}.html"),
                entry
                    .collection
                    .clone()
                    .map(Destination::Collection)
                    .unwrap_or(Destination::Pages),
            ),
            OutputKind::Posts => (format!("{slug}.html"), Destination::Posts),
            OutputKind::Data => (
                slug,
                Destination::Data(entry.key.clone().unwrap_or_else(|| content_type.to_string())),
            ),
        };

        Ok(ResolvedRecord {
            codename: item.codename().to_string(),
            content_type: content_type.to_string(),
            content,
            data,
            destination,
            filename,
        })
    }

    /// Per-item override > entry layout > kind default.
    fn layout_for<'e>(
        &'e self,
        kind: OutputKind,
        entry: &'e TypeEntry,
        item: &ContentItem,
    ) -> Option<&'e str> {
        let kind_default = match kind {
            OutputKind::Pages => self.config.pages.default_layout.as_deref(),
            OutputKind::Posts => self.config.posts.layout.as_deref(),
            OutputKind::Data => None,
        };
        entry
            .layouts
            .get(item.codename())
            .map(String::as_str)
            .or(entry.layout.as_deref())
            .or(kind_default)
    }
}

/// Rename the first record with the index codename to `index.html`.
fn apply_index(records: &mut [ResolvedRecord], index: &str) {
    let mut matches = records.iter_mut().filter(|r| r.codename == index);
    match matches.next() {
        Some(record) => record.filename = INDEX_FILENAME.to_string(),
        None => debug!(index, "index item not among pages"),
    }
    for duplicate in matches {
        warn!(
            codename = %duplicate.codename,
            content_type = %duplicate.content_type,
            "index codename matched more than one page, keeping its own filename"
        );
    }
}

fn log_batch(kind: OutputKind, batch: &RecordBatch) {
    info!(
        %kind,
        records = batch.records.len(),
        issues = batch.issues.len(),
        "mapped"
    );
}

/// Keep allow-listed taxonomy groups, in allow-list order.
pub fn filter_taxonomies(all: &[Taxonomy], allow: &[String]) -> Map<String, Value> {
    let mut out = Map::new();
    for codename in allow {
        match all.iter().find(|t| &t.system.codename == codename) {
            Some(taxonomy) => {
                out.insert(codename.clone(), normalize_taxonomy(taxonomy));
            }
            None => warn!(taxonomy = %codename, "configured taxonomy not found"),
        }
    }
    out
}
