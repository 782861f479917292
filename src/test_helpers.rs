//! Shared test utilities for the kontent-import test suite.
//!
//! Provides an [`ItemBuilder`] for assembling content items without JSON
//! fixtures, and lookup helpers over pipeline output that panic with the
//! available choices on a miss.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let item = ItemBuilder::new("home", "landing_page")
//!     .text("title", "Welcome")
//!     .linked("sections", &["hero", "features"])
//!     .build();
//!
//! let batch = pipeline.pages();
//! let home = find_record(&batch, "home");
//! assert_eq!(home.filename, "index.html");
//! ```

use crate::pipeline::{RecordBatch, ResolvedRecord};
use crate::types::{ContentItem, Element, ElementValue, SystemAttributes, TaxonomyValue, TermRef};

// =========================================================================
// Item construction
// =========================================================================

/// Fluent builder for [`ContentItem`]s.
pub struct ItemBuilder {
    item: ContentItem,
}

impl ItemBuilder {
    pub fn new(codename: &str, content_type: &str) -> Self {
        Self {
            item: ContentItem {
                system: SystemAttributes {
                    id: format!("id-{codename}"),
                    name: String::new(),
                    codename: codename.to_string(),
                    content_type: content_type.to_string(),
                    language: Some("default".to_string()),
                    last_modified: None,
                },
                elements: Default::default(),
            },
        }
    }

    pub fn name(mut self, name: &str) -> Self {
        self.item.system.name = name.to_string();
        self
    }

    pub fn element(mut self, codename: &str, value: ElementValue) -> Self {
        self.item.elements.insert(
            codename.to_string(),
            Element {
                name: codename.to_string(),
                value,
            },
        );
        self
    }

    pub fn text(self, codename: &str, text: &str) -> Self {
        self.element(codename, ElementValue::Text(text.to_string()))
    }

    pub fn url_slug(self, codename: &str, slug: &str) -> Self {
        self.element(codename, ElementValue::UrlSlug(slug.to_string()))
    }

    pub fn date(self, codename: &str, date: &str) -> Self {
        self.element(codename, ElementValue::DateTime(Some(date.to_string())))
    }

    pub fn number(self, codename: &str, n: f64) -> Self {
        self.element(codename, ElementValue::Number(Some(n)))
    }

    pub fn linked(self, codename: &str, targets: &[&str]) -> Self {
        self.element(
            codename,
            ElementValue::LinkedItems(targets.iter().map(|t| t.to_string()).collect()),
        )
    }

    pub fn taxonomy(self, codename: &str, group: &str, terms: &[&str]) -> Self {
        self.element(
            codename,
            ElementValue::Taxonomy(TaxonomyValue {
                group: Some(group.to_string()),
                terms: terms
                    .iter()
                    .map(|t| TermRef {
                        name: t.to_string(),
                        codename: t.to_string(),
                    })
                    .collect(),
            }),
        )
    }

    pub fn build(self) -> ContentItem {
        self.item
    }
}

// =========================================================================
// Output lookups: panic with a clear message on miss
// =========================================================================

/// Find a record by source item codename. Panics if not found.
pub fn find_record<'a>(batch: &'a RecordBatch, codename: &str) -> &'a ResolvedRecord {
    batch
        .records
        .iter()
        .find(|r| r.codename == codename)
        .unwrap_or_else(|| {
            let codenames = record_codenames(batch);
            panic!("record '{codename}' not found. Available: {codenames:?}")
        })
}

/// Source codenames of all records, in output order.
pub fn record_codenames(batch: &RecordBatch) -> Vec<&str> {
    batch.records.iter().map(|r| r.codename.as_str()).collect()
}

/// Filenames of all records, in output order.
pub fn record_filenames(batch: &RecordBatch) -> Vec<&str> {
    batch.records.iter().map(|r| r.filename.as_str()).collect()
}
