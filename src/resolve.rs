//! Per-item field resolution.
//!
//! A record's filename, date and body come from item elements chosen by
//! configuration. Each is described by a [`FieldRule`]: either one element
//! codename or an ordered list of candidates.
//!
//! ```toml
//! name = ["slug", "title"]   # try `slug`, then `title`
//! date = "published"
//! content = "body"
//! ```
//!
//! ## Resolution priority
//!
//! Candidates are tried in order and the first present, non-empty value wins
//! (whitespace-only counts as empty). With no rule configured the resolver
//! looks at a default element instead.
//!
//! - **Filename**: rule → item name → codename, then slugified. If the slug
//!   comes out empty (e.g. an all-CJK title under an ASCII slug policy) the
//!   codename, then the item id, are tried so the filename is never empty.
//! - **Date**: rule → `default_field`; parsed to RFC 3339 UTC. A value that
//!   is present but unparseable is a [`FieldError::Malformed`].
//! - **Content**: rule → `default_field`; missing resolves to `""`.

use crate::naming::Slugifier;
use crate::normalize::canonical_date;
use crate::types::ContentItem;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FieldError {
    #[error("malformed {field} value {value:?} on item '{codename}': {reason}")]
    Malformed {
        codename: String,
        field: String,
        value: String,
        reason: String,
    },
}

/// A field name or an ordered list of candidate field names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldRule {
    Single(String),
    Candidates(Vec<String>),
}

impl FieldRule {
    /// Candidate element codenames in priority order.
    pub fn candidates(&self) -> &[String] {
        match self {
            FieldRule::Single(name) => std::slice::from_ref(name),
            FieldRule::Candidates(names) => names,
        }
    }
}

impl From<&str> for FieldRule {
    fn from(name: &str) -> Self {
        FieldRule::Single(name.to_string())
    }
}

impl From<&[&str]> for FieldRule {
    fn from(names: &[&str]) -> Self {
        FieldRule::Candidates(names.iter().map(|n| n.to_string()).collect())
    }
}

/// Return the first value that is not blank, as given.
pub fn first_non_empty<I>(sources: I) -> Option<String>
where
    I: IntoIterator<Item = Option<String>>,
{
    sources
        .into_iter()
        .flatten()
        .find(|s| !s.trim().is_empty())
}

/// Resolves configured fields against one content item.
pub struct ItemResolver<'a> {
    item: &'a ContentItem,
    slugify: Slugifier,
}

impl<'a> ItemResolver<'a> {
    pub fn new(item: &'a ContentItem, slugify: Slugifier) -> Self {
        Self { item, slugify }
    }

    /// Raw text of the first candidate element with a non-empty value.
    fn resolve_raw(&self, rule: Option<&FieldRule>, default_field: &str) -> Option<String> {
        let candidates: Vec<&str> = match rule {
            Some(rule) => rule.candidates().iter().map(String::as_str).collect(),
            None => vec![default_field],
        };
        first_non_empty(
            candidates
                .into_iter()
                .map(|name| self.item.element(name).and_then(|value| value.raw_text())),
        )
    }

    /// Slug-safe filename stem (no extension). Never empty.
    pub fn resolve_filename(&self, rule: Option<&FieldRule>) -> String {
        let system = &self.item.system;
        let resolved = rule.and_then(|rule| self.resolve_raw(Some(rule), ""));
        let fallbacks = [
            resolved,
            Some(system.name.clone()),
            Some(system.codename.clone()),
            Some(system.id.clone()),
        ];
        fallbacks
            .into_iter()
            .flatten()
            .map(|text| (self.slugify)(&text))
            .find(|slug| !slug.is_empty())
            .unwrap_or_else(|| "item".to_string())
    }

    /// Canonical date, `None` when no candidate has a value.
    pub fn resolve_date(
        &self,
        rule: Option<&FieldRule>,
        default_field: &str,
    ) -> Result<Option<String>, FieldError> {
        let Some(raw) = self.resolve_raw(rule, default_field) else {
            return Ok(None);
        };
        match canonical_date(&raw) {
            Some(date) => Ok(Some(date)),
            None => Err(FieldError::Malformed {
                codename: self.item.system.codename.clone(),
                field: "date".into(),
                value: raw,
                reason: "not a recognised date or timestamp".into(),
            }),
        }
    }

    /// Body text; missing elements resolve to an empty string.
    pub fn resolve_element(&self, rule: Option<&FieldRule>, default_field: &str) -> String {
        self.resolve_raw(rule, default_field).unwrap_or_default()
    }
}
