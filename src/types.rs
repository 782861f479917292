//! Content model shared by every pipeline stage.
//!
//! These types mirror the delivery API's JSON shape closely enough to be
//! deserialized straight from an export, but element payloads are lifted into
//! the [`ElementValue`] union so resolution and normalization are exhaustive
//! matches rather than stringly-typed probing.
//!
//! ## Element decoding
//!
//! Elements arrive as `{ "type": "...", "name": "...", "value": ... }` plus a
//! few type-specific siblings (`modular_content`, `images`, `links`,
//! `taxonomy_group`). Decoding goes through [`RawElement`] and never fails on
//! shape: an unrecognised `type` becomes [`ElementValue::Unknown`] and a
//! mistyped `value` degrades to the variant's empty form.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use indexmap::IndexMap;
use std::collections::BTreeMap;

/// System attributes of a content item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemAttributes {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub codename: String,
    /// Content type codename.
    #[serde(rename = "type")]
    pub content_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
}

/// One content item as fetched from the CMS.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentItem {
    pub system: SystemAttributes,
    /// Elements in content-model order.
    #[serde(default)]
    pub elements: IndexMap<String, Element>,
}

impl ContentItem {
    pub fn codename(&self) -> &str {
        &self.system.codename
    }

    pub fn content_type(&self) -> &str {
        &self.system.content_type
    }

    /// Look up an element value by codename.
    pub fn element(&self, codename: &str) -> Option<&ElementValue> {
        self.elements.get(codename).map(|e| &e.value)
    }
}

/// A named, typed field of a content item.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawElement")]
pub struct Element {
    /// Display name from the content model (not the codename).
    pub name: String,
    pub value: ElementValue,
}

/// The value union over all element types the importer understands.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementValue {
    Text(String),
    RichText(RichText),
    Number(Option<f64>),
    /// Raw date string as delivered; parsed during resolution/normalization.
    DateTime(Option<String>),
    Asset(Vec<Asset>),
    /// Codenames of linked items, in editor order.
    LinkedItems(Vec<String>),
    Taxonomy(TaxonomyValue),
    MultipleChoice(Vec<TermRef>),
    UrlSlug(String),
    Custom(String),
    Unknown,
}

impl ElementValue {
    /// Delivery API discriminator for this variant.
    pub fn kind(&self) -> &'static str {
        match self {
            ElementValue::Text(_) => "text",
            ElementValue::RichText(_) => "rich_text",
            ElementValue::Number(_) => "number",
            ElementValue::DateTime(_) => "date_time",
            ElementValue::Asset(_) => "asset",
            ElementValue::LinkedItems(_) => "modular_content",
            ElementValue::Taxonomy(_) => "taxonomy",
            ElementValue::MultipleChoice(_) => "multiple_choice",
            ElementValue::UrlSlug(_) => "url_slug",
            ElementValue::Custom(_) => "custom",
            ElementValue::Unknown => "unknown",
        }
    }

    /// The element's value as raw text, for field resolution.
    ///
    /// Only scalar-ish variants have a textual form; lists and unknown
    /// elements return `None` so resolvers move on to the next candidate.
    pub fn raw_text(&self) -> Option<String> {
        match self {
            ElementValue::Text(s) | ElementValue::UrlSlug(s) | ElementValue::Custom(s) => {
                Some(s.clone())
            }
            ElementValue::RichText(rt) => Some(rt.html.clone()),
            ElementValue::DateTime(d) => d.clone(),
            ElementValue::Number(n) => n.map(|n| n.to_string()),
            ElementValue::Asset(_)
            | ElementValue::LinkedItems(_)
            | ElementValue::Taxonomy(_)
            | ElementValue::MultipleChoice(_)
            | ElementValue::Unknown => None,
        }
    }

    /// Codenames of items this element links to (linked items or items
    /// embedded in rich text).
    pub fn linked_codenames(&self) -> &[String] {
        match self {
            ElementValue::LinkedItems(codenames) => codenames,
            ElementValue::RichText(rt) => &rt.linked_items,
            _ => &[],
        }
    }
}

/// Rich text markup plus the references embedded in it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RichText {
    pub html: String,
    pub linked_items: Vec<String>,
    pub images: Vec<RichTextImage>,
    pub links: Vec<RichTextLink>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RichTextImage {
    #[serde(default)]
    pub image_id: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RichTextLink {
    #[serde(skip)]
    pub link_id: String,
    #[serde(default)]
    pub codename: String,
    #[serde(default, rename = "type")]
    pub content_type: String,
    #[serde(default)]
    pub url_slug: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, rename = "type")]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
}

/// Codename + display name pair used by taxonomy and multiple choice values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TermRef {
    #[serde(default)]
    pub name: String,
    pub codename: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaxonomyValue {
    pub group: Option<String>,
    pub terms: Vec<TermRef>,
}

/// A taxonomy group as returned by the taxonomies endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Taxonomy {
    pub system: TaxonomySystem,
    #[serde(default)]
    pub terms: Vec<Term>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaxonomySystem {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub codename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
}

/// A taxonomy term; terms nest arbitrarily deep.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Term {
    #[serde(default)]
    pub name: String,
    pub codename: String,
    #[serde(default)]
    pub terms: Vec<Term>,
}

// =============================================================================
// Element decoding
// =============================================================================

/// Wire shape of an element before it is lifted into [`ElementValue`].
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawElement {
    #[serde(rename = "type")]
    kind: String,
    name: String,
    value: Value,
    modular_content: Vec<String>,
    images: BTreeMap<String, RichTextImage>,
    links: BTreeMap<String, RichTextLink>,
    taxonomy_group: Option<String>,
}

impl From<RawElement> for Element {
    fn from(raw: RawElement) -> Self {
        let value = match raw.kind.as_str() {
            "text" => ElementValue::Text(string_value(&raw.value)),
            "url_slug" => ElementValue::UrlSlug(string_value(&raw.value)),
            "custom" => ElementValue::Custom(string_value(&raw.value)),
            "number" => ElementValue::Number(raw.value.as_f64()),
            "date_time" => ElementValue::DateTime(raw.value.as_str().map(String::from)),
            "rich_text" => ElementValue::RichText(RichText {
                html: string_value(&raw.value),
                linked_items: raw.modular_content,
                images: raw.images.into_values().collect(),
                links: raw
                    .links
                    .into_iter()
                    .map(|(link_id, link)| RichTextLink { link_id, ..link })
                    .collect(),
            }),
            "asset" => ElementValue::Asset(list_value(raw.value)),
            "modular_content" => ElementValue::LinkedItems(list_value(raw.value)),
            "taxonomy" => ElementValue::Taxonomy(TaxonomyValue {
                group: raw.taxonomy_group,
                terms: list_value(raw.value),
            }),
            "multiple_choice" => ElementValue::MultipleChoice(list_value(raw.value)),
            _ => ElementValue::Unknown,
        };
        Element {
            name: raw.name,
            value,
        }
    }
}

fn string_value(value: &Value) -> String {
    value.as_str().unwrap_or_default().to_string()
}

/// Decode a JSON array element-wise, dropping entries that don't fit.
fn list_value<T: serde::de::DeserializeOwned>(value: Value) -> Vec<T> {
    match value {
        Value::Array(entries) => entries
            .into_iter()
            .filter_map(|v| serde_json::from_value(v).ok())
            .collect(),
        _ => Vec::new(),
    }
}
