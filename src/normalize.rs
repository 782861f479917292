//! Element normalization.
//!
//! Turns CMS element values into plain [`serde_json::Value`] trees that can be
//! written as front matter or data files without any knowledge of the content
//! model. Normalization is total: every [`ElementValue`] variant has a plain
//! form, and unknown or absent values degrade to `null` rather than failing.
//!
//! | Element | Plain form |
//! |---------|------------|
//! | text, url slug, custom | string |
//! | number | number (integral values as integers), `null` if absent |
//! | date & time | RFC 3339 UTC string, raw text if unparseable, `null` if absent |
//! | rich text | HTML string |
//! | asset | list of `{name, url, description}` |
//! | linked items | list of codenames |
//! | taxonomy, multiple choice | list of term codenames |
//! | unknown | `null` |
//!
//! Linked items are never followed here. Only mapper strategies dereference
//! links, and only one level deep, so cyclic link graphs can't recurse.

use crate::types::{Asset, ContentItem, ElementValue, SystemAttributes, Taxonomy, Term};
use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde_json::{Map, Number, Value, json};

/// Naive (zone-less) timestamp layouts accepted in addition to RFC 3339.
const NAIVE_DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Largest integer an `f64` represents exactly.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Renders embedded linked items inside rich text markup.
///
/// Implemented for any `Fn(&str) -> Option<String>` taking the linked item's
/// codename. Returning `None` leaves the reference in place.
pub trait RichTextResolver {
    fn resolve_linked_item(&self, codename: &str) -> Option<String>;
}

impl<F> RichTextResolver for F
where
    F: Fn(&str) -> Option<String>,
{
    fn resolve_linked_item(&self, codename: &str) -> Option<String> {
        self(codename)
    }
}

/// Normalize a single element value.
pub fn normalize(value: &ElementValue) -> Value {
    normalize_with(value, None)
}

/// Normalize a single element value, rendering rich text references through
/// `resolver` when one is given.
pub fn normalize_with(value: &ElementValue, resolver: Option<&dyn RichTextResolver>) -> Value {
    match value {
        ElementValue::Text(s) | ElementValue::UrlSlug(s) | ElementValue::Custom(s) => {
            Value::String(s.clone())
        }
        ElementValue::Number(n) => n.map(number_value).unwrap_or(Value::Null),
        ElementValue::DateTime(d) => match d {
            Some(raw) => Value::String(canonical_date(raw).unwrap_or_else(|| raw.clone())),
            None => Value::Null,
        },
        ElementValue::RichText(rt) => match resolver {
            Some(resolver) => Value::String(resolve_rich_text(&rt.html, resolver)),
            None => Value::String(rt.html.clone()),
        },
        ElementValue::Asset(assets) => Value::Array(assets.iter().map(normalize_asset).collect()),
        ElementValue::LinkedItems(codenames) => {
            Value::Array(codenames.iter().cloned().map(Value::String).collect())
        }
        ElementValue::Taxonomy(tax) => Value::Array(
            tax.terms
                .iter()
                .map(|t| Value::String(t.codename.clone()))
                .collect(),
        ),
        ElementValue::MultipleChoice(options) => Value::Array(
            options
                .iter()
                .map(|o| Value::String(o.codename.clone()))
                .collect(),
        ),
        ElementValue::Unknown => Value::Null,
    }
}

/// Normalize every element of an item, keyed by element codename.
pub fn normalize_elements(item: &ContentItem) -> Map<String, Value> {
    item.elements
        .iter()
        .map(|(codename, element)| (codename.clone(), normalize(&element.value)))
        .collect()
}

/// Re-normalize an already plain value.
///
/// Applies the same coercions as [`normalize`] to arbitrary JSON, so mapper
/// output built by hand ends up in the same canonical form. Idempotent:
/// `normalize_value(normalize_value(v)) == normalize_value(v)`.
pub fn normalize_value(value: Value) -> Value {
    match value {
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() => number_value(f),
            _ => Value::Number(n),
        },
        Value::Array(values) => Value::Array(values.into_iter().map(normalize_value).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, normalize_value(v)))
                .collect(),
        ),
        other => other,
    }
}

/// [`normalize_value`] over each entry of a map, keeping key order.
pub fn normalize_map(map: Map<String, Value>) -> Map<String, Value> {
    map.into_iter()
        .map(|(k, v)| (k, normalize_value(v)))
        .collect()
}

/// Plain form of an item's system attributes.
pub fn normalize_system(system: &SystemAttributes) -> Value {
    let mut map = Map::new();
    map.insert("id".into(), json!(system.id));
    map.insert("name".into(), json!(system.name));
    map.insert("codename".into(), json!(system.codename));
    map.insert("type".into(), json!(system.content_type));
    if let Some(language) = &system.language {
        map.insert("language".into(), json!(language));
    }
    if let Some(modified) = &system.last_modified {
        let modified = canonical_date(modified).unwrap_or_else(|| modified.clone());
        map.insert("last_modified".into(), Value::String(modified));
    }
    Value::Object(map)
}

/// Plain form of a taxonomy group: `{system, terms}` with nested terms.
pub fn normalize_taxonomy(taxonomy: &Taxonomy) -> Value {
    let mut system = Map::new();
    system.insert("id".into(), json!(taxonomy.system.id));
    system.insert("name".into(), json!(taxonomy.system.name));
    system.insert("codename".into(), json!(taxonomy.system.codename));
    if let Some(modified) = &taxonomy.system.last_modified {
        let modified = canonical_date(modified).unwrap_or_else(|| modified.clone());
        system.insert("last_modified".into(), Value::String(modified));
    }
    json!({
        "system": system,
        "terms": taxonomy.terms.iter().map(normalize_term).collect::<Vec<_>>(),
    })
}

fn normalize_term(term: &Term) -> Value {
    json!({
        "name": term.name,
        "codename": term.codename,
        "terms": term.terms.iter().map(normalize_term).collect::<Vec<_>>(),
    })
}

fn normalize_asset(asset: &Asset) -> Value {
    json!({
        "name": asset.name,
        "url": asset.url,
        "description": asset.description,
    })
}

fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() <= MAX_EXACT_INTEGER {
        Value::from(n as i64)
    } else {
        Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
    }
}

// =============================================================================
// Dates
// =============================================================================

/// Parse a date in any accepted layout.
///
/// Accepts RFC 3339 (any offset), zone-less timestamps (taken as UTC) and
/// plain `YYYY-MM-DD` dates (midnight UTC).
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Canonical RFC 3339 UTC form of a date string, e.g. `2024-01-15T10:00:00Z`.
pub fn canonical_date(raw: &str) -> Option<String> {
    parse_date(raw).map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true))
}

// =============================================================================
// Rich text references
// =============================================================================

const OBJECT_OPEN: &str = "<object";
const OBJECT_CLOSE: &str = "</object>";

/// Replace embedded linked-item `<object>` tags with resolver output.
///
/// Tags the resolver declines, and any other `<object>` markup, are copied
/// through untouched.
pub fn resolve_rich_text(html: &str, resolver: &dyn RichTextResolver) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;
    while let Some(start) = rest.find(OBJECT_OPEN) {
        let tail = &rest[start..];
        let Some(close) = tail.find(OBJECT_CLOSE) else {
            break;
        };
        let tag = &tail[..close + OBJECT_CLOSE.len()];
        out.push_str(&rest[..start]);
        match embedded_codename(tag).and_then(|c| resolver.resolve_linked_item(c)) {
            Some(rendered) => out.push_str(&rendered),
            None => out.push_str(tag),
        }
        rest = &tail[tag.len()..];
    }
    out.push_str(rest);
    out
}

fn embedded_codename(tag: &str) -> Option<&str> {
    let is_item = tag.contains(r#"type="application/kenticocloud""#)
        && tag.contains(r#"data-type="item""#);
    if !is_item {
        return None;
    }
    attribute(tag, "data-codename")
}

fn attribute<'a>(tag: &'a str, name: &str) -> Option<&'a str> {
    let needle = format!(r#"{name}=""#);
    let start = tag.find(&needle)? + needle.len();
    let len = tag[start..].find('"')?;
    Some(&tag[start..start + len])
}
