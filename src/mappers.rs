//! Mapper strategies: content item → output data fields.
//!
//! Each configured content type names a mapper by identifier (`data =
//! "default"`), and may name further mappers per link role
//! (`linked_items = { sections = "elements" }`). Identifiers are looked up in
//! a [`MapperRegistry`], so new content shapes plug in without touching the
//! dispatcher.
//!
//! ## Built-in strategies
//!
//! | Identifier | Output |
//! |------------|--------|
//! | `default`  | `{ "system": {...}, "elements": { codename: value, ... } }` |
//! | `elements` | `{ codename: value, ... }` |
//!
//! ## Linked items
//!
//! A mapper receives a [`LinkLookup`] that returns the already-fetched items
//! behind a link role (an element codename). When `linked_items` names a
//! mapper for a role, the built-ins map every linked item with it and store
//! the resulting list under the role's key in place of the bare codenames.
//!
//! Traversal is one level deep. Sub-mappers are handed [`NoLinks`], so a
//! linked item's own links stay codenames even when the link graph is
//! cyclic.

use crate::config::ImportConfig;
use crate::normalize::{normalize, normalize_elements, normalize_system};
use crate::types::{ContentItem, ElementValue};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

pub const DEFAULT_MAPPER: &str = "default";
pub const ELEMENTS_MAPPER: &str = "elements";

static NO_LINKED_MAPPERS: BTreeMap<String, String> = BTreeMap::new();

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MapperError {
    #[error("no mapper registered for identifier '{0}'")]
    Unknown(String),
    #[error("mapper '{mapper}' failed on item '{codename}': {reason}")]
    Failed {
        mapper: String,
        codename: String,
        reason: String,
    },
}

impl MapperError {
    pub fn failed(mapper: &str, item: &ContentItem, reason: impl Into<String>) -> Self {
        MapperError::Failed {
            mapper: mapper.to_string(),
            codename: item.codename().to_string(),
            reason: reason.into(),
        }
    }
}

/// Resolves a link role of the item being mapped to its linked items.
pub trait LinkLookup {
    fn linked(&self, role: &str) -> Vec<&ContentItem>;
}

/// Lookup for items whose links must not be followed.
pub struct NoLinks;

impl LinkLookup for NoLinks {
    fn linked(&self, _role: &str) -> Vec<&ContentItem> {
        Vec::new()
    }
}

/// Everything a mapper is constructed with.
#[derive(Clone, Copy)]
pub struct MapperArgs<'a> {
    pub item: &'a ContentItem,
    /// Link role → mapper identifier.
    pub linked_mappers: &'a BTreeMap<String, String>,
    pub links: &'a dyn LinkLookup,
    /// For constructing sub-mappers on linked items.
    pub registry: &'a MapperRegistry,
}

pub trait Mapper {
    fn execute(&self) -> Result<Map<String, Value>, MapperError>;
}

pub type MapperFactory = for<'a> fn(MapperArgs<'a>) -> Box<dyn Mapper + 'a>;

/// Mapper identifier → factory.
#[derive(Clone)]
pub struct MapperRegistry {
    factories: BTreeMap<String, MapperFactory>,
}

impl Default for MapperRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl fmt::Debug for MapperRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.factories.keys()).finish()
    }
}

impl MapperRegistry {
    pub fn empty() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// Registry with the `default` and `elements` strategies.
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        registry.register(DEFAULT_MAPPER, default_mapper);
        registry.register(ELEMENTS_MAPPER, elements_mapper);
        registry
    }

    /// Add or replace a strategy.
    pub fn register(&mut self, identifier: impl Into<String>, factory: MapperFactory) -> &mut Self {
        self.factories.insert(identifier.into(), factory);
        self
    }

    pub fn mapper_for(&self, identifier: &str) -> Result<MapperFactory, MapperError> {
        self.factories
            .get(identifier)
            .copied()
            .ok_or_else(|| MapperError::Unknown(identifier.to_string()))
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.factories.contains_key(identifier)
    }

    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Check every mapper identifier the config refers to.
    ///
    /// Run at load time so misconfiguration fails before any item is fetched.
    pub fn validate_config(&self, config: &ImportConfig) -> Result<(), MapperError> {
        for (_, _, entry) in config.type_entries() {
            self.mapper_for(&entry.data)?;
            for identifier in entry.linked_items.values() {
                self.mapper_for(identifier)?;
            }
        }
        Ok(())
    }
}

// =============================================================================
// Built-in strategies
// =============================================================================

fn default_mapper<'a>(args: MapperArgs<'a>) -> Box<dyn Mapper + 'a> {
    Box::new(DefaultMapper { args })
}

fn elements_mapper<'a>(args: MapperArgs<'a>) -> Box<dyn Mapper + 'a> {
    Box::new(ElementsMapper { args })
}

/// System block plus elements.
struct DefaultMapper<'a> {
    args: MapperArgs<'a>,
}

impl Mapper for DefaultMapper<'_> {
    fn execute(&self) -> Result<Map<String, Value>, MapperError> {
        let mut data = Map::new();
        data.insert("system".into(), normalize_system(&self.args.item.system));
        data.insert("elements".into(), Value::Object(map_elements(&self.args)?));
        Ok(data)
    }
}

/// Elements only, flattened to the top level.
struct ElementsMapper<'a> {
    args: MapperArgs<'a>,
}

impl Mapper for ElementsMapper<'_> {
    fn execute(&self) -> Result<Map<String, Value>, MapperError> {
        map_elements(&self.args)
    }
}

/// Normalize all elements, replacing linked-item roles that have a configured
/// mapper with the mapped linked items.
fn map_elements(args: &MapperArgs<'_>) -> Result<Map<String, Value>, MapperError> {
    if args.linked_mappers.is_empty() {
        return Ok(normalize_elements(args.item));
    }
    let mut out = Map::new();
    for (codename, element) in &args.item.elements {
        let value = match args.linked_mappers.get(codename) {
            Some(mapper) if matches!(element.value, ElementValue::LinkedItems(_)) => {
                map_linked(args, codename, mapper)?
            }
            _ => normalize(&element.value),
        };
        out.insert(codename.clone(), value);
    }
    Ok(out)
}

fn map_linked(args: &MapperArgs<'_>, role: &str, mapper: &str) -> Result<Value, MapperError> {
    let factory = args.registry.mapper_for(mapper)?;
    let mut mapped = Vec::new();
    for linked in args.links.linked(role) {
        let sub = factory(MapperArgs {
            item: linked,
            linked_mappers: &NO_LINKED_MAPPERS,
            links: &NoLinks,
            registry: args.registry,
        });
        mapped.push(Value::Object(sub.execute()?));
    }
    Ok(Value::Array(mapped))
}
