//! Import configuration.
//!
//! Handles loading, validating, and resolving `kontent.toml`. The file says
//! which content types become pages, posts or data records, how their
//! filenames, dates and bodies are resolved, and which mapper strategy turns
//! each item into output data.
//!
//! ## Configuration Options
//!
//! ```toml
//! project_id = "ENV_KONTENT_PROJECT_ID"  # ENV_ prefix reads the environment
//! secure_key = "ENV_KONTENT_SECURE_KEY"
//! source = "export"                      # directory holding items.json
//! taxonomies = ["colors", "sizes"]       # taxonomy groups to import
//!
//! [filenames]
//! slug = "kebab"                         # or "preserve-case"
//!
//! [processing]
//! max_processes = 4                      # omit for auto = CPU cores
//!
//! [pages]
//! default_layout = "page"
//! index = "home"                         # codename rendered as index.html
//!
//! [pages.content_type.landing_page]
//! data = "default"                       # mapper identifier
//! collection = "landing"
//! layout = "landing"
//! name = ["slug", "title"]               # first non-empty wins
//! content = "body"
//! linked_items = { sections = "elements" }
//! layouts = { home = "home" }            # per-codename override
//!
//! [posts]
//! layout = "post"
//!
//! [posts.content_type.article]
//! name = "title"
//! date = "published"
//!
//! [data.author]
//! key = "authors"                        # data store key, default = type
//! data = "elements"
//! ```
//!
//! ## Environment indirection
//!
//! String values of `project_id`, `secure_key` and `source` that start with
//! `ENV_` are read from the environment variable named by the rest of the
//! value (`ENV_KONTENT_KEY` → `$KONTENT_KEY`) when accessed, so secrets never
//! live in the file.
//!
//! Unknown keys are rejected to catch typos early.

use crate::naming::SlugStyle;
use crate::resolve::FieldRule;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Marker prefix for values read from the environment.
pub const ENV_PREFIX: &str = "ENV_";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
    #[error("Environment variable {0} is not set")]
    MissingEnv(String),
}

/// The three record-producing output kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OutputKind {
    Pages,
    Posts,
    Data,
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OutputKind::Pages => "pages",
            OutputKind::Posts => "posts",
            OutputKind::Data => "data",
        })
    }
}

/// Import configuration loaded from `kontent.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImportConfig {
    /// Delivery project id (`ENV_` indirection allowed).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    /// Delivery API key (`ENV_` indirection allowed).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secure_key: Option<String>,
    /// Export directory to read content from (`ENV_` indirection allowed).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Taxonomy group codenames to import, in output order.
    pub taxonomies: Vec<String>,
    pub filenames: FilenamesConfig,
    pub processing: ProcessingConfig,
    pub pages: PagesConfig,
    pub posts: PostsConfig,
    /// Content type codename → data entry, in file order.
    pub data: IndexMap<String, TypeEntry>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilenamesConfig {
    pub slug: SlugStyle,
}

/// Parallel mapping settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel mapping workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_processes.map(|n| n.min(cores)).unwrap_or(cores)
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PagesConfig {
    /// Layout for page types that set none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_layout: Option<String>,
    /// Codename of the item rendered as the site's `index.html`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<String>,
    /// Content type codename → page entry, in file order.
    pub content_type: IndexMap<String, TypeEntry>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PostsConfig {
    /// Layout for post types that set none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<String>,
    /// Content type codename → post entry, in file order.
    pub content_type: IndexMap<String, TypeEntry>,
}

/// How one content type is turned into records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TypeEntry {
    /// Mapper identifier.
    pub data: String,
    /// Link role (element codename) → mapper identifier.
    pub linked_items: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<FieldRule>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<FieldRule>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<FieldRule>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<String>,
    /// Pages only: destination collection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,
    /// Pages only: item codename → layout override.
    pub layouts: BTreeMap<String, String>,
    /// Data only: data store key (defaults to the content type codename).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

impl Default for TypeEntry {
    fn default() -> Self {
        Self {
            data: crate::mappers::DEFAULT_MAPPER.to_string(),
            linked_items: BTreeMap::new(),
            name: None,
            date: None,
            content: None,
            layout: None,
            collection: None,
            layouts: BTreeMap::new(),
            key: None,
        }
    }
}

impl ImportConfig {
    /// All type entries as `(kind, content type, entry)`, pages first, each
    /// kind in file order.
    pub fn type_entries(&self) -> impl Iterator<Item = (OutputKind, &str, &TypeEntry)> {
        let pages = self
            .pages
            .content_type
            .iter()
            .map(|(t, e)| (OutputKind::Pages, t.as_str(), e));
        let posts = self
            .posts
            .content_type
            .iter()
            .map(|(t, e)| (OutputKind::Posts, t.as_str(), e));
        let data = self
            .data
            .iter()
            .map(|(t, e)| (OutputKind::Data, t.as_str(), e));
        pages.chain(posts).chain(data)
    }

    /// Validate config values and per-kind key usage.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        if self.taxonomies.iter().any(|t| t.trim().is_empty()) {
            return Err(ConfigError::Validation(
                "taxonomies must not contain empty codenames".into(),
            ));
        }
        for (kind, content_type, entry) in self.type_entries() {
            let at = format!("{kind}.{content_type}");
            if entry.data.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "{at}: data (mapper identifier) must not be empty"
                )));
            }
            for rule in [&entry.name, &entry.date, &entry.content].into_iter().flatten() {
                if rule.candidates().is_empty() {
                    return Err(ConfigError::Validation(format!(
                        "{at}: field rules need at least one candidate"
                    )));
                }
            }
            if kind != OutputKind::Pages && entry.collection.is_some() {
                return Err(ConfigError::Validation(format!(
                    "{at}: collection is only valid for pages"
                )));
            }
            if kind != OutputKind::Pages && !entry.layouts.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "{at}: layouts is only valid for pages"
                )));
            }
            if kind != OutputKind::Data && entry.key.is_some() {
                return Err(ConfigError::Validation(format!(
                    "{at}: key is only valid for data"
                )));
            }
        }
        Ok(())
    }

    /// Project id with environment indirection applied.
    pub fn project_id(&self) -> Result<Option<String>, ConfigError> {
        self.project_id.as_deref().map(value_for).transpose()
    }

    /// API key with environment indirection applied.
    pub fn secure_key(&self) -> Result<Option<String>, ConfigError> {
        self.secure_key.as_deref().map(value_for).transpose()
    }

    /// Export directory with environment indirection applied.
    pub fn source_dir(&self) -> Result<Option<PathBuf>, ConfigError> {
        Ok(self
            .source
            .as_deref()
            .map(value_for)
            .transpose()?
            .map(PathBuf::from))
    }
}

/// Resolve a config value, reading `ENV_NAME` values from `$NAME`.
pub fn value_for(raw: &str) -> Result<String, ConfigError> {
    match raw.strip_prefix(ENV_PREFIX) {
        Some(var) => std::env::var(var).map_err(|_| ConfigError::MissingEnv(var.to_string())),
        None => Ok(raw.to_string()),
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(ImportConfig::default())
        .unwrap_or_else(|_| toml::Value::Table(toml::Table::new()))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file doesn't exist.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<ImportConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: ImportConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from the given file.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result. A missing file yields the (empty) defaults.
pub fn load_config(path: &Path) -> Result<ImportConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(path)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented sample `kontent.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# kontent-import configuration
# ============================
# Maps content types from the CMS onto pages, posts and data records.
# Unknown keys will cause an error.

# Values starting with ENV_ are read from the environment at run time:
# ENV_KONTENT_SECURE_KEY reads $KONTENT_SECURE_KEY.
project_id = "ENV_KONTENT_PROJECT_ID"
secure_key = "ENV_KONTENT_SECURE_KEY"

# Directory holding items.json (and optionally taxonomies.json).
source = "export"

# Taxonomy groups to import into _data/taxonomies.json.
taxonomies = ["categories"]

# ---------------------------------------------------------------------------
# Filenames
# ---------------------------------------------------------------------------
[filenames]
# "kebab" lower-cases (Hello World -> hello-world),
# "preserve-case" keeps capitals (Hello World -> Hello-World).
slug = "kebab"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel mapping workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4

# ---------------------------------------------------------------------------
# Pages
# ---------------------------------------------------------------------------
[pages]
# Layout used when neither the item nor its type sets one.
default_layout = "page"
# Codename of the item written as index.html.
index = "home"

[pages.content_type.landing_page]
# Mapper identifier: "default" (system + elements) or "elements" (flat).
data = "default"
# Pages of this type are grouped into a collection.
collection = "landing"
# Field rules: one element codename, or a list tried in order.
name = ["url", "title"]
content = "body"
# Map linked items in the "sections" element with the "elements" mapper.
linked_items = { sections = "elements" }
# Per-item layout overrides, keyed by codename.
layouts = { home = "home" }

# ---------------------------------------------------------------------------
# Posts
# ---------------------------------------------------------------------------
[posts]
layout = "post"

[posts.content_type.article]
data = "default"
name = ["url", "title"]
date = "published"
content = "body"

# ---------------------------------------------------------------------------
# Data
# ---------------------------------------------------------------------------
[data.author]
# Records are collected under _data/<key>.json.
key = "authors"
data = "elements"
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_is_empty() {
        let config = ImportConfig::default();
        assert!(config.pages.content_type.is_empty());
        assert!(config.posts.content_type.is_empty());
        assert!(config.data.is_empty());
        assert!(config.taxonomies.is_empty());
        assert_eq!(config.filenames.slug, SlugStyle::Kebab);
    }

    #[test]
    fn type_entry_defaults_to_default_mapper() {
        let entry = TypeEntry::default();
        assert_eq!(entry.data, "default");
        assert!(entry.linked_items.is_empty());
    }

    #[test]
    fn parse_page_entry() {
        let toml = r#"
[pages]
default_layout = "page"
index = "home"

[pages.content_type.landing_page]
collection = "landing"
name = ["slug", "title"]
content = "body"
linked_items = { sections = "elements" }
layouts = { home = "home" }
"#;
        let config: ImportConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.pages.index.as_deref(), Some("home"));
        let entry = &config.pages.content_type["landing_page"];
        assert_eq!(entry.data, "default");
        assert_eq!(entry.collection.as_deref(), Some("landing"));
        assert_eq!(
            entry.name,
            Some(FieldRule::Candidates(vec!["slug".into(), "title".into()]))
        );
        assert_eq!(entry.content, Some(FieldRule::Single("body".into())));
        assert_eq!(entry.linked_items["sections"], "elements");
        assert_eq!(entry.layouts["home"], "home");
    }

    #[test]
    fn parse_posts_and_data() {
        let toml = r#"
[posts]
layout = "post"

[posts.content_type.article]
date = "published"

[data.author]
key = "authors"
data = "elements"
"#;
        let config: ImportConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.posts.layout.as_deref(), Some("post"));
        assert_eq!(
            config.posts.content_type["article"].date,
            Some(FieldRule::Single("published".into()))
        );
        assert_eq!(config.data["author"].key.as_deref(), Some("authors"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn type_entries_lists_pages_posts_then_data() {
        let toml = r#"
[data.b]
[posts.content_type.c]
[pages.content_type.a]
"#;
        let config: ImportConfig = toml::from_str(toml).unwrap();
        let entries: Vec<(OutputKind, &str)> =
            config.type_entries().map(|(k, t, _)| (k, t)).collect();
        assert_eq!(
            entries,
            vec![
                (OutputKind::Pages, "a"),
                (OutputKind::Posts, "c"),
                (OutputKind::Data, "b"),
            ]
        );
    }

    #[test]
    fn type_tables_keep_file_order() {
        let toml = r#"
[pages.content_type.zeta]
[pages.content_type.alpha]
[posts.content_type.story]
[posts.content_type.news]
[data.tag]
[data.author]
"#;
        let config: ImportConfig = toml::from_str(toml).unwrap();
        let entries: Vec<&str> = config.type_entries().map(|(_, t, _)| t).collect();
        assert_eq!(entries, vec!["zeta", "alpha", "story", "news", "tag", "author"]);
    }

    #[test]
    fn load_config_keeps_file_order_through_merge() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("kontent.toml");
        fs::write(
            &path,
            "[pages.content_type.zeta]\n[pages.content_type.mid]\n[pages.content_type.alpha]\n",
        )
        .unwrap();
        let config = load_config(&path).unwrap();
        assert_eq!(
            config.pages.content_type.keys().collect::<Vec<_>>(),
            vec!["zeta", "mid", "alpha"]
        );
    }

    // =========================================================================
    // Unknown key rejection tests
    // =========================================================================

    #[test]
    fn unknown_key_rejected() {
        let toml_str = r#"
[pages.content_type.page]
colection = "typo"
"#;
        let result: Result<ImportConfig, _> = toml::from_str(toml_str);
        let err = result.unwrap_err().to_string();
        assert!(err.contains("unknown field"));
    }

    #[test]
    fn unknown_section_rejected() {
        let result: Result<ImportConfig, _> = toml::from_str("[pagez]\nindex = \"x\"\n");
        assert!(result.is_err());
    }

    // =========================================================================
    // Validation tests
    // =========================================================================

    #[test]
    fn collection_only_valid_for_pages() {
        let config: ImportConfig =
            toml::from_str("[posts.content_type.article]\ncollection = \"x\"\n").unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("posts.article: collection"));
    }

    #[test]
    fn layouts_only_valid_for_pages() {
        let config: ImportConfig =
            toml::from_str("[data.author]\nlayouts = { a = \"b\" }\n").unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn key_only_valid_for_data() {
        let config: ImportConfig =
            toml::from_str("[pages.content_type.page]\nkey = \"x\"\n").unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn empty_mapper_identifier_rejected() {
        let config: ImportConfig =
            toml::from_str("[pages.content_type.page]\ndata = \"\"\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn empty_candidate_list_rejected() {
        let config: ImportConfig =
            toml::from_str("[pages.content_type.page]\nname = []\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_workers_rejected() {
        let config: ImportConfig = toml::from_str("[processing]\nmax_processes = 0\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_default_config_passes() {
        assert!(ImportConfig::default().validate().is_ok());
    }

    // =========================================================================
    // Processing config tests
    // =========================================================================

    #[test]
    fn effective_threads_auto() {
        let config = ProcessingConfig {
            max_processes: None,
        };
        let threads = effective_threads(&config);
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        assert_eq!(threads, cores);
    }

    #[test]
    fn effective_threads_clamped_to_cores() {
        let config = ProcessingConfig {
            max_processes: Some(99999),
        };
        let threads = effective_threads(&config);
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        assert_eq!(threads, cores);
    }

    #[test]
    fn effective_threads_user_constrains_down() {
        let config = ProcessingConfig {
            max_processes: Some(1),
        };
        assert_eq!(effective_threads(&config), 1);
    }

    #[test]
    fn parse_processing_config() {
        let config: ImportConfig = toml::from_str("[processing]\nmax_processes = 4\n").unwrap();
        assert_eq!(config.processing.max_processes, Some(4));
    }

    // =========================================================================
    // Environment indirection
    // =========================================================================

    #[test]
    fn plain_values_are_literal() {
        assert_eq!(value_for("my-project").unwrap(), "my-project");
    }

    #[test]
    fn env_prefixed_values_read_environment() {
        let expected = std::env::var("PATH").unwrap();
        assert_eq!(value_for("ENV_PATH").unwrap(), expected);
    }

    #[test]
    fn missing_env_var_is_error() {
        let result = value_for("ENV_KONTENT_IMPORT_SURELY_UNSET_VARIABLE");
        assert!(
            matches!(result, Err(ConfigError::MissingEnv(ref v)) if v == "KONTENT_IMPORT_SURELY_UNSET_VARIABLE")
        );
    }

    #[test]
    fn accessors_apply_indirection() {
        let config = ImportConfig {
            project_id: Some("literal-id".into()),
            secure_key: Some("ENV_KONTENT_IMPORT_SURELY_UNSET_VARIABLE".into()),
            source: Some("ENV_PATH".into()),
            ..Default::default()
        };
        assert_eq!(config.project_id().unwrap().as_deref(), Some("literal-id"));
        assert!(config.secure_key().is_err());
        assert_eq!(
            config.source_dir().unwrap(),
            Some(PathBuf::from(std::env::var("PATH").unwrap()))
        );
        assert_eq!(ImportConfig::default().source_dir().unwrap(), None);
    }

    // =========================================================================
    // merge_toml tests
    // =========================================================================

    #[test]
    fn merge_toml_table_merge() {
        let base: toml::Value = toml::from_str(
            r#"
[pages]
default_layout = "page"
index = "home"
"#,
        )
        .unwrap();
        let overlay: toml::Value = toml::from_str(
            r#"
[pages]
index = "start"
"#,
        )
        .unwrap();
        let merged = merge_toml(base, overlay);
        let pages = merged.get("pages").unwrap();
        assert_eq!(pages.get("index").unwrap().as_str(), Some("start"));
        assert_eq!(pages.get("default_layout").unwrap().as_str(), Some("page"));
    }

    #[test]
    fn merge_toml_scalar_override() {
        let base: toml::Value = toml::from_str(r#"source = "a""#).unwrap();
        let overlay: toml::Value = toml::from_str(r#"source = "b""#).unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged.get("source").unwrap().as_str(), Some("b"));
    }

    // =========================================================================
    // load_config tests
    // =========================================================================

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(&tmp.path().join("kontent.toml")).unwrap();
        assert!(config.pages.content_type.is_empty());
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("kontent.toml");
        fs::write(
            &path,
            r#"
taxonomies = ["colors"]

[posts.content_type.article]
name = "title"
"#,
        )
        .unwrap();
        let config = load_config(&path).unwrap();
        assert_eq!(config.taxonomies, vec!["colors"]);
        assert!(config.posts.content_type.contains_key("article"));
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("kontent.toml");
        fs::write(&path, "this is not valid toml [[[").unwrap();
        assert!(matches!(load_config(&path), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn load_config_validates_values() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("kontent.toml");
        fs::write(&path, "[data.author]\ncollection = \"x\"\n").unwrap();
        assert!(matches!(
            load_config(&path),
            Err(ConfigError::Validation(_))
        ));
    }

    // =========================================================================
    // stock_config_toml tests
    // =========================================================================

    #[test]
    fn stock_config_toml_is_valid_config() {
        let config: ImportConfig = toml::from_str(stock_config_toml()).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.pages.index.as_deref(), Some("home"));
        assert_eq!(config.data["author"].key.as_deref(), Some("authors"));
        assert_eq!(config.posts.layout.as_deref(), Some("post"));
    }

    #[test]
    fn stock_config_uses_registered_mappers() {
        let config: ImportConfig = toml::from_str(stock_config_toml()).unwrap();
        let registry = crate::mappers::MapperRegistry::with_builtins();
        assert!(registry.validate_config(&config).is_ok());
    }

    #[test]
    fn stock_defaults_value_is_table() {
        assert!(stock_defaults_value().is_table());
    }
}
