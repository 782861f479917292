//! # Kontent Import
//!
//! Turns content items from a headless CMS into a static site source tree.
//! Items are grouped by content type, and each configured type is mapped into
//! pages, posts or data records with front matter ready for Jekyll.
//!
//! # Architecture: Mapping Pipeline
//!
//! ```text
//! 1. Fetch      export/   →  Vec<ContentItem>       (ContentSource)
//! 2. Map        items     →  ResolvedRecords        (Pipeline + mappers)
//! 3. Deliver    records   →  Site                   (pages, collections, data)
//! 4. Write      Site      →  site/                  (JSON front matter, _data/)
//! ```
//!
//! Only stage 2 has real logic; the others are narrow collaborators so the
//! mapping core can be exercised with in-memory items and no filesystem.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`types`] | Content model: items, typed element values, taxonomies |
//! | [`normalize`] | Element values → plain JSON, date canonicalisation, rich text references |
//! | [`naming`] | Pluggable slug policies for output filenames |
//! | [`resolve`] | Per-item field resolution with candidate fallback (filename, date, content) |
//! | [`mappers`] | Mapper strategy registry, built-in `default`/`elements` mappers, linked items |
//! | [`pipeline`] | Groups items by type and dispatches configured entries into records |
//! | [`source`] | `ContentSource` trait and the JSON export reader |
//! | [`site`] | Document/collection/data-store model and the Jekyll tree writer |
//! | [`config`] | `kontent.toml` loading, validation, merging and `ENV_` indirection |
//! | [`output`] | CLI output formatting of import results |
//!
//! # Design Decisions
//!
//! ## Failures Are Contained, Not Fatal
//!
//! One bad item must not cost the whole site. A malformed date or a failing
//! mapper skips that item, and an unknown mapper identifier aborts only its
//! type entry. Both are reported as [`pipeline::Issue`]s next to the records
//! and logged through `tracing`. Fetch and write errors still propagate: they
//! mean there is nothing sensible to import.
//!
//! ## Mappers Are Looked Up, Not Hard-Coded
//!
//! The config names a mapper per content type (`data = "default"`). The
//! [`mappers::MapperRegistry`] resolves that name to a factory, so sites add
//! their own content shapes with `register` and the dispatcher never changes.
//! Every identifier is checked before anything is fetched.
//!
//! ## One-Level Link Traversal
//!
//! Linked items are mapped by the role's mapper, but their own links stay
//! codenames. Content graphs in a CMS are routinely cyclic (a page links its
//! section, the section links back), and one level is what templates need.
//!
//! ## Deterministic Output Under Parallelism
//!
//! Items are mapped in parallel with rayon, but indexed collection keeps fetch
//! order, and `serde_json`'s `preserve_order` keeps mapper key order. Two runs
//! over the same export produce byte-identical files.

pub mod config;
pub mod mappers;
pub mod naming;
pub mod normalize;
pub mod output;
pub mod pipeline;
pub mod resolve;
pub mod site;
pub mod source;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
