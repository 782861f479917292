//! CLI output formatting for import runs.
//!
//! # Information-First Display
//!
//! Every record is shown by its identity (positional index + source codename)
//! with the file it lands in after `→`. Context such as the content type is
//! given on indented lines, so the output reads as an inventory of what the
//! CMS produced rather than a file listing.
//!
//! # Output Format
//!
//! ```text
//! Pages
//!     001 home → index.html
//!         Type: landing_page
//!     002 spring_promo → _landing/spring-promo.html
//!         Type: landing_page
//!
//! Posts
//!     001 hello_world → _posts/hello-world.html
//!         Type: article
//!         Date: 2024-01-15T10:00:00Z
//!
//! Data
//!     authors → _data/authors.json (2 records)
//!         001 jane
//!         002 john
//!
//! Taxonomies
//!     colors
//!
//! Issues
//!     skipped article 'draft': malformed date value "soon" on item 'draft': ...
//!
//! Imported 2 pages, 1 posts, 2 data records, 1 taxonomies, 1 issues
//! ```
//!
//! # Architecture
//!
//! Each view has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure:
//! no I/O, no side effects.

use crate::pipeline::{Destination, ImportOutput, RecordBatch, ResolvedRecord};
use crate::site::{POSTS_COLLECTION, WriteSummary};
use std::path::Path;

// ============================================================================
// Shared entity display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Site-relative path a record is written to.
fn destination_path(record: &ResolvedRecord) -> String {
    match &record.destination {
        Destination::Pages => record.filename.clone(),
        Destination::Collection(label) => format!("_{}/{}", label, record.filename),
        Destination::Posts => format!("_{}/{}", POSTS_COLLECTION, record.filename),
        Destination::Data(key) => format!("_data/{}.json", key),
    }
}

/// Record header plus its context lines.
///
/// ```text
///     001 hello_world → _posts/hello-world.html
///         Type: article
///         Date: 2024-01-15T10:00:00Z
/// ```
fn record_lines(index: usize, record: &ResolvedRecord) -> Vec<String> {
    let mut lines = vec![format!(
        "{}{} {} \u{2192} {}",
        indent(1),
        format_index(index),
        record.codename,
        destination_path(record)
    )];
    lines.push(format!("{}Type: {}", indent(2), record.content_type));
    if let Some(date) = record.data.get("date").and_then(|d| d.as_str()) {
        lines.push(format!("{}Date: {}", indent(2), date));
    }
    lines
}

fn section(lines: &mut Vec<String>, title: &str) {
    if !lines.is_empty() {
        lines.push(String::new());
    }
    lines.push(title.to_string());
}

fn document_section(lines: &mut Vec<String>, title: &str, batch: &RecordBatch) {
    if batch.records.is_empty() {
        return;
    }
    section(lines, title);
    for (i, record) in batch.records.iter().enumerate() {
        lines.extend(record_lines(i + 1, record));
    }
}

/// Data records grouped under their store key.
fn data_section(lines: &mut Vec<String>, batch: &RecordBatch) {
    if batch.records.is_empty() {
        return;
    }
    section(lines, "Data");
    for (destination, records) in batch.grouped() {
        let Destination::Data(key) = destination else {
            continue;
        };
        lines.push(format!(
            "{}{} \u{2192} _data/{}.json ({} records)",
            indent(1),
            key,
            key,
            records.len()
        ));
        for (i, record) in records.iter().enumerate() {
            lines.push(format!(
                "{}{} {}",
                indent(2),
                format_index(i + 1),
                record.codename
            ));
        }
    }
}

// ============================================================================
// Import
// ============================================================================

/// Format the result of an import run.
///
/// Sections with nothing to show are left out. The summary line is always
/// present.
pub fn format_import_output(output: &ImportOutput) -> Vec<String> {
    let mut lines = Vec::new();

    document_section(&mut lines, "Pages", &output.pages);
    document_section(&mut lines, "Posts", &output.posts);
    data_section(&mut lines, &output.data);

    if !output.taxonomies.is_empty() {
        section(&mut lines, "Taxonomies");
        for codename in output.taxonomies.keys() {
            lines.push(format!("{}{}", indent(1), codename));
        }
    }

    let issues: Vec<String> = output.issues().map(|i| i.to_string()).collect();
    if !issues.is_empty() {
        section(&mut lines, "Issues");
        for issue in &issues {
            lines.push(format!("{}{}", indent(1), issue));
        }
    }

    if !lines.is_empty() {
        lines.push(String::new());
    }
    lines.push(format!(
        "Imported {} pages, {} posts, {} data records, {} taxonomies, {} issues",
        output.pages.records.len(),
        output.posts.records.len(),
        output.data.records.len(),
        output.taxonomies.len(),
        issues.len()
    ));

    lines
}

/// Print import output to stdout.
pub fn print_import_output(output: &ImportOutput) {
    for line in format_import_output(output) {
        println!("{}", line);
    }
}

/// Format the files written for a site.
pub fn format_write_summary(summary: &WriteSummary, root: &Path) -> Vec<String> {
    vec![format!(
        "Wrote {} documents, {} data files to {}",
        summary.documents,
        summary.data_files,
        root.display()
    )]
}

/// Print the write summary to stdout.
pub fn print_write_summary(summary: &WriteSummary, root: &Path) {
    for line in format_write_summary(summary, root) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
