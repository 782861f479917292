//! Slug policies for output filenames.
//!
//! Every record's filename is derived from a resolved field value (a title, a
//! url slug element, the item name) and must be safe in both a URL path and a
//! filesystem path. How exactly that text is turned into a slug is a site
//! decision, so it is a plain function pointer ([`Slugifier`]) chosen from
//! configuration ([`SlugStyle`]) or supplied directly by library users.
//!
//! Both built-in policies share the same core:
//! - non-alphanumeric ASCII characters (whitespace, punctuation, non-ASCII)
//!   become dashes,
//! - runs of dashes collapse to one,
//! - leading and trailing dashes are stripped,
//! - the result is truncated to `MAX_SLUG_LEN` at the last dash that fits.
//!
//! `kebab` (the default) additionally lower-cases:
//! - `"Hello World"` → `"hello-world"`
//! - `"Café & Bar"` → `"caf-bar"`
//!
//! `preserve-case` keeps the case:
//! - `"Hello World"` → `"Hello-World"`

use serde::{Deserialize, Serialize};

/// Turns resolved text into a URL- and file-safe name.
pub type Slugifier = fn(&str) -> String;

const MAX_SLUG_LEN: usize = 80;

/// Named slug policy selectable from configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SlugStyle {
    #[default]
    Kebab,
    PreserveCase,
}

impl SlugStyle {
    pub fn slugifier(self) -> Slugifier {
        match self {
            SlugStyle::Kebab => kebab_slug,
            SlugStyle::PreserveCase => sanitize_slug,
        }
    }
}

/// Lower-case slug: `"Hello World!"` → `"hello-world"`.
pub fn kebab_slug(text: &str) -> String {
    sanitize_slug(&text.to_ascii_lowercase())
}

/// Case-preserving slug: `"Hello World!"` → `"Hello-World"`.
pub fn sanitize_slug(text: &str) -> String {
    let mut collapsed = String::with_capacity(text.len());
    let mut prev_dash = false;
    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            collapsed.push(c);
            prev_dash = false;
        } else if !prev_dash {
            collapsed.push('-');
            prev_dash = true;
        }
    }

    let trimmed = collapsed.trim_matches('-');

    if trimmed.len() <= MAX_SLUG_LEN {
        trimmed.to_string()
    } else {
        let truncated = &trimmed[..MAX_SLUG_LEN];
        match truncated.rfind('-') {
            Some(pos) => truncated[..pos].to_string(),
            None => truncated.to_string(),
        }
    }
}

/// Whether `name` only contains characters a slug policy may emit.
pub fn is_url_safe(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kebab_lowercases_and_dashes_spaces() {
        assert_eq!(kebab_slug("Hello World"), "hello-world");
    }

    #[test]
    fn kebab_strips_punctuation() {
        assert_eq!(kebab_slug("What's New?"), "what-s-new");
        assert_eq!(kebab_slug("  --Intro--  "), "intro");
    }

    #[test]
    fn kebab_collapses_runs() {
        assert_eq!(kebab_slug("a   -  b"), "a-b");
    }

    #[test]
    fn non_ascii_becomes_dashes() {
        assert_eq!(kebab_slug("Café & Bar"), "caf-bar");
        assert_eq!(kebab_slug("日本語"), "");
    }

    #[test]
    fn preserve_case_keeps_capitals() {
        assert_eq!(sanitize_slug("Hello World"), "Hello-World");
        assert_eq!(sanitize_slug("foo@bar#baz"), "foo-bar-baz");
    }

    #[test]
    fn codenames_survive_unchanged_apart_from_underscores() {
        assert_eq!(kebab_slug("about_us"), "about-us");
    }

    #[test]
    fn long_text_truncates_at_word_boundary() {
        let title = "this is a very long title that keeps going well past the maximum slug length we allow here";
        let slug = kebab_slug(title);
        assert!(slug.len() <= MAX_SLUG_LEN);
        assert!(!slug.ends_with('-'));
        assert!(slug.starts_with("this-is-a-very-long-title"));
    }

    #[test]
    fn style_selects_policy() {
        assert_eq!((SlugStyle::Kebab.slugifier())("A B"), "a-b");
        assert_eq!((SlugStyle::PreserveCase.slugifier())("A B"), "A-B");
        assert_eq!(SlugStyle::default(), SlugStyle::Kebab);
    }

    #[test]
    fn url_safety_check() {
        assert!(is_url_safe("hello-world.html"));
        assert!(is_url_safe("about_us"));
        assert!(!is_url_safe("hello world"));
        assert!(!is_url_safe(""));
        assert!(!is_url_safe("a/b"));
    }
}
