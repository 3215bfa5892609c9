//! Metadata-blind comparison of a source style against its distribution copy.
//!
//! Each style carries one `<updated>…</updated>` element. The distribution
//! rewrites it on every copy, so comparisons blank it on both sides first.
//! Content is handled as raw bytes; only the element itself is ever changed.

use std::sync::OnceLock;

use regex::bytes::{NoExpand, Regex};

const BLANK_UPDATED: &[u8] = b"<updated></updated>";

fn updated_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"<updated>(?-u:[^<])*</updated>").expect("static regex"))
}

/// How a source style relates to its distribution copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// No distribution copy exists yet.
    New,
    /// The copy differs outside the `<updated>` element.
    Changed,
    /// The copy is equivalent.
    Unchanged,
}

impl Classification {
    /// Whether the distribution copy has to be (re)written.
    pub fn needs_write(self) -> bool {
        !matches!(self, Classification::Unchanged)
    }
}

/// Replace the `<updated>` element's text with nothing.
pub fn blank_metadata(content: &[u8]) -> Vec<u8> {
    updated_pattern()
        .replace_all(content, NoExpand(BLANK_UPDATED))
        .into_owned()
}

/// Replace the `<updated>` element's text with `timestamp`.
pub fn stamp_metadata(content: &[u8], timestamp: &str) -> Vec<u8> {
    let stamped = format!("<updated>{timestamp}</updated>");
    updated_pattern()
        .replace_all(content, NoExpand(stamped.as_bytes()))
        .into_owned()
}

/// Classify a source style against its distribution copy, if any.
pub fn classify(source: &[u8], distribution: Option<&[u8]>) -> Classification {
    match distribution {
        None => Classification::New,
        Some(distribution) if blank_metadata(source) == blank_metadata(distribution) => {
            Classification::Unchanged
        }
        Some(_) => Classification::Changed,
    }
}
