//! Extraction of structured records from document pages
//!
//! This module contains:
//! - Magnitude parsing for counters ("1.2K", "3M")
//! - Region lookups over a parsed page
//! - Record assembly and text normalization

mod fields;
mod numeric;
mod region;
mod text;

pub use fields::{extract_record, parse_metadata, ExtractError};
pub use numeric::{to_number, ToCount};
pub use region::Region;
pub use text::{compose_text, normalize_blank_lines};

/// A successfully harvested document
///
/// Only built after both fetch and extraction succeed. Fields are read-only
/// once constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    id: u64,
    views: f64,
    likes: f64,
    comments: f64,
    text: String,
}

impl Record {
    /// Creates a record, normalizing blank-line runs in `text`
    pub fn new(id: u64, views: f64, likes: f64, comments: f64, text: impl AsRef<str>) -> Self {
        Self {
            id,
            views: views.max(0.0),
            likes: likes.max(0.0),
            comments: comments.max(0.0),
            text: normalize_blank_lines(text.as_ref()),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn views(&self) -> f64 {
        self.views
    }

    pub fn likes(&self) -> f64 {
        self.likes
    }

    pub fn comments(&self) -> f64 {
        self.comments
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}
