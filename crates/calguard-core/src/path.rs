//! Resource path parsing and creation-category classification.
//!
//! Paths are split on `/` literally. Empty segments from leading, trailing or
//! repeated slashes are kept, and no decoding or normalization happens, so
//! `calendars//work` has three segments and `/calendars/a/b` has four.

use crate::limits::RateLimitSpec;

/// First segment of every calendar-home path.
pub const CALENDAR_ROOT: &str = "calendars";

/// Location of a resource about to be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourcePath {
    raw: String,
}

impl ResourcePath {
    pub fn parse(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.raw.split('/')
    }

    /// Segment count; an empty path has one empty segment.
    pub fn segment_count(&self) -> usize {
        self.segments().count()
    }

    pub fn first(&self) -> &str {
        self.segments().next().unwrap_or_default()
    }
}

/// What a creation at a path would produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreationCategory {
    /// `calendars/<owner>/<collection>`: a calendar or subscription.
    CollectionCreation,
    /// `calendars/<owner>/<collection>/<item>`: an object inside a collection.
    ItemCreation,
    Unclassified,
}

impl CreationCategory {
    /// Stable label for logs and metrics.
    pub fn as_str(self) -> &'static str {
        match self {
            CreationCategory::CollectionCreation => "collection",
            CreationCategory::ItemCreation => "item",
            CreationCategory::Unclassified => "unclassified",
        }
    }

    /// Rolling-window limit for metered categories.
    pub fn rate_limit(self) -> Option<&'static RateLimitSpec> {
        match self {
            CreationCategory::CollectionCreation => Some(&RateLimitSpec::COLLECTION_CREATION),
            CreationCategory::ItemCreation => Some(&RateLimitSpec::ITEM_CREATION),
            CreationCategory::Unclassified => None,
        }
    }
}

/// Classify a path by segment count and first segment.
pub fn classify(path: &ResourcePath) -> CreationCategory {
    if path.first() != CALENDAR_ROOT {
        return CreationCategory::Unclassified;
    }
    match path.segment_count() {
        3 => CreationCategory::CollectionCreation,
        4 => CreationCategory::ItemCreation,
        _ => CreationCategory::Unclassified,
    }
}
