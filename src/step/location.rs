//! Source locations of step declarations.
//!
//! This module provides the [`Location`] struct describing where a step
//! declaration lives in the scanned code base. It's only used for navigation,
//! and never takes part in matching.

use derive_more::with_trait::Display;
use serde::{Deserialize, Serialize};

/// Line and column inside a source file (both `1`-based).
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[display("{line}:{column}")]
pub struct Point {
    /// Line of the file.
    pub line: u32,

    /// Column of the file.
    pub column: u32,
}

impl Point {
    /// Creates a new [`Point`] with the given line and column.
    #[must_use]
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

/// Location of a step declaration, as reported by a declaration walker.
#[derive(
    Clone,
    Debug,
    Deserialize,
    Display,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[display("{path}:{start}")]
pub struct Location {
    /// Path to the file where the declaration is located.
    #[serde(default)]
    pub path: String,

    /// Start of the declaration span.
    pub start: Point,

    /// End of the declaration span.
    pub end: Point,
}

impl Location {
    /// Creates a new [`Location`] spanning from `start` to `end`.
    #[must_use]
    pub fn new(path: impl Into<String>, start: Point, end: Point) -> Self {
        Self { path: path.into(), start, end }
    }

    /// Returns the filename from the path.
    #[must_use]
    pub fn filename(&self) -> &str {
        self.path.rsplit(['/', '\\']).next().unwrap_or(&self.path)
    }

    /// Returns a short representation of the location (`filename:line:column`).
    #[must_use]
    pub fn short(&self) -> String {
        format!("{}:{}", self.filename(), self.start)
    }

    /// Indicates whether the given [`Point`] lies within this [`Location`].
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        self.start <= point && point <= self.end
    }
}
