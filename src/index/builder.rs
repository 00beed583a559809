//! Configuration of a [`StepIndex`].

use smart_default::SmartDefault;

use super::StepIndex;
use crate::step::{
    matcher::{self, Matcher},
    StepMarkers,
};

/// Builder of a [`StepIndex`].
///
/// By default, recognizes the [`DEFAULT_MARKERS`] and matches step texts with
/// the [`matcher::Regex`].
///
/// [`DEFAULT_MARKERS`]: crate::step::markers::DEFAULT_MARKERS
#[derive(Debug, SmartDefault)]
pub struct Builder {
    /// Declaration kinds recognized as step definitions.
    markers: StepMarkers,

    /// Matching relation of step patterns and step texts.
    #[default(Box::new(matcher::Regex))]
    matcher: Box<dyn Matcher>,
}

impl Builder {
    /// Creates a new [`Builder`] with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the recognized [`StepMarkers`].
    #[must_use]
    pub fn markers(mut self, markers: StepMarkers) -> Self {
        self.markers = markers;
        self
    }

    /// Replaces the [`Matcher`] compiling step patterns.
    #[must_use]
    pub fn matcher(mut self, matcher: impl Matcher + 'static) -> Self {
        self.matcher = Box::new(matcher);
        self
    }

    /// Replaces the [`Matcher`] with one of the built-in ones.
    #[must_use]
    pub fn matcher_kind(mut self, kind: matcher::Kind) -> Self {
        self.matcher = kind.matcher();
        self
    }

    /// Builds an empty [`StepIndex`] out of this configuration.
    #[must_use]
    pub fn build(self) -> StepIndex {
        StepIndex::with_config(self.markers, self.matcher)
    }
}
