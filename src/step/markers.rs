//! Recognized step markers.

use std::collections::HashMap;

use gherkin::StepType;

/// Fully-qualified marker kinds of the reference step frameworks, with the
/// step kind each one declares.
pub const DEFAULT_MARKERS: [(&str, StepType); 6] = [
    ("Cuke4Nuke.Framework.GivenAttribute", StepType::Given),
    ("Cuke4Nuke.Framework.WhenAttribute", StepType::When),
    ("Cuke4Nuke.Framework.ThenAttribute", StepType::Then),
    ("TechTalk.SpecFlow.GivenAttribute", StepType::Given),
    ("TechTalk.SpecFlow.WhenAttribute", StepType::When),
    ("TechTalk.SpecFlow.ThenAttribute", StepType::Then),
];

/// Closed set of declaration kinds recognized as step definitions.
///
/// Any declaration whose kind isn't in this set is ignored when a container is
/// reprocessed.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StepMarkers(HashMap<String, StepType>);

impl Default for StepMarkers {
    fn default() -> Self {
        DEFAULT_MARKERS.into_iter().collect()
    }
}

impl StepMarkers {
    /// Creates an empty [`StepMarkers`] set, recognizing nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self(HashMap::new())
    }

    /// Adds the given marker `kind` declaring steps of the `ty` kind.
    #[must_use]
    pub fn with(mut self, kind: impl Into<String>, ty: StepType) -> Self {
        _ = self.0.insert(kind.into(), ty);
        self
    }

    /// Removes the given marker `kind`.
    #[must_use]
    pub fn without(mut self, kind: &str) -> Self {
        _ = self.0.remove(kind);
        self
    }

    /// Returns the [`StepType`] declared by the given marker `kind`, if it's
    /// recognized.
    #[must_use]
    pub fn step_type(&self, kind: &str) -> Option<StepType> {
        self.0.get(kind).copied()
    }

    /// Indicates whether the given marker `kind` is recognized.
    #[must_use]
    pub fn contains(&self, kind: &str) -> bool {
        self.0.contains_key(kind)
    }

    /// Returns the number of recognized markers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Indicates whether no marker is recognized.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, StepType)> for StepMarkers {
    fn from_iter<I: IntoIterator<Item = (K, StepType)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, ty)| (k.into(), ty)).collect())
    }
}

impl<K: Into<String>> Extend<(K, StepType)> for StepMarkers {
    fn extend<I: IntoIterator<Item = (K, StepType)>>(&mut self, iter: I) {
        self.0.extend(iter.into_iter().map(|(k, ty)| (k.into(), ty)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_recognizes_both_frameworks() {
        let markers = StepMarkers::default();
        assert_eq!(markers.len(), 6);
        assert_eq!(
            markers.step_type("TechTalk.SpecFlow.WhenAttribute"),
            Some(StepType::When),
        );
        assert_eq!(
            markers.step_type("Cuke4Nuke.Framework.ThenAttribute"),
            Some(StepType::Then),
        );
        assert!(!markers.contains("Cuke4Nuke.Framework.PendingAttribute"));
        assert!(!markers.contains("GivenAttribute"));
    }

    #[test]
    fn extensible_without_changing_defaults() {
        let markers = StepMarkers::default()
            .with("cucumber::given", StepType::Given)
            .without("TechTalk.SpecFlow.ThenAttribute");
        assert_eq!(markers.len(), 6);
        assert!(markers.contains("cucumber::given"));
        assert!(!markers.contains("TechTalk.SpecFlow.ThenAttribute"));
    }

    #[test]
    fn extend_and_collect() {
        let mut markers = StepMarkers::empty();
        assert!(markers.is_empty());
        markers.extend([("given", StepType::Given), ("then", StepType::Then)]);
        assert_eq!(markers.step_type("then"), Some(StepType::Then));

        let collected: StepMarkers = [("when", StepType::When)].into_iter().collect();
        assert_eq!(collected.len(), 1);
    }
}
