//! Error types of step declarations and step matching.
//!
//! None of these abort anything: a [`DeclarationError`] only excludes a single
//! declaration from its container, and an [`AmbiguousMatchError`] only
//! describes a lookup outcome.

use std::{fmt, sync::Arc};

use derive_more::with_trait::{Display, Error};
use itertools::Itertools as _;

use super::{definition::StepDefinition, location::Location};

/// Reason of a malformed declaration being skipped.
#[derive(Clone, Debug, Display, Error, Eq, PartialEq)]
pub enum DeclarationError {
    /// Declaration has no [`Location`].
    #[display("step `{value}` has no location")]
    MissingLocation {
        /// Raw value of the declaration.
        #[error(not(source))]
        value: String,
    },

    /// Declaration has no owning function.
    #[display("step `{value}` has no owning function")]
    MissingOwner {
        /// Raw value of the declaration.
        #[error(not(source))]
        value: String,
    },

    /// Declaration value refers to a constant which cannot be resolved to a
    /// literal.
    #[display("step refers to unresolvable constant `{name}`")]
    UnresolvedConstant {
        /// Name of the referred constant.
        #[error(not(source))]
        name: String,
    },
}

/// Error of a step text matching multiple [`StepDefinition`]s.
#[derive(Clone, Debug, Error)]
pub struct AmbiguousMatchError {
    /// Step text which was looked up.
    #[error(not(source))]
    pub text: String,

    /// All the [`StepDefinition`]s the step text matches, ordered by pattern.
    pub possible_matches: Vec<Arc<StepDefinition>>,
}

impl AmbiguousMatchError {
    /// Returns an iterator over the patterns that matched.
    pub fn patterns(&self) -> impl Iterator<Item = &str> + '_ {
        self.possible_matches.iter().map(|d| d.pattern())
    }

    /// Returns an iterator over the [`Location`]s of the matching
    /// [`StepDefinition`]s.
    pub fn locations(&self) -> impl Iterator<Item = &Location> + '_ {
        self.possible_matches.iter().map(|d| d.location())
    }
}

impl fmt::Display for AmbiguousMatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "`{}` matches {} step definitions:",
            self.text,
            self.possible_matches.len(),
        )?;
        let lines = self
            .possible_matches
            .iter()
            .map(|d| format!("\n{} --> {}", d.pattern(), d.location()))
            .join("");
        f.write_str(&lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::{matcher, Point};

    fn definition(pattern: &str, line: u32) -> Arc<StepDefinition> {
        Arc::new(StepDefinition::new(
            pattern,
            "Steps",
            gherkin::StepType::Given,
            Location::new("Steps.cs", Point::new(line, 1), Point::new(line, 9)),
            "Steps.Step",
            &matcher::Regex,
        ))
    }

    #[test]
    fn declaration_error_messages() {
        let err = DeclarationError::MissingOwner { value: "\"x\"".into() };
        assert_eq!(err.to_string(), "step `\"x\"` has no owning function");

        let err = DeclarationError::UnresolvedConstant { name: "LOGIN".into() };
        assert_eq!(
            err.to_string(),
            "step refers to unresolvable constant `LOGIN`",
        );
    }

    #[test]
    fn ambiguous_lists_patterns_and_locations() {
        let err = AmbiguousMatchError {
            text: "I have 5 cukes".into(),
            possible_matches: vec![
                definition(r"I have (\d+) cukes", 3),
                definition(r"I have (.+) cukes", 7),
            ],
        };

        assert_eq!(
            err.patterns().collect::<Vec<_>>(),
            [r"I have (\d+) cukes", r"I have (.+) cukes"],
        );
        assert_eq!(err.locations().map(|l| l.start.line).collect::<Vec<_>>(), [3, 7]);
        assert_eq!(
            err.to_string(),
            "`I have 5 cukes` matches 2 step definitions:\n\
             I have (\\d+) cukes --> Steps.cs:3:1\n\
             I have (.+) cukes --> Steps.cs:7:1",
        );
    }
}
