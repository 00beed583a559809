//! Matching relations between step patterns and step texts.
//!
//! A [`Matcher`] compiles the pattern of a [`StepDefinition`] once, at
//! construction, into a [`Pattern`], which is then queried for every step text
//! looked up in a [`StepIndex`].
//!
//! [`StepDefinition`]: super::StepDefinition
//! [`StepIndex`]: crate::StepIndex

use std::{fmt, str::FromStr};

use derive_more::with_trait::Display;

use super::regex::HashableRegex;

/// Compiled step pattern.
#[derive(Clone, Debug, Display, Eq, Hash, PartialEq)]
pub enum Pattern {
    /// Matches only the exactly equal text.
    #[display("{_0}")]
    Literal(String),

    /// Matches the text as a whole with a [`Regex`].
    ///
    /// [`Regex`]: regex::Regex
    #[display("{_0}")]
    Regex(HashableRegex),
}

impl Pattern {
    /// Checks whether the given step `text` matches this [`Pattern`].
    #[must_use]
    pub fn is_match(&self, text: &str) -> bool {
        match self {
            Self::Literal(lit) => lit == text,
            Self::Regex(re) => re.is_match(text),
        }
    }
}

/// Strategy of compiling step patterns into [`Pattern`]s.
pub trait Matcher: fmt::Debug + Send + Sync {
    /// Compiles the given unescaped step `pattern`.
    ///
    /// Never fails: a pattern not understood by this [`Matcher`] degrades to a
    /// [`Pattern::Literal`].
    fn compile(&self, pattern: &str) -> Pattern;
}

/// [`Matcher`] comparing step texts for exact equality with patterns.
#[derive(Clone, Copy, Debug, Default)]
pub struct Literal;

impl Matcher for Literal {
    fn compile(&self, pattern: &str) -> Pattern {
        Pattern::Literal(pattern.to_owned())
    }
}

/// [`Matcher`] treating patterns as regular expressions matching the whole
/// step text.
#[derive(Clone, Copy, Debug, Default)]
pub struct Regex;

impl Matcher for Regex {
    fn compile(&self, pattern: &str) -> Pattern {
        HashableRegex::anchored(pattern).map_or_else(
            |e| {
                tracing::warn!(
                    pattern,
                    error = %e,
                    "invalid step regex, matching it literally",
                );
                Pattern::Literal(pattern.to_owned())
            },
            Pattern::Regex,
        )
    }
}

/// [`Matcher`] treating patterns as [Cucumber Expressions][1].
///
/// [1]: https://github.com/cucumber/cucumber-expressions#readme
#[cfg(feature = "expressions")]
#[derive(Clone, Copy, Debug, Default)]
pub struct Expression;

#[cfg(feature = "expressions")]
impl Matcher for Expression {
    fn compile(&self, pattern: &str) -> Pattern {
        match cucumber_expressions::Expression::regex(pattern) {
            Ok(re) => Pattern::Regex(re.into()),
            Err(e) => {
                tracing::warn!(
                    pattern,
                    error = %e,
                    "invalid Cucumber Expression, matching it literally",
                );
                Pattern::Literal(pattern.to_owned())
            }
        }
    }
}

/// Selectable built-in [`Matcher`]s.
#[derive(Clone, Copy, Debug, Default, Display, Eq, PartialEq)]
pub enum Kind {
    /// [`Literal`] matcher.
    #[display("literal")]
    Literal,

    /// [`Regex`] matcher.
    #[default]
    #[display("regex")]
    Regex,

    /// [`Expression`] matcher.
    #[cfg(feature = "expressions")]
    #[display("expression")]
    Expression,
}

impl Kind {
    /// Instantiates the [`Matcher`] of this [`Kind`].
    #[must_use]
    pub fn matcher(self) -> Box<dyn Matcher> {
        match self {
            Self::Literal => Box::new(Literal),
            Self::Regex => Box::new(Regex),
            #[cfg(feature = "expressions")]
            Self::Expression => Box::new(Expression),
        }
    }
}

impl FromStr for Kind {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "literal" => Ok(Self::Literal),
            "regex" => Ok(Self::Regex),
            #[cfg(feature = "expressions")]
            "expression" => Ok(Self::Expression),
            _ => Err("possible options: literal, regex, expression"),
        }
    }
}
