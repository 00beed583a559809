//! [`StepDefinition`] values and unescaping of raw declaration values.

use derive_more::with_trait::Display;
use gherkin::StepType;

use super::{
    location::Location,
    matcher::{Matcher, Pattern},
};

/// Marker suppressing escape processing of the quoted literal following it.
pub const VERBATIM_MARKER: char = '@';

/// Quote delimiting a string literal.
pub const QUOTE: char = '"';

/// Single discovered step pattern, with its source location and owning
/// container.
///
/// Immutable once constructed: reprocessing a container replaces its
/// [`StepDefinition`]s wholesale instead of updating them.
#[derive(Clone, Debug, Display)]
#[display("{pattern}")]
pub struct StepDefinition {
    /// Unescaped step pattern.
    pattern: String,

    /// Fully-qualified name of the owning container.
    container: String,

    /// Kind of the step declared.
    kind: StepType,

    /// Source span of the declaration.
    location: Location,

    /// Qualified name of the function declaring this step.
    function: String,

    /// [`pattern`] compiled for matching.
    ///
    /// [`pattern`]: StepDefinition::pattern
    compiled: Pattern,
}

impl StepDefinition {
    /// Creates a new [`StepDefinition`] with the already unescaped `pattern`,
    /// compiling it with the given [`Matcher`].
    #[must_use]
    pub fn new(
        pattern: impl Into<String>,
        container: impl Into<String>,
        kind: StepType,
        location: Location,
        function: impl Into<String>,
        matcher: &dyn Matcher,
    ) -> Self {
        let pattern = pattern.into();
        let compiled = matcher.compile(&pattern);
        Self {
            pattern,
            container: container.into(),
            kind,
            location,
            function: function.into(),
            compiled,
        }
    }

    /// Returns the unescaped step pattern.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Returns the fully-qualified name of the owning container.
    #[must_use]
    pub fn container(&self) -> &str {
        &self.container
    }

    /// Returns the kind of the declared step.
    #[must_use]
    pub const fn kind(&self) -> StepType {
        self.kind
    }

    /// Returns the source span of the declaration.
    #[must_use]
    pub const fn location(&self) -> &Location {
        &self.location
    }

    /// Returns the qualified name of the function declaring this step.
    #[must_use]
    pub fn function(&self) -> &str {
        &self.function
    }

    /// Checks whether the given step `text` matches this [`StepDefinition`].
    #[must_use]
    pub fn is_match(&self, text: &str) -> bool {
        self.compiled.is_match(text)
    }
}

/// Unescapes the raw source text of a declaration value into a step pattern.
///
/// - A leading [`VERBATIM_MARKER`] is stripped and disables escape processing.
/// - A value which isn't a quoted string literal is returned as is.
/// - Otherwise, the surrounding quotes are stripped and (unless verbatim)
///   backslash escapes are resolved.
///
/// Never fails: malformed input degrades to its best-effort literal text.
#[must_use]
pub fn unescape(raw: &str) -> String {
    if raw.chars().nth(1).is_none() {
        return raw.to_owned();
    }

    let (verbatim, rest) = match raw.strip_prefix(VERBATIM_MARKER) {
        Some(rest) => (true, rest),
        None => (false, raw),
    };

    let inner = rest
        .strip_prefix(QUOTE)
        .and_then(|r| r.strip_suffix(QUOTE));
    match inner {
        None => rest.to_owned(),
        Some(inner) if verbatim => inner.to_owned(),
        Some(inner) => resolve_escapes(inner),
    }
}

/// Resolves backslash escape sequences in the given `text`.
///
/// Unknown escapes resolve to the escaped character itself, and incomplete
/// numeric escapes are kept as written.
fn resolve_escapes(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(escaped) = chars.next() else {
            out.push('\\');
            break;
        };
        match escaped {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'f' => out.push('\u{0C}'),
            'v' => out.push('\u{0B}'),
            'a' => out.push('\u{07}'),
            'e' => out.push('\u{1B}'),
            '0' => out.push('\0'),
            'x' | 'u' => {
                let width = if escaped == 'x' { 2 } else { 4 };
                let digits = chars
                    .clone()
                    .take(width)
                    .take_while(char::is_ascii_hexdigit)
                    .collect::<String>();
                let decoded = (digits.len() == width)
                    .then(|| u32::from_str_radix(&digits, 16).ok())
                    .flatten()
                    .and_then(char::from_u32);
                if let Some(ch) = decoded {
                    out.push(ch);
                    for _ in 0..width {
                        _ = chars.next();
                    }
                } else {
                    out.push('\\');
                    out.push(escaped);
                }
            }
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::{matcher, Point};

    #[test]
    fn strips_quotes() {
        assert_eq!(unescape(r#""abc""#), "abc");
    }

    #[test]
    fn verbatim_keeps_escapes() {
        assert_eq!(unescape(r#"@"a\nb""#), r"a\nb");
        assert_eq!(unescape(r#"@"^I have (\d+) cukes$""#), r"^I have (\d+) cukes$");
    }

    #[test]
    fn resolves_escapes() {
        assert_eq!(unescape(r#""a\nb""#), "a\nb");
        assert_eq!(unescape(r#""say \"hi\"\t!""#), "say \"hi\"\t!");
        assert_eq!(unescape(r#""^I have (\\d+) cukes$""#), r"^I have (\d+) cukes$");
        assert_eq!(unescape(r#""\x41é""#), "Aé");
    }

    #[test]
    fn unknown_escape_resolves_to_char() {
        assert_eq!(unescape(r#""a\.b""#), "a.b");
    }

    #[test]
    fn incomplete_numeric_escape_is_kept() {
        assert_eq!(unescape(r#""\x4""#), r"\x4");
        assert_eq!(unescape(r#""\uZZZZ""#), r"\uZZZZ");
    }

    #[test]
    fn trailing_backslash_is_kept() {
        assert_eq!(unescape("\"a\\\""), "a\\");
    }

    #[test]
    fn unquoted_is_unchanged() {
        assert_eq!(unescape("x"), "x");
        assert_eq!(unescape("LOGGED_IN"), "LOGGED_IN");
        assert_eq!(unescape("\"unterminated"), "\"unterminated");
    }

    #[test]
    fn degenerate_inputs() {
        assert_eq!(unescape(""), "");
        assert_eq!(unescape("@"), "@");
        assert_eq!(unescape("\""), "\"");
        assert_eq!(unescape("@\""), "\"");
        assert_eq!(unescape("@x"), "x");
        assert_eq!(unescape("\"\""), "");
        assert_eq!(unescape("@\"\""), "");
    }

    #[test]
    fn definition_matches_with_compiled_pattern() {
        let def = StepDefinition::new(
            r"I have (\d+) cukes",
            "Steps.Cukes",
            StepType::Given,
            Location::new("Cukes.cs", Point::new(1, 1), Point::new(1, 20)),
            "Steps.Cukes.Have",
            &matcher::Regex,
        );

        assert!(def.is_match("I have 7 cukes"));
        assert!(!def.is_match("I have no cukes"));
        assert_eq!(def.container(), "Steps.Cukes");
        assert_eq!(def.function(), "Steps.Cukes.Have");
        assert_eq!(def.kind(), StepType::Given);
        assert_eq!(def.to_string(), r"I have (\d+) cukes");
    }
}
