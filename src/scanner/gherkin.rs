//! [`Lexer`] of the [Gherkin] grammar.
//!
//! Carries a single fact across lines: whether the line starts inside a doc
//! string, and which delimiter closes it.
//!
//! [Gherkin]: https://cucumber.io/docs/gherkin/reference

use super::{
    lexer::{Lexer, State, Token, TokenKind},
    token::{EditorInfo, TokenColor, TokenTriggers, TokenType},
};

/// Line starts outside of any doc string.
const NORMAL: i32 = 0;

/// Line starts inside a doc string delimited by `"""`.
const IN_QUOTED_DOC: i32 = 1;

/// Line starts inside a doc string delimited by "```".
const IN_FENCED_DOC: i32 = 2;

const QUOTED_DOC: &str = r#"""""#;
const FENCED_DOC: &str = "```";

const KEYWORD: EditorInfo = EditorInfo::new(TokenType::Keyword, TokenColor::Keyword);
const STEP_KEYWORD: EditorInfo = EditorInfo {
    ty: TokenType::Keyword,
    color: TokenColor::Keyword,
    triggers: TokenTriggers::MEMBER_SELECT,
};
const STEP_TEXT: EditorInfo = EditorInfo::new(TokenType::Identifier, TokenColor::Text);
const COMMENT: EditorInfo = EditorInfo::new(TokenType::LineComment, TokenColor::Comment);
const TAG: EditorInfo = EditorInfo::new(TokenType::Literal, TokenColor::Identifier);
const DOC_DELIMITER: EditorInfo = EditorInfo::new(TokenType::Delimiter, TokenColor::String);
const DOC_CONTENT: EditorInfo = EditorInfo::new(TokenType::String, TokenColor::String);
const CELL_SEPARATOR: EditorInfo = EditorInfo {
    ty: TokenType::Delimiter,
    color: TokenColor::Text,
    triggers: TokenTriggers::PARAMETER_NEXT,
};
const PLACEHOLDER: EditorInfo = EditorInfo {
    ty: TokenType::Identifier,
    color: TokenColor::Number,
    triggers: TokenTriggers::PARAMETER_START.union(TokenTriggers::PARAMETER_END),
};

/// Keywords of a Gherkin spoken language.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Dialect {
    /// Keywords opening a section, followed by a colon.
    sections: Vec<String>,

    /// Keywords opening a step, followed by a whitespace.
    steps: Vec<String>,
}

impl Default for Dialect {
    fn default() -> Self {
        Self::english()
    }
}

impl Dialect {
    /// Creates a new [`Dialect`] out of the given section and step keywords.
    #[must_use]
    pub fn new<S, T>(sections: S, steps: T) -> Self
    where
        S: IntoIterator,
        S::Item: Into<String>,
        T: IntoIterator,
        T::Item: Into<String>,
    {
        let sorted = |kws: Vec<String>| {
            let mut kws = kws;
            kws.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
            kws
        };
        Self {
            sections: sorted(sections.into_iter().map(Into::into).collect()),
            steps: sorted(steps.into_iter().map(Into::into).collect()),
        }
    }

    /// Creates the English [`Dialect`].
    #[must_use]
    pub fn english() -> Self {
        Self::new(
            [
                "Feature",
                "Business Need",
                "Ability",
                "Rule",
                "Background",
                "Scenario",
                "Example",
                "Scenario Outline",
                "Scenario Template",
                "Examples",
                "Scenarios",
            ],
            ["Given", "When", "Then", "And", "But", "*"],
        )
    }

    /// Returns the byte length of the section keyword (colon included)
    /// starting the given `text`, if any.
    fn section_at(&self, text: &str) -> Option<usize> {
        self.sections
            .iter()
            .find(|kw| {
                text.strip_prefix(kw.as_str())
                    .is_some_and(|rest| rest.starts_with(':'))
            })
            .map(|kw| kw.len() + 1)
    }

    /// Returns the byte length of the step keyword starting the given `text`,
    /// if any.
    fn step_at(&self, text: &str) -> Option<usize> {
        self.steps
            .iter()
            .find(|kw| {
                text.strip_prefix(kw.as_str()).is_some_and(|rest| {
                    rest.chars().next().map_or(true, char::is_whitespace)
                })
            })
            .map(String::len)
    }
}

/// What the rest of the current line may hold.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
enum Expect {
    /// Anything a line may start with.
    #[default]
    LineStart,

    /// More tags or a comment.
    Tags,

    /// Text of a step.
    StepText,

    /// Title of a section, or content type of a doc string.
    Title,

    /// Cells of a table row.
    Table,

    /// Nothing, the line is exhausted.
    Done,
}

/// Single lexeme recognized at the cursor.
#[derive(Clone, Copy, Debug)]
struct Lexeme {
    kind: TokenKind,
    len: usize,
    info: Option<EditorInfo>,
    key_info: Option<EditorInfo>,
    state: i32,
    expect: Expect,
}

impl Lexeme {
    const fn new(kind: TokenKind, len: usize, state: i32, expect: Expect) -> Self {
        Self { kind, len, info: None, key_info: None, state, expect }
    }

    fn info(mut self, info: EditorInfo) -> Self {
        self.info = Some(info);
        self
    }

    fn key_info(mut self, info: EditorInfo) -> Self {
        self.key_info = Some(info);
        self
    }
}

/// [`Lexer`] of Gherkin feature files.
#[derive(Clone, Debug, Default)]
pub struct GherkinLexer {
    /// Keywords to recognize.
    dialect: Dialect,

    /// Current line.
    line: String,

    /// Character offset of the current line in the document.
    offset: usize,

    /// Byte position of the cursor in the current line.
    cursor: usize,

    /// Character position of the cursor in the current line.
    char_cursor: usize,

    /// What the rest of the current line may hold.
    expect: Expect,
}

impl GherkinLexer {
    /// Creates a new [`GherkinLexer`] of the English [`Dialect`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new [`GherkinLexer`] of the given [`Dialect`].
    #[must_use]
    pub fn with_dialect(dialect: Dialect) -> Self {
        Self { dialect, ..Self::default() }
    }

    /// Moves the cursor by `len` bytes.
    fn advance(&mut self, len: usize) {
        let end = self.cursor + len;
        self.char_cursor += self.line[self.cursor..end].chars().count();
        self.cursor = end;
    }

    /// Recognizes the [`Lexeme`] at the start of the given non-empty `rest`
    /// of the line.
    fn lex(&self, rest: &str, state: i32) -> Lexeme {
        use TokenKind as K;

        let till_end = rest.trim_end().len();

        if self.expect == Expect::Title {
            return Lexeme::new(K::Text, till_end, state, Expect::Done);
        }

        if let Some(delimiter) = match state {
            IN_QUOTED_DOC => Some(QUOTED_DOC),
            IN_FENCED_DOC => Some(FENCED_DOC),
            _ => None,
        } {
            return if self.expect == Expect::LineStart && rest.starts_with(delimiter) {
                Lexeme::new(K::Delimiter, delimiter.len(), NORMAL, Expect::Done)
                    .key_info(DOC_DELIMITER)
            } else {
                Lexeme::new(K::String, till_end, state, Expect::Done).info(DOC_CONTENT)
            };
        }

        match self.expect {
            Expect::LineStart => {
                if rest.starts_with('#') {
                    Lexeme::new(K::Comment, till_end, NORMAL, Expect::Done).info(COMMENT)
                } else if rest.starts_with('@') {
                    tag(rest)
                } else if rest.starts_with(QUOTED_DOC) {
                    Lexeme::new(K::Delimiter, QUOTED_DOC.len(), IN_QUOTED_DOC, Expect::Title)
                        .key_info(DOC_DELIMITER)
                } else if rest.starts_with(FENCED_DOC) {
                    Lexeme::new(K::Delimiter, FENCED_DOC.len(), IN_FENCED_DOC, Expect::Title)
                        .key_info(DOC_DELIMITER)
                } else if rest.starts_with('|') {
                    Lexeme::new(K::Delimiter, 1, NORMAL, Expect::Table)
                        .key_info(CELL_SEPARATOR)
                } else if let Some(len) = self.dialect.section_at(rest) {
                    Lexeme::new(K::Keyword, len, NORMAL, Expect::Title).key_info(KEYWORD)
                } else if let Some(len) = self.dialect.step_at(rest) {
                    Lexeme::new(K::Keyword, len, NORMAL, Expect::StepText)
                        .key_info(STEP_KEYWORD)
                } else {
                    Lexeme::new(K::Text, till_end, NORMAL, Expect::Done)
                }
            }
            Expect::Tags => {
                if rest.starts_with('@') {
                    tag(rest)
                } else if rest.starts_with('#') {
                    Lexeme::new(K::Comment, till_end, NORMAL, Expect::Done).info(COMMENT)
                } else {
                    Lexeme::new(K::Text, till_end, NORMAL, Expect::Done)
                }
            }
            Expect::StepText => {
                Lexeme::new(K::Identifier, till_end, NORMAL, Expect::Done).info(STEP_TEXT)
            }
            Expect::Title | Expect::Done => {
                Lexeme::new(K::Text, till_end, NORMAL, Expect::Done)
            }
            Expect::Table => table_cell(rest),
        }
    }
}

/// Recognizes a tag at the start of the given `rest` of a line.
fn tag(rest: &str) -> Lexeme {
    let len = rest.find(char::is_whitespace).unwrap_or(rest.len());
    Lexeme::new(TokenKind::Tag, len, NORMAL, Expect::Tags).info(TAG)
}

/// Recognizes a table cell separator, placeholder or text at the start of the
/// given `rest` of a table row.
fn table_cell(rest: &str) -> Lexeme {
    use TokenKind as K;

    if rest.starts_with('|') {
        return Lexeme::new(K::Delimiter, 1, NORMAL, Expect::Table).key_info(CELL_SEPARATOR);
    }

    let end = cell_end(rest);
    if rest.starts_with('<') {
        return match rest[..end].find('>') {
            Some(close) => Lexeme::new(K::Placeholder, close + 1, NORMAL, Expect::Table)
                .key_info(PLACEHOLDER),
            None => Lexeme::new(K::Error, end.max(1), NORMAL, Expect::Done),
        };
    }

    let text_end = rest[..end].find('<').unwrap_or(end);
    Lexeme::new(K::Text, rest[..text_end].trim_end().len(), NORMAL, Expect::Table)
}

/// Returns the byte position of the first unescaped cell separator in the
/// given `rest` of a table row, or its length if there is none.
fn cell_end(rest: &str) -> usize {
    let mut escaped = false;
    for (i, c) in rest.char_indices() {
        match c {
            '\\' if !escaped => escaped = true,
            '|' if !escaped => return i,
            _ => escaped = false,
        }
    }
    rest.len()
}

impl Lexer for GherkinLexer {
    fn set_source(&mut self, text: &str, offset: usize) {
        text.clone_into(&mut self.line);
        self.offset = offset;
        self.cursor = 0;
        self.char_cursor = 0;
        self.expect = Expect::LineStart;
    }

    fn read_token(&mut self, state: &mut State) -> Option<Token> {
        let rest = &self.line[self.cursor..];
        let skipped = rest.len() - rest.trim_start().len();
        self.advance(skipped);

        let rest = &self.line[self.cursor..];
        if rest.is_empty() || self.expect == Expect::Done {
            return None;
        }

        let lexeme = self.lex(rest, (*state).into());
        let text = rest[..lexeme.len].to_owned();
        let position = self.offset + self.char_cursor;

        self.advance(lexeme.len);
        self.expect = lexeme.expect;
        *state = lexeme.state.into();

        let mut token = Token::new(lexeme.kind, position, text);
        token.editor_info = lexeme.info;
        token.key_info = lexeme.key_info;
        Some(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex_line(
        lexer: &mut GherkinLexer,
        text: &str,
        state: &mut State,
    ) -> Vec<(TokenKind, String)> {
        lexer.set_source(text, 0);
        std::iter::from_fn(|| lexer.read_token(state))
            .map(|t| (t.kind, t.text))
            .collect()
    }

    fn kinds(tokens: &[(TokenKind, String)]) -> Vec<TokenKind> {
        tokens.iter().map(|(k, _)| *k).collect()
    }

    fn texts(tokens: &[(TokenKind, String)]) -> Vec<&str> {
        tokens.iter().map(|(_, t)| t.as_str()).collect()
    }

    #[test]
    fn step_text_is_single_identifier() {
        let mut lexer = GherkinLexer::new();
        let mut state = State::default();
        let tokens = lex_line(&mut lexer, "    Given I am logged in   ", &mut state);

        assert_eq!(kinds(&tokens), [TokenKind::Keyword, TokenKind::Identifier]);
        assert_eq!(texts(&tokens), ["Given", "I am logged in"]);
        assert_eq!(state, State::default());
    }

    #[test]
    fn star_and_conjunction_steps() {
        let mut lexer = GherkinLexer::new();
        let mut state = State::default();

        let tokens = lex_line(&mut lexer, "* I eat 5 cukes", &mut state);
        assert_eq!(texts(&tokens), ["*", "I eat 5 cukes"]);

        let tokens = lex_line(&mut lexer, "And I have <left> cukes", &mut state);
        assert_eq!(kinds(&tokens), [TokenKind::Keyword, TokenKind::Identifier]);
    }

    #[test]
    fn keyword_prefix_of_word_is_text() {
        let mut lexer = GherkinLexer::new();
        let mut state = State::default();
        let tokens = lex_line(&mut lexer, "Andy walks in", &mut state);
        assert_eq!(kinds(&tokens), [TokenKind::Text]);
    }

    #[test]
    fn section_keyword_with_title() {
        let mut lexer = GherkinLexer::new();
        let mut state = State::default();
        let tokens = lex_line(&mut lexer, "  Scenario Outline: eating", &mut state);

        assert_eq!(kinds(&tokens), [TokenKind::Keyword, TokenKind::Text]);
        assert_eq!(texts(&tokens), ["Scenario Outline:", "eating"]);
    }

    #[test]
    fn tags_and_trailing_comment() {
        let mut lexer = GherkinLexer::new();
        let mut state = State::default();
        let tokens = lex_line(&mut lexer, "@slow @web # flaky", &mut state);

        assert_eq!(
            kinds(&tokens),
            [TokenKind::Tag, TokenKind::Tag, TokenKind::Comment],
        );
        assert_eq!(texts(&tokens), ["@slow", "@web", "# flaky"]);
    }

    #[test]
    fn comment_line() {
        let mut lexer = GherkinLexer::new();
        let mut state = State::default();
        let tokens = lex_line(&mut lexer, "# language: en", &mut state);
        assert_eq!(kinds(&tokens), [TokenKind::Comment]);
    }

    #[test]
    fn table_row() {
        let mut lexer = GherkinLexer::new();
        let mut state = State::default();
        let tokens = lex_line(&mut lexer, "| start | a \\| b | <left> |", &mut state);

        assert_eq!(
            texts(&tokens),
            ["|", "start", "|", "a \\| b", "|", "<left>", "|"],
        );
        assert_eq!(tokens[5].0, TokenKind::Placeholder);
    }

    #[test]
    fn unterminated_placeholder_is_error() {
        let mut lexer = GherkinLexer::new();
        let mut state = State::default();
        let tokens = lex_line(&mut lexer, "| <left | 1 |", &mut state);

        assert_eq!(kinds(&tokens), [TokenKind::Delimiter, TokenKind::Error]);
    }

    #[test]
    fn doc_string_carries_state_across_lines() {
        let mut lexer = GherkinLexer::new();
        let mut state = State::default();

        let tokens = lex_line(&mut lexer, r#"  """json"#, &mut state);
        assert_eq!(kinds(&tokens), [TokenKind::Delimiter, TokenKind::Text]);
        assert_eq!(i32::from(state), IN_QUOTED_DOC);

        let tokens = lex_line(&mut lexer, "  Given this is not a step", &mut state);
        assert_eq!(kinds(&tokens), [TokenKind::String]);
        assert_eq!(texts(&tokens), ["Given this is not a step"]);

        let tokens = lex_line(&mut lexer, "  ``` still inside", &mut state);
        assert_eq!(kinds(&tokens), [TokenKind::String]);

        let tokens = lex_line(&mut lexer, r#"  """"#, &mut state);
        assert_eq!(kinds(&tokens), [TokenKind::Delimiter]);
        assert_eq!(state, State::default());

        let tokens = lex_line(&mut lexer, "  Given a step", &mut state);
        assert_eq!(kinds(&tokens), [TokenKind::Keyword, TokenKind::Identifier]);
    }

    #[test]
    fn fenced_doc_string() {
        let mut lexer = GherkinLexer::new();
        let mut state = State::default();

        _ = lex_line(&mut lexer, "```", &mut state);
        assert_eq!(i32::from(state), IN_FENCED_DOC);
        let tokens = lex_line(&mut lexer, r#""""#, &mut state);
        assert_eq!(kinds(&tokens), [TokenKind::String]);
        _ = lex_line(&mut lexer, "```", &mut state);
        assert_eq!(state, State::default());
    }

    #[test]
    fn positions_are_character_offsets_in_document() {
        let mut lexer = GherkinLexer::new();
        let mut state = State::default();
        lexer.set_source("  Given ünïcödé step", 100);

        let keyword = lexer.read_token(&mut state).unwrap();
        let text = lexer.read_token(&mut state).unwrap();
        assert_eq!(keyword.position, 102);
        assert_eq!(text.position, 108);
        assert_eq!(text.len(), 12);
        assert!(lexer.read_token(&mut state).is_none());
    }

    #[test]
    fn set_source_discards_leftovers() {
        let mut lexer = GherkinLexer::new();
        let mut state = State::default();
        lexer.set_source("Given a step", 0);
        _ = lexer.read_token(&mut state);

        lexer.set_source("# comment", 13);
        let token = lexer.read_token(&mut state).unwrap();
        assert_eq!(token.kind, TokenKind::Comment);
        assert_eq!(token.position, 13);
    }

    #[test]
    fn blank_line_has_no_tokens() {
        let mut lexer = GherkinLexer::new();
        let mut state = State::default();
        assert!(lex_line(&mut lexer, "   \t ", &mut state).is_empty());
        assert!(lex_line(&mut lexer, "", &mut state).is_empty());
    }

    #[test]
    fn custom_dialect() {
        let dialect = Dialect::new(["Funktionalität", "Szenario"], ["Angenommen", "Wenn", "Dann"]);
        let mut lexer = GherkinLexer::with_dialect(dialect);
        let mut state = State::default();

        let tokens = lex_line(&mut lexer, "Angenommen ich bin angemeldet", &mut state);
        assert_eq!(texts(&tokens), ["Angenommen", "ich bin angemeldet"]);
        let tokens = lex_line(&mut lexer, "Given I am logged in", &mut state);
        assert_eq!(kinds(&tokens), [TokenKind::Text]);
    }

    #[test]
    fn keyed_metadata_of_keywords() {
        let mut lexer = GherkinLexer::new();
        let mut state = State::default();
        lexer.set_source("When I pay", 0);

        let keyword = lexer.read_token(&mut state).unwrap();
        assert_eq!(keyword.editor_info, None);
        assert_eq!(keyword.key_info, Some(STEP_KEYWORD));

        let text = lexer.read_token(&mut state).unwrap();
        assert_eq!(text.editor_info, Some(STEP_TEXT));
    }
}
