//! Contract of a grammar's line lexer, as consumed by a [`LineScanner`].
//!
//! [`LineScanner`]: super::LineScanner

use derive_more::with_trait::{Display, From, Into};

use super::token::EditorInfo;

/// Opaque carry-over state of a [`Lexer`] between lines.
///
/// Only the [`Lexer`] producing it knows what it means, everyone else just
/// threads it from one line to the next one.
#[derive(
    Clone, Copy, Debug, Default, Display, Eq, From, Hash, Into, PartialEq,
)]
pub struct State(i32);

/// Lexical category of a [`Token`].
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum TokenKind {
    /// End of the line (or of the whole input).
    #[display("eof")]
    Eof,

    /// Text the grammar failed to tokenize.
    #[display("error")]
    Error,

    /// Identifier, the only category which may be recognized as a step
    /// reference.
    #[display("identifier")]
    Identifier,

    /// Grammar keyword.
    #[display("keyword")]
    Keyword,

    /// String literal content.
    #[display("string")]
    String,

    /// Comment.
    #[display("comment")]
    Comment,

    /// Delimiter or other punctuation.
    #[display("delimiter")]
    Delimiter,

    /// Tag.
    #[display("tag")]
    Tag,

    /// Template placeholder.
    #[display("placeholder")]
    Placeholder,

    /// Free-form text.
    #[display("text")]
    Text,
}

/// Single token read by a [`Lexer`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Token {
    /// Lexical category of this [`Token`].
    pub kind: TokenKind,

    /// Character offset of this [`Token`] in the document.
    pub position: usize,

    /// Source text of this [`Token`].
    pub text: String,

    /// Editor metadata of this very [`Token`], if any.
    pub editor_info: Option<EditorInfo>,

    /// Editor metadata the grammar keys to the lexical class (key term) of
    /// this [`Token`], if any.
    pub key_info: Option<EditorInfo>,
}

impl Token {
    /// Creates a new [`Token`] without any editor metadata.
    #[must_use]
    pub fn new(kind: TokenKind, position: usize, text: impl Into<String>) -> Self {
        Self {
            kind,
            position,
            text: text.into(),
            editor_info: None,
            key_info: None,
        }
    }

    /// Sets the editor metadata of this very [`Token`].
    #[must_use]
    pub fn with_info(mut self, info: EditorInfo) -> Self {
        self.editor_info = Some(info);
        self
    }

    /// Sets the editor metadata keyed to the lexical class of this [`Token`].
    #[must_use]
    pub fn with_key_info(mut self, info: EditorInfo) -> Self {
        self.key_info = Some(info);
        self
    }

    /// Returns the length of this [`Token`] in characters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    /// Indicates whether this [`Token`] covers no text.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Lexer of a grammar, reading one line at a time.
pub trait Lexer {
    /// Resets this [`Lexer`] to read the given `text` of a single line,
    /// starting at the character `offset` in the document.
    ///
    /// Discards whatever was left unread of the previous line.
    fn set_source(&mut self, text: &str, offset: usize);

    /// Reads the next [`Token`] of the current line, updating the carry-over
    /// `state`.
    ///
    /// Returns [`None`] once the line is exhausted.
    fn read_token(&mut self, state: &mut State) -> Option<Token>;
}

impl<L: Lexer + ?Sized> Lexer for Box<L> {
    fn set_source(&mut self, text: &str, offset: usize) {
        (**self).set_source(text, offset);
    }

    fn read_token(&mut self, state: &mut State) -> Option<Token> {
        (**self).read_token(state)
    }
}
