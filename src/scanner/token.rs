//! Classified tokens handed to an editor host.

use bitflags::bitflags;
use derive_more::with_trait::Display;

/// Color classification of a token.
#[derive(Clone, Copy, Debug, Default, Display, Eq, Hash, PartialEq)]
pub enum TokenColor {
    /// Plain text.
    #[default]
    #[display("text")]
    Text,

    /// Grammar keyword.
    #[display("keyword")]
    Keyword,

    /// Comment.
    #[display("comment")]
    Comment,

    /// Identifier.
    #[display("identifier")]
    Identifier,

    /// String literal.
    #[display("string")]
    String,

    /// Number or placeholder.
    #[display("number")]
    Number,

    /// Step text recognized as a reference to a known step definition.
    #[display("step")]
    RecognizedStep,
}

/// Type classification of a token.
#[derive(Clone, Copy, Debug, Default, Display, Eq, Hash, PartialEq)]
pub enum TokenType {
    /// Plain text.
    #[default]
    #[display("text")]
    Text,

    /// Grammar keyword.
    #[display("keyword")]
    Keyword,

    /// Identifier.
    #[display("identifier")]
    Identifier,

    /// String literal.
    #[display("string")]
    String,

    /// Literal other than a string.
    #[display("literal")]
    Literal,

    /// Delimiter or other punctuation.
    #[display("delimiter")]
    Delimiter,

    /// Comment running to the end of a line.
    #[display("comment")]
    LineComment,
}

bitflags! {
    /// Editor actions a token triggers.
    #[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
    pub struct TokenTriggers: u8 {
        /// Member (completion) list should be shown.
        const MEMBER_SELECT = 0x01;

        /// Matching braces should be highlighted.
        const MATCH_BRACES = 0x02;

        /// Token starts a parameter list.
        const PARAMETER_START = 0x10;

        /// Token separates parameters.
        const PARAMETER_NEXT = 0x20;

        /// Token ends a parameter list.
        const PARAMETER_END = 0x40;
    }
}

/// Editor metadata associated with a token by a grammar.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct EditorInfo {
    /// Type classification.
    pub ty: TokenType,

    /// Color classification.
    pub color: TokenColor,

    /// Triggered editor actions.
    pub triggers: TokenTriggers,
}

impl EditorInfo {
    /// Classification of tokens without any editor metadata: plain text, no
    /// color, no triggers.
    pub const DEFAULT: Self = Self::new(TokenType::Text, TokenColor::Text);

    /// Classification of identifiers recognized as step references.
    pub const RECOGNIZED_STEP: Self =
        Self::new(TokenType::Identifier, TokenColor::RecognizedStep);

    /// Creates new [`EditorInfo`] without any triggers.
    #[must_use]
    pub const fn new(ty: TokenType, color: TokenColor) -> Self {
        Self { ty, color, triggers: TokenTriggers::empty() }
    }

    /// Sets the triggers of this [`EditorInfo`].
    #[must_use]
    pub fn triggering(mut self, triggers: TokenTriggers) -> Self {
        self.triggers = triggers;
        self
    }
}

/// Classified token of a single line, as consumed by an editor host to paint
/// it.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct TokenInfo {
    /// Character offset of the first character of the token.
    pub start_index: usize,

    /// Character offset of the last character of the token (inclusive).
    pub end_index: usize,

    /// Color classification.
    pub color: TokenColor,

    /// Type classification.
    pub ty: TokenType,

    /// Triggered editor actions.
    pub trigger: TokenTriggers,
}
