// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Line-oriented token scanning for syntax coloring.
//!
//! A [`LineScanner`] adapts a grammar's [`Lexer`] to the protocol of an
//! editor host: the host feeds a single line with [`LineScanner::set_source()`]
//! and then pulls [`TokenInfo`]s one by one with
//! [`LineScanner::scan_token()`] until it returns `false`, threading the
//! opaque [`State`] from one line to the next one.
//!
//! Once a [`StepIndex`] is attached, identifiers matching any indexed
//! [`StepDefinition`] are reclassified as [`EditorInfo::RECOGNIZED_STEP`].
//!
//! [`StepDefinition`]: crate::StepDefinition

pub mod gherkin;
pub mod lexer;
pub mod token;

use std::sync::Arc;

use crate::StepIndex;

#[doc(inline)]
pub use self::{
    gherkin::{Dialect, GherkinLexer},
    lexer::{Lexer, State, Token, TokenKind},
    token::{EditorInfo, TokenColor, TokenInfo, TokenTriggers, TokenType},
};

/// Adapter of a [`Lexer`] to the per-line scanning protocol of an editor host.
#[derive(Debug, Default)]
pub struct LineScanner<L = GherkinLexer> {
    /// Grammar's [`Lexer`] reading the current line.
    lexer: L,

    /// [`StepIndex`] to recognize step references with, if attached.
    index: Option<Arc<StepIndex>>,
}

impl LineScanner {
    /// Creates a new [`LineScanner`] of the English Gherkin grammar.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<L: Lexer> LineScanner<L> {
    /// Creates a new [`LineScanner`] over the given grammar's [`Lexer`].
    #[must_use]
    pub const fn with_lexer(lexer: L) -> Self {
        Self { lexer, index: None }
    }

    /// Attaches the given [`StepIndex`] to recognize step references with.
    ///
    /// Replaces the previously attached one, if any.
    pub fn attach_step_index(&mut self, index: Arc<StepIndex>) {
        self.index = Some(index);
    }

    /// Detaches the [`StepIndex`], if any, so no identifier is recognized as
    /// a step reference anymore.
    pub fn detach_step_index(&mut self) -> Option<Arc<StepIndex>> {
        self.index.take()
    }

    /// Returns the attached [`StepIndex`], if any.
    #[must_use]
    pub const fn step_index(&self) -> Option<&Arc<StepIndex>> {
        self.index.as_ref()
    }

    /// Sets the `text` of a single line to scan next, starting at the
    /// character `offset` in the document.
    ///
    /// Whatever was left unread of the previous line is discarded.
    pub fn set_source(&mut self, text: &str, offset: usize) {
        self.lexer.set_source(text, offset);
    }

    /// Reads the next token of the current line into the given `info`.
    ///
    /// Returns `false` once the line has no more colorable tokens: at its
    /// end, on a token the grammar failed to tokenize, or on an empty token.
    /// In such case the `info` is left untouched.
    pub fn scan_token(&mut self, info: &mut TokenInfo, state: &mut State) -> bool {
        match self.next_token(state) {
            Some(scanned) => {
                *info = scanned;
                true
            }
            None => false,
        }
    }

    /// Same as [`LineScanner::scan_token()`], but returns the [`TokenInfo`]
    /// directly.
    pub fn next_token(&mut self, state: &mut State) -> Option<TokenInfo> {
        let token = self.lexer.read_token(state)?;
        if matches!(token.kind, TokenKind::Eof | TokenKind::Error)
            || token.is_empty()
        {
            tracing::trace!(
                kind = %token.kind,
                position = token.position,
                "line scanning stopped",
            );
            return None;
        }

        let info = self.classify(&token);
        tracing::trace!(
            kind = %token.kind,
            start = info.start_index,
            end = info.end_index,
            color = %info.color,
            "scanned token",
        );
        Some(info)
    }

    /// Scans the whole given line of `text`, starting at the character
    /// `offset` in the document.
    pub fn scan_line(
        &mut self,
        text: &str,
        offset: usize,
        state: &mut State,
    ) -> Vec<TokenInfo> {
        self.set_source(text, offset);
        std::iter::from_fn(|| self.next_token(state)).collect()
    }

    /// Classifies the given non-empty [`Token`].
    fn classify(&self, token: &Token) -> TokenInfo {
        let meta = token
            .editor_info
            .or(token.key_info)
            .unwrap_or(EditorInfo::DEFAULT);
        let recognized = token.kind == TokenKind::Identifier
            && self.index.as_ref().is_some_and(|i| i.has_match(&token.text));
        let info = if recognized { EditorInfo::RECOGNIZED_STEP } else { meta };

        TokenInfo {
            start_index: token.position,
            end_index: token.position + token.len() - 1,
            color: info.color,
            ty: info.ty,
            trigger: meta.triggers,
        }
    }
}
