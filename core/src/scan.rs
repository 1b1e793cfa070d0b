//! Lexical scanner state.
//!
//! The engine classifies every character position as exactly one of these
//! states. Braces, brackets and parens only reach the frame stack while the
//! scanner is in [`LexState::Code`]; inside strings, character literals and
//! comments they are inert.

/// Scanner mode at the current character position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LexState {
    #[default]
    Code,
    LineComment,
    BlockComment,
    /// Interior lines of a `/* */` comment after the first newline.
    BlockCommentContinuation,
    StringLiteral,
    VerbatimStringLiteral,
    CharLiteral,
    PreprocessorLine,
    /// A `"` was seen inside a verbatim string. The next character decides
    /// whether it was a doubled escape or the end of the literal.
    VerbatimStringQuoteEscape,
}

impl LexState {
    pub fn is_code(self) -> bool {
        self == LexState::Code
    }

    pub fn is_comment(self) -> bool {
        matches!(
            self,
            LexState::LineComment | LexState::BlockComment | LexState::BlockCommentContinuation
        )
    }

    pub fn is_string_or_char(self) -> bool {
        matches!(
            self,
            LexState::StringLiteral
                | LexState::VerbatimStringLiteral
                | LexState::VerbatimStringQuoteEscape
                | LexState::CharLiteral
        )
    }

    pub fn is_verbatim(self) -> bool {
        matches!(
            self,
            LexState::VerbatimStringLiteral | LexState::VerbatimStringQuoteEscape
        )
    }
}

#[inline]
pub(crate) fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Characters that, when they end a line of code, mark the statement as
/// continuing on the next line.
#[inline]
pub(crate) fn is_continuation_op(c: char) -> bool {
    matches!(
        c,
        '+' | '-' | '*' | '/' | '%' | '&' | '|' | '=' | '<' | '>' | '?' | ':' | '.'
    )
}
