//! The streaming indentation engine.
//!
//! Characters are pushed one at a time in document order. At any point the
//! engine can report the indent prescribed for the line being consumed
//! (`this_line_indent`), the indent a fresh line would receive
//! (`next_line_indent`), the whitespace actually present so far on the
//! current line (`current_indent`), and whether the two disagree
//! (`needs_reindent`).
//!
//! The engine understands lexical structure only: strings, character
//! literals, comments, preprocessor lines, braces, brackets, parens and a
//! handful of statement keywords. It never parses and it never fails;
//! malformed input is recovered from locally and processing continues.

use std::sync::Arc;

use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;
use tracing::trace;

use crate::config::IndentConfig;
use crate::directive::DirectiveTracker;
use crate::frame::{EmbeddedKind, FrameKind, FrameStack};
use crate::pos::Position;
use crate::scan::{self, LexState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Keyword {
    If,
    Else,
    Do,
    While,
    For,
    Foreach,
    Using,
    Lock,
    Fixed,
    Switch,
    Case,
    Default,
    Namespace,
    Class,
    Struct,
    Interface,
    Enum,
}

static KEYWORDS: Lazy<FxHashMap<&'static str, Keyword>> = Lazy::new(|| {
    let mut m = FxHashMap::default();
    m.insert("if", Keyword::If);
    m.insert("else", Keyword::Else);
    m.insert("do", Keyword::Do);
    m.insert("while", Keyword::While);
    m.insert("for", Keyword::For);
    m.insert("foreach", Keyword::Foreach);
    m.insert("using", Keyword::Using);
    m.insert("lock", Keyword::Lock);
    m.insert("fixed", Keyword::Fixed);
    m.insert("switch", Keyword::Switch);
    m.insert("case", Keyword::Case);
    m.insert("default", Keyword::Default);
    m.insert("namespace", Keyword::Namespace);
    m.insert("class", Keyword::Class);
    m.insert("struct", Keyword::Struct);
    m.insert("interface", Keyword::Interface);
    m.insert("enum", Keyword::Enum);
    m
});

#[derive(Debug, Clone)]
pub struct IndentEngine {
    config: Arc<IndentConfig>,
    state: LexState,
    frames: FrameStack,
    directives: DirectiveTracker,

    offset: usize,
    byte_offset: usize,
    line: u32,
    column: u32,

    current_indent: String,
    this_line: Option<String>,
    needs_reindent: bool,
    line_has_token: bool,
    /// The current line started inside a verbatim string, so its leading
    /// text is literal content and must not be judged against the stack.
    line_began_inside: bool,

    word: String,
    word_line_first: bool,
    previous: char,
    last_significant: char,
    slash_armed: bool,
    slash_line_first: bool,
    sig_before_slash: char,
    escaped: bool,
    directive_done: bool,

    statement_keyword: Option<Keyword>,
    pending_condition: Option<Keyword>,
    pending_case: bool,

    comment_indent: String,
    comment_len: usize,
}

impl IndentEngine {
    pub fn new(config: IndentConfig) -> Self {
        Self::with_shared_config(Arc::new(config))
    }

    pub fn with_shared_config(config: Arc<IndentConfig>) -> Self {
        Self {
            config,
            state: LexState::Code,
            frames: FrameStack::new(),
            directives: DirectiveTracker::new(),
            offset: 0,
            byte_offset: 0,
            line: 1,
            column: 1,
            current_indent: String::new(),
            this_line: None,
            needs_reindent: false,
            line_has_token: false,
            line_began_inside: false,
            word: String::new(),
            word_line_first: false,
            previous: '\0',
            last_significant: '\0',
            slash_armed: false,
            slash_line_first: false,
            sig_before_slash: '\0',
            escaped: false,
            directive_done: false,
            statement_keyword: None,
            pending_condition: None,
            pending_case: false,
            comment_indent: String::new(),
            comment_len: 0,
        }
    }

    /// Drop all state and start over at offset zero.
    pub fn reset(&mut self) {
        trace!(offset = self.offset, "indent engine reset");
        *self = Self::with_shared_config(self.config.clone());
    }

    pub fn config(&self) -> &IndentConfig {
        &self.config
    }

    pub fn shared_config(&self) -> Arc<IndentConfig> {
        self.config.clone()
    }

    pub fn state(&self) -> LexState {
        self.state
    }

    pub fn frames(&self) -> &FrameStack {
        &self.frames
    }

    pub fn directives(&self) -> &DirectiveTracker {
        &self.directives
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn byte_offset(&self) -> usize {
        self.byte_offset
    }

    pub fn location(&self) -> Position {
        Position::new(self.line, self.column, self.offset)
    }

    /// Whitespace actually present so far on the current line.
    pub fn current_indent(&self) -> &str {
        &self.current_indent
    }

    /// Indent prescribed for the line currently being consumed.
    pub fn this_line_indent(&self) -> String {
        match &self.this_line {
            Some(indent) => indent.clone(),
            None => self.next_line_indent(),
        }
    }

    /// Indent a line opened at the current position would receive.
    pub fn next_line_indent(&self) -> String {
        match self.state {
            // Indenting verbatim string content would change the string
            LexState::VerbatimStringLiteral | LexState::VerbatimStringQuoteEscape => String::new(),
            LexState::BlockComment | LexState::BlockCommentContinuation => {
                format!("{} ", self.comment_indent)
            }
            _ => self.frames.indent().to_string(),
        }
    }

    /// True when the current line's actual indent disagrees with the
    /// prescribed one. Lines without a token never set this.
    pub fn needs_reindent(&self) -> bool {
        self.needs_reindent
    }

    /// Consume one character. Must be called in document order.
    pub fn push(&mut self, ch: char) {
        if ch == '\r' {
            // Carriage returns are invisible to the indent machine
            self.offset += 1;
            self.byte_offset += ch.len_utf8();
            return;
        }
        match self.state {
            LexState::Code => self.push_code(ch),
            LexState::LineComment => self.push_line_comment(ch),
            LexState::BlockComment | LexState::BlockCommentContinuation => {
                self.push_block_comment(ch)
            }
            LexState::StringLiteral => self.push_string(ch),
            LexState::VerbatimStringLiteral => self.push_verbatim(ch),
            LexState::VerbatimStringQuoteEscape => self.push_verbatim_escape(ch),
            LexState::CharLiteral => self.push_char_literal(ch),
            LexState::PreprocessorLine => self.push_preprocessor(ch),
        }
        self.offset += 1;
        self.byte_offset += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        self.previous = ch;
    }

    /// Consume every character of `text` in order.
    pub fn push_str(&mut self, text: &str) {
        for ch in text.chars() {
            self.push(ch);
        }
    }

    fn push_code(&mut self, ch: char) {
        if ch == '\n' {
            self.complete_word();
            self.end_line(true);
            return;
        }
        if ch.is_whitespace() {
            self.complete_word();
            self.slash_armed = false;
            if !self.line_has_token {
                self.current_indent.push(ch);
            }
            return;
        }

        if self.slash_armed {
            self.slash_armed = false;
            if ch == '/' {
                self.begin_line_comment();
                return;
            }
            if ch == '*' {
                self.begin_block_comment();
                return;
            }
        }

        let first = !self.line_has_token;

        if scan::is_ident_char(ch) {
            if self.word.is_empty() {
                self.word_line_first = first;
            }
            if first {
                self.begin_token();
            }
            self.note_bracket_content();
            self.word.push(ch);
            self.last_significant = ch;
            return;
        }
        self.complete_word();

        match ch {
            '#' if first => {
                self.line_has_token = true;
                self.set_this_line(String::new());
                self.word.clear();
                self.directive_done = false;
                self.state = LexState::PreprocessorLine;
            }
            '"' => {
                if first {
                    self.begin_token();
                }
                self.note_bracket_content();
                self.state = if self.previous == '@' {
                    LexState::VerbatimStringLiteral
                } else {
                    LexState::StringLiteral
                };
                self.escaped = false;
                self.last_significant = '"';
            }
            '\'' => {
                if first {
                    self.begin_token();
                }
                self.note_bracket_content();
                self.state = LexState::CharLiteral;
                self.escaped = false;
                self.last_significant = '\'';
            }
            '/' => {
                if first {
                    self.begin_token();
                }
                self.note_bracket_content();
                self.slash_armed = true;
                self.slash_line_first = first;
                self.sig_before_slash = self.last_significant;
                self.last_significant = '/';
            }
            '{' => self.open_brace(first),
            '}' => self.close_brace(first),
            '(' => {
                if first {
                    self.begin_token();
                }
                self.note_bracket_content();
                self.open_paren();
            }
            ')' => self.close_paren(first),
            '[' => {
                if first {
                    self.begin_token();
                }
                self.note_bracket_content();
                self.open_bracket(first);
            }
            ']' => self.close_bracket(first),
            ';' => {
                if first {
                    self.begin_token();
                }
                self.end_statement();
            }
            ':' => {
                if self.pending_case {
                    if first {
                        self.begin_token();
                    }
                    self.frames.push_switch_case(self.line, &self.config.indent_string);
                    self.pending_case = false;
                    // The colon closing a case label is not a continuation
                    self.last_significant = '\0';
                } else {
                    self.start_continuation_if_leading(first);
                    self.last_significant = ':';
                }
                self.note_bracket_content();
            }
            '.' | '?' => {
                self.start_continuation_if_leading(first);
                self.note_bracket_content();
                self.last_significant = ch;
            }
            _ => {
                if first {
                    self.begin_token();
                }
                self.note_bracket_content();
                self.last_significant = ch;
            }
        }
    }

    /// A line leading with `.`, `?` or `:` continues the statement above.
    /// Inside an open paren or bracket the frame already governs the
    /// indent, so no continuation is stacked there.
    fn start_continuation_if_leading(&mut self, first: bool) {
        if first
            && !matches!(
                self.frames.top_kind(),
                Some(
                    FrameKind::Parenthesis
                        | FrameKind::Bracket
                        | FrameKind::Attribute
                        | FrameKind::Continuation
                )
            )
        {
            self.frames.push_continuation(self.line, &self.config.indent_string);
        }
        if first {
            self.begin_token();
        }
    }

    fn begin_token(&mut self) {
        self.line_has_token = true;
        if self.this_line.is_none() {
            let indent = self.frames.indent().to_string();
            self.set_this_line(indent);
        }
    }

    fn set_this_line(&mut self, indent: String) {
        if !self.line_began_inside {
            self.needs_reindent = indent != self.current_indent;
        }
        self.this_line = Some(indent);
    }

    fn note_bracket_content(&mut self) {
        self.frames.note_content(
            self.line,
            self.column,
            self.config.align_to_first_method_call_argument,
            self.config.align_to_first_indexer_argument,
        );
    }

    fn complete_word(&mut self) {
        if self.word.is_empty() {
            return;
        }
        let word = std::mem::take(&mut self.word);
        let line_first = self.word_line_first;
        self.word_line_first = false;
        let Some(&kw) = KEYWORDS.get(word.as_str()) else {
            return;
        };
        match kw {
            Keyword::If
            | Keyword::While
            | Keyword::For
            | Keyword::Foreach
            | Keyword::Using
            | Keyword::Lock
            | Keyword::Fixed => {
                if line_first {
                    match kw {
                        Keyword::If => self.align_chained_embedded(EmbeddedKind::If),
                        Keyword::Using => self.align_chained_embedded(EmbeddedKind::Using),
                        _ => {}
                    }
                }
                self.pending_condition = Some(kw);
            }
            Keyword::Else | Keyword::Do => self.push_embedded(kw),
            Keyword::Switch
            | Keyword::Namespace
            | Keyword::Class
            | Keyword::Struct
            | Keyword::Interface
            | Keyword::Enum => self.statement_keyword = Some(kw),
            Keyword::Case | Keyword::Default => {
                if line_first && self.frames.in_switch() {
                    if self.frames.top_is(FrameKind::SwitchCase) {
                        self.frames.pop_matched(&[FrameKind::SwitchCase]);
                        let indent = self.frames.indent().to_string();
                        self.set_this_line(indent);
                    }
                    self.pending_case = true;
                }
            }
        }
    }

    fn push_embedded(&mut self, kw: Keyword) {
        let family = match kw {
            Keyword::If | Keyword::Else => EmbeddedKind::If,
            Keyword::Using => EmbeddedKind::Using,
            _ => EmbeddedKind::Other,
        };
        self.push_embedded_family(family);
    }

    fn open_brace(&mut self, first: bool) {
        self.note_bracket_content();
        self.frames.pop_continuations();
        // A brace absorbs the embedded statement it opens, no double indent
        self.frames.pop_embedded_chain();
        if first {
            self.begin_token();
        }
        let initializer = matches!(self.last_significant, '=' | '(' | '[' | ',');
        let kind = match self.statement_keyword {
            Some(Keyword::Namespace) => FrameKind::Namespace,
            Some(Keyword::Class | Keyword::Struct | Keyword::Interface | Keyword::Enum) => {
                FrameKind::TypeMember
            }
            _ if initializer => FrameKind::ArrayInitializer,
            _ => FrameKind::Block,
        };
        let is_switch = self.statement_keyword == Some(Keyword::Switch);
        self.frames
            .push_unit(kind, self.line, &self.config.indent_string, is_switch);
        self.statement_keyword = None;
        self.pending_condition = None;
        self.pending_case = false;
        self.last_significant = '{';
    }

    fn close_brace(&mut self, first: bool) {
        self.frames.pop_continuations();
        self.frames.pop_matched(&[FrameKind::SwitchCase]);
        self.frames.pop_matched(&[
            FrameKind::Block,
            FrameKind::ArrayInitializer,
            FrameKind::TypeMember,
            FrameKind::Namespace,
        ]);
        if first {
            self.begin_token();
        }
        // The closed block also ends the embedded statement that owned it
        self.frames.pop_embedded_chain();
        self.statement_keyword = None;
        self.pending_condition = None;
        self.pending_case = false;
        self.last_significant = '}';
    }

    fn open_paren(&mut self) {
        let condition = self.pending_condition.take().map(|kw| match kw {
            Keyword::If => EmbeddedKind::If,
            Keyword::Using => EmbeddedKind::Using,
            _ => EmbeddedKind::Other,
        });
        let opening_indent = self.this_line_indent();
        self.frames.push_bracket(
            FrameKind::Parenthesis,
            &opening_indent,
            self.line,
            &self.config.indent_string,
            condition,
        );
        self.last_significant = '(';
    }

    fn close_paren(&mut self, first: bool) {
        self.frames.pop_continuations();
        let popped = self.frames.pop_matched(&[FrameKind::Parenthesis]);
        if first {
            self.begin_token();
        }
        if let Some(frame) = popped {
            if let Some(family) = frame.condition {
                self.push_embedded_family(family);
            }
        }
        self.last_significant = ')';
    }

    /// A statement keyword starting a line while an aligned chain of the
    /// same family is open joins the chain: its line moves back to the
    /// chain's level.
    fn align_chained_embedded(&mut self, family: EmbeddedKind) {
        let policy = match family {
            EmbeddedKind::If => self.config.align_embedded_if_statements,
            EmbeddedKind::Using => self.config.align_embedded_using_statements,
            EmbeddedKind::Other => false,
        };
        if !policy {
            return;
        }
        if let Some(top) = self.frames.top() {
            if top.kind == FrameKind::EmbeddedStatement && top.family == Some(family) {
                let indent = top.opening_indent().to_string();
                self.set_this_line(indent);
            }
        }
    }

    fn push_embedded_family(&mut self, family: EmbeddedKind) {
        let collapse_policy = match family {
            EmbeddedKind::If => self.config.align_embedded_if_statements,
            EmbeddedKind::Using => self.config.align_embedded_using_statements,
            EmbeddedKind::Other => false,
        };
        let collapsed = collapse_policy && self.frames.top_embedded_family() == Some(family);
        self.frames
            .push_embedded(family, collapsed, self.line, &self.config.indent_string);
    }

    fn open_bracket(&mut self, first: bool) {
        let kind = if first {
            FrameKind::Attribute
        } else {
            FrameKind::Bracket
        };
        let opening_indent = self.this_line_indent();
        self.frames.push_bracket(
            kind,
            &opening_indent,
            self.line,
            &self.config.indent_string,
            None,
        );
        self.last_significant = '[';
    }

    fn close_bracket(&mut self, first: bool) {
        self.frames.pop_continuations();
        self.frames
            .pop_matched(&[FrameKind::Bracket, FrameKind::Attribute]);
        if first {
            self.begin_token();
        }
        self.last_significant = ']';
    }

    fn end_statement(&mut self) {
        self.frames.pop_continuations();
        self.frames.pop_embedded_chain();
        self.statement_keyword = None;
        self.pending_condition = None;
        self.pending_case = false;
        self.last_significant = ';';
    }

    fn begin_line_comment(&mut self) {
        self.last_significant = self.sig_before_slash;
        self.pin_comment_to_first_column();
        self.state = LexState::LineComment;
    }

    fn begin_block_comment(&mut self) {
        self.last_significant = self.sig_before_slash;
        self.pin_comment_to_first_column();
        self.comment_indent = self
            .this_line
            .clone()
            .unwrap_or_else(|| self.frames.indent().to_string());
        self.comment_len = 0;
        self.state = LexState::BlockComment;
    }

    fn pin_comment_to_first_column(&mut self) {
        if self.slash_line_first
            && self.config.keep_comments_at_first_column
            && self.current_indent.is_empty()
        {
            self.set_this_line(String::new());
        }
    }

    fn push_line_comment(&mut self, ch: char) {
        if ch == '\n' {
            self.state = LexState::Code;
            self.end_line(true);
        }
    }

    fn push_block_comment(&mut self, ch: char) {
        if ch == '\n' {
            self.end_line(false);
            self.state = LexState::BlockCommentContinuation;
            return;
        }
        if ch.is_whitespace() {
            if !self.line_has_token {
                self.current_indent.push(ch);
            }
            self.comment_len += 1;
            return;
        }
        if !self.line_has_token {
            self.line_has_token = true;
            let indent = format!("{} ", self.comment_indent);
            self.set_this_line(indent);
        }
        if ch == '/' && self.previous == '*' && self.comment_len >= 1 {
            self.state = LexState::Code;
            self.slash_armed = false;
        }
        self.comment_len += 1;
    }

    fn push_string(&mut self, ch: char) {
        if ch == '\n' {
            // Unterminated literal, resume as code on the next line
            trace!(line = self.line, "string literal recovered at end of line");
            self.escaped = false;
            self.state = LexState::Code;
            self.end_line(true);
            return;
        }
        if self.escaped {
            self.escaped = false;
            return;
        }
        match ch {
            '\\' => self.escaped = true,
            '"' => self.state = LexState::Code,
            _ => {}
        }
    }

    fn push_char_literal(&mut self, ch: char) {
        if ch == '\n' {
            trace!(line = self.line, "character literal recovered at end of line");
            self.escaped = false;
            self.state = LexState::Code;
            self.end_line(true);
            return;
        }
        if self.escaped {
            self.escaped = false;
            return;
        }
        match ch {
            '\\' => self.escaped = true,
            '\'' => self.state = LexState::Code,
            _ => {}
        }
    }

    fn push_verbatim(&mut self, ch: char) {
        match ch {
            '"' => self.state = LexState::VerbatimStringQuoteEscape,
            '\n' => self.end_line(false),
            _ => {}
        }
    }

    fn push_verbatim_escape(&mut self, ch: char) {
        if ch == '"' {
            // Doubled quote, still inside the literal
            self.state = LexState::VerbatimStringLiteral;
        } else {
            // The previous quote closed the literal
            self.state = LexState::Code;
            self.push_code(ch);
        }
    }

    fn push_preprocessor(&mut self, ch: char) {
        if ch == '\n' {
            self.flush_directive();
            self.state = LexState::Code;
            self.end_line(false);
            return;
        }
        if self.directive_done {
            return;
        }
        if ch.is_ascii_alphabetic() {
            self.word.push(ch);
        } else if !self.word.is_empty() {
            self.flush_directive();
        }
    }

    fn flush_directive(&mut self) {
        if !self.word.is_empty() {
            let word = std::mem::take(&mut self.word);
            self.directives.on_directive(&word);
            self.directive_done = true;
        }
    }

    fn end_line(&mut self, check_continuation: bool) {
        if check_continuation
            && self.line_has_token
            && scan::is_continuation_op(self.last_significant)
            && !matches!(
                self.frames.top_kind(),
                Some(
                    FrameKind::Parenthesis
                        | FrameKind::Bracket
                        | FrameKind::Attribute
                        | FrameKind::Continuation
                )
            )
        {
            self.frames
                .push_continuation(self.line, &self.config.indent_string);
        }
        self.current_indent.clear();
        self.this_line = None;
        self.needs_reindent = false;
        self.line_has_token = false;
        self.word_line_first = false;
        self.slash_armed = false;
        self.last_significant = '\0';
        self.line_began_inside = self.state.is_verbatim();
    }
}

impl Default for IndentEngine {
    fn default() -> Self {
        Self::new(IndentConfig::default())
    }
}
