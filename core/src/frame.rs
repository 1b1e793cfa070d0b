//! The indentation stack.
//!
//! Every open construct contributes one frame. A frame carries the full
//! indent prescribed for lines inside it, so the current indent is always
//! the top frame's string and popping restores the enclosing level without
//! recomputation. Close tokens pop only a matching frame; a mismatched
//! close is a no-op and the stack below it stays intact.

/// What kind of construct opened a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    Block,
    Bracket,
    Parenthesis,
    ArrayInitializer,
    SwitchCase,
    TypeMember,
    Namespace,
    EmbeddedStatement,
    Continuation,
    Attribute,
}

/// Family of a braceless embedded statement, used to decide whether a
/// chained statement shares the level of the one above it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddedKind {
    If,
    Using,
    Other,
}

#[derive(Debug, Clone)]
pub struct IndentFrame {
    pub kind: FrameKind,
    /// Indent prescribed for lines inside this frame.
    indent: String,
    /// Prescribed indent of the line that opened the frame.
    opening_indent: String,
    opening_line: u32,
    /// Column of the first token after the open delimiter, when argument
    /// alignment resolved to a column.
    pub align_column: Option<u32>,
    content_seen: bool,
    /// Keyword family whose condition this paren closes, for frames opened
    /// by `if (`, `while (` and friends.
    pub condition: Option<EmbeddedKind>,
    pub is_switch: bool,
    /// True when this embedded frame shares the level of the frame below.
    pub collapsed: bool,
    pub family: Option<EmbeddedKind>,
}

impl IndentFrame {
    pub fn indent(&self) -> &str {
        &self.indent
    }

    /// Indent of the line (or chain of statements) that opened the frame.
    pub fn opening_indent(&self) -> &str {
        &self.opening_indent
    }
}

#[derive(Debug, Clone, Default)]
pub struct FrameStack {
    frames: Vec<IndentFrame>,
}

impl FrameStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Indent prescribed for lines inside the innermost open construct.
    pub fn indent(&self) -> &str {
        self.frames.last().map(|f| f.indent.as_str()).unwrap_or("")
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn top(&self) -> Option<&IndentFrame> {
        self.frames.last()
    }

    pub fn top_kind(&self) -> Option<FrameKind> {
        self.frames.last().map(|f| f.kind)
    }

    pub fn top_is(&self, kind: FrameKind) -> bool {
        self.top_kind() == Some(kind)
    }

    pub fn top_embedded_family(&self) -> Option<EmbeddedKind> {
        match self.frames.last() {
            Some(f) if f.kind == FrameKind::EmbeddedStatement => f.family,
            _ => None,
        }
    }

    /// True inside a `switch` body, whether or not a case section is open.
    pub fn in_switch(&self) -> bool {
        match self.frames.last() {
            Some(f) if f.kind == FrameKind::SwitchCase => true,
            Some(f) if f.kind == FrameKind::Block => f.is_switch,
            _ => false,
        }
    }

    fn push(&mut self, frame: IndentFrame) {
        self.frames.push(frame);
    }

    /// Push a brace-style frame indenting one unit past the current level.
    pub fn push_unit(&mut self, kind: FrameKind, opening_line: u32, unit: &str, is_switch: bool) {
        let opening_indent = self.indent().to_string();
        let indent = format!("{opening_indent}{unit}");
        self.push(IndentFrame {
            kind,
            indent,
            opening_indent,
            opening_line,
            align_column: None,
            content_seen: false,
            condition: None,
            is_switch,
            collapsed: false,
            family: None,
        });
    }

    /// Push a paren/bracket/attribute frame. Until content shows up on the
    /// opening line the frame indents one unit relative to the statement:
    /// nesting another bracket inside an open one adds nothing.
    pub fn push_bracket(
        &mut self,
        kind: FrameKind,
        opening_indent: &str,
        opening_line: u32,
        unit: &str,
        condition: Option<EmbeddedKind>,
    ) {
        let nested = matches!(
            self.top_kind(),
            Some(FrameKind::Parenthesis | FrameKind::Bracket)
        );
        let indent = if nested && kind != FrameKind::Attribute {
            self.indent().to_string()
        } else {
            format!("{}{unit}", self.indent())
        };
        self.push(IndentFrame {
            kind,
            indent,
            opening_indent: opening_indent.to_string(),
            opening_line,
            align_column: None,
            content_seen: false,
            condition,
            is_switch: false,
            collapsed: false,
            family: None,
        });
    }

    pub fn push_embedded(
        &mut self,
        family: EmbeddedKind,
        collapsed: bool,
        opening_line: u32,
        unit: &str,
    ) {
        // A collapsed frame shares the level of the chain it joins, so it
        // inherits the chain's opening indent instead of its own line's.
        let (opening_indent, indent) = match (collapsed, self.frames.last()) {
            (true, Some(top)) => (top.opening_indent.clone(), self.indent().to_string()),
            _ => {
                let opening = self.indent().to_string();
                let indent = format!("{opening}{unit}");
                (opening, indent)
            }
        };
        self.push(IndentFrame {
            kind: FrameKind::EmbeddedStatement,
            indent,
            opening_indent,
            opening_line,
            align_column: None,
            content_seen: false,
            condition: None,
            is_switch: false,
            collapsed,
            family: Some(family),
        });
    }

    pub fn push_continuation(&mut self, opening_line: u32, unit: &str) {
        self.push_unit(FrameKind::Continuation, opening_line, unit, false);
    }

    pub fn push_switch_case(&mut self, opening_line: u32, unit: &str) {
        self.push_unit(FrameKind::SwitchCase, opening_line, unit, false);
    }

    /// First token after an open delimiter. When it lands on the opening
    /// line and column alignment is enabled for the frame's kind, lines
    /// inside the frame align under it from now on. A delimiter that ends
    /// its line keeps the unit indent: there is no column to align to.
    pub fn note_content(&mut self, line: u32, column: u32, align_calls: bool, align_indexers: bool) {
        let Some(top) = self.frames.last_mut() else {
            return;
        };
        if top.content_seen {
            return;
        }
        let align = match top.kind {
            FrameKind::Parenthesis => align_calls,
            FrameKind::Bracket => align_indexers,
            _ => return,
        };
        top.content_seen = true;
        if align && line == top.opening_line {
            top.align_column = Some(column);
            top.indent = pad_to_column(&top.opening_indent, column);
        }
    }

    /// Pop the top frame when its kind is one of `kinds`, otherwise leave
    /// the stack untouched.
    pub fn pop_matched(&mut self, kinds: &[FrameKind]) -> Option<IndentFrame> {
        match self.frames.last() {
            Some(top) if kinds.contains(&top.kind) => self.frames.pop(),
            _ => None,
        }
    }

    /// Drop any continuation frames sitting on top of the stack.
    pub fn pop_continuations(&mut self) {
        while self.top_is(FrameKind::Continuation) {
            self.frames.pop();
        }
    }

    /// Pop one embedded-statement frame, plus the collapsed run beneath it
    /// so a shared-level chain unwinds as a unit.
    pub fn pop_embedded_chain(&mut self) {
        while self.top_is(FrameKind::EmbeddedStatement) {
            let Some(frame) = self.frames.pop() else {
                break;
            };
            if !frame.collapsed {
                break;
            }
        }
    }
}

/// Pad `opening_indent` with spaces until its character count reaches the
/// 1-based `column`, so the next line's first character sits under it.
fn pad_to_column(opening_indent: &str, column: u32) -> String {
    let target = column.saturating_sub(1) as usize;
    let have = opening_indent.chars().count();
    let mut out = opening_indent.to_string();
    for _ in have..target {
        out.push(' ');
    }
    out
}
