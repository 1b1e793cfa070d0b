//! Structural tracking of preprocessor conditionals.
//!
//! `#if` blocks nest; `#elif` and `#else` stay at the nesting level their
//! `#if` opened. Conditional expressions are never evaluated, so every
//! branch is treated as live and the enclosed source is scanned normally.
//! Directive words outside the conditional family (`region`, `pragma`,
//! anything unrecognized) are counted as generic markers.

#[derive(Debug, Clone, Default)]
pub struct DirectiveTracker {
    /// One entry per open `#if`; the flag records whether the position is
    /// still in the branch the `#if` opened (flipped by `#elif`/`#else`).
    branches: Vec<bool>,
    markers: usize,
}

impl DirectiveTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the directive word of a completed `#` line.
    pub fn on_directive(&mut self, word: &str) {
        match word {
            "if" => self.branches.push(true),
            "elif" | "else" => {
                if let Some(top) = self.branches.last_mut() {
                    *top = false;
                }
            }
            "endif" => {
                // A stray endif is tolerated
                self.branches.pop();
            }
            _ => self.markers += 1,
        }
    }

    /// Open `#if` nesting depth.
    pub fn depth(&self) -> usize {
        self.branches.len()
    }

    pub fn in_conditional(&self) -> bool {
        !self.branches.is_empty()
    }

    /// Branches are never evaluated, so scanned source is always live.
    pub fn is_live(&self) -> bool {
        true
    }

    /// Count of non-conditional directives seen so far.
    pub fn markers(&self) -> usize {
        self.markers
    }
}
