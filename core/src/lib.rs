//! csindent core library.
//!
//! A streaming indentation engine for C#-family source text. Characters
//! are consumed one at a time; the engine tracks lexical state (strings,
//! comments, preprocessor lines), a stack of indentation frames (braces,
//! brackets, parens, embedded statements, continuations), and answers
//! "what indent does this line get" and "what indent does the next line
//! get" at any position. A checkpoint/replay wrapper makes random-offset
//! queries cheap, and a paste formatter rewrites inserted text to match
//! the surrounding indentation.

pub mod cache;
pub mod config;
pub mod directive;
pub mod engine;
pub mod frame;
pub mod paste;
pub mod pos;
pub mod scan;

pub use cache::CachedIndentEngine;
pub use config::{EmptyLineFormatting, IndentConfig};
pub use directive::DirectiveTracker;
pub use engine::IndentEngine;
pub use frame::{FrameKind, FrameStack, IndentFrame};
pub use paste::format_plain_text;
pub use pos::Position;
pub use scan::LexState;

#[cfg(test)]
mod engine_test;
