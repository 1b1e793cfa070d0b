//! Checkpoint and replay layer.
//!
//! Wraps an engine so indentation can be queried at arbitrary offsets
//! without rescanning the document from the start every time. Snapshots
//! are taken at line starts while advancing; a query behind the current
//! position restores the nearest checkpoint at or before the target and
//! replays forward from there. Replay never runs backward and produces
//! state identical to a cold run from offset zero.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::config::IndentConfig;
use crate::engine::IndentEngine;
use crate::pos::Position;
use crate::scan::LexState;

const CHECKPOINT_INTERVAL: u32 = 8;
const MAX_CHECKPOINTS: usize = 256;

#[derive(Debug, Clone)]
pub struct CachedIndentEngine {
    engine: IndentEngine,
    /// Engine snapshots ordered by offset.
    checkpoints: Vec<IndentEngine>,
    interval: u32,
    next_checkpoint_line: u32,
}

impl CachedIndentEngine {
    pub fn new(config: IndentConfig) -> Self {
        Self::with_shared_config(Arc::new(config))
    }

    pub fn with_shared_config(config: Arc<IndentConfig>) -> Self {
        Self {
            engine: IndentEngine::with_shared_config(config),
            checkpoints: Vec::new(),
            interval: CHECKPOINT_INTERVAL,
            next_checkpoint_line: CHECKPOINT_INTERVAL,
        }
    }

    /// The engine positioned at the offset of the last `update`.
    pub fn engine(&self) -> &IndentEngine {
        &self.engine
    }

    /// Bring the engine to `offset`, a character offset into `doc`.
    ///
    /// `doc` must be the same document across calls; after an edit, call
    /// [`reset`](Self::reset) first. Offsets past the end of the document
    /// stop at the end.
    pub fn update(&mut self, doc: &str, offset: usize) {
        if self.engine.byte_offset() > doc.len() {
            // The document shrank under us, start over
            self.reset();
        }
        if offset < self.engine.offset() {
            self.restore(offset);
        }
        let mut chars = doc[self.engine.byte_offset()..].chars();
        while self.engine.offset() < offset {
            let Some(ch) = chars.next() else { break };
            self.engine.push(ch);
            if ch == '\n' {
                self.maybe_checkpoint();
            }
        }
    }

    /// Drop every checkpoint and return the engine to offset zero.
    pub fn reset(&mut self) {
        self.engine.reset();
        self.checkpoints.clear();
        self.interval = CHECKPOINT_INTERVAL;
        self.next_checkpoint_line = CHECKPOINT_INTERVAL;
    }

    fn restore(&mut self, offset: usize) {
        let idx = self.checkpoints.partition_point(|e| e.offset() <= offset);
        if idx == 0 {
            debug!(target_offset = offset, "no checkpoint before target, cold restart");
            self.engine.reset();
        } else {
            let snapshot = self.checkpoints[idx - 1].clone();
            debug!(
                target_offset = offset,
                checkpoint_offset = snapshot.offset(),
                "restored checkpoint"
            );
            self.engine = snapshot;
        }
    }

    fn maybe_checkpoint(&mut self) {
        if self.engine.location().line < self.next_checkpoint_line {
            return;
        }
        // Replaying over an already-covered region must not duplicate entries
        if self
            .checkpoints
            .last()
            .is_some_and(|c| c.offset() >= self.engine.offset())
        {
            return;
        }
        if self.checkpoints.len() >= MAX_CHECKPOINTS {
            let mut keep = false;
            self.checkpoints.retain(|_| {
                keep = !keep;
                keep
            });
            self.interval *= 2;
            trace!(interval = self.interval, "checkpoint history thinned");
        }
        trace!(offset = self.engine.offset(), "checkpoint taken");
        self.checkpoints.push(self.engine.clone());
        self.next_checkpoint_line = self.engine.location().line + self.interval;
    }

    pub fn checkpoint_count(&self) -> usize {
        self.checkpoints.len()
    }

    pub fn this_line_indent(&self) -> String {
        self.engine.this_line_indent()
    }

    pub fn next_line_indent(&self) -> String {
        self.engine.next_line_indent()
    }

    pub fn current_indent(&self) -> &str {
        self.engine.current_indent()
    }

    pub fn needs_reindent(&self) -> bool {
        self.engine.needs_reindent()
    }

    pub fn location(&self) -> Position {
        self.engine.location()
    }

    pub fn offset(&self) -> usize {
        self.engine.offset()
    }

    pub fn state(&self) -> LexState {
        self.engine.state()
    }

    pub fn config(&self) -> &IndentConfig {
        self.engine.config()
    }
}
