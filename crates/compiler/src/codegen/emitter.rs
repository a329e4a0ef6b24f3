//! IR sink
//!
//! An append-only two-stream emitter: the header stream collects external
//! declarations and global definitions, the body stream collects function
//! definitions. Keeping the streams separate guarantees that every
//! `declare` and global line precedes the first `define` in the final
//! output regardless of traversal order.
//!
//! The sink also owns the counters for fresh SSA temporaries (`%tK`) and
//! block labels (`labelK`), and the stacks of break/continue targets for
//! the innermost enclosing loops. It never inserts block terminators;
//! callers are responsible for terminating every block exactly once.

use std::fmt::Write as _;

/// Two-stream LLVM text sink with fresh-name counters and loop-target stacks.
pub struct IrEmitter {
    header: String,
    body: String,
    next_temp: usize,
    next_label: usize,
    break_labels: Vec<usize>,
    continue_labels: Vec<usize>,
}

impl IrEmitter {
    pub fn new() -> Self {
        IrEmitter {
            header: String::new(),
            body: String::new(),
            next_temp: 0,
            next_label: 0,
            break_labels: Vec::new(),
            continue_labels: Vec::new(),
        }
    }

    /// Header stream: declarations and global definitions.
    pub fn header(&mut self) -> &mut String {
        &mut self.header
    }

    /// Body stream: function definitions.
    pub fn body(&mut self) -> &mut String {
        &mut self.body
    }

    /// Next fresh temporary, `%t0`, `%t1`, ... Never re-used.
    pub fn fresh_temp(&mut self) -> String {
        let temp = format!("%t{}", self.next_temp);
        self.next_temp += 1;
        temp
    }

    /// Next fresh label number; rendered as `labelK` at use sites.
    pub fn fresh_label(&mut self) -> usize {
        let label = self.next_label;
        self.next_label += 1;
        label
    }

    /// Emit `labelK:` flush-left into the body stream.
    pub fn emit_label(&mut self, label: usize) {
        writeln!(self.body, "label{}:", label).unwrap();
    }

    pub fn push_break_label(&mut self, label: usize) {
        self.break_labels.push(label);
    }

    pub fn pop_break_label(&mut self) {
        self.break_labels.pop();
    }

    /// Innermost enclosing loop's break target, if any.
    pub fn break_target(&self) -> Option<usize> {
        self.break_labels.last().copied()
    }

    pub fn push_continue_label(&mut self, label: usize) {
        self.continue_labels.push(label);
    }

    pub fn pop_continue_label(&mut self) {
        self.continue_labels.pop();
    }

    /// Innermost enclosing loop's continue target, if any.
    pub fn continue_target(&self) -> Option<usize> {
        self.continue_labels.last().copied()
    }

    /// Final output: header, a separating newline, then the body.
    pub fn output(&self) -> String {
        format!("{}\n{}", self.header, self.body)
    }

    /// Zero the buffers, counters, and loop stacks for a fresh compilation.
    pub fn reset(&mut self) {
        self.header.clear();
        self.body.clear();
        self.next_temp = 0;
        self.next_label = 0;
        self.break_labels.clear();
        self.continue_labels.clear();
    }
}

impl Default for IrEmitter {
    fn default() -> Self {
        Self::new()
    }
}
