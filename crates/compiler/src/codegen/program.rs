//! Compilation-unit lowering and final assembly
//!
//! Top-level items lower in source order; the rendered module is the
//! header stream (declarations and globals), one separating newline, and
//! the body stream (function definitions).

use super::error::CodeGenError;
use super::state::CodeGen;
use crate::ast::{CompUnit, Item};

impl CodeGen {
    /// Lower a whole compilation unit and render the LLVM text module.
    ///
    /// The engine is single-use: lowering a second unit through the same
    /// instance would reuse temporary names, so it is refused until
    /// [`CodeGen::reset`].
    pub fn generate(&mut self, unit: &CompUnit) -> Result<String, CodeGenError> {
        if self.consumed {
            return Err(CodeGenError::EngineConsumed);
        }
        self.consumed = true;

        for item in &unit.items {
            match item {
                Item::Decl(decl) => self.lower_decl(decl)?,
                Item::Func(func) => self.lower_func_def(func)?,
            }
        }
        Ok(self.ir.output())
    }

    /// Restore the engine to its freshly-constructed state for another
    /// compilation: buffers and counters zeroed, scopes dropped, sylib
    /// reinstalled.
    pub fn reset(&mut self) {
        self.ir.reset();
        self.symbols = crate::symtab::SymbolTable::new();
        self.block_terminated = false;
        self.consumed = false;
        self.install_sylib();
    }
}
