//! Lowering state and core types
//!
//! `CodeGen` owns everything one compilation mutates: the scoped symbol
//! table, the two-stream IR sink, and the basic-block bookkeeping that
//! keeps every emitted block terminated exactly once.

use super::emitter::IrEmitter;
use super::error::CodeGenError;
use crate::symtab::SymbolTable;
use crate::types::Type;
use std::fmt::Write as _;

/// The result of lowering one expression.
///
/// `operand` is either a decimal literal or an SSA temporary name. When
/// `constant` is set the value folded at compile time, no IR was emitted
/// for it, and `operand` is the decimal rendering of the folded value.
/// Values are ephemeral; they never outlive the lowering call that
/// produced them.
#[derive(Debug, Clone)]
pub struct Value {
    pub operand: String,
    pub ty: Type,
    pub constant: Option<i32>,
}

impl Value {
    /// A folded compile-time constant.
    pub fn constant(value: i32) -> Self {
        Value {
            operand: value.to_string(),
            ty: Type::Int,
            constant: Some(value),
        }
    }

    /// A runtime value held in an SSA temporary.
    pub fn temp(operand: impl Into<String>, ty: Type) -> Self {
        Value {
            operand: operand.into(),
            ty,
            constant: None,
        }
    }

    /// Sentinel for unresolved names and void calls. Renders as `0` so any
    /// downstream use still produces well-formed IR.
    pub fn sentinel() -> Self {
        Value {
            operand: "0".to_string(),
            ty: Type::Int,
            constant: None,
        }
    }

    pub fn is_const(&self) -> bool {
        self.constant.is_some()
    }
}

/// The IR-lowering engine.
///
/// Create one per compilation unit; all state is mutated linearly by the
/// single lowering pass and rendered with [`CodeGen::generate`].
pub struct CodeGen {
    pub(super) symbols: SymbolTable,
    pub(super) ir: IrEmitter,
    /// True once the current basic block has received its terminator.
    /// Cleared when a label opens the next block.
    pub(super) block_terminated: bool,
    /// Set after a compilation unit has been lowered; the counters and
    /// scopes are then stale until `reset`.
    pub(super) consumed: bool,
}

impl CodeGen {
    pub fn new() -> Self {
        let mut codegen = CodeGen {
            symbols: SymbolTable::new(),
            ir: IrEmitter::new(),
            block_terminated: false,
            consumed: false,
        };
        codegen.install_sylib();
        codegen
    }

    /// Emit `labelK:` and open a fresh block.
    pub(super) fn place_label(&mut self, label: usize) {
        self.ir.emit_label(label);
        self.block_terminated = false;
    }

    /// Unconditional branch; terminates the current block. A no-op when
    /// the block already ended (unreachable join edges).
    pub(super) fn branch(&mut self, label: usize) -> Result<(), CodeGenError> {
        if self.block_terminated {
            return Ok(());
        }
        writeln!(self.ir.body(), "  br label %label{}", label)?;
        self.block_terminated = true;
        Ok(())
    }

    /// Conditional branch; terminates the current block.
    pub(super) fn branch_cond(
        &mut self,
        cond: &str,
        then_label: usize,
        else_label: usize,
    ) -> Result<(), CodeGenError> {
        writeln!(
            self.ir.body(),
            "  br i1 {}, label %label{}, label %label{}",
            cond, then_label, else_label
        )?;
        self.block_terminated = true;
        Ok(())
    }

    /// `ret void`; terminates the current block.
    pub(super) fn ret_void(&mut self) -> Result<(), CodeGenError> {
        writeln!(self.ir.body(), "  ret void")?;
        self.block_terminated = true;
        Ok(())
    }

    /// `ret i32 <operand>`; terminates the current block.
    pub(super) fn ret_int(&mut self, operand: &str) -> Result<(), CodeGenError> {
        writeln!(self.ir.body(), "  ret i32 {}", operand)?;
        self.block_terminated = true;
        Ok(())
    }
}

impl Default for CodeGen {
    fn default() -> Self {
        Self::new()
    }
}
