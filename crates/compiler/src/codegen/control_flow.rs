//! Control-flow lowering
//!
//! If/else and while over fresh numbered labels. The emitted form uses
//! memory operations rather than phi nodes, so joining branches is just a
//! matter of branching to a shared label. While bodies run with their
//! end/cond labels pushed on the break/continue stacks; `break` and
//! `continue` outside any loop are silently ignored.

use super::error::CodeGenError;
use super::state::CodeGen;
use crate::ast::{Expr, Stmt};
use std::fmt::Write as _;

impl CodeGen {
    /// Normalize a condition value to `i1` with `icmp ne …, 0`.
    fn lower_condition(&mut self, cond: &Expr) -> Result<String, CodeGenError> {
        let value = self.lower_expr(cond)?;
        let cond_bool = self.ir.fresh_temp();
        writeln!(
            self.ir.body(),
            "  {} = icmp ne i32 {}, 0",
            cond_bool, value.operand
        )?;
        Ok(cond_bool)
    }

    pub(super) fn lower_if(
        &mut self,
        cond: &Expr,
        then_branch: &Stmt,
        else_branch: Option<&Stmt>,
    ) -> Result<(), CodeGenError> {
        let then_label = self.ir.fresh_label();
        let else_label = else_branch.map(|_| self.ir.fresh_label());
        let end_label = self.ir.fresh_label();

        let cond_bool = self.lower_condition(cond)?;
        self.branch_cond(&cond_bool, then_label, else_label.unwrap_or(end_label))?;

        self.place_label(then_label);
        self.lower_stmt(then_branch)?;
        self.branch(end_label)?;

        if let (Some(else_label), Some(else_branch)) = (else_label, else_branch) {
            self.place_label(else_label);
            self.lower_stmt(else_branch)?;
            self.branch(end_label)?;
        }

        self.place_label(end_label);
        Ok(())
    }

    pub(super) fn lower_while(&mut self, cond: &Expr, body: &Stmt) -> Result<(), CodeGenError> {
        let cond_label = self.ir.fresh_label();
        let body_label = self.ir.fresh_label();
        let end_label = self.ir.fresh_label();

        self.branch(cond_label)?;
        self.place_label(cond_label);
        let cond_bool = self.lower_condition(cond)?;
        self.branch_cond(&cond_bool, body_label, end_label)?;

        self.place_label(body_label);
        self.ir.push_break_label(end_label);
        self.ir.push_continue_label(cond_label);
        self.lower_stmt(body)?;
        self.ir.pop_break_label();
        self.ir.pop_continue_label();
        self.branch(cond_label)?;

        self.place_label(end_label);
        Ok(())
    }

    pub(super) fn lower_break(&mut self) -> Result<(), CodeGenError> {
        if let Some(label) = self.ir.break_target() {
            self.branch(label)?;
        }
        Ok(())
    }

    pub(super) fn lower_continue(&mut self) -> Result<(), CodeGenError> {
        if let Some(label) = self.ir.continue_target() {
            self.branch(label)?;
        }
        Ok(())
    }
}
