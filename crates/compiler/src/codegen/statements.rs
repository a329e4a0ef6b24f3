//! Statement lowering
//!
//! Dispatch by statement kind, plus the statements that do not branch:
//! blocks, assignment, expression statements, and return. Control flow
//! lives in `control_flow.rs`, declarations in `decls.rs`.

use super::error::CodeGenError;
use super::state::CodeGen;
use crate::ast::{Block, BlockItem, Expr, LVal, Stmt};
use crate::types::Type;
use std::fmt::Write as _;

impl CodeGen {
    pub(super) fn lower_stmt(&mut self, stmt: &Stmt) -> Result<(), CodeGenError> {
        // Anything after the block's terminator is unreachable
        if self.block_terminated {
            return Ok(());
        }
        match stmt {
            Stmt::Assign { target, value } => self.lower_assign(target, value),
            Stmt::Expr(Some(expr)) => {
                self.lower_expr(expr)?;
                Ok(())
            }
            Stmt::Expr(None) => Ok(()),
            Stmt::Block(block) => self.lower_block(block),
            Stmt::If {
                cond,
                then_branch,
                else_branch,
            } => self.lower_if(cond, then_branch, else_branch.as_deref()),
            Stmt::While { cond, body } => self.lower_while(cond, body),
            Stmt::Break => self.lower_break(),
            Stmt::Continue => self.lower_continue(),
            Stmt::Return(expr) => self.lower_return(expr.as_ref()),
        }
    }

    pub(super) fn lower_block(&mut self, block: &Block) -> Result<(), CodeGenError> {
        self.symbols.enter();
        for item in &block.items {
            if self.block_terminated {
                break;
            }
            match item {
                BlockItem::Decl(decl) => self.lower_decl(decl)?,
                BlockItem::Stmt(stmt) => self.lower_stmt(stmt)?,
            }
        }
        self.symbols.exit();
        Ok(())
    }

    fn lower_assign(&mut self, target: &LVal, value: &Expr) -> Result<(), CodeGenError> {
        let Some(symbol) = self.symbols.lookup(&target.name).cloned() else {
            eprintln!(
                "line {}: undefined variable '{}'",
                target.line + 1,
                target.name
            );
            return Ok(());
        };
        if symbol.is_const {
            eprintln!(
                "line {}: cannot assign to constant '{}'",
                target.line + 1,
                target.name
            );
            return Ok(());
        }

        let value = self.lower_expr(value)?;

        let addr = match &symbol.ty {
            Type::Int if target.indices.is_empty() => symbol.ir_name.clone(),
            Type::Array { dims, .. } if target.indices.len() == dims.len() => {
                let mut operands = Vec::with_capacity(dims.len());
                for index in &target.indices {
                    operands.push(self.lower_expr(index)?.operand);
                }
                self.emit_element_ptr(&symbol, &operands)?
            }
            _ => {
                eprintln!(
                    "line {}: '{}' is not assignable here",
                    target.line + 1,
                    target.name
                );
                return Ok(());
            }
        };

        writeln!(
            self.ir.body(),
            "  store i32 {}, i32* {}",
            value.operand, addr
        )?;
        Ok(())
    }

    fn lower_return(&mut self, expr: Option<&Expr>) -> Result<(), CodeGenError> {
        match expr {
            Some(expr) => {
                let value = self.lower_expr(expr)?;
                self.ret_int(&value.operand)
            }
            None => self.ret_void(),
        }
    }
}
