//! Function definition lowering
//!
//! Each definition opens with `define dso_local … {` and an `entry:`
//! block. Parameters arrive as `%name.param` SSA values and are promoted
//! to memory immediately so the body can treat them like any local
//! variable. If the body falls off the end without a terminator, a
//! fallback `ret` closes the final block.

use super::error::CodeGenError;
use super::state::CodeGen;
use crate::ast::{FuncDef, FuncRetType};
use crate::symtab::Symbol;
use crate::types::Type;
use std::fmt::Write as _;

impl CodeGen {
    pub(super) fn lower_func_def(&mut self, func: &FuncDef) -> Result<(), CodeGenError> {
        let ret_ty = match func.ret {
            FuncRetType::Int => Type::Int,
            FuncRetType::Void => Type::Void,
        };

        // Register the signature first so the body (and later functions)
        // can call it, recursively or otherwise
        let signature = Type::function(ret_ty.clone(), vec![Type::Int; func.params.len()]);
        let declared = self.symbols.declare(
            Symbol::new(&func.name, signature).with_ir_name(format!("@{}", func.name)),
        );
        if !declared {
            eprintln!(
                "line {}: duplicate declaration of '{}'",
                func.line + 1,
                func.name
            );
            return Ok(());
        }

        write!(self.ir.body(), "define dso_local {} @{}(", ret_ty, func.name)?;
        for (i, param) in func.params.iter().enumerate() {
            if i > 0 {
                write!(self.ir.body(), ", ")?;
            }
            write!(self.ir.body(), "i32 %{}.param", param.name)?;
        }
        writeln!(self.ir.body(), ") {{")?;
        writeln!(self.ir.body(), "entry:")?;
        self.block_terminated = false;

        self.symbols.enter();
        for param in &func.params {
            let addr = self.ir.fresh_temp();
            writeln!(self.ir.body(), "  {} = alloca i32", addr)?;
            writeln!(
                self.ir.body(),
                "  store i32 %{}.param, i32* {}",
                param.name, addr
            )?;
            self.symbols
                .declare(Symbol::new(&param.name, Type::Int).with_ir_name(addr));
        }

        self.lower_block(&func.body)?;

        // Fallback terminator for a body that falls off the end
        if !self.block_terminated {
            match func.ret {
                FuncRetType::Void => self.ret_void()?,
                FuncRetType::Int => self.ret_int("0")?,
            }
        }
        writeln!(self.ir.body(), "}}")?;
        writeln!(self.ir.body())?;

        self.symbols.exit();
        Ok(())
    }
}
