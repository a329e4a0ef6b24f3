//! Declaration lowering
//!
//! Constant and variable definitions in both scopes. Globals become
//! header lines (`dso_local constant` / `dso_local global`) with nested
//! aggregate initializers; locals become `alloca`s, with array elements
//! stored slot-by-slot through `getelementptr`. Local constants get no
//! storage at all; reads substitute their folded values inline.
//!
//! Dimension expressions and constant initializers fold through the
//! evaluator in `consteval.rs`; a global initializer that does not fold
//! contributes 0 (partial evaluation), while a local one is lowered and
//! stored like any runtime expression.

use super::consteval::flatten_init;
use super::error::CodeGenError;
use super::state::CodeGen;
use crate::ast::{Decl, Expr, InitVal, VarDef};
use crate::symtab::Symbol;
use crate::types::Type;
use std::fmt::Write as _;

impl CodeGen {
    pub(super) fn lower_decl(&mut self, decl: &Decl) -> Result<(), CodeGenError> {
        for def in &decl.defs {
            if self.symbols.lookup_top(&def.name).is_some() {
                eprintln!(
                    "line {}: duplicate declaration of '{}'",
                    def.line + 1,
                    def.name
                );
                continue;
            }
            if decl.is_const {
                self.lower_const_def(def)?;
            } else {
                self.lower_var_def(def)?;
            }
        }
        Ok(())
    }

    /// Fold the bracketed dimension expressions of a definition.
    fn eval_dims(&self, dims: &[Expr]) -> Vec<i32> {
        dims.iter()
            .map(|expr| self.eval_const_expr(expr).unwrap_or(0))
            .collect()
    }

    fn lower_const_def(&mut self, def: &VarDef) -> Result<(), CodeGenError> {
        let dims = self.eval_dims(&def.dims);

        if dims.is_empty() {
            let value = match &def.init {
                Some(InitVal::Expr(expr)) => self.eval_const_expr(expr).unwrap_or(0),
                _ => 0,
            };
            let mut symbol = Symbol::const_scalar(&def.name, value);
            if self.symbols.is_global() {
                let global = format!("@{}", def.name);
                writeln!(
                    self.ir.header(),
                    "{} = dso_local constant i32 {}",
                    global, value
                )?;
                symbol.ir_name = global;
            }
            self.symbols.declare(symbol);
        } else {
            let ty = Type::array(dims.clone());
            let values = match &def.init {
                Some(init) => self.fold_init_slots(init, &dims),
                None => vec![0; ty.total_elems()],
            };
            let mut symbol = Symbol::const_array(&def.name, ty.clone(), values);
            if self.symbols.is_global() {
                let global = format!("@{}", def.name);
                let init = render_array_init(&symbol.array_consts, &dims);
                writeln!(
                    self.ir.header(),
                    "{} = dso_local constant {} {}",
                    global, ty, init
                )?;
                symbol.ir_name = global;
            }
            self.symbols.declare(symbol);
        }
        Ok(())
    }

    fn lower_var_def(&mut self, def: &VarDef) -> Result<(), CodeGenError> {
        let dims = self.eval_dims(&def.dims);
        let ty = if dims.is_empty() {
            Type::Int
        } else {
            Type::array(dims.clone())
        };

        if self.symbols.is_global() {
            let global = format!("@{}", def.name);
            if dims.is_empty() {
                let value = match &def.init {
                    Some(InitVal::Expr(expr)) => self.eval_const_expr(expr).unwrap_or(0),
                    _ => 0,
                };
                writeln!(self.ir.header(), "{} = dso_local global i32 {}", global, value)?;
            } else {
                match &def.init {
                    Some(init) => {
                        let values = self.fold_init_slots(init, &dims);
                        let init = render_array_init(&values, &dims);
                        writeln!(
                            self.ir.header(),
                            "{} = dso_local global {} {}",
                            global, ty, init
                        )?;
                    }
                    None => {
                        writeln!(
                            self.ir.header(),
                            "{} = dso_local global {} zeroinitializer",
                            global, ty
                        )?;
                    }
                }
            }
            self.symbols.declare(Symbol::new(&def.name, ty).with_ir_name(global));
            return Ok(());
        }

        // Local scope: stack storage, addressed by the alloca temporary
        let addr = self.ir.fresh_temp();
        let symbol = Symbol::new(&def.name, ty.clone()).with_ir_name(addr.clone());
        self.symbols.declare(symbol.clone());

        if dims.is_empty() {
            writeln!(self.ir.body(), "  {} = alloca i32", addr)?;
            if let Some(InitVal::Expr(expr)) = &def.init {
                let value = self.lower_expr(expr)?;
                writeln!(
                    self.ir.body(),
                    "  store i32 {}, i32* {}",
                    value.operand, addr
                )?;
            }
        } else {
            writeln!(self.ir.body(), "  {} = alloca {}", addr, ty)?;
            if let Some(init) = &def.init {
                let slots = flatten_init(init, &dims);
                for (flat, slot) in slots.iter().enumerate() {
                    let operand = match slot {
                        None => "0".to_string(),
                        Some(expr) => match self.eval_const_expr(expr) {
                            Some(value) => value.to_string(),
                            None => self.lower_expr(expr)?.operand,
                        },
                    };
                    let indices = flat_to_indices(flat, &dims);
                    let ptr = self.emit_element_ptr(&symbol, &indices)?;
                    writeln!(self.ir.body(), "  store i32 {}, i32* {}", operand, ptr)?;
                }
            }
        }
        Ok(())
    }

    /// Flatten an initializer and fold every slot, non-folding slots
    /// contributing 0. Used for constant definitions and for the partial
    /// evaluation of global variable initializers.
    fn fold_init_slots(&self, init: &InitVal, dims: &[i32]) -> Vec<i32> {
        flatten_init(init, dims)
            .iter()
            .map(|slot| slot.and_then(|expr| self.eval_const_expr(expr)).unwrap_or(0))
            .collect()
    }
}

/// Render a flattened value vector as a nested aggregate initializer,
/// e.g. `[[3 x i32] [i32 1, i32 2, i32 3], [3 x i32] [i32 4, i32 0, i32 0]]`.
pub(super) fn render_array_init(values: &[i32], dims: &[i32]) -> String {
    let mut out = String::new();
    let mut index = 0;
    render_region(values, dims, 0, &mut index, &mut out);
    out
}

fn render_region(values: &[i32], dims: &[i32], depth: usize, index: &mut usize, out: &mut String) {
    out.push('[');
    if depth == dims.len() - 1 {
        for i in 0..dims[depth] {
            if i > 0 {
                out.push_str(", ");
            }
            out.push_str(&format!("i32 {}", values[*index]));
            *index += 1;
        }
    } else {
        let subtype = Type::array(dims[depth + 1..].to_vec());
        for i in 0..dims[depth] {
            if i > 0 {
                out.push_str(", ");
            }
            out.push_str(&format!("{} ", subtype));
            render_region(values, dims, depth + 1, index, out);
        }
    }
    out.push(']');
}

/// Decompose a row-major flat index into one operand per dimension.
pub(super) fn flat_to_indices(flat: usize, dims: &[i32]) -> Vec<String> {
    let mut indices = Vec::with_capacity(dims.len());
    let mut rest = flat;
    for i in 0..dims.len() {
        let stride: usize = dims[i + 1..].iter().map(|&d| d as usize).product();
        indices.push((rest / stride).to_string());
        rest %= stride;
    }
    indices
}
