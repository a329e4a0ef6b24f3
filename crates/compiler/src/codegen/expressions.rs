//! Expression lowering
//!
//! Every expression lowers to a [`Value`]. The folding rule is uniform:
//! when every operand folded, the result folds and no IR is emitted;
//! otherwise instructions are emitted and the result is a fresh `i32`
//! temporary. Comparison and logical operators materialize their `i1`
//! results through `zext`. Logical `&&`/`||` evaluate both operands:
//! there is no short-circuit, so operand side effects always execute.

use super::consteval::{fold_binary, fold_unary};
use super::error::CodeGenError;
use super::state::{CodeGen, Value};
use crate::ast::{BinaryOp, Expr, LVal, UnaryOp};
use crate::symtab::Symbol;
use crate::types::Type;
use std::fmt::Write as _;

impl CodeGen {
    pub(super) fn lower_expr(&mut self, expr: &Expr) -> Result<Value, CodeGenError> {
        match expr {
            Expr::Number(value) => Ok(Value::constant(*value)),
            Expr::LVal(lval) => self.lower_lval_read(lval),
            Expr::Call { name, args, line } => self.lower_call(name, args, *line),
            Expr::Unary { op, operand } => self.lower_unary(*op, operand),
            Expr::Binary { op, lhs, rhs } => self.lower_binary(*op, lhs, rhs),
        }
    }

    fn lower_unary(&mut self, op: UnaryOp, operand: &Expr) -> Result<Value, CodeGenError> {
        let operand = self.lower_expr(operand)?;

        if let Some(value) = operand.constant {
            return Ok(Value::constant(fold_unary(op, value)));
        }

        match op {
            UnaryOp::Plus => Ok(operand),
            UnaryOp::Neg => {
                let result = self.ir.fresh_temp();
                writeln!(self.ir.body(), "  {} = sub i32 0, {}", result, operand.operand)?;
                Ok(Value::temp(result, Type::Int))
            }
            UnaryOp::Not => {
                let cmp = self.ir.fresh_temp();
                writeln!(
                    self.ir.body(),
                    "  {} = icmp eq i32 {}, 0",
                    cmp, operand.operand
                )?;
                let result = self.ir.fresh_temp();
                writeln!(self.ir.body(), "  {} = zext i1 {} to i32", result, cmp)?;
                Ok(Value::temp(result, Type::Int))
            }
        }
    }

    fn lower_binary(&mut self, op: BinaryOp, lhs: &Expr, rhs: &Expr) -> Result<Value, CodeGenError> {
        let lhs = self.lower_expr(lhs)?;
        let rhs = self.lower_expr(rhs)?;

        // Fold when both sides folded; division by a constant zero declines
        // and falls through to emission.
        if let (Some(l), Some(r)) = (lhs.constant, rhs.constant)
            && let Some(value) = fold_binary(op, l, r)
        {
            return Ok(Value::constant(value));
        }

        match op {
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem | BinaryOp::Add | BinaryOp::Sub => {
                let mnemonic = match op {
                    BinaryOp::Mul => "mul",
                    BinaryOp::Div => "sdiv",
                    BinaryOp::Rem => "srem",
                    BinaryOp::Add => "add",
                    _ => "sub",
                };
                let result = self.ir.fresh_temp();
                writeln!(
                    self.ir.body(),
                    "  {} = {} i32 {}, {}",
                    result, mnemonic, lhs.operand, rhs.operand
                )?;
                Ok(Value::temp(result, Type::Int))
            }
            BinaryOp::Lt
            | BinaryOp::Gt
            | BinaryOp::Le
            | BinaryOp::Ge
            | BinaryOp::Eq
            | BinaryOp::Ne => {
                let condition = match op {
                    BinaryOp::Lt => "slt",
                    BinaryOp::Gt => "sgt",
                    BinaryOp::Le => "sle",
                    BinaryOp::Ge => "sge",
                    BinaryOp::Eq => "eq",
                    _ => "ne",
                };
                let cmp = self.ir.fresh_temp();
                writeln!(
                    self.ir.body(),
                    "  {} = icmp {} i32 {}, {}",
                    cmp, condition, lhs.operand, rhs.operand
                )?;
                let result = self.ir.fresh_temp();
                writeln!(self.ir.body(), "  {} = zext i1 {} to i32", result, cmp)?;
                Ok(Value::temp(result, Type::Int))
            }
            BinaryOp::And | BinaryOp::Or => {
                let mnemonic = if op == BinaryOp::And { "and" } else { "or" };
                let lhs_bool = self.ir.fresh_temp();
                writeln!(
                    self.ir.body(),
                    "  {} = icmp ne i32 {}, 0",
                    lhs_bool, lhs.operand
                )?;
                let rhs_bool = self.ir.fresh_temp();
                writeln!(
                    self.ir.body(),
                    "  {} = icmp ne i32 {}, 0",
                    rhs_bool, rhs.operand
                )?;
                let combined = self.ir.fresh_temp();
                writeln!(
                    self.ir.body(),
                    "  {} = {} i1 {}, {}",
                    combined, mnemonic, lhs_bool, rhs_bool
                )?;
                let result = self.ir.fresh_temp();
                writeln!(self.ir.body(), "  {} = zext i1 {} to i32", result, combined)?;
                Ok(Value::temp(result, Type::Int))
            }
        }
    }

    /// Read an lvalue.
    ///
    /// Constant scalars, and constant array elements whose indices fold,
    /// substitute their folded value inline (local constants have no
    /// storage to load from). Everything else goes through memory:
    /// scalars load directly, subscripted arrays compute an element
    /// pointer first, and an array mentioned with fewer subscripts than
    /// dimensions decays to an `i32*` argument pointer.
    pub(super) fn lower_lval_read(&mut self, lval: &LVal) -> Result<Value, CodeGenError> {
        let Some(symbol) = self.symbols.lookup(&lval.name).cloned() else {
            eprintln!("line {}: undefined variable '{}'", lval.line + 1, lval.name);
            return Ok(Value::sentinel());
        };

        if symbol.is_const {
            if lval.indices.is_empty() && symbol.ty.is_int() {
                return Ok(Value::constant(symbol.scalar_const));
            }
            if let Some(value) = self.eval_const_expr(&Expr::LVal(lval.clone())) {
                return Ok(Value::constant(value));
            }
            if symbol.ir_name.is_empty() {
                // Local constant arrays carry only their folded values
                eprintln!(
                    "line {}: non-constant index into local constant array '{}'",
                    lval.line + 1,
                    lval.name
                );
                return Ok(Value::sentinel());
            }
        }

        match &symbol.ty {
            Type::Int => {
                let result = self.ir.fresh_temp();
                writeln!(
                    self.ir.body(),
                    "  {} = load i32, i32* {}",
                    result, symbol.ir_name
                )?;
                Ok(Value::temp(result, Type::Int))
            }
            Type::Array { dims, .. } => {
                if lval.indices.len() > dims.len() {
                    eprintln!(
                        "line {}: too many subscripts on '{}'",
                        lval.line + 1,
                        lval.name
                    );
                    return Ok(Value::sentinel());
                }
                let full = lval.indices.len() == dims.len();
                let mut operands = Vec::with_capacity(dims.len());
                for index in &lval.indices {
                    operands.push(self.lower_expr(index)?.operand);
                }
                if !full {
                    // Decay to a pointer to the first element of the
                    // remaining region, for sylib array arguments
                    operands.resize(dims.len(), "0".to_string());
                }
                let ptr = self.emit_element_ptr(&symbol, &operands)?;
                if full {
                    let result = self.ir.fresh_temp();
                    writeln!(self.ir.body(), "  {} = load i32, i32* {}", result, ptr)?;
                    Ok(Value::temp(result, Type::Int))
                } else {
                    Ok(Value::temp(ptr, Type::pointer(Type::Int)))
                }
            }
            _ => {
                eprintln!(
                    "line {}: '{}' is not a value",
                    lval.line + 1,
                    lval.name
                );
                Ok(Value::sentinel())
            }
        }
    }

    /// Emit a `getelementptr` from an array's base address down to one
    /// element, given one operand per dimension. Returns the `i32*`
    /// temporary.
    pub(super) fn emit_element_ptr(
        &mut self,
        symbol: &Symbol,
        index_operands: &[String],
    ) -> Result<String, CodeGenError> {
        let ptr = self.ir.fresh_temp();
        write!(
            self.ir.body(),
            "  {} = getelementptr {}, {}* {}, i32 0",
            ptr, symbol.ty, symbol.ty, symbol.ir_name
        )?;
        for operand in index_operands {
            write!(self.ir.body(), ", i32 {}", operand)?;
        }
        writeln!(self.ir.body())?;
        Ok(ptr)
    }

    fn lower_call(&mut self, name: &str, args: &[Expr], line: usize) -> Result<Value, CodeGenError> {
        let Some(symbol) = self.symbols.lookup(name).cloned() else {
            eprintln!("line {}: call to undefined function '{}'", line + 1, name);
            return Ok(Value::sentinel());
        };
        let Type::Function { ret, .. } = &symbol.ty else {
            eprintln!("line {}: '{}' is not a function", line + 1, name);
            return Ok(Value::sentinel());
        };
        let ret = (**ret).clone();

        let mut lowered = Vec::with_capacity(args.len());
        for arg in args {
            lowered.push(self.lower_expr(arg)?);
        }

        let rendered: Vec<String> = lowered
            .iter()
            .map(|value| format!("{} {}", value.ty, value.operand))
            .collect();
        let arg_list = rendered.join(", ");

        if ret.is_void() {
            writeln!(self.ir.body(), "  call void @{}({})", name, arg_list)?;
            Ok(Value {
                operand: "0".to_string(),
                ty: Type::Void,
                constant: None,
            })
        } else {
            let result = self.ir.fresh_temp();
            writeln!(
                self.ir.body(),
                "  {} = call {} @{}({})",
                result, ret, name, arg_list
            )?;
            Ok(Value::temp(result, ret))
        }
    }
}
