//! Compile-time expression and initializer evaluation
//!
//! Two jobs share this module. `eval_const_expr` folds pure integer
//! expressions without emitting any IR, over wrapping 32-bit arithmetic
//! with truncated signed division. `flatten_init` applies the
//! brace-matching rule to a nested initializer, producing a row-major
//! slot vector of the declared shape; each consumer then applies its own
//! fold-or-fallback policy to the slots, so compile-time and runtime
//! initializers go through one algorithm.

use super::CodeGen;
use crate::ast::{BinaryOp, Expr, InitVal, UnaryOp};
use crate::types::Type;

/// Fold a unary operator over a constant operand.
pub(super) fn fold_unary(op: UnaryOp, operand: i32) -> i32 {
    match op {
        UnaryOp::Plus => operand,
        UnaryOp::Neg => 0i32.wrapping_sub(operand),
        UnaryOp::Not => (operand == 0) as i32,
    }
}

/// Fold a binary operator over constant operands.
///
/// Declines (`None`) on division or remainder by zero: the instruction is
/// emitted instead and the behavior is the target's, never the host's.
pub(super) fn fold_binary(op: BinaryOp, lhs: i32, rhs: i32) -> Option<i32> {
    let value = match op {
        BinaryOp::Mul => lhs.wrapping_mul(rhs),
        BinaryOp::Div => {
            if rhs == 0 {
                return None;
            }
            lhs.wrapping_div(rhs)
        }
        BinaryOp::Rem => {
            if rhs == 0 {
                return None;
            }
            lhs.wrapping_rem(rhs)
        }
        BinaryOp::Add => lhs.wrapping_add(rhs),
        BinaryOp::Sub => lhs.wrapping_sub(rhs),
        BinaryOp::Lt => (lhs < rhs) as i32,
        BinaryOp::Gt => (lhs > rhs) as i32,
        BinaryOp::Le => (lhs <= rhs) as i32,
        BinaryOp::Ge => (lhs >= rhs) as i32,
        BinaryOp::Eq => (lhs == rhs) as i32,
        BinaryOp::Ne => (lhs != rhs) as i32,
        BinaryOp::And => (lhs != 0 && rhs != 0) as i32,
        BinaryOp::Or => (lhs != 0 || rhs != 0) as i32,
    };
    Some(value)
}

impl CodeGen {
    /// Try to fold an expression at compile time. Pure: emits nothing.
    ///
    /// Folds literals, unary and binary operators, constant scalars, and
    /// constant array elements whose indices all fold. Anything else
    /// (calls, non-constant variables, out-of-range indices) is `None`.
    pub(super) fn eval_const_expr(&self, expr: &Expr) -> Option<i32> {
        match expr {
            Expr::Number(value) => Some(*value),
            Expr::Unary { op, operand } => {
                Some(fold_unary(*op, self.eval_const_expr(operand)?))
            }
            Expr::Binary { op, lhs, rhs } => fold_binary(
                *op,
                self.eval_const_expr(lhs)?,
                self.eval_const_expr(rhs)?,
            ),
            Expr::LVal(lval) => {
                let symbol = self.symbols.lookup(&lval.name)?;
                if !symbol.is_const {
                    return None;
                }
                if lval.indices.is_empty() {
                    return symbol.ty.is_int().then_some(symbol.scalar_const);
                }
                let Type::Array { dims, .. } = &symbol.ty else {
                    return None;
                };
                if lval.indices.len() != dims.len() {
                    return None;
                }
                let mut flat: i64 = 0;
                for (index_expr, &dim) in lval.indices.iter().zip(dims) {
                    let index = self.eval_const_expr(index_expr)?;
                    if index < 0 || index >= dim {
                        return None;
                    }
                    flat = flat * i64::from(dim) + i64::from(index);
                }
                symbol.array_consts.get(flat as usize).copied()
            }
            Expr::Call { .. } => None,
        }
    }
}

/// Apply the brace-matching rule to an initializer.
///
/// Returns a slot vector of length `product(dims)` in row-major order.
/// `Some(expr)` slots hold the source expression for that element; `None`
/// slots are zero padding. Each nested brace opens a sub-region shaped by
/// the remaining dimension suffix; scalar expressions consume one slot;
/// unfilled trailing slots of any sub-region pad with zeros, and an empty
/// brace pads its whole region.
pub(super) fn flatten_init<'a>(init: &'a InitVal, dims: &[i32]) -> Vec<Option<&'a Expr>> {
    let mut slots = Vec::new();
    flatten_region(init, dims, 0, &mut slots);
    let total: usize = dims.iter().map(|&d| d as usize).product();
    slots.resize(total, None);
    slots
}

fn flatten_region<'a>(
    init: &'a InitVal,
    dims: &[i32],
    depth: usize,
    out: &mut Vec<Option<&'a Expr>>,
) {
    match init {
        InitVal::Expr(expr) => out.push(Some(expr)),
        InitVal::List(items) => {
            let start = out.len();
            for item in items {
                match item {
                    InitVal::Expr(expr) => out.push(Some(expr)),
                    nested @ InitVal::List(_) => flatten_region(nested, dims, depth + 1, out),
                }
            }
            // The region owned by this brace is the remaining dimension
            // suffix; pad it out (or drop overflow) to keep regions aligned.
            let region: usize = dims.iter().skip(depth).map(|&d| d as usize).product();
            out.resize(start + region, None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symtab::Symbol;

    fn num(value: i32) -> Expr {
        Expr::Number(value)
    }

    fn init_num(value: i32) -> InitVal {
        InitVal::Expr(num(value))
    }

    fn eval(expr: &Expr) -> Option<i32> {
        CodeGen::new().eval_const_expr(expr)
    }

    fn slot_values(init: &InitVal, dims: &[i32]) -> Vec<i32> {
        let codegen = CodeGen::new();
        flatten_init(init, dims)
            .iter()
            .map(|slot| slot.map_or(0, |e| codegen.eval_const_expr(e).unwrap()))
            .collect()
    }

    #[test]
    fn test_fold_arithmetic() {
        let expr = Expr::binary(
            BinaryOp::Add,
            num(1),
            Expr::binary(BinaryOp::Mul, num(2), num(3)),
        );
        assert_eq!(eval(&expr), Some(7));
    }

    #[test]
    fn test_fold_unary() {
        assert_eq!(eval(&Expr::unary(UnaryOp::Neg, num(7))), Some(-7));
        assert_eq!(eval(&Expr::unary(UnaryOp::Plus, num(-4))), Some(-4));
        assert_eq!(eval(&Expr::unary(UnaryOp::Not, num(0))), Some(1));
        assert_eq!(eval(&Expr::unary(UnaryOp::Not, num(9))), Some(0));
    }

    #[test]
    fn test_fold_division_truncates_toward_zero() {
        assert_eq!(fold_binary(BinaryOp::Div, 7, 2), Some(3));
        assert_eq!(fold_binary(BinaryOp::Div, -7, 2), Some(-3));
        assert_eq!(fold_binary(BinaryOp::Rem, -7, 2), Some(-1));
        assert_eq!(fold_binary(BinaryOp::Rem, 7, -2), Some(1));
    }

    #[test]
    fn test_fold_declines_division_by_zero() {
        assert_eq!(fold_binary(BinaryOp::Div, 1, 0), None);
        assert_eq!(fold_binary(BinaryOp::Rem, 1, 0), None);
    }

    #[test]
    fn test_fold_wraps_on_overflow() {
        assert_eq!(fold_binary(BinaryOp::Add, i32::MAX, 1), Some(i32::MIN));
        assert_eq!(fold_binary(BinaryOp::Div, i32::MIN, -1), Some(i32::MIN));
        assert_eq!(fold_unary(UnaryOp::Neg, i32::MIN), i32::MIN);
    }

    #[test]
    fn test_fold_relational_and_logical() {
        assert_eq!(fold_binary(BinaryOp::Lt, 1, 2), Some(1));
        assert_eq!(fold_binary(BinaryOp::Ge, 1, 2), Some(0));
        assert_eq!(fold_binary(BinaryOp::Eq, 3, 3), Some(1));
        assert_eq!(fold_binary(BinaryOp::And, 2, 0), Some(0));
        assert_eq!(fold_binary(BinaryOp::Or, 0, 5), Some(1));
    }

    #[test]
    fn test_eval_constant_scalar_symbol() {
        let mut codegen = CodeGen::new();
        codegen.symbols.declare(Symbol::const_scalar("N", 10));
        let lval = Expr::LVal(crate::ast::LVal {
            name: "N".to_string(),
            indices: vec![],
            line: 0,
        });
        assert_eq!(codegen.eval_const_expr(&lval), Some(10));
    }

    #[test]
    fn test_eval_constant_array_element() {
        let mut codegen = CodeGen::new();
        codegen.symbols.declare(Symbol::const_array(
            "a",
            Type::array(vec![2, 3]),
            vec![1, 2, 3, 4, 5, 6],
        ));
        let lval = Expr::LVal(crate::ast::LVal {
            name: "a".to_string(),
            indices: vec![num(1), num(2)],
            line: 0,
        });
        assert_eq!(codegen.eval_const_expr(&lval), Some(6));
    }

    #[test]
    fn test_eval_non_constant_is_none() {
        let mut codegen = CodeGen::new();
        codegen.symbols.declare(Symbol::new("x", Type::Int));
        let lval = Expr::LVal(crate::ast::LVal {
            name: "x".to_string(),
            indices: vec![],
            line: 0,
        });
        assert_eq!(codegen.eval_const_expr(&lval), None);
        assert_eq!(
            codegen.eval_const_expr(&Expr::Call {
                name: "getint".to_string(),
                args: vec![],
                line: 0,
            }),
            None
        );
    }

    #[test]
    fn test_flatten_full_rows() {
        let init = InitVal::List(vec![
            InitVal::List(vec![init_num(1), init_num(2), init_num(3)]),
            InitVal::List(vec![init_num(4)]),
        ]);
        assert_eq!(slot_values(&init, &[2, 3]), vec![1, 2, 3, 4, 0, 0]);
    }

    #[test]
    fn test_flatten_scalars_fill_innermost_dimension() {
        let init = InitVal::List(vec![init_num(1), init_num(2), init_num(3), init_num(4)]);
        assert_eq!(slot_values(&init, &[2, 3]), vec![1, 2, 3, 4, 0, 0]);
    }

    #[test]
    fn test_flatten_mixed_scalars_and_braces() {
        // {1, 2, {3}, 4} over [2][3]: the nested brace opens a row region
        let init = InitVal::List(vec![
            init_num(1),
            init_num(2),
            InitVal::List(vec![init_num(3)]),
            init_num(4),
        ]);
        assert_eq!(slot_values(&init, &[2, 3]), vec![1, 2, 3, 0, 0, 4]);
    }

    #[test]
    fn test_flatten_empty_braces_zero_region() {
        let init = InitVal::List(vec![]);
        assert_eq!(slot_values(&init, &[2, 2]), vec![0, 0, 0, 0]);

        let init = InitVal::List(vec![InitVal::List(vec![]), InitVal::List(vec![init_num(9)])]);
        assert_eq!(slot_values(&init, &[2, 2]), vec![0, 0, 9, 0]);
    }

    #[test]
    fn test_flatten_one_dimensional_padding() {
        let init = InitVal::List(vec![init_num(5)]);
        assert_eq!(slot_values(&init, &[4]), vec![5, 0, 0, 0]);
    }
}
