//! Arithmetic and comparison for the word library.
//!
//! Numeric coercion is centralized in [`promote`]: two ints stay ints,
//! anything involving a float promotes both sides. Integer arithmetic
//! wraps on overflow (two's complement); `div` truncates toward zero and
//! `mod` takes the sign of the dividend.

use std::cmp::Ordering;

use crate::error::{Error, Result};
use crate::value::Value;

/// Binary arithmetic words.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

/// Comparison words.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Neq,
    Lt,
    Gt,
}

/// A pair of operands promoted to a common numeric type.
pub enum NumPair {
    Ints(i64, i64),
    Floats(f64, f64),
}

/// The single numeric coercion helper. Returns `None` when either
/// operand is not a number.
pub fn promote(left: &Value, right: &Value) -> Option<NumPair> {
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => Some(NumPair::Ints(*a, *b)),
        (Value::Int(a), Value::Float(b)) => Some(NumPair::Floats(*a as f64, *b)),
        (Value::Float(a), Value::Int(b)) => Some(NumPair::Floats(*a, *b as f64)),
        (Value::Float(a), Value::Float(b)) => Some(NumPair::Floats(*a, *b)),
        _ => None,
    }
}

/// Apply a binary arithmetic word: `a b op` computes `a op b`.
///
/// `add` additionally concatenates two strings.
pub fn apply_binop(op: BinOp, left: &Value, right: &Value) -> Result<Value> {
    if op == BinOp::Add {
        if let (Value::Str(a), Value::Str(b)) = (left, right) {
            return Ok(Value::Str(format!("{}{}", a, b)));
        }
    }

    let pair = promote(left, right).ok_or_else(|| type_error(op, left, right))?;

    match (op, pair) {
        (BinOp::Add, NumPair::Ints(a, b)) => Ok(Value::Int(a.wrapping_add(b))),
        (BinOp::Sub, NumPair::Ints(a, b)) => Ok(Value::Int(a.wrapping_sub(b))),
        (BinOp::Mul, NumPair::Ints(a, b)) => Ok(Value::Int(a.wrapping_mul(b))),
        (BinOp::Div, NumPair::Ints(a, b)) => {
            if b == 0 {
                Err(Error::DivisionByZero)
            } else {
                Ok(Value::Int(a.wrapping_div(b)))
            }
        }
        (BinOp::Mod, NumPair::Ints(a, b)) => {
            if b == 0 {
                Err(Error::DivisionByZero)
            } else {
                Ok(Value::Int(a.wrapping_rem(b)))
            }
        }
        (BinOp::Add, NumPair::Floats(a, b)) => Ok(Value::Float(a + b)),
        (BinOp::Sub, NumPair::Floats(a, b)) => Ok(Value::Float(a - b)),
        (BinOp::Mul, NumPair::Floats(a, b)) => Ok(Value::Float(a * b)),
        (BinOp::Div, NumPair::Floats(a, b)) => {
            if b == 0.0 {
                Err(Error::DivisionByZero)
            } else {
                Ok(Value::Float(a / b))
            }
        }
        (BinOp::Mod, NumPair::Floats(a, b)) => {
            if b == 0.0 {
                Err(Error::DivisionByZero)
            } else {
                Ok(Value::Float(a % b))
            }
        }
    }
}

/// Apply a comparison word. `eq`/`neq` use structural equality; `lt` and
/// `gt` are defined on two numbers or two strings (lexicographic).
pub fn apply_cmpop(op: CmpOp, left: &Value, right: &Value) -> Result<bool> {
    match op {
        CmpOp::Eq => Ok(left == right),
        CmpOp::Neq => Ok(left != right),
        CmpOp::Lt => ordered(left, right).map(|ord| ord == Ordering::Less),
        CmpOp::Gt => ordered(left, right).map(|ord| ord == Ordering::Greater),
    }
}

fn ordered(left: &Value, right: &Value) -> Result<Ordering> {
    if let (Value::Str(a), Value::Str(b)) = (left, right) {
        return Ok(a.cmp(b));
    }
    match promote(left, right) {
        Some(NumPair::Ints(a, b)) => Ok(a.cmp(&b)),
        Some(NumPair::Floats(a, b)) => Ok(a.partial_cmp(&b).unwrap_or(Ordering::Equal)),
        None => Err(Error::Type {
            expected: "two numbers or two strings".to_string(),
            got: format!("{} and {}", left.type_name(), right.type_name()),
        }),
    }
}

/// Ordering used by `list_sort`: numbers by value, strings lexicographic,
/// anything else compares equal (sort is stable, so mixed lists keep
/// their relative order).
pub fn compare_for_sort(a: &Value, b: &Value) -> Ordering {
    ordered(a, b).unwrap_or(Ordering::Equal)
}

fn type_error(op: BinOp, left: &Value, right: &Value) -> Error {
    let expected = match op {
        BinOp::Add => "two numbers or two strings",
        _ => "two numbers",
    };
    Error::Type {
        expected: expected.to_string(),
        got: format!("{} and {}", left.type_name(), right.type_name()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_arithmetic_stays_int() {
        assert_eq!(
            apply_binop(BinOp::Add, &Value::Int(1), &Value::Int(2)).unwrap(),
            Value::Int(3)
        );
        assert_eq!(
            apply_binop(BinOp::Mul, &Value::Int(4), &Value::Int(5)).unwrap(),
            Value::Int(20)
        );
    }

    #[test]
    fn test_float_contaminates() {
        assert_eq!(
            apply_binop(BinOp::Add, &Value::Int(1), &Value::Float(0.5)).unwrap(),
            Value::Float(1.5)
        );
        assert_eq!(
            apply_binop(BinOp::Div, &Value::Float(5.0), &Value::Int(2)).unwrap(),
            Value::Float(2.5)
        );
    }

    #[test]
    fn test_div_truncates_toward_zero() {
        assert_eq!(
            apply_binop(BinOp::Div, &Value::Int(7), &Value::Int(2)).unwrap(),
            Value::Int(3)
        );
        assert_eq!(
            apply_binop(BinOp::Div, &Value::Int(-7), &Value::Int(2)).unwrap(),
            Value::Int(-3)
        );
    }

    #[test]
    fn test_mod_takes_sign_of_dividend() {
        assert_eq!(
            apply_binop(BinOp::Mod, &Value::Int(7), &Value::Int(3)).unwrap(),
            Value::Int(1)
        );
        assert_eq!(
            apply_binop(BinOp::Mod, &Value::Int(-7), &Value::Int(3)).unwrap(),
            Value::Int(-1)
        );
        assert_eq!(
            apply_binop(BinOp::Mod, &Value::Int(7), &Value::Int(-3)).unwrap(),
            Value::Int(1)
        );
    }

    #[test]
    fn test_division_by_zero() {
        assert!(matches!(
            apply_binop(BinOp::Div, &Value::Int(1), &Value::Int(0)),
            Err(Error::DivisionByZero)
        ));
        assert!(matches!(
            apply_binop(BinOp::Mod, &Value::Int(1), &Value::Int(0)),
            Err(Error::DivisionByZero)
        ));
        assert!(matches!(
            apply_binop(BinOp::Div, &Value::Float(1.0), &Value::Float(0.0)),
            Err(Error::DivisionByZero)
        ));
    }

    #[test]
    fn test_int_overflow_wraps() {
        assert_eq!(
            apply_binop(BinOp::Add, &Value::Int(i64::MAX), &Value::Int(1)).unwrap(),
            Value::Int(i64::MIN)
        );
        assert_eq!(
            apply_binop(BinOp::Div, &Value::Int(i64::MIN), &Value::Int(-1)).unwrap(),
            Value::Int(i64::MIN)
        );
    }

    #[test]
    fn test_string_concat() {
        assert_eq!(
            apply_binop(BinOp::Add, &Value::Str("ab".into()), &Value::Str("cd".into())).unwrap(),
            Value::Str("abcd".into())
        );
        assert!(apply_binop(BinOp::Add, &Value::Str("a".into()), &Value::Int(1)).is_err());
    }

    #[test]
    fn test_comparisons() {
        assert!(apply_cmpop(CmpOp::Gt, &Value::Int(2), &Value::Int(1)).unwrap());
        assert!(apply_cmpop(CmpOp::Lt, &Value::Int(1), &Value::Float(1.5)).unwrap());
        assert!(apply_cmpop(CmpOp::Lt, &Value::Str("abc".into()), &Value::Str("abd".into())).unwrap());
        assert!(apply_cmpop(CmpOp::Eq, &Value::Int(1), &Value::Float(1.0)).unwrap());
        assert!(apply_cmpop(CmpOp::Neq, &Value::Str("a".into()), &Value::Int(1)).unwrap());
        assert!(apply_cmpop(CmpOp::Lt, &Value::Str("a".into()), &Value::Int(1)).is_err());
    }
}
