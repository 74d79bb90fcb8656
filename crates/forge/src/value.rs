//! The runtime value model.
//!
//! [`Value`] is a tagged union over everything a Forge program can put on
//! the operand stack. Scalars (`none`, bools, ints, floats, strings) have
//! value semantics; lists and dicts are shared handles, so cloning a
//! `Value::List` clones the reference and mutations are visible through
//! every alias. Cyclic containers are possible and are accepted as an
//! unreclaimed-memory hazard.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Shared handle to a mutable list.
pub type ListHandle = Rc<RefCell<Vec<Value>>>;

/// Shared handle to a mutable, insertion-ordered dict with string keys.
pub type DictHandle = Rc<RefCell<Vec<(String, Value)>>>;

/// A Forge runtime value.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Value {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(ListHandle),
    Dict(DictHandle),
    Tuple(Vec<Value>),
}

impl Value {
    /// Build a fresh list value from items (first item becomes index 0).
    pub fn list(items: Vec<Value>) -> Value {
        Value::List(Rc::new(RefCell::new(items)))
    }

    /// Build a fresh dict value from key/value pairs in insertion order.
    pub fn dict(pairs: Vec<(String, Value)>) -> Value {
        Value::Dict(Rc::new(RefCell::new(pairs)))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::None => "none",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::List(_) => "list",
            Value::Dict(_) => "dict",
            Value::Tuple(_) => "tuple",
        }
    }

    /// The truth test used by `if` and `while`: `none` is false, numbers
    /// are truthy iff nonzero, strings and containers iff nonempty.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::None => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::List(l) => !l.borrow().is_empty(),
            Value::Dict(d) => !d.borrow().is_empty(),
            Value::Tuple(t) => !t.is_empty(),
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub(crate) fn as_list(&self) -> Option<&ListHandle> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    pub(crate) fn as_dict(&self) -> Option<&DictHandle> {
        match self {
            Value::Dict(d) => Some(d),
            _ => None,
        }
    }

    /// Format a value for `print` output.
    ///
    /// Unlike `Display`, a top-level string is written raw, without quotes.
    /// Elements inside lists, tuples, and dicts keep their quoted form.
    pub fn to_print_string(&self) -> String {
        match self {
            Value::Str(s) => s.clone(),
            other => format!("{}", other),
        }
    }
}

/// Structural equality: `Int` and `Float` compare numerically, strings to
/// strings only, containers element-wise (aliased handles short-circuit).
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::None, Value::None) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Int(a), Value::Float(b)) => *a as f64 == *b,
            (Value::Float(a), Value::Int(b)) => *a == *b as f64,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => Rc::ptr_eq(a, b) || *a.borrow() == *b.borrow(),
            (Value::Dict(a), Value::Dict(b)) => Rc::ptr_eq(a, b) || *a.borrow() == *b.borrow(),
            (Value::Tuple(a), Value::Tuple(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => write!(f, "none"),
            Value::Bool(b) => write!(f, "{}", if *b { "true" } else { "false" }),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(fl) => {
                if fl.fract() == 0.0 {
                    write!(f, "{}.0", fl)
                } else {
                    write!(f, "{}", fl)
                }
            }
            Value::Str(s) => write!(f, "\"{}\"", s),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.borrow().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Dict(pairs) => {
                write!(f, "{{")?;
                for (i, (key, value)) in pairs.borrow().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "\"{}\": {}", key, value)?;
                }
                write!(f, "}}")
            }
            Value::Tuple(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, ")")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::list(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truthiness() {
        assert!(!Value::None.is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(!Value::Int(0).is_truthy());
        assert!(!Value::Float(0.0).is_truthy());
        assert!(!Value::Str(String::new()).is_truthy());
        assert!(!Value::list(vec![]).is_truthy());
        assert!(!Value::dict(vec![]).is_truthy());

        assert!(Value::Bool(true).is_truthy());
        assert!(Value::Int(-1).is_truthy());
        assert!(Value::Float(0.5).is_truthy());
        assert!(Value::Str("x".into()).is_truthy());
        assert!(Value::list(vec![Value::None]).is_truthy());
    }

    #[test]
    fn test_numeric_equality_across_variants() {
        assert_eq!(Value::Int(1), Value::Float(1.0));
        assert_eq!(Value::Float(2.0), Value::Int(2));
        assert_ne!(Value::Int(1), Value::Float(1.5));
        // Bools never compare equal to numbers
        assert_ne!(Value::Bool(true), Value::Int(1));
        assert_ne!(Value::Str("1".into()), Value::Int(1));
    }

    #[test]
    fn test_container_equality_is_structural() {
        let a = Value::list(vec![Value::Int(1), Value::Int(2)]);
        let b = Value::list(vec![Value::Int(1), Value::Float(2.0)]);
        assert_eq!(a, b);

        let alias = a.clone();
        assert_eq!(a, alias);
    }

    #[test]
    fn test_list_handles_alias() {
        let a = Value::list(vec![Value::Int(1)]);
        let b = a.clone();
        if let Value::List(handle) = &a {
            handle.borrow_mut().push(Value::Int(2));
        }
        if let Value::List(handle) = &b {
            assert_eq!(handle.borrow().len(), 2);
        } else {
            panic!("expected list");
        }
    }

    #[test]
    fn test_print_format() {
        assert_eq!(Value::Int(3).to_print_string(), "3");
        assert_eq!(Value::Float(3.0).to_print_string(), "3.0");
        assert_eq!(Value::Float(2.5).to_print_string(), "2.5");
        assert_eq!(Value::Bool(true).to_print_string(), "true");
        assert_eq!(Value::None.to_print_string(), "none");
        // Top-level strings print raw; nested strings stay quoted
        assert_eq!(Value::Str("hi".into()).to_print_string(), "hi");
        let list = Value::list(vec![Value::Int(1), Value::Str("a".into())]);
        assert_eq!(list.to_print_string(), "[1, \"a\"]");
        let dict = Value::dict(vec![
            ("k".into(), Value::Int(1)),
            ("m".into(), Value::Str("v".into())),
        ]);
        assert_eq!(dict.to_print_string(), "{\"k\": 1, \"m\": \"v\"}");
        let tuple = Value::Tuple(vec![Value::Str("k".into()), Value::Int(1)]);
        assert_eq!(tuple.to_print_string(), "(\"k\", 1)");
    }
}
