//! The built-in word library.
//!
//! A flat dispatch table over every word that is not control flow:
//! arithmetic, comparison, truthiness logic, stack shuffling, the
//! variable store, conversions, I/O, and the list/dict/string surface.
//! Each word pops its operands receiver-first (the container or string
//! sits below its arguments, so `LIST X list_append` appends `X`) and
//! pushes at most one result. Computation is delegated to the stateless
//! helpers in `operators` and `methods`.

use crate::error::{Error, Result};
use crate::methods::{
    arg_count, arg_dict, arg_int, arg_list, arg_str, capitalize, char_find, dict_find,
    dict_insert, is_alpha, is_digit, join, list_index_of, list_insert, normalize_index,
    slice_bounds, split_on, split_whitespace,
};
use crate::operators::{apply_binop, apply_cmpop, compare_for_sort, BinOp, CmpOp};
use crate::value::Value;
use crate::vm::Vm;

/// Result of attempting to dispatch a built-in word.
pub(crate) enum BuiltinResult {
    /// The word was handled (successfully or not).
    Handled(Result<()>),
    /// Not a built-in; the VM should try host words and procedures.
    NotBuiltin,
}

/// Try to dispatch `name` as a built-in word.
pub(crate) fn try_builtin(name: &str, vm: &mut Vm) -> BuiltinResult {
    let handled = match name {
        "add" | "sub" | "mul" | "div" | "mod" => arithmetic(name, vm),
        "neg" | "abs" => unary_arithmetic(name, vm),
        "eq" | "neq" | "lt" | "gt" => comparison(name, vm),
        "not" | "and" | "or" => logic(name, vm),
        "true" | "false" | "none" => constant(name, vm),
        "dup" | "swap" | "drop" | "over" | "rot" => shuffle(name, vm),
        "store" | "load" => variables(name, vm),
        "str" | "to_int" | "to_float" => conversion(name, vm),
        "print" | "input" => io_word(name, vm),
        "list" | "list_append" | "list_pop" | "list_insert" | "list_remove" | "list_extend"
        | "list_sort" | "list_reverse" | "list_clear" | "list_set" | "list_copy"
        | "list_slice" | "list_index" | "list_count" | "list_len" | "list_get"
        | "list_contains" => list_word(name, vm),
        "dict" | "dict_get" | "dict_set" | "dict_pop" | "dict_keys" | "dict_values"
        | "dict_items" | "dict_len" | "dict_clear" | "dict_copy" | "dict_contains"
        | "dict_update" => dict_word(name, vm),
        "str_upper" | "str_lower" | "str_capitalize" | "str_strip" | "str_find"
        | "str_replace" | "str_split" | "str_split_on" | "str_join" | "str_startswith"
        | "str_endswith" | "str_isdigit" | "str_isalpha" | "str_len" | "str_contains" => {
            str_word(name, vm)
        }
        "alloc" | "free" | "read" | "write" => memory_stub(name),
        _ => return BuiltinResult::NotBuiltin,
    };
    BuiltinResult::Handled(handled)
}

// ---------------------------------------------------------------------------
// Operand helpers
// ---------------------------------------------------------------------------

// take() checks the full arity up front, so the pops cannot fail.

fn take2(vm: &mut Vm, word: &str) -> Result<(Value, Value)> {
    let mut args = vm.take(word, 2)?;
    let b = args.pop().unwrap();
    let a = args.pop().unwrap();
    Ok((a, b))
}

fn take3(vm: &mut Vm, word: &str) -> Result<(Value, Value, Value)> {
    let mut args = vm.take(word, 3)?;
    let c = args.pop().unwrap();
    let b = args.pop().unwrap();
    let a = args.pop().unwrap();
    Ok((a, b, c))
}

fn take_str1(vm: &mut Vm, word: &str) -> Result<String> {
    let v = vm.take1(word)?;
    Ok(arg_str(&v)?.to_string())
}

// ---------------------------------------------------------------------------
// Arithmetic, comparison, logic
// ---------------------------------------------------------------------------

fn arithmetic(name: &str, vm: &mut Vm) -> Result<()> {
    let op = match name {
        "add" => BinOp::Add,
        "sub" => BinOp::Sub,
        "mul" => BinOp::Mul,
        "div" => BinOp::Div,
        _ => BinOp::Mod,
    };
    let (left, right) = take2(vm, name)?;
    let result = apply_binop(op, &left, &right)?;
    vm.push(result);
    Ok(())
}

fn unary_arithmetic(name: &str, vm: &mut Vm) -> Result<()> {
    let v = vm.take1(name)?;
    let result = match (name, &v) {
        ("neg", Value::Int(i)) => Value::Int(i.wrapping_neg()),
        ("neg", Value::Float(f)) => Value::Float(-f),
        ("abs", Value::Int(i)) => Value::Int(i.wrapping_abs()),
        ("abs", Value::Float(f)) => Value::Float(f.abs()),
        _ => {
            return Err(Error::Type {
                expected: "number".to_string(),
                got: v.type_name().to_string(),
            });
        }
    };
    vm.push(result);
    Ok(())
}

fn comparison(name: &str, vm: &mut Vm) -> Result<()> {
    let op = match name {
        "eq" => CmpOp::Eq,
        "neq" => CmpOp::Neq,
        "lt" => CmpOp::Lt,
        _ => CmpOp::Gt,
    };
    let (left, right) = take2(vm, name)?;
    let result = apply_cmpop(op, &left, &right)?;
    vm.push(Value::Bool(result));
    Ok(())
}

fn logic(name: &str, vm: &mut Vm) -> Result<()> {
    match name {
        "not" => {
            let v = vm.take1("not")?;
            vm.push(Value::Bool(!v.is_truthy()));
        }
        _ => {
            let (left, right) = take2(vm, name)?;
            let result = match name {
                "and" => left.is_truthy() && right.is_truthy(),
                _ => left.is_truthy() || right.is_truthy(),
            };
            vm.push(Value::Bool(result));
        }
    }
    Ok(())
}

fn constant(name: &str, vm: &mut Vm) -> Result<()> {
    let value = match name {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => Value::None,
    };
    vm.push(value);
    Ok(())
}

// ---------------------------------------------------------------------------
// Stack shuffling
// ---------------------------------------------------------------------------

fn shuffle(name: &str, vm: &mut Vm) -> Result<()> {
    match name {
        "dup" => {
            let v = vm.take1("dup")?;
            vm.push(v.clone());
            vm.push(v);
        }
        "swap" => {
            let (a, b) = take2(vm, "swap")?;
            vm.push(b);
            vm.push(a);
        }
        "drop" => {
            vm.take1("drop")?;
        }
        "over" => {
            let (a, b) = take2(vm, "over")?;
            vm.push(a.clone());
            vm.push(b);
            vm.push(a);
        }
        _ => {
            let (a, b, c) = take3(vm, "rot")?;
            vm.push(b);
            vm.push(c);
            vm.push(a);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Variable store
// ---------------------------------------------------------------------------

fn variables(name: &str, vm: &mut Vm) -> Result<()> {
    match name {
        "store" => {
            let (value, key) = take2(vm, "store")?;
            let key = arg_str(&key)?.to_string();
            vm.store_var(key, value);
        }
        _ => {
            let key = take_str1(vm, "load")?;
            let value = vm.load_var(&key)?;
            vm.push(value);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Conversions and I/O
// ---------------------------------------------------------------------------

fn conversion(name: &str, vm: &mut Vm) -> Result<()> {
    let v = vm.take1(name)?;
    let result = match name {
        "str" => Value::Str(v.to_print_string()),
        "to_int" => match &v {
            Value::Int(i) => Value::Int(*i),
            Value::Float(f) => Value::Int(*f as i64),
            Value::Str(s) => Value::Int(s.trim().parse::<i64>().map_err(|_| Error::Type {
                expected: "integer string".to_string(),
                got: format!("\"{}\"", s),
            })?),
            _ => {
                return Err(Error::Type {
                    expected: "number or str".to_string(),
                    got: v.type_name().to_string(),
                });
            }
        },
        _ => match &v {
            Value::Int(i) => Value::Float(*i as f64),
            Value::Float(f) => Value::Float(*f),
            Value::Str(s) => Value::Float(s.trim().parse::<f64>().map_err(|_| Error::Type {
                expected: "numeric string".to_string(),
                got: format!("\"{}\"", s),
            })?),
            _ => {
                return Err(Error::Type {
                    expected: "number or str".to_string(),
                    got: v.type_name().to_string(),
                });
            }
        },
    };
    vm.push(result);
    Ok(())
}

fn io_word(name: &str, vm: &mut Vm) -> Result<()> {
    match name {
        "print" => {
            let v = vm.take1("print")?;
            let line = v.to_print_string();
            vm.emit(line);
        }
        _ => {
            let line = vm.read_input_line()?;
            vm.push(Value::Str(line));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Lists
// ---------------------------------------------------------------------------

fn list_word(name: &str, vm: &mut Vm) -> Result<()> {
    match name {
        "list" => {
            let n = arg_count(&vm.take1("list")?)?;
            let items = vm.take("list", n)?;
            vm.push(Value::list(items));
        }
        "list_append" => {
            let (list, item) = take2(vm, name)?;
            arg_list(&list)?.borrow_mut().push(item);
        }
        "list_pop" => {
            let list = vm.take1(name)?;
            let popped = arg_list(&list)?
                .borrow_mut()
                .pop()
                .ok_or_else(|| Error::Index("pop from empty list".to_string()))?;
            vm.push(popped);
        }
        "list_insert" => {
            let (list, idx, item) = take3(vm, name)?;
            let list = arg_list(&list)?;
            let idx = arg_int(&idx)?;
            list_insert(&mut list.borrow_mut(), idx, item);
        }
        "list_remove" => {
            let (list, target) = take2(vm, name)?;
            let list = arg_list(&list)?;
            let pos = list_index_of(&list.borrow(), &target);
            match pos {
                Some(i) => {
                    list.borrow_mut().remove(i);
                }
                None => return Err(Error::Index("value not in list".to_string())),
            }
        }
        "list_extend" => {
            let (dst, src) = take2(vm, name)?;
            let dst = arg_list(&dst)?;
            // Clone out first: the source may alias the destination.
            let items: Vec<Value> = arg_list(&src)?.borrow().clone();
            dst.borrow_mut().extend(items);
        }
        "list_sort" => {
            let list = vm.take1(name)?;
            arg_list(&list)?.borrow_mut().sort_by(compare_for_sort);
        }
        "list_reverse" => {
            let list = vm.take1(name)?;
            arg_list(&list)?.borrow_mut().reverse();
        }
        "list_clear" => {
            let list = vm.take1(name)?;
            arg_list(&list)?.borrow_mut().clear();
        }
        "list_set" => {
            let (list, idx, value) = take3(vm, name)?;
            let list = arg_list(&list)?;
            let idx = arg_int(&idx)?;
            let mut items = list.borrow_mut();
            let i = normalize_index(items.len(), idx)?;
            items[i] = value;
        }
        "list_copy" => {
            let list = vm.take1(name)?;
            let items = arg_list(&list)?.borrow().clone();
            vm.push(Value::list(items));
        }
        "list_slice" => {
            let (list, lo, hi) = take3(vm, name)?;
            let list = arg_list(&list)?;
            let (lo, hi) = (arg_int(&lo)?, arg_int(&hi)?);
            let items = list.borrow();
            let (start, stop) = slice_bounds(items.len(), lo, hi);
            let copy = items[start..stop].to_vec();
            drop(items);
            vm.push(Value::list(copy));
        }
        "list_index" => {
            let (list, target) = take2(vm, name)?;
            let pos = list_index_of(&arg_list(&list)?.borrow(), &target)
                .ok_or_else(|| Error::Index("value not in list".to_string()))?;
            vm.push(Value::Int(pos as i64));
        }
        "list_count" => {
            let (list, target) = take2(vm, name)?;
            let count = arg_list(&list)?
                .borrow()
                .iter()
                .filter(|item| *item == &target)
                .count();
            vm.push(Value::Int(count as i64));
        }
        "list_len" => {
            let list = vm.take1(name)?;
            let len = arg_list(&list)?.borrow().len();
            vm.push(Value::Int(len as i64));
        }
        "list_get" => {
            let (list, idx) = take2(vm, name)?;
            let list = arg_list(&list)?;
            let idx = arg_int(&idx)?;
            let items = list.borrow();
            let i = normalize_index(items.len(), idx)?;
            let item = items[i].clone();
            drop(items);
            vm.push(item);
        }
        _ => {
            let (list, target) = take2(vm, "list_contains")?;
            let found = list_index_of(&arg_list(&list)?.borrow(), &target).is_some();
            vm.push(Value::Bool(found));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Dicts
// ---------------------------------------------------------------------------

fn dict_word(name: &str, vm: &mut Vm) -> Result<()> {
    match name {
        "dict" => {
            let n = arg_count(&vm.take1("dict")?)?;
            let raw = vm.take("dict", n.saturating_mul(2))?;
            let mut pairs: Vec<(String, Value)> = Vec::with_capacity(n);
            let mut iter = raw.into_iter();
            while let (Some(key), Some(value)) = (iter.next(), iter.next()) {
                let key = arg_str(&key)?.to_string();
                dict_insert(&mut pairs, key, value);
            }
            vm.push(Value::dict(pairs));
        }
        "dict_get" => {
            let (dict, key) = take2(vm, name)?;
            let dict = arg_dict(&dict)?;
            let pairs = dict.borrow();
            let value = match dict_find(&pairs, arg_str(&key)?) {
                Some(i) => pairs[i].1.clone(),
                None => Value::None,
            };
            drop(pairs);
            vm.push(value);
        }
        "dict_set" => {
            let (dict, key, value) = take3(vm, name)?;
            let dict = arg_dict(&dict)?;
            let key = arg_str(&key)?.to_string();
            dict_insert(&mut dict.borrow_mut(), key, value);
        }
        "dict_pop" => {
            let (dict, key) = take2(vm, name)?;
            let dict = arg_dict(&dict)?;
            let key = arg_str(&key)?;
            let pos = dict_find(&dict.borrow(), key);
            match pos {
                Some(i) => {
                    let (_, value) = dict.borrow_mut().remove(i);
                    vm.push(value);
                }
                None => return Err(Error::Key(key.to_string())),
            }
        }
        "dict_keys" => {
            let dict = vm.take1(name)?;
            let keys: Vec<Value> = arg_dict(&dict)?
                .borrow()
                .iter()
                .map(|(k, _)| Value::Str(k.clone()))
                .collect();
            vm.push(Value::list(keys));
        }
        "dict_values" => {
            let dict = vm.take1(name)?;
            let values: Vec<Value> = arg_dict(&dict)?
                .borrow()
                .iter()
                .map(|(_, v)| v.clone())
                .collect();
            vm.push(Value::list(values));
        }
        "dict_items" => {
            let dict = vm.take1(name)?;
            let items: Vec<Value> = arg_dict(&dict)?
                .borrow()
                .iter()
                .map(|(k, v)| Value::Tuple(vec![Value::Str(k.clone()), v.clone()]))
                .collect();
            vm.push(Value::list(items));
        }
        "dict_len" => {
            let dict = vm.take1(name)?;
            let len = arg_dict(&dict)?.borrow().len();
            vm.push(Value::Int(len as i64));
        }
        "dict_clear" => {
            let dict = vm.take1(name)?;
            arg_dict(&dict)?.borrow_mut().clear();
        }
        "dict_copy" => {
            let dict = vm.take1(name)?;
            let pairs = arg_dict(&dict)?.borrow().clone();
            vm.push(Value::dict(pairs));
        }
        "dict_contains" => {
            let (dict, key) = take2(vm, name)?;
            let found = dict_find(&arg_dict(&dict)?.borrow(), arg_str(&key)?).is_some();
            vm.push(Value::Bool(found));
        }
        _ => {
            let (dst, src) = take2(vm, "dict_update")?;
            let dst = arg_dict(&dst)?;
            // Clone out first: the source may alias the destination.
            let pairs = arg_dict(&src)?.borrow().clone();
            let mut dst_pairs = dst.borrow_mut();
            for (key, value) in pairs {
                dict_insert(&mut dst_pairs, key, value);
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Strings
// ---------------------------------------------------------------------------

fn str_word(name: &str, vm: &mut Vm) -> Result<()> {
    match name {
        "str_upper" => {
            let s = take_str1(vm, name)?;
            vm.push(Value::Str(s.to_uppercase()));
        }
        "str_lower" => {
            let s = take_str1(vm, name)?;
            vm.push(Value::Str(s.to_lowercase()));
        }
        "str_capitalize" => {
            let s = take_str1(vm, name)?;
            vm.push(Value::Str(capitalize(&s)));
        }
        "str_strip" => {
            let s = take_str1(vm, name)?;
            vm.push(Value::Str(s.trim().to_string()));
        }
        "str_find" => {
            let (s, needle) = take2(vm, name)?;
            let pos = char_find(arg_str(&s)?, arg_str(&needle)?);
            vm.push(Value::Int(pos));
        }
        "str_replace" => {
            let (s, old, new) = take3(vm, name)?;
            let result = arg_str(&s)?.replace(arg_str(&old)?, arg_str(&new)?);
            vm.push(Value::Str(result));
        }
        "str_split" => {
            let s = take_str1(vm, name)?;
            vm.push(Value::list(split_whitespace(&s)));
        }
        "str_split_on" => {
            let (s, sep) = take2(vm, name)?;
            let parts = split_on(arg_str(&s)?, arg_str(&sep)?)?;
            vm.push(Value::list(parts));
        }
        "str_join" => {
            let (list, sep) = take2(vm, name)?;
            let joined = join(&arg_list(&list)?.borrow(), arg_str(&sep)?)?;
            vm.push(Value::Str(joined));
        }
        "str_startswith" => {
            let (s, prefix) = take2(vm, name)?;
            let result = arg_str(&s)?.starts_with(arg_str(&prefix)?);
            vm.push(Value::Bool(result));
        }
        "str_endswith" => {
            let (s, suffix) = take2(vm, name)?;
            let result = arg_str(&s)?.ends_with(arg_str(&suffix)?);
            vm.push(Value::Bool(result));
        }
        "str_isdigit" => {
            let s = take_str1(vm, name)?;
            vm.push(Value::Bool(is_digit(&s)));
        }
        "str_isalpha" => {
            let s = take_str1(vm, name)?;
            vm.push(Value::Bool(is_alpha(&s)));
        }
        "str_len" => {
            let s = take_str1(vm, name)?;
            vm.push(Value::Int(s.chars().count() as i64));
        }
        _ => {
            let (s, needle) = take2(vm, "str_contains")?;
            let result = arg_str(&s)?.contains(arg_str(&needle)?);
            vm.push(Value::Bool(result));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Low-level memory stubs
// ---------------------------------------------------------------------------

fn memory_stub(name: &str) -> Result<()> {
    Err(Error::Unsupported(format!(
        "low-level memory word `{}` is not available",
        name
    )))
}
