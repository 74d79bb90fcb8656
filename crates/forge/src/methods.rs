//! Container and string operations backing the `list_*`, `dict_*`, and
//! `str_*` words, plus the operand extraction helpers the dispatch table
//! uses. Everything here is stateless; the VM owns the stack and the
//! argument order.
//!
//! All string operations index by Unicode scalar values, never bytes.

use crate::error::{Error, Result};
use crate::value::{DictHandle, ListHandle, Value};

// ---------------------------------------------------------------------------
// Operand extraction
// ---------------------------------------------------------------------------

pub(crate) fn arg_int(v: &Value) -> Result<i64> {
    v.as_int().ok_or_else(|| Error::Type {
        expected: "int".to_string(),
        got: v.type_name().to_string(),
    })
}

/// A non-negative int used as an element count.
pub(crate) fn arg_count(v: &Value) -> Result<usize> {
    let n = arg_int(v)?;
    usize::try_from(n).map_err(|_| Error::Type {
        expected: "non-negative int".to_string(),
        got: n.to_string(),
    })
}

pub(crate) fn arg_str(v: &Value) -> Result<&str> {
    v.as_str().ok_or_else(|| Error::Type {
        expected: "str".to_string(),
        got: v.type_name().to_string(),
    })
}

pub(crate) fn arg_list(v: &Value) -> Result<&ListHandle> {
    v.as_list().ok_or_else(|| Error::Type {
        expected: "list".to_string(),
        got: v.type_name().to_string(),
    })
}

pub(crate) fn arg_dict(v: &Value) -> Result<&DictHandle> {
    v.as_dict().ok_or_else(|| Error::Type {
        expected: "dict".to_string(),
        got: v.type_name().to_string(),
    })
}

// ---------------------------------------------------------------------------
// List operations
// ---------------------------------------------------------------------------

/// Resolve a possibly-negative index against a length, erroring when it
/// falls outside `0..len`.
pub(crate) fn normalize_index(len: usize, idx: i64) -> Result<usize> {
    let actual = if idx < 0 {
        idx.saturating_add(len as i64)
    } else {
        idx
    };
    if actual >= 0 && (actual as usize) < len {
        Ok(actual as usize)
    } else {
        Err(Error::Index(format!(
            "index {} out of range for length {}",
            idx, len
        )))
    }
}

/// Resolve slice bounds: negative indices count from the end, and both
/// bounds clamp to the sequence instead of erroring.
pub(crate) fn slice_bounds(len: usize, lo: i64, hi: i64) -> (usize, usize) {
    let clamp = |idx: i64| -> usize {
        let actual = if idx < 0 {
            idx.saturating_add(len as i64)
        } else {
            idx
        };
        actual.clamp(0, len as i64) as usize
    };
    let start = clamp(lo);
    let stop = clamp(hi);
    (start, stop.max(start))
}

pub(crate) fn list_index_of(items: &[Value], target: &Value) -> Option<usize> {
    items.iter().position(|item| item == target)
}

/// `list_insert` clamps out-of-range positions instead of erroring.
pub(crate) fn list_insert(items: &mut Vec<Value>, idx: i64, value: Value) {
    let len = items.len() as i64;
    let pos = if idx < 0 {
        idx.saturating_add(len).max(0) as usize
    } else {
        (idx as usize).min(items.len())
    };
    items.insert(pos, value);
}

// ---------------------------------------------------------------------------
// Dict operations
// ---------------------------------------------------------------------------

pub(crate) fn dict_find(pairs: &[(String, Value)], key: &str) -> Option<usize> {
    pairs.iter().position(|(k, _)| k == key)
}

/// Insert or overwrite, preserving the first-seen position of the key.
pub(crate) fn dict_insert(pairs: &mut Vec<(String, Value)>, key: String, value: Value) {
    match dict_find(pairs, &key) {
        Some(i) => pairs[i].1 = value,
        None => pairs.push((key, value)),
    }
}

// ---------------------------------------------------------------------------
// String operations
// ---------------------------------------------------------------------------

/// First character uppercased, the rest lowercased.
pub(crate) fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().collect::<String>() + chars.as_str().to_lowercase().as_str(),
        None => String::new(),
    }
}

/// Character index of the first occurrence of `needle`, or −1.
pub(crate) fn char_find(s: &str, needle: &str) -> i64 {
    match s.find(needle) {
        Some(byte_pos) => s[..byte_pos].chars().count() as i64,
        None => -1,
    }
}

pub(crate) fn split_whitespace(s: &str) -> Vec<Value> {
    s.split_whitespace()
        .map(|part| Value::Str(part.to_string()))
        .collect()
}

pub(crate) fn split_on(s: &str, sep: &str) -> Result<Vec<Value>> {
    if sep.is_empty() {
        return Err(Error::Runtime("str_split_on: empty separator".to_string()));
    }
    Ok(s.split(sep)
        .map(|part| Value::Str(part.to_string()))
        .collect())
}

/// Join list elements (all must be strings) with a separator.
pub(crate) fn join(items: &[Value], sep: &str) -> Result<String> {
    let parts: Result<Vec<&str>> = items.iter().map(arg_str).collect();
    Ok(parts?.join(sep))
}

pub(crate) fn is_digit(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

pub(crate) fn is_alpha(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_alphabetic())
}
