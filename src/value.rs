use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

use crate::ast::Ast;
use crate::output::to_json;

/// A JSON number with two internal representations.
///
/// Integers and floats are carried separately so that integer results
/// (array lengths, indexes, counts) stay lossless, while equality and
/// ordering remain mathematical: `Number::Int(1)` equals
/// `Number::Float(1.0)`. Mixed comparisons promote the integer side to
/// a double first.
#[derive(Debug, Clone, Copy)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    /// The value as a double, promoting integers.
    pub fn as_f64(&self) -> f64 {
        match self {
            Number::Int(n) => *n as f64,
            Number::Float(n) => *n,
        }
    }

    /// The value as an integer, only when it is one.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Number::Int(n) => Some(*n),
            Number::Float(_) => None,
        }
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => a == b,
            (a, b) => a.as_f64() == b.as_f64(),
        }
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => Some(a.cmp(b)),
            (a, b) => a.as_f64().partial_cmp(&b.as_f64()),
        }
    }
}

impl From<i64> for Number {
    fn from(n: i64) -> Number {
        Number::Int(n)
    }
}

impl From<f64> for Number {
    fn from(n: f64) -> Number {
        Number::Float(n)
    }
}

/// A JSON value as seen by the query engine.
///
/// This covers every JSON type plus `Expref`, an expression reference
/// produced by the `&` operator and consumed by higher-order functions
/// such as `sort_by`. Objects use a `HashMap`, so iteration order is
/// unspecified; nothing in the engine depends on it.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// JSON null
    Null,

    /// UTF-8 string; lengths are counted in codepoints
    String(String),

    /// Integer or floating-point number
    Number(Number),

    /// JSON boolean
    Boolean(bool),

    /// Array of values
    Array(Vec<Value>),

    /// Object with string keys
    Object(HashMap<String, Value>),

    /// A captured sub-expression carried as a first-class value.
    /// Compared structurally; has no JSON form.
    Expref(Box<Ast>),
}

impl Value {
    /// Check if the value is truthy (for `&&`, `||`, `!`, and filters).
    ///
    /// Strings, arrays, and objects are truthy when non-empty; numbers
    /// are always truthy; null and expression references never are.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Boolean(b) => *b,
            Value::String(s) => !s.is_empty(),
            Value::Array(items) => !items.is_empty(),
            Value::Object(map) => !map.is_empty(),
            Value::Number(_) => true,
            Value::Null | Value::Expref(_) => false,
        }
    }

    /// The type name reported by the `type` function and used in
    /// signature-mismatch messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::String(_) => "string",
            Value::Number(_) => "number",
            Value::Boolean(_) => "boolean",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Expref(_) => "expression",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_string(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<Number> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&HashMap<String, Value>> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_expref(&self) -> Option<&Ast> {
        match self {
            Value::Expref(ast) => Some(ast),
            _ => None,
        }
    }

    /// Look up a field. Anything but an object, or a missing key,
    /// yields null rather than an error.
    pub fn get_field(&self, name: &str) -> Value {
        match self {
            Value::Object(map) => map.get(name).cloned().unwrap_or(Value::Null),
            _ => Value::Null,
        }
    }

    /// Index into an array. Negative indexes count from the end
    /// (-1 is the last element); out-of-range yields null.
    pub fn get_index(&self, index: i64) -> Value {
        match self {
            Value::Array(items) => {
                let len = items.len() as i64;
                let effective = if index < 0 { index + len } else { index };
                if effective < 0 || effective >= len {
                    Value::Null
                } else {
                    items[effective as usize].clone()
                }
            }
            _ => Value::Null,
        }
    }

    /// Take a step-aware slice of an array, or `None` on any other type.
    ///
    /// Endpoints wrap like negative indexes and are then clamped to
    /// `[0, len]` for a forward step and `[-1, len - 1]` for a backward
    /// one. The step must be nonzero; the parser guarantees it.
    pub fn slice(&self, start: Option<i64>, stop: Option<i64>, step: i64) -> Option<Vec<Value>> {
        self.as_array().map(|items| slice_array(items, start, stop, step))
    }

    /// Order two values. Defined for number pairs (mathematical) and
    /// string pairs (codepoint order); every other pairing has no
    /// ordering and returns `None`.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a.partial_cmp(b),
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Render as compact JSON. Expression references have no JSON form
    /// and render as null.
    pub fn json(&self) -> String {
        to_json(self)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", to_json(self))
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Value {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Boolean(b),
            serde_json::Value::Number(n) => match (n.as_i64(), n.as_f64()) {
                (Some(i), _) => Value::Number(Number::Int(i)),
                (None, Some(f)) => Value::Number(Number::Float(f)),
                (None, None) => Value::Null,
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => {
                Value::Object(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl From<&Value> for serde_json::Value {
    fn from(value: &Value) -> serde_json::Value {
        match value {
            Value::Null | Value::Expref(_) => serde_json::Value::Null,
            Value::Boolean(b) => serde_json::Value::Bool(*b),
            Value::Number(Number::Int(n)) => serde_json::Value::from(*n),
            Value::Number(Number::Float(n)) => serde_json::Number::from_f64(*n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Array(items) => {
                serde_json::Value::Array(items.iter().map(serde_json::Value::from).collect())
            }
            Value::Object(map) => serde_json::Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), serde_json::Value::from(v)))
                    .collect(),
            ),
        }
    }
}

fn slice_array(items: &[Value], start: Option<i64>, stop: Option<i64>, step: i64) -> Vec<Value> {
    let len = items.len() as i64;
    if len == 0 {
        return Vec::new();
    }
    let a = match start {
        Some(index) => adjust_endpoint(len, index, step),
        None if step < 0 => len - 1,
        None => 0,
    };
    let b = match stop {
        Some(index) => adjust_endpoint(len, index, step),
        None if step < 0 => -1,
        None => len,
    };
    let mut result = Vec::new();
    let mut i = a;
    if step > 0 {
        while i < b {
            result.push(items[i as usize].clone());
            i += step;
        }
    } else {
        while i > b {
            result.push(items[i as usize].clone());
            i += step;
        }
    }
    result
}

fn adjust_endpoint(len: i64, mut endpoint: i64, step: i64) -> i64 {
    if endpoint < 0 {
        endpoint += len;
        if endpoint >= 0 {
            endpoint
        } else if step < 0 {
            -1
        } else {
            0
        }
    } else if endpoint < len {
        endpoint
    } else if step < 0 {
        len - 1
    } else {
        len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_equals_equivalent_float() {
        assert_eq!(
            Value::Number(Number::Int(1)),
            Value::Number(Number::Float(1.0))
        );
        assert_ne!(
            Value::Number(Number::Int(1)),
            Value::Number(Number::Float(1.5))
        );
    }

    #[test]
    fn negative_index_wraps() {
        let items = Value::Array(vec![
            Value::Number(Number::Int(10)),
            Value::Number(Number::Int(20)),
            Value::Number(Number::Int(30)),
        ]);
        assert_eq!(items.get_index(-1), Value::Number(Number::Int(30)));
        assert_eq!(items.get_index(-3), Value::Number(Number::Int(10)));
        assert_eq!(items.get_index(-4), Value::Null);
        assert_eq!(items.get_index(3), Value::Null);
    }

    #[test]
    fn backward_slice() {
        let items: Vec<Value> = (0..9).map(|n| Value::Number(Number::Int(n))).collect();
        let value = Value::Array(items);
        let sliced = value.slice(Some(6), Some(2), -1).unwrap();
        let expected: Vec<Value> = [6, 5, 4, 3]
            .iter()
            .map(|n| Value::Number(Number::Int(*n)))
            .collect();
        assert_eq!(sliced, expected);
    }

    #[test]
    fn ordering_undefined_across_types() {
        let number = Value::Number(Number::Int(1));
        let text = Value::String("1".to_string());
        assert_eq!(number.compare(&text), None);
        assert_eq!(text.compare(&number), None);
    }
}
