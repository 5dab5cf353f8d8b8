//! The built-in function library and its typed signature system.
//!
//! Every function pairs a [`Signature`] with a body. The runtime
//! validates evaluated arguments against the signature before the body
//! runs, so bodies can assume their inputs conform. Higher-order
//! functions receive expression references and apply them through the
//! interpreter.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

use crate::errors::RuntimeError;
use crate::evaluator::interpret;
use crate::output::to_json;
use crate::runtime::Runtime;
use crate::value::{Number, Value};

/// The type a function argument can require.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgType {
    Any,
    Null,
    String,
    Number,
    Boolean,
    Object,
    Array,
    Expref,
    /// An array whose every element matches the inner type
    TypedArray(Box<ArgType>),
    /// Any one of the alternatives
    Union(Vec<ArgType>),
}

impl ArgType {
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            ArgType::Any => true,
            ArgType::Null => value.is_null(),
            ArgType::String => matches!(value, Value::String(_)),
            ArgType::Number => matches!(value, Value::Number(_)),
            ArgType::Boolean => matches!(value, Value::Boolean(_)),
            ArgType::Object => matches!(value, Value::Object(_)),
            ArgType::Array => matches!(value, Value::Array(_)),
            ArgType::Expref => matches!(value, Value::Expref(_)),
            ArgType::TypedArray(inner) => match value {
                Value::Array(items) => items.iter().all(|item| inner.matches(item)),
                _ => false,
            },
            ArgType::Union(options) => options.iter().any(|option| option.matches(value)),
        }
    }
}

impl fmt::Display for ArgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgType::Any => write!(f, "any"),
            ArgType::Null => write!(f, "null"),
            ArgType::String => write!(f, "string"),
            ArgType::Number => write!(f, "number"),
            ArgType::Boolean => write!(f, "boolean"),
            ArgType::Object => write!(f, "object"),
            ArgType::Array => write!(f, "array"),
            ArgType::Expref => write!(f, "expression"),
            ArgType::TypedArray(inner) => write!(f, "array of {}", inner),
            ArgType::Union(options) => {
                let names: Vec<String> = options.iter().map(|o| o.to_string()).collect();
                write!(f, "{}", names.join(" or "))
            }
        }
    }
}

/// Fixed positional inputs plus an optional variadic tail.
#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    pub inputs: Vec<ArgType>,
    pub var_arg: Option<ArgType>,
}

impl Signature {
    pub fn new(inputs: Vec<ArgType>, var_arg: Option<ArgType>) -> Self {
        Signature { inputs, var_arg }
    }

    /// Checks arity and per-position types, naming the expected and
    /// actual types on mismatch.
    pub fn validate(&self, function: &str, args: &[Value]) -> Result<(), RuntimeError> {
        let arity_ok = args.len() == self.inputs.len()
            || (args.len() > self.inputs.len() && self.var_arg.is_some());
        if !arity_ok {
            let expected = if self.var_arg.is_some() {
                format!("at least {}", self.inputs.len())
            } else {
                self.inputs.len().to_string()
            };
            return Err(RuntimeError::InvalidArity {
                function: function.to_string(),
                expected,
                actual: args.len(),
            });
        }
        for (position, (arg, expected)) in args.iter().zip(&self.inputs).enumerate() {
            if !expected.matches(arg) {
                return Err(RuntimeError::InvalidType {
                    function: function.to_string(),
                    position,
                    expected: expected.to_string(),
                    actual: arg.type_name().to_string(),
                });
            }
        }
        if let Some(tail) = &self.var_arg {
            for (position, arg) in args.iter().enumerate().skip(self.inputs.len()) {
                if !tail.matches(arg) {
                    return Err(RuntimeError::InvalidType {
                        function: function.to_string(),
                        position,
                        expected: tail.to_string(),
                        actual: arg.type_name().to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// A callable entry in the function registry.
pub trait Function: Send + Sync {
    fn signature(&self) -> &Signature;
    fn invoke(&self, args: &[Value], runtime: &Runtime) -> Result<Value, RuntimeError>;
}

/// A function built from a signature and a closure, for
/// caller-registered extensions.
pub struct CustomFunction {
    signature: Signature,
    body: Box<dyn Fn(&[Value], &Runtime) -> Result<Value, RuntimeError> + Send + Sync>,
}

impl CustomFunction {
    pub fn new(
        signature: Signature,
        body: Box<dyn Fn(&[Value], &Runtime) -> Result<Value, RuntimeError> + Send + Sync>,
    ) -> Self {
        CustomFunction { signature, body }
    }
}

impl Function for CustomFunction {
    fn signature(&self) -> &Signature {
        &self.signature
    }

    fn invoke(&self, args: &[Value], runtime: &Runtime) -> Result<Value, RuntimeError> {
        (self.body)(args, runtime)
    }
}

type NativeFn = fn(&[Value], &Runtime) -> Result<Value, RuntimeError>;

struct Builtin {
    signature: Signature,
    body: NativeFn,
}

impl Function for Builtin {
    fn signature(&self) -> &Signature {
        &self.signature
    }

    fn invoke(&self, args: &[Value], runtime: &Runtime) -> Result<Value, RuntimeError> {
        (self.body)(args, runtime)
    }
}

/// Registers the 26 built-ins into a fresh registry.
pub(crate) fn register_builtins(functions: &mut HashMap<String, Box<dyn Function>>) {
    use ArgType::*;

    let mut add = |name: &str, inputs: Vec<ArgType>, var_arg: Option<ArgType>, body: NativeFn| {
        functions.insert(
            name.to_string(),
            Box::new(Builtin {
                signature: Signature::new(inputs, var_arg),
                body,
            }),
        );
    };

    let numbers = || TypedArray(Box::new(Number));
    let strings = || TypedArray(Box::new(String));

    add("abs", vec![Number], None, builtin_abs);
    add("avg", vec![numbers()], None, builtin_avg);
    add("ceil", vec![Number], None, builtin_ceil);
    add("floor", vec![Number], None, builtin_floor);
    add(
        "contains",
        vec![Union(vec![Array, String]), Any],
        None,
        builtin_contains,
    );
    add("ends_with", vec![String, String], None, builtin_ends_with);
    add(
        "starts_with",
        vec![String, String],
        None,
        builtin_starts_with,
    );
    add("join", vec![String, strings()], None, builtin_join);
    add("keys", vec![Object], None, builtin_keys);
    add("values", vec![Object], None, builtin_values);
    add(
        "length",
        vec![Union(vec![Array, Object, String])],
        None,
        builtin_length,
    );
    add("map", vec![Expref, Array], None, builtin_map);
    add(
        "max",
        vec![Union(vec![strings(), numbers()])],
        None,
        builtin_max,
    );
    add(
        "min",
        vec![Union(vec![strings(), numbers()])],
        None,
        builtin_min,
    );
    add("max_by", vec![Array, Expref], None, builtin_max_by);
    add("min_by", vec![Array, Expref], None, builtin_min_by);
    add("merge", vec![Object], Some(Object), builtin_merge);
    add("not_null", vec![Any], Some(Any), builtin_not_null);
    add(
        "reverse",
        vec![Union(vec![Array, String])],
        None,
        builtin_reverse,
    );
    add(
        "sort",
        vec![Union(vec![numbers(), strings()])],
        None,
        builtin_sort,
    );
    add("sort_by", vec![Array, Expref], None, builtin_sort_by);
    add("sum", vec![numbers()], None, builtin_sum);
    add("to_array", vec![Any], None, builtin_to_array);
    add("to_number", vec![Any], None, builtin_to_number);
    add("to_string", vec![Any], None, builtin_to_string);
    add("type", vec![Any], None, builtin_type);
}

fn builtin_abs(args: &[Value], _: &Runtime) -> Result<Value, RuntimeError> {
    match args[0].as_number() {
        Some(Number::Int(n)) => Ok(Value::Number(Number::Int(n.abs()))),
        Some(Number::Float(n)) => Ok(Value::Number(Number::Float(n.abs()))),
        None => Ok(Value::Null),
    }
}

fn builtin_avg(args: &[Value], _: &Runtime) -> Result<Value, RuntimeError> {
    let items = match args[0].as_array() {
        Some(items) => items,
        None => return Ok(Value::Null),
    };
    if items.is_empty() {
        return Ok(Value::Null);
    }
    let mut sum = 0.0;
    for item in items {
        if let Some(n) = item.as_number() {
            sum += n.as_f64();
        }
    }
    Ok(Value::Number(Number::Float(sum / items.len() as f64)))
}

fn builtin_ceil(args: &[Value], _: &Runtime) -> Result<Value, RuntimeError> {
    match args[0].as_number() {
        Some(Number::Int(n)) => Ok(Value::Number(Number::Int(n))),
        Some(Number::Float(n)) => Ok(Value::Number(Number::Float(n.ceil()))),
        None => Ok(Value::Null),
    }
}

fn builtin_floor(args: &[Value], _: &Runtime) -> Result<Value, RuntimeError> {
    match args[0].as_number() {
        Some(Number::Int(n)) => Ok(Value::Number(Number::Int(n))),
        Some(Number::Float(n)) => Ok(Value::Number(Number::Float(n.floor()))),
        None => Ok(Value::Null),
    }
}

fn builtin_contains(args: &[Value], _: &Runtime) -> Result<Value, RuntimeError> {
    match (&args[0], &args[1]) {
        (Value::Array(items), needle) => Ok(Value::Boolean(items.contains(needle))),
        (Value::String(haystack), Value::String(needle)) => {
            Ok(Value::Boolean(haystack.contains(needle.as_str())))
        }
        // a string subject with a non-string needle has no result
        _ => Ok(Value::Null),
    }
}

fn builtin_ends_with(args: &[Value], _: &Runtime) -> Result<Value, RuntimeError> {
    match (args[0].as_string(), args[1].as_string()) {
        (Some(subject), Some(suffix)) => Ok(Value::Boolean(subject.ends_with(suffix))),
        _ => Ok(Value::Null),
    }
}

fn builtin_starts_with(args: &[Value], _: &Runtime) -> Result<Value, RuntimeError> {
    match (args[0].as_string(), args[1].as_string()) {
        (Some(subject), Some(prefix)) => Ok(Value::Boolean(subject.starts_with(prefix))),
        _ => Ok(Value::Null),
    }
}

fn builtin_join(args: &[Value], _: &Runtime) -> Result<Value, RuntimeError> {
    let glue = match args[0].as_string() {
        Some(glue) => glue,
        None => return Ok(Value::Null),
    };
    let items = match args[1].as_array() {
        Some(items) => items,
        None => return Ok(Value::Null),
    };
    let parts: Vec<&str> = items.iter().filter_map(|item| item.as_string()).collect();
    Ok(Value::String(parts.join(glue)))
}

fn builtin_keys(args: &[Value], _: &Runtime) -> Result<Value, RuntimeError> {
    match args[0].as_object() {
        Some(map) => Ok(Value::Array(
            map.keys().cloned().map(Value::String).collect(),
        )),
        None => Ok(Value::Null),
    }
}

fn builtin_values(args: &[Value], _: &Runtime) -> Result<Value, RuntimeError> {
    match args[0].as_object() {
        Some(map) => Ok(Value::Array(map.values().cloned().collect())),
        None => Ok(Value::Null),
    }
}

fn builtin_length(args: &[Value], _: &Runtime) -> Result<Value, RuntimeError> {
    match &args[0] {
        Value::Array(items) => Ok(Value::Number(Number::Int(items.len() as i64))),
        Value::Object(map) => Ok(Value::Number(Number::Int(map.len() as i64))),
        Value::String(s) => Ok(Value::Number(Number::Int(s.chars().count() as i64))),
        _ => Ok(Value::Null),
    }
}

fn builtin_map(args: &[Value], runtime: &Runtime) -> Result<Value, RuntimeError> {
    let ast = match args[0].as_expref() {
        Some(ast) => ast,
        None => return Ok(Value::Null),
    };
    let items = match args[1].as_array() {
        Some(items) => items,
        None => return Ok(Value::Null),
    };
    let mut results = Vec::with_capacity(items.len());
    for item in items {
        // unlike a projection, map keeps null results
        results.push(interpret(item, ast, runtime)?);
    }
    Ok(Value::Array(results))
}

fn builtin_max(args: &[Value], _: &Runtime) -> Result<Value, RuntimeError> {
    scan_extreme(args, Ordering::Greater)
}

fn builtin_min(args: &[Value], _: &Runtime) -> Result<Value, RuntimeError> {
    scan_extreme(args, Ordering::Less)
}

fn scan_extreme(args: &[Value], keep: Ordering) -> Result<Value, RuntimeError> {
    let items = match args[0].as_array() {
        Some(items) => items,
        None => return Ok(Value::Null),
    };
    let mut best: Option<&Value> = None;
    for item in items {
        match best {
            None => best = Some(item),
            Some(current) => {
                if item.compare(current) == Some(keep) {
                    best = Some(item);
                }
            }
        }
    }
    Ok(best.cloned().unwrap_or(Value::Null))
}

fn builtin_max_by(args: &[Value], runtime: &Runtime) -> Result<Value, RuntimeError> {
    extreme_by("max_by", args, runtime, Ordering::Greater)
}

fn builtin_min_by(args: &[Value], runtime: &Runtime) -> Result<Value, RuntimeError> {
    extreme_by("min_by", args, runtime, Ordering::Less)
}

fn extreme_by(
    function: &str,
    args: &[Value],
    runtime: &Runtime,
    keep: Ordering,
) -> Result<Value, RuntimeError> {
    let items = match args[0].as_array() {
        Some(items) => items,
        None => return Ok(Value::Null),
    };
    let ast = match args[1].as_expref() {
        Some(ast) => ast,
        None => return Ok(Value::Null),
    };
    let mut best: Option<(Value, Value)> = None;
    let mut key_type: Option<&'static str> = None;
    for item in items {
        let key = interpret(item, ast, runtime)?;
        check_key_type(function, &key, &mut key_type)?;
        best = match best {
            None => Some((item.clone(), key)),
            Some((best_item, best_key)) => {
                if key.compare(&best_key) == Some(keep) {
                    Some((item.clone(), key))
                } else {
                    Some((best_item, best_key))
                }
            }
        };
    }
    Ok(best.map(|(item, _)| item).unwrap_or(Value::Null))
}

/// Keyed functions require every key to be a string or a number, and
/// all keys to agree on which.
fn check_key_type(
    function: &str,
    key: &Value,
    seen: &mut Option<&'static str>,
) -> Result<(), RuntimeError> {
    let kind = key.type_name();
    if kind != "number" && kind != "string" {
        return Err(RuntimeError::InvalidReturnType {
            function: function.to_string(),
            expected: "number or string".to_string(),
            actual: kind.to_string(),
        });
    }
    match seen {
        None => {
            *seen = Some(kind);
            Ok(())
        }
        Some(expected) if *expected != kind => Err(RuntimeError::InvalidReturnType {
            function: function.to_string(),
            expected: expected.to_string(),
            actual: kind.to_string(),
        }),
        Some(_) => Ok(()),
    }
}

fn builtin_merge(args: &[Value], _: &Runtime) -> Result<Value, RuntimeError> {
    let mut merged = HashMap::new();
    for arg in args {
        if let Some(map) = arg.as_object() {
            for (key, value) in map {
                merged.insert(key.clone(), value.clone());
            }
        }
    }
    Ok(Value::Object(merged))
}

fn builtin_not_null(args: &[Value], _: &Runtime) -> Result<Value, RuntimeError> {
    Ok(args
        .iter()
        .find(|value| !value.is_null())
        .cloned()
        .unwrap_or(Value::Null))
}

fn builtin_reverse(args: &[Value], _: &Runtime) -> Result<Value, RuntimeError> {
    match &args[0] {
        Value::Array(items) => {
            let mut reversed = items.clone();
            reversed.reverse();
            Ok(Value::Array(reversed))
        }
        Value::String(s) => Ok(Value::String(s.chars().rev().collect())),
        _ => Ok(Value::Null),
    }
}

fn builtin_sort(args: &[Value], _: &Runtime) -> Result<Value, RuntimeError> {
    let items = match args[0].as_array() {
        Some(items) => items,
        None => return Ok(Value::Null),
    };
    let mut sorted = items.clone();
    sorted.sort_by(|a, b| a.compare(b).unwrap_or(Ordering::Equal));
    Ok(Value::Array(sorted))
}

fn builtin_sort_by(args: &[Value], runtime: &Runtime) -> Result<Value, RuntimeError> {
    let items = match args[0].as_array() {
        Some(items) => items,
        None => return Ok(Value::Null),
    };
    let ast = match args[1].as_expref() {
        Some(ast) => ast,
        None => return Ok(Value::Null),
    };
    let mut keyed: Vec<(Value, Value)> = Vec::with_capacity(items.len());
    let mut key_type: Option<&'static str> = None;
    for item in items {
        let key = interpret(item, ast, runtime)?;
        check_key_type("sort_by", &key, &mut key_type)?;
        keyed.push((item.clone(), key));
    }
    keyed.sort_by(|(_, a), (_, b)| a.compare(b).unwrap_or(Ordering::Equal));
    Ok(Value::Array(keyed.into_iter().map(|(item, _)| item).collect()))
}

fn builtin_sum(args: &[Value], _: &Runtime) -> Result<Value, RuntimeError> {
    let items = match args[0].as_array() {
        Some(items) => items,
        None => return Ok(Value::Null),
    };
    let mut int_sum: i64 = 0;
    let mut float_sum: f64 = 0.0;
    let mut has_float = false;
    for item in items {
        match item.as_number() {
            Some(Number::Int(n)) => {
                if has_float {
                    float_sum += n as f64;
                } else {
                    int_sum += n;
                }
            }
            Some(Number::Float(n)) => {
                if !has_float {
                    float_sum = int_sum as f64;
                    has_float = true;
                }
                float_sum += n;
            }
            None => {}
        }
    }
    if has_float {
        Ok(Value::Number(Number::Float(float_sum)))
    } else {
        Ok(Value::Number(Number::Int(int_sum)))
    }
}

fn builtin_to_array(args: &[Value], _: &Runtime) -> Result<Value, RuntimeError> {
    match &args[0] {
        Value::Array(_) => Ok(args[0].clone()),
        other => Ok(Value::Array(vec![other.clone()])),
    }
}

fn builtin_to_number(args: &[Value], _: &Runtime) -> Result<Value, RuntimeError> {
    match &args[0] {
        Value::Number(_) => Ok(args[0].clone()),
        Value::String(s) => {
            if let Ok(n) = s.parse::<i64>() {
                Ok(Value::Number(Number::Int(n)))
            } else {
                match s.parse::<f64>() {
                    Ok(f) if f.is_finite() => Ok(Value::Number(Number::Float(f))),
                    _ => Ok(Value::Null),
                }
            }
        }
        _ => Ok(Value::Null),
    }
}

fn builtin_to_string(args: &[Value], _: &Runtime) -> Result<Value, RuntimeError> {
    match &args[0] {
        Value::String(_) => Ok(args[0].clone()),
        other => Ok(Value::String(to_json(other))),
    }
}

fn builtin_type(args: &[Value], _: &Runtime) -> Result<Value, RuntimeError> {
    Ok(Value::String(args[0].type_name().to_string()))
}
