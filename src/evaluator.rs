use std::cmp::Ordering;
use std::collections::HashMap;

use crate::ast::{Ast, Comparator};
use crate::errors::RuntimeError;
use crate::runtime::Runtime;
use crate::value::Value;

/// Evaluates an AST against a value, recursing structurally.
///
/// Evaluation is total: every expression yields a value or a
/// [`RuntimeError`] from function dispatch. Wrong-typed access,
/// out-of-range indexes, non-array projection subjects, and mis-typed
/// comparisons all yield null, which projections then drop.
pub fn interpret(data: &Value, ast: &Ast, runtime: &Runtime) -> Result<Value, RuntimeError> {
    match ast {
        Ast::Identity => Ok(data.clone()),
        Ast::Literal(value) => Ok(value.clone()),
        Ast::Field(name) => Ok(data.get_field(name)),
        Ast::Index(index) => Ok(data.get_index(*index)),
        Ast::Subexpr { lhs, rhs } => {
            let left = interpret(data, lhs, runtime)?;
            interpret(&left, rhs, runtime)
        }
        Ast::Or { lhs, rhs } => {
            let left = interpret(data, lhs, runtime)?;
            if left.is_truthy() {
                Ok(left)
            } else {
                interpret(data, rhs, runtime)
            }
        }
        Ast::And { lhs, rhs } => {
            let left = interpret(data, lhs, runtime)?;
            if left.is_truthy() {
                interpret(data, rhs, runtime)
            } else {
                Ok(left)
            }
        }
        Ast::Not(inner) => {
            let value = interpret(data, inner, runtime)?;
            Ok(Value::Boolean(!value.is_truthy()))
        }
        Ast::Condition { predicate, then } => {
            let outcome = interpret(data, predicate, runtime)?;
            if outcome.is_truthy() {
                interpret(data, then, runtime)
            } else {
                Ok(Value::Null)
            }
        }
        Ast::Comparison {
            comparator,
            lhs,
            rhs,
        } => {
            let left = interpret(data, lhs, runtime)?;
            let right = interpret(data, rhs, runtime)?;
            Ok(compare(*comparator, &left, &right))
        }
        Ast::ObjectValues(inner) => match interpret(data, inner, runtime)? {
            Value::Object(map) => Ok(Value::Array(map.into_values().collect())),
            _ => Ok(Value::Null),
        },
        Ast::Projection { lhs, rhs } => match interpret(data, lhs, runtime)? {
            Value::Array(items) => {
                let mut results = Vec::new();
                for item in &items {
                    let mapped = interpret(item, rhs, runtime)?;
                    if mapped != Value::Null {
                        results.push(mapped);
                    }
                }
                Ok(Value::Array(results))
            }
            _ => Ok(Value::Null),
        },
        Ast::Flatten(inner) => match interpret(data, inner, runtime)? {
            Value::Array(items) => {
                let mut flat = Vec::new();
                for item in items {
                    match item {
                        Value::Array(nested) => flat.extend(nested),
                        other => flat.push(other),
                    }
                }
                Ok(Value::Array(flat))
            }
            _ => Ok(Value::Null),
        },
        Ast::MultiList(items) => {
            if data.is_null() {
                return Ok(Value::Null);
            }
            let mut results = Vec::with_capacity(items.len());
            for item in items {
                results.push(interpret(data, item, runtime)?);
            }
            Ok(Value::Array(results))
        }
        Ast::MultiHash(pairs) => {
            if data.is_null() {
                return Ok(Value::Null);
            }
            let mut map = HashMap::with_capacity(pairs.len());
            for (key, expr) in pairs {
                map.insert(key.clone(), interpret(data, expr, runtime)?);
            }
            Ok(Value::Object(map))
        }
        Ast::Slice { start, stop, step } => match data.slice(*start, *stop, *step) {
            Some(items) => Ok(Value::Array(items)),
            None => Ok(Value::Null),
        },
        Ast::Expref(inner) => Ok(Value::Expref(inner.clone())),
        Ast::Function { name, args } => {
            let mut evaluated = Vec::with_capacity(args.len());
            for arg in args {
                evaluated.push(interpret(data, arg, runtime)?);
            }
            runtime.invoke(name, &evaluated)
        }
    }
}

fn compare(comparator: Comparator, left: &Value, right: &Value) -> Value {
    match comparator {
        Comparator::Eq => Value::Boolean(left == right),
        Comparator::Ne => Value::Boolean(left != right),
        Comparator::Lt | Comparator::Lte | Comparator::Gt | Comparator::Gte => {
            match left.compare(right) {
                Some(order) => Value::Boolean(match comparator {
                    Comparator::Lt => order == Ordering::Less,
                    Comparator::Lte => order != Ordering::Greater,
                    Comparator::Gt => order == Ordering::Greater,
                    _ => order != Ordering::Less,
                }),
                None => Value::Null,
            }
        }
    }
}
