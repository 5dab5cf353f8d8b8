// tests/integration_tests.rs
//
// End-to-end scenarios through the public compile/search surface,
// plus the invariants the engine guarantees.

use std::sync::Arc;
use std::thread;

use jmesquery::errors::{CompileError, RuntimeError};
use jmesquery::{compile, search, ArgType, CustomFunction, Number, Runtime, Signature, Value};
use serde_json::json;

fn eval(expression: &str, doc: serde_json::Value) -> Value {
    search(expression, &Value::from(doc)).expect("expression should evaluate")
}

// ============================================================================
// End-to-end scenarios
// ============================================================================

#[test]
fn scenario_nested_field_access() {
    let result = eval("a.b", json!({"a": {"b": "hello"}}));
    assert_eq!(result, Value::from(json!("hello")));
}

#[test]
fn scenario_projection_over_people() {
    let doc = json!({"people": [
        {"first": "John", "last": "Smith"},
        {"first": "Joan", "last": "Smyth"}
    ]});
    assert_eq!(
        eval("people[*].first", doc),
        Value::from(json!(["John", "Joan"]))
    );
}

#[test]
fn scenario_backward_slice() {
    let doc = json!({"array": [0, 1, 2, 3, 4, 5, 6, 7, 8]});
    assert_eq!(
        eval("array[6:2:-1]", doc),
        Value::from(json!([6, 5, 4, 3]))
    );
}

#[test]
fn scenario_filter_by_length() {
    let doc = json!({"array": ["test", "longer"]});
    assert_eq!(
        eval("array[?length(@) > `5`]", doc),
        Value::from(json!(["longer"]))
    );
}

#[test]
fn scenario_max_by_then_field() {
    let doc = json!([
        {"name": "john", "age": 75},
        {"name": "jane", "age": 78}
    ]);
    assert_eq!(eval("max_by(@, &age).name", doc), Value::from(json!("jane")));
}

#[test]
fn scenario_merge_overwrites_left_to_right() {
    let doc = json!({"a": {"a": 1, "b": 2}, "b": {"b": 3, "c": 4}});
    assert_eq!(
        eval("merge(a, b)", doc),
        Value::from(json!({"a": 1, "b": 3, "c": 4}))
    );
}

#[test]
fn scenario_wildcard_filter_unspecified_order() {
    // object values surface in unspecified order, so both arrangements
    // are acceptable
    let doc = json!({"foo": [[0, 1]], "bar": [[2, 3]]});
    let result = eval("*[?[0] == `0`]", doc);
    let one_way = Value::from(json!([[[0, 1]], []]));
    let other_way = Value::from(json!([[], [[0, 1]]]));
    assert!(
        result == one_way || result == other_way,
        "unexpected result: {}",
        result
    );
}

#[test]
fn scenario_error_surfaces() {
    assert!(matches!(
        compile("="),
        Err(CompileError::BareEquals { .. })
    ));

    let compiled = compile("unknown(@)").unwrap();
    let err = compiled.search(&Value::Null).unwrap_err();
    assert_eq!(err.to_string(), "unknown function name 'unknown'");
}

// ============================================================================
// Invariants
// ============================================================================

#[test]
fn compile_is_deterministic() {
    let first = compile("foo[*].bar | [0]").unwrap();
    let second = compile("foo[*].bar | [0]").unwrap();
    assert_eq!(first.ast(), second.ast());
}

#[test]
fn negative_index_law() {
    let doc = json!([10, 20, 30, 40]);
    for i in 0..4i64 {
        let positive = eval(&format!("[{}]", i), doc.clone());
        let negative = eval(&format!("[{}]", i - 4), doc.clone());
        assert_eq!(positive, negative);
    }
}

#[test]
fn simple_slice_law() {
    let doc = json!([0, 1, 2, 3, 4]);
    assert_eq!(eval("[1:3]", doc.clone()), Value::from(json!([1, 2])));
    assert_eq!(eval("[-100:100]", doc.clone()), eval("[:]", doc));
}

#[test]
fn projection_identity_law() {
    let doc = json!([1, "two", true, {"three": 3}]);
    assert_eq!(eval("[*]", doc.clone()), Value::from(doc));
}

#[test]
fn reverse_is_an_involution() {
    let doc = json!([1, 2, 3, "x"]);
    assert_eq!(eval("reverse(reverse(@))", doc.clone()), Value::from(doc));
    assert_eq!(
        eval("reverse(reverse(@))", json!("palindrome")),
        Value::from(json!("palindrome"))
    );
}

#[test]
fn sort_is_idempotent() {
    let doc = json!([3, 1, 2, 2]);
    assert_eq!(eval("sort(sort(@))", doc.clone()), eval("sort(@)", doc));
}

#[test]
fn merge_identity_laws() {
    let doc = json!({"a": 1, "b": [2]});
    assert_eq!(eval("merge(@, `{}`)", doc.clone()), Value::from(doc.clone()));
    assert_eq!(eval("merge(`{}`, @)", doc.clone()), Value::from(doc));
}

#[test]
fn boundary_behaviours() {
    assert_eq!(eval("avg(`[]`)", json!({})), Value::Null);
    assert_eq!(eval("sum(`[]`)", json!({})), Value::Number(Number::Int(0)));
    assert_eq!(eval("max(`[]`)", json!({})), Value::Null);
    assert_eq!(eval("min(`[]`)", json!({})), Value::Null);
    assert_eq!(eval("sort(`[]`)", json!({})), Value::from(json!([])));
    assert_eq!(eval("keys(`{}`)", json!({})), Value::from(json!([])));
    assert_eq!(eval("values(`{}`)", json!({})), Value::from(json!([])));
    // empty collections are falsy
    assert_eq!(eval("!`{}`", json!({})), Value::from(json!(true)));
    assert_eq!(eval("!`[]`", json!({})), Value::from(json!(true)));
}

#[test]
fn mistyped_access_yields_null_not_error() {
    assert_eq!(eval("foo.bar", json!({"foo": 5})), Value::Null);
    assert_eq!(eval("foo[3]", json!({"foo": [1]})), Value::Null);
    assert_eq!(eval("foo[*]", json!({"foo": "s"})), Value::Null);
    assert_eq!(eval("`1` < `\"s\"`", json!({})), Value::Null);
}

// ============================================================================
// Runtime extension
// ============================================================================

#[test]
fn register_custom_function() {
    let mut runtime = Runtime::new();
    runtime.register(
        "double",
        Box::new(CustomFunction::new(
            Signature::new(vec![ArgType::Number], None),
            Box::new(|args, _| {
                let n = args[0].as_number().map(|n| n.as_f64()).unwrap_or(0.0);
                Ok(Value::Number(Number::Float(n * 2.0)))
            }),
        )),
    );

    let compiled = compile("double(foo)").unwrap();
    let doc = Value::from(json!({"foo": 21}));
    assert_eq!(
        compiled.search_with(&doc, &runtime).unwrap(),
        Value::from(json!(42.0))
    );

    // the custom function still goes through the signature gate
    let err = compiled
        .search_with(&Value::from(json!({"foo": "x"})), &runtime)
        .unwrap_err();
    assert!(matches!(err, RuntimeError::InvalidType { .. }));
}

#[test]
fn custom_functions_do_not_leak_into_default_runtime() {
    let mut runtime = Runtime::new();
    runtime.register(
        "nothing",
        Box::new(CustomFunction::new(
            Signature::new(vec![], None),
            Box::new(|_, _| Ok(Value::Null)),
        )),
    );

    let compiled = compile("nothing()").unwrap();
    assert!(compiled.search_with(&Value::Null, &runtime).is_ok());
    assert!(matches!(
        compiled.search(&Value::Null),
        Err(RuntimeError::UnknownFunction(_))
    ));
}

// ============================================================================
// Concurrency
// ============================================================================

#[test]
fn compiled_expression_is_shareable_across_threads() {
    let compiled = Arc::new(compile("people[*].first").unwrap());

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let compiled = Arc::clone(&compiled);
            thread::spawn(move || {
                let doc = Value::from(json!({"people": [{"first": format!("p{}", i)}]}));
                compiled.search(&doc).expect("search should succeed")
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let result = handle.join().expect("thread should not panic");
        assert_eq!(result, Value::from(json!([format!("p{}", i)])));
    }
}

// ============================================================================
// Output rendering
// ============================================================================

#[test]
fn results_render_as_json() {
    let result = eval("{b: `2`, a: `1`}", json!({}));
    assert_eq!(result.json(), r#"{"a":1,"b":2}"#);
    assert_eq!(
        jmesquery::to_json_pretty(&result),
        "{\n  \"a\": 1,\n  \"b\": 2\n}"
    );
}
