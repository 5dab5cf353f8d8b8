pub mod ast;
pub mod errors;
pub mod evaluator;
pub mod functions;
pub mod lexer;
pub mod output;
pub mod parser;
pub mod runtime;
pub mod value;

pub use ast::{Ast, Comparator, Token};
pub use errors::{CompileError, Error, RuntimeError};
pub use functions::{ArgType, CustomFunction, Function, Signature};
pub use output::{to_json, to_json_pretty};
pub use runtime::Runtime;
pub use value::{Number, Value};

/// A compiled expression: the source text plus its immutable AST.
///
/// Compiling is the expensive half of a query; a compiled expression
/// can be reused and shared across threads, with each `search` run
/// against a distinct document.
///
/// # Examples
///
/// ```
/// use jmesquery::{compile, Value};
///
/// let expr = compile("a.b").unwrap();
/// let doc = Value::from(serde_json::json!({"a": {"b": "hello"}}));
/// let result = expr.search(&doc).unwrap();
/// assert_eq!(result, Value::String("hello".to_string()));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    source: String,
    ast: Ast,
}

impl Expression {
    /// Evaluates against a document using the shared default runtime.
    pub fn search(&self, data: &Value) -> Result<Value, RuntimeError> {
        evaluator::interpret(data, &self.ast, runtime::default_runtime())
    }

    /// Evaluates against a document using a caller-supplied runtime,
    /// typically one extended with [`Runtime::register`].
    pub fn search_with(&self, data: &Value, runtime: &Runtime) -> Result<Value, RuntimeError> {
        evaluator::interpret(data, &self.ast, runtime)
    }

    /// The original expression text.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// The parsed tree.
    pub fn ast(&self) -> &Ast {
        &self.ast
    }
}

impl std::fmt::Display for Expression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.source)
    }
}

/// Compiles an expression into a reusable [`Expression`].
pub fn compile(expression: &str) -> Result<Expression, CompileError> {
    let ast = parser::parse(expression)?;
    Ok(Expression {
        source: expression.to_string(),
        ast,
    })
}

/// Compiles and evaluates in one step.
pub fn search(expression: &str, data: &Value) -> Result<Value, Error> {
    let compiled = compile(expression)?;
    Ok(compiled.search(data)?)
}
