use thiserror::Error;

use crate::ast::Token;

/// Errors that can occur while turning expression text into an AST.
///
/// Every lexer and parser failure surfaces as one of these variants;
/// a successfully compiled expression can no longer fail at compile time.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    /// A character that begins no token
    #[error("unexpected character '{ch}' at position {position}")]
    UnexpectedCharacter { ch: char, position: usize },

    /// A `"`, `'`, or backtick without a matching closer
    #[error("unterminated {delimiter} delimiter starting at position {position}")]
    UnterminatedDelimiter { delimiter: char, position: usize },

    /// A number token that does not fit a signed 64-bit integer
    #[error("invalid number '{text}' at position {position}")]
    InvalidNumber { text: String, position: usize },

    /// A backtick literal or quoted identifier whose body is not valid JSON
    #[error("invalid literal JSON at position {position}: {message}")]
    InvalidLiteral { message: String, position: usize },

    /// `=` not followed by a second `=`
    #[error("'=' must be followed by '=' at position {position}")]
    BareEquals { position: usize },

    /// Parser found the wrong token
    #[error("expected {expected}, got {got:?}")]
    UnexpectedToken { expected: String, got: Token },

    /// Quoted identifiers cannot name functions
    #[error("quoted identifier \"{0}\" cannot be used as a function name")]
    QuotedFunctionName(String),

    /// `[::0]` and friends
    #[error("slice step cannot be 0")]
    ZeroSliceStep,

    /// Input continued past a complete expression
    #[error("unexpected trailing token {0:?}")]
    TrailingToken(Token),
}

/// Errors that can occur while evaluating a compiled expression.
///
/// Only function dispatch produces these; wrong-typed field access,
/// out-of-range indexes, and mis-typed comparisons all evaluate to null.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    #[error("unknown function name '{0}'")]
    UnknownFunction(String),

    #[error("{function}() expects {expected} arguments, got {actual}")]
    InvalidArity {
        function: String,
        expected: String,
        actual: usize,
    },

    /// An argument failed its signature type check. Positions are zero-based.
    #[error("{function}() argument {position} must be {expected}, got {actual}")]
    InvalidType {
        function: String,
        position: usize,
        expected: String,
        actual: String,
    },

    /// An expression reference handed to a higher-order function produced a
    /// value the function cannot key on (wrong type, or mixed key types).
    #[error("{function}() expression returned {actual}, expected {expected}")]
    InvalidReturnType {
        function: String,
        expected: String,
        actual: String,
    },
}

/// Either phase of the compile-then-search pipeline can fail.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}
