use crate::ast::Comparator;
use crate::value::Value;

/// Abstract Syntax Tree node representing a parsed expression.
///
/// The AST is immutable once the parser produces it; evaluation never
/// mutates a node, so a compiled expression can be shared across
/// threads and evaluated concurrently against distinct documents.
#[derive(Debug, Clone, PartialEq)]
pub enum Ast {
    /// The current value (`@`, or an elided projection tail)
    Identity,

    /// Field access by name
    ///
    /// # Example
    /// ```text
    /// foo
    /// "quoted name"
    /// ```
    Field(String),

    /// Array index access, negative counting from the end
    ///
    /// # Example
    /// ```text
    /// [0]
    /// [-1]
    /// ```
    Index(i64),

    /// A literal value from a backtick block or raw string
    Literal(Value),

    /// `&expr`: the inner expression captured as a first-class value
    Expref(Box<Ast>),

    /// `!expr`
    Not(Box<Ast>),

    /// Single-level array flatten (`[]`)
    Flatten(Box<Ast>),

    /// The values of an object as an array; null for anything else.
    /// Produced for `*` wildcards.
    ObjectValues(Box<Ast>),

    /// Step-aware array slice. The parser guarantees `step != 0`.
    ///
    /// # Example
    /// ```text
    /// [6:2:-1]
    /// [::2]
    /// ```
    Slice {
        start: Option<i64>,
        stop: Option<i64>,
        step: i64,
    },

    /// Evaluate `lhs`, then evaluate `rhs` against the result
    ///
    /// # Example
    /// ```text
    /// a.b
    /// a | b
    /// ```
    Subexpr { lhs: Box<Ast>, rhs: Box<Ast> },

    /// `||`: the left value if truthy, otherwise the right value
    Or { lhs: Box<Ast>, rhs: Box<Ast> },

    /// `&&`: the left value if falsy, otherwise the right value
    And { lhs: Box<Ast>, rhs: Box<Ast> },

    /// A comparison; evaluates to a boolean, or null when the operands
    /// have no defined ordering
    Comparison {
        comparator: Comparator,
        lhs: Box<Ast>,
        rhs: Box<Ast>,
    },

    /// Filter arm: `then` when the predicate is truthy, null otherwise
    Condition { predicate: Box<Ast>, then: Box<Ast> },

    /// Apply `rhs` to each element of the array produced by `lhs`,
    /// dropping null results; null when `lhs` is not an array
    Projection { lhs: Box<Ast>, rhs: Box<Ast> },

    /// Multi-select list: each item evaluated against the current value
    ///
    /// # Example
    /// ```text
    /// [name, age]
    /// ```
    MultiList(Vec<Ast>),

    /// Multi-select hash. Keys are unique at construction; a duplicate
    /// key in the source keeps its last occurrence.
    ///
    /// # Example
    /// ```text
    /// {name: name, years: age}
    /// ```
    MultiHash(Vec<(String, Ast)>),

    /// Function call; arguments are evaluated left to right before
    /// dispatch through the runtime's registry
    Function { name: String, args: Vec<Ast> },
}
