/// Comparison operator in a `Comparison` node.
///
/// Equality and inequality are defined for every pair of values; the
/// ordered comparators are defined only for number pairs and string
/// pairs, and evaluate to null anywhere else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
}
