// tests/lexer_tests.rs

use jmesquery::errors::CompileError;
use jmesquery::lexer::tokenize;
use jmesquery::{Number, Token, Value};

// ============================================================================
// Identifiers
// ============================================================================

#[test]
fn test_identifiers() {
    let tokens = tokenize("foo _bar baz2").unwrap();
    assert_eq!(
        tokens,
        vec![
            Token::Identifier("foo".to_string()),
            Token::Identifier("_bar".to_string()),
            Token::Identifier("baz2".to_string()),
            Token::Eof,
        ]
    );
}

#[test]
fn test_quoted_identifier() {
    let tokens = tokenize("\"foo bar\"").unwrap();
    assert_eq!(
        tokens,
        vec![Token::QuotedIdentifier("foo bar".to_string()), Token::Eof]
    );
}

#[test]
fn test_quoted_identifier_json_escapes() {
    let tokens = tokenize("\"a\\nb\"").unwrap();
    assert_eq!(
        tokens,
        vec![Token::QuotedIdentifier("a\nb".to_string()), Token::Eof]
    );

    let tokens = tokenize("\"\\u2713\"").unwrap();
    assert_eq!(
        tokens,
        vec![Token::QuotedIdentifier("✓".to_string()), Token::Eof]
    );
}

#[test]
fn test_quoted_identifier_with_escaped_quote() {
    let tokens = tokenize("\"a\\\"b\"").unwrap();
    assert_eq!(
        tokens,
        vec![Token::QuotedIdentifier("a\"b".to_string()), Token::Eof]
    );
}

// ============================================================================
// Strings and Literals
// ============================================================================

#[test]
fn test_raw_string() {
    let tokens = tokenize("'foo bar'").unwrap();
    assert_eq!(
        tokens,
        vec![
            Token::Literal(Value::String("foo bar".to_string())),
            Token::Eof,
        ]
    );
}

#[test]
fn test_raw_string_escaped_quote() {
    let tokens = tokenize(r"'it\'s'").unwrap();
    assert_eq!(
        tokens,
        vec![Token::Literal(Value::String("it's".to_string())), Token::Eof]
    );
}

#[test]
fn test_raw_string_keeps_other_backslashes() {
    let tokens = tokenize(r"'a\nb'").unwrap();
    assert_eq!(
        tokens,
        vec![
            Token::Literal(Value::String("a\\nb".to_string())),
            Token::Eof,
        ]
    );
}

#[test]
fn test_literal_scalars() {
    let tokens = tokenize("`1` `-1.5` `true` `null` `\"s\"`").unwrap();
    assert_eq!(
        tokens,
        vec![
            Token::Literal(Value::Number(Number::Int(1))),
            Token::Literal(Value::Number(Number::Float(-1.5))),
            Token::Literal(Value::Boolean(true)),
            Token::Literal(Value::Null),
            Token::Literal(Value::String("s".to_string())),
            Token::Eof,
        ]
    );
}

#[test]
fn test_literal_array_and_object() {
    let tokens = tokenize(r#"`[1, 2]`"#).unwrap();
    assert_eq!(
        tokens,
        vec![
            Token::Literal(Value::Array(vec![
                Value::Number(Number::Int(1)),
                Value::Number(Number::Int(2)),
            ])),
            Token::Eof,
        ]
    );

    let tokens = tokenize(r#"`{"a": 1}`"#).unwrap();
    match &tokens[0] {
        Token::Literal(Value::Object(map)) => {
            assert_eq!(map.get("a"), Some(&Value::Number(Number::Int(1))));
        }
        other => panic!("expected an object literal, got {:?}", other),
    }
}

#[test]
fn test_literal_escaped_backtick() {
    let tokens = tokenize("`\"a\\`b\"`").unwrap();
    assert_eq!(
        tokens,
        vec![Token::Literal(Value::String("a`b".to_string())), Token::Eof]
    );
}

#[test]
fn test_literal_bad_json() {
    assert!(matches!(
        tokenize("`{bad`"),
        Err(CompileError::InvalidLiteral { .. })
    ));
}

// ============================================================================
// Numbers
// ============================================================================

#[test]
fn test_numbers() {
    let tokens = tokenize("[42] [-7]").unwrap();
    assert_eq!(
        tokens,
        vec![
            Token::Lbracket,
            Token::Number(42),
            Token::Rbracket,
            Token::Lbracket,
            Token::Number(-7),
            Token::Rbracket,
            Token::Eof,
        ]
    );
}

#[test]
fn test_number_overflow() {
    assert!(matches!(
        tokenize("[9223372036854775808]"),
        Err(CompileError::InvalidNumber { .. })
    ));
}

#[test]
fn test_bare_minus() {
    assert!(matches!(
        tokenize("foo-bar"),
        Err(CompileError::UnexpectedCharacter { ch: '-', .. })
    ));
}

// ============================================================================
// Punctuators
// ============================================================================

#[test]
fn test_bracket_forms() {
    let tokens = tokenize("[] [? [ ]").unwrap();
    assert_eq!(
        tokens,
        vec![
            Token::Flatten,
            Token::Filter,
            Token::Lbracket,
            Token::Rbracket,
            Token::Eof,
        ]
    );
}

#[test]
fn test_pipe_and_or() {
    let tokens = tokenize("| || & &&").unwrap();
    assert_eq!(
        tokens,
        vec![
            Token::Pipe,
            Token::Or,
            Token::Ampersand,
            Token::And,
            Token::Eof,
        ]
    );
}

#[test]
fn test_comparators() {
    let tokens = tokenize("== != < <= > >= !").unwrap();
    assert_eq!(
        tokens,
        vec![
            Token::Eq,
            Token::Ne,
            Token::Lt,
            Token::Lte,
            Token::Gt,
            Token::Gte,
            Token::Not,
            Token::Eof,
        ]
    );
}

#[test]
fn test_remaining_punctuators() {
    let tokens = tokenize(". * @ ( ) { } , :").unwrap();
    assert_eq!(
        tokens,
        vec![
            Token::Dot,
            Token::Star,
            Token::At,
            Token::Lparen,
            Token::Rparen,
            Token::Lbrace,
            Token::Rbrace,
            Token::Comma,
            Token::Colon,
            Token::Eof,
        ]
    );
}

#[test]
fn test_whitespace_is_discarded() {
    let tokens = tokenize(" \t\r\n foo \n").unwrap();
    assert_eq!(
        tokens,
        vec![Token::Identifier("foo".to_string()), Token::Eof]
    );
}

// ============================================================================
// Failure modes
// ============================================================================

#[test]
fn test_bare_equals() {
    assert_eq!(
        tokenize("a = b"),
        Err(CompileError::BareEquals { position: 2 })
    );
}

#[test]
fn test_unterminated_delimiters() {
    assert_eq!(
        tokenize("\"abc"),
        Err(CompileError::UnterminatedDelimiter {
            delimiter: '"',
            position: 0,
        })
    );
    assert_eq!(
        tokenize("'abc"),
        Err(CompileError::UnterminatedDelimiter {
            delimiter: '\'',
            position: 0,
        })
    );
    assert_eq!(
        tokenize("`[1"),
        Err(CompileError::UnterminatedDelimiter {
            delimiter: '`',
            position: 0,
        })
    );
}

#[test]
fn test_invalid_character() {
    assert!(matches!(
        tokenize("foo # bar"),
        Err(CompileError::UnexpectedCharacter { ch: '#', .. })
    ));
}
