use super::value::ObjectKind;
use crate::expression::{InfixOperator, PrefixOperator};
use compact_str::CompactString;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RuntimeError {
    #[error("identifier not found: {0}")]
    IdentifierNotFound(CompactString),
    #[error("unknown operator: {operator}{operand}")]
    UnknownPrefixOperator {
        operator: PrefixOperator,
        operand: ObjectKind,
    },
    #[error("unknown operator: {lhs} {operator} {rhs}")]
    UnknownInfixOperator {
        lhs: ObjectKind,
        operator: InfixOperator,
        rhs: ObjectKind,
    },
    #[error("type mismatch: {lhs} {operator} {rhs}")]
    TypeMismatch {
        lhs: ObjectKind,
        operator: InfixOperator,
        rhs: ObjectKind,
    },
    #[error("division by zero")]
    DivisionByZero,
    #[error("negative exponent: {0}")]
    NegativeExponent(i64),
    #[error("integer overflow: {lhs} {operator} {rhs}")]
    Overflow {
        lhs: ObjectKind,
        operator: InfixOperator,
        rhs: ObjectKind,
    },
    #[error("not a function: {0}")]
    NotCallable(ObjectKind),
    #[error("wrong number of arguments: want={expected}, got={actual}")]
    ArgumentCount { expected: usize, actual: usize },
    #[error("index operator not supported: {0}")]
    IndexNotSupported(ObjectKind),
    #[error("wrong number of arguments to `{name}`: got {actual}, want {expected}")]
    BuiltinArgumentCount {
        name: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("argument {position} to `{name}` must be {expected}, got {actual}")]
    BuiltinArgumentType {
        name: &'static str,
        position: usize,
        expected: &'static str,
        actual: ObjectKind,
    },
    #[error("`sort` only supports arrays of integers, got {0}")]
    SortNonInteger(ObjectKind),
    #[error("cannot `{0}` from an empty array")]
    EmptyArray(&'static str),
    #[error("index {index} out of range for `insert` into array of length {length}")]
    InsertOutOfRange { index: i64, length: usize },
    #[error("stack overflow: call depth exceeded {0}")]
    StackOverflow(usize),
}

impl RuntimeError {
    pub fn code(&self) -> &'static str {
        match self {
            RuntimeError::IdentifierNotFound(_) => "RT001",
            RuntimeError::UnknownPrefixOperator { .. } => "RT002",
            RuntimeError::UnknownInfixOperator { .. } => "RT003",
            RuntimeError::TypeMismatch { .. } => "RT004",
            RuntimeError::DivisionByZero => "RT005",
            RuntimeError::NegativeExponent(_) => "RT006",
            RuntimeError::Overflow { .. } => "RT007",
            RuntimeError::NotCallable(_) => "RT008",
            RuntimeError::ArgumentCount { .. } => "RT009",
            RuntimeError::IndexNotSupported(_) => "RT010",
            RuntimeError::BuiltinArgumentCount { .. } => "RT011",
            RuntimeError::BuiltinArgumentType { .. } => "RT012",
            RuntimeError::SortNonInteger(_) => "RT013",
            RuntimeError::EmptyArray(_) => "RT014",
            RuntimeError::InsertOutOfRange { .. } => "RT015",
            RuntimeError::StackOverflow(_) => "RT016",
        }
    }
}
