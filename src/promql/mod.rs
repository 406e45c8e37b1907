//! PromQL expression parsing.
//!
//! Covers the expression language as used in objective queries: selectors,
//! range selectors and subqueries, modifiers, function calls, aggregations,
//! and binary operators with Prometheus precedence. Type checking of
//! function arguments is left to Prometheus.

mod ast;
mod lexer;
mod parser;

use thiserror::Error;

pub use ast::{
    AggregateExpr, AtModifier, BinaryExpr, BinaryOp, Call, Expr, GroupSide, Grouping, MatchType,
    Matcher, MatrixSelector, Offset, SubqueryExpr, UnaryExpr, UnaryOp, VectorMatching,
    VectorSelector, METRIC_NAME_LABEL,
};
pub use parser::parse;

/// A PromQL syntax error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("parse error at char {}: {message}", .position + 1)]
pub struct ParseError {
    /// Byte offset of the offending input.
    pub position: usize,
    /// What went wrong.
    pub message: String,
}

impl ParseError {
    pub(crate) fn new(position: usize, message: impl Into<String>) -> Self {
        Self { position, message: message.into() }
    }
}
