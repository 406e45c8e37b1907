//! Live query parser backed by [`crate::promql`].

use crate::error::SourceError;
use crate::ports::QueryParser;
use crate::promql::{self, Expr};

/// Parses PromQL expressions.
#[derive(Debug, Clone, Copy, Default)]
pub struct PromqlParser;

impl QueryParser for PromqlParser {
    fn parse_expr(&self, query: &str) -> Result<Expr, SourceError> {
        Ok(promql::parse(query)?)
    }
}
