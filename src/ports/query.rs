//! Metric query parser port.

use crate::error::SourceError;
use crate::promql::Expr;

/// Parses metric query expressions into a syntax tree.
///
/// Callers use [`Expr::as_vector_selector`] to tell a bare selector from a
/// compound expression.
pub trait QueryParser: Send + Sync {
    /// Parses `query` into an expression tree.
    ///
    /// # Errors
    ///
    /// Returns an error if `query` is not a valid expression.
    fn parse_expr(&self, query: &str) -> Result<Expr, SourceError>;
}
