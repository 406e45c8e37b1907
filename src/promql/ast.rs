//! PromQL syntax tree.

use std::fmt;
use std::time::Duration;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Label name carrying the metric name.
pub const METRIC_NAME_LABEL: &str = "__name__";

/// A parsed PromQL expression.
#[derive(Debug, Clone)]
pub enum Expr {
    /// A float literal, e.g. `0.5` or `Inf`.
    NumberLiteral(f64),
    /// A string literal.
    StringLiteral(String),
    /// A bare instant vector selector, e.g. `up{job="api"}`.
    VectorSelector(VectorSelector),
    /// A range vector selector, e.g. `up[5m]`.
    MatrixSelector(MatrixSelector),
    /// A subquery, e.g. `rate(x[5m])[1h:1m]`.
    Subquery(SubqueryExpr),
    /// A function call, e.g. `rate(x[5m])`.
    Call(Call),
    /// An aggregation, e.g. `sum by (job) (x)`.
    Aggregate(AggregateExpr),
    /// A unary `+` or `-`.
    Unary(UnaryExpr),
    /// A binary operation.
    Binary(BinaryExpr),
    /// A parenthesized expression.
    Paren(Box<Expr>),
}

impl Expr {
    /// Returns the selector when this expression is exactly one bare
    /// vector selector, and `None` for anything compound.
    #[must_use]
    pub fn as_vector_selector(&self) -> Option<&VectorSelector> {
        match self {
            Self::VectorSelector(vs) => Some(vs),
            _ => None,
        }
    }

    /// Short name of the node type, used in error messages.
    #[must_use]
    pub fn node_name(&self) -> &'static str {
        match self {
            Self::NumberLiteral(_) => "number literal",
            Self::StringLiteral(_) => "string literal",
            Self::VectorSelector(_) => "vector selector",
            Self::MatrixSelector(_) => "matrix selector",
            Self::Subquery(_) => "subquery",
            Self::Call(_) => "function call",
            Self::Aggregate(_) => "aggregation",
            Self::Unary(_) => "unary expression",
            Self::Binary(_) => "binary expression",
            Self::Paren(_) => "parenthesized expression",
        }
    }
}

/// How a label matcher compares values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchType {
    /// `=`
    #[serde(rename = "=")]
    Equal,
    /// `!=`
    #[serde(rename = "!=")]
    NotEqual,
    /// `=~`
    #[serde(rename = "=~")]
    Regexp,
    /// `!~`
    #[serde(rename = "!~")]
    NotRegexp,
}

impl MatchType {
    /// The PromQL operator.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Equal => "=",
            Self::NotEqual => "!=",
            Self::Regexp => "=~",
            Self::NotRegexp => "!~",
        }
    }
}

impl fmt::Display for MatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A label matcher as written in a selector.
///
/// Regex matchers carry their compiled, fully anchored pattern.
#[derive(Debug, Clone)]
pub struct Matcher {
    /// Label name.
    pub name: String,
    /// Comparison.
    pub match_type: MatchType,
    /// Right-hand side as written.
    pub value: String,
    re: Option<Regex>,
}

impl Matcher {
    /// Builds a matcher, compiling the pattern for regex match types.
    ///
    /// # Errors
    ///
    /// Returns the regex error for an invalid pattern.
    pub fn new(
        match_type: MatchType,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<Self, regex::Error> {
        let value = value.into();
        let re = match match_type {
            MatchType::Regexp | MatchType::NotRegexp => {
                Some(Regex::new(&format!("^(?s:{value})$"))?)
            }
            MatchType::Equal | MatchType::NotEqual => None,
        };
        Ok(Self { name: name.into(), match_type, value, re })
    }

    /// Whether a label value satisfies this matcher.
    #[must_use]
    pub fn matches(&self, value: &str) -> bool {
        match (&self.match_type, &self.re) {
            (MatchType::Equal, _) => self.value == value,
            (MatchType::NotEqual, _) => self.value != value,
            (MatchType::Regexp, Some(re)) => re.is_match(value),
            (MatchType::NotRegexp, Some(re)) => !re.is_match(value),
            (MatchType::Regexp | MatchType::NotRegexp, None) => false,
        }
    }
}

/// An instant vector selector.
#[derive(Debug, Clone, Default)]
pub struct VectorSelector {
    /// Metric name, from the leading identifier or an `__name__` equality.
    pub name: Option<String>,
    /// Matchers written between the braces, in source order.
    pub matchers: Vec<Matcher>,
    /// `offset` modifier.
    pub offset: Option<Offset>,
    /// `@` modifier.
    pub at: Option<AtModifier>,
}

/// A signed `offset` modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Offset {
    /// Shift into the future instead of the past.
    pub negative: bool,
    /// Magnitude of the shift.
    pub duration: Duration,
}

/// An `@` evaluation-time modifier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AtModifier {
    /// `@ <unix seconds>`
    Timestamp(f64),
    /// `@ start()`
    Start,
    /// `@ end()`
    End,
}

/// A range vector selector.
#[derive(Debug, Clone)]
pub struct MatrixSelector {
    /// The selected series.
    pub vector: VectorSelector,
    /// Lookback window.
    pub range: Duration,
}

/// A subquery.
#[derive(Debug, Clone)]
pub struct SubqueryExpr {
    /// The inner expression.
    pub expr: Box<Expr>,
    /// Lookback window.
    pub range: Duration,
    /// Resolution, the global default when `None`.
    pub step: Option<Duration>,
    /// `offset` modifier.
    pub offset: Option<Offset>,
    /// `@` modifier.
    pub at: Option<AtModifier>,
}

/// A function call.
#[derive(Debug, Clone)]
pub struct Call {
    /// Function name.
    pub func: String,
    /// Arguments in order.
    pub args: Vec<Expr>,
}

/// `by` or `without` label grouping on an aggregation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Grouping {
    /// Keep only these labels.
    By(Vec<String>),
    /// Drop these labels.
    Without(Vec<String>),
}

/// An aggregation over a vector.
#[derive(Debug, Clone)]
pub struct AggregateExpr {
    /// Aggregation operator, e.g. `sum`.
    pub op: String,
    /// Parameter for `topk`, `quantile` and friends.
    pub param: Option<Box<Expr>>,
    /// Aggregated expression.
    pub expr: Box<Expr>,
    /// Optional grouping clause.
    pub grouping: Option<Grouping>,
}

/// Unary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// `+`
    Plus,
    /// `-`
    Minus,
}

/// A unary expression.
#[derive(Debug, Clone)]
pub struct UnaryExpr {
    /// Operator.
    pub op: UnaryOp,
    /// Operand.
    pub expr: Box<Expr>,
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum BinaryOp {
    Or,
    And,
    Unless,
    Eql,
    Neq,
    Lss,
    Lte,
    Gtr,
    Gte,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Atan2,
    Pow,
}

impl BinaryOp {
    /// Binding strength, higher binds tighter.
    #[must_use]
    pub fn precedence(self) -> u8 {
        match self {
            Self::Or => 1,
            Self::And | Self::Unless => 2,
            Self::Eql | Self::Neq | Self::Lss | Self::Lte | Self::Gtr | Self::Gte => 3,
            Self::Add | Self::Sub => 4,
            Self::Mul | Self::Div | Self::Mod | Self::Atan2 => 5,
            Self::Pow => 6,
        }
    }

    /// Only `^` associates to the right.
    #[must_use]
    pub fn is_right_associative(self) -> bool {
        self == Self::Pow
    }

    /// Comparison operators accept the `bool` modifier.
    #[must_use]
    pub fn is_comparison(self) -> bool {
        self.precedence() == 3
    }

    /// Set operators match on label sets only.
    #[must_use]
    pub fn is_set_operator(self) -> bool {
        matches!(self, Self::Or | Self::And | Self::Unless)
    }
}

/// Which side of a one-to-many match has the higher cardinality.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupSide {
    /// `group_left(<labels>)`
    Left(Vec<String>),
    /// `group_right(<labels>)`
    Right(Vec<String>),
}

/// `on`/`ignoring` clause of a binary operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VectorMatching {
    /// `true` for `on`, `false` for `ignoring`.
    pub on: bool,
    /// Labels listed in the clause.
    pub labels: Vec<String>,
    /// Optional `group_left`/`group_right`.
    pub group: Option<GroupSide>,
}

/// A binary expression.
#[derive(Debug, Clone)]
pub struct BinaryExpr {
    /// Operator.
    pub op: BinaryOp,
    /// Left operand.
    pub lhs: Box<Expr>,
    /// Right operand.
    pub rhs: Box<Expr>,
    /// `bool` modifier on comparisons.
    pub return_bool: bool,
    /// Vector matching clause.
    pub matching: Option<VectorMatching>,
}
