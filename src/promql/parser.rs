//! Recursive-descent PromQL parser with precedence climbing for binary
//! operators.

use std::time::Duration;

use super::ast::{
    AggregateExpr, AtModifier, BinaryExpr, BinaryOp, Call, Expr, GroupSide, Grouping, MatchType,
    Matcher, MatrixSelector, Offset, SubqueryExpr, UnaryExpr, UnaryOp, VectorMatching,
    VectorSelector, METRIC_NAME_LABEL,
};
use super::lexer::{tokenize, Spanned, Token};
use super::ParseError;

const AGGREGATORS: &[&str] = &[
    "avg",
    "bottomk",
    "count",
    "count_values",
    "group",
    "limit_ratio",
    "limitk",
    "max",
    "min",
    "quantile",
    "stddev",
    "stdvar",
    "sum",
    "topk",
];

/// Deepest expression nesting accepted before parsing gives up.
const MAX_DEPTH: usize = 128;

/// Aggregators taking a parameter before the aggregated expression.
const PARAMETERIZED: &[&str] =
    &["bottomk", "count_values", "limit_ratio", "limitk", "quantile", "topk"];

const FUNCTIONS: &[&str] = &[
    "abs",
    "absent",
    "absent_over_time",
    "acos",
    "acosh",
    "asin",
    "asinh",
    "atan",
    "atanh",
    "avg_over_time",
    "ceil",
    "changes",
    "clamp",
    "clamp_max",
    "clamp_min",
    "cos",
    "cosh",
    "count_over_time",
    "day_of_month",
    "day_of_week",
    "day_of_year",
    "days_in_month",
    "deg",
    "delta",
    "deriv",
    "double_exponential_smoothing",
    "exp",
    "floor",
    "histogram_avg",
    "histogram_count",
    "histogram_fraction",
    "histogram_quantile",
    "histogram_stddev",
    "histogram_stdvar",
    "histogram_sum",
    "holt_winters",
    "hour",
    "idelta",
    "increase",
    "info",
    "irate",
    "label_join",
    "label_replace",
    "last_over_time",
    "ln",
    "log10",
    "log2",
    "mad_over_time",
    "max_over_time",
    "min_over_time",
    "minute",
    "month",
    "pi",
    "predict_linear",
    "present_over_time",
    "quantile_over_time",
    "rad",
    "rate",
    "resets",
    "round",
    "scalar",
    "sgn",
    "sin",
    "sinh",
    "sort",
    "sort_by_label",
    "sort_by_label_desc",
    "sort_desc",
    "sqrt",
    "stddev_over_time",
    "stdvar_over_time",
    "sum_over_time",
    "tan",
    "tanh",
    "time",
    "timestamp",
    "vector",
    "year",
];

/// Parses a PromQL expression.
///
/// # Errors
///
/// Returns a [`ParseError`] pointing at the offending byte offset.
pub fn parse(input: &str) -> Result<Expr, ParseError> {
    let tokens = tokenize(input)?;
    let mut parser = Parser { tokens, pos: 0, depth: 0 };
    let expr = parser.parse_expr(0)?;
    match parser.peek() {
        Token::Eof => Ok(expr),
        other => Err(parser.error(format!("unexpected {}", other.describe()))),
    }
}

struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        self.peek_at(0)
    }

    fn peek_at(&self, ahead: usize) -> &Token {
        let idx = (self.pos + ahead).min(self.tokens.len() - 1);
        &self.tokens[idx].token
    }

    fn position(&self) -> usize {
        self.tokens[self.pos.min(self.tokens.len() - 1)].pos
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError::new(self.position(), message)
    }

    fn expect(&mut self, expected: &Token, what: &str) -> Result<(), ParseError> {
        if self.peek() == expected {
            self.advance();
            Ok(())
        } else {
            Err(self.error(format!("expected {what}, found {}", self.peek().describe())))
        }
    }

    fn peek_keyword(&self, keyword: &str) -> bool {
        matches!(self.peek(), Token::Ident(name) if name.eq_ignore_ascii_case(keyword))
    }

    /// Every nested subexpression passes through here, so the depth check
    /// bounds recursion for parentheses, unary operators and arguments alike.
    fn parse_expr(&mut self, min_precedence: u8) -> Result<Expr, ParseError> {
        if self.depth >= MAX_DEPTH {
            return Err(self.error("expression nested too deeply"));
        }
        self.depth += 1;
        let result = self.parse_binary(min_precedence);
        self.depth -= 1;
        result
    }

    fn parse_binary(&mut self, min_precedence: u8) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_unary()?;

        while let Some(op) = self.peek_binary_op() {
            let precedence = op.precedence();
            if precedence < min_precedence {
                break;
            }
            self.advance();

            let return_bool = if self.peek_keyword("bool") {
                if !op.is_comparison() {
                    return Err(self.error("bool modifier can only be used on comparison operators"));
                }
                self.advance();
                true
            } else {
                false
            };
            let matching = self.parse_vector_matching(op)?;

            let next_min = if op.is_right_associative() { precedence } else { precedence + 1 };
            let rhs = self.parse_expr(next_min)?;
            lhs = Expr::Binary(BinaryExpr {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
                return_bool,
                matching,
            });
        }

        Ok(lhs)
    }

    fn peek_binary_op(&self) -> Option<BinaryOp> {
        let op = match self.peek() {
            Token::Add => BinaryOp::Add,
            Token::Sub => BinaryOp::Sub,
            Token::Mul => BinaryOp::Mul,
            Token::Div => BinaryOp::Div,
            Token::Mod => BinaryOp::Mod,
            Token::Pow => BinaryOp::Pow,
            Token::Eql => BinaryOp::Eql,
            Token::Neq => BinaryOp::Neq,
            Token::Lss => BinaryOp::Lss,
            Token::Lte => BinaryOp::Lte,
            Token::Gtr => BinaryOp::Gtr,
            Token::Gte => BinaryOp::Gte,
            Token::Ident(name) => match name.to_ascii_lowercase().as_str() {
                "and" => BinaryOp::And,
                "or" => BinaryOp::Or,
                "unless" => BinaryOp::Unless,
                "atan2" => BinaryOp::Atan2,
                _ => return None,
            },
            _ => return None,
        };
        Some(op)
    }

    fn parse_vector_matching(&mut self, op: BinaryOp) -> Result<Option<VectorMatching>, ParseError> {
        let on = if self.peek_keyword("on") {
            true
        } else if self.peek_keyword("ignoring") {
            false
        } else {
            return Ok(None);
        };
        self.advance();
        let labels = self.parse_label_list()?;

        let group = if self.peek_keyword("group_left") || self.peek_keyword("group_right") {
            if op.is_set_operator() {
                return Err(self.error("no grouping allowed for set operations"));
            }
            let left = self.peek_keyword("group_left");
            self.advance();
            let extra =
                if *self.peek() == Token::LeftParen { self.parse_label_list()? } else { Vec::new() };
            Some(if left { GroupSide::Left(extra) } else { GroupSide::Right(extra) })
        } else {
            None
        };

        Ok(Some(VectorMatching { on, labels, group }))
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let op = match self.peek() {
            Token::Add => UnaryOp::Plus,
            Token::Sub => UnaryOp::Minus,
            _ => {
                let primary = self.parse_primary()?;
                return self.parse_postfix(primary);
            }
        };
        self.advance();
        let operand = self.parse_expr(BinaryOp::Pow.precedence())?;
        Ok(Expr::Unary(UnaryExpr { op, expr: Box::new(operand) }))
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        match self.peek().clone() {
            Token::Number(value) => {
                self.advance();
                Ok(Expr::NumberLiteral(value))
            }
            Token::Str(value) => {
                self.advance();
                Ok(Expr::StringLiteral(value))
            }
            Token::LeftParen => {
                self.advance();
                let inner = self.parse_expr(0)?;
                self.expect(&Token::RightParen, "\")\"")?;
                Ok(Expr::Paren(Box::new(inner)))
            }
            Token::LeftBrace => self.parse_vector_selector(None).map(Expr::VectorSelector),
            Token::Ident(name) => self.parse_identifier(name),
            other => Err(self.error(format!("unexpected {}", other.describe()))),
        }
    }

    fn parse_identifier(&mut self, name: String) -> Result<Expr, ParseError> {
        let lower = name.to_ascii_lowercase();
        if lower == "inf" || lower == "nan" {
            self.advance();
            let value = if lower == "inf" { f64::INFINITY } else { f64::NAN };
            return Ok(Expr::NumberLiteral(value));
        }

        let next = self.peek_at(1);
        let opens_aggregation = *next == Token::LeftParen
            || matches!(next, Token::Ident(kw) if kw.eq_ignore_ascii_case("by") || kw.eq_ignore_ascii_case("without"));
        if AGGREGATORS.contains(&lower.as_str()) && opens_aggregation {
            return self.parse_aggregate(lower);
        }

        if *next == Token::LeftParen {
            if !FUNCTIONS.contains(&name.as_str()) {
                return Err(self.error(format!("unknown function with name {name:?}")));
            }
            self.advance();
            let args = self.parse_arguments()?;
            return Ok(Expr::Call(Call { func: name, args }));
        }

        self.advance();
        self.parse_vector_selector(Some(name)).map(Expr::VectorSelector)
    }

    fn parse_arguments(&mut self) -> Result<Vec<Expr>, ParseError> {
        self.expect(&Token::LeftParen, "\"(\"")?;
        let mut args = Vec::new();
        if *self.peek() == Token::RightParen {
            self.advance();
            return Ok(args);
        }
        loop {
            args.push(self.parse_expr(0)?);
            match self.advance() {
                Token::Comma => {}
                Token::RightParen => return Ok(args),
                other => {
                    return Err(self.error(format!(
                        "expected \",\" or \")\" in argument list, found {}",
                        other.describe()
                    )));
                }
            }
        }
    }

    fn parse_aggregate(&mut self, op: String) -> Result<Expr, ParseError> {
        self.advance();
        let mut grouping = self.parse_grouping()?;

        let mut args = self.parse_arguments()?;
        if grouping.is_none() {
            grouping = self.parse_grouping()?;
        } else if self.peek_keyword("by") || self.peek_keyword("without") {
            return Err(self.error("aggregation must only contain one grouping clause"));
        }

        let expected = if PARAMETERIZED.contains(&op.as_str()) { 2 } else { 1 };
        if args.len() != expected {
            return Err(self.error(format!(
                "wrong number of arguments for aggregate expression provided, expected {expected}, got {}",
                args.len()
            )));
        }
        let expr = Box::new(args.pop().unwrap_or(Expr::NumberLiteral(0.0)));
        let param = args.pop().map(Box::new);

        Ok(Expr::Aggregate(AggregateExpr { op, param, expr, grouping }))
    }

    fn parse_grouping(&mut self) -> Result<Option<Grouping>, ParseError> {
        if self.peek_keyword("by") {
            self.advance();
            Ok(Some(Grouping::By(self.parse_label_list()?)))
        } else if self.peek_keyword("without") {
            self.advance();
            Ok(Some(Grouping::Without(self.parse_label_list()?)))
        } else {
            Ok(None)
        }
    }

    fn parse_label_list(&mut self) -> Result<Vec<String>, ParseError> {
        self.expect(&Token::LeftParen, "\"(\"")?;
        let mut labels = Vec::new();
        loop {
            match self.advance() {
                Token::RightParen => return Ok(labels),
                Token::Ident(label) => labels.push(label),
                other => {
                    return Err(self.error(format!(
                        "unexpected {} in grouping opts, expected label",
                        other.describe()
                    )));
                }
            }
            match self.advance() {
                Token::Comma => {}
                Token::RightParen => return Ok(labels),
                other => {
                    return Err(self.error(format!(
                        "unexpected {} in grouping opts, expected \",\" or \")\"",
                        other.describe()
                    )));
                }
            }
        }
    }

    fn parse_vector_selector(&mut self, name: Option<String>) -> Result<VectorSelector, ParseError> {
        let start = self.position();
        let matchers =
            if *self.peek() == Token::LeftBrace { self.parse_matchers()? } else { Vec::new() };

        let name_matcher = matchers
            .iter()
            .find(|m| m.name == METRIC_NAME_LABEL && m.match_type == MatchType::Equal);
        let name = match (name, name_matcher) {
            (Some(_), Some(_)) => {
                return Err(ParseError::new(start, "metric name must not be set twice"));
            }
            (Some(name), None) => Some(name),
            (None, Some(m)) => Some(m.value.clone()),
            (None, None) => None,
        };

        if name.is_none() && !matchers.iter().any(|m| !m.matches("")) {
            return Err(ParseError::new(
                start,
                "vector selector must contain at least one non-empty matcher",
            ));
        }

        Ok(VectorSelector { name, matchers, offset: None, at: None })
    }

    fn parse_matchers(&mut self) -> Result<Vec<Matcher>, ParseError> {
        self.expect(&Token::LeftBrace, "\"{\"")?;
        let mut matchers = Vec::new();
        loop {
            let label_pos = self.position();
            let label = match self.advance() {
                Token::RightBrace => return Ok(matchers),
                Token::Ident(label) if !label.contains(':') => label,
                Token::Ident(label) => {
                    return Err(ParseError::new(
                        label_pos,
                        format!("invalid label name {label:?} in label matching"),
                    ));
                }
                other => {
                    return Err(ParseError::new(
                        label_pos,
                        format!("unexpected {} in label matching, expected label", other.describe()),
                    ));
                }
            };
            let match_type = match self.advance() {
                Token::Assign => MatchType::Equal,
                Token::Neq => MatchType::NotEqual,
                Token::EqlRegex => MatchType::Regexp,
                Token::NeqRegex => MatchType::NotRegexp,
                other => {
                    return Err(self.error(format!(
                        "unexpected {} in label matching, expected one of \"=\", \"!=\", \"=~\" or \"!~\"",
                        other.describe()
                    )));
                }
            };
            let value_pos = self.position();
            let Token::Str(value) = self.advance() else {
                return Err(ParseError::new(value_pos, "expected string in label matching"));
            };
            let matcher = Matcher::new(match_type, label, value).map_err(|err| {
                ParseError::new(value_pos, format!("invalid regular expression in label matcher: {err}"))
            })?;
            matchers.push(matcher);

            match self.advance() {
                Token::Comma => {}
                Token::RightBrace => return Ok(matchers),
                other => {
                    return Err(self.error(format!(
                        "unexpected {} in label matching, expected \",\" or \"}}\"",
                        other.describe()
                    )));
                }
            }
        }
    }

    fn parse_postfix(&mut self, mut expr: Expr) -> Result<Expr, ParseError> {
        loop {
            if *self.peek() == Token::LeftBracket {
                expr = self.parse_range(expr)?;
            } else if self.peek_keyword("offset") {
                self.advance();
                let negative = if *self.peek() == Token::Sub {
                    self.advance();
                    true
                } else {
                    false
                };
                let duration = self.expect_duration()?;
                expr = self.apply_offset(expr, Offset { negative, duration })?;
            } else if *self.peek() == Token::At {
                self.advance();
                let at = self.parse_at()?;
                expr = self.apply_at(expr, at)?;
            } else {
                return Ok(expr);
            }
        }
    }

    fn parse_range(&mut self, expr: Expr) -> Result<Expr, ParseError> {
        self.expect(&Token::LeftBracket, "\"[\"")?;
        let range = self.expect_duration()?;

        if *self.peek() == Token::Colon {
            self.advance();
            let step = if *self.peek() == Token::RightBracket {
                None
            } else {
                Some(self.expect_duration()?)
            };
            self.expect(&Token::RightBracket, "\"]\"")?;
            return Ok(Expr::Subquery(SubqueryExpr {
                expr: Box::new(expr),
                range,
                step,
                offset: None,
                at: None,
            }));
        }

        self.expect(&Token::RightBracket, "\"]\"")?;
        match expr {
            Expr::VectorSelector(vector) if vector.offset.is_none() && vector.at.is_none() => {
                Ok(Expr::MatrixSelector(MatrixSelector { vector, range }))
            }
            other => Err(self.error(format!(
                "ranges only allowed for vector selectors, found {}",
                other.node_name()
            ))),
        }
    }

    fn expect_duration(&mut self) -> Result<Duration, ParseError> {
        match self.advance() {
            Token::Duration(duration) => Ok(duration),
            other => Err(self.error(format!("expected duration, found {}", other.describe()))),
        }
    }

    fn parse_at(&mut self) -> Result<AtModifier, ParseError> {
        let negative = if *self.peek() == Token::Sub {
            self.advance();
            true
        } else {
            false
        };
        match self.advance() {
            Token::Number(ts) => Ok(AtModifier::Timestamp(if negative { -ts } else { ts })),
            Token::Ident(name)
                if !negative
                    && (name.eq_ignore_ascii_case("start") || name.eq_ignore_ascii_case("end")) =>
            {
                self.expect(&Token::LeftParen, "\"(\"")?;
                self.expect(&Token::RightParen, "\")\"")?;
                Ok(if name.eq_ignore_ascii_case("start") { AtModifier::Start } else { AtModifier::End })
            }
            other => Err(self.error(format!(
                "unexpected {} in @, expected timestamp, start() or end()",
                other.describe()
            ))),
        }
    }

    fn apply_offset(&self, expr: Expr, offset: Offset) -> Result<Expr, ParseError> {
        let slot = match &expr {
            Expr::VectorSelector(vs) => vs.offset.is_some(),
            Expr::MatrixSelector(ms) => ms.vector.offset.is_some(),
            Expr::Subquery(sq) => sq.offset.is_some(),
            other => {
                return Err(self.error(format!(
                    "offset modifier must be preceded by an instant vector selector or range vector selector or a subquery, found {}",
                    other.node_name()
                )));
            }
        };
        if slot {
            return Err(self.error("offset may not be set multiple times"));
        }
        Ok(match expr {
            Expr::VectorSelector(mut vs) => {
                vs.offset = Some(offset);
                Expr::VectorSelector(vs)
            }
            Expr::MatrixSelector(mut ms) => {
                ms.vector.offset = Some(offset);
                Expr::MatrixSelector(ms)
            }
            Expr::Subquery(mut sq) => {
                sq.offset = Some(offset);
                Expr::Subquery(sq)
            }
            other => other,
        })
    }

    fn apply_at(&self, expr: Expr, at: AtModifier) -> Result<Expr, ParseError> {
        let slot = match &expr {
            Expr::VectorSelector(vs) => vs.at.is_some(),
            Expr::MatrixSelector(ms) => ms.vector.at.is_some(),
            Expr::Subquery(sq) => sq.at.is_some(),
            other => {
                return Err(self.error(format!(
                    "@ modifier must be preceded by an instant vector selector or range vector selector or a subquery, found {}",
                    other.node_name()
                )));
            }
        };
        if slot {
            return Err(self.error("@ <timestamp> may not be set multiple times"));
        }
        Ok(match expr {
            Expr::VectorSelector(mut vs) => {
                vs.at = Some(at);
                Expr::VectorSelector(vs)
            }
            Expr::MatrixSelector(mut ms) => {
                ms.vector.at = Some(at);
                Expr::MatrixSelector(ms)
            }
            Expr::Subquery(mut sq) => {
                sq.at = Some(at);
                Expr::Subquery(sq)
            }
            other => other,
        })
    }
}
