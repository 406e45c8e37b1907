//! Tokenizer for PromQL.

use std::time::Duration;

use super::ParseError;
use crate::duration::parse_duration;

#[derive(Debug, Clone, PartialEq)]
pub(super) enum Token {
    Ident(String),
    Number(f64),
    Duration(Duration),
    Str(String),
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,
    Comma,
    Colon,
    At,
    Assign,
    EqlRegex,
    NeqRegex,
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
    Pow,
    Eof,
}

impl Token {
    pub(super) fn describe(&self) -> String {
        match self {
            Self::Ident(name) => format!("identifier {name:?}"),
            Self::Number(n) => format!("number {n}"),
            Self::Duration(_) => "duration".to_string(),
            Self::Str(s) => format!("string {s:?}"),
            Self::Eof => "end of input".to_string(),
            other => format!("{:?}", symbol(other)),
        }
    }
}

fn symbol(token: &Token) -> &'static str {
    match token {
        Token::LeftParen => "(",
        Token::RightParen => ")",
        Token::LeftBrace => "{",
        Token::RightBrace => "}",
        Token::LeftBracket => "[",
        Token::RightBracket => "]",
        Token::Comma => ",",
        Token::Colon => ":",
        Token::At => "@",
        Token::Assign => "=",
        Token::EqlRegex => "=~",
        Token::NeqRegex => "!~",
        Token::Eql => "==",
        Token::Neq => "!=",
        Token::Lss => "<",
        Token::Lte => "<=",
        Token::Gtr => ">",
        Token::Gte => ">=",
        Token::Add => "+",
        Token::Sub => "-",
        Token::Mul => "*",
        Token::Div => "/",
        Token::Mod => "%",
        Token::Pow => "^",
        _ => "",
    }
}

/// A token and the byte offset it starts at.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct Spanned {
    pub token: Token,
    pub pos: usize,
}

pub(super) fn tokenize(input: &str) -> Result<Vec<Spanned>, ParseError> {
    let bytes = input.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;
    let mut bracket_depth = 0usize;

    while pos < bytes.len() {
        let c = bytes[pos];
        if c.is_ascii_whitespace() {
            pos += 1;
            continue;
        }
        if c == b'#' {
            while pos < bytes.len() && bytes[pos] != b'\n' {
                pos += 1;
            }
            continue;
        }

        let start = pos;
        let next = bytes.get(pos + 1).copied();
        let (token, len) = match c {
            b'(' => (Token::LeftParen, 1),
            b')' => (Token::RightParen, 1),
            b'{' => (Token::LeftBrace, 1),
            b'}' => (Token::RightBrace, 1),
            b'[' => {
                bracket_depth += 1;
                (Token::LeftBracket, 1)
            }
            b']' => {
                bracket_depth = bracket_depth.saturating_sub(1);
                (Token::RightBracket, 1)
            }
            b',' => (Token::Comma, 1),
            b':' if bracket_depth > 0 || !next.is_some_and(is_ident_char) => (Token::Colon, 1),
            b'@' => (Token::At, 1),
            b'=' if next == Some(b'=') => (Token::Eql, 2),
            b'=' if next == Some(b'~') => (Token::EqlRegex, 2),
            b'=' => (Token::Assign, 1),
            b'!' if next == Some(b'=') => (Token::Neq, 2),
            b'!' if next == Some(b'~') => (Token::NeqRegex, 2),
            b'<' if next == Some(b'=') => (Token::Lte, 2),
            b'<' => (Token::Lss, 1),
            b'>' if next == Some(b'=') => (Token::Gte, 2),
            b'>' => (Token::Gtr, 1),
            b'+' => (Token::Add, 1),
            b'-' => (Token::Sub, 1),
            b'*' => (Token::Mul, 1),
            b'/' => (Token::Div, 1),
            b'%' => (Token::Mod, 1),
            b'^' => (Token::Pow, 1),
            b'"' | b'\'' | b'`' => {
                let (value, len) = lex_string(input, start)?;
                (Token::Str(value), len)
            }
            b'0'..=b'9' | b'.' => lex_number(input, start)?,
            c if is_ident_start(c) => {
                let mut end = start + 1;
                while end < bytes.len() && is_ident_char(bytes[end]) {
                    end += 1;
                }
                (Token::Ident(input[start..end].to_string()), end - start)
            }
            _ => {
                let ch = input[start..].chars().next().unwrap_or_default();
                return Err(ParseError::new(start, format!("unexpected character {ch:?}")));
            }
        };
        tokens.push(Spanned { token, pos: start });
        pos += len;
    }

    tokens.push(Spanned { token: Token::Eof, pos: input.len() });
    Ok(tokens)
}

fn is_ident_start(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_' || c == b':'
}

fn is_ident_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_' || c == b':'
}

/// Lexes a number or a duration starting at `start`.
fn lex_number(input: &str, start: usize) -> Result<(Token, usize), ParseError> {
    let bytes = input.as_bytes();
    let hex = bytes[start..].starts_with(b"0x") || bytes[start..].starts_with(b"0X");
    let mut end = start;
    while end < bytes.len() {
        let c = bytes[end];
        let exponent_sign = !hex
            && (c == b'+' || c == b'-')
            && end > start
            && matches!(bytes[end - 1], b'e' | b'E')
            && bytes[start..end - 1].iter().all(|b| b.is_ascii_digit() || *b == b'.');
        if c.is_ascii_alphanumeric() || c == b'.' || c == b'_' || exponent_sign {
            end += 1;
        } else {
            break;
        }
    }
    let text = &input[start..end];

    if hex {
        let value = u64::from_str_radix(&text[2..], 16)
            .map_err(|_| ParseError::new(start, format!("bad number {text:?}")))?;
        #[allow(clippy::cast_precision_loss)]
        let number = value as f64;
        return Ok((Token::Number(number), end - start));
    }
    if let Ok(value) = text.parse::<f64>() {
        if text.bytes().all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'+' | b'-'))
        {
            return Ok((Token::Number(value), end - start));
        }
    }
    match parse_duration(text) {
        Ok(duration) => Ok((Token::Duration(duration), end - start)),
        Err(_) => Err(ParseError::new(start, format!("bad number or duration syntax: {text:?}"))),
    }
}

/// Lexes a quoted string starting at `start`, returning the unescaped value
/// and the consumed length including quotes.
fn lex_string(input: &str, start: usize) -> Result<(String, usize), ParseError> {
    let mut chars = input[start..].char_indices();
    let Some((_, quote)) = chars.next() else {
        return Err(ParseError::new(start, "unterminated quoted string"));
    };
    let mut value = String::new();

    while let Some((offset, c)) = chars.next() {
        if c == quote {
            return Ok((value, offset + c.len_utf8()));
        }
        if c == '\n' && quote != '`' {
            return Err(ParseError::new(start + offset, "unterminated quoted string"));
        }
        if c != '\\' || quote == '`' {
            value.push(c);
            continue;
        }
        let Some((escape_at, escaped)) = chars.next() else {
            break;
        };
        let unescaped = match escaped {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            'a' => '\u{7}',
            'b' => '\u{8}',
            'f' => '\u{c}',
            'v' => '\u{b}',
            '\\' | '"' | '\'' => escaped,
            _ => {
                return Err(ParseError::new(
                    start + escape_at,
                    format!("unknown escape sequence \\{escaped}"),
                ));
            }
        };
        value.push(unescaped);
    }

    Err(ParseError::new(start, "unterminated quoted string"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<Token> {
        tokenize(input).unwrap().into_iter().map(|s| s.token).collect()
    }

    #[test]
    fn tokenizes_selector() {
        assert_eq!(
            kinds(r#"http_requests_total{job="api",code=~"5.."}"#),
            vec![
                Token::Ident("http_requests_total".to_string()),
                Token::LeftBrace,
                Token::Ident("job".to_string()),
                Token::Assign,
                Token::Str("api".to_string()),
                Token::Comma,
                Token::Ident("code".to_string()),
                Token::EqlRegex,
                Token::Str("5..".to_string()),
                Token::RightBrace,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn distinguishes_numbers_and_durations() {
        assert_eq!(
            kinds("[5m:30s] 0.5 1e3 0x1F"),
            vec![
                Token::LeftBracket,
                Token::Duration(Duration::from_secs(300)),
                Token::Colon,
                Token::Duration(Duration::from_secs(30)),
                Token::RightBracket,
                Token::Number(0.5),
                Token::Number(1000.0),
                Token::Number(31.0),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn exponent_sign_is_part_of_number() {
        assert_eq!(kinds("2e-3"), vec![Token::Number(0.002), Token::Eof]);
        assert_eq!(kinds("2-3"), vec![Token::Number(2.0), Token::Sub, Token::Number(3.0), Token::Eof]);
    }

    #[test]
    fn colons_inside_identifiers() {
        assert_eq!(
            kinds("job:requests:rate5m"),
            vec![Token::Ident("job:requests:rate5m".to_string()), Token::Eof]
        );
    }

    #[test]
    fn unescapes_strings() {
        assert_eq!(kinds(r#""a\"b\n""#), vec![Token::Str("a\"b\n".to_string()), Token::Eof]);
        assert_eq!(kinds(r"`a\d+`"), vec![Token::Str(r"a\d+".to_string()), Token::Eof]);
        assert_eq!(kinds("'it'"), vec![Token::Str("it".to_string()), Token::Eof]);
    }

    #[test]
    fn skips_comments() {
        assert_eq!(kinds("up # the up metric\n"), vec![Token::Ident("up".to_string()), Token::Eof]);
    }

    #[test]
    fn reports_positions() {
        let err = tokenize("up{job=\"api}").unwrap_err();
        assert_eq!(err.position, 7);
        let err = tokenize("up $").unwrap_err();
        assert_eq!(err.position, 3);
        assert!(tokenize("5x").is_err());
    }
}
