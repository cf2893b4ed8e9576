//! A small hand-rolled scanner shared by the four directive parsers.
//!
//! Directives are single-line, keyword-led, and built from a handful of
//! quoted-string fields (`PROMPT="..."`, `FROM="..."`, `TO="..."`,
//! `CONTENT="..."`) plus bare keywords (`FILE`, `FOLDER`, `WAIT`, ...). A
//! full grammar/parser-generator is overkill for that shape, so this walks
//! the input by hand the way the rest of the directive simply reads.

use crate::escape::unescape;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("unknown directive keyword: {0}")]
    UnknownKeyword(String),
    #[error("expected {expected}, found: {found}")]
    Expected { expected: String, found: String },
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("empty directive")]
    Empty,
    #[error("trailing input after directive: {0}")]
    TrailingInput(String),
}

pub struct Scanner<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    pub fn skip_ws(&mut self) {
        let trimmed = self.rest().trim_start();
        self.pos = self.input.len() - trimmed.len();
    }

    pub fn at_end(&mut self) -> bool {
        self.skip_ws();
        self.rest().is_empty()
    }

    pub fn expect_trailing_end(&mut self) -> Result<(), ParseError> {
        self.skip_ws();
        if self.rest().is_empty() {
            Ok(())
        } else {
            Err(ParseError::TrailingInput(self.rest().to_string()))
        }
    }

    /// Consumes a bare identifier-style word (letters, digits, `_`) used for
    /// keywords like `FILE`, `FOLDER`, `TESTER`, `WAIT`.
    pub fn peek_word(&mut self) -> Option<&'a str> {
        self.skip_ws();
        let rest = self.rest();
        let end = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(rest.len());
        if end == 0 {
            None
        } else {
            Some(&rest[..end])
        }
    }

    pub fn consume_keyword(&mut self, keyword: &str) -> bool {
        self.skip_ws();
        if self.rest().starts_with(keyword) {
            let next = self.rest()[keyword.len()..].chars().next();
            if next.map(|c| !(c.is_ascii_alphanumeric() || c == '_')).unwrap_or(true) {
                self.pos += keyword.len();
                return true;
            }
        }
        false
    }

    pub fn expect_keyword(&mut self, keyword: &str) -> Result<(), ParseError> {
        if self.consume_keyword(keyword) {
            Ok(())
        } else {
            Err(ParseError::Expected {
                expected: keyword.to_string(),
                found: self.rest().to_string(),
            })
        }
    }

    /// `NAME=` prefix ahead of a quoted field, e.g. `PROMPT=`.
    pub fn expect_field_eq(&mut self, name: &str) -> Result<(), ParseError> {
        self.skip_ws();
        if self.consume_keyword(name) {
            self.skip_ws();
            if self.rest().starts_with('=') {
                self.pos += 1;
                return Ok(());
            }
        }
        Err(ParseError::Expected {
            expected: format!("{}=", name),
            found: self.rest().to_string(),
        })
    }

    /// Consumes a double-quoted string literal, returning its unescaped
    /// contents. A `"""..."""` literal is passed through verbatim (no escape
    /// processing) so multi-line source bodies survive untouched.
    pub fn consume_string(&mut self) -> Result<String, ParseError> {
        self.skip_ws();
        let rest = self.rest();

        if rest.starts_with(r#"""""#) {
            return self.consume_triple_quoted_string();
        }

        if !rest.starts_with('"') {
            return Err(ParseError::Expected {
                expected: "a quoted string".to_string(),
                found: rest.to_string(),
            });
        }

        let bytes = rest.as_bytes();
        let mut i = 1;
        let mut escaped = false;
        loop {
            if i >= bytes.len() {
                return Err(ParseError::UnterminatedString);
            }
            let c = bytes[i];
            if escaped {
                escaped = false;
            } else if c == b'\\' {
                escaped = true;
            } else if c == b'"' {
                break;
            }
            i += 1;
        }

        let raw = &rest[1..i];
        self.pos += i + 1;
        Ok(unescape(raw))
    }

    /// Scans to the matching `"""` and returns the body verbatim, with no
    /// escape processing — unlike a single-quoted literal.
    fn consume_triple_quoted_string(&mut self) -> Result<String, ParseError> {
        let rest = self.rest();
        let body_start = 3;
        let Some(end) = rest[body_start..].find(r#"""""#) else {
            return Err(ParseError::UnterminatedString);
        };
        let body = &rest[body_start..body_start + end];
        self.pos += body_start + end + 3;
        Ok(body.to_string())
    }

    /// Consumes a `FIELD="..."` pair and returns the unescaped value.
    pub fn consume_field_string(&mut self, name: &str) -> Result<String, ParseError> {
        self.expect_field_eq(name)?;
        self.consume_string()
    }

    pub fn has_more(&mut self) -> bool {
        !self.at_end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consumes_keyword_and_string() {
        let mut s = Scanner::new(r#"RUN "cargo test""#);
        assert!(s.consume_keyword("RUN"));
        assert_eq!(s.consume_string().unwrap(), "cargo test");
        assert!(s.expect_trailing_end().is_ok());
    }

    #[test]
    fn field_string_unescapes() {
        let mut s = Scanner::new(r#"PROMPT="line one\nline two""#);
        assert_eq!(
            s.consume_field_string("PROMPT").unwrap(),
            "line one\nline two"
        );
    }

    #[test]
    fn rejects_unterminated_string() {
        let mut s = Scanner::new(r#"READ "oops"#);
        s.consume_keyword("READ");
        assert_eq!(s.consume_string(), Err(ParseError::UnterminatedString));
    }

    #[test]
    fn triple_quoted_string_passes_through_verbatim() {
        let mut s = Scanner::new(r#"CONTENT="""def hello():\n    pass""""#);
        assert_eq!(
            s.consume_field_string("CONTENT").unwrap(),
            r#"def hello():\n    pass"#
        );
        assert!(s.expect_trailing_end().is_ok());
    }

    #[test]
    fn triple_quoted_string_allows_embedded_single_quotes() {
        let mut s = Scanner::new(r#""""he said "hi" to her""""#);
        assert_eq!(s.consume_string().unwrap(), r#"he said "hi" to her"#);
    }
}
