//! Tester Language parser — the smallest of the four, no SPAWN or scope
//! directives since a Tester is ephemeral and owns nothing.

use crate::ast::{ReplaceItem, TesterDirective};
use crate::scanner::{ParseError, Scanner};

fn parse_replace_items(s: &mut Scanner) -> Result<Vec<ReplaceItem>, ParseError> {
    let mut items = Vec::new();
    loop {
        let from = s.consume_field_string("FROM")?;
        let to = s.consume_field_string("TO")?;
        items.push(ReplaceItem { from, to });
        if !s.has_more() {
            break;
        }
    }
    Ok(items)
}

pub fn parse_tester_directive(text: &str) -> Result<TesterDirective, ParseError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ParseError::Empty);
    }

    let mut s = Scanner::new(trimmed);
    let keyword = s.peek_word().unwrap_or("").to_string();

    let directive = match keyword.as_str() {
        "READ" => {
            s.expect_keyword("READ")?;
            TesterDirective::Read(s.consume_string()?)
        }
        "RUN" => {
            s.expect_keyword("RUN")?;
            TesterDirective::Run(s.consume_string()?)
        }
        "CHANGE" => {
            s.expect_keyword("CHANGE")?;
            TesterDirective::Change(s.consume_field_string("CONTENT")?)
        }
        "REPLACE" => {
            s.expect_keyword("REPLACE")?;
            TesterDirective::Replace(parse_replace_items(&mut s)?)
        }
        "FINISH" => {
            s.expect_keyword("FINISH")?;
            TesterDirective::Finish(s.consume_field_string("PROMPT")?)
        }
        other => return Err(ParseError::UnknownKeyword(other.to_string())),
    };

    s.expect_trailing_end()?;
    Ok(directive)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_run() {
        assert_eq!(
            parse_tester_directive(r#"RUN "pytest -k test_basic""#).unwrap(),
            TesterDirective::Run("pytest -k test_basic".to_string())
        );
    }

    #[test]
    fn parses_finish() {
        assert_eq!(
            parse_tester_directive(r#"FINISH PROMPT="3 passed, 0 failed""#).unwrap(),
            TesterDirective::Finish("3 passed, 0 failed".to_string())
        );
    }

    #[test]
    fn parses_replace_with_multiple_items() {
        let d = parse_tester_directive(r#"REPLACE FROM="foo" TO="bar" FROM="baz" TO="qux""#).unwrap();
        match d {
            TesterDirective::Replace(items) => assert_eq!(items.len(), 2),
            _ => panic!("expected Replace"),
        }
    }

    #[test]
    fn rejects_spawn() {
        assert!(matches!(
            parse_tester_directive(r#"SPAWN TESTER PROMPT="nope""#),
            Err(ParseError::UnknownKeyword(_))
        ));
    }
}
