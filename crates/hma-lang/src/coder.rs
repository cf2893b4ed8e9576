//! Coder Language parser.

use crate::ast::{CoderDirective, EphemeralType, ReplaceItem, SpawnItem};
use crate::scanner::{ParseError, Scanner};

fn parse_spawn_items(s: &mut Scanner) -> Result<Vec<SpawnItem>, ParseError> {
    let mut items = Vec::new();
    loop {
        s.expect_keyword("TESTER")?;
        let prompt = s.consume_field_string("PROMPT")?;
        items.push(SpawnItem { ephemeral_type: EphemeralType::Tester, prompt });
        if !s.has_more() {
            break;
        }
    }
    Ok(items)
}

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

pub fn parse_coder_directive(text: &str) -> Result<CoderDirective, ParseError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ParseError::Empty);
    }

    let mut s = Scanner::new(trimmed);
    let keyword = s.peek_word().unwrap_or("").to_string();

    let directive = match keyword.as_str() {
        "READ" => {
            s.expect_keyword("READ")?;
            CoderDirective::Read(s.consume_string()?)
        }
        "RUN" => {
            s.expect_keyword("RUN")?;
            CoderDirective::Run(s.consume_string()?)
        }
        "CHANGE" => {
            s.expect_keyword("CHANGE")?;
            CoderDirective::Change(s.consume_field_string("CONTENT")?)
        }
        "REPLACE" => {
            s.expect_keyword("REPLACE")?;
            CoderDirective::Replace(parse_replace_items(&mut s)?)
        }
        "INSERT" => {
            s.expect_keyword("INSERT")?;
            let from = s.consume_field_string("FROM")?;
            let to = s.consume_field_string("TO")?;
            CoderDirective::Insert { from, to }
        }
        "SPAWN" => {
            s.expect_keyword("SPAWN")?;
            CoderDirective::Spawn(parse_spawn_items(&mut s)?)
        }
        "WAIT" => {
            s.expect_keyword("WAIT")?;
            CoderDirective::Wait
        }
        "FINISH" => {
            s.expect_keyword("FINISH")?;
            CoderDirective::Finish(s.consume_field_string("PROMPT")?)
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
    fn parses_change() {
        let d = parse_coder_directive(r#"CHANGE CONTENT="fn main() {}""#).unwrap();
        assert_eq!(d, CoderDirective::Change("fn main() {}".to_string()));
    }

    #[test]
    fn parses_replace_with_multiple_items() {
        let d = parse_coder_directive(
            r#"REPLACE FROM="foo" TO="bar" FROM="baz" TO="qux""#,
        )
        .unwrap();
        match d {
            CoderDirective::Replace(items) => assert_eq!(items.len(), 2),
            _ => panic!("expected Replace"),
        }
    }

    #[test]
    fn parses_insert() {
        let d = parse_coder_directive(r#"INSERT FROM="fn main() {" TO="\n    init();""#).unwrap();
        assert_eq!(
            d,
            CoderDirective::Insert {
                from: "fn main() {".to_string(),
                to: "\n    init();".to_string(),
            }
        );
    }

    #[test]
    fn parses_read_and_run() {
        assert_eq!(
            parse_coder_directive(r#"READ "lib.rs""#).unwrap(),
            CoderDirective::Read("lib.rs".to_string())
        );
        assert_eq!(
            parse_coder_directive(r#"RUN "cargo test""#).unwrap(),
            CoderDirective::Run("cargo test".to_string())
        );
    }
}
