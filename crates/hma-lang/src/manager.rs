//! Manager Language parser. Master agents parse with this same function;
//! only the interpreter distinguishes root-level privileges.

use crate::ast::{DelegateItem, EphemeralType, ManagerDirective, SpawnItem, Target};
use crate::scanner::{ParseError, Scanner};

fn parse_target(s: &mut Scanner) -> Result<Target, ParseError> {
    if s.consume_keyword("FILE") {
        Ok(Target::file(s.consume_string()?))
    } else if s.consume_keyword("FOLDER") {
        Ok(Target::folder(s.consume_string()?))
    } else {
        Err(ParseError::Expected {
            expected: "FILE or FOLDER".to_string(),
            found: s.peek_word().unwrap_or("").to_string(),
        })
    }
}

fn parse_targets(s: &mut Scanner) -> Result<Vec<Target>, ParseError> {
    let mut targets = vec![parse_target(s)?];
    while s.has_more() {
        targets.push(parse_target(s)?);
    }
    Ok(targets)
}

fn parse_delegate_items(s: &mut Scanner) -> Result<Vec<DelegateItem>, ParseError> {
    let mut items = Vec::new();
    loop {
        let target = parse_target(s)?;
        let prompt = s.consume_field_string("PROMPT")?;
        items.push(DelegateItem { target, prompt });
        if !s.has_more() {
            break;
        }
    }
    Ok(items)
}

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

pub fn parse_manager_directive(text: &str) -> Result<ManagerDirective, ParseError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ParseError::Empty);
    }

    let mut s = Scanner::new(trimmed);
    let keyword = s.peek_word().unwrap_or("").to_string();

    let directive = match keyword.as_str() {
        "DELEGATE" => {
            s.expect_keyword("DELEGATE")?;
            ManagerDirective::Delegate(parse_delegate_items(&mut s)?)
        }
        "SPAWN" => {
            s.expect_keyword("SPAWN")?;
            ManagerDirective::Spawn(parse_spawn_items(&mut s)?)
        }
        "CREATE" => {
            s.expect_keyword("CREATE")?;
            ManagerDirective::Create(parse_targets(&mut s)?)
        }
        "DELETE" => {
            s.expect_keyword("DELETE")?;
            ManagerDirective::Delete(parse_targets(&mut s)?)
        }
        "READ" => {
            s.expect_keyword("READ")?;
            ManagerDirective::Read(parse_targets(&mut s)?)
        }
        "RUN" => {
            s.expect_keyword("RUN")?;
            ManagerDirective::Run(s.consume_string()?)
        }
        "UPDATE_README" => {
            s.expect_keyword("UPDATE_README")?;
            ManagerDirective::UpdateReadme(s.consume_field_string("CONTENT")?)
        }
        "WAIT" => {
            s.expect_keyword("WAIT")?;
            ManagerDirective::Wait
        }
        "FINISH" => {
            s.expect_keyword("FINISH")?;
            ManagerDirective::Finish(s.consume_field_string("PROMPT")?)
        }
        other => return Err(ParseError::UnknownKeyword(other.to_string())),
    };

    s.expect_trailing_end()?;
    Ok(directive)
}
