// Script parser: `step | step | ...`

use super::lexer::{identifier, number_literal, string_literal, ws};
use crate::aggregate::Selection;
use crate::interaction::{Event, Point};
use crate::sort::SortOrder;
use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::char,
    combinator::{eof, map, map_res, opt, success},
    multi::separated_list1,
    sequence::{delimited, pair, preceded, separated_pair, terminated},
    IResult,
};
use thiserror::Error;

/// One scripted action: an interaction or a pause that advances the clock.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Event(Event),
    Wait(f64),
}

#[derive(Debug, Error, PartialEq)]
pub enum ScriptError {
    #[error("Script syntax error at offset {offset} near '{near}'")]
    Syntax { offset: usize, near: String },
    #[error("Script ended unexpectedly")]
    Incomplete,
    #[error("wait() needs a non-negative duration, got {0}")]
    InvalidWait(f64),
}

/// `name( args )`
fn call<'a, O, F>(name: &'static str, args: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    delimited(pair(ws(tag(name)), ws(char('('))), args, ws(char(')')))
}

fn point(input: &str) -> IResult<&str, Point> {
    separated_pair(ws(number_literal), ws(char(',')), ws(number_literal))(input)
}

fn parse_step(input: &str) -> IResult<&str, Step> {
    alt((
        map(call("toggle", success(())), |_| Step::Event(Event::ToggleView)),
        map(call("reason", ws(string_literal)), |r| {
            Step::Event(Event::SelectReason(Selection::parse(&r)))
        }),
        map(call("neighborhood", ws(string_literal)), |n| {
            Step::Event(Event::SelectNeighborhood(Selection::parse(&n)))
        }),
        map(
            call("sort", map_res(ws(identifier), |s| s.parse::<SortOrder>())),
            |order| Step::Event(Event::SortBy(order)),
        ),
        map(
            call("hover", pair(ws(string_literal), opt(preceded(ws(char(',')), point)))),
            |(category, pointer)| Step::Event(Event::Hover { category, pointer }),
        ),
        map(call("move", point), |p| Step::Event(Event::PointerMove(p))),
        map(call("leave", success(())), |_| Step::Event(Event::Leave)),
        map(call("click", ws(string_literal)), |c| Step::Event(Event::Click(c))),
        map(call("wait", ws(number_literal)), Step::Wait),
    ))(input)
}

fn near(rest: &str) -> String {
    rest.trim_start().chars().take(20).collect()
}

/// Parse a whole script. Blank input is an empty script.
pub fn parse_script(input: &str) -> Result<Vec<Step>, ScriptError> {
    if input.trim().is_empty() {
        return Ok(Vec::new());
    }

    let result: IResult<&str, Vec<Step>> =
        terminated(separated_list1(ws(char('|')), parse_step), ws(eof))(input);

    let steps = match result {
        Ok((_, steps)) => steps,
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
            return Err(ScriptError::Syntax {
                offset: input.len() - e.input.len(),
                near: near(e.input),
            })
        }
        Err(nom::Err::Incomplete(_)) => return Err(ScriptError::Incomplete),
    };

    for step in &steps {
        if let Step::Wait(ms) = step {
            if !ms.is_finite() || *ms < 0.0 {
                return Err(ScriptError::InvalidWait(*ms));
            }
        }
    }

    Ok(steps)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_every_command() {
        let steps = parse_script(
            r#"toggle() | reason("Noise") | neighborhood("all") | sort(count)
               | hover("Jan") | hover("Feb", 120, 80.5) | move(1, 2) | leave()
               | click("Mar") | wait(250)"#,
        )
        .unwrap();

        assert_eq!(
            steps,
            vec![
                Step::Event(Event::ToggleView),
                Step::Event(Event::SelectReason(Selection::Only("Noise".into()))),
                Step::Event(Event::SelectNeighborhood(Selection::All)),
                Step::Event(Event::SortBy(SortOrder::Value)),
                Step::Event(Event::Hover { category: "Jan".into(), pointer: None }),
                Step::Event(Event::Hover { category: "Feb".into(), pointer: Some((120.0, 80.5)) }),
                Step::Event(Event::PointerMove((1.0, 2.0))),
                Step::Event(Event::Leave),
                Step::Event(Event::Click("Mar".into())),
                Step::Wait(250.0),
            ]
        );
    }

    #[test]
    fn test_blank_script() {
        assert_eq!(parse_script("   "), Ok(Vec::new()));
    }

    #[test]
    fn test_sort_aliases() {
        assert_eq!(parse_script("sort(month)").unwrap(), vec![Step::Event(Event::SortBy(SortOrder::Natural))]);
        assert!(matches!(parse_script("sort(size)"), Err(ScriptError::Syntax { .. })));
    }

    #[test]
    fn test_syntax_error_offset() {
        match parse_script("toggle() | explode()") {
            Err(ScriptError::Syntax { offset, near }) => {
                assert_eq!(offset, 9);
                assert!(near.starts_with('|'));
            }
            other => panic!("Expected syntax error, got {:?}", other),
        }
    }

    #[test]
    fn test_negative_wait() {
        assert_eq!(parse_script("wait(-5)"), Err(ScriptError::InvalidWait(-5.0)));
    }
}
