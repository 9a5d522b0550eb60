//! Line-oriented PVL parser.
//!
//! Structure lines (`Object = Name`, `Group = Name`, `End_Object`,
//! `End_Group`, `End`) are matched case-insensitively. Keyword lines are
//! parsed with nom: `Name = value`, `Name = "quoted value"` (single quotes
//! work as well), or `Name = (v1, v2, ...)` with the list allowed to span
//! lines until the parentheses balance.
//!
//! `#` starts a comment. Full-line comments attach to the next element;
//! a trailing comment attaches to the keyword on its line.

use nom::{
    branch::alt,
    bytes::complete::{take_while, take_while1},
    character::complete::{char as pchar, multispace0},
    combinator::{all_consuming, map, recognize, rest, verify},
    multi::separated_list1,
    sequence::{delimited, preceded, tuple},
    IResult,
};
use thiserror::Error;

use crate::document::{Document, Group, Keyword, Object};

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("PVL parse error on line {line}: {message}")]
    Line { line: usize, message: String },
}

impl ParseError {
    fn at(line: usize, message: impl Into<String>) -> Self {
        ParseError::Line {
            line,
            message: message.into(),
        }
    }
}

enum Frame {
    Object(Object),
    Group(Group),
}

pub fn parse_document(text: &str) -> Result<Document, ParseError> {
    let lines: Vec<&str> = text.lines().collect();

    let mut document = Document::new();
    let mut stack: Vec<Frame> = Vec::new();
    let mut pending_comments: Vec<String> = Vec::new();
    let mut ended = false;

    let mut i = 0usize;
    while i < lines.len() {
        let line_no = i + 1;
        let (code, comment) = split_comment(lines[i]);
        let code = code.trim();

        if code.is_empty() {
            if let Some(comment) = comment {
                pending_comments.push(comment_text(comment));
            }
            i += 1;
            continue;
        }

        if ended {
            return Err(ParseError::at(line_no, "content after `End`"));
        }

        // ------------------------------------------------------------------
        // Structure lines
        // ------------------------------------------------------------------
        if let Some((lhs, rhs)) = code.split_once('=') {
            let key = lhs.trim();
            let rhs_trimmed = rhs.trim();

            if key.eq_ignore_ascii_case("object") {
                if rhs_trimmed.is_empty() {
                    return Err(ParseError::at(line_no, "object name missing"));
                }
                if matches!(stack.last(), Some(Frame::Group(_))) {
                    return Err(ParseError::at(line_no, "object nested inside a group"));
                }
                let mut object = Object::new(rhs_trimmed);
                object.comments = std::mem::take(&mut pending_comments);
                stack.push(Frame::Object(object));
                i += 1;
                continue;
            }

            if key.eq_ignore_ascii_case("group") {
                if rhs_trimmed.is_empty() {
                    return Err(ParseError::at(line_no, "group name missing"));
                }
                match stack.last() {
                    Some(Frame::Object(_)) => {}
                    Some(Frame::Group(_)) => {
                        return Err(ParseError::at(line_no, "group nested inside a group"));
                    }
                    None => {
                        return Err(ParseError::at(line_no, "group outside any object"));
                    }
                }
                let mut group = Group::new(rhs_trimmed);
                group.comments = std::mem::take(&mut pending_comments);
                stack.push(Frame::Group(group));
                i += 1;
                continue;
            }

            // ------------------------------------------------------------------
            // Keyword lines (the value list may span lines)
            // ------------------------------------------------------------------
            let (combined, next_index) = if rhs_trimmed.starts_with('(') && paren_balance(code) > 0
            {
                collect_balanced_parens(&lines, i, code)
                    .map_err(|message| ParseError::at(line_no, message))?
            } else {
                (code.to_string(), i + 1)
            };

            let (name, values) =
                parse_keyword_line(&combined).map_err(|message| ParseError::at(line_no, message))?;

            let mut keyword = Keyword::with_values(name, values);
            keyword.comments = std::mem::take(&mut pending_comments);
            if let Some(comment) = comment {
                keyword.add_comment(comment_text(comment));
            }

            match stack.last_mut() {
                Some(Frame::Group(group)) => group.push(keyword),
                Some(Frame::Object(object)) => object.push(keyword),
                None => document.push(keyword),
            }
            i = next_index;
            continue;
        }

        let bare = code.to_ascii_lowercase().replace('_', "");
        match bare.as_str() {
            "endgroup" => match stack.pop() {
                Some(Frame::Group(group)) => {
                    match stack.last_mut() {
                        Some(Frame::Object(object)) => object.push_group(group),
                        // Group headers are only accepted inside an object.
                        _ => unreachable!("group frame without enclosing object"),
                    }
                }
                _ => return Err(ParseError::at(line_no, "`End_Group` without open group")),
            },
            "endobject" => match stack.pop() {
                Some(Frame::Object(object)) => match stack.last_mut() {
                    Some(Frame::Object(parent)) => parent.push_object(object),
                    Some(Frame::Group(_)) => {
                        unreachable!("object frame cannot sit below a group frame")
                    }
                    None => document.push_object(object),
                },
                _ => return Err(ParseError::at(line_no, "`End_Object` without open object")),
            },
            "end" => {
                if let Some(frame) = stack.last() {
                    let what = match frame {
                        Frame::Object(o) => format!("object {}", o.name),
                        Frame::Group(g) => format!("group {}", g.name),
                    };
                    return Err(ParseError::at(line_no, format!("`End` with unterminated {what}")));
                }
                ended = true;
            }
            _ => {
                return Err(ParseError::at(line_no, format!("unrecognized line: {code}")));
            }
        }
        i += 1;
    }

    if let Some(frame) = stack.last() {
        let what = match frame {
            Frame::Object(o) => format!("object {}", o.name),
            Frame::Group(g) => format!("group {}", g.name),
        };
        return Err(ParseError::at(lines.len().max(1), format!("unterminated {what}")));
    }

    Ok(document)
}

// ============================================================================
// Lexical helpers
// ============================================================================

/// Split off a `#` comment, ignoring `#` inside quoted values. Both quote
/// kinds delimit values; a quote of one kind may appear inside the other.
fn split_comment(line: &str) -> (&str, Option<&str>) {
    let mut quote: Option<char> = None;
    for (idx, c) in line.char_indices() {
        match (quote, c) {
            (Some(open), _) if c == open => quote = None,
            (None, '"' | '\'') => quote = Some(c),
            (None, '#') => return (&line[..idx], Some(&line[idx..])),
            _ => {}
        }
    }
    (line, None)
}

fn comment_text(comment: &str) -> String {
    comment.trim_start_matches('#').trim().to_string()
}

/// Net open-paren count outside quoted values.
fn paren_balance(code: &str) -> i32 {
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    for c in code.chars() {
        match (quote, c) {
            (Some(open), _) if c == open => quote = None,
            (None, '"' | '\'') => quote = Some(c),
            (None, '(') => depth += 1,
            (None, ')') => depth -= 1,
            _ => {}
        }
    }
    depth
}

/// Join continuation lines until the value list's parentheses balance.
fn collect_balanced_parens(
    lines: &[&str],
    start_index: usize,
    first_code: &str,
) -> Result<(String, usize), String> {
    let mut combined = first_code.trim().to_string();
    let mut depth = paren_balance(first_code);

    let mut i = start_index + 1;
    while depth > 0 {
        let Some(raw) = lines.get(i) else {
            return Err("unterminated value list".to_string());
        };
        let (code, _comment) = split_comment(raw);
        let code = code.trim();
        if !code.is_empty() {
            combined.push(' ');
            combined.push_str(code);
            depth += paren_balance(code);
        }
        i += 1;
    }
    Ok((combined, i))
}

// ============================================================================
// Keyword lines (nom)
// ============================================================================

fn is_name_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_name_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn parse_name(input: &str) -> IResult<&str, &str> {
    recognize(tuple((
        take_while1(is_name_start),
        take_while(is_name_continue),
    )))(input)
}

fn quoted_value(input: &str) -> IResult<&str, &str> {
    alt((
        delimited(pchar('"'), take_while(|c| c != '"'), pchar('"')),
        delimited(pchar('\''), take_while(|c| c != '\''), pchar('\'')),
    ))(input)
}

fn list_item(input: &str) -> IResult<&str, String> {
    preceded(
        multispace0,
        alt((
            map(quoted_value, str::to_string),
            map(
                verify(
                    take_while1(|c: char| !matches!(c, ',' | ')' | '"' | '\'')),
                    |s: &str| !s.trim().is_empty(),
                ),
                |s: &str| s.trim().to_string(),
            ),
        )),
    )(input)
}

fn value_list(input: &str) -> IResult<&str, Vec<String>> {
    delimited(
        pchar('('),
        separated_list1(preceded(multispace0, pchar(',')), list_item),
        preceded(multispace0, pchar(')')),
    )(input)
}

fn parse_keyword_line(code: &str) -> Result<(String, Vec<String>), String> {
    fn parser(input: &str) -> IResult<&str, (String, Vec<String>)> {
        let (input, name) = parse_name(input)?;
        let (input, _) = multispace0(input)?;
        let (input, _) = pchar('=')(input)?;
        let (input, _) = multispace0(input)?;
        // An rhs opening with `(` is a value list or nothing; it must not
        // fall through to the raw-text arm.
        let (input, values) = if input.starts_with('(') {
            value_list(input)?
        } else {
            alt((
                map(quoted_value, |v| vec![v.to_string()]),
                map(verify(rest, |r: &str| !r.trim().is_empty()), |r: &str| {
                    vec![r.trim().to_string()]
                }),
            ))(input)?
        };
        let (input, _) = multispace0(input)?;
        Ok((input, (name.to_string(), values)))
    }

    all_consuming(parser)(code.trim())
        .map(|(_, v)| v)
        .map_err(|_| format!("malformed keyword line: {code}"))
}
