//! In-memory PVL tree.
//!
//! Names are *not* unique within a level; every `find_*` accessor returns the
//! first match. Name comparison is case-insensitive, matching the toolkit's
//! PVL conventions (`File`, `FILE` and `file` address the same keyword).
//!
//! Mutation is append-only: rewriting a keyword means building a new
//! [`Keyword`] (or a new [`Group`] from the fields of an old one) rather than
//! indexing into a copy, so an "original" and a derived copy never alias.

use serde::{Deserialize, Serialize};
use std::fmt;

pub type Name = String;

/// A `Name = value` (or `Name = (v1, v2, ...)`) record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Keyword {
    pub name: Name,
    pub values: Vec<String>,
    /// Comment lines rendered immediately before the keyword.
    pub comments: Vec<String>,
}

impl Keyword {
    pub fn new(name: impl Into<Name>, value: impl Into<String>) -> Self {
        Keyword {
            name: name.into(),
            values: vec![value.into()],
            comments: vec![],
        }
    }

    pub fn with_values(name: impl Into<Name>, values: Vec<String>) -> Self {
        Keyword {
            name: name.into(),
            values,
            comments: vec![],
        }
    }

    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    /// The sole value of a single-valued keyword, if it has exactly one.
    pub fn single_value(&self) -> Option<&str> {
        match self.values.as_slice() {
            [v] => Some(v.as_str()),
            _ => None,
        }
    }

    pub fn add_comment(&mut self, comment: impl Into<String>) {
        self.comments.push(comment.into());
    }
}

/// A `Group = Name` ... `End_Group` block: a flat run of keywords.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Group {
    pub name: Name,
    pub keywords: Vec<Keyword>,
    /// Comment lines rendered immediately before the group header.
    pub comments: Vec<String>,
}

impl Group {
    pub fn new(name: impl Into<Name>) -> Self {
        Group {
            name: name.into(),
            keywords: vec![],
            comments: vec![],
        }
    }

    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    pub fn push(&mut self, keyword: Keyword) {
        self.keywords.push(keyword);
    }

    /// First keyword with the given name, if any.
    pub fn find_keyword(&self, name: &str) -> Option<&Keyword> {
        self.keywords.iter().find(|k| k.is_named(name))
    }

    pub fn add_comment(&mut self, comment: impl Into<String>) {
        self.comments.push(comment.into());
    }
}

/// An `Object = Name` ... `End_Object` block: keywords, groups, and nested
/// objects, in source order within each kind.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Object {
    pub name: Name,
    pub keywords: Vec<Keyword>,
    pub groups: Vec<Group>,
    pub objects: Vec<Object>,
    pub comments: Vec<String>,
}

impl Object {
    pub fn new(name: impl Into<Name>) -> Self {
        Object {
            name: name.into(),
            keywords: vec![],
            groups: vec![],
            objects: vec![],
            comments: vec![],
        }
    }

    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    pub fn push(&mut self, keyword: Keyword) {
        self.keywords.push(keyword);
    }

    pub fn push_group(&mut self, group: Group) {
        self.groups.push(group);
    }

    pub fn push_object(&mut self, object: Object) {
        self.objects.push(object);
    }

    pub fn find_keyword(&self, name: &str) -> Option<&Keyword> {
        self.keywords.iter().find(|k| k.is_named(name))
    }

    pub fn find_group(&self, name: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.is_named(name))
    }

    pub fn find_object(&self, name: &str) -> Option<&Object> {
        self.objects.iter().find(|o| o.is_named(name))
    }

    pub fn add_comment(&mut self, comment: impl Into<String>) {
        self.comments.push(comment.into());
    }
}

/// A whole PVL source: top-level keywords and objects.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Document {
    pub keywords: Vec<Keyword>,
    pub objects: Vec<Object>,
}

impl Document {
    pub fn new() -> Self {
        Document::default()
    }

    pub fn parse(text: &str) -> Result<Document, crate::parse::ParseError> {
        crate::parse::parse_document(text)
    }

    pub fn push(&mut self, keyword: Keyword) {
        self.keywords.push(keyword);
    }

    pub fn push_object(&mut self, object: Object) {
        self.objects.push(object);
    }

    pub fn find_keyword(&self, name: &str) -> Option<&Keyword> {
        self.keywords.iter().find(|k| k.is_named(name))
    }

    pub fn find_object(&self, name: &str) -> Option<&Object> {
        self.objects.iter().find(|o| o.is_named(name))
    }
}

// ============================================================================
// Serialization
// ============================================================================

const INDENT: &str = "  ";

fn needs_quoting(value: &str) -> bool {
    value.is_empty()
        || value
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '#' | ',' | '(' | ')' | '"' | '\''))
}

/// Values containing `"` are written in single quotes and vice versa; a value
/// containing both quote kinds is not representable.
fn write_value(f: &mut fmt::Formatter<'_>, value: &str) -> fmt::Result {
    if value.contains('"') {
        write!(f, "'{value}'")
    } else if needs_quoting(value) {
        write!(f, "\"{value}\"")
    } else {
        write!(f, "{value}")
    }
}

fn write_comments(f: &mut fmt::Formatter<'_>, comments: &[String], depth: usize) -> fmt::Result {
    for comment in comments {
        writeln!(f, "{}# {}", INDENT.repeat(depth), comment)?;
    }
    Ok(())
}

fn write_keyword(f: &mut fmt::Formatter<'_>, keyword: &Keyword, depth: usize) -> fmt::Result {
    write_comments(f, &keyword.comments, depth)?;
    write!(f, "{}{} = ", INDENT.repeat(depth), keyword.name)?;
    match keyword.values.as_slice() {
        [single] => write_value(f, single)?,
        many => {
            write!(f, "(")?;
            for (i, value) in many.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write_value(f, value)?;
            }
            write!(f, ")")?;
        }
    }
    writeln!(f)
}

fn write_group(f: &mut fmt::Formatter<'_>, group: &Group, depth: usize) -> fmt::Result {
    write_comments(f, &group.comments, depth)?;
    writeln!(f, "{}Group = {}", INDENT.repeat(depth), group.name)?;
    for keyword in &group.keywords {
        write_keyword(f, keyword, depth + 1)?;
    }
    writeln!(f, "{}End_Group", INDENT.repeat(depth))
}

fn write_object(f: &mut fmt::Formatter<'_>, object: &Object, depth: usize) -> fmt::Result {
    write_comments(f, &object.comments, depth)?;
    writeln!(f, "{}Object = {}", INDENT.repeat(depth), object.name)?;
    for keyword in &object.keywords {
        write_keyword(f, keyword, depth + 1)?;
    }
    for group in &object.groups {
        write_group(f, group, depth + 1)?;
    }
    for child in &object.objects {
        write_object(f, child, depth + 1)?;
    }
    writeln!(f, "{}End_Object", INDENT.repeat(depth))
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for keyword in &self.keywords {
            write_keyword(f, keyword, 0)?;
        }
        for object in &self.objects {
            write_object(f, object, 0)?;
        }
        writeln!(f, "End")
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_object(f, self, 0)
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_group(f, self, 0)
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_keyword(f, self, 0)
    }
}
