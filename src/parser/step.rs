//! Reader for STEP physical files (ISO 10303-21), the container format of IFC.
//!
//! Only the `DATA` section is materialised. Records may span several lines and
//! strings may contain any of `,;()'`, so the reader scans characters instead of
//! splitting lines.

use std::collections::{BTreeMap, HashMap};
use std::iter::Peekable;
use std::str::Chars;

use crate::error::ParseError;

#[derive(Debug, Clone, PartialEq)]
pub enum StepValue {
    String(String),
    Real(f64),
    Integer(i64),
    Boolean(bool),
    Enum(String),
    Reference(u64),
    List(Vec<StepValue>),
    /// Defined-type wrapper such as `IFCLABEL('x')` or `IFCREAL(1.5)`.
    Typed {
        type_name: String,
        value: Box<StepValue>,
    },
    Null,
    Derived,
}

impl StepValue {
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            StepValue::String(s) => Some(s),
            StepValue::Typed { value, .. } => value.as_str(),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_reference(&self) -> Option<u64> {
        match self {
            StepValue::Reference(id) => Some(*id),
            _ => None,
        }
    }

    /// References held directly by this value or by a list value.
    #[must_use]
    pub fn references(&self) -> Vec<u64> {
        match self {
            StepValue::Reference(id) => vec![*id],
            StepValue::List(items) => items.iter().filter_map(StepValue::as_reference).collect(),
            _ => Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StepEntity {
    pub id: u64,
    /// Upper-case entity keyword as written in the file, e.g. `IFCWALL`.
    pub entity_type: String,
    pub values: Vec<StepValue>,
}

impl StepEntity {
    #[must_use]
    pub fn attribute(&self, index: usize) -> Option<&StepValue> {
        self.values.get(index)
    }
}

#[derive(Debug, Default)]
pub struct StepFile {
    /// Entities keyed by instance id; iteration follows file numbering.
    pub entities: BTreeMap<u64, StepEntity>,
    pub schema: String,
    /// Records that could not be parsed and were skipped.
    pub skipped: usize,
    by_type: HashMap<String, Vec<u64>>,
}

impl StepFile {
    pub fn parse(content: &str) -> Result<Self, ParseError> {
        let mut file = StepFile::default();
        let mut saw_data = false;

        for record in split_records(content) {
            let record = record.trim();
            if record.is_empty() {
                continue;
            }

            if record.starts_with("FILE_SCHEMA") {
                file.schema = parse_schema(record).unwrap_or_default();
                continue;
            }
            if record.starts_with("DATA") && !record.contains('=') {
                saw_data = true;
                continue;
            }
            if !record.starts_with('#') {
                continue;
            }

            match parse_entity(record) {
                Some(entity) => {
                    file.by_type
                        .entry(entity.entity_type.clone())
                        .or_default()
                        .push(entity.id);
                    file.entities.insert(entity.id, entity);
                }
                None => {
                    file.skipped += 1;
                    tracing::debug!(record = %truncate(record, 80), "skipping unparsable STEP record");
                }
            }
        }

        if !saw_data {
            return Err(ParseError::InvalidStep {
                message: "missing DATA section".to_string(),
            });
        }

        for ids in file.by_type.values_mut() {
            ids.sort_unstable();
            ids.dedup();
        }
        if file.skipped > 0 {
            tracing::warn!(skipped = file.skipped, "some STEP records could not be parsed");
        }

        Ok(file)
    }

    #[must_use]
    pub fn get_entity(&self, id: u64) -> Option<&StepEntity> {
        self.entities.get(&id)
    }

    /// Entities with the given upper-case keyword, in id order.
    #[must_use]
    pub fn get_entities_by_type(&self, entity_type: &str) -> Vec<&StepEntity> {
        self.by_type
            .get(entity_type)
            .map(|ids| ids.iter().filter_map(|id| self.entities.get(id)).collect())
            .unwrap_or_default()
    }

    /// Distinct entity keywords present in the file.
    pub fn entity_types(&self) -> impl Iterator<Item = &str> {
        self.by_type.keys().map(String::as_str)
    }
}

/// Splits the file into `;`-terminated records, ignoring `;` inside strings and comments.
fn split_records(content: &str) -> Vec<String> {
    let mut records = Vec::new();
    let mut current = String::new();
    let mut in_string = false;
    let mut chars = content.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '\'' => {
                in_string = !in_string;
                current.push(ch);
            }
            '/' if !in_string && chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for c in chars.by_ref() {
                    if prev == '*' && c == '/' {
                        break;
                    }
                    prev = c;
                }
            }
            ';' if !in_string => records.push(std::mem::take(&mut current)),
            '\r' | '\n' if !in_string => {}
            _ => current.push(ch),
        }
    }

    records
}

fn parse_schema(record: &str) -> Option<String> {
    let start = record.find('\'')? + 1;
    let len = record[start..].find('\'')?;
    Some(record[start..start + len].to_string())
}

fn parse_entity(record: &str) -> Option<StepEntity> {
    // #123=IFCWALL('guid',#2,'name',...)
    let (id_part, rest) = record.split_once('=')?;
    let id = id_part.trim().strip_prefix('#')?.trim().parse().ok()?;

    let rest = rest.trim();
    let paren = rest.find('(')?;
    let entity_type = rest[..paren].trim().to_ascii_uppercase();
    if entity_type.is_empty() {
        return None;
    }

    let mut chars = rest[paren..].chars().peekable();
    let values = match parse_value(&mut chars)? {
        StepValue::List(values) => values,
        _ => return None,
    };

    Some(StepEntity {
        id,
        entity_type,
        values,
    })
}

fn skip_whitespace(chars: &mut Peekable<Chars<'_>>) {
    while chars.peek().is_some_and(|c| c.is_whitespace()) {
        chars.next();
    }
}

fn parse_value(chars: &mut Peekable<Chars<'_>>) -> Option<StepValue> {
    skip_whitespace(chars);
    match *chars.peek()? {
        '(' => {
            chars.next();
            let mut items = Vec::new();
            loop {
                skip_whitespace(chars);
                if chars.peek() == Some(&')') {
                    chars.next();
                    return Some(StepValue::List(items));
                }
                items.push(parse_value(chars)?);
                skip_whitespace(chars);
                match chars.next()? {
                    ',' => {}
                    ')' => return Some(StepValue::List(items)),
                    _ => return None,
                }
            }
        }
        '\'' => {
            chars.next();
            let mut raw = String::new();
            loop {
                let c = chars.next()?;
                if c == '\'' {
                    if chars.peek() == Some(&'\'') {
                        chars.next();
                        raw.push_str("''");
                        continue;
                    }
                    break;
                }
                raw.push(c);
            }
            Some(StepValue::String(decode_step_string(&raw)))
        }
        '$' => {
            chars.next();
            Some(StepValue::Null)
        }
        '*' => {
            chars.next();
            Some(StepValue::Derived)
        }
        '#' => {
            chars.next();
            let digits = take_while(chars, |c| c.is_ascii_digit());
            digits.parse().ok().map(StepValue::Reference)
        }
        '.' => {
            chars.next();
            let inner = take_while(chars, |c| c != '.');
            chars.next();
            Some(match inner.as_str() {
                "T" => StepValue::Boolean(true),
                "F" => StepValue::Boolean(false),
                _ => StepValue::Enum(inner),
            })
        }
        c if c == '-' || c == '+' || c.is_ascii_digit() => {
            let token = take_while(chars, |c| {
                c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'E' | 'e')
            });
            if let Ok(i) = token.parse::<i64>() {
                Some(StepValue::Integer(i))
            } else {
                token.parse::<f64>().ok().map(StepValue::Real)
            }
        }
        c if c.is_ascii_alphabetic() => {
            let type_name = take_while(chars, |c| c.is_ascii_alphanumeric() || c == '_');
            skip_whitespace(chars);
            if chars.peek() != Some(&'(') {
                return Some(StepValue::Enum(type_name));
            }
            chars.next();
            let value = parse_value(chars)?;
            skip_whitespace(chars);
            if chars.next()? != ')' {
                return None;
            }
            Some(StepValue::Typed {
                type_name: type_name.to_ascii_uppercase(),
                value: Box::new(value),
            })
        }
        _ => None,
    }
}

fn take_while(chars: &mut Peekable<Chars<'_>>, keep: impl Fn(char) -> bool) -> String {
    let mut out = String::new();
    while let Some(&c) = chars.peek() {
        if !keep(c) {
            break;
        }
        out.push(c);
        chars.next();
    }
    out
}

/// Decodes the STEP string escapes: `''`, `\\`, `\S\c`, `\X\hh`, `\X2\hhhh…\X0\`,
/// `\X4\hhhhhhhh…\X0\` and `\P?\` code-page switches (dropped).
fn decode_step_string(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '\'' => {
                if chars.peek() == Some(&'\'') {
                    chars.next();
                }
                out.push('\'');
            }
            '\\' => decode_escape(&mut chars, &mut out),
            _ => out.push(ch),
        }
    }

    out
}

fn decode_escape(chars: &mut Peekable<Chars<'_>>, out: &mut String) {
    match chars.peek().copied() {
        Some('\\') => {
            chars.next();
            out.push('\\');
        }
        Some('S') => {
            chars.next();
            if chars.next_if_eq(&'\\').is_some() {
                if let Some(c) = chars.next() {
                    out.extend(char::from_u32(u32::from(c) + 0x80));
                }
            } else {
                out.push_str("\\S");
            }
        }
        Some('P') => {
            // \PA\ .. \PI\ select an ISO 8859 page; the page itself is not tracked.
            chars.next();
            chars.next();
            chars.next_if_eq(&'\\');
        }
        Some('X') => {
            chars.next();
            match chars.next() {
                Some('\\') => {
                    let hex: String = chars.by_ref().take(2).collect();
                    if let Ok(code) = u8::from_str_radix(&hex, 16) {
                        out.push(char::from(code));
                    }
                }
                Some(width @ ('2' | '4')) => {
                    chars.next_if_eq(&'\\');
                    let hex = take_while(chars, |c| c != '\\');
                    // closing \X0\
                    for _ in 0..4 {
                        chars.next();
                    }
                    let step = if width == '2' { 4 } else { 8 };
                    for chunk in hex.as_bytes().chunks(step) {
                        let decoded = std::str::from_utf8(chunk)
                            .ok()
                            .and_then(|s| u32::from_str_radix(s, 16).ok())
                            .and_then(char::from_u32);
                        out.extend(decoded);
                    }
                }
                Some(other) => {
                    out.push_str("\\X");
                    out.push(other);
                }
                None => out.push_str("\\X"),
            }
        }
        _ => out.push('\\'),
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
