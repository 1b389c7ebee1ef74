//! Properties-style key/value documents
//!
//! Package files are flat `key=value` documents. Targets and dependencies
//! each own the keys under a caller-assigned prefix (`target3.x`,
//! `dependency1.type`, ...). The parser follows the usual properties
//! conventions: `#` and `!` comment lines, `=` or `:` separators, backslash
//! escapes and backslash line continuations.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use chumsky::prelude::*;
use tracing::{debug, span, trace, Level};

use super::error::{DiagramError, DiagramResult};

/// One logical line of a properties document
#[derive(Debug, Clone, PartialEq, Eq)]
enum Line {
    Blank,
    Comment,
    Entry(String, String),
}

/// Sorted key/value store backing a package file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    entries: BTreeMap<String, String>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Get a value or fail with [`DiagramError::MissingProperty`]
    pub fn require(&self, key: &str) -> DiagramResult<&str> {
        self.get(key)
            .ok_or_else(|| DiagramError::missing_property(key))
    }

    /// Get and parse a required value
    pub fn get_parsed<T: FromStr>(&self, key: &str) -> DiagramResult<T> {
        let raw = self.require(key)?;
        raw.trim()
            .parse()
            .map_err(|_| DiagramError::invalid_number(key, raw))
    }

    /// Get and parse an optional value, falling back to `default` when absent
    pub fn get_parsed_or<T: FromStr>(&self, key: &str, default: T) -> DiagramResult<T> {
        match self.get(key) {
            None => Ok(default),
            Some(_) => self.get_parsed(key),
        }
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl ToString) {
        self.entries.insert(key.into(), value.to_string());
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.remove(key)
    }

    /// Copy every entry of `other` into this document, replacing duplicates
    pub fn extend_from(&mut self, other: &Properties) {
        for (k, v) in &other.entries {
            self.entries.insert(k.clone(), v.clone());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Keys that start with `prefix` followed by a `.`
    pub fn keys_with_prefix<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.entries
            .keys()
            .map(String::as_str)
            .filter(move |k| {
                k.len() > prefix.len() && k.starts_with(prefix) && k[prefix.len()..].starts_with('.')
            })
    }

    /// Parse a properties document
    pub fn parse(input: &str) -> DiagramResult<Self> {
        let parse_span = span!(Level::DEBUG, "parse_properties", input_len = input.len());
        let _enter = parse_span.enter();

        let lines = logical_lines(input);
        let parser = line_parser();
        let mut props = Properties::new();

        for (line_no, logical) in &lines {
            let line_no = *line_no;
            let parsed = parser
                .parse(logical.as_str())
                .into_result()
                .map_err(|errors| {
                    DiagramError::property_parse(format!("{:?}", errors), line_no)
                })?;
            match parsed {
                Line::Blank | Line::Comment => {}
                Line::Entry(key, value) => {
                    trace!(line = line_no, key = %key, "Parsed property");
                    props.entries.insert(key, value);
                }
            }
        }

        debug!(entries = props.len(), "Parsed properties document");
        Ok(props)
    }

    /// Serialize with an optional leading comment
    pub fn to_document(&self, header: Option<&str>) -> String {
        let mut out = String::new();
        if let Some(header) = header {
            for line in header.lines() {
                out.push('#');
                out.push_str(line);
                out.push('\n');
            }
        }
        for (k, v) in &self.entries {
            out.push_str(&escape(k, true));
            out.push('=');
            out.push_str(&escape(v, false));
            out.push('\n');
        }
        out
    }

    /// Read and parse a properties file
    pub fn load(path: impl AsRef<Path>) -> DiagramResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    /// Write this document to a file
    pub fn save(&self, path: impl AsRef<Path>, header: Option<&str>) -> DiagramResult<()> {
        std::fs::write(path.as_ref(), self.to_document(header))?;
        Ok(())
    }
}

impl fmt::Display for Properties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_document(None))
    }
}

impl FromStr for Properties {
    type Err = DiagramError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Join backslash-continued physical lines, keeping the first line number
fn logical_lines(input: &str) -> Vec<(usize, String)> {
    let mut lines = Vec::new();
    let mut pending: Option<(usize, String)> = None;

    for (idx, raw) in input.lines().enumerate() {
        let raw = raw.strip_suffix('\r').unwrap_or(raw);
        let (line_no, mut text) = match pending.take() {
            // continuation lines drop their leading whitespace
            Some((n, mut acc)) => {
                acc.push_str(raw.trim_start());
                (n, acc)
            }
            None => (idx + 1, raw.to_string()),
        };

        let is_comment = matches!(text.trim_start().chars().next(), Some('#') | Some('!'));
        if !is_comment && ends_with_continuation(&text) {
            text.pop();
            pending = Some((line_no, text));
        } else {
            lines.push((line_no, text));
        }
    }
    if let Some(rest) = pending {
        lines.push(rest);
    }
    lines
}

fn ends_with_continuation(text: &str) -> bool {
    let trailing = text.chars().rev().take_while(|c| *c == '\\').count();
    trailing % 2 == 1
}

fn escape(text: &str, is_key: bool) -> String {
    let mut out = String::with_capacity(text.len());
    for (i, c) in text.chars().enumerate() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\u{c}' => out.push_str("\\f"),
            ' ' if is_key || i == 0 => out.push_str("\\ "),
            '=' | ':' | '#' | '!' => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}

fn line_parser<'src>() -> impl Parser<'src, &'src str, Line> {
    let inline_ws = one_of(" \t\u{c}").repeated().ignored();

    let unicode_escape = just('u').ignore_then(
        any()
            .filter(|c: &char| c.is_ascii_hexdigit())
            .repeated()
            .exactly(4)
            .to_slice()
            .map(|hex: &str| {
                u32::from_str_radix(hex, 16)
                    .ok()
                    .and_then(char::from_u32)
                    .unwrap_or('\u{FFFD}')
            }),
    );

    let escape = just('\\').ignore_then(choice((
        unicode_escape,
        any().map(|c: char| match c {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            'f' => '\u{c}',
            other => other,
        }),
    )));

    let key = none_of("\\=: \t\u{c}")
        .or(escape.clone())
        .repeated()
        .at_least(1)
        .collect::<String>();

    let separator = inline_ws
        .clone()
        .then(one_of("=:").or_not())
        .then(inline_ws.clone())
        .ignored();

    let value = none_of('\\').or(escape).repeated().collect::<String>();

    let blank = inline_ws.clone().then(end()).to(Line::Blank);

    let comment = inline_ws
        .clone()
        .then(one_of("#!"))
        .then(any().repeated())
        .to(Line::Comment);

    let entry = inline_ws
        .ignore_then(key)
        .then_ignore(separator)
        .then(value)
        .then_ignore(end())
        .map(|(k, v)| Line::Entry(k, v));

    choice((blank, comment, entry))
}
