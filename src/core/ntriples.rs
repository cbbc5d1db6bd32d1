//! Minimal N-Triples reader used to populate a [`MemoryGraph`].
//!
//! One triple per line: `subject predicate object .` where terms are
//! `<iri>`, `_:label`, or a quoted literal with an optional `@lang` or
//! `^^<datatype>` suffix.  Blank lines and `#` comments are skipped.

use std::path::Path;

use thiserror::Error;

use super::graph::{MemoryGraph, Triple};
use super::term::{Literal, Resource, Value};

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Parse `input` and assert every triple into `graph`.  Returns the number
/// of triples read (duplicates included).
pub fn load_str(graph: &mut MemoryGraph, input: &str) -> Result<usize, ParseError> {
    let mut count = 0;
    for (i, line) in input.lines().enumerate() {
        let Some(triple) = parse_line(line).map_err(|message| ParseError::Syntax {
            line: i + 1,
            message,
        })?
        else {
            continue;
        };
        graph.assert(triple);
        count += 1;
    }
    Ok(count)
}

pub fn load_file(graph: &mut MemoryGraph, path: &Path) -> Result<usize, ParseError> {
    let input = std::fs::read_to_string(path)?;
    let count = load_str(graph, &input)?;
    tracing::debug!(path = %path.display(), count, "loaded n-triples");
    Ok(count)
}

/// Parse a single line.  `Ok(None)` for blank and comment lines.
fn parse_line(line: &str) -> Result<Option<Triple>, String> {
    let mut cur = Cursor::new(line);
    cur.skip_ws();
    if cur.at_end() || cur.peek() == Some('#') {
        return Ok(None);
    }

    let subject = cur.resource()?;
    cur.skip_ws();
    let predicate = match cur.resource()? {
        Resource::Blank(_) => return Err("predicate must be an IRI".into()),
        iri => iri,
    };
    cur.skip_ws();
    let object = cur.value()?;
    cur.skip_ws();
    if !cur.eat('.') {
        return Err("expected '.' after object".into());
    }
    cur.skip_ws();
    if !cur.at_end() && cur.peek() != Some('#') {
        return Err("trailing characters after '.'".into());
    }

    Ok(Some(Triple::new(subject, predicate, object)))
}

// ───────────────────────────────────────── cursor ────────────

struct Cursor<'a> {
    rest: &'a str,
}

impl<'a> Cursor<'a> {
    fn new(s: &'a str) -> Self {
        Self { rest: s }
    }

    fn peek(&self) -> Option<char> {
        self.rest.chars().next()
    }

    fn at_end(&self) -> bool {
        self.rest.is_empty()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.rest = &self.rest[c.len_utf8()..];
        Some(c)
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn skip_ws(&mut self) {
        self.rest = self.rest.trim_start_matches([' ', '\t', '\r']);
    }

    fn resource(&mut self) -> Result<Resource, String> {
        match self.peek() {
            Some('<') => self.iri().map(Resource::iri),
            Some('_') => self.blank(),
            Some(c) => Err(format!("unexpected '{c}', expected IRI or blank node")),
            None => Err("unexpected end of line".into()),
        }
    }

    fn value(&mut self) -> Result<Value, String> {
        if self.peek() == Some('"') {
            self.literal().map(Value::Literal)
        } else {
            self.resource().map(Value::Resource)
        }
    }

    fn iri(&mut self) -> Result<String, String> {
        self.bump();
        let end = self
            .rest
            .find('>')
            .ok_or_else(|| "unterminated IRI".to_string())?;
        let iri = &self.rest[..end];
        if iri.contains(char::is_whitespace) {
            return Err(format!("whitespace in IRI <{iri}>"));
        }
        self.rest = &self.rest[end + 1..];
        Ok(iri.to_string())
    }

    fn blank(&mut self) -> Result<Resource, String> {
        if !self.rest.starts_with("_:") {
            return Err("expected '_:' blank node".into());
        }
        self.rest = &self.rest[2..];
        let end = self
            .rest
            .find(char::is_whitespace)
            .unwrap_or(self.rest.len());
        // Labels may contain '.', but never end with one.
        let label = self.rest[..end].trim_end_matches('.');
        if label.is_empty() {
            return Err("empty blank node label".into());
        }
        self.rest = &self.rest[label.len()..];
        Ok(Resource::blank(label))
    }

    fn literal(&mut self) -> Result<Literal, String> {
        self.bump();
        let mut lexical = String::new();
        loop {
            match self.bump() {
                None => return Err("unterminated literal".into()),
                Some('"') => break,
                Some('\\') => lexical.push(self.escape()?),
                Some(c) => lexical.push(c),
            }
        }

        if self.eat('@') {
            let end = self
                .rest
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-'))
                .unwrap_or(self.rest.len());
            if end == 0 {
                return Err("empty language tag".into());
            }
            let tag = &self.rest[..end];
            self.rest = &self.rest[end..];
            return Ok(Literal::lang(lexical, tag));
        }
        if self.rest.starts_with("^^") {
            self.rest = &self.rest[2..];
            if self.peek() != Some('<') {
                return Err("datatype must be an IRI".into());
            }
            let dt = self.iri()?;
            return Ok(Literal::typed(lexical, Resource::iri(dt)));
        }
        Ok(Literal::plain(lexical))
    }

    fn escape(&mut self) -> Result<char, String> {
        match self.bump() {
            Some('t') => Ok('\t'),
            Some('n') => Ok('\n'),
            Some('r') => Ok('\r'),
            Some('b') => Ok('\u{8}'),
            Some('f') => Ok('\u{c}'),
            Some('"') => Ok('"'),
            Some('\'') => Ok('\''),
            Some('\\') => Ok('\\'),
            Some('u') => self.unicode(4),
            Some('U') => self.unicode(8),
            Some(c) => Err(format!("unknown escape '\\{c}'")),
            None => Err("dangling escape".into()),
        }
    }

    fn unicode(&mut self, digits: usize) -> Result<char, String> {
        let hex = self
            .rest
            .get(..digits)
            .ok_or_else(|| "truncated unicode escape".to_string())?;
        let code = u32::from_str_radix(hex, 16).map_err(|_| format!("bad unicode escape {hex}"))?;
        self.rest = &self.rest[digits..];
        char::from_u32(code).ok_or_else(|| format!("invalid code point {hex}"))
    }
}
