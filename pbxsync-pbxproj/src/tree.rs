//! Lossless old-style property list tree.
//!
//! Every node remembers the byte span it was read from, so callers can
//! address an exact position in the original text (for example the closing
//! parenthesis of a `children` list) without re-scanning it.

use crate::error::ParseError;
use std::collections::BTreeMap;
use std::ops::Range;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Str(Str),
    Array(Array),
    Dict(Dict),
}

impl Value {
    pub fn span(&self) -> Range<usize> {
        match self {
            Value::Str(s) => s.span.clone(),
            Value::Array(a) => a.span.clone(),
            Value::Dict(d) => d.span.clone(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(&s.text),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&Dict> {
        match self {
            Value::Dict(d) => Some(d),
            _ => None,
        }
    }
}

/// A string scalar, quoted or bare. `text` is unescaped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Str {
    pub text: String,
    pub quoted: bool,
    pub span: Range<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Array {
    pub items: Vec<Item>,
    pub span: Range<usize>,
    /// Offset of the closing `)`.
    pub close: usize,
    /// False when the last item is not followed by a comma.
    pub trailing_comma: bool,
}

impl Array {
    /// String items, in order. Non-string items are skipped.
    pub fn strings(&self) -> impl Iterator<Item = &str> {
        self.items.iter().filter_map(|i| i.value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub value: Value,
    /// The block comment following the value, e.g. `/* Foo.swift */`.
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dict {
    pub entries: Vec<Entry>,
    pub span: Range<usize>,
    /// Offset of the closing `}`.
    pub close: usize,
}

impl Dict {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|e| e.key == key).map(|e| &e.value)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn get_array(&self, key: &str) -> Option<&Array> {
        self.get(key).and_then(Value::as_array)
    }

    pub fn get_dict(&self, key: &str) -> Option<&Dict> {
        self.get(key).and_then(Value::as_dict)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub key: String,
    /// The block comment between key and `=`, e.g. `ID /* Foo.swift */ = ...`.
    pub comment: Option<String>,
    pub value: Value,
    /// From the first byte of the key through the terminating `;`.
    pub span: Range<usize>,
}

/// Positions of `/* Begin X section */` and `/* End X section */` comments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionMarkers {
    pub begin: Option<usize>,
    pub end: Option<usize>,
}

/// A parsed document: the root dictionary plus section markers keyed by name.
#[derive(Debug, Clone)]
pub struct Document {
    pub root: Dict,
    pub sections: BTreeMap<String, SectionMarkers>,
}

pub fn parse_document(src: &str) -> Result<Document, ParseError> {
    let mut p = Parser::new(src);
    p.skip_trivia()?;
    let root = match p.peek() {
        Some(b'{') => p.parse_dict()?,
        Some(_) => return Err(p.unexpected("'{'")),
        None => return Err(p.eof("'{'")),
    };
    p.skip_trivia()?;
    if p.peek().is_some() {
        return Err(p.unexpected("end of input"));
    }
    Ok(Document {
        root,
        sections: p.sections,
    })
}

struct Parser<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
    sections: BTreeMap<String, SectionMarkers>,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            pos: 0,
            sections: BTreeMap::new(),
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_at(&self, ahead: usize) -> Option<u8> {
        self.bytes.get(self.pos + ahead).copied()
    }

    fn line_of(&self, offset: usize) -> usize {
        let end = offset.min(self.bytes.len());
        self.bytes[..end].iter().filter(|&&b| b == b'\n').count() + 1
    }

    fn eof(&self, expected: &'static str) -> ParseError {
        ParseError::UnexpectedEof {
            expected,
            line: self.line_of(self.pos),
        }
    }

    fn unexpected(&self, expected: &'static str) -> ParseError {
        let found = self.src[self.pos..].chars().next().unwrap_or('\0');
        ParseError::Unexpected {
            found,
            expected,
            offset: self.pos,
            line: self.line_of(self.pos),
        }
    }

    fn expect(&mut self, byte: u8, expected: &'static str) -> Result<(), ParseError> {
        match self.peek() {
            Some(b) if b == byte => {
                self.pos += 1;
                Ok(())
            }
            Some(_) => Err(self.unexpected(expected)),
            None => Err(self.eof(expected)),
        }
    }

    /// Skips whitespace and comments. Returns the first block comment seen.
    fn skip_trivia(&mut self) -> Result<Option<String>, ParseError> {
        let mut first = None;
        loop {
            match self.peek() {
                Some(b) if b.is_ascii_whitespace() => self.pos += 1,
                Some(b'/') if self.peek_at(1) == Some(b'*') => {
                    let start = self.pos;
                    let body = start + 2;
                    let Some(rel) = self.src[body..].find("*/") else {
                        return Err(ParseError::Unterminated {
                            what: "comment",
                            offset: start,
                            line: self.line_of(start),
                        });
                    };
                    let text = self.src[body..body + rel].trim();
                    self.note_marker(text, start);
                    if first.is_none() {
                        first = Some(text.to_string());
                    }
                    self.pos = body + rel + 2;
                }
                Some(b'/') if self.peek_at(1) == Some(b'/') => {
                    match self.src[self.pos..].find('\n') {
                        Some(rel) => self.pos += rel + 1,
                        None => self.pos = self.bytes.len(),
                    }
                }
                _ => return Ok(first),
            }
        }
    }

    fn note_marker(&mut self, text: &str, offset: usize) {
        let Some(rest) = text.strip_suffix(" section") else {
            return;
        };
        if let Some(name) = rest.strip_prefix("Begin ") {
            self.sections.entry(name.to_string()).or_default().begin = Some(offset);
        } else if let Some(name) = rest.strip_prefix("End ") {
            self.sections.entry(name.to_string()).or_default().end = Some(offset);
        }
    }

    fn parse_value(&mut self) -> Result<Value, ParseError> {
        match self.peek() {
            Some(b'{') => self.parse_dict().map(Value::Dict),
            Some(b'(') => self.parse_array().map(Value::Array),
            Some(_) => self.parse_string().map(Value::Str),
            None => Err(self.eof("value")),
        }
    }

    fn parse_dict(&mut self) -> Result<Dict, ParseError> {
        let start = self.pos;
        self.expect(b'{', "'{'")?;
        let mut entries = Vec::new();
        loop {
            self.skip_trivia()?;
            match self.peek() {
                Some(b'}') => {
                    let close = self.pos;
                    self.pos += 1;
                    return Ok(Dict {
                        entries,
                        span: start..self.pos,
                        close,
                    });
                }
                None => return Err(self.eof("'}'")),
                _ => {}
            }

            let key_start = self.pos;
            let key = self.parse_string()?.text;
            let comment = self.skip_trivia()?;
            self.expect(b'=', "'='")?;
            self.skip_trivia()?;
            let value = self.parse_value()?;
            self.skip_trivia()?;
            self.expect(b';', "';'")?;
            entries.push(Entry {
                key,
                comment,
                value,
                span: key_start..self.pos,
            });
        }
    }

    fn parse_array(&mut self) -> Result<Array, ParseError> {
        let start = self.pos;
        self.expect(b'(', "'('")?;
        let mut items = Vec::new();
        let mut trailing_comma = true;
        loop {
            self.skip_trivia()?;
            match self.peek() {
                Some(b')') => {
                    let close = self.pos;
                    self.pos += 1;
                    return Ok(Array {
                        items,
                        span: start..self.pos,
                        close,
                        trailing_comma,
                    });
                }
                None => return Err(self.eof("')'")),
                _ => {}
            }

            let value = self.parse_value()?;
            let comment = self.skip_trivia()?;
            items.push(Item { value, comment });
            match self.peek() {
                Some(b',') => {
                    self.pos += 1;
                    trailing_comma = true;
                }
                Some(b')') => trailing_comma = false,
                Some(_) => return Err(self.unexpected("',' or ')'")),
                None => return Err(self.eof("')'")),
            }
        }
    }

    fn parse_string(&mut self) -> Result<Str, ParseError> {
        match self.peek() {
            Some(b'"') => self.parse_quoted(),
            Some(_) => self.parse_bare(),
            None => Err(self.eof("string")),
        }
    }

    fn parse_bare(&mut self) -> Result<Str, ParseError> {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if is_delimiter(b) {
                break;
            }
            if b == b'/' && matches!(self.peek_at(1), Some(b'*') | Some(b'/')) {
                break;
            }
            self.pos += 1;
        }
        if self.pos == start {
            return Err(self.unexpected("string"));
        }
        // Delimiters are ASCII, so `pos` sits on a char boundary.
        Ok(Str {
            text: self.src[start..self.pos].to_string(),
            quoted: false,
            span: start..self.pos,
        })
    }

    fn parse_quoted(&mut self) -> Result<Str, ParseError> {
        let start = self.pos;
        self.pos += 1;
        let mut text = String::new();
        let mut chars = self.src[self.pos..].char_indices();
        while let Some((i, c)) = chars.next() {
            match c {
                '"' => {
                    self.pos += i + 1;
                    return Ok(Str {
                        text,
                        quoted: true,
                        span: start..self.pos,
                    });
                }
                '\\' => match chars.next() {
                    Some((_, 'n')) => text.push('\n'),
                    Some((_, 't')) => text.push('\t'),
                    Some((_, 'r')) => text.push('\r'),
                    Some((_, 'U')) => {
                        let hex: String = chars.by_ref().take(4).map(|(_, c)| c).collect();
                        match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                            Some(decoded) => text.push(decoded),
                            None => {
                                text.push_str("\\U");
                                text.push_str(&hex);
                            }
                        }
                    }
                    Some((_, other)) => text.push(other),
                    None => break,
                },
                other => text.push(other),
            }
        }
        Err(ParseError::Unterminated {
            what: "string",
            offset: start,
            line: self.line_of(start),
        })
    }
}

fn is_delimiter(b: u8) -> bool {
    b.is_ascii_whitespace() || matches!(b, b'{' | b'}' | b'(' | b')' | b';' | b',' | b'=' | b'"')
}
