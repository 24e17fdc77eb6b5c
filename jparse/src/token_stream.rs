//! Intermediate token stream.
//!
//! The scanner and the parser meet at a line based text format:
//!
//! ```text
//! 0x103	while
//! 0x102
//! 0x101	@@@ at line 2
//! 0x102	\n
//! line 2 has 3 words
//! total 12 words
//! ```
//!
//! Token lines carry a hexadecimal tag, a tab and the lexeme. Whitespace
//! lexemes are escaped so every record stays on one line.
use std::{
    fmt,
    io::{BufRead, Write},
};

use log::warn;

use crate::{
    constants::{TAG_MAX, TAG_MIN},
    error::{JParseError, JParseResult},
    lex::{Record, Token, TokenKind},
};

const MALFORMED_SUFFIX: &str = " at line ";

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Record::Token(token) => match token.kind {
                TokenKind::Malformed => write!(
                    f,
                    "0x{:x}\t{}{}{}",
                    token.kind.tag(),
                    token.lexeme,
                    MALFORMED_SUFFIX,
                    token.line
                ),
                TokenKind::Whitespace => {
                    write!(f, "0x{:x}\t", token.kind.tag())?;
                    for c in token.lexeme.chars() {
                        match c {
                            '\t' => f.write_str("\\t")?,
                            '\r' => f.write_str("\\r")?,
                            '\n' => f.write_str("\\n")?,
                            _ => write!(f, "{c}")?,
                        }
                    }
                    Ok(())
                }
                _ => write!(f, "0x{:x}\t{}", token.kind.tag(), token.lexeme),
            },
            Record::Line { line, words: 1 } => write!(f, "line {line} has 1 word"),
            Record::Line { line, words } => write!(f, "line {line} has {words} words"),
            Record::Total { words } => write!(f, "total {words} words"),
        }
    }
}

/// Write one record as a line of the token stream.
#[inline]
pub fn write_record<W: Write>(out: &mut W, record: &Record) -> JParseResult<()> {
    writeln!(out, "{record}")?;
    Ok(())
}

pub fn write_records<'a, W, I>(out: &mut W, records: I) -> JParseResult<()>
where
    W: Write,
    I: IntoIterator<Item = &'a Record>,
{
    for record in records {
        write_record(out, record)?;
    }
    Ok(())
}

/// Decode one line of the token stream.
///
/// `line_no` is the position of the line in the stream, used for errors.
/// `source_line` is the source line that token records are attributed to;
/// malformed tokens carry their own.
pub fn decode_line(text: &str, line_no: usize, source_line: usize) -> JParseResult<Record> {
    let format_err = |message: String| JParseError::Format {
        line: line_no,
        message,
    };

    if let Some(hex) = text.strip_prefix("0x") {
        let (tag, lexeme) = hex
            .split_once('\t')
            .ok_or_else(|| format_err("missing tab after tag".to_string()))?;
        let tag = u16::from_str_radix(tag, 16)
            .map_err(|_| format_err(format!("invalid tag '0x{tag}'")))?;
        if !(TAG_MIN..=TAG_MAX).contains(&tag) {
            return Err(format_err(format!("tag 0x{tag:x} out of range")));
        }
        let kind = TokenKind::from_tag(tag)
            .ok_or_else(|| format_err(format!("reserved tag 0x{tag:x}")))?;

        let token = match kind {
            TokenKind::Malformed => {
                let (lexeme, line) = lexeme
                    .rsplit_once(MALFORMED_SUFFIX)
                    .ok_or_else(|| format_err("malformed word without line".to_string()))?;
                let line = line
                    .parse()
                    .map_err(|_| format_err(format!("invalid line number '{line}'")))?;
                Token::new(kind, lexeme, line)
            }
            TokenKind::Whitespace => Token::new(kind, unescape(lexeme), source_line),
            _ => Token::new(kind, lexeme, source_line),
        };

        if token.lexeme.is_empty() {
            return Err(format_err("empty lexeme".to_string()));
        }

        return Ok(Record::Token(token));
    }

    if let Some(rest) = text.strip_prefix("line ") {
        let (line, words) = rest
            .split_once(" has ")
            .ok_or_else(|| format_err(format!("unknown line '{text}'")))?;
        let words = words
            .strip_suffix(" words")
            .or_else(|| words.strip_suffix(" word"))
            .ok_or_else(|| format_err(format!("unknown line '{text}'")))?;
        return Ok(Record::Line {
            line: parse_count(line, line_no)?,
            words: parse_count(words, line_no)?,
        });
    }

    if let Some(words) = text
        .strip_prefix("total ")
        .and_then(|rest| rest.strip_suffix(" words"))
    {
        return Ok(Record::Total {
            words: parse_count(words, line_no)?,
        });
    }

    Err(format_err(format!("unknown line '{text}'")))
}

fn parse_count(text: &str, line_no: usize) -> JParseResult<usize> {
    text.parse().map_err(|_| JParseError::Format {
        line: line_no,
        message: format!("invalid count '{text}'"),
    })
}

fn unescape(lexeme: &str) -> String {
    let mut out = String::with_capacity(lexeme.len());
    let mut chars = lexeme.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('t') => out.push('\t'),
                Some('r') => out.push('\r'),
                Some('n') => out.push('\n'),
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                }
                None => out.push('\\'),
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Reads records from a token stream, one line at a time.
pub struct Decoder<R> {
    reader: R,
    buf: String,
    /// Lines read so far.
    line_no: usize,
    /// Source line of the next token record.
    source_line: usize,
}

impl<R: BufRead> Decoder<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: String::new(),
            line_no: 0,
            source_line: 1,
        }
    }

    /// Decode the next record.
    ///
    /// Returns `Ok(None)` at the end of the stream.
    pub fn next_record(&mut self) -> JParseResult<Option<Record>> {
        self.buf.clear();
        if self.reader.read_line(&mut self.buf)? == 0 {
            return Ok(None);
        }
        self.line_no += 1;

        // Only the line terminator is stripped. Whitespace lexemes are
        // escaped, but a space is written as is.
        let text = self.buf.strip_suffix('\n').unwrap_or(self.buf.as_str());
        let text = text.strip_suffix('\r').unwrap_or(text);

        let record = decode_line(text, self.line_no, self.source_line)?;
        if let Record::Line { line, .. } = record {
            self.source_line = line + 1;
        }

        Ok(Some(record))
    }
}

impl<R: BufRead> Iterator for Decoder<R> {
    type Item = JParseResult<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}

/// Read and check a whole token stream.
///
/// Fails on the first line that is not a well formed record.
pub fn read_records<R: BufRead>(reader: R) -> JParseResult<Vec<Record>> {
    Decoder::new(reader).collect()
}

#[inline]
pub fn decode_str(text: &str) -> JParseResult<Vec<Record>> {
    read_records(text.as_bytes())
}

/// Token reader for the parser passes, with one token of pushback.
///
/// Counter records and whitespace are skipped. Malformed words are
/// reported and skipped, so the words around them still parse.
pub struct TokenStream<I> {
    records: I,
    /// Token returned by [`TokenStream::unget`].
    pushback: Option<Token>,
    /// The most recently consumed token.
    prev: Option<Token>,
}

impl<I> TokenStream<I>
where
    I: Iterator<Item = Record>,
{
    pub fn new(records: impl IntoIterator<IntoIter = I>) -> Self {
        Self {
            records: records.into_iter(),
            pushback: None,
            prev: None,
        }
    }

    /// Consume the next significant token.
    ///
    /// Returns `None` at the end of the stream.
    pub fn next_token(&mut self) -> Option<Token> {
        let token = match self.pushback.take() {
            Some(token) => Some(token),
            None => self.fetch(),
        };
        if token.is_some() {
            self.prev = token.clone();
        }
        token
    }

    /// Return a token, so it is the next one read again.
    ///
    /// There is room for one token only. A second token
    /// is dropped.
    pub fn unget(&mut self, token: Token) {
        debug_assert!(self.pushback.is_none(), "pushback slot already taken");
        if self.pushback.is_none() {
            self.pushback = Some(token);
        }
    }

    /// Return the next significant token without consuming it.
    pub fn peek(&mut self) -> Option<&Token> {
        if self.pushback.is_none() {
            self.pushback = self.fetch();
        }
        self.pushback.as_ref()
    }

    /// The most recently consumed token.
    #[inline]
    pub fn previous_token(&self) -> Option<&Token> {
        self.prev.as_ref()
    }

    /// True when no token is waiting in the pushback slot.
    #[inline]
    pub fn is_drained(&self) -> bool {
        self.pushback.is_none()
    }

    fn fetch(&mut self) -> Option<Token> {
        for record in self.records.by_ref() {
            match record {
                Record::Token(token) if token.kind.is_trivia() => {}
                Record::Token(token) if token.kind == TokenKind::Malformed => {
                    warn!(
                        "skipping malformed word '{}' at line {}",
                        token.lexeme, token.line
                    );
                }
                Record::Token(token) => return Some(token),
                Record::Line { .. } | Record::Total { .. } => {}
            }
        }
        None
    }
}
