//! Result and errors.
use std::{
    fmt::{self, Display, Formatter},
    io,
};

use crate::lex::Token;

pub type JParseResult<T> = std::result::Result<T, JParseError>;

#[derive(Debug)]
pub enum JParseError {
    /// A line of the intermediate token stream could not be read.
    ///
    /// `line` is the 1-based line number within the token stream text.
    Format { line: usize, message: String },
    /// A statement does not match the grammar.
    ///
    /// `statement` is the 1-based index of the offending statement,
    /// `found` the token that broke it, or `None` at end of input.
    Grammar { statement: usize, found: Option<Token> },
    /// All general purpose registers, or the accumulator, are occupied.
    RegisterExhausted,
    /// Operand or operator stack reached its capacity.
    StackOverflow { capacity: usize },
    /// Pop from an empty operand or operator stack.
    StackUnderflow,
    /// Translator and validator disagree about the token stream.
    Desync(&'static str),
    Io(io::Error),
    Fmt(fmt::Error),
}

impl Display for JParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Format { line, message } => {
                write!(f, "invalid token stream at line {line}: {message}")
            }
            Self::Grammar {
                statement,
                found: Some(token),
            } => write!(
                f,
                "grammar error in statement {statement}: unexpected {} '{}' on line {}",
                token.kind, token.lexeme, token.line
            ),
            Self::Grammar {
                statement,
                found: None,
            } => write!(f, "grammar error in statement {statement}: unexpected end of input"),
            Self::RegisterExhausted => write!(f, "no free register left"),
            Self::StackOverflow { capacity } => {
                write!(f, "translation stack exceeded its capacity of {capacity}")
            }
            Self::StackUnderflow => write!(f, "pop from an empty translation stack"),
            Self::Desync(msg) => write!(f, "translator out of sync: {msg}"),
            Self::Io(err) => write!(f, "{}", err),
            Self::Fmt(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for JParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Fmt(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for JParseError {
    fn from(err: io::Error) -> Self {
        JParseError::Io(err)
    }
}

impl From<fmt::Error> for JParseError {
    fn from(err: fmt::Error) -> Self {
        JParseError::Fmt(err)
    }
}
