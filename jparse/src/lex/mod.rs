//! Source scanning.
mod dfa;
mod lexer;
mod scanner;
mod tokens;

pub use self::{
    dfa::{is_delimiter, State},
    lexer::{debug_print_lexer, tokenize, tokenize_str, LexSummary, Lexer},
    scanner::Scanner,
    tokens::{classify, Record, Token, TokenKind, KEYWORDS},
};

use crate::constants::BUF_SIZE;

/// Scanning options.
#[derive(Debug, Clone)]
pub struct LexConf {
    /// Number of source bytes read per chunk.
    pub buffer_size: usize,
}

impl Default for LexConf {
    fn default() -> Self {
        Self {
            buffer_size: BUF_SIZE,
        }
    }
}
