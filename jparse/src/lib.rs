pub mod constants;
mod error;
pub mod lex;
pub mod parse;
pub mod token_stream;

pub const IMPL_VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod prelude {
    pub use super::{
        error::{JParseError, JParseResult},
        lex::{LexConf, Lexer, Record, Token, TokenKind},
        parse::{Instr, Outcome, ParseConf},
    };
}

use self::{error::JParseResult, parse::Instr};

/// Run both stages over an in-memory source.
pub fn compile_str(source: &str) -> JParseResult<Vec<Instr>> {
    // Lexical analysis
    let records = lex::tokenize_str(source);

    // Grammar check, then code generation
    parse::compile(&records, &parse::ParseConf::default())
}
