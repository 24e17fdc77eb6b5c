//! Statement parsing and code generation.
mod grammar;
mod ir;
mod register;
mod stack;
mod translate;

use std::io::Write;

use itertools::Itertools;
use log::debug;

pub use self::{
    grammar::GrammarValidator,
    ir::{Instr, Label, Operand},
    register::{Register, RegisterTable},
    stack::Stack,
    translate::Translator,
};
use crate::{constants::STACK_SIZE, error::JParseResult, lex::Record};

/// Result of parsing one statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A statement was consumed.
    Statement,
    /// No tokens left.
    EndOfInput,
}

/// Translation options.
#[derive(Debug, Clone)]
pub struct ParseConf {
    /// Bound of the operand and operator stacks.
    pub stack_capacity: usize,
}

impl Default for ParseConf {
    fn default() -> Self {
        Self {
            stack_capacity: STACK_SIZE,
        }
    }
}

/// Check the grammar of every statement in the records.
///
/// Returns the number of statements.
pub fn validate(records: &[Record]) -> JParseResult<usize> {
    GrammarValidator::new(records.iter().cloned()).validate()
}

/// Translate records that passed [`validate`].
pub fn translate(records: &[Record], conf: &ParseConf) -> JParseResult<Vec<Instr>> {
    Translator::with_conf(records.iter().cloned(), conf).translate()
}

/// Validate, then translate.
///
/// Nothing is translated if any statement is rejected.
pub fn compile(records: &[Record], conf: &ParseConf) -> JParseResult<Vec<Instr>> {
    let statements = validate(records)?;
    debug!("translating {} statements", statements);
    translate(records, conf)
}

/// Write instructions one per line.
pub fn write_instructions<W: Write>(out: &mut W, instructions: &[Instr]) -> JParseResult<()> {
    for instr in instructions {
        writeln!(out, "{instr}")?;
    }
    Ok(())
}

/// Instructions as one block of text, without a trailing newline.
pub fn listing(instructions: &[Instr]) -> String {
    instructions.iter().join("\n")
}
