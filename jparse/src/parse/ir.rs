use std::fmt;

use smol_str::SmolStr;

use super::register::Register;
use crate::lex::{Token, TokenKind};

/// Source of an instruction operand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    Register(Register),
    /// Variable, by name.
    Ident(SmolStr),
    /// Immediate integer, written as in the source.
    Int(SmolStr),
}

impl Operand {
    #[inline]
    pub fn register(&self) -> Option<Register> {
        match self {
            Operand::Register(register) => Some(*register),
            _ => None,
        }
    }

    #[inline]
    pub fn is_immediate(&self) -> bool {
        matches!(self, Operand::Int(_))
    }
}

impl From<Token> for Operand {
    fn from(token: Token) -> Self {
        match token.kind {
            TokenKind::IntLiteral => Operand::Int(token.lexeme),
            _ => Operand::Ident(token.lexeme),
        }
    }
}

impl From<Register> for Operand {
    #[inline]
    fn from(register: Register) -> Self {
        Operand::Register(register)
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Operand::Register(register) => write!(f, "{register}"),
            Operand::Ident(name) => f.write_str(name),
            Operand::Int(value) => f.write_str(value),
        }
    }
}

/// Jump target. Each loop gets its own number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label {
    /// Start of the loop, before the condition.
    Begin(usize),
    /// Loop body.
    True(usize),
    /// After the loop.
    False(usize),
}

impl fmt::Display for Label {
    #[rustfmt::skip]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Label::Begin(n) => write!(f, "begin_{n}"),
            Label::True(n)  => write!(f, "true_{n}"),
            Label::False(n) => write!(f, "false_{n}"),
        }
    }
}

/// Target instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instr {
    Label(Label),
    /// `mov dst, src`
    Mov(Operand, Operand),
    /// `add dst, src`
    Add(Register, Operand),
    /// `sub dst, src`
    Sub(Register, Operand),
    /// `mul src`
    /// Multiply the accumulator by the operand.
    Mul(Operand),
    /// `div src`
    /// Divide the accumulator by the operand.
    Div(Operand),
    /// `cmp a, b`
    Cmp(Operand, Operand),
    /// Jump if less.
    Jl(Label),
    /// Jump if greater or equal.
    Jge(Label),
    /// Jump if greater.
    Jg(Label),
    /// Jump if less or equal.
    Jle(Label),
    Jmp(Label),
}

/// Outputs instruction as assembly.
impl fmt::Display for Instr {
    #[rustfmt::skip]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Instr::Label(label)  => write!(f, "{label}:"),
            Instr::Mov(dst, src) => write!(f, "\tmov\t{dst}, {src}"),
            Instr::Add(dst, src) => write!(f, "\tadd\t{dst}, {src}"),
            Instr::Sub(dst, src) => write!(f, "\tsub\t{dst}, {src}"),
            Instr::Mul(src)      => write!(f, "\tmul\t{src}"),
            Instr::Div(src)      => write!(f, "\tdiv\t{src}"),
            Instr::Cmp(a, b)     => write!(f, "\tcmp\t{a}, {b}"),
            Instr::Jl(label)     => write!(f, "\tjl\t{label}"),
            Instr::Jge(label)    => write!(f, "\tjge\t{label}"),
            Instr::Jg(label)     => write!(f, "\tjg\t{label}"),
            Instr::Jle(label)    => write!(f, "\tjle\t{label}"),
            Instr::Jmp(label)    => write!(f, "\tjmp\t{label}"),
        }
    }
}
