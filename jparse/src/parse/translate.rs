//! Code generation.
//!
//! Walks the same grammar as the [validator](super::GrammarValidator),
//! emitting instructions along the way. Operands and operators are kept
//! on two stacks, and reduced as soon as a production has seen both
//! sides of an operator. The shape of the grammar makes `*` and `/`
//! reduce before `+` and `-`.
use log::{debug, trace};

use super::{
    ir::{Instr, Label, Operand},
    register::{Register, RegisterTable},
    stack::Stack,
    Outcome, ParseConf,
};
use crate::{
    error::{JParseError, JParseResult},
    lex::{Record, Token, TokenKind},
    token_stream::TokenStream,
};

/// Translator for a token stream that passed the grammar check.
///
/// Tokens that do not fit are reported as [`JParseError::Desync`].
pub struct Translator<I> {
    stream: TokenStream<I>,
    operands: Stack<Operand>,
    operators: Stack<Token>,
    registers: RegisterTable,
    /// Number of `begin_N` labels issued.
    begin: usize,
    /// Number of `true_N`/`false_N` label pairs issued.
    branch: usize,
    out: Vec<Instr>,
}

impl<I> Translator<I>
where
    I: Iterator<Item = Record>,
{
    pub fn new(records: impl IntoIterator<IntoIter = I>) -> Self {
        Self::with_conf(records, &ParseConf::default())
    }

    pub fn with_conf(records: impl IntoIterator<IntoIter = I>, conf: &ParseConf) -> Self {
        Self {
            stream: TokenStream::new(records),
            operands: Stack::with_capacity(conf.stack_capacity),
            operators: Stack::with_capacity(conf.stack_capacity),
            registers: RegisterTable::new(),
            begin: 0,
            branch: 0,
            out: Vec::new(),
        }
    }

    /// Translate the whole stream.
    pub fn translate(mut self) -> JParseResult<Vec<Instr>> {
        let mut count = 0;
        while let Outcome::Statement = self.statement()? {
            count += 1;
        }
        debug!(
            "translated {} statements into {} instructions",
            count,
            self.out.len()
        );
        Ok(self.out)
    }

    /// Instructions emitted so far.
    #[inline]
    pub fn instructions(&self) -> &[Instr] {
        &self.out
    }

    /// Translate the next statement.
    pub fn statement(&mut self) -> JParseResult<Outcome> {
        let token = match self.stream.next_token() {
            Some(token) => token,
            None => return Ok(Outcome::EndOfInput),
        };

        if token.is(TokenKind::Keyword, "while") {
            self.begin += 1;
            let begin = self.begin;
            self.emit(Instr::Label(Label::Begin(begin)));

            self.expect(TokenKind::BracketOrDot, "(")?;
            let op = self.e()?;
            self.expect(TokenKind::BracketOrDot, ")")?;

            self.branch += 1;
            let branch = self.branch;
            let (jump_true, jump_false) = match op.lexeme.as_str() {
                "<" => (Instr::Jl(Label::True(branch)), Instr::Jge(Label::False(branch))),
                ">" => (Instr::Jg(Label::True(branch)), Instr::Jle(Label::False(branch))),
                _ => return Err(JParseError::Desync("unknown comparison operator")),
            };
            self.emit(jump_true);
            self.emit(jump_false);
            self.emit(Instr::Label(Label::True(branch)));

            self.a()?;

            self.emit(Instr::Jmp(Label::Begin(begin)));
            self.emit(Instr::Label(Label::False(branch)));
        } else {
            self.stream.unget(token);
            self.a()?;
        }
        self.expect(TokenKind::Semicolon, ";")?;

        if !self.operands.is_empty() || !self.operators.is_empty() {
            return Err(JParseError::Desync("stacks not empty after statement"));
        }
        if !self.registers.is_empty() {
            return Err(JParseError::Desync("registers still in use after statement"));
        }
        debug_assert!(self.stream.is_drained());

        Ok(Outcome::Statement)
    }

    fn emit(&mut self, instr: Instr) {
        trace!("{}", instr);
        self.out.push(instr);
    }

    fn expect(&mut self, kind: TokenKind, lexeme: &str) -> JParseResult<Token> {
        match self.stream.next_token() {
            Some(token) if token.is(kind, lexeme) => Ok(token),
            _ => Err(JParseError::Desync("unexpected token")),
        }
    }

    /// Consume the next token if it passes the predicate.
    fn accept(&mut self, predicate: impl Fn(&Token) -> bool) -> Option<Token> {
        match self.stream.next_token() {
            Some(token) if predicate(&token) => Some(token),
            Some(token) => {
                self.stream.unget(token);
                None
            }
            None => None,
        }
    }

    fn allocate(&mut self) -> JParseResult<Register> {
        self.registers
            .allocate()
            .ok_or(JParseError::RegisterExhausted)
    }

    /// Release the register holding the operand, if any.
    fn release(&mut self, operand: &Operand) {
        if let Some(register) = operand.register() {
            self.registers.free(register);
        }
    }

    /// Condition. Returns the comparison operator.
    fn e(&mut self) -> JParseResult<Token> {
        self.v()?;
        self.o()?;
        self.v()?;

        let right = self.operands.pop()?;
        let left = self.operands.pop()?;
        let op = self.operators.pop()?;
        self.emit(Instr::Cmp(left, right));

        Ok(op)
    }

    fn a(&mut self) -> JParseResult<()> {
        let dest = self
            .accept(|token| token.kind == TokenKind::Identifier)
            .ok_or(JParseError::Desync("expected assignment target"))?;
        self.expect(TokenKind::Assign, "=")?;
        self.c()?;

        let value = self.operands.pop()?;
        self.release(&value);
        self.emit(Instr::Mov(Operand::from(dest), value));

        Ok(())
    }

    fn v(&mut self) -> JParseResult<()> {
        let token = self
            .accept(|token| matches!(token.kind, TokenKind::Identifier | TokenKind::IntLiteral))
            .ok_or(JParseError::Desync("expected operand"))?;
        self.operands.push(Operand::from(token))
    }

    fn o(&mut self) -> JParseResult<()> {
        let token = self
            .accept(|token| token.is(TokenKind::Compare, "<") || token.is(TokenKind::Compare, ">"))
            .ok_or(JParseError::Desync("expected comparison operator"))?;
        self.operators.push(token)
    }

    fn c(&mut self) -> JParseResult<()> {
        self.t()?;
        self.c1()
    }

    /// Additive tail. Reduces `left (+|-) right` into a register.
    fn c1(&mut self) -> JParseResult<()> {
        if !self.p()? {
            return Ok(());
        }
        self.t()?;

        let right = self.operands.pop()?;
        let left = self.operands.pop()?;
        let op = self.operators.pop()?;

        let register = match left.register() {
            Some(register) => register,
            None => {
                let register = self.allocate()?;
                self.emit(Instr::Mov(register.into(), left));
                register
            }
        };

        match op.lexeme.as_str() {
            "+" => self.emit(Instr::Add(register, right.clone())),
            "-" => self.emit(Instr::Sub(register, right.clone())),
            _ => return Err(JParseError::Desync("unknown additive operator")),
        }
        self.release(&right);
        self.operands.push(register.into())?;

        self.c1()
    }

    fn t(&mut self) -> JParseResult<()> {
        self.v()?;
        self.t1()
    }

    /// Multiplicative tail. Reduces `left (*|/) right` through the
    /// accumulator, then moves the result out of it.
    fn t1(&mut self) -> JParseResult<()> {
        if !self.m()? {
            return Ok(());
        }
        self.v()?;

        let right = self.operands.pop()?;
        let left = self.operands.pop()?;
        let op = self.operators.pop()?;

        if left.register() != Some(Register::Eax) {
            let acc = self
                .registers
                .allocate_accumulator()
                .ok_or(JParseError::RegisterExhausted)?;
            self.release(&left);
            self.emit(Instr::Mov(acc.into(), left));
        }

        // mul and div take no immediate operand.
        let right = if right.is_immediate() {
            let register = self.allocate()?;
            self.emit(Instr::Mov(register.into(), right));
            Operand::Register(register)
        } else {
            right
        };

        match op.lexeme.as_str() {
            "*" => self.emit(Instr::Mul(right.clone())),
            "/" => self.emit(Instr::Div(right.clone())),
            _ => return Err(JParseError::Desync("unknown multiplicative operator")),
        }
        self.release(&right);

        let result = self.allocate()?;
        self.emit(Instr::Mov(result.into(), Register::Eax.into()));
        self.registers.free(Register::Eax);
        self.operands.push(result.into())?;

        self.t1()
    }

    fn p(&mut self) -> JParseResult<bool> {
        let token = self.accept(|token| {
            token.is(TokenKind::AddSub, "+") || token.is(TokenKind::AddSub, "-")
        });
        match token {
            Some(token) => {
                self.operators.push(token)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn m(&mut self) -> JParseResult<bool> {
        let token = self.accept(|token| {
            token.is(TokenKind::MulDiv, "*") || token.is(TokenKind::MulDiv, "/")
        });
        match token {
            Some(token) => {
                self.operators.push(token)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
