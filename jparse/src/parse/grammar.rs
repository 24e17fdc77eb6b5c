//! Grammar check.
//!
//! ```text
//! S  -> 'while' '(' E ')' A ';' | A ';'
//! E  -> V O V
//! A  -> IDENT '=' C
//! V  -> IDENT | INT
//! O  -> '<' | '>'
//! C  -> T C1
//! C1 -> P T C1 | ε
//! T  -> V T1
//! T1 -> M V T1 | ε
//! P  -> '+' | '-'
//! M  -> '*' | '/'
//! ```
use log::debug;

use super::Outcome;
use crate::{
    error::{JParseError, JParseResult},
    lex::{Record, Token, TokenKind},
    token_stream::TokenStream,
};

/// Recognizer for the statement grammar.
///
/// Every production is a check that consumes the tokens it matches.
/// A check that fails on a token puts it back, so the token is still
/// there to report when the statement is rejected.
pub struct GrammarValidator<I> {
    stream: TokenStream<I>,
    /// Number of statements started.
    statements: usize,
}

impl<I> GrammarValidator<I>
where
    I: Iterator<Item = Record>,
{
    pub fn new(records: impl IntoIterator<IntoIter = I>) -> Self {
        Self {
            stream: TokenStream::new(records),
            statements: 0,
        }
    }

    /// Check the whole stream.
    ///
    /// Returns the number of statements on success.
    pub fn validate(mut self) -> JParseResult<usize> {
        while let Outcome::Statement = self.statement()? {}
        debug!("grammar check passed, {} statements", self.statements);
        Ok(self.statements)
    }

    /// Check the next statement.
    pub fn statement(&mut self) -> JParseResult<Outcome> {
        let token = match self.stream.next_token() {
            Some(token) => token,
            None => return Ok(Outcome::EndOfInput),
        };
        self.statements += 1;

        let is_match = if token.is(TokenKind::Keyword, "while") {
            self.punct(TokenKind::BracketOrDot, "(")
                && self.e()
                && self.punct(TokenKind::BracketOrDot, ")")
                && self.a()
                && self.punct(TokenKind::Semicolon, ";")
        } else {
            self.stream.unget(token);
            self.a() && self.punct(TokenKind::Semicolon, ";")
        };

        if is_match {
            debug_assert!(self.stream.is_drained());
            Ok(Outcome::Statement)
        } else {
            Err(JParseError::Grammar {
                statement: self.statements,
                found: self.stream.peek().cloned(),
            })
        }
    }

    /// Consume the next token if it passes the predicate.
    fn accept(&mut self, predicate: impl Fn(&Token) -> bool) -> bool {
        match self.stream.next_token() {
            Some(token) if predicate(&token) => true,
            Some(token) => {
                self.stream.unget(token);
                false
            }
            None => false,
        }
    }

    fn punct(&mut self, kind: TokenKind, lexeme: &str) -> bool {
        self.accept(|token| token.is(kind, lexeme))
    }

    fn e(&mut self) -> bool {
        self.v() && self.o() && self.v()
    }

    fn a(&mut self) -> bool {
        self.accept(|token| token.kind == TokenKind::Identifier)
            && self.punct(TokenKind::Assign, "=")
            && self.c()
    }

    fn v(&mut self) -> bool {
        self.accept(|token| matches!(token.kind, TokenKind::Identifier | TokenKind::IntLiteral))
    }

    fn o(&mut self) -> bool {
        self.accept(|token| {
            token.is(TokenKind::Compare, "<") || token.is(TokenKind::Compare, ">")
        })
    }

    fn c(&mut self) -> bool {
        self.t() && self.c1()
    }

    fn c1(&mut self) -> bool {
        if self.p() {
            self.t() && self.c1()
        } else {
            true
        }
    }

    fn t(&mut self) -> bool {
        self.v() && self.t1()
    }

    fn t1(&mut self) -> bool {
        if self.m() {
            self.v() && self.t1()
        } else {
            true
        }
    }

    fn p(&mut self) -> bool {
        self.accept(|token| token.is(TokenKind::AddSub, "+") || token.is(TokenKind::AddSub, "-"))
    }

    fn m(&mut self) -> bool {
        self.accept(|token| token.is(TokenKind::MulDiv, "*") || token.is(TokenKind::MulDiv, "/"))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::lex::tokenize_str;

    fn validate(source: &str) -> JParseResult<usize> {
        GrammarValidator::new(tokenize_str(source)).validate()
    }

    #[test]
    fn test_accept_statements() {
        assert_eq!(validate("x = 1 ;").unwrap(), 1);
        assert_eq!(validate("x = y ; y = 1 + 2 * 3 - z / 4 ;").unwrap(), 2);
        assert_eq!(validate("while ( i < 10 ) i = i + 1 ;").unwrap(), 1);
        assert_eq!(validate("while(a>b)a=a-b;").unwrap(), 1);
        assert_eq!(validate("").unwrap(), 0);
        assert_eq!(validate("/* nothing */\n").unwrap(), 0);
    }

    #[test]
    fn test_reject_comparison_operator() {
        let err = validate("x <= 1 ;").unwrap_err();
        match err {
            JParseError::Grammar {
                statement: 1,
                found: Some(token),
            } => assert_eq!(token, Token::new(TokenKind::Compare, "<=", 1)),
            err => panic!("unexpected error: {err}"),
        }

        assert!(validate("while ( i <= 10 ) i = 1 ;").is_err());
        assert!(validate("while ( i == 10 ) i = 1 ;").is_err());
    }

    #[test]
    fn test_reject_operators_outside_grammar() {
        assert!(validate("x = 1 % 2 ;").is_err());
        assert!(validate("x = ( 1 ) ;").is_err());
        assert!(validate("x += 1 ;").is_err());
        assert!(validate("x = 1.5 ;").is_err());
        assert!(validate("while = 1 ;").is_err());
    }

    #[test]
    fn test_reports_statement_index() {
        let err = validate("a = 1 ;\nb = 2 ;\nc = ;").unwrap_err();
        match err {
            JParseError::Grammar {
                statement: 3,
                found: Some(token),
            } => assert_eq!(token, Token::new(TokenKind::Semicolon, ";", 3)),
            err => panic!("unexpected error: {err}"),
        }
    }

    #[test]
    fn test_missing_semicolon_at_end() {
        let err = validate("x = 1").unwrap_err();
        assert!(matches!(
            err,
            JParseError::Grammar {
                statement: 1,
                found: None
            }
        ));
    }

    #[test]
    fn test_malformed_word_is_skipped() {
        assert_eq!(validate("@@@ x = 1 ;").unwrap(), 1);
    }
}
