//! Lexical analysis
use std::{
    io::{Read, Write},
    str::Chars,
};

use log::debug;

use super::{
    scanner::Scanner,
    tokens::{Record, Token, TokenKind},
    LexConf,
};
use crate::{error::JParseResult, token_stream};

pub fn debug_print_lexer(lexer: Lexer) {
    println!("Source Byte Count: {}", lexer.source_code().len());

    for record in lexer {
        match record {
            Record::Token(token) => {
                let fragment = match token.lexeme.as_str() {
                    "\n" => "\\n",
                    "\t" => "\\t",
                    "\r" => "\\r",
                    fragment => fragment,
                };
                println!(
                    "{:4} 0x{:x} {:<16} {:?}",
                    token.line,
                    token.kind.tag(),
                    fragment,
                    token.kind
                );
            }
            record => println!("{record}"),
        }
    }
}

/// Lexical analyzer over an in-memory source.
///
/// Records are produced lazily, one source character at a time.
/// The iterator ends after the [`Record::Total`] record.
pub struct Lexer<'a> {
    /// Keep reference to the source so callers can
    /// get back at the original text.
    original: &'a str,
    chars: Chars<'a>,
    scanner: Scanner,
}

impl<'a> Lexer<'a> {
    pub fn new(source_code: &'a str) -> Self {
        Self {
            original: source_code,
            chars: source_code.chars(),
            scanner: Scanner::new(),
        }
    }

    /// Original source code that was passed in during construction.
    pub fn source_code(&self) -> &'a str {
        self.original
    }

    /// Scan until the next record is ready.
    pub fn next_record(&mut self) -> Option<Record> {
        loop {
            if let Some(record) = self.scanner.pop() {
                return Some(record);
            }

            match self.chars.next() {
                Some(c) => self.scanner.feed_char(c),
                None if !self.scanner.is_finished() => self.scanner.finish(),
                None => return None,
            }
        }
    }

    /// Only the tokens, without the counter records.
    pub fn tokens(self) -> impl Iterator<Item = Token> + 'a {
        self.filter_map(Record::into_token)
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Record;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.next_record()
    }
}

/// Totals of one scanning pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LexSummary {
    pub lines: usize,
    pub words: usize,
    pub malformed: usize,
}

impl LexSummary {
    fn count(&mut self, record: &Record) {
        match record {
            Record::Token(token) if token.kind == TokenKind::Malformed => self.malformed += 1,
            Record::Token(_) => {}
            Record::Line { line, .. } => self.lines = *line,
            Record::Total { words } => self.words = *words,
        }
    }
}

/// Scan a source from a reader and write the token stream to `out`.
///
/// The source is read in chunks of [`LexConf::buffer_size`] bytes.
/// A UTF-8 sequence split over two chunks is carried over to the
/// next one. Invalid UTF-8 is replaced with U+FFFD, which scans as
/// a malformed word.
pub fn tokenize<R, W>(mut reader: R, mut out: W, conf: &LexConf) -> JParseResult<LexSummary>
where
    R: Read,
    W: Write,
{
    let mut scanner = Scanner::new();
    let mut summary = LexSummary::default();
    let mut buffer = vec![0u8; conf.buffer_size.max(4)];
    // Number of bytes at the start of the buffer left over
    // from an incomplete UTF-8 sequence.
    let mut carry = 0;

    loop {
        let nread = reader.read(&mut buffer[carry..])?;
        if nread == 0 {
            if carry > 0 {
                scanner.feed(&String::from_utf8_lossy(&buffer[..carry]));
            }
            break;
        }

        let end = carry + nread;
        carry = feed_utf8(&mut scanner, &buffer[..end]);
        buffer.copy_within(end - carry..end, 0);

        for record in scanner.drain() {
            summary.count(&record);
            token_stream::write_record(&mut out, &record)?;
        }
    }

    scanner.finish();
    for record in scanner.drain() {
        summary.count(&record);
        token_stream::write_record(&mut out, &record)?;
    }
    out.flush()?;

    debug!(
        "scanned {} lines, {} words, {} malformed",
        summary.lines, summary.words, summary.malformed
    );

    Ok(summary)
}

/// Feed the valid UTF-8 prefix of `bytes` to the scanner.
///
/// Returns the length of the incomplete sequence at the end, which
/// the caller keeps for the next read.
fn feed_utf8(scanner: &mut Scanner, bytes: &[u8]) -> usize {
    let mut rest = bytes;

    loop {
        match std::str::from_utf8(rest) {
            Ok(text) => {
                scanner.feed(text);
                return 0;
            }
            Err(err) => {
                let (valid, tail) = rest.split_at(err.valid_up_to());
                // Validated by `from_utf8` above.
                scanner.feed(&String::from_utf8_lossy(valid));

                match err.error_len() {
                    Some(len) => {
                        scanner.feed_char(char::REPLACEMENT_CHARACTER);
                        rest = &tail[len..];
                    }
                    // Sequence continues in the next chunk.
                    None => return tail.len(),
                }
            }
        }
    }
}

/// Scan a whole in-memory source.
pub fn tokenize_str(source_code: &str) -> Vec<Record> {
    Lexer::new(source_code).collect()
}

#[cfg(test)]
mod test {
    use super::*;

    fn lex(source: &str) -> Vec<(TokenKind, String)> {
        Lexer::new(source)
            .tokens()
            .filter(|token| !token.kind.is_trivia())
            .map(|token| (token.kind, token.lexeme.to_string()))
            .collect()
    }

    fn kinds(source: &str) -> Vec<TokenKind> {
        lex(source).into_iter().map(|(kind, _)| kind).collect()
    }

    fn single(source: &str) -> (TokenKind, String) {
        let tokens = lex(source);
        assert_eq!(tokens.len(), 1, "{source:?} scanned as {tokens:?}");
        tokens.into_iter().next().unwrap()
    }

    #[test]
    fn test_longest_identifier() {
        assert_eq!(single("abc123 "), (TokenKind::Identifier, "abc123".to_string()));
        assert_eq!(single("$_x9"), (TokenKind::Identifier, "$_x9".to_string()));
        assert_eq!(single("while"), (TokenKind::Keyword, "while".to_string()));
        assert_eq!(single("true"), (TokenKind::BooleanLiteral, "true".to_string()));
    }

    #[test]
    #[rustfmt::skip]
    fn test_operator_maximal_munch() {
        assert_eq!(single(">>>="), (TokenKind::Assign,        ">>>=".to_string()));
        assert_eq!(single(">>>"),  (TokenKind::Shift,         ">>>".to_string()));
        assert_eq!(single(">>="),  (TokenKind::Assign,        ">>=".to_string()));
        assert_eq!(single(">>"),   (TokenKind::Shift,         ">>".to_string()));
        assert_eq!(single(">="),   (TokenKind::Compare,       ">=".to_string()));
        assert_eq!(single("<<="),  (TokenKind::Assign,        "<<=".to_string()));
        assert_eq!(single("<<"),   (TokenKind::Shift,         "<<".to_string()));
        assert_eq!(single("<="),   (TokenKind::Compare,       "<=".to_string()));
        assert_eq!(single("&&"),   (TokenKind::LogicAnd,      "&&".to_string()));
        assert_eq!(single("&="),   (TokenKind::Assign,        "&=".to_string()));
        assert_eq!(single("||"),   (TokenKind::LogicOr,       "||".to_string()));
        assert_eq!(single("|"),    (TokenKind::BitOr,         "|".to_string()));
        assert_eq!(single("^"),    (TokenKind::Xor,           "^".to_string()));
        assert_eq!(single("++"),   (TokenKind::UnaryOrIncDec, "++".to_string()));
        assert_eq!(single("--"),   (TokenKind::UnaryOrIncDec, "--".to_string()));
        assert_eq!(single("-="),   (TokenKind::Assign,        "-=".to_string()));
        assert_eq!(single("=="),   (TokenKind::Equality,      "==".to_string()));
        assert_eq!(single("!="),   (TokenKind::Equality,      "!=".to_string()));
        assert_eq!(single("!"),    (TokenKind::UnaryOrIncDec, "!".to_string()));
        assert_eq!(single("%"),    (TokenKind::MulDiv,        "%".to_string()));
        assert_eq!(single("/="),   (TokenKind::Assign,        "/=".to_string()));
    }

    #[test]
    fn test_operators_split_greedily() {
        assert_eq!(
            lex("a+++b"),
            vec![
                (TokenKind::Identifier, "a".to_string()),
                (TokenKind::UnaryOrIncDec, "++".to_string()),
                (TokenKind::AddSub, "+".to_string()),
                (TokenKind::Identifier, "b".to_string()),
            ]
        );
        assert_eq!(
            kinds("x>>>>=y"),
            vec![
                TokenKind::Identifier,
                TokenKind::Shift,
                TokenKind::Compare,
                TokenKind::Identifier
            ]
        );
    }

    #[test]
    #[rustfmt::skip]
    fn test_number_forms() {
        assert_eq!(single("0"),        (TokenKind::IntLiteral,   "0".to_string()));
        assert_eq!(single("42"),       (TokenKind::IntLiteral,   "42".to_string()));
        assert_eq!(single("42L"),      (TokenKind::IntLiteral,   "42L".to_string()));
        assert_eq!(single("0777"),     (TokenKind::IntLiteral,   "0777".to_string()));
        assert_eq!(single("0x1aF"),    (TokenKind::IntLiteral,   "0x1aF".to_string()));
        assert_eq!(single("0XFFl"),    (TokenKind::IntLiteral,   "0XFFl".to_string()));
        assert_eq!(single("3.14"),     (TokenKind::FloatLiteral, "3.14".to_string()));
        assert_eq!(single(".5"),       (TokenKind::FloatLiteral, ".5".to_string()));
        assert_eq!(single("0.5f"),     (TokenKind::FloatLiteral, "0.5f".to_string()));
        assert_eq!(single("1e10"),     (TokenKind::FloatLiteral, "1e10".to_string()));
        assert_eq!(single("1.5E-3d"),  (TokenKind::FloatLiteral, "1.5E-3d".to_string()));
        assert_eq!(single("2D"),       (TokenKind::FloatLiteral, "2D".to_string()));
        assert_eq!(single("09e1"),     (TokenKind::FloatLiteral, "09e1".to_string()));
        assert_eq!(single("089f"),     (TokenKind::FloatLiteral, "089f".to_string()));
    }

    #[test]
    fn test_leading_zero_with_decimal_digit_needs_float_tail() {
        assert_eq!(single("09"), (TokenKind::Malformed, "09".to_string()));
        assert_eq!(single("0x"), (TokenKind::Malformed, "0x".to_string()));
        assert_eq!(single("1e+"), (TokenKind::Malformed, "1e+".to_string()));
    }

    #[test]
    fn test_dot_alone() {
        assert_eq!(
            lex("a.b"),
            vec![
                (TokenKind::Identifier, "a".to_string()),
                (TokenKind::BracketOrDot, ".".to_string()),
                (TokenKind::Identifier, "b".to_string()),
            ]
        );
    }

    #[test]
    #[rustfmt::skip]
    fn test_string_escapes() {
        assert_eq!(single(r#""a\tb""#),       (TokenKind::StringLiteral, r#""a\tb""#.to_string()));
        assert_eq!(single(r#""\\ \' \" \r \n \f \b""#).0, TokenKind::StringLiteral);
        assert_eq!(single(r#""é""#).0,   TokenKind::StringLiteral);
        assert_eq!(single(r#""\101""#).0,     TokenKind::StringLiteral);
        assert_eq!(single(r#""\0""#).0,       TokenKind::Malformed);
        assert_eq!(single(r#""\q""#).0,       TokenKind::Malformed);
        assert_eq!(single(r#""\u00g""#).0,    TokenKind::Malformed);
    }

    #[test]
    #[rustfmt::skip]
    fn test_char_literals() {
        assert_eq!(single("'a'"),      (TokenKind::CharLiteral, "'a'".to_string()));
        assert_eq!(single(r"'\n'"),    (TokenKind::CharLiteral, r"'\n'".to_string()));
        assert_eq!(single(r"'\u0041'"),(TokenKind::CharLiteral, r"'\u0041'".to_string()));
        assert_eq!(single(r"'\101'"),  (TokenKind::CharLiteral, r"'\101'".to_string()));
        assert_eq!(single("'ab'"),     (TokenKind::Malformed,   "'ab'".to_string()));
    }

    #[test]
    fn test_punctuation() {
        assert_eq!(
            kinds("{ ( [ ] ) } , ;"),
            vec![
                TokenKind::BigBracket,
                TokenKind::BracketOrDot,
                TokenKind::BracketOrDot,
                TokenKind::BracketOrDot,
                TokenKind::BracketOrDot,
                TokenKind::BigBracket,
                TokenKind::Comma,
                TokenKind::Semicolon,
            ]
        );
    }

    #[test]
    fn test_malformed_recovery() {
        assert_eq!(
            lex("@@@ x = 1 ;"),
            vec![
                (TokenKind::Malformed, "@@@".to_string()),
                (TokenKind::Identifier, "x".to_string()),
                (TokenKind::Assign, "=".to_string()),
                (TokenKind::IntLiteral, "1".to_string()),
                (TokenKind::Semicolon, ";".to_string()),
            ]
        );
        assert_eq!(
            lex("a#b;c"),
            vec![
                (TokenKind::Identifier, "a".to_string()),
                (TokenKind::Malformed, "#b".to_string()),
                (TokenKind::Semicolon, ";".to_string()),
                (TokenKind::Identifier, "c".to_string()),
            ]
        );
    }

    #[test]
    fn test_comments_produce_no_tokens() {
        assert_eq!(
            kinds("a /* b * / c */ d // e f\ng"),
            vec![TokenKind::Identifier, TokenKind::Identifier, TokenKind::Identifier]
        );
    }

    #[test]
    fn test_tokenize_reader_matches_lexer() {
        const SOURCE: &str = "x = \"caf\u{e9}\" ; // \u{2603}\nwhile ( i < 10 ) i = i + 1 ;\n";

        let conf = LexConf { buffer_size: 5 };
        let mut out = Vec::new();
        let summary = tokenize(SOURCE.as_bytes(), &mut out, &conf).unwrap();

        let mut expected = Vec::new();
        for record in Lexer::new(SOURCE) {
            token_stream::write_record(&mut expected, &record).unwrap();
        }

        assert_eq!(String::from_utf8(out).unwrap(), String::from_utf8(expected).unwrap());
        assert_eq!(summary.lines, 3);
        assert_eq!(summary.malformed, 0);
    }

    #[test]
    fn test_invalid_utf8_is_malformed() {
        let source: &[u8] = b"a \xff b";
        let mut out = Vec::new();
        let summary = tokenize(source, &mut out, &LexConf::default()).unwrap();
        assert_eq!(summary.malformed, 1);
    }
}
