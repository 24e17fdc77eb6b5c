use jparse::{
    lex::{self, debug_print_lexer, LexConf, Lexer, Record, Token, TokenKind},
    token_stream,
};

const SOURCE: &str = include_str!("lexer.java");

fn tokens(source: &str) -> Vec<Token> {
    Lexer::new(source)
        .tokens()
        .filter(|token| !token.kind.is_trivia())
        .collect()
}

#[test]
fn test_lex_fixture() {
    let lexer = Lexer::new(SOURCE);
    debug_print_lexer(lexer);
}

#[test]
fn test_literals_and_operators() {
    let found: Vec<(TokenKind, String)> = tokens(SOURCE)
        .into_iter()
        .map(|token| (token.kind, token.lexeme.to_string()))
        .collect();

    let expected = [
        (TokenKind::Keyword, "class"),
        (TokenKind::Identifier, "Lexer"),
        (TokenKind::BigBracket, "{"),
        (TokenKind::Keyword, "final"),
        (TokenKind::IntLiteral, "0x7fffL"),
        (TokenKind::FloatLiteral, ".5"),
        (TokenKind::Comma, ","),
        (TokenKind::FloatLiteral, "1.5e+10d"),
        (TokenKind::CharLiteral, r"'\t'"),
        (TokenKind::CharLiteral, r"'\u0041'"),
        (TokenKind::StringLiteral, r#""say \"hi\"\101""#),
        (TokenKind::UnaryOrIncDec, "!"),
        (TokenKind::BooleanLiteral, "false"),
        (TokenKind::LogicAnd, "&&"),
        (TokenKind::Assign, ">>>="),
        (TokenKind::LogicOr, "||"),
        (TokenKind::Equality, "!="),
        (TokenKind::TernaryColon, "?:"),
        (TokenKind::AddSub, "+"),
        (TokenKind::Semicolon, ";"),
    ];
    for (kind, lexeme) in expected {
        assert!(
            found.contains(&(kind, lexeme.to_string())),
            "missing {kind:?} {lexeme:?}"
        );
    }

    // Comments leave nothing behind.
    assert!(!found.iter().any(|(_, lexeme)| lexeme.contains("identifiers")));
    // The question mark has no token of its own.
    assert!(!found.iter().any(|(_, lexeme)| lexeme == "?"));
}

#[test]
fn test_malformed_words_keep_their_line() {
    let malformed: Vec<(String, usize)> = tokens(SOURCE)
        .into_iter()
        .filter(|token| token.kind == TokenKind::Malformed)
        .map(|token| (token.lexeme.to_string(), token.line))
        .collect();
    assert_eq!(
        malformed,
        vec![("09".to_string(), 9), ("@@@".to_string(), 9)]
    );
}

#[test]
fn test_line_counters() {
    let records: Vec<Record> = Lexer::new(SOURCE).collect();

    let lines: Vec<usize> = records
        .iter()
        .filter_map(|record| match record {
            Record::Line { line, .. } => Some(*line),
            _ => None,
        })
        .collect();
    // The end of input closes one more, empty line.
    assert_eq!(lines, (1..=11).collect::<Vec<_>>());

    let words = records
        .iter()
        .filter(|record| matches!(record, Record::Token(_)))
        .count();
    assert_eq!(records.last(), Some(&Record::Total { words }));
}

#[test]
fn test_token_stream_round_trip() {
    let mut out = Vec::new();
    let summary = lex::tokenize(SOURCE.as_bytes(), &mut out, &LexConf { buffer_size: 16 }).unwrap();
    assert_eq!(summary.lines, 11);
    assert_eq!(summary.malformed, 2);

    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("0x101\t@@@ at line 9\n"));
    assert!(text.contains("line 1 has "));
    assert!(text.ends_with(&format!("total {} words\n", summary.words)));

    let decoded = token_stream::decode_str(&text).unwrap();
    assert_eq!(decoded, lex::tokenize_str(SOURCE));
}
