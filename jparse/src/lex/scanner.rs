//! Push-driven scanner.
use std::collections::VecDeque;

use log::{trace, warn};

use super::{
    dfa::{self, Action, State, Transition},
    tokens::{classify, Record, Token, TokenKind},
};

/// Drives the [state machine](super::dfa) and keeps the
/// bookkeeping around it.
///
/// Characters are fed one at a time, in as many chunks as the caller
/// likes. Finished records queue up until they are popped, so the
/// scanner never needs to see the whole source.
#[derive(Debug)]
pub struct Scanner {
    state: State,
    /// Text of the token being built.
    lexeme: String,
    /// Set by a `?` until the matching `:` is seen.
    ternary: bool,
    /// 1-based number of the line being scanned.
    line: usize,
    words_in_line: usize,
    words: usize,
    finished: bool,
    queue: VecDeque<Record>,
}

impl Scanner {
    pub fn new() -> Self {
        Self {
            state: State::Initial,
            lexeme: String::new(),
            ternary: false,
            line: 1,
            words_in_line: 0,
            words: 0,
            finished: false,
            queue: VecDeque::new(),
        }
    }

    /// Current state of the machine.
    #[inline]
    pub fn state(&self) -> State {
        self.state
    }

    /// Number of words emitted so far.
    #[inline]
    pub fn words(&self) -> usize {
        self.words
    }

    /// Number of the line currently being scanned.
    #[inline]
    pub fn line(&self) -> usize {
        self.line
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Scan a chunk of source text.
    pub fn feed(&mut self, chunk: &str) {
        for c in chunk.chars() {
            self.feed_char(c);
        }
    }

    /// Scan one character.
    pub fn feed_char(&mut self, c: char) {
        debug_assert!(!self.finished, "scanner fed after end of input");

        loop {
            let Transition { next, action } = dfa::step(self.state, c);
            self.state = next;

            match action {
                Action::Push => self.lexeme.push(c),
                Action::Skip => {}
                Action::Clear => self.lexeme.clear(),
                Action::PushEmit(kind) => {
                    self.lexeme.push(c);
                    self.emit(kind);
                }
                Action::Emit(kind) => {
                    self.emit(kind);
                    // The state machine is back at its initial state, which
                    // always consumes, so this loops at most once more.
                    continue;
                }
                Action::Newline => self.close_line(),
                Action::Question => self.question(),
                Action::Colon => self.colon(),
            }

            break;
        }
    }

    /// Signal the end of the source.
    ///
    /// The end behaves like one more newline, flushing any pending token
    /// and closing the last line, followed by the total word count.
    pub fn finish(&mut self) {
        if self.finished {
            return;
        }

        self.feed_char('\n');

        if let State::BlockComment { .. } = self.state {
            warn!("unterminated block comment at end of input");
        }
        self.state = State::Initial;
        self.lexeme.clear();

        self.queue.push_back(Record::Total { words: self.words });
        self.finished = true;
    }

    /// Take the oldest finished record.
    #[inline]
    pub fn pop(&mut self) -> Option<Record> {
        self.queue.pop_front()
    }

    /// Take all finished records.
    pub fn drain(&mut self) -> impl Iterator<Item = Record> + '_ {
        self.queue.drain(..)
    }

    fn emit(&mut self, kind: TokenKind) {
        let kind = match kind {
            TokenKind::Identifier => classify(&self.lexeme),
            kind => kind,
        };
        let token = Token::new(kind, self.lexeme.as_str(), self.line);
        self.lexeme.clear();

        if kind == TokenKind::Malformed {
            warn!("malformed word '{}' at line {}", token.lexeme, token.line);
        } else {
            trace!("{:?} {:?}", token.kind, token.lexeme);
        }

        self.words += 1;
        self.words_in_line += 1;

        let newline = kind == TokenKind::Whitespace && token.lexeme == "\n";
        self.queue.push_back(Record::Token(token));

        if newline {
            self.close_line();
        }
    }

    fn close_line(&mut self) {
        self.queue.push_back(Record::Line {
            line: self.line,
            words: self.words_in_line,
        });
        self.line += 1;
        self.words_in_line = 0;
    }

    /// A `?` produces no token of its own. It arms the flag that turns
    /// the next `:` into the conditional operator.
    fn question(&mut self) {
        if self.ternary {
            // Nested conditionals are not tracked.
            self.lexeme.push('?');
            self.state = State::Malformed;
        } else {
            self.ternary = true;
        }
    }

    fn colon(&mut self) {
        if self.ternary {
            self.ternary = false;
            self.lexeme.push_str("?:");
            self.emit(TokenKind::TernaryColon);
        } else {
            self.lexeme.push(':');
            self.emit(TokenKind::Colon);
        }
    }
}

impl Default for Scanner {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn scan(chunks: &[&str]) -> Vec<Record> {
        let mut scanner = Scanner::new();
        for chunk in chunks {
            scanner.feed(chunk);
        }
        scanner.finish();
        scanner.drain().collect()
    }

    fn tokens(records: &[Record]) -> Vec<(TokenKind, &str)> {
        records
            .iter()
            .filter_map(Record::as_token)
            .filter(|token| !token.kind.is_trivia())
            .map(|token| (token.kind, token.lexeme.as_str()))
            .collect()
    }

    #[test]
    fn test_chunk_boundaries_do_not_matter() {
        const SOURCE: &str = "int x = 0x1F; /* a\n*/ s = \"\\u00e9\\101\"; y >>>= 2; // end\n";

        let whole = scan(&[SOURCE]);

        let chars: Vec<String> = SOURCE.chars().map(String::from).collect();
        let chars: Vec<&str> = chars.iter().map(String::as_str).collect();
        assert_eq!(scan(&chars), whole);

        for split in 0..SOURCE.len() {
            if SOURCE.is_char_boundary(split) {
                let (a, b) = SOURCE.split_at(split);
                assert_eq!(scan(&[a, b]), whole, "split at {split}");
            }
        }
    }

    #[test]
    fn test_ternary_pairs_with_colon() {
        let records = scan(&["c ? a : b"]);
        assert_eq!(
            tokens(&records),
            vec![
                (TokenKind::Identifier, "c"),
                (TokenKind::Identifier, "a"),
                (TokenKind::TernaryColon, "?:"),
                (TokenKind::Identifier, "b"),
            ]
        );

        // Consumed by the first colon.
        let records = scan(&["c ? a : b : d"]);
        assert_eq!(tokens(&records)[4], (TokenKind::Colon, ":"));
    }

    #[test]
    fn test_bare_colon() {
        let records = scan(&["case 1:"]);
        assert_eq!(
            tokens(&records),
            vec![
                (TokenKind::Keyword, "case"),
                (TokenKind::IntLiteral, "1"),
                (TokenKind::Colon, ":"),
            ]
        );
    }

    #[test]
    fn test_second_question_is_malformed() {
        let records = scan(&["a ? b ?c : d"]);
        assert_eq!(
            tokens(&records),
            vec![
                (TokenKind::Identifier, "a"),
                (TokenKind::Identifier, "b"),
                (TokenKind::Malformed, "?c"),
                (TokenKind::TernaryColon, "?:"),
                (TokenKind::Identifier, "d"),
            ]
        );
    }

    #[test]
    fn test_block_comment_counts_lines() {
        let records = scan(&["/* a\nb */"]);
        assert_eq!(
            records,
            vec![
                Record::Line { line: 1, words: 0 },
                Record::Token(Token::new(TokenKind::Whitespace, "\n", 2)),
                Record::Line { line: 2, words: 1 },
                Record::Total { words: 1 },
            ]
        );
    }

    #[test]
    fn test_line_comment_ends_at_newline() {
        let records = scan(&["// comment\nx"]);
        assert_eq!(
            records,
            vec![
                Record::Line { line: 1, words: 0 },
                Record::Token(Token::new(TokenKind::Identifier, "x", 2)),
                Record::Token(Token::new(TokenKind::Whitespace, "\n", 2)),
                Record::Line { line: 2, words: 2 },
                Record::Total { words: 2 },
            ]
        );
    }

    #[test]
    fn test_malformed_carries_line() {
        let records = scan(&["a\n  @@@ b"]);
        let malformed: Vec<&Token> = records
            .iter()
            .filter_map(Record::as_token)
            .filter(|token| token.kind == TokenKind::Malformed)
            .collect();
        assert_eq!(malformed, vec![&Token::new(TokenKind::Malformed, "@@@", 2)]);
    }

    #[test]
    fn test_unterminated_string_is_malformed() {
        let records = scan(&["s = \"abc\nx"]);
        assert_eq!(
            tokens(&records),
            vec![
                (TokenKind::Identifier, "s"),
                (TokenKind::Assign, "="),
                (TokenKind::Malformed, "\"abc"),
                (TokenKind::Identifier, "x"),
            ]
        );
    }

    #[test]
    fn test_word_counts() {
        let records = scan(&["a b\nc"]);
        let counters: Vec<&Record> = records
            .iter()
            .filter(|record| !matches!(record, Record::Token(_)))
            .collect();
        // "a", " ", "b", "\n" then "c", "\n"
        assert_eq!(
            counters,
            vec![
                &Record::Line { line: 1, words: 4 },
                &Record::Line { line: 2, words: 2 },
                &Record::Total { words: 6 },
            ]
        );
    }

    #[test]
    fn test_finish_is_idempotent() {
        let mut scanner = Scanner::new();
        scanner.feed("x");
        scanner.finish();
        scanner.finish();
        let totals = scanner
            .drain()
            .filter(|record| matches!(record, Record::Total { .. }))
            .count();
        assert_eq!(totals, 1);
    }
}
