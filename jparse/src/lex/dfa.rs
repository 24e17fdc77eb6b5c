//! Scanner state machine.
//!
//! The machine is a pure function of the current state and the next
//! character. It never looks at more than one character; constructs
//! that need a longer lookahead (`>>>=`, `/*`) are encoded as chains
//! of states.
//!
//! Side effects, like appending to the lexeme or counting lines, are
//! described by the returned [`Action`] and performed by the
//! [`Scanner`](super::Scanner).
use super::tokens::TokenKind;

/// Current mode of the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum State {
    /// Between tokens.
    #[default]
    Initial,
    /// Identifier, keyword or boolean literal.
    Word,
    /// String literal.
    Str(Quoted),
    /// Character literal.
    Char(Quoted),
    /// Numeric literal, or a lone dot.
    Number(Num),
    /// Operator that may still grow.
    Op(Op),
    /// Inside `/* */`. `star` is set right after a `*`.
    BlockComment { star: bool },
    /// Inside `//`, up to the newline.
    LineComment,
    /// Recovering from a malformed word, up to the next delimiter.
    Malformed,
}

/// Progress through a quoted literal.
///
/// Strings and characters share the escape states. They differ in
/// where an escape returns to: strings go back to [`Quoted::Body`],
/// characters to [`Quoted::Closing`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quoted {
    /// After the opening quote, or (strings only) after any content.
    Body,
    /// After a backslash.
    Escape,
    /// Octal escape with the given number of digits read, `1..=2`.
    Octal(u8),
    /// Unicode escape with the given number of hex digits read, `0..=3`.
    Unicode(u8),
    /// Character literal holding its one character, waiting for `'`.
    Closing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Num {
    /// `0`
    Zero,
    /// `[1-9][0-9]*`
    Decimal,
    /// `0[0-7]+`
    Octal,
    /// `0x`
    HexPrefix,
    /// `0x[0-9a-fA-F]+`
    Hex,
    /// Leading zero followed by an `8` or `9`. Only an exponent
    /// or a float suffix can make this a valid literal.
    BadOctal,
    /// `.`
    Dot,
    /// Digits after the decimal point.
    Fraction,
    /// `e` or `E`
    Exponent,
    /// `e+` or `e-`
    ExponentSign,
    /// Digits of the exponent.
    ExponentDigits,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[rustfmt::skip]
pub enum Op {
    Plus,       // +
    Minus,      // -
    Star,       // *
    Percent,    // %
    Slash,      // /
    Amp,        // &
    Pipe,       // |
    Caret,      // ^
    Bang,       // !
    Less,       // <
    Shl,        // <<
    Greater,    // >
    Shr,        // >>
    Ushr,       // >>>
    Eq,         // =
}

/// Side effect of a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Consume the character and append it to the lexeme.
    Push,
    /// Consume the character without recording it.
    Skip,
    /// Consume the character and discard the pending lexeme.
    Clear,
    /// Append the character and finish the token.
    PushEmit(TokenKind),
    /// Finish the pending token without consuming the character.
    ///
    /// The character is scanned again from [`State::Initial`].
    Emit(TokenKind),
    /// Consume a newline that does not produce a token.
    Newline,
    /// Consume a `?`.
    Question,
    /// Consume a `:`.
    Colon,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub next: State,
    pub action: Action,
}

impl Transition {
    #[inline]
    const fn new(next: State, action: Action) -> Self {
        Self { next, action }
    }

    #[inline]
    const fn push(next: State) -> Self {
        Self::new(next, Action::Push)
    }

    #[inline]
    const fn accept(kind: TokenKind) -> Self {
        Self::new(State::Initial, Action::PushEmit(kind))
    }

    #[inline]
    const fn emit(kind: TokenKind) -> Self {
        Self::new(State::Initial, Action::Emit(kind))
    }
}

/// Advance the machine by one character.
pub fn step(state: State, c: char) -> Transition {
    match state {
        State::Initial => initial(c),
        State::Word => word(c),
        State::Str(quoted) => string(quoted, c),
        State::Char(quoted) => character(quoted, c),
        State::Number(num) => number(num, c),
        State::Op(op) => operator(op, c),
        State::BlockComment { star } => block_comment(star, c),
        State::LineComment => line_comment(c),
        State::Malformed => malformed(c),
    }
}

#[rustfmt::skip]
fn initial(c: char) -> Transition {
    use TokenKind as T;
    use Transition as X;

    match c {
        _ if is_word_start(c)   => X::push(State::Word),
        '1'..='9'               => X::push(State::Number(Num::Decimal)),
        '0'                     => X::push(State::Number(Num::Zero)),
        '.'                     => X::push(State::Number(Num::Dot)),
        '"'                     => X::push(State::Str(Quoted::Body)),
        '\''                    => X::push(State::Char(Quoted::Body)),
        '(' | ')' | '[' | ']'   => X::accept(T::BracketOrDot),
        '{' | '}'               => X::accept(T::BigBracket),
        ','                     => X::accept(T::Comma),
        ';'                     => X::accept(T::Semicolon),
        '~'                     => X::accept(T::UnaryOrIncDec),
        ' ' | '\t' | '\r' | '\n' => X::accept(T::Whitespace),
        '+'                     => X::push(State::Op(Op::Plus)),
        '-'                     => X::push(State::Op(Op::Minus)),
        '*'                     => X::push(State::Op(Op::Star)),
        '%'                     => X::push(State::Op(Op::Percent)),
        '/'                     => X::push(State::Op(Op::Slash)),
        '&'                     => X::push(State::Op(Op::Amp)),
        '|'                     => X::push(State::Op(Op::Pipe)),
        '^'                     => X::push(State::Op(Op::Caret)),
        '!'                     => X::push(State::Op(Op::Bang)),
        '<'                     => X::push(State::Op(Op::Less)),
        '>'                     => X::push(State::Op(Op::Greater)),
        '='                     => X::push(State::Op(Op::Eq)),
        '?'                     => X::new(State::Initial, Action::Question),
        ':'                     => X::new(State::Initial, Action::Colon),
        _                       => X::push(State::Malformed),
    }
}

fn word(c: char) -> Transition {
    if is_word_continue(c) {
        Transition::push(State::Word)
    } else {
        // Keywords and booleans are told apart when the word is emitted.
        Transition::emit(TokenKind::Identifier)
    }
}

fn string(quoted: Quoted, c: char) -> Transition {
    match quoted {
        Quoted::Body => match c {
            '"' => Transition::accept(TokenKind::StringLiteral),
            '\\' => Transition::push(State::Str(Quoted::Escape)),
            // Unterminated at the end of the line.
            '\n' => Transition::emit(TokenKind::Malformed),
            _ => Transition::push(State::Str(Quoted::Body)),
        },
        _ => escape(quoted, c, State::Str, Quoted::Body),
    }
}

fn character(quoted: Quoted, c: char) -> Transition {
    match quoted {
        Quoted::Body => match c {
            '\\' => Transition::push(State::Char(Quoted::Escape)),
            '\n' => Transition::emit(TokenKind::Malformed),
            _ => Transition::push(State::Char(Quoted::Closing)),
        },
        Quoted::Closing => match c {
            '\'' => Transition::accept(TokenKind::CharLiteral),
            _ => reject(c),
        },
        _ => escape(quoted, c, State::Char, Quoted::Closing),
    }
}

/// Escape sequence inside a quoted literal.
///
/// `wrap` builds the literal state, `done` is where a finished
/// escape returns to.
fn escape(quoted: Quoted, c: char, wrap: fn(Quoted) -> State, done: Quoted) -> Transition {
    match quoted {
        Quoted::Escape => match c {
            '0'..='7' => Transition::push(wrap(Quoted::Octal(1))),
            'u' => Transition::push(wrap(Quoted::Unicode(0))),
            '\\' | '\'' | '"' | 'r' | 'n' | 'f' | 't' | 'b' => Transition::push(wrap(done)),
            _ => reject(c),
        },
        // Octal escapes take exactly three digits.
        Quoted::Octal(n) => match c {
            '0'..='7' if n >= 2 => Transition::push(wrap(done)),
            '0'..='7' => Transition::push(wrap(Quoted::Octal(n + 1))),
            _ => reject(c),
        },
        Quoted::Unicode(n) => match c {
            _ if c.is_ascii_hexdigit() && n >= 3 => Transition::push(wrap(done)),
            _ if c.is_ascii_hexdigit() => Transition::push(wrap(Quoted::Unicode(n + 1))),
            _ => reject(c),
        },
        Quoted::Body | Quoted::Closing => reject(c),
    }
}

#[rustfmt::skip]
fn number(num: Num, c: char) -> Transition {
    use Num as N;
    use TokenKind as T;
    use Transition as X;

    let to = |num: Num| X::push(State::Number(num));

    match num {
        N::Zero => match c {
            '0'..='7'           => to(N::Octal),
            '8' | '9'           => to(N::BadOctal),
            'x' | 'X'           => to(N::HexPrefix),
            '.'                 => to(N::Fraction),
            'e' | 'E'           => to(N::Exponent),
            'l' | 'L'           => X::accept(T::IntLiteral),
            _ if is_float_suffix(c) => X::accept(T::FloatLiteral),
            _                   => X::emit(T::IntLiteral),
        },
        N::Decimal => match c {
            '0'..='9'           => to(N::Decimal),
            '.'                 => to(N::Fraction),
            'e' | 'E'           => to(N::Exponent),
            'l' | 'L'           => X::accept(T::IntLiteral),
            _ if is_float_suffix(c) => X::accept(T::FloatLiteral),
            _                   => X::emit(T::IntLiteral),
        },
        N::Octal => match c {
            '0'..='7'           => to(N::Octal),
            '8' | '9'           => to(N::BadOctal),
            'e' | 'E'           => to(N::Exponent),
            'l' | 'L'           => X::accept(T::IntLiteral),
            _ if is_float_suffix(c) => X::accept(T::FloatLiteral),
            _                   => X::emit(T::IntLiteral),
        },
        N::HexPrefix => match c {
            _ if c.is_ascii_hexdigit() => to(N::Hex),
            _                   => reject(c),
        },
        N::Hex => match c {
            _ if c.is_ascii_hexdigit() => to(N::Hex),
            'l' | 'L'           => X::accept(T::IntLiteral),
            _                   => X::emit(T::IntLiteral),
        },
        N::BadOctal => match c {
            '0'..='9'           => to(N::BadOctal),
            'e' | 'E'           => to(N::Exponent),
            _ if is_float_suffix(c) => X::accept(T::FloatLiteral),
            _                   => reject(c),
        },
        N::Dot => match c {
            '0'..='9'           => to(N::Fraction),
            _                   => X::emit(T::BracketOrDot),
        },
        N::Fraction => match c {
            '0'..='9'           => to(N::Fraction),
            'e' | 'E'           => to(N::Exponent),
            _ if is_float_suffix(c) => X::accept(T::FloatLiteral),
            _                   => X::emit(T::FloatLiteral),
        },
        N::Exponent => match c {
            '0'..='9'           => to(N::ExponentDigits),
            '+' | '-'           => to(N::ExponentSign),
            _                   => reject(c),
        },
        N::ExponentSign => match c {
            '0'..='9'           => to(N::ExponentDigits),
            _                   => reject(c),
        },
        N::ExponentDigits => match c {
            '0'..='9'           => to(N::ExponentDigits),
            _ if is_float_suffix(c) => X::accept(T::FloatLiteral),
            _                   => X::emit(T::FloatLiteral),
        },
    }
}

#[rustfmt::skip]
fn operator(op: Op, c: char) -> Transition {
    use TokenKind as T;
    use Transition as X;

    match (op, c) {
        (Op::Plus, '=')    => X::accept(T::Assign),
        (Op::Plus, '+')    => X::accept(T::UnaryOrIncDec),
        (Op::Plus, _)      => X::emit(T::AddSub),

        (Op::Minus, '=')   => X::accept(T::Assign),
        (Op::Minus, '-')   => X::accept(T::UnaryOrIncDec),
        (Op::Minus, _)     => X::emit(T::AddSub),

        (Op::Star, '=')    => X::accept(T::Assign),
        (Op::Star, _)      => X::emit(T::MulDiv),

        (Op::Percent, '=') => X::accept(T::Assign),
        (Op::Percent, _)   => X::emit(T::MulDiv),

        (Op::Slash, '=')   => X::accept(T::Assign),
        (Op::Slash, '*')   => X::new(State::BlockComment { star: false }, Action::Clear),
        (Op::Slash, '/')   => X::new(State::LineComment, Action::Clear),
        (Op::Slash, _)     => X::emit(T::MulDiv),

        (Op::Amp, '=')     => X::accept(T::Assign),
        (Op::Amp, '&')     => X::accept(T::LogicAnd),
        (Op::Amp, _)       => X::emit(T::BitAnd),

        (Op::Pipe, '=')    => X::accept(T::Assign),
        (Op::Pipe, '|')    => X::accept(T::LogicOr),
        (Op::Pipe, _)      => X::emit(T::BitOr),

        (Op::Caret, '=')   => X::accept(T::Assign),
        (Op::Caret, _)     => X::emit(T::Xor),

        (Op::Bang, '=')    => X::accept(T::Equality),
        (Op::Bang, _)      => X::emit(T::UnaryOrIncDec),

        (Op::Less, '=')    => X::accept(T::Compare),
        (Op::Less, '<')    => X::push(State::Op(Op::Shl)),
        (Op::Less, _)      => X::emit(T::Compare),

        (Op::Shl, '=')     => X::accept(T::Assign),
        (Op::Shl, _)       => X::emit(T::Shift),

        (Op::Greater, '=') => X::accept(T::Compare),
        (Op::Greater, '>') => X::push(State::Op(Op::Shr)),
        (Op::Greater, _)   => X::emit(T::Compare),

        (Op::Shr, '=')     => X::accept(T::Assign),
        (Op::Shr, '>')     => X::push(State::Op(Op::Ushr)),
        (Op::Shr, _)       => X::emit(T::Shift),

        (Op::Ushr, '=')    => X::accept(T::Assign),
        (Op::Ushr, _)      => X::emit(T::Shift),

        (Op::Eq, '=')      => X::accept(T::Equality),
        (Op::Eq, _)        => X::emit(T::Assign),
    }
}

fn block_comment(star: bool, c: char) -> Transition {
    match c {
        '\n' => Transition::new(State::BlockComment { star: false }, Action::Newline),
        '*' => Transition::new(State::BlockComment { star: true }, Action::Skip),
        '/' if star => Transition::new(State::Initial, Action::Skip),
        _ => Transition::new(State::BlockComment { star: false }, Action::Skip),
    }
}

fn line_comment(c: char) -> Transition {
    match c {
        '\n' => Transition::new(State::Initial, Action::Newline),
        _ => Transition::new(State::LineComment, Action::Skip),
    }
}

fn malformed(c: char) -> Transition {
    if is_delimiter(c) {
        Transition::emit(TokenKind::Malformed)
    } else {
        Transition::push(State::Malformed)
    }
}

/// Give up on the current construct.
///
/// The offending character joins the malformed word, unless it
/// is a delimiter, which ends the word right away.
#[inline]
fn reject(c: char) -> Transition {
    malformed(c)
}

/// Characters that end a malformed word.
#[inline]
pub fn is_delimiter(c: char) -> bool {
    matches!(
        c,
        ' ' | '\t' | '\r' | '\n' | '{' | '}' | '[' | ']' | '(' | ')' | ',' | '.' | ';'
    )
}

#[inline]
fn is_word_start(c: char) -> bool {
    matches!(c, 'a'..='z' | 'A'..='Z' | '_' | '$')
}

#[inline]
fn is_word_continue(c: char) -> bool {
    is_word_start(c) || c.is_ascii_digit()
}

#[inline]
fn is_float_suffix(c: char) -> bool {
    matches!(c, 'f' | 'F' | 'd' | 'D')
}
