//! Tokens

use smol_str::SmolStr;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Exact source text consumed for this token.
    pub lexeme: SmolStr,
    /// 1-based source line the token was completed on.
    pub line: usize,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<SmolStr>, line: usize) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            line,
        }
    }

    /// Test both the kind and the text of the token.
    #[inline]
    pub fn is(&self, kind: TokenKind, lexeme: &str) -> bool {
        self.kind == kind && self.lexeme == lexeme
    }
}

/// Token classes, tagged with their value in the intermediate
/// token stream.
///
/// The tag space is split into three blocks with reserved gaps
/// in between: words and literals from `0x101`, operators from
/// `0x110` and punctuation from `0x120`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
#[rustfmt::skip]
pub enum TokenKind {
    // ------------------------------------------------------------------------
    // Words and literals
    Malformed      = 0x101,
    Whitespace     = 0x102,
    Keyword        = 0x103,
    Identifier     = 0x104,
    BooleanLiteral = 0x105,
    CharLiteral    = 0x106,
    IntLiteral     = 0x107,
    FloatLiteral   = 0x108,
    StringLiteral  = 0x109,

    // ------------------------------------------------------------------------
    // Operators
    Assign         = 0x110, // = += -= *= /= %= &= |= ^= <<= >>= >>>=
    TernaryColon   = 0x111, // ?:
    LogicOr        = 0x112, // ||
    LogicAnd       = 0x113, // &&
    BitOr          = 0x114, // |
    Xor            = 0x115, // ^
    BitAnd         = 0x116, // &
    Equality       = 0x117, // == !=
    Compare        = 0x118, // < > <= >=
    Shift          = 0x119, // << >> >>>
    AddSub         = 0x11a, // + -
    MulDiv         = 0x11b, // * / %
    UnaryOrIncDec  = 0x11c, // ++ -- ~ !
    BracketOrDot   = 0x11d, // ( ) [ ] .

    // ------------------------------------------------------------------------
    // Punctuation
    Comma          = 0x120, // ,
    BigBracket     = 0x121, // { }
    Semicolon      = 0x122, // ;
    Colon          = 0x123, // :
}

impl TokenKind {
    /// Numeric tag used in the intermediate token stream.
    #[inline]
    pub fn tag(self) -> u16 {
        self as u16
    }

    /// Look up the kind of a stream tag.
    ///
    /// Returns `None` for tags outside the kind space, including
    /// the reserved gaps between blocks.
    #[rustfmt::skip]
    pub fn from_tag(tag: u16) -> Option<Self> {
        use TokenKind as T;

        match tag {
            0x101 => Some(T::Malformed),
            0x102 => Some(T::Whitespace),
            0x103 => Some(T::Keyword),
            0x104 => Some(T::Identifier),
            0x105 => Some(T::BooleanLiteral),
            0x106 => Some(T::CharLiteral),
            0x107 => Some(T::IntLiteral),
            0x108 => Some(T::FloatLiteral),
            0x109 => Some(T::StringLiteral),
            // ----------------------------------------------------------------
            0x110 => Some(T::Assign),
            0x111 => Some(T::TernaryColon),
            0x112 => Some(T::LogicOr),
            0x113 => Some(T::LogicAnd),
            0x114 => Some(T::BitOr),
            0x115 => Some(T::Xor),
            0x116 => Some(T::BitAnd),
            0x117 => Some(T::Equality),
            0x118 => Some(T::Compare),
            0x119 => Some(T::Shift),
            0x11a => Some(T::AddSub),
            0x11b => Some(T::MulDiv),
            0x11c => Some(T::UnaryOrIncDec),
            0x11d => Some(T::BracketOrDot),
            // ----------------------------------------------------------------
            0x120 => Some(T::Comma),
            0x121 => Some(T::BigBracket),
            0x122 => Some(T::Semicolon),
            0x123 => Some(T::Colon),
            _ => None,
        }
    }

    /// Tokens that only exist for line and word counting.
    #[inline]
    pub fn is_trivia(self) -> bool {
        matches!(self, TokenKind::Whitespace)
    }
}

impl fmt::Display for TokenKind {
    #[rustfmt::skip]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use TokenKind as T;

        match self {
            T::Malformed      => write!(f, "malformed word"),
            T::Whitespace     => write!(f, "whitespace"),
            T::Keyword        => write!(f, "keyword"),
            T::Identifier     => write!(f, "identifier"),
            T::BooleanLiteral => write!(f, "boolean literal"),
            T::CharLiteral    => write!(f, "char literal"),
            T::IntLiteral     => write!(f, "integer literal"),
            T::FloatLiteral   => write!(f, "float literal"),
            T::StringLiteral  => write!(f, "string literal"),
            T::Assign         => write!(f, "assignment"),
            T::TernaryColon   => write!(f, "conditional operator"),
            T::LogicOr        => write!(f, "logical or"),
            T::LogicAnd       => write!(f, "logical and"),
            T::BitOr          => write!(f, "bitwise or"),
            T::Xor            => write!(f, "bitwise xor"),
            T::BitAnd         => write!(f, "bitwise and"),
            T::Equality       => write!(f, "equality operator"),
            T::Compare        => write!(f, "comparison operator"),
            T::Shift          => write!(f, "shift operator"),
            T::AddSub         => write!(f, "additive operator"),
            T::MulDiv         => write!(f, "multiplicative operator"),
            T::UnaryOrIncDec  => write!(f, "unary operator"),
            T::BracketOrDot   => write!(f, "bracket"),
            T::Comma          => write!(f, "comma"),
            T::BigBracket     => write!(f, "brace"),
            T::Semicolon      => write!(f, "semicolon"),
            T::Colon          => write!(f, "colon"),
        }
    }
}

/// Reserved words.
///
/// `true` and `false` are not in here, they are boolean literals.
#[rustfmt::skip]
pub const KEYWORDS: &[&str] = &[
    /* a */ "abstract",
    /* b */ "boolean", "break", "byte",
    /* c */ "case", "catch", "char", "class", "const", "continue",
    /* d */ "default", "do", "double",
    /* e */ "else", "extends",
    /* f */ "final", "finally", "float", "for",
    /* g */ "goto",
    /* i */ "if", "implements", "import", "instanceof", "int", "interface",
    /* l */ "long",
    /* n */ "native", "new", "null",
    /* p */ "package", "private", "protected", "public",
    /* r */ "return",
    /* s */ "short", "static", "super", "switch", "synchronized",
    /* t */ "this", "throw", "throws", "transient", "try",
    /* v */ "void", "volatile",
    /* w */ "while",
];

/// Decide what an identifier-shaped word is.
pub fn classify(word: &str) -> TokenKind {
    match word {
        "true" | "false" => TokenKind::BooleanLiteral,
        _ if KEYWORDS.contains(&word) => TokenKind::Keyword,
        _ => TokenKind::Identifier,
    }
}

/// One entry of the scanner output.
///
/// Besides tokens the scanner reports a word count for every
/// finished source line, and a word count for the whole source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    Token(Token),
    /// Closes a source line.
    Line { line: usize, words: usize },
    /// Closes the source.
    Total { words: usize },
}

impl Record {
    #[inline]
    pub fn as_token(&self) -> Option<&Token> {
        match self {
            Record::Token(token) => Some(token),
            _ => None,
        }
    }

    #[inline]
    pub fn into_token(self) -> Option<Token> {
        match self {
            Record::Token(token) => Some(token),
            _ => None,
        }
    }
}
