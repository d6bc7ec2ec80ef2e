use std::fmt;

/// Reserved words recognized by the tokenizer.
///
/// Only `program`, `var`, `begin`, `end` and the three type names have a
/// place in the grammar; the rest still lex as keywords so they can never
/// be used as identifiers.
pub const KEYWORDS: &[&str] = &[
    "program",
    "begin",
    "end",
    "var",
    "integer",
    "real",
    "boolean",
    "procedure",
    "function",
    "if",
    "then",
    "else",
    "while",
    "do",
    "for",
    "to",
    "downto",
    "repeat",
    "until",
    "case",
    "of",
    "write",
    "writeln",
    "read",
    "readln",
];

/// Source location for error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub line: usize,
    pub column: usize,
    /// Byte offset of the first character of the lexeme.
    pub offset: usize,
}

/// Token kinds produced by the tokenizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Reserved word from [`KEYWORDS`].
    Keyword,
    /// Digits with an optional fractional part (`42`, `3.14`).
    Number,
    /// Letter or underscore followed by letters, digits or underscores.
    Identifier,
    /// One of `+ - * / : = < >`.
    Operator,
    /// One of `; , ( ) [ ] .`.
    Delimiter,
    /// A single character no other rule accepts.
    Unknown,
}

impl TokenKind {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Keyword => "Keyword",
            Self::Number => "Number",
            Self::Identifier => "Identifier",
            Self::Operator => "Operator",
            Self::Delimiter => "Delimiter",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single token with its kind, text, and source location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub span: Span,
}

impl Token {
    /// Whether this token has `kind` and, when given, exactly the lexeme
    /// `value`.
    #[must_use]
    pub fn is(&self, kind: TokenKind, value: Option<&str>) -> bool {
        self.kind == kind && value.is_none_or(|v| self.text == v)
    }

    /// Byte offset one past the end of the lexeme.
    #[must_use]
    pub fn end_offset(&self) -> usize {
        self.span.offset + self.text.len()
    }
}
