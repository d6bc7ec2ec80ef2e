use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::token::{KEYWORDS, Span, Token, TokenKind};

/// Classifies a lexical error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexErrorKind {
    /// Character that only the catch-all rule accepted.
    UnknownCharacter(char),
}

impl fmt::Display for LexErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownCharacter(ch) => {
                write!(f, "unknown character '{ch}'")
            }
        }
    }
}

/// Error produced when the token sequence contains an `Unknown` token.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at line {}, column {}", span.line, span.column)]
pub struct LexError {
    pub kind: LexErrorKind,
    pub span: Span,
}

/// What a rule produces when it wins at the current offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rule {
    Emit(TokenKind),
    Whitespace,
}

impl Rule {
    /// Rules that must start and end on a word boundary.
    const fn is_word(self) -> bool {
        matches!(
            self,
            Self::Emit(TokenKind::Keyword | TokenKind::Number | TokenKind::Identifier)
        )
    }
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

/// The dispatch table. Order is priority: the first pattern matching at
/// the current offset wins, so `Keyword` pre-empts `Identifier` and the
/// single-character `Unknown` rule is only reached when nothing else
/// applies.
///
/// Word rules carry their trailing `\b` in the pattern; the leading
/// boundary is checked in [`Lexer::next_match`] since each pattern only
/// sees the input from the current offset on.
static RULES: Lazy<Vec<(Rule, Regex)>> = Lazy::new(|| {
    let keyword = format!(r"^(?:{})\b", KEYWORDS.join("|"));
    [
        (Rule::Emit(TokenKind::Keyword), keyword.as_str()),
        (Rule::Emit(TokenKind::Number), r"^[0-9]+(?:\.[0-9]+)?\b"),
        (Rule::Emit(TokenKind::Identifier), r"^[A-Za-z_][A-Za-z0-9_]*\b"),
        (Rule::Emit(TokenKind::Operator), r"^[-+*/:=<>]"),
        (Rule::Emit(TokenKind::Delimiter), r"^[;,()\[\].]"),
        (Rule::Whitespace, r"^\s+"),
        (Rule::Emit(TokenKind::Unknown), r"(?s)^."),
    ]
    .into_iter()
    .map(|(rule, pattern)| {
        let regex = Regex::new(pattern).expect("lexer patterns are valid");
        (rule, regex)
    })
    .collect()
});

/// Tokenize a source string into a sequence of tokens.
///
/// Never fails: characters no other rule accepts become
/// [`TokenKind::Unknown`] tokens, one per character. Use
/// [`check_lexical`] to turn those into an error.
#[must_use]
pub fn tokenize(input: &str) -> Vec<Token> {
    Lexer::new(input).tokenize()
}

/// Reject a token sequence containing any `Unknown` token.
///
/// # Errors
///
/// Returns `LexError` for the first `Unknown` token found.
pub fn check_lexical(tokens: &[Token]) -> Result<(), LexError> {
    match tokens.iter().find(|t| t.kind == TokenKind::Unknown) {
        Some(token) => Err(LexError {
            kind: LexErrorKind::UnknownCharacter(token.text.chars().next().unwrap_or_default()),
            span: token.span,
        }),
        None => Ok(()),
    }
}

struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    line: usize,
    col: usize,
}

impl<'a> Lexer<'a> {
    const fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            line: 1,
            col: 1,
        }
    }

    fn tokenize(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();

        while self.pos < self.input.len() {
            let Some((rule, len)) = self.next_match() else {
                break;
            };
            let start = self.span();
            let text = &self.input[self.pos..self.pos + len];
            self.advance(text);

            if let Rule::Emit(kind) = rule {
                tracing::trace!(%kind, text, line = start.line, column = start.column, "token");
                tokens.push(Token {
                    kind,
                    text: text.to_string(),
                    span: start,
                });
            }
        }

        tokens
    }

    /// First rule in table order matching at the current offset, with the
    /// byte length it matched.
    fn next_match(&self) -> Option<(Rule, usize)> {
        let rest = &self.input[self.pos..];
        let after_word = self.input[..self.pos]
            .chars()
            .next_back()
            .is_some_and(is_word_char);
        RULES
            .iter()
            .filter(|(rule, _)| !(after_word && rule.is_word()))
            .find_map(|(rule, regex)| regex.find(rest).map(|m| (*rule, m.end())))
    }

    const fn span(&self) -> Span {
        Span {
            line: self.line,
            column: self.col,
            offset: self.pos,
        }
    }

    fn advance(&mut self, text: &str) {
        for ch in text.chars() {
            if ch == '\n' {
                self.line += 1;
                self.col = 1;
            } else {
                self.col += 1;
            }
        }
        self.pos += text.len();
    }
}
