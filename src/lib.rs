//! Tokenizer and recursive-descent validator for a minimal Pascal subset.
//!
//! Accepts a `program` header, an optional `var` section, and one
//! `begin ... end` block holding assignments of a single number or
//! identifier and nested blocks. Nothing else is recognized.
//!
//! # Quick start
//!
//! ```
//! use pascal_validator::{check_lexical, tokenize, validate};
//!
//! let tokens = tokenize("program P; var x: integer; begin x := 1 end.");
//! assert!(check_lexical(&tokens).is_ok());
//! let verdict = validate(&tokens);
//! assert!(verdict.accepted);
//! ```
//!
//! ## Reading a rejection
//!
//! ```
//! use pascal_validator::analyze;
//!
//! let analysis = analyze("program P; begin x := 1; end.");
//! assert!(!analysis.verdict.accepted);
//! let root = analysis.verdict.trace.root_cause().unwrap();
//! assert_eq!(root.message, "expected 'begin'");
//! ```

// Allow noisy pedantic lints that don't add value for
// a library crate.
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]

pub mod lexer;
pub mod token;
pub mod validator;

pub use lexer::{LexError, LexErrorKind, check_lexical, tokenize};
pub use token::{KEYWORDS, Span, Token, TokenKind};
pub use validator::{Diagnostic, DiagnosticTrace, Rule, SyntaxError, Verdict, validate};

/// Unified error type covering both lexical and syntax errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The source contains a character no token rule accepts.
    #[error("{0}")]
    Lex(#[from] LexError),
    /// The token sequence does not follow the grammar.
    #[error("{0}")]
    Syntax(#[from] SyntaxError),
}

/// Tokens and verdict for one source string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analysis {
    pub tokens: Vec<Token>,
    pub verdict: Verdict,
}

/// Tokenize, reject on any `Unknown` token, and otherwise validate.
///
/// A lexical rejection leaves the trace empty and sets
/// `verdict.lexical_error`; the validator never runs in that case.
#[must_use]
pub fn analyze(source: &str) -> Analysis {
    let tokens = tokenize(source);
    let verdict = match check_lexical(&tokens) {
        Ok(()) => validate(&tokens),
        Err(err) => {
            tracing::debug!(%err, "lexical error, skipping validation");
            Verdict {
                accepted: false,
                trace: DiagnosticTrace::default(),
                lexical_error: Some(err),
            }
        }
    };
    Analysis { tokens, verdict }
}

/// Tokenize and validate a source string in one step.
pub fn check_str(source: &str) -> Result<(), Error> {
    let tokens = tokenize(source);
    check_lexical(&tokens)?;
    match validate(&tokens).syntax_error() {
        Some(err) => Err(err.into()),
        None => Ok(()),
    }
}
