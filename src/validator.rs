use std::fmt;

use crate::lexer::LexError;
use crate::token::{Token, TokenKind};

/// Grammar rule that emitted a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    Program,
    Block,
    VarPart,
    VarDecl,
    Type,
    StatementPart,
    CompoundStatement,
    Statement,
    Expression,
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Program => "Program",
            Self::Block => "Block",
            Self::VarPart => "VarPart",
            Self::VarDecl => "VarDecl",
            Self::Type => "Type",
            Self::StatementPart => "StatementPart",
            Self::CompoundStatement => "CompoundStatement",
            Self::Statement => "Statement",
            Self::Expression => "Expression",
        };
        f.write_str(name)
    }
}

/// One failure message recorded while a rejected parse unwinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub rule: Rule,
    /// Cursor position (token index) when the failure was recorded.
    pub position: usize,
    /// Token at the cursor, or `None` at end of input.
    pub found: Option<Token>,
    pub message: &'static str,
}

impl Diagnostic {
    #[must_use]
    pub const fn at_end_of_input(&self) -> bool {
        self.found.is_none()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.found {
            Some(token) => write!(
                f,
                "{}, found {} '{}' at line {}, column {}",
                self.message, token.kind, token.text, token.span.line, token.span.column
            ),
            None => write!(f, "{}, found end of input", self.message),
        }
    }
}

/// Diagnostics in emission order: the root cause first, then the
/// restatements of every enclosing rule.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiagnosticTrace(Vec<Diagnostic>);

impl DiagnosticTrace {
    /// The earliest entry, i.e. the innermost failure.
    #[must_use]
    pub fn root_cause(&self) -> Option<&Diagnostic> {
        self.0.first()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.0.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a DiagnosticTrace {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Outcome of validating one token sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub accepted: bool,
    /// Empty when accepted, and when rejected for a lexical error.
    pub trace: DiagnosticTrace,
    /// Set only by the orchestrator entry points, never by [`validate`].
    pub lexical_error: Option<LexError>,
}

impl Verdict {
    /// The syntax error behind a rejection, if the grammar rejected it.
    #[must_use]
    pub fn syntax_error(&self) -> Option<SyntaxError> {
        if self.accepted {
            return None;
        }
        self.trace.root_cause().map(|root| SyntaxError {
            root: root.clone(),
            trace: self.trace.clone(),
        })
    }
}

/// A grammar rule could not be derived from the token stream.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{root}")]
pub struct SyntaxError {
    pub root: Diagnostic,
    pub trace: DiagnosticTrace,
}

/// Check a token sequence against the program grammar.
///
/// The caller is expected to have rejected sequences containing
/// `Unknown` tokens already (see [`crate::check_lexical`]); this function
/// treats them like any other token that fits no rule.
#[must_use]
pub fn validate(tokens: &[Token]) -> Verdict {
    let mut validator = Validator::new(tokens);
    let accepted = validator.program().is_ok();
    Verdict {
        accepted,
        trace: DiagnosticTrace(validator.trace),
        lexical_error: None,
    }
}

/// Marker for a failed rule; the reason is already in the trace.
#[derive(Debug, Clone, Copy)]
struct Rejected;

type Step = Result<(), Rejected>;

const TYPE_NAMES: [&str; 3] = ["integer", "real", "boolean"];

struct Validator<'a> {
    tokens: &'a [Token],
    pos: usize,
    trace: Vec<Diagnostic>,
}

impl<'a> Validator<'a> {
    const fn new(tokens: &'a [Token]) -> Self {
        Self {
            tokens,
            pos: 0,
            trace: Vec::new(),
        }
    }

    // Program ::= 'program' Identifier ';' Block '.'
    fn program(&mut self) -> Step {
        self.enter(Rule::Program);
        self.expect(
            TokenKind::Keyword,
            Some("program"),
            Rule::Program,
            "expected 'program'",
        )?;
        self.expect(
            TokenKind::Identifier,
            None,
            Rule::Program,
            "expected program name",
        )?;
        self.expect(
            TokenKind::Delimiter,
            Some(";"),
            Rule::Program,
            "expected ';' after program name",
        )?;
        self.block()
            .or_else(|_| self.fail(Rule::Program, "invalid block"))?;
        self.expect(
            TokenKind::Delimiter,
            Some("."),
            Rule::Program,
            "expected '.' at end of program",
        )
    }

    // Block ::= VarPart StatementPart
    fn block(&mut self) -> Step {
        self.enter(Rule::Block);
        self.var_part()
            .or_else(|_| self.fail(Rule::Block, "invalid variable declaration part"))?;
        self.statement_part()
            .or_else(|_| self.fail(Rule::Block, "invalid statement part"))
    }

    // VarPart ::= ( 'var' (VarDecl ';')+ )?
    fn var_part(&mut self) -> Step {
        self.enter(Rule::VarPart);
        if !self.matches(TokenKind::Keyword, Some("var")) {
            return Ok(());
        }
        loop {
            self.var_decl()
                .or_else(|_| self.fail(Rule::VarPart, "invalid variable declaration"))?;
            self.expect(
                TokenKind::Delimiter,
                Some(";"),
                Rule::VarPart,
                "expected ';' after variable declaration",
            )?;
            if !self.peek(TokenKind::Identifier) {
                return Ok(());
            }
        }
    }

    // VarDecl ::= Identifier (',' Identifier)* ':' Type
    fn var_decl(&mut self) -> Step {
        self.enter(Rule::VarDecl);
        self.expect(
            TokenKind::Identifier,
            None,
            Rule::VarDecl,
            "expected variable name",
        )?;
        while self.matches(TokenKind::Delimiter, Some(",")) {
            self.expect(
                TokenKind::Identifier,
                None,
                Rule::VarDecl,
                "expected variable name after ','",
            )?;
        }
        self.expect(
            TokenKind::Operator,
            Some(":"),
            Rule::VarDecl,
            "expected ':' after variable name(s)",
        )?;
        self.type_name()
            .or_else(|_| self.fail(Rule::VarDecl, "expected type after ':'"))
    }

    // Type ::= 'integer' | 'real' | 'boolean'
    fn type_name(&mut self) -> Step {
        self.enter(Rule::Type);
        if TYPE_NAMES
            .iter()
            .any(|name| self.matches(TokenKind::Keyword, Some(*name)))
        {
            Ok(())
        } else {
            Err(Rejected)
        }
    }

    // StatementPart ::= CompoundStatement
    fn statement_part(&mut self) -> Step {
        self.enter(Rule::StatementPart);
        self.compound_statement()
            .or_else(|_| self.fail(Rule::StatementPart, "invalid compound statement"))
    }

    // CompoundStatement ::= 'begin' Statement (';' Statement)* 'end'
    //
    // `begin end` is accepted as an empty body. A ';' still commits to
    // another Statement, so `; end` is rejected.
    fn compound_statement(&mut self) -> Step {
        self.enter(Rule::CompoundStatement);
        self.expect(
            TokenKind::Keyword,
            Some("begin"),
            Rule::CompoundStatement,
            "expected 'begin'",
        )?;
        if self.matches(TokenKind::Keyword, Some("end")) {
            return Ok(());
        }
        loop {
            self.statement()
                .or_else(|_| self.fail(Rule::CompoundStatement, "invalid statement"))?;
            if !self.matches(TokenKind::Delimiter, Some(";")) {
                break;
            }
        }
        self.expect(
            TokenKind::Keyword,
            Some("end"),
            Rule::CompoundStatement,
            "expected 'end'",
        )
    }

    // Statement ::= ( Identifier ':=' Expression ) | CompoundStatement
    fn statement(&mut self) -> Step {
        self.enter(Rule::Statement);
        if self.matches(TokenKind::Identifier, None) {
            self.assign_operator()
                .or_else(|_| self.fail(Rule::Statement, "expected ':=' after variable name"))?;
            return self
                .expression()
                .or_else(|_| self.fail(Rule::Statement, "expected expression after ':='"));
        }
        self.compound_statement().or_else(|_| {
            self.fail(
                Rule::Statement,
                "expected assignment or compound statement",
            )
        })
    }

    // Expression ::= Number | Identifier
    fn expression(&mut self) -> Step {
        self.enter(Rule::Expression);
        if self.matches(TokenKind::Number, None) || self.matches(TokenKind::Identifier, None) {
            Ok(())
        } else {
            Err(Rejected)
        }
    }

    /// `:=` arrives as two Operator tokens; they only form the assignment
    /// operator when nothing separates them in the source.
    fn assign_operator(&mut self) -> Step {
        let adjacent = match (self.tokens.get(self.pos), self.tokens.get(self.pos + 1)) {
            (Some(colon), Some(equals)) => {
                colon.is(TokenKind::Operator, Some(":"))
                    && equals.is(TokenKind::Operator, Some("="))
                    && equals.span.offset == colon.end_offset()
            }
            _ => false,
        };
        if adjacent
            && self.matches(TokenKind::Operator, Some(":"))
            && self.matches(TokenKind::Operator, Some("="))
        {
            Ok(())
        } else {
            Err(Rejected)
        }
    }

    /// Consume the current token if it has `kind` (and lexeme `value`).
    fn matches(&mut self, kind: TokenKind, value: Option<&str>) -> bool {
        match self.tokens.get(self.pos) {
            Some(token) if token.is(kind, value) => {
                tracing::trace!(%kind, text = %token.text, position = self.pos, "matched");
                self.pos += 1;
                true
            }
            _ => false,
        }
    }

    fn peek(&self, kind: TokenKind) -> bool {
        self.tokens.get(self.pos).is_some_and(|t| t.kind == kind)
    }

    fn expect(
        &mut self,
        kind: TokenKind,
        value: Option<&str>,
        rule: Rule,
        message: &'static str,
    ) -> Step {
        if self.matches(kind, value) {
            Ok(())
        } else {
            self.fail(rule, message)
        }
    }

    fn fail(&mut self, rule: Rule, message: &'static str) -> Step {
        let diagnostic = Diagnostic {
            rule,
            position: self.pos,
            found: self.tokens.get(self.pos).cloned(),
            message,
        };
        tracing::debug!(%rule, %diagnostic, "rule failed");
        self.trace.push(diagnostic);
        Err(Rejected)
    }

    fn enter(&self, rule: Rule) {
        tracing::trace!(%rule, position = self.pos, "parsing");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    fn validate_input(input: &str) -> Verdict {
        validate(&tokenize(input))
    }

    fn rules(verdict: &Verdict) -> Vec<Rule> {
        verdict.trace.iter().map(|d| d.rule).collect()
    }

    #[test]
    fn minimal_program() {
        let verdict = validate_input("program P; begin end.");
        assert!(verdict.accepted);
        assert!(verdict.trace.is_empty());
        assert!(verdict.lexical_error.is_none());
    }

    #[test]
    fn declarations_and_assignment() {
        let verdict = validate_input("program P; var x,y: integer; begin x := 1 end.");
        assert!(verdict.accepted, "{:?}", verdict.trace);
    }

    #[test]
    fn several_declarations_and_statements() {
        let verdict = validate_input(
            "program Calc;\n\
             var a, b: integer;\n\
                 r: real;\n\
                 done: boolean;\n\
             begin\n\
                 a := 1;\n\
                 b := a;\n\
                 begin r := 2.5 end;\n\
                 done := b\n\
             end.",
        );
        assert!(verdict.accepted, "{:?}", verdict.trace);
    }

    #[test]
    fn missing_terminator_at_end_of_input() {
        let verdict = validate_input("program P; begin end");
        assert!(!verdict.accepted);
        let root = verdict.trace.root_cause().unwrap();
        assert_eq!(root.rule, Rule::Program);
        assert!(root.message.contains("'.'"));
        assert!(root.at_end_of_input());
    }

    #[test]
    fn trailing_semicolon_before_end() {
        let verdict = validate_input("program P; begin x := 1; end.");
        assert!(!verdict.accepted);
        let root = verdict.trace.root_cause().unwrap();
        assert_eq!(root.rule, Rule::CompoundStatement);
        assert_eq!(root.found.as_ref().unwrap().text, "end");
    }

    #[test]
    fn control_flow_keyword_is_not_a_statement() {
        let verdict = validate_input("program P; begin if x then y := 1 end.");
        assert!(!verdict.accepted);
        let root = verdict.trace.root_cause().unwrap();
        assert_eq!(root.found.as_ref().unwrap().text, "if");
    }

    #[test]
    fn cascade_runs_innermost_first() {
        let verdict = validate_input("program P; begin if x then y := 1 end.");
        assert_eq!(
            rules(&verdict),
            vec![
                Rule::CompoundStatement,
                Rule::Statement,
                Rule::CompoundStatement,
                Rule::StatementPart,
                Rule::Block,
                Rule::Program,
            ]
        );
        assert!(verdict.trace.iter().all(|d| d.position == 4));
    }

    #[test]
    fn spaced_assignment_operator_is_rejected() {
        let verdict = validate_input("program P; begin x : = 1 end.");
        assert!(!verdict.accepted);
        let root = verdict.trace.root_cause().unwrap();
        assert_eq!(root.rule, Rule::Statement);
        assert_eq!(root.message, "expected ':=' after variable name");
    }

    #[test]
    fn expression_is_a_single_token() {
        let verdict = validate_input("program P; begin x := 1 + 2 end.");
        assert!(!verdict.accepted);
        let root = verdict.trace.root_cause().unwrap();
        assert_eq!(root.message, "expected 'end'");
        assert_eq!(root.found.as_ref().unwrap().text, "+");
    }

    #[test]
    fn missing_type() {
        let verdict = validate_input("program P; var x: ; begin end.");
        let root = verdict.trace.root_cause().unwrap();
        assert_eq!(root.rule, Rule::VarDecl);
        assert_eq!(root.message, "expected type after ':'");
    }

    #[test]
    fn var_without_declarations() {
        let verdict = validate_input("program P; var begin end.");
        assert!(!verdict.accepted);
        assert_eq!(
            verdict.trace.root_cause().unwrap().message,
            "expected variable name"
        );
    }

    #[test]
    fn diagnostic_display() {
        let verdict = validate_input("program P; begin x := 1 end");
        let root = verdict.trace.root_cause().unwrap();
        assert_eq!(
            root.to_string(),
            "expected '.' at end of program, found end of input"
        );

        let verdict = validate_input("program 1");
        let root = verdict.trace.root_cause().unwrap();
        assert_eq!(
            root.to_string(),
            "expected program name, found Number '1' at line 1, column 9"
        );
    }

    #[test]
    fn syntax_error_from_verdict() {
        assert!(validate_input("program P; begin end.").syntax_error().is_none());
        let err = validate_input("begin end.").syntax_error().unwrap();
        assert_eq!(err.root.message, "expected 'program'");
        assert_eq!(err.trace.len(), 1);
    }
}
