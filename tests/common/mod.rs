#![allow(dead_code)]

use pascal_validator::{Diagnostic, Verdict, tokenize, validate};

pub fn validate_str(input: &str) -> Verdict {
    validate(&tokenize(input))
}

pub fn assert_accepted(input: &str) {
    let verdict = validate_str(input);
    assert!(
        verdict.accepted,
        "expected acceptance:\n--- source ---\n{input}\n--- trace ---\n{:#?}",
        verdict.trace
    );
}

/// Assert rejection and hand back the root cause.
pub fn assert_rejected(input: &str) -> Diagnostic {
    let verdict = validate_str(input);
    assert!(
        !verdict.accepted,
        "expected rejection:\n--- source ---\n{input}"
    );
    verdict
        .trace
        .root_cause()
        .cloned()
        .unwrap_or_else(|| panic!("rejection without diagnostics for {input}"))
}

/// Rebuild the source from token lexemes and the gaps between them.
pub fn reassemble(input: &str) -> String {
    let mut out = String::new();
    let mut pos = 0;
    for token in tokenize(input) {
        let gap = &input[pos..token.span.offset];
        assert!(
            gap.chars().all(char::is_whitespace),
            "non-whitespace gap {gap:?} before {token:?}"
        );
        out.push_str(gap);
        out.push_str(&token.text);
        pos = token.end_offset();
    }
    let tail = &input[pos..];
    assert!(tail.chars().all(char::is_whitespace), "unconsumed tail {tail:?}");
    out.push_str(tail);
    out
}
