//! Tokenize a program, print its tokens, and validate it.

use pascal_validator::{check_lexical, tokenize, validate};

fn main() {
    let source = "program Demo;\n\
                  var count, total: integer;\n\
                  begin\n\
                  \tcount := 3;\n\
                  \tbegin total := count end\n\
                  end.\n";

    let tokens = tokenize(source);
    for token in &tokens {
        println!(
            "{:>3}:{:<3} {:<10} {}",
            token.span.line, token.span.column, token.kind, token.text
        );
    }

    if let Err(e) = check_lexical(&tokens) {
        println!("Lexical error: {e}");
        return;
    }

    let verdict = validate(&tokens);
    println!();
    println!("Accepted: {}", verdict.accepted);
}
