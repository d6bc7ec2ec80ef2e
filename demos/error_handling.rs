//! Demonstrate error handling for invalid programs.

fn main() {
    // Stray character
    match pascal_validator::check_str("program P; begin x := 1 @ 2 end.") {
        Ok(()) => println!("Valid (unexpected)"),
        Err(pascal_validator::Error::Lex(e)) => {
            println!("Lex error: {e}");
            println!("  Kind: {:?}", e.kind);
            println!("  Location: line {}, column {}", e.span.line, e.span.column);
        }
        Err(pascal_validator::Error::Syntax(e)) => {
            println!("Syntax error: {e}");
        }
    }

    println!();

    // Semicolon before `end` commits to one more statement
    let analysis = pascal_validator::analyze("program P; begin x := 1; end.");
    println!("Accepted: {}", analysis.verdict.accepted);
    for diagnostic in &analysis.verdict.trace {
        println!("  [{}] {diagnostic}", diagnostic.rule);
    }
}
