//! Predefined token patterns for a small C-like language.
//!
//! The grammar has no character classes, so letter and digit classes are
//! expanded to explicit alternations. Keywords come before `IDENTIFIER` on
//! purpose: insertion order is priority order, and a keyword must beat the
//! identifier pattern on its own spelling.

use crate::generator::TokenSpec;

fn alternation(choices: impl IntoIterator<Item = char>) -> String {
    let choices: Vec<String> = choices.into_iter().map(|ch| ch.to_string()).collect();
    format!("({})", choices.join("|"))
}

/// Token specs for a C-like language: keywords, identifiers, integer
/// literals, and single-character operators and delimiters.
///
/// `*`, `(` and `)` have no token here: they are metacharacters of the
/// pattern grammar and there is no escaping to spell them literally.
pub fn c_like_patterns() -> Vec<TokenSpec> {
    let letter = alternation(('a'..='z').chain('A'..='Z'));
    let digit = alternation('0'..='9');
    let alnum = alternation(('a'..='z').chain('A'..='Z').chain('0'..='9'));

    let mut specs = Vec::new();

    for keyword in ["if", "else", "while", "for", "int", "float", "return"] {
        specs.push(TokenSpec::new(
            format!("KEYWORD_{}", keyword.to_uppercase()),
            keyword.to_string(),
        ));
    }

    specs.push(TokenSpec::new(
        "IDENTIFIER".to_string(),
        format!("{}{}*", letter, alnum),
    ));
    specs.push(TokenSpec::new(
        "NUMBER".to_string(),
        format!("{}{}*", digit, digit),
    ));

    for (category, pattern) in [
        ("PLUS", "+"),
        ("MINUS", "-"),
        ("DIVIDE", "/"),
        ("ASSIGN", "="),
        ("LESS_THAN", "<"),
        ("GREATER_THAN", ">"),
        ("SEMICOLON", ";"),
        ("LBRACE", "{"),
        ("RBRACE", "}"),
    ] {
        specs.push(TokenSpec::new(category.to_string(), pattern.to_string()));
    }

    specs
}
