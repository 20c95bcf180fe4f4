/* Emit a standalone Rust scanner for a compiled DFA. The generated file is
 * self-contained: transition and accepting tables baked into match arms, a
 * tokenize function with longest-match semantics and one-symbol error
 * recovery, and a main that tokenizes stdin. */

use std::fs::File;
use std::io::{self, Write};

use crate::dfa::DFA;
use crate::fa::{Symbol, FA};
use crate::generator::GeneratorError;

/// Writes the generated scanner source to `output`. Transitions and labels
/// are emitted in sorted order so the same DFA always produces the same
/// text.
pub fn emit_scanner<W: Write>(dfa: &DFA, output: &mut W) -> io::Result<()> {
    writeln!(output, "// Generated lexical analyzer. Do not edit by hand.")?;
    writeln!(output, "//")?;
    writeln!(
        output,
        "// Tokenizes input by maximal munch: from each position the longest"
    )?;
    writeln!(
        output,
        "// accepting prefix wins, stray whitespace is skipped, and anything"
    )?;
    writeln!(output, "// else is reported without stopping the scan.")?;
    writeln!(output)?;
    writeln!(output, "#[derive(Debug)]")?;
    writeln!(output, "pub struct Token {{")?;
    writeln!(output, "    pub category: &'static str,")?;
    writeln!(output, "    pub lexeme: String,")?;
    writeln!(output, "    pub line: usize,")?;
    writeln!(output, "    pub column: usize,")?;
    writeln!(output, "}}")?;
    writeln!(output)?;
    writeln!(
        output,
        "const START_STATE: usize = {};",
        dfa.get_start_state()
    )?;
    writeln!(output)?;

    emit_transition_fn(dfa, output)?;
    writeln!(output)?;
    emit_accepting_fn(dfa, output)?;
    writeln!(output)?;
    emit_tokenize_fn(output)?;
    writeln!(output)?;
    emit_main_fn(output)?;
    Ok(())
}

fn emit_transition_fn<W: Write>(dfa: &DFA, output: &mut W) -> io::Result<()> {
    writeln!(
        output,
        "fn next_state(state: usize, symbol: char) -> Option<usize> {{"
    )?;
    writeln!(output, "    match (state, symbol) {{")?;

    for state in 0..dfa.get_num_states() {
        let mut transitions: Vec<(char, usize)> = dfa
            .get_state_transitions(state)
            .into_iter()
            .filter_map(|(symbol, target)| match symbol {
                Symbol::Char(ch) => Some((ch, target)),
                Symbol::Epsilon => None,
            })
            .collect();
        transitions.sort_unstable();
        for (ch, target) in transitions {
            writeln!(
                output,
                "        ({}, {:?}) => Some({}),",
                state, ch, target
            )?;
        }
    }

    writeln!(output, "        _ => None,")?;
    writeln!(output, "    }}")?;
    writeln!(output, "}}")?;
    Ok(())
}

fn emit_accepting_fn<W: Write>(dfa: &DFA, output: &mut W) -> io::Result<()> {
    writeln!(
        output,
        "fn accepting_category(state: usize) -> Option<&'static str> {{"
    )?;
    writeln!(output, "    match state {{")?;

    let mut labels: Vec<(usize, &str)> = dfa
        .get_labels()
        .iter()
        .map(|(state, label)| (*state, label.get_category()))
        .collect();
    labels.sort_unstable();
    for (state, category) in labels {
        writeln!(output, "        {} => Some({:?}),", state, category)?;
    }

    writeln!(output, "        _ => None,")?;
    writeln!(output, "    }}")?;
    writeln!(output, "}}")?;
    Ok(())
}

fn emit_tokenize_fn<W: Write>(output: &mut W) -> io::Result<()> {
    let body = r#"pub fn tokenize(input: &str) -> Vec<Token> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut pos = 0;
    let mut line = 1;
    let mut column = 1;

    while pos < chars.len() {
        let mut state = START_STATE;
        let mut cursor = pos;
        let mut last_accept: Option<(usize, &'static str)> = None;

        while cursor < chars.len() {
            match next_state(state, chars[cursor]) {
                Some(next) => {
                    state = next;
                    cursor += 1;
                    if let Some(category) = accepting_category(state) {
                        last_accept = Some((cursor, category));
                    }
                }
                None => break,
            }
        }

        match last_accept {
            Some((end, category)) => {
                let lexeme: String = chars[pos..end].iter().collect();
                tokens.push(Token { category, lexeme, line, column });
                for &ch in &chars[pos..end] {
                    if ch == '\n' {
                        line += 1;
                        column = 1;
                    } else {
                        column += 1;
                    }
                }
                pos = end;
            }
            None => {
                let ch = chars[pos];
                if ch != ' ' && ch != '\t' && ch != '\n' {
                    eprintln!(
                        "Lexical error at line {}, column {}: unexpected character {:?}",
                        line, column, ch
                    );
                }
                if ch == '\n' {
                    line += 1;
                    column = 1;
                } else {
                    column += 1;
                }
                pos += 1;
            }
        }
    }
    tokens
}"#;
    writeln!(output, "{}", body)?;
    Ok(())
}

fn emit_main_fn<W: Write>(output: &mut W) -> io::Result<()> {
    let body = r#"fn main() {
    use std::io::Read;

    let mut input = String::new();
    if let Err(error) = std::io::stdin().read_to_string(&mut input) {
        eprintln!("Failed to read input: {}", error);
        return;
    }

    for token in tokenize(&input) {
        println!("<{}, {:?}>", token.category, token.lexeme);
    }
}"#;
    writeln!(output, "{}", body)?;
    Ok(())
}

/// Emits the generated scanner into a file at `path`.
pub fn write_scanner(dfa: &DFA, path: &str) -> Result<(), GeneratorError> {
    let mut file = match File::create(path) {
        Ok(file) => file,
        Err(error) => {
            let err_line = format!("Error: Failed to create the scanner file {}", error);
            return Err(GeneratorError::FileWriteError(err_line));
        }
    };
    if let Err(error) = emit_scanner(dfa, &mut file) {
        let err_line = format!("Error: Failed to write the scanner file {}", error);
        return Err(GeneratorError::FileWriteError(err_line));
    }
    Ok(())
}
