use clap::{Arg, ArgAction, Command};
use color_eyre::eyre::Result;

use lexforge::{
    c_like_patterns, read_microsyntax_file, write_dot, write_scanner, LexicalGenerator,
};

fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Command::new("lexforge")
        .version("0.1.0")
        .about("A lexical analyzer generator using Thompson and subset construction")
        .arg(
            Arg::new("microsyntax")
                .short('f')
                .long("file")
                .value_name("FILE")
                .help("Microsyntax file with one PATTERN::CATEGORY entry per line"),
        )
        .arg(
            Arg::new("preset")
                .short('p')
                .long("preset")
                .help("Load the predefined token patterns for a C-like language")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("save-nfa")
                .short('n')
                .long("save-nfa")
                .help("Save the combined NFA as a Graphviz dot file")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("save-dfa")
                .short('d')
                .long("save-dfa")
                .help("Save the DFA obtained after subset construction as a Graphviz dot file")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("emit")
                .short('o')
                .long("emit")
                .value_name("FILE")
                .help("Emit a standalone Rust scanner for the compiled DFA"),
        )
        .arg(
            Arg::new("scan")
                .short('s')
                .long("scan")
                .value_name("FILE")
                .help("Tokenize FILE with the compiled scanner and print the tokens"),
        )
        .get_matches();

    let mut generator = LexicalGenerator::new();

    if args.get_flag("preset") {
        for spec in c_like_patterns() {
            generator.add_token(spec.get_category(), spec.get_pattern());
        }
    }
    if let Some(path) = args.get_one::<String>("microsyntax") {
        for spec in read_microsyntax_file(path)? {
            generator.add_token(spec.get_category(), spec.get_pattern());
        }
    }

    generator.build()?;
    println!(
        "Compiled {} token patterns into a DFA",
        generator.get_specs().len()
    );

    if args.get_flag("save-nfa") {
        if let Some(nfa) = generator.nfa() {
            write_dot(nfa, "nfa.dot")?;
            println!("NFA saved as nfa.dot");
        }
    }

    if args.get_flag("save-dfa") {
        if let Some(dfa) = generator.dfa() {
            write_dot(dfa, "dfa.dot")?;
            println!("DFA saved as dfa.dot");
        }
    }

    if let Some(path) = args.get_one::<String>("emit") {
        if let Some(dfa) = generator.dfa() {
            write_scanner(dfa, path)?;
            println!("Scanner source emitted to {}", path);
        }
    }

    if let Some(path) = args.get_one::<String>("scan") {
        let input = std::fs::read_to_string(path)?;
        if let Some(scanner) = generator.scanner() {
            let (tokens, errors) = scanner.scan(&input);
            for token in tokens {
                println!(
                    "The token is {} and the category is {}",
                    token.get_token(),
                    token.get_category()
                );
            }
            for error in errors {
                eprintln!("{}", error);
            }
        }
    }

    Ok(())
}
