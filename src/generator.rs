use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

use crate::dfa::{construct_dfa, DFA};
use crate::nfa::{construct_nfa, merge_nfas, NFA};
use crate::regex::{to_postfix, validate};
use crate::scanner::{construct_scanner, Scanner};

/// A named token pattern. Priority is not stored here; it is the spec's
/// position in the generator's insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSpec {
    category: String,
    pattern: String,
}

impl TokenSpec {
    pub fn new(category: String, pattern: String) -> Self {
        TokenSpec { category, pattern }
    }

    pub fn get_category(&self) -> &str {
        &self.category
    }

    pub fn get_pattern(&self) -> &str {
        &self.pattern
    }
}

#[derive(Debug)]
pub enum GeneratorError {
    /// A pattern failed validation or postfix evaluation; carries the
    /// offending category and pattern.
    MalformedRegex(String, String),
    /// `build` was called with no token specs.
    NoPatterns,
    MalformedMicrosyntax(String),
    FileOpenError(String),
    FileReadError(String),
    FileWriteError(String),
}

impl std::fmt::Display for GeneratorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeneratorError::MalformedRegex(category, pattern) => {
                write!(
                    f,
                    "Error: malformed regular expression {:?} for token {}",
                    pattern, category
                )
            }
            GeneratorError::NoPatterns => {
                write!(f, "Error: no token patterns were provided")
            }
            GeneratorError::MalformedMicrosyntax(line) => {
                write!(f, "Error: malformed microsyntax entry detected: {}", line)
            }
            GeneratorError::FileOpenError(err_line) => write!(f, "{}", err_line),
            GeneratorError::FileReadError(err_line) => write!(f, "{}", err_line),
            GeneratorError::FileWriteError(err_line) => write!(f, "{}", err_line),
        }
    }
}

impl std::error::Error for GeneratorError {}

/// Compiles a list of token specs into a single labeled DFA.
///
/// Specs are appended with [`add_token`](LexicalGenerator::add_token) and
/// compiled all at once by [`build`](LexicalGenerator::build); earlier specs
/// win ties against later ones. Multiple generators are independent values.
#[derive(Default)]
pub struct LexicalGenerator {
    specs: Vec<TokenSpec>,
    nfa: Option<NFA>,
    dfa: Option<DFA>,
}

impl LexicalGenerator {
    pub fn new() -> Self {
        LexicalGenerator {
            specs: Vec::new(),
            nfa: None,
            dfa: None,
        }
    }

    /// Appends a token spec. Its priority is its insertion position: the
    /// earliest-declared matching token wins ties. Duplicate categories are
    /// treated as independent specs.
    pub fn add_token(&mut self, category: &str, pattern: &str) {
        self.specs
            .push(TokenSpec::new(category.to_string(), pattern.to_string()));
    }

    pub fn get_specs(&self) -> &[TokenSpec] {
        &self.specs
    }

    /// Compiles every spec added so far. On failure nothing is installed:
    /// the previously added specs remain and no automata are produced.
    pub fn build(&mut self) -> Result<(), GeneratorError> {
        if self.specs.is_empty() {
            return Err(GeneratorError::NoPatterns);
        }

        let mut token_nfas = Vec::new();
        for spec in &self.specs {
            if !validate(spec.get_pattern()) {
                return Err(GeneratorError::MalformedRegex(
                    spec.category.clone(),
                    spec.pattern.clone(),
                ));
            }
            let postfix = to_postfix(spec.get_pattern());
            let nfa = construct_nfa(&postfix).map_err(|_| {
                GeneratorError::MalformedRegex(spec.category.clone(), spec.pattern.clone())
            })?;
            token_nfas.push((spec.category.clone(), nfa));
        }

        let combined = merge_nfas(token_nfas);
        let dfa = construct_dfa(&combined);

        self.nfa = Some(combined);
        self.dfa = Some(dfa);
        Ok(())
    }

    /// The combined NFA of the last successful build.
    pub fn nfa(&self) -> Option<&NFA> {
        self.nfa.as_ref()
    }

    /// The labeled DFA of the last successful build.
    pub fn dfa(&self) -> Option<&DFA> {
        self.dfa.as_ref()
    }

    /// A table-driven scanner over the compiled DFA.
    pub fn scanner(&self) -> Option<Scanner> {
        self.dfa.as_ref().map(construct_scanner)
    }

    /// True iff the whole input tokenizes without lexical errors. Distinct
    /// from matching a single token: the scanner may emit many tokens and
    /// skip whitespace along the way.
    pub fn accepts(&self, input: &str) -> bool {
        match self.scanner() {
            Some(scanner) => {
                let (_, errors) = scanner.scan(input);
                errors.is_empty()
            }
            None => false,
        }
    }
}

/// Parses a microsyntax file into token specs, one `PATTERN::CATEGORY` entry
/// per line. Line order is priority order. A literal `::` inside a pattern
/// is written `\:\:`.
pub fn read_microsyntax_file(file_path: &str) -> Result<Vec<TokenSpec>, GeneratorError> {
    let file_path = PathBuf::from(file_path);

    let file = match File::open(&file_path) {
        Ok(file) => file,
        Err(error) => {
            let err_line = format!("Error: Failed to open the microsyntax file {}", error);
            return Err(GeneratorError::FileOpenError(err_line));
        }
    };
    let reader = BufReader::new(file);

    let mut specs = Vec::new();

    for (line_number, line) in reader.lines().enumerate() {
        let line = match line {
            Ok(line) => line,
            Err(error) => {
                let err_line = format!(
                    "Error: Failed to read line number {} in microsyntax file {}",
                    line_number, error
                );
                return Err(GeneratorError::FileReadError(err_line));
            }
        };

        if line.is_empty() {
            continue;
        }

        let content: Vec<&str> = line.split("::").collect();
        if content.len() != 2 {
            return Err(GeneratorError::MalformedMicrosyntax(content[0].to_string()));
        }

        let pattern = content[0].replace("\\:\\:", "::");
        let category = content[1];

        specs.push(TokenSpec::new(category.to_string(), pattern));
    }

    Ok(specs)
}

#[cfg(test)]
mod generator_tests {
    use super::{GeneratorError, LexicalGenerator};

    #[test]
    fn test_build_with_no_patterns_is_refused() {
        let mut generator = LexicalGenerator::new();
        let result = generator.build();
        assert!(matches!(result, Err(GeneratorError::NoPatterns)));
        assert!(generator.dfa().is_none());
    }

    #[test]
    fn test_build_reports_offending_spec() {
        let mut generator = LexicalGenerator::new();
        generator.add_token("GOOD", "ab");
        generator.add_token("BAD", "(a");
        generator.add_token("ALSO_GOOD", "b");

        match generator.build() {
            Err(GeneratorError::MalformedRegex(category, pattern)) => {
                assert_eq!(category, "BAD");
                assert_eq!(pattern, "(a");
            }
            other => panic!("Expected MalformedRegex, got {:?}", other.err()),
        }
        // Nothing was installed, but the specs are still there.
        assert!(generator.dfa().is_none());
        assert!(generator.nfa().is_none());
        assert_eq!(generator.get_specs().len(), 3);
    }

    #[test]
    fn test_bare_operator_is_malformed() {
        let mut generator = LexicalGenerator::new();
        generator.add_token("STAR", "*");
        assert!(matches!(
            generator.build(),
            Err(GeneratorError::MalformedRegex(_, _))
        ));

        let mut generator = LexicalGenerator::new();
        generator.add_token("HALF_UNION", "a|");
        assert!(matches!(
            generator.build(),
            Err(GeneratorError::MalformedRegex(_, _))
        ));
    }

    #[test]
    fn test_successful_build_installs_views() {
        let mut generator = LexicalGenerator::new();
        generator.add_token("A", "a");
        generator.add_token("B", "b");
        assert!(generator.build().is_ok());
        assert!(generator.nfa().is_some());
        assert!(generator.dfa().is_some());
        assert!(generator.scanner().is_some());
    }

    #[test]
    fn test_rebuild_after_adding_specs() {
        let mut generator = LexicalGenerator::new();
        generator.add_token("A", "a");
        assert!(generator.build().is_ok());
        assert!(!generator.accepts("ab"));

        generator.add_token("B", "b");
        assert!(generator.build().is_ok());
        assert!(generator.accepts("ab"));
    }

    #[test]
    fn test_accepts_tokenizes_whole_input() {
        let mut generator = LexicalGenerator::new();
        generator.add_token("WORD", "(a|b)(a|b)*");
        assert!(generator.build().is_ok());

        assert!(generator.accepts("ab ba"));
        assert!(generator.accepts(" a \n b "));
        assert!(!generator.accepts("ab!"));
    }

    #[test]
    fn test_accepts_before_build_is_false() {
        let generator = LexicalGenerator::new();
        assert!(!generator.accepts("anything"));
    }

    #[test]
    fn test_empty_pattern_is_accepted_by_build() {
        let mut generator = LexicalGenerator::new();
        generator.add_token("EMPTY", "");
        assert!(generator.build().is_ok());
        // The empty token can never be emitted, so any symbol is an error.
        assert!(generator.accepts(""));
        assert!(!generator.accepts("x"));
    }
}
