/* Maximal-munch table scanner. The DFA's transition function is flattened
 * into a table whose columns are compressed by grouping input characters
 * that behave identically, then the scan loop repeatedly takes the longest
 * accepting prefix, skips stray whitespace, and reports anything else as a
 * lexical error without giving up on the rest of the input. */

use std::collections::HashMap;
use std::hash::{DefaultHasher, Hash, Hasher};

use crate::dfa::DFA;
use crate::fa::{Symbol, TokenLabel, FA};

/// A recognized lexeme with its syntactic category and the 1-based line and
/// column of its first character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    category: String,
    lexeme: String,
    line: usize,
    column: usize,
}

impl Token {
    pub fn get_token(&self) -> &str {
        &self.lexeme
    }

    pub fn get_category(&self) -> &str {
        &self.category
    }

    pub fn get_line(&self) -> usize {
        self.line
    }

    pub fn get_column(&self) -> usize {
        self.column
    }
}

/// A byte no token pattern could start from. The scanner reports it and
/// resumes one position later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexicalError {
    line: usize,
    column: usize,
    symbol: char,
}

impl LexicalError {
    pub fn get_line(&self) -> usize {
        self.line
    }

    pub fn get_column(&self) -> usize {
        self.column
    }

    pub fn get_symbol(&self) -> char {
        self.symbol
    }
}

impl std::fmt::Display for LexicalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Lexical error at line {}, column {}: unexpected character {:?}",
            self.line, self.column, self.symbol
        )
    }
}

impl std::error::Error for LexicalError {}

pub struct Scanner {
    transition_table: Vec<Vec<usize>>, // state x character class -> state
    classifier_table: HashMap<Option<char>, usize>, // alphabet (None = any other) -> class
    token_type_table: HashMap<usize, TokenLabel>, // accepting state -> winning label
    start_state: usize,
    dead_state: usize,
}

impl Scanner {
    fn new(dfa: &DFA) -> Self {
        let mut scanner = Scanner {
            transition_table: vec![],
            classifier_table: HashMap::new(),
            token_type_table: HashMap::new(),
            start_state: dfa.get_start_state(),
            dead_state: dfa.get_num_states(),
        };
        scanner.init_transition_table(dfa);
        scanner.init_token_type_table(dfa);
        scanner
    }

    // Build the dense state x character table first: one row per DFA state
    // plus a dead row, one column per alphabet character plus an "any other
    // character" column, every entry defaulting to the dead state.
    fn init_transition_table(&mut self, dfa: &DFA) {
        let mut alphabet: Vec<char> = dfa.get_alphabet().iter().copied().collect();
        alphabet.sort_unstable();

        let num_states = dfa.get_num_states();
        let num_chars = alphabet.len();

        let mut init_table: Vec<Vec<usize>> = vec![vec![self.dead_state; num_chars + 1]; num_states + 1];

        for state in 0..num_states {
            for (symbol, target) in dfa.get_state_transitions(state) {
                let ch = match symbol {
                    Symbol::Char(ch) => ch,
                    Symbol::Epsilon => panic!("Epsilon transition found in a DFA"),
                };
                let char_index = match alphabet.binary_search(&ch) {
                    Ok(index) => index,
                    Err(_) => panic!("Character {:?} not found in alphabet", ch),
                };
                init_table[state][char_index] = target;
            }
        }

        self.compress_init_table(&init_table, &alphabet);
    }

    // Hash each column of the dense table; columns with identical contents
    // share a class id, and the classifier maps each character (or None for
    // everything outside the alphabet) to its class. The compressed table is
    // then indexed by state and class instead of state and character.
    fn compress_init_table(&mut self, init_table: &[Vec<usize>], alphabet: &[char]) {
        let num_rows = init_table.len();
        let num_cols = alphabet.len() + 1;

        let mut hash_to_class: HashMap<u64, usize> = HashMap::new();

        for col_id in 0..num_cols {
            let mut hasher = DefaultHasher::new();
            for row in init_table.iter() {
                row[col_id].hash(&mut hasher);
            }
            let hash = hasher.finish();

            let next_class = hash_to_class.len();
            let class_id = *hash_to_class.entry(hash).or_insert(next_class);
            let char_input = alphabet.get(col_id).copied();
            self.classifier_table.insert(char_input, class_id);
        }

        let num_classes = hash_to_class.len();
        self.transition_table = vec![vec![self.dead_state; num_classes]; num_rows];

        for (row_id, row) in init_table.iter().enumerate() {
            for col_id in 0..num_cols {
                let char_input = alphabet.get(col_id).copied();
                let class_id = match self.classifier_table.get(&char_input) {
                    Some(class_id) => *class_id,
                    None => panic!("Classifier missing a column it was built from"),
                };
                self.transition_table[row_id][class_id] = row[col_id];
            }
        }
    }

    fn init_token_type_table(&mut self, dfa: &DFA) {
        for (state, label) in dfa.get_labels() {
            self.token_type_table.insert(*state, label.clone());
        }
    }

    fn step(&self, state: usize, ch: char) -> usize {
        let class_id = match self.classifier_table.get(&Some(ch)) {
            Some(&class_id) => class_id,
            None => match self.classifier_table.get(&None) {
                Some(&class_id) => class_id,
                None => return self.dead_state,
            },
        };
        self.transition_table[state][class_id]
    }

    /// Tokenizes `input` with longest-match semantics.
    ///
    /// From each position the automaton runs until it dies, remembering the
    /// last accepting point; the token ending there is emitted and scanning
    /// restarts after it. A position where nothing matched is either skipped
    /// (space, tab, newline) or reported as a [`LexicalError`], and the
    /// scanner moves on by one character either way. Acceptance is only
    /// recorded after at least one character is consumed, so patterns that
    /// match the empty string never emit empty tokens.
    pub fn scan(&self, input: &str) -> (Vec<Token>, Vec<LexicalError>) {
        let chars: Vec<char> = input.chars().collect();
        let mut tokens = Vec::new();
        let mut errors = Vec::new();

        let mut pos = 0;
        let mut line = 1;
        let mut column = 1;

        while pos < chars.len() {
            let mut state = self.start_state;
            let mut cursor = pos;
            let mut last_accept: Option<(usize, &TokenLabel)> = None;

            while cursor < chars.len() {
                let next = self.step(state, chars[cursor]);
                if next == self.dead_state {
                    break;
                }
                state = next;
                cursor += 1;
                if let Some(label) = self.token_type_table.get(&state) {
                    last_accept = Some((cursor, label));
                }
            }

            match last_accept {
                Some((end, label)) => {
                    let lexeme: String = chars[pos..end].iter().collect();
                    tokens.push(Token {
                        category: label.get_category().to_string(),
                        lexeme,
                        line,
                        column,
                    });
                    for &ch in &chars[pos..end] {
                        advance_position(&mut line, &mut column, ch);
                    }
                    pos = end;
                }
                None => {
                    let ch = chars[pos];
                    if !matches!(ch, ' ' | '\t' | '\n') {
                        errors.push(LexicalError {
                            line,
                            column,
                            symbol: ch,
                        });
                    }
                    advance_position(&mut line, &mut column, ch);
                    pos += 1;
                }
            }
        }
        (tokens, errors)
    }
}

fn advance_position(line: &mut usize, column: &mut usize, ch: char) {
    if ch == '\n' {
        *line += 1;
        *column = 1;
    } else {
        *column += 1;
    }
}

/// Builds the table-driven scanner for a compiled DFA.
pub fn construct_scanner(dfa: &DFA) -> Scanner {
    Scanner::new(dfa)
}

#[cfg(test)]
mod scanner_tests {
    use super::{construct_scanner, Scanner};
    use crate::dfa::construct_dfa;
    use crate::nfa::{construct_nfa, merge_nfas};
    use crate::regex::to_postfix;

    fn build_scanner(specs: &[(&str, &str)]) -> Scanner {
        let token_nfas = specs
            .iter()
            .map(|(category, pattern)| {
                let nfa = construct_nfa(&to_postfix(pattern)).unwrap();
                (category.to_string(), nfa)
            })
            .collect();
        let combined = merge_nfas(token_nfas);
        let dfa = construct_dfa(&combined);
        construct_scanner(&dfa)
    }

    fn digit_pattern() -> String {
        "(0|1|2|3|4|5|6|7|8|9)(0|1|2|3|4|5|6|7|8|9)*".to_string()
    }

    #[test]
    fn test_single_token() {
        let scanner = build_scanner(&[("NUM", &digit_pattern())]);
        let (tokens, errors) = scanner.scan("123");

        assert!(errors.is_empty());
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].get_token(), "123");
        assert_eq!(tokens[0].get_category(), "NUM");
        assert_eq!(tokens[0].get_line(), 1);
        assert_eq!(tokens[0].get_column(), 1);
    }

    #[test]
    fn test_whitespace_between_tokens_is_skipped() {
        let scanner = build_scanner(&[("NUM", &digit_pattern())]);
        let (tokens, errors) = scanner.scan("12 3");

        assert!(errors.is_empty());
        let lexemes: Vec<&str> = tokens.iter().map(|t| t.get_token()).collect();
        assert_eq!(lexemes, vec!["12", "3"]);
        assert_eq!(tokens[1].get_column(), 4);
    }

    #[test]
    fn test_maximal_munch_prefers_longer_match() {
        let scanner = build_scanner(&[("LT", "<"), ("LE", "<=")]);
        let (tokens, errors) = scanner.scan("<= <");

        assert!(errors.is_empty());
        let pairs: Vec<(&str, &str)> = tokens
            .iter()
            .map(|t| (t.get_category(), t.get_token()))
            .collect();
        assert_eq!(pairs, vec![("LE", "<="), ("LT", "<")]);
    }

    #[test]
    fn test_priority_breaks_equal_length_tie() {
        let scanner = build_scanner(&[("T1", "ab"), ("T2", "ab")]);
        let (tokens, _) = scanner.scan("ab");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].get_category(), "T1");
    }

    #[test]
    fn test_error_recovery_continues_past_bad_byte() {
        let scanner = build_scanner(&[("A", "a")]);
        let (tokens, errors) = scanner.scan("a!a");

        assert_eq!(tokens.len(), 2);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].get_symbol(), '!');
        assert_eq!(errors[0].get_column(), 2);
    }

    #[test]
    fn test_empty_match_is_never_emitted() {
        let scanner = build_scanner(&[("A", "a*")]);

        let (tokens, errors) = scanner.scan("b");
        assert!(tokens.is_empty());
        assert_eq!(errors.len(), 1);

        let (tokens, errors) = scanner.scan("aaab");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].get_token(), "aaa");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].get_symbol(), 'b');
        assert_eq!(errors[0].get_column(), 4);
    }

    #[test]
    fn test_line_and_column_tracking() {
        let scanner = build_scanner(&[("A", "a"), ("B", "bb")]);
        let (tokens, errors) = scanner.scan("a\nbb\n a");

        assert!(errors.is_empty());
        assert_eq!(tokens.len(), 3);
        assert_eq!((tokens[0].get_line(), tokens[0].get_column()), (1, 1));
        assert_eq!((tokens[1].get_line(), tokens[1].get_column()), (2, 1));
        assert_eq!((tokens[2].get_line(), tokens[2].get_column()), (3, 2));
    }

    #[test]
    fn test_error_positions_track_lines() {
        let scanner = build_scanner(&[("A", "a")]);
        let (_, errors) = scanner.scan("a\n!");

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].get_line(), 2);
        assert_eq!(errors[0].get_column(), 1);
    }

    #[test]
    fn test_whitespace_inside_pattern_is_matched() {
        // A space is an ordinary symbol when a pattern asks for one.
        let scanner = build_scanner(&[("PAIR", "a b")]);
        let (tokens, errors) = scanner.scan("a b");

        assert!(errors.is_empty());
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].get_token(), "a b");
    }

    #[test]
    fn test_classifier_groups_equivalent_columns() {
        let scanner = build_scanner(&[("NUM", &digit_pattern())]);

        // Every digit drives the automaton identically, so all ten columns
        // collapse into a single class.
        let zero_class = scanner.classifier_table.get(&Some('0')).copied();
        let nine_class = scanner.classifier_table.get(&Some('9')).copied();
        assert!(zero_class.is_some());
        assert_eq!(zero_class, nine_class);

        let other_class = scanner.classifier_table.get(&None).copied();
        assert_ne!(zero_class, other_class);
    }

    #[test]
    fn test_out_of_alphabet_symbol_dies_immediately() {
        let scanner = build_scanner(&[("A", "a")]);
        assert_eq!(scanner.step(scanner.start_state, 'z'), scanner.dead_state);
    }
}
