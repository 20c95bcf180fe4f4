use bitvec::prelude::BitVec;
use std::collections::HashSet;

/// A transition label: either the epsilon marker or a literal character.
/// Epsilon never appears in scanned input; it only labels NFA transitions.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum Symbol {
    Epsilon,
    Char(char),
}

/// Token metadata attached to an accepting state once per-token automata
/// have been merged. Priority is the 0-based insertion index of the token
/// spec; lower wins ties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenLabel {
    category: String,
    priority: usize,
}

impl TokenLabel {
    pub fn new(category: String, priority: usize) -> Self {
        TokenLabel { category, priority }
    }

    pub fn get_category(&self) -> &str {
        &self.category
    }

    pub fn get_priority(&self) -> usize {
        self.priority
    }
}

/// Read-only view of a finite automaton, shared by the NFA and the DFA so
/// the display and code-emission collaborators can walk either one.
pub trait FA {
    fn get_num_states(&self) -> usize;
    fn get_start_state(&self) -> usize;
    fn get_alphabet(&self) -> &HashSet<char>;
    fn get_acceptor_states(&self) -> &BitVec<u8>;
    fn get_state_transitions(&self, state_id: usize) -> Vec<(Symbol, usize)>;
    fn get_label(&self, state_id: usize) -> Option<&TokenLabel>;
}
