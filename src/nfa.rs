use bitvec::prelude::*;
use std::collections::{HashMap, HashSet};

use crate::fa::{Symbol, TokenLabel, FA};
use crate::regex::PostfixToken;

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct NFAState {
    id: usize,
    transitions: HashMap<Symbol, HashSet<usize>>,
}

#[derive(Debug)]
pub struct NFA {
    states: Vec<NFAState>,
    start_state: usize,
    accept_states: BitVec<u8>,
    labels: HashMap<usize, TokenLabel>,
    alphabet: HashSet<char>,
}

/// Raised when the postfix stream does not evaluate to exactly one fragment.
/// The generator reports it to the caller as a malformed regex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThompsonError {
    /// An operator popped an empty fragment stack.
    MissingOperand,
    /// More than one fragment was left after the stream was consumed.
    DanglingFragments,
}

impl std::fmt::Display for ThompsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ThompsonError::MissingOperand => {
                write!(f, "Error: operator is short of operands in postfix stream")
            }
            ThompsonError::DanglingFragments => {
                write!(f, "Error: postfix stream left more than one fragment")
            }
        }
    }
}

impl std::error::Error for ThompsonError {}

impl NFAState {
    fn new(id: usize) -> Self {
        NFAState {
            id,
            transitions: HashMap::new(),
        }
    }

    fn add_transition(&mut self, symbol: Symbol, to: usize) {
        self.transitions.entry(symbol).or_default().insert(to);
    }

    pub fn get_transitions(&self) -> &HashMap<Symbol, HashSet<usize>> {
        &self.transitions
    }

    pub fn get_id(&self) -> usize {
        self.id
    }
}

impl FA for NFA {
    fn get_num_states(&self) -> usize {
        self.states.len()
    }

    fn get_start_state(&self) -> usize {
        self.start_state
    }

    fn get_alphabet(&self) -> &HashSet<char> {
        &self.alphabet
    }

    fn get_acceptor_states(&self) -> &BitVec<u8> {
        &self.accept_states
    }

    fn get_state_transitions(&self, state_id: usize) -> Vec<(Symbol, usize)> {
        let mut transitions = Vec::new();
        for (symbol, targets) in self.get_state(state_id).get_transitions() {
            for target in targets {
                transitions.push((*symbol, *target));
            }
        }
        transitions
    }

    fn get_label(&self, state_id: usize) -> Option<&TokenLabel> {
        self.labels.get(&state_id)
    }
}

impl NFA {
    fn new() -> Self {
        NFA {
            states: Vec::new(),
            start_state: 0,
            accept_states: BitVec::new(),
            labels: HashMap::new(),
            alphabet: HashSet::new(),
        }
    }

    fn add_state(&mut self) -> usize {
        let state_id = self.states.len();
        self.states.push(NFAState::new(state_id));
        self.accept_states.push(false);
        state_id
    }

    fn add_transition(&mut self, from: usize, symbol: Symbol, to: usize) {
        self.states[from].add_transition(symbol, to);
    }

    fn set_accept_state(&mut self, state_id: usize) {
        self.accept_states.set(state_id, true);
    }

    pub fn get_state(&self, id: usize) -> &NFAState {
        match self.states.get(id) {
            Some(state) => state,
            None => panic!("Invalid state index provided"),
        }
    }

    // Copies every state of `other` into `self`, shifting state ids by the
    // current state count. Returns the shift that was applied. Accepting
    // membership is NOT carried over; callers decide what stays accepting.
    fn absorb(&mut self, other: NFA) -> usize {
        let offset = self.states.len();

        for mut state in other.states {
            state.id += offset;
            let mut shifted = HashMap::new();
            for (symbol, targets) in state.transitions {
                let targets: HashSet<usize> = targets.into_iter().map(|t| t + offset).collect();
                shifted.insert(symbol, targets);
            }
            state.transitions = shifted;
            self.states.push(state);
            self.accept_states.push(false);
        }
        self.alphabet.extend(other.alphabet.iter().copied());
        offset
    }

    // Two states, one transition on `character`.
    fn literal(character: char) -> NFA {
        let mut result = NFA::new();
        let start_state = result.add_state();
        let end_state = result.add_state();
        result.alphabet.insert(character);
        result.add_transition(start_state, Symbol::Char(character), end_state);
        result.start_state = start_state;
        result.set_accept_state(end_state);
        result
    }

    // Fragment accepting only the empty string, for empty patterns.
    fn empty() -> NFA {
        let mut result = NFA::new();
        let start_state = result.add_state();
        let end_state = result.add_state();
        result.add_transition(start_state, Symbol::Epsilon, end_state);
        result.start_state = start_state;
        result.set_accept_state(end_state);
        result
    }

    fn concatenate(nfa1: NFA, nfa2: NFA) -> NFA {
        let mut result = nfa1;
        let left_accepts: Vec<usize> = result.accept_states.iter_ones().collect();

        let right_start = nfa2.start_state;
        let right_accepts: Vec<usize> = nfa2.accept_states.iter_ones().collect();
        let offset = result.absorb(nfa2);

        // The left accepting states hand over to the right fragment and
        // cease to be accepting themselves.
        for accept in left_accepts {
            result.add_transition(accept, Symbol::Epsilon, right_start + offset);
            result.accept_states.set(accept, false);
        }
        for accept in right_accepts {
            result.set_accept_state(accept + offset);
        }
        result
    }

    fn alternation(nfa1: NFA, nfa2: NFA) -> NFA {
        let mut result = NFA::new();
        let new_start = result.add_state();

        let start1 = nfa1.start_state;
        let accepts1: Vec<usize> = nfa1.accept_states.iter_ones().collect();
        let offset1 = result.absorb(nfa1);
        result.add_transition(new_start, Symbol::Epsilon, start1 + offset1);

        let start2 = nfa2.start_state;
        let accepts2: Vec<usize> = nfa2.accept_states.iter_ones().collect();
        let offset2 = result.absorb(nfa2);
        result.add_transition(new_start, Symbol::Epsilon, start2 + offset2);

        let new_accept = result.add_state();
        for accept in accepts1 {
            result.add_transition(accept + offset1, Symbol::Epsilon, new_accept);
        }
        for accept in accepts2 {
            result.add_transition(accept + offset2, Symbol::Epsilon, new_accept);
        }

        result.start_state = new_start;
        result.set_accept_state(new_accept);
        result
    }

    fn closure(nfa: NFA) -> NFA {
        let mut result = NFA::new();
        let new_start = result.add_state();

        let old_start = nfa.start_state;
        let old_accepts: Vec<usize> = nfa.accept_states.iter_ones().collect();
        let offset = result.absorb(nfa);

        result.add_transition(new_start, Symbol::Epsilon, old_start + offset);

        let new_accept = result.add_state();
        // Zero repetitions: skip the body entirely.
        result.add_transition(new_start, Symbol::Epsilon, new_accept);

        for accept in old_accepts {
            // Loop back for another repetition, or leave.
            result.add_transition(accept + offset, Symbol::Epsilon, old_start + offset);
            result.add_transition(accept + offset, Symbol::Epsilon, new_accept);
        }

        result.start_state = new_start;
        result.set_accept_state(new_accept);
        result
    }
}

/// Evaluates a postfix stream into a single NFA by Thompson construction.
///
/// Operands push a two-state fragment; `*`, `|` and the concatenation
/// operator pop one or two fragments and push the combined result. An empty
/// stream builds the fragment accepting only the empty string.
pub fn construct_nfa(postfix: &[PostfixToken]) -> Result<NFA, ThompsonError> {
    if postfix.is_empty() {
        return Ok(NFA::empty());
    }

    let mut stack: Vec<NFA> = Vec::new();

    for token in postfix {
        match token {
            PostfixToken::Literal(ch) => stack.push(NFA::literal(*ch)),
            PostfixToken::Star => {
                let inner = stack.pop().ok_or(ThompsonError::MissingOperand)?;
                stack.push(NFA::closure(inner));
            }
            PostfixToken::Union => {
                let right = stack.pop().ok_or(ThompsonError::MissingOperand)?;
                let left = stack.pop().ok_or(ThompsonError::MissingOperand)?;
                stack.push(NFA::alternation(left, right));
            }
            PostfixToken::Concat => {
                let right = stack.pop().ok_or(ThompsonError::MissingOperand)?;
                let left = stack.pop().ok_or(ThompsonError::MissingOperand)?;
                stack.push(NFA::concatenate(left, right));
            }
        }
    }

    match (stack.pop(), stack.is_empty()) {
        (Some(nfa), true) => Ok(nfa),
        _ => Err(ThompsonError::DanglingFragments),
    }
}

/// Merges per-token NFAs under one fresh start state.
///
/// Each operand keeps its own accepting states, labeled with the token's
/// category and its position in `token_nfas` as the priority. Accepting
/// states are never merged; determinization needs to see which token each
/// one belongs to.
pub fn merge_nfas(token_nfas: Vec<(String, NFA)>) -> NFA {
    let mut result = NFA::new();
    let root = result.add_state();
    result.start_state = root;

    for (priority, (category, nfa)) in token_nfas.into_iter().enumerate() {
        let start = nfa.start_state;
        let accepts: Vec<usize> = nfa.accept_states.iter_ones().collect();
        let offset = result.absorb(nfa);

        result.add_transition(root, Symbol::Epsilon, start + offset);
        for accept in accepts {
            result.set_accept_state(accept + offset);
            result
                .labels
                .insert(accept + offset, TokenLabel::new(category.clone(), priority));
        }
    }
    result
}
