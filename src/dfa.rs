/* Subset construction: determinize a (possibly merged) NFA into a DFA whose
 * accepting states carry the winning token label. Subsets are represented as
 * fixed-width bit vectors over the NFA's state ids, which makes them directly
 * usable as hash-map keys for the subset-to-id mapping. */

use bitvec::prelude::*;
use std::collections::{HashMap, HashSet, VecDeque};

use crate::fa::{Symbol, TokenLabel, FA};
use crate::nfa::NFA;

#[derive(Debug)]
pub struct DFA {
    states: Vec<DFAState>,
    start_state: usize,
    accept_states: BitVec<u8>,
    labels: HashMap<usize, TokenLabel>,
    alphabet: HashSet<char>,
}

#[derive(Debug, Clone)]
struct DFAState {
    transitions: HashMap<Symbol, usize>,
}

impl DFAState {
    fn new() -> Self {
        DFAState {
            transitions: HashMap::new(),
        }
    }

    fn add_transition(&mut self, symbol: Symbol, to: usize) {
        self.transitions.insert(symbol, to);
    }

    fn get_transitions(&self) -> &HashMap<Symbol, usize> {
        &self.transitions
    }
}

impl FA for DFA {
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
        self.get_state(state_id)
            .get_transitions()
            .iter()
            .map(|(symbol, target)| (*symbol, *target))
            .collect()
    }

    fn get_label(&self, state_id: usize) -> Option<&TokenLabel> {
        self.labels.get(&state_id)
    }
}

impl DFA {
    fn new() -> Self {
        DFA {
            states: Vec::new(),
            start_state: 0,
            accept_states: BitVec::new(),
            labels: HashMap::new(),
            alphabet: HashSet::new(),
        }
    }

    fn add_state(&mut self) -> usize {
        let state_id = self.states.len();
        self.states.push(DFAState::new());
        self.accept_states.push(false);
        state_id
    }

    fn add_transition(&mut self, from: usize, symbol: Symbol, to: usize) {
        self.states[from].add_transition(symbol, to);
    }

    fn get_state(&self, id: usize) -> &DFAState {
        match self.states.get(id) {
            Some(state) => state,
            None => panic!("Invalid state index provided"),
        }
    }

    pub fn start(&self) -> usize {
        self.start_state
    }

    /// Follows the transition out of `state` on `symbol`. `None` is the
    /// implicit dead state.
    pub fn step(&self, state: usize, symbol: char) -> Option<usize> {
        self.get_state(state)
            .get_transitions()
            .get(&Symbol::Char(symbol))
            .copied()
    }

    pub fn is_accepting(&self, state: usize) -> bool {
        self.accept_states[state]
    }

    /// The winning token label for an accepting state.
    pub fn label(&self, state: usize) -> Option<&TokenLabel> {
        self.labels.get(&state)
    }

    pub fn get_labels(&self) -> &HashMap<usize, TokenLabel> {
        &self.labels
    }

    /// Whole-input acceptance: true iff consuming every symbol of `input`
    /// leaves the automaton in an accepting state.
    pub fn accepts(&self, input: &str) -> bool {
        let mut state = self.start_state;
        for ch in input.chars() {
            state = match self.step(state, ch) {
                Some(next) => next,
                None => return false,
            };
        }
        self.is_accepting(state)
    }
}

// Smallest superset of `seed` closed under ε-transitions, computed with a
// worklist over the not-yet-expanded members.
fn epsilon_closure(nfa: &NFA, seed: &BitVec<u8>) -> BitVec<u8> {
    let mut closure = seed.clone();
    let mut work_list: VecDeque<usize> = seed.iter_ones().collect();

    while let Some(state_id) = work_list.pop_front() {
        let state = nfa.get_state(state_id);
        if let Some(targets) = state.get_transitions().get(&Symbol::Epsilon) {
            for &target in targets {
                if !closure[target] {
                    closure.set(target, true);
                    work_list.push_back(target);
                }
            }
        }
    }
    closure
}

// States reachable from some member of `subset` via one transition on `ch`.
fn move_set(nfa: &NFA, subset: &BitVec<u8>, ch: char) -> BitVec<u8> {
    let mut result: BitVec<u8> = BitVec::repeat(false, subset.len());

    for state_id in subset.iter_ones() {
        let state = nfa.get_state(state_id);
        if let Some(targets) = state.get_transitions().get(&Symbol::Char(ch)) {
            for &target in targets {
                result.set(target, true);
            }
        }
    }
    result
}

fn subset_accepts(nfa_accepts: &BitVec<u8>, subset: &BitVec<u8>) -> bool {
    subset.iter_ones().any(|state| nfa_accepts[state])
}

// The label of a freshly minted DFA state is the label of the accepting NFA
// state in its subset with the lowest priority. Priorities are unique per
// token spec, so there is never a tie to break beyond this.
fn resolve_label(nfa: &NFA, subset: &BitVec<u8>) -> Option<TokenLabel> {
    let mut winner: Option<&TokenLabel> = None;

    for state_id in subset.iter_ones() {
        if let Some(label) = nfa.get_label(state_id) {
            let improves = match winner {
                Some(current) => label.get_priority() < current.get_priority(),
                None => true,
            };
            if improves {
                winner = Some(label);
            }
        }
    }
    winner.cloned()
}

/// Determinizes `nfa` by the subset construction.
///
/// The alphabet is taken from the NFA's non-ε transition symbols and scanned
/// in sorted order, so repeated runs over the same NFA number their states
/// identically. An empty move target is skipped entirely; missing entries in
/// the transition map are the implicit dead state.
pub fn construct_dfa(nfa: &NFA) -> DFA {
    let mut result = DFA::new();
    result.alphabet = nfa.get_alphabet().clone();

    let nfa_accepts = nfa.get_acceptor_states();

    let mut alphabet: Vec<char> = result.alphabet.iter().copied().collect();
    alphabet.sort_unstable();

    let mut seed: BitVec<u8> = BitVec::repeat(false, nfa.get_num_states());
    seed.set(nfa.get_start_state(), true);
    let start_subset = epsilon_closure(nfa, &seed);

    let start_id = result.add_state();
    result.start_state = start_id;

    let mut subset_ids: HashMap<BitVec<u8>, usize> = HashMap::new();
    let mut work_list: VecDeque<(BitVec<u8>, usize)> = VecDeque::new();

    subset_ids.insert(start_subset.clone(), start_id);
    if subset_accepts(nfa_accepts, &start_subset) {
        result.accept_states.set(start_id, true);
        if let Some(label) = resolve_label(nfa, &start_subset) {
            result.labels.insert(start_id, label);
        }
    }
    work_list.push_back((start_subset, start_id));

    while let Some((subset, from_id)) = work_list.pop_front() {
        for &ch in &alphabet {
            let moved = move_set(nfa, &subset, ch);
            if moved.not_any() {
                continue;
            }
            let target = epsilon_closure(nfa, &moved);

            let target_id = match subset_ids.get(&target) {
                Some(&id) => id,
                None => {
                    let id = result.add_state();
                    subset_ids.insert(target.clone(), id);
                    if subset_accepts(nfa_accepts, &target) {
                        result.accept_states.set(id, true);
                        if let Some(label) = resolve_label(nfa, &target) {
                            result.labels.insert(id, label);
                        }
                    }
                    work_list.push_back((target, id));
                    id
                }
            };
            result.add_transition(from_id, Symbol::Char(ch), target_id);
        }
    }
    result
}
