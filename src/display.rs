use petgraph::dot::Dot;
use petgraph::graph::DiGraph;
use std::collections::HashMap;
use std::fs::File;
use std::io::Write;

use crate::fa::{Symbol, FA};
use crate::generator::GeneratorError;

/// Renders any finite automaton as Graphviz dot text. The start state and
/// accepting states are called out in the node labels, along with the token
/// category where one is attached.
pub fn render_dot<T: FA>(fa: &T) -> String {
    let mut graph = DiGraph::new();
    let mut node_map = HashMap::new();

    for state_id in 0..fa.get_num_states() {
        let mut label = format!("State {}", state_id);
        if state_id == fa.get_start_state() {
            label = format!("Start\n{}", label);
        }
        if fa.get_acceptor_states()[state_id] {
            label = match fa.get_label(state_id) {
                Some(token_label) => {
                    format!("{}\nAccept ({})", label, token_label.get_category())
                }
                None => format!("{}\nAccept", label),
            };
        }
        let node = graph.add_node(label);
        node_map.insert(state_id, node);
    }

    for state_id in 0..fa.get_num_states() {
        for (symbol, target) in fa.get_state_transitions(state_id) {
            let symbol_str = match symbol {
                Symbol::Char(ch) => ch.to_string(),
                Symbol::Epsilon => "𝛆".to_string(),
            };
            graph.add_edge(node_map[&state_id], node_map[&target], symbol_str);
        }
    }

    Dot::new(&graph).to_string()
}

/// Writes the dot rendering of `fa` to `filename`.
pub fn write_dot<T: FA>(fa: &T, filename: &str) -> Result<(), GeneratorError> {
    let dot = render_dot(fa);

    let mut dot_file = match File::create(filename) {
        Ok(file) => file,
        Err(error) => {
            let err_line = format!("Error: Failed to create the dot file {}", error);
            return Err(GeneratorError::FileWriteError(err_line));
        }
    };
    if let Err(error) = dot_file.write_all(dot.as_bytes()) {
        let err_line = format!("Error: Failed to write the dot file {}", error);
        return Err(GeneratorError::FileWriteError(err_line));
    }
    Ok(())
}

#[cfg(test)]
mod display_tests {
    use super::render_dot;
    use crate::dfa::construct_dfa;
    use crate::nfa::{construct_nfa, merge_nfas};
    use crate::regex::to_postfix;

    #[test]
    fn test_nfa_rendering_marks_states() {
        let nfa = construct_nfa(&to_postfix("a|b")).unwrap();
        let dot = render_dot(&nfa);

        assert!(dot.contains("Start"));
        assert!(dot.contains("Accept"));
        assert!(dot.contains("𝛆"));
    }

    #[test]
    fn test_dfa_rendering_shows_categories() {
        let nfa = construct_nfa(&to_postfix("ab")).unwrap();
        let combined = merge_nfas(vec![("WORD".to_string(), nfa)]);
        let dfa = construct_dfa(&combined);
        let dot = render_dot(&dfa);

        assert!(dot.contains("Accept (WORD)"));
        assert!(!dot.contains("𝛆"));
    }
}
