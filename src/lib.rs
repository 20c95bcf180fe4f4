//! # lexforge
//!
//! A lexical-analyzer generator: given named token patterns written as
//! regular expressions, it compiles them into a single deterministic finite
//! automaton that tokenizes input with longest-match semantics, breaking
//! ties in favor of the earliest-declared token.
//!
//! This library provides functionality to:
//! - Validate regular expressions and translate them to postfix form
//! - Convert postfix streams to NFAs using Thompson Construction
//! - Merge per-token NFAs while keeping their accepting states labeled
//! - Convert NFAs to DFAs using Subset Construction
//! - Scan and tokenize input with maximal munch and error recovery
//! - Emit a standalone Rust scanner driven by the compiled DFA
//! - Render the automata as Graphviz dot text

// Re-export the modules
pub mod dfa;
pub mod display;
pub mod emitter;
pub mod fa;
pub mod generator;
pub mod nfa;
pub mod presets;
pub mod regex;
pub mod scanner;

// Re-export commonly used items for convenience
pub use dfa::construct_dfa;
pub use display::{render_dot, write_dot};
pub use emitter::{emit_scanner, write_scanner};
pub use generator::{read_microsyntax_file, GeneratorError, LexicalGenerator, TokenSpec};
pub use nfa::{construct_nfa, merge_nfas};
pub use presets::c_like_patterns;
pub use regex::{to_postfix, validate};
pub use scanner::{construct_scanner, LexicalError, Scanner, Token};
