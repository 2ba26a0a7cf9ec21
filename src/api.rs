//! # Public API
//!
//! One-call entry points for callers that hold a syntax configuration as YAML.
//!
//! ## Functions
//!
//! - [`compile_grammar()`] - Parse a configuration and assemble the grammar
//! - [`tokenize_track()`] - Assemble and tokenize one track body in a single step
//!
//! ## Typical Usage
//!
//! ```rust
//! use track_grammar::{compile_grammar, Token};
//!
//! let config = r#"
//! Dict:
//!   - { Name: Tempo, VoidQ: true }
//! Chord:
//!   - { Notation: M }
//! "#;
//!
//! let syntax = compile_grammar(config, &["1", "2", "3", "4", "5", "6", "7"])?;
//! let tokens = syntax.tokenize("Tempo(120) 1M 5 {2*3 4}", "default")?;
//! assert!(matches!(&tokens[0], Token::Function(f) if f.name == "Tempo"));
//! # Ok::<(), track_grammar::GrammarError>(())
//! ```
//!
//! Keep the [`TrackSyntax`] around when tokenizing many tracks with the same
//! configuration: assembly compiles every pattern once.

use crate::{GrammarError, Token, TrackSyntax, TrackSyntaxConfig};

/// Parse a YAML syntax configuration and assemble its grammar.
///
/// # Example
/// ```rust
/// use track_grammar::compile_grammar;
///
/// let syntax = compile_grammar("Dict: [{ Name: Vol }]", &["1", "2"])?;
/// assert_eq!(syntax.grammar().void_q("Vol"), Some(false));
/// # Ok::<(), track_grammar::GrammarError>(())
/// ```
///
/// # Errors
/// Returns [`GrammarError`] if the YAML is malformed or the grammar cannot be assembled.
pub fn compile_grammar(config_yaml: &str, degrees: &[&str]) -> Result<TrackSyntax, GrammarError> {
    let config = TrackSyntaxConfig::from_yaml(config_yaml)?;
    TrackSyntax::new(&config, degrees)
}

/// Tokenize a track body with a freshly assembled grammar, starting in `default`.
///
/// # Example
/// ```rust
/// use track_grammar::{tokenize_track, Token};
///
/// let tokens = tokenize_track("{}", &["1", "2"], "1^2")?;
/// assert_eq!(tokens.len(), 3);
/// assert_eq!(tokens[1], Token::Tie);
/// # Ok::<(), track_grammar::GrammarError>(())
/// ```
///
/// # Errors
/// Returns [`GrammarError`] if assembly fails or the text does not tokenize.
pub fn tokenize_track(config_yaml: &str, degrees: &[&str], text: &str) -> Result<Vec<Token>, GrammarError> {
    compile_grammar(config_yaml, degrees)?.tokenize(text, "default")
}
