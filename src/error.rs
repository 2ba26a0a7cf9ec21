//! # Error Types
//!
//! This module defines the error type for grammar assembly and tokenization.
//!
//! Assembly errors name the offending configuration item (symbol, function,
//! alias, pattern or state). Tokenization errors carry a 1-based line and
//! column so the track author can find the problem in the source.
//!
//! ## Error Types
//! - `ConfigError` - YAML configuration that failed to deserialize
//! - `InvalidSymbol`, `DuplicateFunction`, `UnknownFunction` - bad syntax configuration
//! - `UnknownArgumentType`, `InvalidAlias` - alias template defects
//! - `InvalidContext` - malformed library rules
//! - `InvalidPattern`, `UnknownState`, `IncludeCycle` - grammar composition defects
//! - `Unmatched`, `Stalled`, `TrailingInput`, `VoltaRange`, `TooDeep` - tokenization failures
//!
//! ## Usage
//! ```rust
//! use track_grammar::{GrammarError, TrackSyntax, TrackSyntaxConfig};
//!
//! let syntax = TrackSyntax::new(&TrackSyntaxConfig::default(), &["1", "2"])?;
//! match syntax.tokenize("1 2 ?", "default") {
//!     Ok(tokens) => println!("{} tokens", tokens.len()),
//!     Err(GrammarError::Unmatched { line, column, .. }) => {
//!         eprintln!("no rule matches at {}:{}", line, column);
//!     }
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! # Ok::<(), GrammarError>(())
//! ```

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GrammarError {
    /// Syntax configuration could not be read.
    ///
    /// # Example
    /// ```
    /// # use track_grammar::GrammarError;
    /// let err = GrammarError::ConfigError("missing field `Name`".to_string());
    /// assert_eq!(err.to_string(), "Invalid syntax configuration: missing field `Name`");
    /// ```
    #[error("Invalid syntax configuration: {0}")]
    ConfigError(String),

    /// A scale-degree or chord-quality symbol cannot be placed in a character class.
    #[error("Invalid {alphabet} symbol '{symbol}': symbols must be single characters other than [ ] \\ ^ - & ~ and whitespace")]
    InvalidSymbol { alphabet: String, symbol: String },

    /// The function dictionary names the same function twice.
    #[error("Function '{0}' is defined more than once")]
    DuplicateFunction(String),

    /// An alias targets a function missing from the dictionary.
    #[error("Unknown function '{0}'")]
    UnknownFunction(String),

    /// An alias placeholder names a type missing from the argument-pattern dictionary.
    #[error("Unknown argument type '{0}'")]
    UnknownArgumentType(String),

    /// An alias template is malformed.
    #[error("Invalid alias '{alias}': {message}")]
    InvalidAlias { alias: String, message: String },

    /// A composed pattern failed to compile.
    #[error("Invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// A library context rule is malformed.
    #[error("Invalid library rule in state '{state}': {message}")]
    InvalidContext { state: String, message: String },

    /// A rule includes or pushes a state that does not exist.
    #[error("Unknown state '{0}'")]
    UnknownState(String),

    /// The include graph loops back on itself.
    ///
    /// # Example
    /// ```
    /// # use track_grammar::GrammarError;
    /// let err = GrammarError::IncludeCycle(vec!["a".into(), "b".into(), "a".into()]);
    /// assert_eq!(err.to_string(), "Include cycle: a -> b -> a");
    /// ```
    #[error("Include cycle: {}", .0.join(" -> "))]
    IncludeCycle(Vec<String>),

    /// No rule of the active state matches at the cursor.
    ///
    /// # Example
    /// ```
    /// # use track_grammar::GrammarError;
    /// let err = GrammarError::Unmatched {
    ///     state: "default".to_string(),
    ///     line: 2,
    ///     column: 5,
    ///     found: '?',
    /// };
    /// assert_eq!(err.to_string(), "Tokenize error at line 2, column 5: unexpected '?' in state 'default'");
    /// ```
    #[error("Tokenize error at line {line}, column {column}: unexpected '{found}' in state '{state}'")]
    Unmatched {
        state: String,
        line: usize,
        column: usize,
        found: char,
    },

    /// A push rule matched without consuming anything, and neither did its nested state.
    #[error("Tokenize error at line {line}, column {column}: state '{state}' made no progress")]
    Stalled {
        state: String,
        line: usize,
        column: usize,
    },

    /// The start state was closed before the end of input.
    #[error("Tokenize error at line {line}, column {column}: input continues after the start state closed")]
    TrailingInput { line: usize, column: usize },

    /// A volta range `start~end` expands to more numbers than allowed.
    ///
    /// # Example
    /// ```
    /// # use track_grammar::GrammarError;
    /// let err = GrammarError::VoltaRange { start: 1, end: 5000 };
    /// assert_eq!(err.to_string(), "Volta range 1~5000 is too long");
    /// ```
    #[error("Volta range {start}~{end} is too long")]
    VoltaRange { start: u32, end: u32 },

    /// Pushed states nest deeper than the engine allows.
    #[error("Tokenize error at line {line}, column {column}: '{state}' nested too deeply")]
    TooDeep {
        state: String,
        line: usize,
        column: usize,
    },
}
