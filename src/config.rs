//! # Syntax Configuration
//!
//! Plain-data description of a track syntax: the function dictionary, the chord
//! notations, alias definitions and library contexts. Scale degrees are not part
//! of this file; they are passed to [`TrackSyntax::new`](crate::TrackSyntax::new)
//! alongside it.
//!
//! ## Example
//! ```rust
//! use track_grammar::TrackSyntaxConfig;
//!
//! let config = TrackSyntaxConfig::from_yaml(r#"
//! Dict:
//!   - { Name: Vol, VoidQ: true }
//! Chord:
//!   - { Notation: M }
//! Alias:
//!   - { Name: Vol, Syntax: "${1:uns}%" }
//! "#)?;
//! assert_eq!(config.dict[0].name, "Vol");
//! assert!(config.dict[0].void_q);
//! assert_eq!(config.chord_notations(), vec!["M"]);
//! # Ok::<(), track_grammar::GrammarError>(())
//! ```

use serde::Deserialize;

use crate::error::GrammarError;

/// Complete configuration of one track syntax
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "PascalCase", default)]
pub struct TrackSyntaxConfig {
    pub dict: Vec<FunctionDef>,
    pub chord: Vec<ChordDef>,
    pub alias: Vec<AliasDef>,
    pub context: Vec<ContextDef>,
}

/// A callable function
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct FunctionDef {
    pub name: String,
    #[serde(rename = "VoidQ", default)]
    pub void_q: bool,
}

/// A chord-quality notation; only its symbol matters to the grammar
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct ChordDef {
    pub notation: String,
    #[serde(default)]
    pub comment: Option<String>,
}

/// An alias: an alternative surface syntax for a dictionary function.
///
/// `syntax` mixes literal text with `${n:type}` placeholders, where `n` is the
/// 1-based argument position and `type` a key of the argument-pattern dictionary.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct AliasDef {
    pub name: String,
    pub syntax: String,
}

/// Rules a library adds to a named state
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct ContextDef {
    pub state: String,
    #[serde(default)]
    pub prepend: bool,
    #[serde(default)]
    pub rules: Vec<ContextRule>,
}

/// One library rule.
///
/// Exactly one shape applies: `include` splices a state; `pattern` with `pop`
/// closes the state; `pattern` with `token` yields a custom item; a bare
/// `pattern` is a separator.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "PascalCase", default)]
pub struct ContextRule {
    pub include: Option<String>,
    pub pattern: Option<String>,
    pub token: Option<String>,
    pub pop: bool,
}

impl TrackSyntaxConfig {
    /// Parse a configuration from YAML
    pub fn from_yaml(content: &str) -> Result<Self, GrammarError> {
        serde_yaml::from_str(content).map_err(|e| GrammarError::ConfigError(e.to_string()))
    }

    pub fn chord_notations(&self) -> Vec<&str> {
        self.chord.iter().map(|c| c.notation.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_config() {
        let config = TrackSyntaxConfig::from_yaml(
            r#"
Dict:
  - Name: Tremolo1
    VoidQ: false
  - Name: Vol
    VoidQ: true
Chord:
  - Notation: M
    Comment: Major triad
  - Notation: m
Alias:
  - Name: Vol
    Syntax: "${1:uns}%"
Context:
  - State: default
    Rules:
      - Pattern: "\\?"
        Token: Fermata
      - Include: section
"#,
        )
        .unwrap();

        assert_eq!(config.dict.len(), 2);
        assert!(!config.dict[0].void_q);
        assert!(config.dict[1].void_q);
        assert_eq!(config.chord_notations(), vec!["M", "m"]);
        assert_eq!(config.chord[0].comment.as_deref(), Some("Major triad"));
        assert_eq!(config.alias[0].syntax, "${1:uns}%");
        assert_eq!(config.context[0].state, "default");
        assert!(!config.context[0].prepend);
        assert_eq!(config.context[0].rules[0].pattern.as_deref(), Some("\\?"));
        assert_eq!(config.context[0].rules[0].token.as_deref(), Some("Fermata"));
        assert_eq!(config.context[0].rules[1].include.as_deref(), Some("section"));
    }

    #[test]
    fn test_sections_default_to_empty() {
        let config = TrackSyntaxConfig::from_yaml("Dict: []").unwrap();
        assert_eq!(config, TrackSyntaxConfig::default());
    }

    #[test]
    fn test_void_q_defaults_to_false() {
        let config = TrackSyntaxConfig::from_yaml("Dict: [{ Name: Foo }]").unwrap();
        assert!(!config.dict[0].void_q);
    }

    #[test]
    fn test_invalid_yaml() {
        let result = TrackSyntaxConfig::from_yaml("Dict: [{ VoidQ: true }]");
        match result {
            Err(GrammarError::ConfigError(message)) => assert!(message.contains("Name")),
            other => panic!("Expected ConfigError, got {:?}", other),
        }
    }
}
