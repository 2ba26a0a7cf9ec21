//! # Library Loader
//!
//! Extends an assembled grammar with the states a syntax library configures.
//!
//! Library rules are added before the grammar is frozen, so a library rule
//! appended to `proto` is also visible everywhere `proto` is included.

use log::debug;

use crate::config::{ContextDef, ContextRule};
use crate::error::GrammarError;
use crate::grammar::{include, item, Entry, GrammarBuilder, ItemKind, Pattern, Rule};

/// Adds or extends named states of a grammar under assembly
pub trait LibraryLoader {
    fn load_context(&self, grammar: &mut GrammarBuilder, contexts: &[ContextDef]) -> Result<(), GrammarError>;
}

/// Loads [`ContextDef`] entries from the syntax configuration
#[derive(Debug, Clone, Copy, Default)]
pub struct ContextLibrary;

fn entry(state: &str, rule: &ContextRule) -> Result<Entry, GrammarError> {
    let invalid = |message: String| GrammarError::InvalidContext {
        state: state.to_string(),
        message,
    };
    match (&rule.include, &rule.pattern) {
        (Some(state), None) => Ok(include(state)),
        (None, Some(source)) => {
            let pattern = Pattern::new(source.clone())?;
            Ok(match (&rule.token, rule.pop) {
                (None, true) => Rule::pop(pattern).into(),
                (Some(kind), false) => item(ItemKind::Custom(kind.clone()), pattern),
                (None, false) => Rule::skip(pattern).into(),
                (Some(kind), true) => {
                    return Err(invalid(format!("rule '{}' both pops and yields '{}'", source, kind)))
                }
            })
        }
        (Some(other), Some(source)) => Err(invalid(format!(
            "rule '{}' both matches and includes '{}'",
            source, other
        ))),
        (None, None) => Err(invalid("rule has neither a pattern nor an include".to_string())),
    }
}

impl LibraryLoader for ContextLibrary {
    fn load_context(&self, grammar: &mut GrammarBuilder, contexts: &[ContextDef]) -> Result<(), GrammarError> {
        for context in contexts {
            let entries = context
                .rules
                .iter()
                .map(|rule| entry(&context.state, rule))
                .collect::<Result<Vec<_>, _>>()?;
            debug!(
                "library {} {} rules to {}",
                if context.prepend { "prepends" } else { "appends" },
                entries.len(),
                context.state
            );
            if context.prepend {
                grammar.prepend(&context.state, entries);
            } else {
                grammar.extend(&context.state, entries);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(pattern: Option<&str>, token: Option<&str>, pop: bool, include: Option<&str>) -> ContextRule {
        ContextRule {
            include: include.map(str::to_string),
            pattern: pattern.map(str::to_string),
            token: token.map(str::to_string),
            pop,
        }
    }

    #[test]
    fn test_rule_shapes() {
        assert_eq!(entry("s", &rule(None, None, false, Some("note"))).unwrap(), include("note"));
        match entry("s", &rule(Some("x"), None, true, None)).unwrap() {
            Entry::Rule(r) => assert_eq!(r, Rule::pop(Pattern::new("x").unwrap())),
            other => panic!("Expected rule, got {:?}", other),
        }
        match entry("s", &rule(Some("(x)"), Some("Mark"), false, None)).unwrap() {
            Entry::Rule(r) => assert_eq!(r.shape, Some(crate::grammar::TokenShape::Item(ItemKind::Custom("Mark".into())))),
            other => panic!("Expected rule, got {:?}", other),
        }
        match entry("s", &rule(Some(";"), None, false, None)).unwrap() {
            Entry::Rule(r) => assert!(r.shape.is_none()),
            other => panic!("Expected rule, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_rules() {
        assert!(matches!(
            entry("s", &rule(None, None, false, None)),
            Err(GrammarError::InvalidContext { .. })
        ));
        assert!(entry("s", &rule(Some("x"), None, false, Some("note"))).is_err());
        assert!(entry("s", &rule(Some("x"), Some("Mark"), true, None)).is_err());
        assert!(entry("s", &rule(Some("[x"), None, false, None)).is_err());
    }

    #[test]
    fn test_append_and_prepend() {
        let mut grammar = GrammarBuilder::new(vec![]);
        grammar.define("default", vec![Rule::skip(Pattern::new("b").unwrap()).into()]);
        let contexts = vec![
            ContextDef {
                state: "default".to_string(),
                prepend: true,
                rules: vec![rule(Some("a"), None, false, None)],
            },
            ContextDef {
                state: "default".to_string(),
                prepend: false,
                rules: vec![rule(Some("c"), None, false, None)],
            },
            ContextDef {
                state: "extra".to_string(),
                prepend: false,
                rules: vec![rule(Some("d"), Some("D"), false, None)],
            },
        ];
        ContextLibrary.load_context(&mut grammar, &contexts).unwrap();
        let sources: Vec<String> = grammar
            .entries("default")
            .unwrap()
            .iter()
            .map(|e| match e {
                Entry::Rule(r) => r.pattern.source().to_string(),
                Entry::Include(s) => s.clone(),
            })
            .collect();
        assert_eq!(sources, vec!["a", "b", "c"]);
        assert!(grammar.contains("extra"));
    }
}
