//! # Grammar Model
//!
//! A grammar is a set of named lexer states. Each state is an ordered list of
//! rules, and order is priority: the first rule whose pattern matches at the
//! cursor wins.
//!
//! ## Composition
//! States are assembled in a [`GrammarBuilder`] from [`Entry`] values. An entry
//! is either a rule or an `include` of another state by name. Push targets are
//! also names, so the states form a reference graph that can be inspected
//! before anything is matched. [`GrammarBuilder::build`] splices every include
//! in place, checks the graph, and freezes the result into a [`Grammar`].
//!
//! - [`include`] - splice another state's rules at this position
//! - [`item`] - a rule that wraps capture 1 as a token of the given kind
//! - [`next`] - a push target that runs a state until a terminator matches
//!
//! ## Example
//! ```rust
//! use track_grammar::grammar::{include, item, GrammarBuilder, ItemKind, Pattern, Rule};
//!
//! let mut builder = GrammarBuilder::new(vec![]);
//! builder.define("space", vec![item(ItemKind::Space, Pattern::new(r"(\s+)")?)]);
//! builder.define("body", vec![
//!     Rule::pop(Pattern::new(r"\}")?).into(),
//!     include("space"),
//! ]);
//! let grammar = builder.build()?;
//! assert_eq!(grammar.state("body").map(|rules| rules.len()), Some(2));
//! # Ok::<(), track_grammar::GrammarError>(())
//! ```

mod pattern;
mod rule;

pub use pattern::Pattern;
pub use rule::{ArgMeta, ArgSlot, ItemKind, Rule, Target, TokenShape, Transition};

use std::collections::BTreeMap;

use log::debug;

use crate::config::FunctionDef;
use crate::error::GrammarError;

/// One position in an unresolved state
#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    Rule(Rule),
    Include(String),
}

impl From<Rule> for Entry {
    fn from(rule: Rule) -> Self {
        Entry::Rule(rule)
    }
}

/// Splice the rules of `state` at this position
pub fn include(state: &str) -> Entry {
    Entry::Include(state.to_string())
}

/// A rule with no push or pop that wraps capture 1 as `{Type, Content}`
pub fn item(kind: ItemKind, pattern: Pattern) -> Entry {
    Entry::Rule(Rule::token(pattern, TokenShape::Item(kind)))
}

/// Run `state` as a nested state that also ends when `terminator` matches
pub fn next(state: &str, terminator: Pattern) -> Target {
    Target {
        state: state.to_string(),
        terminator: Some(terminator),
    }
}

/// Mutable grammar under assembly
#[derive(Debug, Clone, Default)]
pub struct GrammarBuilder {
    states: BTreeMap<String, Vec<Entry>>,
    functions: Vec<FunctionDef>,
}

impl GrammarBuilder {
    pub fn new(functions: Vec<FunctionDef>) -> Self {
        Self {
            states: BTreeMap::new(),
            functions,
        }
    }

    /// Define (or replace) a state
    pub fn define(&mut self, state: &str, entries: Vec<Entry>) {
        self.states.insert(state.to_string(), entries);
    }

    /// Append to a state, creating it when absent
    pub fn extend(&mut self, state: &str, entries: Vec<Entry>) {
        self.states.entry(state.to_string()).or_default().extend(entries);
    }

    /// Insert before the existing rules of a state, creating it when absent
    pub fn prepend(&mut self, state: &str, entries: Vec<Entry>) {
        let existing = self.states.entry(state.to_string()).or_default();
        existing.splice(0..0, entries);
    }

    pub fn contains(&self, state: &str) -> bool {
        self.states.contains_key(state)
    }

    pub fn entries(&self, state: &str) -> Option<&[Entry]> {
        self.states.get(state).map(Vec::as_slice)
    }

    pub fn functions(&self) -> &[FunctionDef] {
        &self.functions
    }

    /// Resolve every include and freeze the grammar.
    ///
    /// Fails on include cycles and on includes or push targets naming a state
    /// that does not exist.
    pub fn build(self) -> Result<Grammar, GrammarError> {
        let mut states = BTreeMap::new();
        for name in self.states.keys() {
            let mut path = Vec::new();
            let rules = self.flatten(name, &mut path)?;
            states.insert(name.clone(), rules);
        }

        for rules in states.values() {
            for rule in rules {
                if let Transition::Push(target) = &rule.transition {
                    if !states.contains_key(&target.state) {
                        return Err(GrammarError::UnknownState(target.state.clone()));
                    }
                }
            }
        }

        let functions = self
            .functions
            .into_iter()
            .map(|f| (f.name, f.void_q))
            .collect();
        debug!("built grammar with {} states", states.len());
        Ok(Grammar { states, functions })
    }

    fn flatten(&self, state: &str, path: &mut Vec<String>) -> Result<Vec<Rule>, GrammarError> {
        if path.iter().any(|s| s == state) {
            let mut cycle = path.clone();
            cycle.push(state.to_string());
            return Err(GrammarError::IncludeCycle(cycle));
        }
        let entries = self
            .states
            .get(state)
            .ok_or_else(|| GrammarError::UnknownState(state.to_string()))?;

        path.push(state.to_string());
        let mut rules = Vec::new();
        for entry in entries {
            match entry {
                Entry::Rule(rule) => rules.push(rule.clone()),
                Entry::Include(other) => rules.extend(self.flatten(other, path)?),
            }
        }
        path.pop();
        Ok(rules)
    }
}

/// A compiled, immutable grammar
#[derive(Debug, Clone, PartialEq)]
pub struct Grammar {
    states: BTreeMap<String, Vec<Rule>>,
    functions: BTreeMap<String, bool>,
}

impl Grammar {
    pub fn state(&self, name: &str) -> Option<&[Rule]> {
        self.states.get(name).map(Vec::as_slice)
    }

    pub fn state_names(&self) -> impl Iterator<Item = &str> {
        self.states.keys().map(String::as_str)
    }

    /// The `VoidQ` flag of a dictionary function, by exact name
    pub fn void_q(&self, name: &str) -> Option<bool> {
        self.functions.get(name).copied()
    }

    pub fn functions(&self) -> impl Iterator<Item = (&str, bool)> {
        self.functions.iter().map(|(name, void_q)| (name.as_str(), *void_q))
    }
}
