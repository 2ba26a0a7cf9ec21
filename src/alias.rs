//! # Alias Builder
//!
//! Turns an alias definition into a grammar rule producing a `Function` token.
//!
//! ## Template Syntax
//! The `Syntax` of an alias is literal text with typed placeholders:
//!
//! ```text
//! ${1:uns}%          Vol(80)        written as  80%
//! ${2:not}~${1:uns}  Trem(4, 135)   written as  135~4
//! ```
//!
//! `${n:type}` captures argument `n` (1-based) with the pattern of `type` from
//! the argument-pattern dictionary. Argument positions must be exactly
//! `1..=k`. Everything outside placeholders matches literally.

use regex::Regex;

use crate::config::AliasDef;
use crate::error::GrammarError;
use crate::grammar::{ArgSlot, GrammarBuilder, Pattern, Rule, TokenShape};
use crate::track::ArgumentPatterns;

/// Compiles one alias definition into a rule
pub trait AliasBuilder {
    /// `index` is the definition's 0-based position in the alias list
    fn build(
        &self,
        def: &AliasDef,
        index: usize,
        arguments: &ArgumentPatterns,
        grammar: &GrammarBuilder,
    ) -> Result<Rule, GrammarError>;
}

/// The `${n:type}` template builder
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateAlias;

const PLACEHOLDER: &str = r"\$\{(\d+):(\w+)\}";

impl TemplateAlias {
    fn invalid(def: &AliasDef, message: impl Into<String>) -> GrammarError {
        GrammarError::InvalidAlias {
            alias: def.syntax.clone(),
            message: message.into(),
        }
    }
}

impl AliasBuilder for TemplateAlias {
    fn build(
        &self,
        def: &AliasDef,
        index: usize,
        arguments: &ArgumentPatterns,
        grammar: &GrammarBuilder,
    ) -> Result<Rule, GrammarError> {
        if !grammar.functions().iter().any(|f| f.name == def.name) {
            return Err(GrammarError::UnknownFunction(def.name.clone()));
        }
        if def.syntax.is_empty() {
            return Err(Self::invalid(def, "empty syntax"));
        }

        let placeholder = Regex::new(PLACEHOLDER).map_err(|e| GrammarError::InvalidPattern {
            pattern: PLACEHOLDER.to_string(),
            message: e.to_string(),
        })?;

        let mut source = String::new();
        let mut slots: Vec<(usize, ArgSlot)> = Vec::new();
        let mut groups = 0;
        let mut last = 0;
        for caps in placeholder.captures_iter(&def.syntax) {
            let (Some(whole), Some(position), Some(kind)) = (caps.get(0), caps.get(1), caps.get(2))
            else {
                continue;
            };
            source.push_str(&regex::escape(&def.syntax[last..whole.start()]));
            last = whole.end();

            let argument = arguments
                .get(kind.as_str())
                .ok_or_else(|| GrammarError::UnknownArgumentType(kind.as_str().to_string()))?;
            let position: usize = position
                .as_str()
                .parse()
                .map_err(|_| Self::invalid(def, format!("bad argument position {}", position.as_str())))?;
            slots.push((
                position,
                ArgSlot {
                    group: groups + 1,
                    meta: argument.meta.clone(),
                },
            ));
            groups += Pattern::new(argument.pattern.clone())?.groups();
            source.push_str(&argument.pattern);
        }
        source.push_str(&regex::escape(&def.syntax[last..]));

        slots.sort_by_key(|(position, _)| *position);
        for (expected, (position, _)) in slots.iter().enumerate() {
            if *position != expected + 1 {
                return Err(Self::invalid(
                    def,
                    format!("argument positions must run from 1 to {} without gaps", slots.len()),
                ));
            }
        }

        Ok(Rule::token(
            Pattern::new(source)?,
            TokenShape::Alias {
                name: def.name.clone(),
                alias: index as i32 + 1,
                slots: slots.into_iter().map(|(_, slot)| slot).collect(),
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FunctionDef;
    use crate::grammar::ArgMeta;
    use crate::pitch::PitchSyntax;
    use crate::track::argument_patterns;

    fn alias(name: &str, syntax: &str) -> AliasDef {
        AliasDef {
            name: name.to_string(),
            syntax: syntax.to_string(),
        }
    }

    fn build(def: &AliasDef) -> Result<Rule, GrammarError> {
        let grammar = GrammarBuilder::new(vec![FunctionDef {
            name: "Trem".to_string(),
            void_q: false,
        }]);
        let arguments = argument_patterns(&PitchSyntax::new(&[], &["1", "3", "5"]));
        TemplateAlias.build(def, 2, &arguments, &grammar)
    }

    #[test]
    fn test_literal_text_is_escaped() {
        let rule = build(&alias("Trem", "${1:uns}*(")).unwrap();
        assert_eq!(rule.pattern.source(), r"(\d+(?:\.\d+)?)\*\(");
        assert!(rule.pattern.match_at("4*(").is_some());
        assert!(rule.pattern.match_at("4*").is_none());
    }

    #[test]
    fn test_slots_follow_argument_positions() {
        let rule = build(&alias("Trem", "${2:not}~${1:uns}")).unwrap();
        match &rule.shape {
            Some(TokenShape::Alias { name, alias, slots }) => {
                assert_eq!(name, "Trem");
                assert_eq!(*alias, 3);
                assert_eq!(slots[0].meta, ArgMeta::Expression);
                assert_eq!(slots[0].group, 2);
                assert_eq!(slots[1].meta, ArgMeta::Subtrack("note".to_string()));
                assert_eq!(slots[1].group, 1);
            }
            other => panic!("Expected alias shape, got {:?}", other),
        }
        assert_eq!(rule.epilogs(), vec![(1, "note")]);
    }

    #[test]
    fn test_unknown_function() {
        assert_eq!(
            build(&alias("Nope", "${1:uns}")).unwrap_err(),
            GrammarError::UnknownFunction("Nope".to_string())
        );
    }

    #[test]
    fn test_unknown_argument_type() {
        assert_eq!(
            build(&alias("Trem", "${1:xyz}")).unwrap_err(),
            GrammarError::UnknownArgumentType("xyz".to_string())
        );
    }

    #[test]
    fn test_position_gap() {
        assert!(matches!(
            build(&alias("Trem", "${1:uns}~${3:uns}")),
            Err(GrammarError::InvalidAlias { .. })
        ));
    }

    #[test]
    fn test_empty_syntax() {
        assert!(matches!(build(&alias("Trem", "")), Err(GrammarError::InvalidAlias { .. })));
    }
}
