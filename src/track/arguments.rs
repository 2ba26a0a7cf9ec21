//! Typed argument patterns shared by alias syntax.
//!
//! Every pattern has exactly one capture group: the argument text.

use std::collections::BTreeMap;

use crate::grammar::ArgMeta;
use crate::pitch::PitchSyntax;

#[derive(Debug, Clone, PartialEq)]
pub struct ArgumentPattern {
    pub pattern: String,
    pub meta: ArgMeta,
}

/// The argument-pattern dictionary, keyed by type name (`uns`, `exp`, `not`, ...)
pub type ArgumentPatterns = BTreeMap<String, ArgumentPattern>;

const FIXED: &[(&str, &str, ArgMeta)] = &[
    ("uns", r"(\d+(?:\.\d+)?)", ArgMeta::Expression),
    ("sig", r"([+\-]\d+(?:\.\d+)?)", ArgMeta::Expression),
    ("int", r"([+\-]?\d+(?:\.\d+)?)", ArgMeta::Expression),
    (
        "exp",
        r"([+\-]?\d+(?:[./]\d+)?|Log2\(\d+\)(?:[+\-]\d+)?)",
        ArgMeta::Expression,
    ),
    ("str", r#"((?:[^{}()\[\]",]|\\.)*)"#, ArgMeta::String),
    ("nam", r"([a-zA-Z][a-zA-Z\d]*)", ArgMeta::String),
    ("mac", r"(@[a-zA-Z]\w*)", ArgMeta::Macrotrack),
];

pub fn argument_patterns(pitch: &PitchSyntax) -> ArgumentPatterns {
    let mut patterns: ArgumentPatterns = FIXED
        .iter()
        .map(|(name, pattern, meta)| {
            (
                name.to_string(),
                ArgumentPattern {
                    pattern: pattern.to_string(),
                    meta: meta.clone(),
                },
            )
        })
        .collect();
    patterns.insert(
        "not".to_string(),
        ArgumentPattern {
            pattern: format!("({}+)", pitch.note()),
            meta: ArgMeta::Subtrack("note".to_string()),
        },
    );
    patterns
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::Pattern;

    #[test]
    fn test_every_pattern_compiles_with_one_group() {
        let patterns = argument_patterns(&PitchSyntax::new(&["M"], &["1", "2"]));
        assert_eq!(patterns.len(), 8);
        for (name, arg) in &patterns {
            let pattern = Pattern::new(arg.pattern.clone()).unwrap_or_else(|e| panic!("{}: {}", name, e));
            assert_eq!(pattern.groups(), 1, "{} must capture exactly once", name);
        }
    }

    #[test]
    fn test_expression_forms() {
        let patterns = argument_patterns(&PitchSyntax::new(&[], &[]));
        let exp = Pattern::new(patterns["exp"].pattern.clone()).unwrap();
        assert_eq!(&exp.match_at("-3/4").unwrap()[1], "-3/4");
        assert_eq!(&exp.match_at("Log2(3)-1").unwrap()[1], "Log2(3)-1");
        assert!(exp.match_at("x").is_none());
    }

    #[test]
    fn test_note_argument() {
        let patterns = argument_patterns(&PitchSyntax::new(&[], &["1", "2"]));
        let not = &patterns["not"];
        assert_eq!(not.meta, ArgMeta::Subtrack("note".to_string()));
        let caps = Pattern::new(not.pattern.clone()).unwrap().match_at("12[12]-~").unwrap();
        assert_eq!(&caps[1], "12[12]-");
    }
}
