//! # Token Types
//!
//! The token tree produced when a compiled grammar is run over track text.
//!
//! ## Type Hierarchy
//! ```text
//! Token (enum, serialized with a `Type` tag)
//!   ├── Note { Pitches: Vec<Pitch>, PitOp, Chord, VolOp, DurOp, Stac }
//!   ├── Function { Name, Alias, Args: Vec<Token>, VoidQ }
//!   ├── Subtrack { Repeat, Content: Vec<Token> }
//!   ├── Macrotrack { Name }
//!   ├── BarLine { Skip, Overlay, Order: Vec<u32> }
//!   ├── Comment { Content }
//!   ├── @inst { name, spec: Vec<Token>, dict: Vec<Macropitch>, space }
//!   ├── Macropitch { Content, Pitches }
//!   ├── Array { Content: Vec<Token> }
//!   ├── String / Expression / Space { Content }
//!   ├── Tie / LocalIndicator
//!   └── Volta / Pitch / @literal / Custom   (fragments produced by sub-states)
//! ```
//!
//! ## Key Concepts
//!
//! ### Note
//! A single degree (`1'#M>..`) carries its modifiers on its one pitch and leaves
//! the note-level `PitOp`/`Chord`/`VolOp` empty. A bracketed group (`[135]'`)
//! has one pitch per member and the modifiers after `]` at note level, where
//! they apply to the whole group.
//!
//! ### Repeat
//! `Subtrack::repeat` is the explicit `{N*` count, or the highest volta number
//! among the subtrack's own bar lines, or `-1` when neither exists.
//!
//! ### Alias
//! `Function::alias` is `-1` for `Name(...)`, `0` for `(Name: ...)` and the
//! 1-based alias definition index for alias syntax.

use serde::{Serialize, Serializer};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "Type")]
pub enum Token {
    Note(Note),
    Function(Function),
    Subtrack(Subtrack),
    Macrotrack {
        #[serde(rename = "Name")]
        name: String,
    },
    BarLine(BarLine),
    Comment {
        #[serde(rename = "Content")]
        content: String,
    },
    #[serde(rename = "@inst")]
    Instrument(Instrument),
    Macropitch(Macropitch),
    Array {
        #[serde(rename = "Content")]
        content: Vec<Token>,
    },
    String {
        #[serde(rename = "Content")]
        content: String,
    },
    Expression {
        #[serde(rename = "Content")]
        content: String,
    },
    Tie,
    Space {
        #[serde(rename = "Content")]
        content: String,
    },
    LocalIndicator,
    /// Volta numbers read from one list entry
    Volta {
        #[serde(rename = "Order")]
        order: Vec<u32>,
    },
    /// One member of a macropitch definition
    Pitch(Pitch),
    /// One character of a comment body
    #[serde(rename = "@literal")]
    Literal {
        #[serde(rename = "Content")]
        content: String,
    },
    /// An item defined by a library context
    Custom {
        #[serde(rename = "Kind")]
        kind: String,
        #[serde(rename = "Content")]
        content: Option<String>,
    },
}

/// One scale degree with its own modifiers
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Pitch {
    pub degree: String,
    pub pit_op: String,
    pub chord: String,
    pub vol_op: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Note {
    pub pitches: Vec<Pitch>,
    pub pit_op: String,
    pub chord: String,
    pub vol_op: String,
    pub dur_op: String,
    /// Number of trailing staccato marks
    pub stac: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Function {
    pub name: String,
    pub alias: i32,
    pub args: Vec<Token>,
    #[serde(rename = "VoidQ")]
    pub void_q: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Subtrack {
    pub repeat: i64,
    pub content: Vec<Token>,
}

impl Subtrack {
    /// Infer the repeat count from the volta bar lines among `content`.
    ///
    /// Only direct children are inspected, so volta numbers inside nested
    /// subtracks never leak upward. Plain bar lines carry the `[0]` sentinel
    /// and are ignored.
    pub fn infer_repeat(content: &[Token]) -> i64 {
        content
            .iter()
            .filter_map(|token| match token {
                Token::BarLine(bar) if bar.is_volta() => bar.order.iter().max().copied(),
                _ => None,
            })
            .map(i64::from)
            .fold(-1, i64::max)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct BarLine {
    pub skip: bool,
    pub overlay: bool,
    pub order: Vec<u32>,
}

impl BarLine {
    pub fn is_volta(&self) -> bool {
        self.order.first().is_some_and(|&n| n > 0)
    }
}

/// An instrument entry of a metadata block
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Instrument {
    pub name: String,
    pub spec: Vec<Token>,
    #[serde(serialize_with = "tagged_macropitches")]
    pub dict: Vec<Macropitch>,
    pub space: String,
}

impl Instrument {
    /// Look up a macropitch definition by label; the last definition wins
    pub fn macropitch(&self, label: &str) -> Option<&[Pitch]> {
        self.dict
            .iter()
            .rev()
            .filter(|m| m.label == label)
            .find_map(|m| m.pitches.as_deref())
    }
}

/// Serialize dict entries with their `Type` tag, like any other token
fn tagged_macropitches<S: Serializer>(dict: &[Macropitch], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(dict.iter().cloned().map(Token::Macropitch))
}

/// A macropitch reference (`[x]`, no pitches) or definition (`[x=...]`)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Macropitch {
    #[serde(rename = "Content")]
    pub label: String,
    #[serde(rename = "Pitches", skip_serializing_if = "Option::is_none")]
    pub pitches: Option<Vec<Pitch>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(order: Vec<u32>) -> Token {
        Token::BarLine(BarLine {
            skip: false,
            overlay: false,
            order,
        })
    }

    #[test]
    fn test_infer_repeat_takes_highest_volta() {
        let content = vec![bar(vec![2]), Token::Tie, bar(vec![1, 2, 3]), bar(vec![0])];
        assert_eq!(Subtrack::infer_repeat(&content), 3);
    }

    #[test]
    fn test_infer_repeat_without_volta() {
        assert_eq!(Subtrack::infer_repeat(&[bar(vec![0]), bar(vec![0])]), -1);
        assert_eq!(Subtrack::infer_repeat(&[]), -1);
    }

    #[test]
    fn test_infer_repeat_ignores_empty_order() {
        assert_eq!(Subtrack::infer_repeat(&[bar(vec![])]), -1);
    }

    #[test]
    fn test_infer_repeat_ignores_nested_subtracks() {
        let nested = Token::Subtrack(Subtrack {
            repeat: 4,
            content: vec![bar(vec![4])],
        });
        assert_eq!(Subtrack::infer_repeat(&[nested, bar(vec![2])]), 2);
    }

    #[test]
    fn test_macropitch_lookup() {
        let pitch = |degree: &str| Pitch {
            degree: degree.to_string(),
            ..Pitch::default()
        };
        let inst = Instrument {
            name: "Piano".to_string(),
            spec: vec![],
            dict: vec![
                Macropitch {
                    label: "x".to_string(),
                    pitches: Some(vec![pitch("1")]),
                },
                Macropitch {
                    label: "x".to_string(),
                    pitches: Some(vec![pitch("3"), pitch("5")]),
                },
                Macropitch {
                    label: "x".to_string(),
                    pitches: None,
                },
            ],
            space: String::new(),
        };
        assert_eq!(inst.macropitch("x").map(|p| p.len()), Some(2));
        assert_eq!(inst.macropitch("y"), None);
    }

    #[test]
    fn test_serialized_shape() {
        let token = Token::Note(Note {
            pitches: vec![Pitch {
                degree: "x".to_string(),
                ..Pitch::default()
            }],
            stac: 2,
            ..Note::default()
        });
        let yaml = serde_yaml::to_string(&token).unwrap();
        assert!(yaml.contains("Type: Note"));
        assert!(yaml.contains("Degree: x"));
        assert!(yaml.contains("Stac: 2"));
    }

    #[test]
    fn test_instrument_dict_entries_are_tagged() {
        let token = Token::Instrument(Instrument {
            name: "Piano".to_string(),
            spec: vec![],
            dict: vec![Macropitch {
                label: "a".to_string(),
                pitches: None,
            }],
            space: String::new(),
        });
        let yaml = serde_yaml::to_string(&token).unwrap();
        assert!(yaml.contains("@inst"), "{}", yaml);
        assert!(yaml.contains("- Type: Macropitch"), "{}", yaml);
        assert!(yaml.contains("Content: a"), "{}", yaml);
    }
}
