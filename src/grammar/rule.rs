use regex::Captures;

use super::{Grammar, Pattern};
use crate::engine::Tokenizer;
use crate::error::GrammarError;
use crate::token::*;

/// A state to enter, optionally ended by a terminator checked before its own rules
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    pub state: String,
    pub terminator: Option<Pattern>,
}

impl From<&str> for Target {
    fn from(state: &str) -> Self {
        Self {
            state: state.to_string(),
            terminator: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// Stay in the current state
    Stay,
    /// Close the current state and return to the caller
    Pop,
    /// Tokenize a nested state and hand its content to the token shape
    Push(Target),
}

/// One matching rule of a state
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub pattern: Pattern,
    pub transition: Transition,
    pub shape: Option<TokenShape>,
    /// `false` when the pattern decides the rule through a lookahead that is not consumed
    pub locate: bool,
}

impl Rule {
    pub fn token(pattern: Pattern, shape: TokenShape) -> Self {
        Self {
            pattern,
            transition: Transition::Stay,
            shape: Some(shape),
            locate: true,
        }
    }

    pub fn push(pattern: Pattern, target: impl Into<Target>, shape: TokenShape) -> Self {
        Self {
            pattern,
            transition: Transition::Push(target.into()),
            shape: Some(shape),
            locate: true,
        }
    }

    pub fn pop(pattern: Pattern) -> Self {
        Self {
            pattern,
            transition: Transition::Pop,
            shape: None,
            locate: true,
        }
    }

    /// A separator: consumed, produces nothing
    pub fn skip(pattern: Pattern) -> Self {
        Self {
            pattern,
            transition: Transition::Stay,
            shape: None,
            locate: true,
        }
    }

    pub fn unlocated(mut self) -> Self {
        self.locate = false;
        self
    }

    /// Argument positions (0-based) whose text is re-tokenized, with the state used
    pub fn epilogs(&self) -> Vec<(usize, &str)> {
        match &self.shape {
            Some(TokenShape::Alias { slots, .. }) => slots
                .iter()
                .enumerate()
                .filter_map(|(i, slot)| match &slot.meta {
                    ArgMeta::Subtrack(state) => Some((i, state.as_str())),
                    _ => None,
                })
                .collect(),
            _ => vec![],
        }
    }
}

/// What a rule's captured argument becomes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgMeta {
    Expression,
    String,
    Macrotrack,
    /// A note sequence, tokenized again in the named state
    Subtrack(String),
}

/// One argument of an alias rule: the capture group it reads and how it is shaped
#[derive(Debug, Clone, PartialEq)]
pub struct ArgSlot {
    pub group: usize,
    pub meta: ArgMeta,
}

/// Tokens produced by `item` rules
#[derive(Debug, Clone, PartialEq)]
pub enum ItemKind {
    Tie,
    Space,
    LocalIndicator,
    Expression,
    Macropitch,
    Literal,
    Custom(String),
}

/// How a matched rule turns into a token
#[derive(Debug, Clone, PartialEq)]
pub enum TokenShape {
    /// Single degree: `(deg)(pitOp)(chord)(volOp)(durOp)(epilog)`
    Note,
    /// Bracketed group: `[(members)](pitOp)(chord)(volOp)(durOp)(epilog)`,
    /// members recovered by scanning with `pitch`
    BracketNote { pitch: Pattern },
    /// `(deg)(pitOp)(chord)(volOp)`
    Pitch,
    /// Dictionary call; capture 1 is the name
    Function { alias: i32 },
    /// Alias syntax for a dictionary function
    Alias {
        name: String,
        alias: i32,
        slots: Vec<ArgSlot>,
    },
    /// Capture 1 is the optional explicit repeat count
    Subtrack,
    Macrotrack,
    BarLine,
    VoltaBarLine,
    VoltaRange,
    VoltaNumber,
    Comment,
    /// Capture 1 is the leading whitespace, capture 2 the instrument name
    Instrument,
    /// Capture 1 is the label; the pitches come from the nested state
    Macropitch,
    Array,
    Str,
    Item(ItemKind),
}

/// Longest `N~M` range a volta list may expand to
pub const MAX_VOLTA_RANGE: u32 = 1024;

fn group<'t>(caps: &Captures<'t>, i: usize) -> &'t str {
    caps.get(i).map_or("", |m| m.as_str())
}

fn pitch_from(caps: &Captures) -> Pitch {
    Pitch {
        degree: group(caps, 1).to_string(),
        pit_op: group(caps, 2).to_string(),
        chord: group(caps, 3).to_string(),
        vol_op: group(caps, 4).to_string(),
    }
}

fn number(text: &str) -> u32 {
    text.parse().unwrap_or(u32::MAX)
}

fn unescape(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => result.extend(chars.next()),
            _ => result.push(c),
        }
    }
    result
}

impl TokenShape {
    /// Build the token for a match.
    ///
    /// `content` is what the pushed state produced (empty for rules that do not
    /// push). `tokenizer` runs argument epilogs.
    pub fn build(
        &self,
        caps: &Captures,
        content: Vec<Token>,
        grammar: &Grammar,
        tokenizer: &dyn Tokenizer,
    ) -> Result<Token, GrammarError> {
        let token = match self {
            TokenShape::Note => Token::Note(Note {
                pitches: vec![pitch_from(caps)],
                dur_op: group(caps, 5).to_string(),
                stac: group(caps, 6).chars().count(),
                ..Note::default()
            }),
            TokenShape::BracketNote { pitch } => Token::Note(Note {
                pitches: pitch.scan(group(caps, 1)).map(|m| pitch_from(&m)).collect(),
                pit_op: group(caps, 2).to_string(),
                chord: group(caps, 3).to_string(),
                vol_op: group(caps, 4).to_string(),
                dur_op: group(caps, 5).to_string(),
                stac: group(caps, 6).chars().count(),
            }),
            TokenShape::Pitch => Token::Pitch(pitch_from(caps)),
            TokenShape::Function { alias } => {
                let name = group(caps, 1);
                let void_q = grammar
                    .void_q(name)
                    .ok_or_else(|| GrammarError::UnknownFunction(name.to_string()))?;
                Token::Function(Function {
                    name: name.to_string(),
                    alias: *alias,
                    args: content,
                    void_q,
                })
            }
            TokenShape::Alias { name, alias, slots } => {
                let void_q = grammar
                    .void_q(name)
                    .ok_or_else(|| GrammarError::UnknownFunction(name.clone()))?;
                let args = slots
                    .iter()
                    .map(|slot| slot.build(group(caps, slot.group), grammar, tokenizer))
                    .collect::<Result<Vec<_>, _>>()?;
                Token::Function(Function {
                    name: name.clone(),
                    alias: *alias,
                    args,
                    void_q,
                })
            }
            TokenShape::Subtrack => {
                let repeat = match caps.get(1) {
                    Some(count) => i64::from(number(count.as_str())),
                    None => Subtrack::infer_repeat(&content),
                };
                Token::Subtrack(Subtrack { repeat, content })
            }
            TokenShape::Macrotrack => Token::Macrotrack {
                name: group(caps, 1).to_string(),
            },
            TokenShape::BarLine => {
                let mark = group(caps, 0);
                Token::BarLine(BarLine {
                    skip: mark == "\\",
                    overlay: mark == "|",
                    order: vec![0],
                })
            }
            TokenShape::VoltaBarLine => Token::BarLine(BarLine {
                skip: false,
                overlay: false,
                order: content
                    .into_iter()
                    .flat_map(|token| match token {
                        Token::Volta { order } => order,
                        _ => vec![],
                    })
                    .collect(),
            }),
            TokenShape::VoltaRange => {
                let (start, end) = (number(group(caps, 1)), number(group(caps, 2)));
                if end.saturating_sub(start) >= MAX_VOLTA_RANGE {
                    return Err(GrammarError::VoltaRange { start, end });
                }
                Token::Volta {
                    order: (start..=end).collect(),
                }
            }
            TokenShape::VoltaNumber => Token::Volta {
                order: vec![number(group(caps, 0))],
            },
            TokenShape::Comment => Token::Comment {
                content: content
                    .iter()
                    .filter_map(|token| match token {
                        Token::Literal { content } => Some(content.as_str()),
                        _ => None,
                    })
                    .collect(),
            },
            TokenShape::Instrument => {
                let (dict, spec): (Vec<_>, Vec<_>) = content
                    .into_iter()
                    .partition(|token| matches!(token, Token::Macropitch(_)));
                Token::Instrument(Instrument {
                    name: group(caps, 2).to_string(),
                    spec,
                    dict: dict
                        .into_iter()
                        .filter_map(|token| match token {
                            Token::Macropitch(m) => Some(m),
                            _ => None,
                        })
                        .collect(),
                    space: group(caps, 1).to_string(),
                })
            }
            TokenShape::Macropitch => Token::Macropitch(Macropitch {
                label: group(caps, 1).to_string(),
                pitches: Some(
                    content
                        .into_iter()
                        .filter_map(|token| match token {
                            Token::Pitch(p) => Some(p),
                            _ => None,
                        })
                        .collect(),
                ),
            }),
            TokenShape::Array => Token::Array { content },
            TokenShape::Str => Token::String {
                content: unescape(group(caps, 1)),
            },
            TokenShape::Item(kind) => kind.build(caps.get(1).map(|m| m.as_str())),
        };
        Ok(token)
    }
}

impl ItemKind {
    fn build(&self, content: Option<&str>) -> Token {
        let text = content.unwrap_or_default().to_string();
        match self {
            ItemKind::Tie => Token::Tie,
            ItemKind::Space => Token::Space { content: text },
            ItemKind::LocalIndicator => Token::LocalIndicator,
            ItemKind::Expression => Token::Expression { content: text },
            ItemKind::Macropitch => Token::Macropitch(Macropitch {
                label: text,
                pitches: None,
            }),
            ItemKind::Literal => Token::Literal { content: text },
            ItemKind::Custom(kind) => Token::Custom {
                kind: kind.clone(),
                content: content.map(str::to_string),
            },
        }
    }
}

impl ArgSlot {
    fn build(
        &self,
        text: &str,
        grammar: &Grammar,
        tokenizer: &dyn Tokenizer,
    ) -> Result<Token, GrammarError> {
        Ok(match &self.meta {
            ArgMeta::Expression => Token::Expression {
                content: text.to_string(),
            },
            ArgMeta::String => Token::String {
                content: text.to_string(),
            },
            ArgMeta::Macrotrack => Token::Macrotrack {
                name: text.trim_start_matches('@').to_string(),
            },
            ArgMeta::Subtrack(state) => Token::Subtrack(Subtrack {
                repeat: -1,
                content: tokenizer.tokenize(grammar, text, state)?,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unescape() {
        assert_eq!(unescape(r"a\,b"), "a,b");
        assert_eq!(unescape(r"\\x\(y\)"), r"\x(y)");
        assert_eq!(unescape("plain"), "plain");
        assert_eq!(unescape("trailing\\"), "trailing");
    }

    #[test]
    fn test_number_saturates() {
        assert_eq!(number("12"), 12);
        assert_eq!(number("99999999999"), u32::MAX);
    }

    #[test]
    fn test_epilogs_only_listed_for_alias_slots() {
        let alias = Rule::token(
            Pattern::new("x").unwrap(),
            TokenShape::Alias {
                name: "F".to_string(),
                alias: 1,
                slots: vec![
                    ArgSlot {
                        group: 1,
                        meta: ArgMeta::Expression,
                    },
                    ArgSlot {
                        group: 2,
                        meta: ArgMeta::Subtrack("note".to_string()),
                    },
                ],
            },
        );
        assert_eq!(alias.epilogs(), vec![(1, "note")]);
        assert!(Rule::pop(Pattern::new("x").unwrap()).epilogs().is_empty());
    }

    #[test]
    fn test_target_from_name() {
        let target = Target::from("argument");
        assert_eq!(target.state, "argument");
        assert!(target.terminator.is_none());
    }

    #[test]
    fn test_volta_range_is_bounded() {
        let grammar = crate::grammar::GrammarBuilder::new(vec![]).build().unwrap();
        let range = Pattern::new(r"(\d+)~(\d+)").unwrap();
        let build = |text: &str| {
            let caps = range.match_at(text).unwrap();
            TokenShape::VoltaRange.build(&caps, vec![], &grammar, &crate::engine::StackTokenizer)
        };

        assert_eq!(
            build("3~5").unwrap(),
            Token::Volta { order: vec![3, 4, 5] }
        );
        assert_eq!(build("5~3").unwrap(), Token::Volta { order: vec![] });
        assert!(build(&format!("1~{}", MAX_VOLTA_RANGE)).is_ok());
        assert_eq!(
            build("1~4294967295"),
            Err(GrammarError::VoltaRange {
                start: 1,
                end: u32::MAX
            })
        );
        assert_eq!(
            build("0~99999999999"),
            Err(GrammarError::VoltaRange {
                start: 0,
                end: u32::MAX
            })
        );
    }
}
