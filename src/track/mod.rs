//! # Grammar Assembler
//!
//! Builds the complete track grammar from a syntax configuration and a scale.
//!
//! ## States
//! ```text
//! default          track body: alias, proto, note, section, bar lines, comments, ties, spaces, `}`
//! proto            `{N*...}` subtracks, `@name` macrotracks, nonalias
//! nonalias         `Name(...)` and `(Name: ...)` calls
//! note             single and bracketed notes (empty without scale degrees)
//! section          `!`
//! volta            volta lists: `1~3`, `2`, separators `.` and `,`
//! argument         call arguments: arrays, strings, expressions, proto
//! alias            one rule per alias definition
//! meta             instrument entries up to `>`
//! meta.entry       one instrument: calls, aliases, macropitches, spaces
//! meta.macropitch  pitches of a `[x=...]` definition
//! comment          body of `<* ... *>`
//! ```
//!
//! ## Example
//! ```rust
//! use track_grammar::{Token, TrackSyntax, TrackSyntaxConfig};
//!
//! let config = TrackSyntaxConfig::from_yaml("Dict: [{ Name: Vol, VoidQ: true }]")?;
//! let syntax = TrackSyntax::new(&config, &["1", "2", "3"])?;
//!
//! let tokens = syntax.tokenize("Vol(80){1 2\\2:3}", "default")?;
//! assert!(matches!(&tokens[0], Token::Function(f) if f.name == "Vol" && f.void_q));
//! assert!(matches!(&tokens[1], Token::Subtrack(s) if s.repeat == 2));
//! # Ok::<(), track_grammar::GrammarError>(())
//! ```

mod arguments;

pub use arguments::{argument_patterns, ArgumentPattern, ArgumentPatterns};

use std::collections::HashSet;

use log::debug;

use crate::alias::{AliasBuilder, TemplateAlias};
use crate::config::TrackSyntaxConfig;
use crate::engine::{StackTokenizer, Tokenizer};
use crate::error::GrammarError;
use crate::grammar::*;
use crate::library::{ContextLibrary, LibraryLoader};
use crate::pitch::PitchSyntax;
use crate::token::Token;

/// Characters that cannot stand for themselves inside a character class
const CLASS_SPECIAL: &[char] = &['[', ']', '\\', '^', '-', '&', '~'];

/// Lookahead deciding that a `\` starts a volta list
const VOLTA_LIST: &str = r"(?:\d+(?:~\d+)?(?:, *\d+(?:~\d+)?)*)?:";

/// A compiled track grammar
#[derive(Debug, Clone, PartialEq)]
pub struct TrackSyntax {
    grammar: Grammar,
    arguments: ArgumentPatterns,
}

fn validate_alphabet(alphabet: &str, symbols: &[&str]) -> Result<(), GrammarError> {
    for symbol in symbols {
        let mut chars = symbol.chars();
        let valid = match (chars.next(), chars.next()) {
            (Some(c), None) => !CLASS_SPECIAL.contains(&c) && !c.is_whitespace(),
            _ => false,
        };
        if !valid {
            return Err(GrammarError::InvalidSymbol {
                alphabet: alphabet.to_string(),
                symbol: symbol.to_string(),
            });
        }
    }
    Ok(())
}

fn p(source: &str) -> Result<Pattern, GrammarError> {
    Pattern::new(source)
}

impl TrackSyntax {
    /// Assemble with the template alias builder and the configured library contexts
    pub fn new(config: &TrackSyntaxConfig, degrees: &[&str]) -> Result<Self, GrammarError> {
        Self::with_collaborators(config, degrees, &TemplateAlias, &ContextLibrary)
    }

    pub fn with_collaborators(
        config: &TrackSyntaxConfig,
        degrees: &[&str],
        aliases: &dyn AliasBuilder,
        library: &dyn LibraryLoader,
    ) -> Result<Self, GrammarError> {
        let chords = config.chord_notations();
        validate_alphabet("scale degree", degrees)?;
        validate_alphabet("chord", &chords)?;

        let mut seen = HashSet::new();
        for function in &config.dict {
            if !seen.insert(function.name.as_str()) {
                return Err(GrammarError::DuplicateFunction(function.name.clone()));
            }
        }

        let pitch = PitchSyntax::new(&chords, degrees);
        let arguments = argument_patterns(&pitch);
        let mut builder = GrammarBuilder::new(config.dict.clone());

        builder.define("nonalias", Self::nonalias(config)?);
        builder.define("proto", Self::proto()?);
        builder.define("note", pitch.rules()?.into_iter().map(Entry::from).collect());
        builder.define("meta", Self::meta()?);
        builder.define("meta.entry", Self::meta_entry()?);
        builder.define("meta.macropitch", Self::meta_macropitch(&pitch)?);
        builder.define("section", vec![item(ItemKind::LocalIndicator, p("!")?)]);
        builder.define("volta", Self::volta()?);
        builder.define("default", Self::track()?);
        builder.define("comment", Self::comment()?);
        builder.define("argument", Self::argument()?);

        let alias = config
            .alias
            .iter()
            .enumerate()
            .map(|(i, def)| aliases.build(def, i, &arguments, &builder).map(Entry::from))
            .collect::<Result<Vec<_>, _>>()?;
        builder.define("alias", alias);

        library.load_context(&mut builder, &config.context)?;

        let grammar = builder.build()?;
        debug!(
            "assembled track syntax: {} functions, {} aliases, {} library contexts, {} degrees",
            config.dict.len(),
            config.alias.len(),
            config.context.len(),
            degrees.len()
        );
        Ok(Self { grammar, arguments })
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    /// The argument-pattern dictionary alias definitions were built against
    pub fn arguments(&self) -> &ArgumentPatterns {
        &self.arguments
    }

    /// Tokenize `text` starting in `state` with the reference engine
    pub fn tokenize(&self, text: &str, state: &str) -> Result<Vec<Token>, GrammarError> {
        self.tokenize_with(&StackTokenizer, text, state)
    }

    pub fn tokenize_with(
        &self,
        tokenizer: &dyn Tokenizer,
        text: &str,
        state: &str,
    ) -> Result<Vec<Token>, GrammarError> {
        tokenizer.tokenize(&self.grammar, text, state)
    }

    fn nonalias(config: &TrackSyntaxConfig) -> Result<Vec<Entry>, GrammarError> {
        if config.dict.is_empty() {
            return Ok(vec![]);
        }
        let names = config
            .dict
            .iter()
            .map(|f| regex::escape(&f.name))
            .collect::<Vec<_>>()
            .join("|");
        Ok(vec![
            Rule::push(
                p(&format!(r"({})\(", names))?,
                "argument",
                TokenShape::Function { alias: -1 },
            )
            .into(),
            Rule::push(
                p(&format!(r"\(({}): *", names))?,
                "argument",
                TokenShape::Function { alias: 0 },
            )
            .into(),
        ])
    }

    fn proto() -> Result<Vec<Entry>, GrammarError> {
        Ok(vec![
            Rule::push(p(r"\{(?:(\d+)\*)?")?, "default", TokenShape::Subtrack).into(),
            Rule::token(p(r"@([a-zA-Z]\w*)")?, TokenShape::Macrotrack).into(),
            include("nonalias"),
        ])
    }

    fn meta() -> Result<Vec<Entry>, GrammarError> {
        Ok(vec![
            Rule::pop(p(">")?).into(),
            Rule::push(p(r"(\s*)([a-zA-Z][a-zA-Z\d]*)")?, "meta.entry", TokenShape::Instrument).into(),
        ])
    }

    fn meta_entry() -> Result<Vec<Entry>, GrammarError> {
        Ok(vec![
            Rule::pop(p("")?.followed_by(">")?).unlocated().into(),
            Rule::pop(p(",")?).into(),
            include("alias"),
            include("nonalias"),
            item(ItemKind::Macropitch, p(r"\[([a-zA-Z])\]")?),
            Rule::push(p(r"\[([a-zA-Z])=")?, "meta.macropitch", TokenShape::Macropitch).into(),
            item(ItemKind::Space, p(r"(\s+)")?),
        ])
    }

    fn meta_macropitch(pitch: &PitchSyntax) -> Result<Vec<Entry>, GrammarError> {
        Ok(vec![
            Rule::pop(p(r"\]")?).into(),
            Rule::token(Pattern::new(pitch.pitch())?, TokenShape::Pitch).into(),
        ])
    }

    fn volta() -> Result<Vec<Entry>, GrammarError> {
        Ok(vec![
            Rule::token(p(r"(\d+)~(\d+)")?, TokenShape::VoltaRange).into(),
            Rule::token(p(r"\d+")?, TokenShape::VoltaNumber).into(),
            Rule::skip(p("[.,] *")?).into(),
        ])
    }

    fn track() -> Result<Vec<Entry>, GrammarError> {
        Ok(vec![
            include("alias"),
            include("proto"),
            include("note"),
            include("section"),
            Rule::pop(p(r"\}")?).into(),
            Rule::push(
                p(r"\\")?.followed_by(VOLTA_LIST)?,
                next("volta", p(":")?),
                TokenShape::VoltaBarLine,
            )
            .unlocated()
            .into(),
            Rule::token(p(r"/|\||\\")?, TokenShape::BarLine).into(),
            Rule::push(p(r"<\*")?, "comment", TokenShape::Comment).into(),
            item(ItemKind::Tie, p(r"\^")?),
            item(ItemKind::Space, p(r"(\s+)")?),
        ])
    }

    fn comment() -> Result<Vec<Entry>, GrammarError> {
        Ok(vec![
            Rule::pop(p(r"\*>")?).into(),
            item(ItemKind::Literal, p(r"(?s)(.)")?),
        ])
    }

    fn argument() -> Result<Vec<Entry>, GrammarError> {
        Ok(vec![
            Rule::pop(p(r"\)")?).into(),
            Rule::skip(p(", *")?).into(),
            Rule::push(p(r"\[")?, next("argument", p(r"\]")?), TokenShape::Array).into(),
            Rule::token(p(r#""((?:\\.|[^{}()\[\]",\\])*)""#)?, TokenShape::Str).into(),
            item(
                ItemKind::Expression,
                p(r"([+\-]?\d+(?:[./]\d+)?|Log2\(\d+\)(?:[+\-]\d+)?)")?,
            ),
            include("proto"),
        ])
    }
}
