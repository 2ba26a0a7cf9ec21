//! # Pitch Pattern Builder
//!
//! Composes the pattern fragments for pitches and notes from the two symbol
//! alphabets of a track syntax.
//!
//! ## Fragments
//! ```text
//! degree    [<degrees>]            exactly one scale-degree symbol
//! chord     [<chords>]*            any number of chord-quality markers
//! pitOp     [#b',]*                sharps, flats, octave marks
//! durOp     [._=-]*                duration marks
//! volOp     [>:]*                  accents
//! epilogue  [`]*                   staccato marks
//! ```
//!
//! A note is either a single degree or a bracketed group of degrees, followed
//! by `pitOp chord volOp durOp epilogue`:
//!
//! - `1'#>-` - one pitch, modifiers on the pitch itself
//! - `[13'5]M.` `` - three pitches; `M`, `.` and one staccato apply to the group
//!
//! With no scale degrees the degree fragment never matches, and [`PitchSyntax::rules`]
//! is empty: a syntax without a scale has no notes.

use crate::error::GrammarError;
use crate::grammar::{Pattern, Rule, TokenShape};

pub const PITCH_OPERATORS: &str = "[#b',]*";
pub const DURATION_OPERATORS: &str = "[._=-]*";
pub const VOLUME_OPERATORS: &str = "[>:]*";
pub const EPILOGUE: &str = "[`]*";

/// Matches nothing: a word boundary that is also a non-boundary
const NEVER: &str = r"\b\B";

/// Pattern fragments for one pair of alphabets
#[derive(Debug, Clone, PartialEq)]
pub struct PitchSyntax {
    has_degrees: bool,
    degree: String,
    chord: String,
}

/// Render an alphabet as a character class.
///
/// `multi` adds a zero-or-more quantifier. An empty alphabet renders as
/// `empty`.
fn char_class(symbols: &[&str], multi: bool, empty: &str) -> String {
    if symbols.is_empty() {
        return empty.to_string();
    }
    let quantifier = if multi { "*" } else { "" };
    format!("[{}]{}", symbols.concat(), quantifier)
}

impl PitchSyntax {
    pub fn new(chords: &[&str], degrees: &[&str]) -> Self {
        Self {
            has_degrees: !degrees.is_empty(),
            degree: char_class(degrees, false, NEVER),
            chord: char_class(chords, true, ""),
        }
    }

    /// `pitOp chord volOp` without captures
    fn inner(&self) -> String {
        format!("(?:{}{}{})", PITCH_OPERATORS, self.chord, VOLUME_OPERATORS)
    }

    /// `(degree)`
    pub fn degree(&self) -> String {
        format!("({})", self.degree)
    }

    /// `(pitOp)(chord)(volOp)`
    pub fn modifiers(&self) -> String {
        format!("({})({})({})", PITCH_OPERATORS, self.chord, VOLUME_OPERATORS)
    }

    /// `(durOp)(epilogue)`
    pub fn suffix(&self) -> String {
        format!("({})({})", DURATION_OPERATORS, EPILOGUE)
    }

    /// `[...]` with the members as capture 1
    pub fn bracket(&self) -> String {
        format!(r"\[((?:{}{})+)\]", self.degree, self.inner())
    }

    /// One pitch with four captures: degree, pitOp, chord, volOp
    pub fn pitch(&self) -> String {
        format!("{}{}", self.degree(), self.modifiers())
    }

    /// A whole note without captures
    pub fn note(&self) -> String {
        format!(
            r"(?:(?:\[(?:{deg}{inner})+\]|{deg}){inner}(?:{dur}{epi}))",
            deg = self.degree,
            inner = self.inner(),
            dur = DURATION_OPERATORS,
            epi = EPILOGUE,
        )
    }

    /// The single-degree and bracketed note rules, in that order
    pub fn rules(&self) -> Result<Vec<Rule>, GrammarError> {
        if !self.has_degrees {
            return Ok(vec![]);
        }
        let single = Pattern::new(format!("{}{}{}", self.degree(), self.modifiers(), self.suffix()))?;
        let bracket = Pattern::new(format!("{}{}{}", self.bracket(), self.modifiers(), self.suffix()))?;
        Ok(vec![
            Rule::token(single, TokenShape::Note),
            Rule::token(
                bracket,
                TokenShape::BracketNote {
                    pitch: Pattern::scanner(self.pitch())?,
                },
            ),
        ])
    }
}
