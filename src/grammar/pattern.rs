use std::fmt;

use regex::{Captures, Regex};

use crate::error::GrammarError;

/// A compiled matcher together with the source text it was composed from.
///
/// Anchored patterns only match at the cursor. A pattern may carry a lookahead:
/// a second anchored matcher tried right after the consumed text, which decides
/// the match but is never consumed itself.
#[derive(Clone)]
pub struct Pattern {
    source: String,
    lookahead: Option<String>,
    regex: Regex,
    guard: Option<Regex>,
}

fn compile(source: &str) -> Result<Regex, GrammarError> {
    Regex::new(source).map_err(|e| GrammarError::InvalidPattern {
        pattern: source.to_string(),
        message: e.to_string(),
    })
}

impl Pattern {
    /// Compile `source` anchored at the cursor
    pub fn new(source: impl Into<String>) -> Result<Self, GrammarError> {
        let source = source.into();
        let regex = compile(&format!("^(?:{})", source))?;
        Ok(Self {
            source,
            lookahead: None,
            regex,
            guard: None,
        })
    }

    /// Compile `source` for scanning a whole text, matching anywhere
    pub fn scanner(source: impl Into<String>) -> Result<Self, GrammarError> {
        let source = source.into();
        let regex = compile(&source)?;
        Ok(Self {
            source,
            lookahead: None,
            regex,
            guard: None,
        })
    }

    /// Only match when `lookahead` follows the consumed text
    pub fn followed_by(mut self, lookahead: impl Into<String>) -> Result<Self, GrammarError> {
        let lookahead = lookahead.into();
        self.guard = Some(compile(&format!("^(?:{})", lookahead))?);
        self.lookahead = Some(lookahead);
        Ok(self)
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn lookahead(&self) -> Option<&str> {
        self.lookahead.as_deref()
    }

    /// Number of capture groups, not counting the whole match
    pub fn groups(&self) -> usize {
        self.regex.captures_len() - 1
    }

    /// Match at the start of `rest`, returning the captures of the consumed part
    pub fn match_at<'t>(&self, rest: &'t str) -> Option<Captures<'t>> {
        let caps = self.regex.captures(rest)?;
        let end = caps.get(0).map_or(0, |m| m.end());
        match &self.guard {
            Some(guard) if !guard.is_match(&rest[end..]) => None,
            _ => Some(caps),
        }
    }

    /// Every non-overlapping match in `text`, left to right
    pub fn scan<'r, 't>(&'r self, text: &'t str) -> impl Iterator<Item = Captures<'t>> + 'r
    where
        't: 'r,
    {
        self.regex.captures_iter(text)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
            && self.lookahead == other.lookahead
            && self.regex.as_str() == other.regex.as_str()
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.lookahead {
            Some(lookahead) => write!(f, "/{}(?={})/", self.source, lookahead),
            None => write!(f, "/{}/", self.source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anchored_at_cursor() {
        let pattern = Pattern::new(r"\d+").unwrap();
        let caps = pattern.match_at("12ab").unwrap();
        assert_eq!(&caps[0], "12");
        assert!(pattern.match_at("ab12").is_none());
    }

    #[test]
    fn test_alternation_stays_anchored() {
        let pattern = Pattern::new("a|b").unwrap();
        assert!(pattern.match_at("xb").is_none());
        assert!(pattern.match_at("bx").is_some());
    }

    #[test]
    fn test_lookahead_is_not_consumed() {
        let pattern = Pattern::new(r"\\").unwrap().followed_by(r"\d+:").unwrap();
        let caps = pattern.match_at(r"\12: x").unwrap();
        assert_eq!(&caps[0], r"\");
        assert!(pattern.match_at(r"\ x").is_none());
    }

    #[test]
    fn test_zero_width_lookahead() {
        let pattern = Pattern::new("").unwrap().followed_by(">").unwrap();
        assert_eq!(pattern.match_at(">").map(|c| c[0].len()), Some(0));
        assert!(pattern.match_at("a>").is_none());
    }

    #[test]
    fn test_scanner_finds_every_match() {
        let pattern = Pattern::scanner("([a-c])(#*)").unwrap();
        let found: Vec<String> = pattern.scan("a#xb##c").map(|c| c[0].to_string()).collect();
        assert_eq!(found, vec!["a#", "b##", "c"]);
    }

    #[test]
    fn test_groups() {
        assert_eq!(Pattern::new("a(b)(?:c)(d)").unwrap().groups(), 2);
        assert_eq!(Pattern::new("x").unwrap().followed_by("(y)").unwrap().groups(), 0);
    }

    #[test]
    fn test_invalid_source() {
        match Pattern::new("[a") {
            Err(GrammarError::InvalidPattern { pattern, .. }) => assert_eq!(pattern, "[a"),
            other => panic!("Expected InvalidPattern, got {:?}", other),
        }
    }

    #[test]
    fn test_equality_by_source() {
        assert_eq!(Pattern::new("a+").unwrap(), Pattern::new("a+").unwrap());
        assert_ne!(Pattern::new("a+").unwrap(), Pattern::scanner("a+").unwrap());
        assert_ne!(
            Pattern::new("a").unwrap(),
            Pattern::new("a").unwrap().followed_by("b").unwrap()
        );
    }
}
