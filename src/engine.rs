//! # Tokenizer Engine
//!
//! Runs a compiled [`Grammar`] over track text.
//!
//! The engine keeps a state stack (by recursion): at each step of a state it
//! checks the pending terminator, then tries the state's rules in order at the
//! cursor. A push rule tokenizes the nested state from the same cursor and
//! hands the nested tokens to the rule's token shape; a pop rule returns to the
//! caller without producing a token.
//!
//! ## Rules of the run
//! - End of input closes every open state.
//! - A zero-width match only counts for pop and push rules.
//! - A pop in the start state ends the run; leftover input is an error.
//! - At most [`MAX_DEPTH`] states may be open at once.
//!
//! Any other engine can stand in by implementing [`Tokenizer`].

use log::{debug, trace};

use crate::error::GrammarError;
use crate::grammar::{Grammar, Pattern, Transition};
use crate::token::Token;

/// Executes a grammar against text, starting in a named state
pub trait Tokenizer {
    fn tokenize(&self, grammar: &Grammar, input: &str, state: &str) -> Result<Vec<Token>, GrammarError>;
}

/// Deepest state nesting the reference engine accepts, counting the start state
pub const MAX_DEPTH: usize = 256;

/// The reference engine
#[derive(Debug, Clone, Copy, Default)]
pub struct StackTokenizer;

/// How a state run ended
enum Exit {
    Popped,
    EndOfInput,
}

struct Run<'a> {
    grammar: &'a Grammar,
    input: &'a str,
    tokenizer: &'a dyn Tokenizer,
}

/// 1-based line and column of a byte offset
fn position(input: &str, offset: usize) -> (usize, usize) {
    let before = &input[..offset];
    let line = before.matches('\n').count() + 1;
    let column = before.rsplit('\n').next().map_or(0, |l| l.chars().count()) + 1;
    (line, column)
}

impl Tokenizer for StackTokenizer {
    fn tokenize(&self, grammar: &Grammar, input: &str, state: &str) -> Result<Vec<Token>, GrammarError> {
        let run = Run {
            grammar,
            input,
            tokenizer: self,
        };
        let (tokens, end, _) = run.state(state, None, 0, 1)?;
        if end < input.len() {
            let (line, column) = position(input, end);
            return Err(GrammarError::TrailingInput { line, column });
        }
        Ok(tokens)
    }
}

impl Run<'_> {
    fn state(
        &self,
        name: &str,
        terminator: Option<&Pattern>,
        start: usize,
        depth: usize,
    ) -> Result<(Vec<Token>, usize, Exit), GrammarError> {
        let rules = self
            .grammar
            .state(name)
            .ok_or_else(|| GrammarError::UnknownState(name.to_string()))?;
        let mut tokens = Vec::new();
        let mut pos = start;

        'step: while pos < self.input.len() {
            let rest = &self.input[pos..];

            if let Some(caps) = terminator.and_then(|t| t.match_at(rest)) {
                pos += caps.get(0).map_or(0, |m| m.end());
                return Ok((tokens, pos, Exit::Popped));
            }

            for rule in rules {
                let Some(caps) = rule.pattern.match_at(rest) else {
                    continue;
                };
                let consumed = caps.get(0).map_or(0, |m| m.end());

                match &rule.transition {
                    Transition::Pop => {
                        trace!("{}: pop on {:?}", name, rule.pattern);
                        return Ok((tokens, pos + consumed, Exit::Popped));
                    }
                    Transition::Push(target) => {
                        trace!("{}: push {} on {:?}", name, target.state, rule.pattern);
                        if depth >= MAX_DEPTH {
                            let (line, column) = position(self.input, pos);
                            return Err(GrammarError::TooDeep {
                                state: target.state.clone(),
                                line,
                                column,
                            });
                        }
                        let (content, end, exit) = self.state(
                            &target.state,
                            target.terminator.as_ref(),
                            pos + consumed,
                            depth + 1,
                        )?;
                        if end == pos {
                            let (line, column) = position(self.input, pos);
                            return Err(GrammarError::Stalled {
                                state: target.state.clone(),
                                line,
                                column,
                            });
                        }
                        if let Exit::EndOfInput = exit {
                            debug!("state {} reached end of input before closing", target.state);
                        }
                        if let Some(shape) = &rule.shape {
                            tokens.push(shape.build(&caps, content, self.grammar, self.tokenizer)?);
                        }
                        pos = end;
                    }
                    Transition::Stay => {
                        if consumed == 0 {
                            continue;
                        }
                        trace!("{}: match {:?}", name, rule.pattern);
                        if let Some(shape) = &rule.shape {
                            tokens.push(shape.build(&caps, vec![], self.grammar, self.tokenizer)?);
                        }
                        pos += consumed;
                    }
                }
                continue 'step;
            }

            let (line, column) = position(self.input, pos);
            return Err(GrammarError::Unmatched {
                state: name.to_string(),
                line,
                column,
                found: rest.chars().next().unwrap_or_default(),
            });
        }

        Ok((tokens, pos, Exit::EndOfInput))
    }
}
