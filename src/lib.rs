pub mod alias;
pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod grammar;
pub mod library;
pub mod pitch;
pub mod token;
pub mod track;

pub use alias::{AliasBuilder, TemplateAlias};
pub use api::{compile_grammar, tokenize_track};
pub use config::*;
pub use engine::{StackTokenizer, Tokenizer};
pub use error::*;
pub use grammar::Grammar;
pub use library::{ContextLibrary, LibraryLoader};
pub use pitch::PitchSyntax;
pub use token::*;
pub use track::TrackSyntax;
