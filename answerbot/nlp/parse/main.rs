//! Dependency-parse model and the parser collaborators that produce it.

/// Parser trait and the fixture/subprocess adapters.
pub mod parser;
/// Decoder for spaCy JSON documents.
pub mod spacy;
/// Token arena and sentence trees.
pub mod tree;

#[cfg(test)]
pub(crate) mod fixtures;

pub use parser::{CommandParser, DependencyParser, FixtureParser};
pub use spacy::{from_spacy_json, from_spacy_value};
pub use tree::{
    ParsedDocument, PartOfSpeech, RawToken, Sentence, Token, ROOT_LABEL, WH_DETERMINER_TAG,
};
