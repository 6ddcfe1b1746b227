#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rust_2018_idioms,
    missing_docs
)]

//! Answerbot NLP runtime: turns questions into structured lookup queries.

/// Telemetry builder/hook for NLP components.
#[path = "../telemetry.rs"]
pub mod telemetry;

/// Library error taxonomy.
#[path = "../error.rs"]
pub mod error;

/// TOML configuration document.
#[path = "../config.rs"]
pub mod config;

/// Question text normalization.
#[path = "../question.rs"]
pub mod question;

/// Parse-tree model and parser adapters.
#[path = "../parse/main.rs"]
pub mod parse;

/// Dependency-tree reduction and sentence aggregation.
#[path = "../reduce/main.rs"]
pub mod reduce;

/// Query combination generator.
#[path = "../combination.rs"]
pub mod combination;

/// Page resolution interface and adapters.
#[path = "../resolver.rs"]
pub mod resolver;

/// Concurrent batch answering.
#[path = "../batch.rs"]
pub mod batch;

/// JSON-lines console command receiver.
#[path = "../consolecmdreciever.rs"]
pub mod console;

/// Runtime entry point wiring every stage.
#[path = "../main.rs"]
pub mod runtime;

pub use batch::{BundleOutcome, QuestionBatchController, QuestionBundle};
pub use combination::{combinations, Combination, Combinations, MAX_QUERY_LEN};
pub use config::AnswerBotConfig;
pub use console::{ConsoleCommand, ConsoleCommandReceiver};
pub use error::NlpError;
pub use parse::{
    from_spacy_json, CommandParser, DependencyParser, FixtureParser, ParsedDocument,
    PartOfSpeech, Sentence, Token,
};
pub use question::normalize_question;
pub use reduce::{
    DependencyTreeReducer, Disposition, DispositionTable, ParsedQuestion, Query,
    SentenceAggregator, Term,
};
pub use resolver::{CatalogResolver, NullResolver, PageRef, PageResolver};
pub use runtime::{combination_texts, AnswerBot, AnswerReport, QueryExpansion};
pub use telemetry::{NlpTelemetry, NlpTelemetryBuilder};
