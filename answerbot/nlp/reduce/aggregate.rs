use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::json;
use shared_logging::LogLevel;

use crate::{
    parse::{ParsedDocument, PartOfSpeech, Token},
    reduce::reducer::{render, DependencyTreeReducer},
    telemetry::NlpTelemetry,
};

/// Content token kept in a query.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Term {
    /// Position of the token in the parsed document.
    pub index: usize,
    /// Surface text.
    pub text: String,
    /// Coarse part of speech.
    pub pos: PartOfSpeech,
    /// Fine-grained tag.
    pub tag: String,
    /// Dependency label.
    pub dep: String,
}

impl From<&Token> for Term {
    fn from(token: &Token) -> Self {
        Self {
            index: token.index,
            text: token.text.clone(),
            pos: token.pos,
            tag: token.tag.clone(),
            dep: token.dep.clone(),
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Ordered content terms reduced from one sentence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    /// Index of the source sentence.
    pub sentence: usize,
    /// Terms in reduction order.
    pub terms: Vec<Term>,
}

impl Query {
    /// Surface texts of the terms.
    #[must_use]
    pub fn texts(&self) -> Vec<&str> {
        self.terms.iter().map(|t| t.text.as_str()).collect()
    }

    /// Whether the reduction kept nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.texts().join(", "))
    }
}

/// A question broken into one query per sentence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedQuestion {
    /// Normalized text handed to the parser.
    pub text: String,
    /// Queries in sentence order.
    pub queries: Vec<Query>,
}

/// Runs the reducer over every sentence of a parsed document.
pub struct SentenceAggregator<'r> {
    reducer: &'r DependencyTreeReducer,
    telemetry: Option<&'r NlpTelemetry>,
}

impl<'r> SentenceAggregator<'r> {
    /// Creates an aggregator borrowing the reducer.
    #[must_use]
    pub const fn new(
        reducer: &'r DependencyTreeReducer,
        telemetry: Option<&'r NlpTelemetry>,
    ) -> Self {
        Self { reducer, telemetry }
    }

    /// Reduces each sentence from its root, in document order.
    #[must_use]
    pub fn aggregate(&self, document: &ParsedDocument) -> ParsedQuestion {
        self.log(LogLevel::Info, 0, &format!("parsing question: {}", document.text));
        for sentence in &document.sentences {
            self.log(LogLevel::Debug, 1, &format!("tree:\n{}", sentence.render_tree()));
        }
        let queries = document
            .sentences
            .iter()
            .enumerate()
            .map(|(idx, sentence)| {
                self.log(LogLevel::Info, 1, &format!("parsing sentence: {}", sentence.text()));
                let reduced = self.reducer.reduce_sentence(sentence);
                self.log(LogLevel::Info, 1, &format!("<< {}", render(&reduced)));
                Query {
                    sentence: idx,
                    terms: reduced.into_iter().map(Term::from).collect(),
                }
            })
            .collect::<Vec<_>>();
        if let Some(tel) = self.telemetry {
            let _ = tel.log(
                LogLevel::Info,
                "nlp.question.parsed",
                json!({
                    "sentences": document.sentences.len(),
                    "queries": queries.iter().map(ToString::to_string).collect::<Vec<_>>(),
                }),
            );
        }
        ParsedQuestion {
            text: document.text.clone(),
            queries,
        }
    }

    fn log(&self, level: LogLevel, depth: usize, message: &str) {
        if let Some(tel) = self.telemetry {
            let _ = tel.log_nested(level, depth, message, json!({}));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::{fixtures, from_spacy_json, Sentence};

    #[test]
    fn one_query_per_sentence_in_order() {
        let reducer = DependencyTreeReducer::default();
        let document = ParsedDocument {
            text: "Who is Obama's Dad? What is the capital of France?".into(),
            sentences: vec![fixtures::who_is_obamas_dad(), fixtures::capital_of_france()],
        };
        let parsed = SentenceAggregator::new(&reducer, None).aggregate(&document);
        assert_eq!(parsed.queries.len(), 2);
        assert_eq!(parsed.queries[0].texts(), vec!["Who", "Obama", "Dad"]);
        assert_eq!(parsed.queries[1].sentence, 1);
        assert_eq!(parsed.queries[1].to_string(), "[What, France, capital]");
    }

    #[test]
    fn terms_keep_document_positions() {
        let reducer = DependencyTreeReducer::default();
        let document = from_spacy_json(fixtures::WHO_IS_OBAMAS_DAD_JSON).unwrap();
        let parsed = SentenceAggregator::new(&reducer, None).aggregate(&document);
        let indices: Vec<_> = parsed.queries[0].terms.iter().map(|t| t.index).collect();
        assert_eq!(indices, vec![0, 2, 4]);
        assert_eq!(parsed.queries[0].terms[2].dep, "nsubj");
    }

    #[test]
    fn empty_reduction_still_yields_a_query() {
        let reducer = DependencyTreeReducer::default();
        let lone_mark = Sentence::from_heads(
            vec![crate::parse::RawToken::new("?", PartOfSpeech::Punct, ".", "punct", 0)],
            0,
        )
        .unwrap();
        let document = ParsedDocument {
            text: "?".into(),
            sentences: vec![lone_mark],
        };
        let parsed = SentenceAggregator::new(&reducer, None).aggregate(&document);
        assert_eq!(parsed.queries.len(), 1);
        assert!(parsed.queries[0].is_empty());
    }
}
