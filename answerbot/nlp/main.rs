use std::sync::Arc;

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use shared_logging::LogLevel;
use uuid::Uuid;

use crate::{
    combination::{combinations, Combination},
    config::AnswerBotConfig,
    error::NlpError,
    parse::{CommandParser, DependencyParser, FixtureParser, ParsedDocument},
    question::normalize_question,
    reduce::{DependencyTreeReducer, ParsedQuestion, Query, SentenceAggregator, Term},
    resolver::{CatalogResolver, NullResolver, PageRef, PageResolver},
    telemetry::NlpTelemetry,
};

/// Combinations generated for one query, or why there are none.
#[derive(Debug, Clone)]
pub struct QueryExpansion {
    /// The query that was expanded.
    pub query: Query,
    /// Its combinations, capped by the configured limit.
    pub combinations: Result<Vec<Combination<Term>>, NlpError>,
}

/// Everything produced for one question.
#[derive(Debug, Clone)]
pub struct AnswerReport {
    /// Report id.
    pub id: Uuid,
    /// Normalized text and its queries.
    pub question: ParsedQuestion,
    /// One expansion per query, in query order.
    pub expansions: Vec<QueryExpansion>,
    /// Verified pages.
    pub pages: Vec<PageRef>,
    /// Completion time.
    pub answered_at: DateTime<Utc>,
}

impl AnswerReport {
    /// Compact JSON view: term texts instead of full terms.
    #[must_use]
    pub fn summary(&self) -> Value {
        let queries: Vec<Value> = self
            .expansions
            .iter()
            .map(|expansion| {
                let mut entry = json!({
                    "sentence": expansion.query.sentence,
                    "terms": expansion.query.texts(),
                });
                match &expansion.combinations {
                    Ok(combos) => {
                        entry["combinations"] = combos.iter().map(combination_texts).collect();
                    }
                    Err(err) => entry["error"] = json!(err.to_string()),
                }
                entry
            })
            .collect();
        json!({
            "id": self.id,
            "question": self.question.text,
            "queries": queries,
            "pages": self.pages,
            "answered_at": self.answered_at,
        })
    }
}

/// Nested text lists for one combination.
#[must_use]
pub fn combination_texts(combination: &Combination<Term>) -> Value {
    combination
        .parts()
        .iter()
        .map(|part| part.iter().map(|term| term.text.as_str()).collect::<Vec<_>>())
        .collect()
}

/// Question decomposition runtime: normalize, parse, reduce, expand, resolve.
pub struct AnswerBot {
    parser: Arc<dyn DependencyParser>,
    reducer: DependencyTreeReducer,
    resolver: Arc<dyn PageResolver>,
    telemetry: Option<NlpTelemetry>,
    max_combinations: Option<usize>,
}

impl AnswerBot {
    /// Creates a runtime with the stock label table and no page resolution.
    #[must_use]
    pub fn new(parser: Arc<dyn DependencyParser>, telemetry: Option<NlpTelemetry>) -> Self {
        let reducer = DependencyTreeReducer::new(Default::default(), telemetry.clone());
        Self {
            parser,
            reducer,
            resolver: Arc::new(NullResolver),
            telemetry,
            max_combinations: None,
        }
    }

    /// Wires parser, reducer, resolver and telemetry from configuration.
    pub fn from_config(config: &AnswerBotConfig) -> Result<Self> {
        let mut builder = NlpTelemetry::builder("nlp")
            .debug(config.debug)
            .console(config.logging.console);
        if let Some(path) = &config.logging.path {
            builder = builder.log_path(path);
        }
        let telemetry = builder.build()?;

        let parser: Arc<dyn DependencyParser> =
            match (&config.parser.command, &config.parser.fixtures) {
                (Some(argv), _) => match CommandParser::from_argv(argv) {
                    Some(parser) => Arc::new(parser),
                    None => bail!("parser.command must name a program"),
                },
                (None, Some(path)) => Arc::new(FixtureParser::load_jsonl(path)?),
                (None, None) => bail!("no parser configured: set parser.command or parser.fixtures"),
            };
        let reducer = DependencyTreeReducer::new(config.reducer.table(), Some(telemetry.clone()))
            .warn_unknown_labels(config.reducer.warn_unknown_labels);
        let resolver: Arc<dyn PageResolver> = if config.resolver.catalogue.is_empty() {
            Arc::new(NullResolver)
        } else {
            Arc::new(CatalogResolver::new(config.resolver.catalogue.clone()))
        };
        Ok(Self {
            parser,
            reducer,
            resolver,
            telemetry: Some(telemetry),
            max_combinations: config.combinations.max_per_query,
        })
    }

    /// Replaces the reducer.
    #[must_use]
    pub fn with_reducer(mut self, reducer: DependencyTreeReducer) -> Self {
        self.reducer = reducer;
        self
    }

    /// Replaces the page resolver.
    #[must_use]
    pub fn with_resolver(mut self, resolver: Arc<dyn PageResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Caps the number of combinations kept per query.
    #[must_use]
    pub const fn with_max_combinations(mut self, limit: Option<usize>) -> Self {
        self.max_combinations = limit;
        self
    }

    /// Reducer in use.
    #[must_use]
    pub const fn reducer(&self) -> &DependencyTreeReducer {
        &self.reducer
    }

    /// Normalizes, parses and reduces a question into one query per sentence.
    pub fn parse_question(&self, text: &str) -> Result<ParsedQuestion> {
        let normalized = normalize_question(text);
        let document = self.parser.parse(&normalized)?;
        Ok(self.parse_document(&document))
    }

    /// Reduces an already-parsed document.
    #[must_use]
    pub fn parse_document(&self, document: &ParsedDocument) -> ParsedQuestion {
        SentenceAggregator::new(&self.reducer, self.telemetry.as_ref()).aggregate(document)
    }

    /// Combinations of one query, capped by the configured limit.
    pub fn query_combinations(&self, query: &Query) -> Result<Vec<Combination<Term>>, NlpError> {
        let limit = self.max_combinations.unwrap_or(usize::MAX);
        Ok(combinations(&query.terms)?.take(limit).collect())
    }

    /// Expands every query; a failing query does not stop its siblings.
    #[must_use]
    pub fn expand(&self, question: &ParsedQuestion) -> Vec<QueryExpansion> {
        question
            .queries
            .iter()
            .map(|query| {
                let combinations = self.query_combinations(query);
                if let Err(err) = &combinations {
                    self.log(
                        LogLevel::Warn,
                        "nlp.query.skipped",
                        json!({ "sentence": query.sentence, "error": err.to_string() }),
                    );
                }
                QueryExpansion {
                    query: query.clone(),
                    combinations,
                }
            })
            .collect()
    }

    /// Hands every successful combination to the resolver.
    pub async fn select_pages(&self, expansions: &[QueryExpansion]) -> Result<Vec<PageRef>> {
        let candidates: Vec<Combination<Term>> = expansions
            .iter()
            .filter_map(|expansion| expansion.combinations.as_ref().ok())
            .flatten()
            .cloned()
            .collect();
        self.resolver.select_pages(&candidates).await
    }

    /// Full flow for one question.
    pub async fn answer(&self, text: &str) -> Result<AnswerReport> {
        let question = self.parse_question(text)?;
        let expansions = self.expand(&question);
        let pages = self.select_pages(&expansions).await?;
        self.log(
            LogLevel::Info,
            "nlp.answer.resolved",
            json!({ "question": question.text, "pages": pages.len() }),
        );
        Ok(AnswerReport {
            id: Uuid::new_v4(),
            question,
            expansions,
            pages,
            answered_at: Utc::now(),
        })
    }

    fn log(&self, level: LogLevel, message: &str, metadata: Value) {
        if let Some(tel) = &self.telemetry {
            let _ = tel.log(level, message, metadata);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::parse::{fixtures, from_spacy_json, PartOfSpeech, RawToken, Sentence};
    use tempfile::tempdir;

    fn obama_bot() -> AnswerBot {
        let doc = from_spacy_json(fixtures::WHO_IS_OBAMAS_DAD_JSON).unwrap();
        AnswerBot::new(Arc::new(FixtureParser::new([doc])), None)
    }

    #[test]
    fn parse_question_normalizes_before_parsing() {
        let parsed = obama_bot().parse_question("Who is Obama's Dad").unwrap();
        assert_eq!(parsed.text, "Who is Obama's Dad?");
        assert_eq!(parsed.queries.len(), 1);
        assert_eq!(parsed.queries[0].texts(), vec!["Who", "Obama", "Dad"]);
    }

    #[test]
    fn unknown_question_surfaces_parser_error() {
        let err = obama_bot().parse_question("Where was Obama born").unwrap_err();
        assert!(err.to_string().contains("Where was Obama born?"));
    }

    #[test]
    fn expansion_isolates_empty_queries() {
        let text = normalize_question("hm. who is Obama's Dad");
        let lone_mark = Sentence::from_heads(
            vec![RawToken::new("Hm.", PartOfSpeech::Intj, "UH", "punct", 0)],
            0,
        )
        .unwrap();
        let document = ParsedDocument {
            text: text.clone(),
            sentences: vec![lone_mark, fixtures::who_is_obamas_dad()],
        };
        let bot = AnswerBot::new(Arc::new(FixtureParser::new([document])), None);
        let parsed = bot.parse_question("hm. who is Obama's Dad").unwrap();
        let expansions = bot.expand(&parsed);
        assert_eq!(expansions.len(), 2);
        assert_eq!(expansions[0].combinations, Err(NlpError::EmptyQuery));
        assert_eq!(expansions[1].combinations.as_ref().unwrap().len(), 4);
    }

    #[test]
    fn combination_cap_is_applied() {
        let bot = obama_bot().with_max_combinations(Some(2));
        let parsed = bot.parse_question("Who is Obama's Dad").unwrap();
        assert_eq!(bot.query_combinations(&parsed.queries[0]).unwrap().len(), 2);
    }

    #[tokio::test]
    async fn answer_resolves_pages_from_catalogue() {
        let bot = obama_bot().with_resolver(Arc::new(CatalogResolver::new([(
            "Obama Dad",
            "https://en.wikipedia.org/wiki/Barack_Obama_Sr.",
        )])));
        let report = bot.answer("who is Obama's Dad.").await.unwrap();
        assert_eq!(report.question.text, "Who is Obama's Dad?");
        assert_eq!(report.pages.len(), 1);
        assert_eq!(report.pages[0].title, "Obama Dad");

        let summary = report.summary();
        assert_eq!(summary["queries"][0]["terms"], json!(["Who", "Obama", "Dad"]));
        assert_eq!(
            summary["queries"][0]["combinations"][0],
            json!([["Who", "Obama", "Dad"]])
        );
    }

    #[tokio::test]
    async fn from_config_wires_fixture_parser_and_catalogue() {
        let dir = tempdir().unwrap();
        let fixture_line = serde_json::to_string(
            &serde_json::from_str::<Value>(fixtures::WHO_IS_OBAMAS_DAD_JSON).unwrap(),
        )
        .unwrap();
        fs::write(dir.path().join("fixtures.jsonl"), fixture_line).unwrap();
        let config_path = dir.path().join("answerbot.toml");
        fs::write(
            &config_path,
            r#"
[logging]
path = "logs/nlp.jsonl"

[parser]
fixtures = "fixtures.jsonl"

[combinations]
max_per_query = 3

[resolver.catalogue]
"Dad" = "https://en.wikipedia.org/wiki/Father"
"#,
        )
        .unwrap();
        let config = AnswerBotConfig::load(&config_path).unwrap();
        let bot = AnswerBot::from_config(&config).unwrap();
        let report = bot.answer("Who is Obama's Dad").await.unwrap();
        assert_eq!(report.expansions[0].combinations.as_ref().unwrap().len(), 3);
        assert_eq!(report.pages[0].url, "https://en.wikipedia.org/wiki/Father");
    }

    #[test]
    fn from_config_requires_a_parser() {
        let err = AnswerBot::from_config(&AnswerBotConfig::default()).err().unwrap();
        assert!(err.to_string().contains("no parser configured"));
    }
}
