use std::sync::Arc;

use anyhow::Result;
use serde_json::json;
use shared_logging::LogLevel;
use uuid::Uuid;

use crate::{
    runtime::{AnswerBot, AnswerReport},
    telemetry::NlpTelemetry,
};

/// A question and the id used to correlate its logs.
#[derive(Debug, Clone)]
pub struct QuestionBundle {
    /// Raw question text.
    pub question: String,
    /// Correlation id for tracing.
    pub correlation_id: String,
}

impl QuestionBundle {
    /// Wraps a question with a fresh correlation id.
    #[must_use]
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            correlation_id: format!("q-{}", Uuid::new_v4()),
        }
    }
}

/// Outcome for one bundle of a batch.
#[derive(Debug)]
pub struct BundleOutcome {
    /// Correlation id of the bundle.
    pub correlation_id: String,
    /// The report, or the error that stopped this question.
    pub report: Result<AnswerReport>,
}

/// Answers batches of questions concurrently.
pub struct QuestionBatchController {
    bot: Arc<AnswerBot>,
    telemetry: Option<NlpTelemetry>,
}

impl QuestionBatchController {
    /// Creates a new controller.
    #[must_use]
    pub fn new(bot: Arc<AnswerBot>, telemetry: Option<NlpTelemetry>) -> Self {
        Self { bot, telemetry }
    }

    /// Parses every bundle on the blocking pool, then resolves pages.
    /// Outcomes keep submission order.
    pub async fn process_batch(&self, bundles: Vec<QuestionBundle>) -> Result<Vec<BundleOutcome>> {
        self.log("nlp.batch.start", bundles.len());
        let tasks: Vec<_> = bundles
            .into_iter()
            .map(|bundle| {
                let bot = Arc::clone(&self.bot);
                let tel = self.telemetry.clone();
                tokio::task::spawn_blocking(move || {
                    if let Some(t) = tel {
                        let _ = t.log(
                            LogLevel::Debug,
                            "nlp.batch.question",
                            json!({ "correlation_id": bundle.correlation_id }),
                        );
                    }
                    let parsed = bot.parse_question(&bundle.question).map(|question| {
                        let expansions = bot.expand(&question);
                        (question, expansions)
                    });
                    (bundle.correlation_id, parsed)
                })
            })
            .collect();

        let parsed = futures::future::try_join_all(tasks).await?;
        let resolutions = parsed.into_iter().map(|(correlation_id, parsed)| {
            let bot = Arc::clone(&self.bot);
            async move {
                let report = match parsed {
                    Ok((question, expansions)) => {
                        let pages = bot.select_pages(&expansions).await;
                        pages.map(|pages| AnswerReport {
                            id: Uuid::new_v4(),
                            question,
                            expansions,
                            pages,
                            answered_at: chrono::Utc::now(),
                        })
                    }
                    Err(err) => Err(err),
                };
                BundleOutcome {
                    correlation_id,
                    report,
                }
            }
        });
        let outcomes = futures::future::join_all(resolutions).await;
        self.log("nlp.batch.complete", outcomes.len());
        Ok(outcomes)
    }

    fn log(&self, message: &str, count: usize) {
        if let Some(tel) = &self.telemetry {
            let _ = tel.log(LogLevel::Info, message, json!({ "count": count }));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::{fixtures, from_spacy_json, FixtureParser};

    #[tokio::test]
    async fn batch_keeps_order_and_isolates_failures() {
        let doc = from_spacy_json(fixtures::WHO_IS_OBAMAS_DAD_JSON).unwrap();
        let bot = Arc::new(AnswerBot::new(Arc::new(FixtureParser::new([doc])), None));
        let controller = QuestionBatchController::new(bot, None);
        let bundles = vec![
            QuestionBundle::new("Who is Obama's Dad"),
            QuestionBundle::new("Where was Obama born"),
            QuestionBundle::new("who is Obama's Dad."),
        ];
        let ids: Vec<_> = bundles.iter().map(|b| b.correlation_id.clone()).collect();
        let outcomes = controller.process_batch(bundles).await.unwrap();
        assert_eq!(
            outcomes.iter().map(|o| o.correlation_id.clone()).collect::<Vec<_>>(),
            ids
        );
        assert!(outcomes[0].report.is_ok());
        assert!(outcomes[1].report.is_err());
        let third = outcomes[2].report.as_ref().unwrap();
        assert_eq!(third.question.queries[0].texts(), vec!["Who", "Obama", "Dad"]);
    }

    #[tokio::test]
    async fn empty_batch_is_fine() {
        let bot = Arc::new(AnswerBot::new(Arc::new(FixtureParser::default()), None));
        let outcomes = QuestionBatchController::new(bot, None)
            .process_batch(Vec::new())
            .await
            .unwrap();
        assert!(outcomes.is_empty());
    }
}
