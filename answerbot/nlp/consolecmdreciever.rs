//! Console command ingestion for the answerbot runtime.

use anyhow::{Context, Result};
use serde::Deserialize;
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt},
    sync::mpsc::UnboundedSender,
};

use crate::telemetry::NlpTelemetry;

/// Commands accepted from the console, one JSON object per line.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConsoleCommand {
    /// Decompose a natural-language question.
    Ask {
        /// Question payload.
        question: String,
    },
    /// Split a list of entries into every combination.
    Combinations {
        /// Entries to split.
        entries: Vec<String>,
    },
    /// Exit the loop.
    Quit,
}

/// Receives JSON line commands and forwards them to the runtime.
pub struct ConsoleCommandReceiver {
    sender: UnboundedSender<ConsoleCommand>,
    telemetry: Option<NlpTelemetry>,
}

impl ConsoleCommandReceiver {
    /// Creates a new receiver.
    #[must_use]
    pub fn new(sender: UnboundedSender<ConsoleCommand>, telemetry: Option<NlpTelemetry>) -> Self {
        Self { sender, telemetry }
    }

    /// Reads stdin until `Quit` or end of input.
    pub async fn run(&self) -> Result<()> {
        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        self.run_from(stdin).await
    }

    /// Reads commands from any line source until `Quit` or end of input.
    pub async fn run_from<R>(&self, reader: R) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            let cmd: ConsoleCommand =
                serde_json::from_str(&line).with_context(|| "invalid console command JSON")?;
            if matches!(cmd, ConsoleCommand::Quit) {
                break;
            }
            self.sender.send(cmd)?;
        }
        if let Some(tel) = &self.telemetry {
            let _ = tel.log(
                shared_logging::LogLevel::Info,
                "nlp.console.receiver_shutdown",
                serde_json::json!({}),
            );
        }
        Ok(())
    }
}
