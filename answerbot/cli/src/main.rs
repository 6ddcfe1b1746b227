use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use answerbot_nlp::{
    combinations, from_spacy_json, AnswerBot, AnswerBotConfig, ConsoleCommand,
    ConsoleCommandReceiver, DependencyTreeReducer, Disposition, DispositionTable, NlpTelemetry,
    QuestionBatchController, QuestionBundle, SentenceAggregator,
};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use tokio::{runtime::Runtime, sync::mpsc::unbounded_channel};

#[derive(Parser, Debug)]
#[command(
    name = "answerbot",
    version,
    about = "Breaks natural-language questions into lookup queries"
)]
struct Cli {
    /// TOML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Prints the normalized form of a question.
    Normalize { text: String },
    /// Reduces a spaCy JSON document to one query per sentence.
    Reduce {
        #[arg(long)]
        doc: PathBuf,
        /// Print the reducer trace to stderr.
        #[arg(long)]
        debug: bool,
    },
    /// Prints every way of grouping the given entries.
    Combos { entries: Vec<String> },
    /// Decomposes a question and resolves pages.
    Ask { question: String },
    /// Shows the dependency label table in effect.
    Labels,
    /// Reads JSON-line commands from stdin.
    Console,
    /// Answers every question in a file, one per line.
    Batch { file: PathBuf },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Normalize { text } => {
            println!("{}", answerbot_nlp::normalize_question(&text));
            Ok(())
        }
        Commands::Reduce { doc, debug } => handle_reduce(cli.config.as_deref(), &doc, debug),
        Commands::Combos { entries } => {
            println!("{}", serde_json::to_string_pretty(&combos_json(&entries)?)?);
            Ok(())
        }
        Commands::Ask { question } => {
            let bot = load_bot(cli.config.as_deref())?;
            let report = Runtime::new()?.block_on(bot.answer(&question))?;
            println!("{}", serde_json::to_string_pretty(&report.summary())?);
            Ok(())
        }
        Commands::Labels => {
            let config = load_config(cli.config.as_deref())?;
            print!("{}", render_labels(&config.reducer.table()));
            Ok(())
        }
        Commands::Console => handle_console(cli.config.as_deref()),
        Commands::Batch { file } => handle_batch(cli.config.as_deref(), &file),
    }
}

fn load_config(path: Option<&Path>) -> Result<AnswerBotConfig> {
    path.map_or_else(|| Ok(AnswerBotConfig::default()), |p| AnswerBotConfig::load(p))
}

fn load_bot(path: Option<&Path>) -> Result<AnswerBot> {
    let config = load_config(path)?;
    AnswerBot::from_config(&config)
}

fn handle_reduce(config: Option<&Path>, doc: &Path, debug: bool) -> Result<()> {
    let config = load_config(config)?;
    let raw = fs::read_to_string(doc).with_context(|| format!("reading {}", doc.display()))?;
    let document = from_spacy_json(&raw).with_context(|| format!("decoding {}", doc.display()))?;
    let telemetry = NlpTelemetry::builder("nlp")
        .debug(debug || config.debug)
        .console(true)
        .build()?;
    let reducer = DependencyTreeReducer::new(config.reducer.table(), Some(telemetry.clone()))
        .warn_unknown_labels(config.reducer.warn_unknown_labels);
    let parsed = SentenceAggregator::new(&reducer, Some(&telemetry)).aggregate(&document);
    println!("{}", serde_json::to_string_pretty(&parsed)?);
    Ok(())
}

fn combos_json(entries: &[String]) -> Result<Value> {
    let combos: Vec<_> = combinations(entries)?.collect();
    Ok(json!(combos))
}

fn render_labels(table: &DispositionTable) -> String {
    let mut out = String::new();
    for disposition in Disposition::ALL {
        if disposition == Disposition::SilentDrop {
            continue;
        }
        let labels: Vec<_> = table.labels_for(disposition).collect();
        let listed = if labels.is_empty() {
            "(none)".to_string()
        } else {
            labels.join(", ")
        };
        out.push_str(&format!("{disposition}: {listed}\n"));
    }
    out.push_str("silent_drop: every other label (dobj: before, root dropped when WDT)\n");
    out
}

fn handle_console(config: Option<&Path>) -> Result<()> {
    let bot = load_bot(config)?;
    let runtime = Runtime::new()?;
    runtime.block_on(async move {
        let (tx, mut rx) = unbounded_channel();
        let receiver = ConsoleCommandReceiver::new(tx, None);
        let reader = tokio::spawn(async move { receiver.run().await });
        while let Some(cmd) = rx.recv().await {
            let line = match cmd {
                ConsoleCommand::Ask { question } => match bot.answer(&question).await {
                    Ok(report) => report.summary(),
                    Err(err) => json!({ "error": format!("{err:#}") }),
                },
                ConsoleCommand::Combinations { entries } => combos_json(&entries)
                    .unwrap_or_else(|err| json!({ "error": format!("{err:#}") })),
                ConsoleCommand::Quit => break,
            };
            println!("{line}");
        }
        reader.await?
    })
}

fn handle_batch(config: Option<&Path>, file: &Path) -> Result<()> {
    let bot = Arc::new(load_bot(config)?);
    let questions =
        fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?;
    let bundles: Vec<_> = questions
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(QuestionBundle::new)
        .collect();
    let controller = QuestionBatchController::new(bot, None);
    let outcomes = Runtime::new()?.block_on(controller.process_batch(bundles))?;
    for outcome in outcomes {
        let line = match outcome.report {
            Ok(report) => json!({ "correlation_id": outcome.correlation_id, "report": report.summary() }),
            Err(err) => json!({ "correlation_id": outcome.correlation_id, "error": format!("{err:#}") }),
        };
        println!("{line}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn combos_json_lists_every_grouping() {
        let entries = vec!["apple".to_string(), "banana".to_string()];
        let value = combos_json(&entries).unwrap();
        assert_eq!(value, json!([[["apple", "banana"]], [["apple"], ["banana"]]]));
        assert!(combos_json(&[]).is_err());
    }

    #[test]
    fn labels_listing_shows_empty_class() {
        let listing = render_labels(&DispositionTable::standard());
        assert!(listing.contains("ignore: case, punct, det, auxpass\n"));
        assert!(listing.contains("append_skip: (none)\n"));
    }
}
