use std::{
    fs,
    io::Write,
    path::Path,
    process::{Command, Stdio},
};

use anyhow::{Context, Result};
use indexmap::IndexMap;

use crate::{
    error::NlpError,
    parse::{spacy::from_spacy_json, tree::ParsedDocument},
};

/// External dependency parser producing one tree per sentence.
pub trait DependencyParser: Send + Sync {
    /// Parses already-normalized question text.
    fn parse(&self, text: &str) -> Result<ParsedDocument, NlpError>;
}

/// Serves pre-computed parses keyed by their exact text.
#[derive(Debug, Clone, Default)]
pub struct FixtureParser {
    documents: IndexMap<String, ParsedDocument>,
}

impl FixtureParser {
    /// Creates a parser over the given documents; later duplicates win.
    #[must_use]
    pub fn new(documents: impl IntoIterator<Item = ParsedDocument>) -> Self {
        Self {
            documents: documents
                .into_iter()
                .map(|doc| (doc.text.clone(), doc))
                .collect(),
        }
    }

    /// Loads a JSON-lines file with one spaCy document per line.
    pub fn load_jsonl(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading parse fixtures {}", path.display()))?;
        let documents = data
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(idx, line)| {
                from_spacy_json(line)
                    .with_context(|| format!("{}:{}", path.display(), idx + 1))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(documents))
    }

    /// Number of known documents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether no documents are loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl DependencyParser for FixtureParser {
    fn parse(&self, text: &str) -> Result<ParsedDocument, NlpError> {
        self.documents
            .get(text)
            .cloned()
            .ok_or_else(|| NlpError::UnknownFixture { text: text.into() })
    }
}

/// Runs an external program that reads text on stdin and prints one spaCy
/// JSON document on stdout.
#[derive(Debug, Clone)]
pub struct CommandParser {
    program: String,
    args: Vec<String>,
}

impl CommandParser {
    /// Creates a parser for `program args...`.
    #[must_use]
    pub fn new(program: impl Into<String>, args: impl IntoIterator<Item = String>) -> Self {
        Self {
            program: program.into(),
            args: args.into_iter().collect(),
        }
    }

    /// Builds a parser from an argv-style list; `None` when it is empty.
    #[must_use]
    pub fn from_argv(argv: &[String]) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(Self::new(program.clone(), args.iter().cloned()))
    }

    fn failure(&self, message: impl std::fmt::Display) -> NlpError {
        NlpError::ParserCommand {
            message: format!("{}: {message}", self.program),
        }
    }
}

impl DependencyParser for CommandParser {
    fn parse(&self, text: &str) -> Result<ParsedDocument, NlpError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| self.failure(err))?;
        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(text.as_bytes())
                .map_err(|err| self.failure(err))?;
        }
        let output = child.wait_with_output().map_err(|err| self.failure(err))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(self.failure(format!("{} {}", output.status, stderr.trim())));
        }
        let stdout = String::from_utf8(output.stdout).map_err(|err| self.failure(err))?;
        from_spacy_json(&stdout)
    }
}
