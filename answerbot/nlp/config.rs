use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use indexmap::IndexMap;
use serde::Deserialize;

use crate::reduce::{Disposition, DispositionTable};

/// Top-level answerbot configuration document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnswerBotConfig {
    /// Debug mode logs reducer traces; otherwise only warnings and errors.
    #[serde(default)]
    pub debug: bool,
    /// Log sinks.
    #[serde(default)]
    pub logging: LoggingSettings,
    /// Parser collaborator.
    #[serde(default)]
    pub parser: ParserSettings,
    /// Reducer tuning.
    #[serde(default)]
    pub reducer: ReducerSettings,
    /// Combination generation limits.
    #[serde(default)]
    pub combinations: CombinationSettings,
    /// Page resolution.
    #[serde(default)]
    pub resolver: ResolverSettings,
}

/// Where log records go.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingSettings {
    /// JSON-lines log file.
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Mirror records to stderr.
    #[serde(default)]
    pub console: bool,
}

/// Which parser adapter to use. `command` wins when both are set.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ParserSettings {
    /// JSON-lines file of pre-parsed spaCy documents.
    #[serde(default)]
    pub fixtures: Option<PathBuf>,
    /// Program and arguments of an external parser process.
    #[serde(default)]
    pub command: Option<Vec<String>>,
}

/// Reducer tuning.
#[derive(Debug, Clone, Deserialize)]
pub struct ReducerSettings {
    /// Warn on the first sighting of each dropped label.
    #[serde(default = "default_true")]
    pub warn_unknown_labels: bool,
    /// Per-label overrides applied on top of the stock table.
    #[serde(default)]
    pub dispositions: IndexMap<String, Disposition>,
}

impl Default for ReducerSettings {
    fn default() -> Self {
        Self {
            warn_unknown_labels: true,
            dispositions: IndexMap::new(),
        }
    }
}

impl ReducerSettings {
    /// Stock table with the configured overrides applied.
    #[must_use]
    pub fn table(&self) -> DispositionTable {
        DispositionTable::standard().with_overrides(&self.dispositions)
    }
}

/// Combination generation limits.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CombinationSettings {
    /// Keep at most this many combinations per query.
    #[serde(default)]
    pub max_per_query: Option<usize>,
}

/// Page resolution settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResolverSettings {
    /// Known page titles and their URLs. Empty means no resolution.
    #[serde(default)]
    pub catalogue: BTreeMap<String, String>,
}

impl AnswerBotConfig {
    /// Loads configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading answerbot config {}", path.display()))?;
        let mut config: Self =
            toml::from_str(&raw).with_context(|| format!("parsing {}", path.display()))?;
        let base = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        config.resolve_paths(&base);
        config.validate()?;
        Ok(config)
    }

    /// Checks invariants not expressible in the schema.
    pub fn validate(&self) -> Result<()> {
        if self.combinations.max_per_query == Some(0) {
            bail!("combinations.max_per_query must be positive");
        }
        if matches!(&self.parser.command, Some(argv) if argv.is_empty()) {
            bail!("parser.command must name a program");
        }
        Ok(())
    }

    fn resolve_paths(&mut self, base: &Path) {
        for path in [&mut self.logging.path, &mut self.parser.fixtures]
            .into_iter()
            .flatten()
        {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }
}

const fn default_true() -> bool {
    true
}
