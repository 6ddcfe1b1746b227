use std::collections::BTreeSet;

use parking_lot::Mutex;
use serde_json::json;
use shared_logging::LogLevel;

use crate::{
    parse::{Sentence, Token, WH_DETERMINER_TAG},
    reduce::disposition::{Disposition, DispositionTable, Placement},
    telemetry::NlpTelemetry,
};

/// Label of direct objects, which get a rule of their own.
pub const DIRECT_OBJECT: &str = "dobj";

/// Collapses a dependency tree into the ordered tokens that carry content.
///
/// For every head the output is: "before" children in child order, then the
/// head itself (unless skipped, a verb/adposition, or ignorable), then
/// "after" children in child order.
#[derive(Debug)]
pub struct DependencyTreeReducer {
    table: DispositionTable,
    warn_unknown: bool,
    dropped: Mutex<BTreeSet<String>>,
    telemetry: Option<NlpTelemetry>,
}

impl DependencyTreeReducer {
    /// Creates a reducer over the given label table.
    #[must_use]
    pub fn new(table: DispositionTable, telemetry: Option<NlpTelemetry>) -> Self {
        Self {
            table,
            warn_unknown: true,
            dropped: Mutex::new(BTreeSet::new()),
            telemetry,
        }
    }

    /// Enables or disables the first-sighting warning for dropped labels.
    #[must_use]
    pub const fn warn_unknown_labels(mut self, enabled: bool) -> Self {
        self.warn_unknown = enabled;
        self
    }

    /// Label table in use.
    #[must_use]
    pub const fn table(&self) -> &DispositionTable {
        &self.table
    }

    /// Labels that fell to the silent-drop default so far, sorted.
    #[must_use]
    pub fn dropped_labels(&self) -> Vec<String> {
        self.dropped.lock().iter().cloned().collect()
    }

    /// Reduces the whole sentence from its root.
    #[must_use]
    pub fn reduce_sentence<'s>(&self, sentence: &'s Sentence) -> Vec<&'s Token> {
        self.reduce(sentence, sentence.root(), false)
    }

    /// Reduces the subtree rooted at the sentence-local index `root`.
    ///
    /// # Panics
    ///
    /// Panics if `root` is not a token of `sentence`.
    #[must_use]
    pub fn reduce<'s>(&self, sentence: &'s Sentence, root: usize, skip_root: bool) -> Vec<&'s Token> {
        self.reduce_at(sentence, root, skip_root, 0)
    }

    fn reduce_at<'s>(
        &self,
        sentence: &'s Sentence,
        idx: usize,
        skip_root: bool,
        depth: usize,
    ) -> Vec<&'s Token> {
        let head = &sentence.tokens()[idx];
        self.trace(depth, || format!("reducing: {head}"));

        let mut after = Vec::new();
        let mut reduced = Vec::new();
        for (child_idx, child) in sentence.children(idx) {
            match self.treatment(child, depth) {
                Some((Placement::Before, skip)) => {
                    reduced.extend(self.reduce_at(sentence, child_idx, skip, depth + 1));
                }
                Some((Placement::After, skip)) => after.push((child_idx, skip)),
                None => {}
            }
        }

        if !skip_root
            && !head.pos.is_structural()
            && self.table.disposition(&head.dep) != Disposition::Ignore
        {
            reduced.push(head);
        }

        for (child_idx, skip) in after {
            reduced.extend(self.reduce_at(sentence, child_idx, skip, depth + 1));
        }

        self.trace(depth, || format!("<< {}", render(&reduced)));
        reduced
    }

    fn treatment(&self, child: &Token, depth: usize) -> Option<(Placement, bool)> {
        let disposition = self.table.disposition(&child.dep);
        if disposition == Disposition::SilentDrop {
            if child.dep == DIRECT_OBJECT {
                return Some((Placement::Before, child.tag == WH_DETERMINER_TAG));
            }
            self.note_dropped(child, depth);
        }
        disposition.recursion()
    }

    fn note_dropped(&self, child: &Token, depth: usize) {
        let first_sighting = self.dropped.lock().insert(child.dep.clone());
        if !(first_sighting && self.warn_unknown) {
            return;
        }
        if let Some(tel) = &self.telemetry {
            let _ = tel.log_nested(
                LogLevel::Warn,
                depth,
                "nlp.reducer.unknown_label",
                json!({ "label": child.dep, "token": child.text }),
            );
        }
    }

    fn trace(&self, depth: usize, message: impl FnOnce() -> String) {
        if let Some(tel) = &self.telemetry {
            if tel.enabled(LogLevel::Debug) {
                let _ = tel.log_nested(LogLevel::Debug, depth, &message(), json!({}));
            }
        }
    }
}

impl Default for DependencyTreeReducer {
    fn default() -> Self {
        Self::new(DispositionTable::standard(), None)
    }
}

/// `[a, b, c]` rendering of a token sequence.
pub(crate) fn render(tokens: &[&Token]) -> String {
    let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
    format!("[{}]", texts.join(", "))
}
