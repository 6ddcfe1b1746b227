use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// What the reducer does with a child reached through a given label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Disposition {
    /// Drop the child and its subtree.
    Ignore,
    /// Reduce the child, root included, before the head.
    PrependSelf,
    /// Reduce only the child's descendants, before the head.
    PrependSkip,
    /// Reduce the child, root included, after the head.
    AppendSelf,
    /// Reduce only the child's descendants, after the head.
    AppendSkip,
    /// Label not in the table: dropped.
    SilentDrop,
}

/// Where a recursed child lands relative to its head.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Before the head's own contribution.
    Before,
    /// After the head's own contribution.
    After,
}

impl Disposition {
    /// All dispositions in table order.
    pub const ALL: [Self; 6] = [
        Self::Ignore,
        Self::PrependSelf,
        Self::PrependSkip,
        Self::AppendSelf,
        Self::AppendSkip,
        Self::SilentDrop,
    ];

    /// Placement and whether the child's own root is skipped, for recursing
    /// dispositions.
    #[must_use]
    pub const fn recursion(self) -> Option<(Placement, bool)> {
        match self {
            Self::PrependSelf => Some((Placement::Before, false)),
            Self::PrependSkip => Some((Placement::Before, true)),
            Self::AppendSelf => Some((Placement::After, false)),
            Self::AppendSkip => Some((Placement::After, true)),
            Self::Ignore | Self::SilentDrop => None,
        }
    }

    /// Config spelling.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Ignore => "ignore",
            Self::PrependSelf => "prepend_self",
            Self::PrependSkip => "prepend_skip",
            Self::AppendSelf => "append_self",
            Self::AppendSkip => "append_skip",
            Self::SilentDrop => "silent_drop",
        }
    }
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

const IGNORE: &[&str] = &["case", "punct", "det", "auxpass"];
const PREPEND_SELF: &[&str] = &["nsubj", "poss", "acl", "advcl", "relcl", "compound", "attr"];
const PREPEND_SKIP: &[&str] = &["prep", "agent"];
const APPEND_SELF: &[&str] = &[
    "pobj",
    "amod",
    "nsubjpass",
    "pcomp",
    "acomp",
    "oprd",
    "appos",
];
const APPEND_SKIP: &[&str] = &[];

/// Ordered mapping from dependency label to disposition.
///
/// Labels are matched exactly; anything absent is [`Disposition::SilentDrop`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispositionTable {
    labels: IndexMap<String, Disposition>,
}

impl DispositionTable {
    /// The stock English label table.
    #[must_use]
    pub fn standard() -> Self {
        let classes = [
            (IGNORE, Disposition::Ignore),
            (PREPEND_SELF, Disposition::PrependSelf),
            (PREPEND_SKIP, Disposition::PrependSkip),
            (APPEND_SELF, Disposition::AppendSelf),
            (APPEND_SKIP, Disposition::AppendSkip),
        ];
        let labels = classes
            .iter()
            .flat_map(|(labels, disposition)| {
                labels.iter().map(move |label| ((*label).to_string(), *disposition))
            })
            .collect();
        Self { labels }
    }

    /// A table with no entries; every label falls to the default.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            labels: IndexMap::new(),
        }
    }

    /// Sets the disposition for one label. Assigning `SilentDrop` removes it.
    pub fn set(&mut self, label: impl Into<String>, disposition: Disposition) {
        let label = label.into();
        if disposition == Disposition::SilentDrop {
            self.labels.shift_remove(&label);
        } else {
            self.labels.insert(label, disposition);
        }
    }

    /// Returns a copy with the overrides applied in order.
    #[must_use]
    pub fn with_overrides<'a>(
        mut self,
        overrides: impl IntoIterator<Item = (&'a String, &'a Disposition)>,
    ) -> Self {
        for (label, disposition) in overrides {
            self.set(label.clone(), *disposition);
        }
        self
    }

    /// Disposition for `label`.
    #[must_use]
    pub fn disposition(&self, label: &str) -> Disposition {
        self.labels
            .get(label)
            .copied()
            .unwrap_or(Disposition::SilentDrop)
    }

    /// Whether `label` is in the table.
    #[must_use]
    pub fn contains(&self, label: &str) -> bool {
        self.labels.contains_key(label)
    }

    /// Labels assigned to `disposition`, in insertion order.
    pub fn labels_for(&self, disposition: Disposition) -> impl Iterator<Item = &str> + '_ {
        self.labels
            .iter()
            .filter(move |(_, d)| **d == disposition)
            .map(|(label, _)| label.as_str())
    }

    /// Every entry in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Disposition)> + '_ {
        self.labels.iter().map(|(label, d)| (label.as_str(), *d))
    }
}

impl Default for DispositionTable {
    fn default() -> Self {
        Self::standard()
    }
}
