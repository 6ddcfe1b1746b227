//! Page resolution hooks consuming generated combinations.

use anyhow::Result;
use async_trait::async_trait;
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::{combination::Combination, reduce::Term};

/// Reference to a page known to exist.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageRef {
    /// Page title as matched.
    pub title: String,
    /// Resolved location.
    pub url: String,
}

/// Turns candidate combinations into verified page references.
#[async_trait]
pub trait PageResolver: Send + Sync {
    /// Returns the pages that verify, or an empty vector.
    async fn select_pages(&self, candidates: &[Combination<Term>]) -> Result<Vec<PageRef>>;
}

/// Resolver that never finds anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullResolver;

#[async_trait]
impl PageResolver for NullResolver {
    async fn select_pages(&self, _candidates: &[Combination<Term>]) -> Result<Vec<PageRef>> {
        Ok(Vec::new())
    }
}

/// Verifies combination parts against an in-memory title catalogue.
///
/// A part matches when its terms joined by single spaces equal a catalogue
/// title, ignoring case.
#[derive(Debug, Clone, Default)]
pub struct CatalogResolver {
    pages: IndexMap<String, PageRef>,
}

impl CatalogResolver {
    /// Builds a catalogue from `(title, url)` pairs.
    #[must_use]
    pub fn new<I, S, U>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, U)>,
        S: Into<String>,
        U: Into<String>,
    {
        let pages = entries
            .into_iter()
            .map(|(title, url)| {
                let title = title.into();
                (
                    title.to_lowercase(),
                    PageRef {
                        title,
                        url: url.into(),
                    },
                )
            })
            .collect();
        Self { pages }
    }

    /// Number of catalogue entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Whether the catalogue is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    fn lookup(&self, part: &[Term]) -> Option<&PageRef> {
        let key = part
            .iter()
            .map(|term| term.text.to_lowercase())
            .collect::<Vec<_>>()
            .join(" ");
        self.pages.get(&key)
    }
}

#[async_trait]
impl PageResolver for CatalogResolver {
    async fn select_pages(&self, candidates: &[Combination<Term>]) -> Result<Vec<PageRef>> {
        let found: IndexSet<&PageRef> = candidates
            .iter()
            .flat_map(|combination| combination.parts().iter())
            .filter_map(|part| self.lookup(part))
            .collect();
        Ok(found.into_iter().cloned().collect())
    }
}
