use serde::Serialize;

use crate::search::catalog::{CatalogFood, Matches, Source};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchPhase {
    #[default]
    Idle,
    Searching,
    Suggesting,
    NoMatches,
}

/// Captures the generation a search was started under. A resolution may only
/// be applied while its ticket is still the bucket's current generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchTicket {
    generation: u64,
}

/// Per-bucket search state: Idle -> Searching -> {Suggesting, NoMatches} ->
/// Idle. Each keystroke bumps a monotonic generation counter so the
/// resolution of a superseded keystroke is dropped instead of overwriting a
/// newer one.
#[derive(Debug, Default)]
pub struct BucketSearch {
    query: String,
    generation: u64,
    phase: SearchPhase,
    matches: Vec<CatalogFood>,
    source: Option<Source>,
}

impl BucketSearch {
    /// Registers a keystroke. A non-empty query moves to Searching and hands
    /// back a ticket for the eventual resolution; an empty query returns the
    /// bucket to Idle. Either way the generation advances, invalidating any
    /// in-flight resolution.
    pub fn begin(&mut self, query: &str) -> Option<SearchTicket> {
        self.generation += 1;
        if query.is_empty() {
            self.reset();
            return None;
        }
        self.query = query.to_string();
        self.phase = SearchPhase::Searching;
        Some(SearchTicket {
            generation: self.generation,
        })
    }

    pub fn is_current(&self, ticket: SearchTicket) -> bool {
        ticket.generation == self.generation
    }

    /// Stores a resolution if its ticket is still current. Results replace
    /// the previous list verbatim; they are never merged.
    pub fn apply(&mut self, ticket: SearchTicket, matches: Matches) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.phase = if matches.foods.is_empty() {
            SearchPhase::NoMatches
        } else {
            SearchPhase::Suggesting
        };
        self.matches = matches.foods;
        self.source = Some(matches.source);
        true
    }

    /// Takes the suggestion at `index`, returning the bucket to Idle. A
    /// no-op unless suggestions are showing and the index is in range.
    pub fn select(&mut self, index: usize) -> Option<CatalogFood> {
        if self.phase != SearchPhase::Suggesting {
            return None;
        }
        let food = self.matches.get(index)?.clone();
        self.reset();
        Some(food)
    }

    /// Takes the trimmed query for an ad-hoc entry, returning the bucket to
    /// Idle. Whitespace-only queries are a no-op.
    pub fn commit(&mut self) -> Option<String> {
        let name = self.query.trim();
        if name.is_empty() {
            return None;
        }
        let name = name.to_string();
        self.reset();
        Some(name)
    }

    pub fn phase(&self) -> SearchPhase {
        self.phase
    }

    pub fn matches(&self) -> &[CatalogFood] {
        &self.matches
    }

    pub fn source(&self) -> Option<Source> {
        self.source
    }

    // Generation survives a reset; it must stay monotonic for the lifetime
    // of the bucket.
    fn reset(&mut self) {
        self.query.clear();
        self.matches.clear();
        self.source = None;
        self.phase = SearchPhase::Idle;
    }
}
