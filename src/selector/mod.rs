//! Substitution Selector
//!
//! Picks which dictionary matches of a document get replaced.
//!
//! Algorithm:
//! 1. eligible = matches with an entry whose lowercase word is not excluded
//! 2. target = floor(|eligible| * density), density clamped to [0, 1]
//! 3. unbiased partial Fisher-Yates shuffle, take the first `target` items
//!
//! The random source is injected so runs are reproducible under a fixed seed.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::types::CandidateMatch;

#[derive(Debug, Clone, Default)]
pub struct SubstitutionSelector {
    density: f64,
    exclude_words: HashSet<String>,
}

impl SubstitutionSelector {
    /// `exclude_words` are compared case-insensitively
    pub fn new<I, S>(density: f64, exclude_words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            density,
            exclude_words: exclude_words
                .into_iter()
                .map(|w| w.as_ref().to_lowercase())
                .collect(),
        }
    }

    pub fn density(&self) -> f64 {
        self.density
    }

    pub fn is_excluded(&self, word: &str) -> bool {
        !self.exclude_words.is_empty() && self.exclude_words.contains(&word.to_lowercase())
    }

    /// Matches that may be substituted, in document order
    pub fn eligible<'c, 'a>(&self, candidates: &'c [CandidateMatch<'a>]) -> Vec<&'c CandidateMatch<'a>> {
        candidates
            .iter()
            .filter(|c| c.entry.is_some() && !self.is_excluded(c.original_word))
            .collect()
    }

    /// Number of substitutions for `eligible` candidates
    pub fn target_count(&self, eligible: usize) -> usize {
        if eligible == 0 || self.density.is_nan() || self.density <= 0.0 {
            0
        } else if self.density >= 1.0 {
            eligible
        } else {
            ((eligible as f64 * self.density).floor() as usize).min(eligible)
        }
    }

    /// Selected candidates, sorted by increasing start offset
    pub fn select<'a, R>(&self, candidates: &[CandidateMatch<'a>], rng: &mut R) -> Vec<CandidateMatch<'a>>
    where
        R: Rng + ?Sized,
    {
        let mut eligible = self.eligible(candidates);
        let target = self.target_count(eligible.len());
        if target == 0 {
            return Vec::new();
        }

        let (chosen, _) = eligible.partial_shuffle(rng, target);
        let mut selected: Vec<CandidateMatch<'a>> = chosen.iter().map(|c| (*c).clone()).collect();
        selected.sort_by_key(|c| c.start_offset);
        selected
    }
}
