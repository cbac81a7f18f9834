//! Dictionary Index
//!
//! Word-translation lookup for one language pair.
//!
//! Lookup is two-stage and O(1) expected:
//! - canonical map: lowercase source word -> entry
//! - variant map: lowercase inflected form -> canonical source word
//!
//! An entry above the learner's proficiency resolves to `None` even though it
//! exists. Indexes are immutable once built; see [`cache::DictionaryCache`] for
//! the construct-once sharing discipline.

pub mod builtin;
pub mod cache;

use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;

use serde::Deserialize;

use crate::error::{Result, XenolexiaError};
use crate::types::{DictionaryEntry, LanguagePair, PartOfSpeech, ProficiencyLevel};

pub use builtin::BuiltinSource;
pub use cache::DictionaryCache;

// ==================== Sources ====================

/// Supplies the raw word list for a language pair
///
/// Returns [`XenolexiaError::UnsupportedLanguagePair`] when the pair has no data.
pub trait DictionarySource: Send + Sync {
    fn load(&self, pair: LanguagePair) -> Result<Vec<DictionaryEntry>>;
}

/// One row of a JSON word list file
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordListRecord {
    #[serde(default)]
    pub id: Option<String>,
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub pos: PartOfSpeech,
    /// Derived from `rank` when absent
    #[serde(default)]
    pub level: Option<ProficiencyLevel>,
    /// Defaults to the 1-based position in the file
    #[serde(default)]
    pub rank: Option<u32>,
    #[serde(default)]
    pub variants: Vec<String>,
    #[serde(default)]
    pub pronunciation: Option<String>,
}

impl WordListRecord {
    fn into_entry(self, pair: LanguagePair, position: usize) -> DictionaryEntry {
        let rank = self.rank.unwrap_or(position as u32 + 1);
        DictionaryEntry {
            id: self.id.unwrap_or_else(|| (position + 1).to_string()),
            source_word: self.source,
            target_word: self.target,
            source_language: pair.source,
            target_language: pair.target,
            proficiency_level: self
                .level
                .unwrap_or_else(|| ProficiencyLevel::from_frequency_rank(rank)),
            frequency_rank: rank,
            part_of_speech: self.pos,
            variants: self.variants.into_iter().collect(),
            pronunciation: self.pronunciation,
        }
    }
}

/// Parses a JSON array of [`WordListRecord`] into entries for `pair`
pub fn parse_word_list(pair: LanguagePair, json: &str) -> Result<Vec<DictionaryEntry>> {
    let records: Vec<WordListRecord> = serde_json::from_str(json)?;
    Ok(records
        .into_iter()
        .enumerate()
        .map(|(position, record)| record.into_entry(pair, position))
        .collect())
}

/// Reads `<dir>/<source>-<target>.json` word lists
#[derive(Debug, Clone)]
pub struct JsonDirectorySource {
    dir: PathBuf,
}

impl JsonDirectorySource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, pair: LanguagePair) -> PathBuf {
        self.dir.join(format!("{}-{}.json", pair.source, pair.target))
    }
}

impl DictionarySource for JsonDirectorySource {
    fn load(&self, pair: LanguagePair) -> Result<Vec<DictionaryEntry>> {
        let path = self.path_for(pair);
        let json = match std::fs::read_to_string(&path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(XenolexiaError::UnsupportedLanguagePair(pair));
            }
            Err(e) => return Err(e.into()),
        };
        parse_word_list(pair, &json)
    }
}

// ==================== Index ====================

/// Read-only word index for one language pair
#[derive(Debug, Clone)]
pub struct DictionaryIndex {
    pair: LanguagePair,
    entries: HashMap<String, DictionaryEntry>,
    variants: HashMap<String, String>,
}

impl DictionaryIndex {
    /// Loads the pair's word list from `source` and indexes it
    pub fn load(source: &dyn DictionarySource, pair: LanguagePair) -> Result<Self> {
        let entries = source.load(pair)?;
        Ok(Self::from_entries(pair, entries))
    }

    /// Builds an index; entries for another pair are skipped
    ///
    /// Source words and variants are lowercased. A variant equal to its own
    /// canonical form is dropped. On duplicate canonical words or variants the
    /// first occurrence wins.
    pub fn from_entries(pair: LanguagePair, entries: impl IntoIterator<Item = DictionaryEntry>) -> Self {
        let mut index = Self {
            pair,
            entries: HashMap::new(),
            variants: HashMap::new(),
        };

        for mut entry in entries {
            if entry.pair() != pair {
                tracing::warn!(
                    word = %entry.source_word,
                    entry_pair = %entry.pair(),
                    %pair,
                    "skipping dictionary entry for another language pair"
                );
                continue;
            }

            let canonical = entry.source_word.to_lowercase();
            if index.entries.contains_key(&canonical) {
                tracing::debug!(word = %canonical, "duplicate dictionary entry ignored");
                continue;
            }

            entry.variants = entry
                .variants
                .iter()
                .map(|v| v.to_lowercase())
                .filter(|v| !v.is_empty() && *v != canonical)
                .collect::<BTreeSet<_>>();

            for variant in &entry.variants {
                index
                    .variants
                    .entry(variant.clone())
                    .or_insert_with(|| canonical.clone());
            }
            index.entries.insert(canonical, entry);
        }

        index
    }

    /// Parses a JSON word list (see [`WordListRecord`]) into an index
    pub fn from_json(pair: LanguagePair, json: &str) -> Result<Self> {
        Ok(Self::from_entries(pair, parse_word_list(pair, json)?))
    }

    pub fn pair(&self) -> LanguagePair {
        self.pair
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Finds the entry for a word or one of its variants, ignoring proficiency
    pub fn get(&self, word: &str) -> Option<&DictionaryEntry> {
        let normalized = word.to_lowercase();
        self.entries.get(&normalized).or_else(|| {
            self.variants
                .get(&normalized)
                .and_then(|canonical| self.entries.get(canonical))
        })
    }

    /// Resolves a token to an entry at or below `max_proficiency`
    pub fn resolve(&self, word: &str, max_proficiency: ProficiencyLevel) -> Option<&DictionaryEntry> {
        self.get(word)
            .filter(|entry| entry.proficiency_level <= max_proficiency)
    }

    /// Entries of exactly `level`, most frequent first
    pub fn words_by_level(&self, level: ProficiencyLevel) -> Vec<&DictionaryEntry> {
        let mut words: Vec<_> = self
            .entries
            .values()
            .filter(|entry| entry.proficiency_level == level)
            .collect();
        words.sort_by(|a, b| {
            a.frequency_rank
                .cmp(&b.frequency_rank)
                .then_with(|| a.source_word.cmp(&b.source_word))
        });
        words
    }

    pub fn entries(&self) -> impl Iterator<Item = &DictionaryEntry> {
        self.entries.values()
    }
}
