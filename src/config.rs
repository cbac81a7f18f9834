use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::types::{Language, LanguagePair, ProficiencyLevel};

pub const DEFAULT_DENSITY: f64 = 0.3;

/// Per-run substitution settings, supplied by the reader's preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingOptions {
    pub source_language: Language,
    pub target_language: Language,
    pub proficiency_level: ProficiencyLevel,
    /// Fraction of eligible words to replace, (0, 1]
    pub density: f64,
    /// Lowercase words never replaced
    #[serde(default)]
    pub exclude_words: BTreeSet<String>,
}

impl Default for ProcessingOptions {
    fn default() -> Self {
        Self {
            source_language: Language::En,
            target_language: Language::El,
            proficiency_level: ProficiencyLevel::Beginner,
            density: DEFAULT_DENSITY,
            exclude_words: BTreeSet::new(),
        }
    }
}

impl ProcessingOptions {
    pub fn new(pair: LanguagePair, proficiency_level: ProficiencyLevel, density: f64) -> Self {
        Self {
            source_language: pair.source,
            target_language: pair.target,
            proficiency_level,
            density,
            exclude_words: BTreeSet::new(),
        }
    }

    pub fn pair(&self) -> LanguagePair {
        LanguagePair::new(self.source_language, self.target_language)
    }

    pub fn with_density(mut self, density: f64) -> Self {
        self.density = density;
        self
    }

    pub fn with_proficiency(mut self, level: ProficiencyLevel) -> Self {
        self.proficiency_level = level;
        self
    }

    pub fn with_exclude_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.exclude_words = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        self
    }
}

/// Process-level settings read from the environment
#[derive(Debug, Clone)]
pub struct CoreConfig {
    pub source_language: Language,
    pub target_language: Language,
    pub proficiency_level: ProficiencyLevel,
    pub density: f64,
    pub exclude_words: Vec<String>,
    /// Fixed selection seed; `None` uses the process RNG
    pub seed: Option<u64>,
    /// Directory of `<src>-<tgt>.json` word lists; `None` uses the bundled lists
    pub dictionary_dir: Option<PathBuf>,
    pub log_level: String,
}

impl Default for CoreConfig {
    fn default() -> Self {
        let options = ProcessingOptions::default();
        Self {
            source_language: options.source_language,
            target_language: options.target_language,
            proficiency_level: options.proficiency_level,
            density: options.density,
            exclude_words: Vec::new(),
            seed: None,
            dictionary_dir: None,
            log_level: "info".to_string(),
        }
    }
}

impl CoreConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup; unparsable values fall back to defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let source_language = lookup("XENOLEXIA_SOURCE_LANG")
            .and_then(|value| Language::parse(&value))
            .unwrap_or(defaults.source_language);

        let target_language = lookup("XENOLEXIA_TARGET_LANG")
            .and_then(|value| Language::parse(&value))
            .unwrap_or(defaults.target_language);

        let proficiency_level = lookup("XENOLEXIA_PROFICIENCY")
            .and_then(|value| ProficiencyLevel::parse(&value))
            .unwrap_or(defaults.proficiency_level);

        let density = lookup("XENOLEXIA_DENSITY")
            .and_then(|value| value.trim().parse::<f64>().ok())
            .filter(|value| value.is_finite())
            .unwrap_or(defaults.density);

        let exclude_words = lookup("XENOLEXIA_EXCLUDE_WORDS")
            .map(|value| {
                value
                    .split(',')
                    .map(|w| w.trim().to_lowercase())
                    .filter(|w| !w.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let seed = lookup("XENOLEXIA_SEED").and_then(|value| value.trim().parse::<u64>().ok());

        let dictionary_dir = lookup("XENOLEXIA_DICTIONARY_DIR")
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);

        let log_level = lookup("RUST_LOG").unwrap_or(defaults.log_level);

        Self {
            source_language,
            target_language,
            proficiency_level,
            density,
            exclude_words,
            seed,
            dictionary_dir,
            log_level,
        }
    }

    pub fn processing_options(&self) -> ProcessingOptions {
        ProcessingOptions::new(
            LanguagePair::new(self.source_language, self.target_language),
            self.proficiency_level,
            self.density,
        )
        .with_exclude_words(&self.exclude_words)
    }
}
