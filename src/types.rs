//! Common Types and Constants
//!
//! Shared data structures used across the substitution pipeline and the scheduler.
//! All text offsets are UTF-8 byte offsets and always fall on `char` boundaries.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==================== Constants ====================

/// Highest frequency rank still considered beginner vocabulary
pub const BEGINNER_MAX_RANK: u32 = 500;

/// Highest frequency rank still considered intermediate vocabulary
pub const INTERMEDIATE_MAX_RANK: u32 = 2000;

// ==================== Languages ====================

/// Supported content and learning languages (ISO 639-1 codes on the wire)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    El,
    Es,
    Fr,
    De,
    It,
    Pt,
    Ru,
    Ja,
    Zh,
    Ko,
    Ar,
}

impl Language {
    pub const ALL: [Language; 12] = [
        Self::En,
        Self::El,
        Self::Es,
        Self::Fr,
        Self::De,
        Self::It,
        Self::Pt,
        Self::Ru,
        Self::Ja,
        Self::Zh,
        Self::Ko,
        Self::Ar,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Self::En => "en",
            Self::El => "el",
            Self::Es => "es",
            Self::Fr => "fr",
            Self::De => "de",
            Self::It => "it",
            Self::Pt => "pt",
            Self::Ru => "ru",
            Self::Ja => "ja",
            Self::Zh => "zh",
            Self::Ko => "ko",
            Self::Ar => "ar",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let code = s.trim().to_lowercase();
        Self::ALL.into_iter().find(|lang| lang.code() == code)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A (source, target) language pair; one dictionary exists per pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguagePair {
    pub source: Language,
    pub target: Language,
}

impl LanguagePair {
    pub fn new(source: Language, target: Language) -> Self {
        Self { source, target }
    }
}

impl fmt::Display for LanguagePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.source, self.target)
    }
}

// ==================== Dictionary Types ====================

/// Learner proficiency tier; totally ordered beginner < intermediate < advanced
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ProficiencyLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl ProficiencyLevel {
    pub const ALL: [ProficiencyLevel; 3] = [Self::Beginner, Self::Intermediate, Self::Advanced];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "beginner" => Some(Self::Beginner),
            "intermediate" => Some(Self::Intermediate),
            "advanced" => Some(Self::Advanced),
            _ => None,
        }
    }

    /// Tier implied by a word's frequency rank (1 = most frequent)
    pub fn from_frequency_rank(rank: u32) -> Self {
        if rank <= BEGINNER_MAX_RANK {
            Self::Beginner
        } else if rank <= INTERMEDIATE_MAX_RANK {
            Self::Intermediate
        } else {
            Self::Advanced
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartOfSpeech {
    Noun,
    Verb,
    Adjective,
    Adverb,
    Pronoun,
    Preposition,
    Conjunction,
    Interjection,
    Article,
    #[default]
    Other,
}

/// One word-translation entry of a dictionary
///
/// `variants` holds lowercase inflected forms (plurals, conjugations) and never
/// contains `source_word` itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DictionaryEntry {
    pub id: String,
    pub source_word: String,
    pub target_word: String,
    pub source_language: Language,
    pub target_language: Language,
    pub proficiency_level: ProficiencyLevel,
    pub frequency_rank: u32,
    pub part_of_speech: PartOfSpeech,
    #[serde(default)]
    pub variants: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pronunciation: Option<String>,
}

impl DictionaryEntry {
    pub fn pair(&self) -> LanguagePair {
        LanguagePair::new(self.source_language, self.target_language)
    }
}

// ==================== Tokenizer Types ====================

/// A word-like run inside one text segment; offsets are segment-local
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub text: &'a str,
    pub start_offset: usize,
    pub end_offset: usize,
}

/// A run of content outside any markup tag, positioned in the source document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextSegment<'a> {
    pub text: &'a str,
    pub position: usize,
}

/// A token resolved against a dictionary, in document coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateMatch<'a> {
    pub original_word: &'a str,
    pub start_offset: usize,
    pub end_offset: usize,
    pub entry: Option<&'a DictionaryEntry>,
}

// ==================== Pipeline Output Types ====================

/// One realized substitution
///
/// `start_offset..end_offset` covers the displayed foreign word in the processed
/// document (text-escaped, so it reads `escape_text(substituted_word)`),
/// `marker_start..marker_end` the whole marker that wraps it, and
/// `source_start..source_end` the replaced word in the input document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubstitutionRecord {
    pub original_word: String,
    pub substituted_word: String,
    pub start_offset: usize,
    pub end_offset: usize,
    pub marker_start: usize,
    pub marker_end: usize,
    pub source_start: usize,
    pub source_end: usize,
    pub entry: DictionaryEntry,
}

/// Summary of one pipeline run (or an aggregate of several)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingStats {
    /// Every token seen
    pub total_words: usize,
    /// Tokens with a dictionary match, before exclusion and density filtering
    pub eligible_words: usize,
    /// Substitutions actually applied
    pub replaced_words: usize,
    pub processing_time_ms: u64,
}

impl ProcessingStats {
    pub fn merge(&mut self, other: &ProcessingStats) {
        self.total_words += other.total_words;
        self.eligible_words += other.eligible_words;
        self.replaced_words += other.replaced_words;
        self.processing_time_ms += other.processing_time_ms;
    }

    /// Share of all tokens that were replaced, in [0, 1]
    pub fn replacement_ratio(&self) -> f64 {
        if self.total_words == 0 {
            0.0
        } else {
            self.replaced_words as f64 / self.total_words as f64
        }
    }
}

/// Non-fatal condition reported alongside an otherwise unchanged result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum Diagnostic {
    /// No word list exists for the configured pair; the document is returned unchanged
    UnsupportedLanguagePair { pair: LanguagePair },
}

/// Output of [`crate::pipeline::TranslationEngine::process_content`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedText {
    pub content: String,
    pub substitutions: Vec<SubstitutionRecord>,
    pub stats: ProcessingStats,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<Diagnostic>,
}

// ==================== Vocabulary Types ====================

/// Learning status, derived from scheduling state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardStatus {
    #[default]
    New,
    Learning,
    Review,
    Learned,
}

impl CardStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Learning => "learning",
            Self::Review => "review",
            Self::Learned => "learned",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "learning" => Self::Learning,
            "review" => Self::Review,
            "learned" => Self::Learned,
            _ => Self::New,
        }
    }

    /// `Learning` and `Review` are the same scheduling bucket
    pub fn is_in_progress(&self) -> bool {
        matches!(self, Self::Learning | Self::Review)
    }
}

/// A saved word tracked by the spaced-repetition scheduler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VocabularyCard {
    pub id: String,
    pub source_word: String,
    pub target_word: String,
    pub source_language: Language,
    pub target_language: Language,
    #[serde(default)]
    pub context_sentence: Option<String>,
    /// SM-2 ease factor, never below 1.3
    pub ease_factor: f64,
    /// Days until the next review
    pub interval: u32,
    /// Consecutive correct reviews
    pub review_count: u32,
    pub status: CardStatus,
    #[serde(default)]
    pub last_reviewed_at: Option<DateTime<Utc>>,
    pub added_at: DateTime<Utc>,
}
