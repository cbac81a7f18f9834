//! SM-2 Spaced-Repetition Scheduler
//!
//! Core rules:
//! - quality >= 3: interval 1, then 6, then round(interval * ease); review_count + 1
//! - quality < 3: review_count = 0, interval = 1
//! - ease += 0.1 - (5 - q) * (0.08 + (5 - q) * 0.02), floored at 1.3, on every review
//! - status: learned if interval >= 21, new if review_count == 0, learning otherwise
//!
//! The interval uses the ease factor from before the current review.
//! `review` is the only path that changes ease, interval or review count.

pub mod deck;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, XenolexiaError};
use crate::types::{CardStatus, LanguagePair, SubstitutionRecord, VocabularyCard};

pub use deck::{DeckStats, VocabularyDeck};

// ==================== Constants ====================

pub const DEFAULT_EASE_FACTOR: f64 = 2.5;
pub const MIN_EASE_FACTOR: f64 = 1.3;
pub const LEARNED_INTERVAL_DAYS: u32 = 21;
pub const MAX_QUALITY: i32 = 5;
pub const PASSING_QUALITY: i32 = 3;

// ==================== Quality ====================

/// Review grade in [0, 5]; 3 and above counts as correct recall
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct ReviewQuality(u8);

impl ReviewQuality {
    pub fn new(quality: i32) -> Result<Self> {
        if (0..=MAX_QUALITY).contains(&quality) {
            Ok(Self(quality as u8))
        } else {
            Err(XenolexiaError::InvalidQuality(quality))
        }
    }

    pub fn value(&self) -> i32 {
        self.0 as i32
    }

    pub fn is_correct(&self) -> bool {
        self.value() >= PASSING_QUALITY
    }
}

impl TryFrom<i32> for ReviewQuality {
    type Error = XenolexiaError;

    fn try_from(quality: i32) -> Result<Self> {
        Self::new(quality)
    }
}

impl From<ReviewQuality> for i32 {
    fn from(quality: ReviewQuality) -> Self {
        quality.value()
    }
}

// ==================== Parameters ====================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sm2Params {
    pub initial_ease_factor: f64,
    pub min_ease_factor: f64,
    pub first_interval_days: u32,
    pub second_interval_days: u32,
    pub learned_interval_days: u32,
}

impl Default for Sm2Params {
    fn default() -> Self {
        Self {
            initial_ease_factor: DEFAULT_EASE_FACTOR,
            min_ease_factor: MIN_EASE_FACTOR,
            first_interval_days: 1,
            second_interval_days: 6,
            learned_interval_days: LEARNED_INTERVAL_DAYS,
        }
    }
}

// ==================== Cards ====================

impl VocabularyCard {
    /// A fresh card with the default ease factor
    pub fn new(
        source_word: impl Into<String>,
        target_word: impl Into<String>,
        pair: LanguagePair,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            source_word: source_word.into(),
            target_word: target_word.into(),
            source_language: pair.source,
            target_language: pair.target,
            context_sentence: None,
            ease_factor: DEFAULT_EASE_FACTOR,
            interval: 0,
            review_count: 0,
            status: CardStatus::New,
            last_reviewed_at: None,
            added_at: now,
        }
    }

    /// Card for a word the reader saved from a processed document
    pub fn from_substitution(
        record: &SubstitutionRecord,
        context_sentence: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        let mut card = Self::new(
            record.entry.source_word.clone(),
            record.entry.target_word.clone(),
            record.entry.pair(),
            now,
        );
        card.context_sentence = context_sentence;
        card
    }

    pub fn pair(&self) -> LanguagePair {
        LanguagePair::new(self.source_language, self.target_language)
    }
}

// ==================== Scheduler ====================

#[derive(Debug, Clone, Default)]
pub struct Sm2Scheduler {
    params: Sm2Params,
}

impl Sm2Scheduler {
    pub fn new(params: Sm2Params) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &Sm2Params {
        &self.params
    }

    /// Applies one review and returns the card's next state
    ///
    /// Invalid quality is rejected before anything is computed.
    pub fn review(&self, card: &VocabularyCard, quality: i32, now: DateTime<Utc>) -> Result<VocabularyCard> {
        let quality = ReviewQuality::new(quality)?;
        let ease = self.sanitize_ease(card.ease_factor);

        let mut next = card.clone();
        if quality.is_correct() {
            next.interval = match card.review_count {
                0 => self.params.first_interval_days,
                1 => self.params.second_interval_days,
                _ => (card.interval as f64 * ease).round() as u32,
            };
            next.review_count = card.review_count.saturating_add(1);
        } else {
            next.review_count = 0;
            next.interval = self.params.first_interval_days;
        }

        next.ease_factor = self.next_ease(ease, quality);
        next.status = self.derive_status(next.interval, next.review_count);
        next.last_reviewed_at = Some(now);

        tracing::debug!(
            card = %card.id,
            quality = quality.value(),
            interval = next.interval,
            ease = next.ease_factor,
            status = next.status.as_str(),
            "card reviewed"
        );

        Ok(next)
    }

    pub fn review_now(&self, card: &VocabularyCard, quality: i32) -> Result<VocabularyCard> {
        self.review(card, quality, Utc::now())
    }

    /// Whether a card should be shown again at `now`
    pub fn is_due(&self, card: &VocabularyCard, now: DateTime<Utc>) -> bool {
        if card.status == CardStatus::Learned {
            return false;
        }
        match self.next_review_at(card) {
            None => true,
            Some(due) => now >= due,
        }
    }

    /// `last_reviewed_at + interval` days, or `None` for a never-reviewed card
    pub fn next_review_at(&self, card: &VocabularyCard) -> Option<DateTime<Utc>> {
        card.last_reviewed_at.map(|last| {
            last.checked_add_signed(Duration::days(card.interval as i64))
                .unwrap_or(DateTime::<Utc>::MAX_UTC)
        })
    }

    pub fn derive_status(&self, interval: u32, review_count: u32) -> CardStatus {
        if interval >= self.params.learned_interval_days {
            CardStatus::Learned
        } else if review_count == 0 {
            CardStatus::New
        } else {
            CardStatus::Learning
        }
    }

    fn next_ease(&self, ease: f64, quality: ReviewQuality) -> f64 {
        let miss = (MAX_QUALITY - quality.value()) as f64;
        (ease + (0.1 - miss * (0.08 + miss * 0.02))).max(self.params.min_ease_factor)
    }

    fn sanitize_ease(&self, ease: f64) -> f64 {
        if ease.is_finite() {
            ease.max(self.params.min_ease_factor)
        } else {
            self.params.initial_ease_factor
        }
    }
}

/// SM-2 review with default parameters
pub fn review(card: &VocabularyCard, quality: i32, now: DateTime<Utc>) -> Result<VocabularyCard> {
    Sm2Scheduler::default().review(card, quality, now)
}

/// Due check with default parameters
pub fn due_for_review(card: &VocabularyCard, now: DateTime<Utc>) -> bool {
    Sm2Scheduler::default().is_due(card, now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Language;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
    }

    fn fresh() -> VocabularyCard {
        VocabularyCard::new("house", "σπίτι", LanguagePair::new(Language::En, Language::El), now())
    }

    #[test]
    fn test_reference_vector_perfect_recall() {
        let s = Sm2Scheduler::default();
        let c1 = s.review(&fresh(), 5, now()).unwrap();
        assert_eq!((c1.interval, c1.review_count), (1, 1));
        assert!((c1.ease_factor - 2.6).abs() < 1e-9);
        assert_eq!(c1.status, CardStatus::Learning);

        let c2 = s.review(&c1, 5, now()).unwrap();
        assert_eq!((c2.interval, c2.review_count), (6, 2));
        assert!((c2.ease_factor - 2.7).abs() < 1e-9);

        let c3 = s.review(&c2, 5, now()).unwrap();
        assert_eq!(c3.interval, (6.0_f64 * c2.ease_factor).round() as u32);
        assert_eq!((c3.interval, c3.review_count), (16, 3));
        assert!((c3.ease_factor - 2.8).abs() < 1e-9);

        let c4 = s.review(&c3, 5, now()).unwrap();
        assert_eq!(c4.interval, 45);
        assert_eq!(c4.status, CardStatus::Learned);
    }

    #[test]
    fn test_failure_resets_and_lowers_ease() {
        let s = Sm2Scheduler::default();
        let c1 = s.review(&fresh(), 5, now()).unwrap();
        let c2 = s.review(&c1, 5, now()).unwrap();
        let failed = s.review(&c2, 2, now()).unwrap();
        assert_eq!((failed.interval, failed.review_count), (1, 0));
        assert!((failed.ease_factor - (2.7 - 0.32)).abs() < 1e-9);
        assert_eq!(failed.status, CardStatus::New);
    }

    #[test]
    fn test_ease_floor() {
        let s = Sm2Scheduler::default();
        let mut card = fresh();
        for _ in 0..20 {
            card = s.review(&card, 0, now()).unwrap();
            assert!(card.ease_factor >= MIN_EASE_FACTOR);
        }
        assert_eq!(card.ease_factor, MIN_EASE_FACTOR);
    }

    #[test]
    fn test_quality_three_keeps_ease_decreasing() {
        let c = Sm2Scheduler::default().review(&fresh(), 3, now()).unwrap();
        assert!((c.ease_factor - 2.36).abs() < 1e-9);
        assert_eq!(c.review_count, 1);
        let c = Sm2Scheduler::default().review(&fresh(), 4, now()).unwrap();
        assert!((c.ease_factor - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_quality_rejected() {
        let card = fresh();
        for q in [-1, 6, 100] {
            assert!(matches!(
                review(&card, q, now()),
                Err(XenolexiaError::InvalidQuality(v)) if v == q
            ));
        }
    }

    #[test]
    fn test_corrupt_ease_sanitized() {
        let mut card = fresh();
        card.ease_factor = f64::NAN;
        let next = review(&card, 5, now()).unwrap();
        assert!((next.ease_factor - 2.6).abs() < 1e-9);

        card.ease_factor = 0.5;
        let next = review(&card, 5, now()).unwrap();
        assert!((next.ease_factor - 1.4).abs() < 1e-9);
    }

    #[test]
    fn test_due_for_review() {
        let s = Sm2Scheduler::default();
        let card = fresh();
        assert!(s.is_due(&card, now()));
        assert_eq!(s.next_review_at(&card), None);

        let reviewed = s.review(&s.review(&card, 5, now()).unwrap(), 5, now()).unwrap();
        assert!(!s.is_due(&reviewed, now() + Duration::days(5)));
        assert!(s.is_due(&reviewed, now() + Duration::days(6)));
        assert_eq!(s.next_review_at(&reviewed), Some(now() + Duration::days(6)));

        let mut learned = reviewed.clone();
        learned.status = CardStatus::Learned;
        assert!(!due_for_review(&learned, now() + Duration::days(365)));
    }

    #[test]
    fn test_quality_serde() {
        let q: ReviewQuality = serde_json::from_str("4").unwrap();
        assert!(q.is_correct());
        assert!(serde_json::from_str::<ReviewQuality>("9").is_err());
        assert_eq!(serde_json::to_string(&q).unwrap(), "4");
    }

    #[test]
    fn test_card_from_substitution() {
        use crate::types::{DictionaryEntry, PartOfSpeech, ProficiencyLevel};

        let entry = DictionaryEntry {
            id: "1".into(),
            source_word: "house".into(),
            target_word: "σπίτι".into(),
            source_language: Language::En,
            target_language: Language::El,
            proficiency_level: ProficiencyLevel::Beginner,
            frequency_rank: 1,
            part_of_speech: PartOfSpeech::Noun,
            variants: ["houses".to_string()].into_iter().collect(),
            pronunciation: None,
        };
        let record = SubstitutionRecord {
            original_word: "Houses".into(),
            substituted_word: "Σπίτι".into(),
            start_offset: 0,
            end_offset: 0,
            marker_start: 0,
            marker_end: 0,
            source_start: 0,
            source_end: 6,
            entry,
        };
        let card = VocabularyCard::from_substitution(&record, Some("Houses stand.".into()), now());
        assert_eq!(card.source_word, "house");
        assert_eq!(card.target_word, "σπίτι");
        assert_eq!(card.status, CardStatus::New);
        assert_eq!(card.ease_factor, DEFAULT_EASE_FACTOR);
        assert_eq!(card.context_sentence.as_deref(), Some("Houses stand."));
        assert_eq!(card.added_at, now());
        assert!(!card.id.is_empty());
    }
}
