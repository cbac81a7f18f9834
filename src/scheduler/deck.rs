//! In-memory vocabulary collection
//!
//! Holds saved cards keyed by id and routes reviews through the scheduler.
//! Durable storage stays with the caller: persist whatever `record_review` returns.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{Result, XenolexiaError};
use crate::types::{CardStatus, SubstitutionRecord, VocabularyCard};

use super::Sm2Scheduler;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckStats {
    pub total: usize,
    pub new: usize,
    pub learning: usize,
    pub learned: usize,
    pub due: usize,
}

#[derive(Debug, Clone, Default)]
pub struct VocabularyDeck {
    cards: HashMap<String, VocabularyCard>,
    scheduler: Sm2Scheduler,
}

fn same_word(a: &VocabularyCard, b: &VocabularyCard) -> bool {
    a.pair() == b.pair()
        && a.source_word.to_lowercase() == b.source_word.to_lowercase()
        && a.target_word.to_lowercase() == b.target_word.to_lowercase()
}

impl VocabularyDeck {
    pub fn new(scheduler: Sm2Scheduler) -> Self {
        Self {
            cards: HashMap::new(),
            scheduler,
        }
    }

    /// Adds a card and returns its id
    ///
    /// A card for a word pair already in the deck is not added; the existing
    /// card's id is returned instead.
    pub fn add(&mut self, card: VocabularyCard) -> String {
        if let Some(existing) = self.cards.values().find(|c| same_word(c, &card)) {
            return existing.id.clone();
        }
        let id = card.id.clone();
        self.cards.insert(id.clone(), card);
        id
    }

    /// Saves a substituted word the reader tapped
    pub fn save_substitution(
        &mut self,
        record: &SubstitutionRecord,
        context_sentence: Option<String>,
        now: DateTime<Utc>,
    ) -> String {
        self.add(VocabularyCard::from_substitution(record, context_sentence, now))
    }

    pub fn remove(&mut self, id: &str) -> Option<VocabularyCard> {
        self.cards.remove(id)
    }

    pub fn get(&self, id: &str) -> Option<&VocabularyCard> {
        self.cards.get(id)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Cards in the order they were added
    pub fn cards(&self) -> Vec<&VocabularyCard> {
        let mut cards: Vec<_> = self.cards.values().collect();
        cards.sort_by(|a, b| a.added_at.cmp(&b.added_at).then_with(|| a.id.cmp(&b.id)));
        cards
    }

    /// Due cards, never-reviewed first, then by how long they have been due
    pub fn due_for_review(&self, now: DateTime<Utc>) -> Vec<&VocabularyCard> {
        let mut due: Vec<_> = self
            .cards
            .values()
            .filter(|card| self.scheduler.is_due(card, now))
            .collect();
        due.sort_by(|a, b| {
            self.scheduler
                .next_review_at(a)
                .cmp(&self.scheduler.next_review_at(b))
                .then_with(|| a.added_at.cmp(&b.added_at))
                .then_with(|| a.id.cmp(&b.id))
        });
        due
    }

    /// Reviews a card in place and returns its new state
    pub fn record_review(&mut self, id: &str, quality: i32, now: DateTime<Utc>) -> Result<&VocabularyCard> {
        let card = self
            .cards
            .get_mut(id)
            .ok_or_else(|| XenolexiaError::UnknownCard(id.to_string()))?;
        *card = self.scheduler.review(card, quality, now)?;
        Ok(&*card)
    }

    pub fn stats(&self, now: DateTime<Utc>) -> DeckStats {
        let mut stats = DeckStats {
            total: self.cards.len(),
            ..DeckStats::default()
        };
        for card in self.cards.values() {
            match card.status {
                CardStatus::New => stats.new += 1,
                CardStatus::Learning | CardStatus::Review => stats.learning += 1,
                CardStatus::Learned => stats.learned += 1,
            }
            if self.scheduler.is_due(card, now) {
                stats.due += 1;
            }
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Language, LanguagePair};
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 10, 8, 0, 0).unwrap()
    }

    fn card(source: &str, target: &str, added: DateTime<Utc>) -> VocabularyCard {
        VocabularyCard::new(source, target, LanguagePair::new(Language::En, Language::El), added)
    }

    #[test]
    fn test_add_deduplicates() {
        let mut deck = VocabularyDeck::default();
        let a = deck.add(card("house", "σπίτι", t0()));
        let b = deck.add(card("House", "σπίτι", t0()));
        assert_eq!(a, b);
        assert_eq!(deck.len(), 1);
        deck.add(card("dog", "σκύλος", t0()));
        assert_eq!(deck.len(), 2);
    }

    #[test]
    fn test_record_review_updates_card() {
        let mut deck = VocabularyDeck::default();
        let id = deck.add(card("house", "σπίτι", t0()));
        let reviewed = deck.record_review(&id, 5, t0()).unwrap();
        assert_eq!(reviewed.interval, 1);
        assert_eq!(reviewed.last_reviewed_at, Some(t0()));
        assert_eq!(deck.get(&id).unwrap().review_count, 1);
    }

    #[test]
    fn test_record_review_errors() {
        let mut deck = VocabularyDeck::default();
        assert!(matches!(
            deck.record_review("missing", 4, t0()),
            Err(XenolexiaError::UnknownCard(_))
        ));

        let id = deck.add(card("house", "σπίτι", t0()));
        assert!(matches!(
            deck.record_review(&id, 7, t0()),
            Err(XenolexiaError::InvalidQuality(7))
        ));
        let untouched = deck.get(&id).unwrap();
        assert_eq!(untouched.review_count, 0);
        assert_eq!(untouched.last_reviewed_at, None);
    }

    #[test]
    fn test_due_for_review_ordering() {
        let mut deck = VocabularyDeck::default();
        let fresh = deck.add(card("cat", "γάτα", t0()));
        let reviewed = deck.add(card("dog", "σκύλος", t0()));
        let later = deck.add(card("house", "σπίτι", t0()));

        deck.record_review(&reviewed, 5, t0()).unwrap();
        deck.record_review(&later, 5, t0() + Duration::hours(6)).unwrap();

        let now = t0() + Duration::days(2);
        let due: Vec<_> = deck.due_for_review(now).iter().map(|c| c.id.clone()).collect();
        assert_eq!(due, vec![fresh.clone(), reviewed.clone(), later.clone()]);

        assert_eq!(deck.due_for_review(t0()).len(), 1);

        let stats = deck.stats(now);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.new, 1);
        assert_eq!(stats.learning, 2);
        assert_eq!(stats.due, 3);
    }

    #[test]
    fn test_remove() {
        let mut deck = VocabularyDeck::default();
        let id = deck.add(card("house", "σπίτι", t0()));
        assert!(deck.remove(&id).is_some());
        assert!(deck.is_empty());
        assert!(deck.remove(&id).is_none());
    }

    #[test]
    fn test_cards_in_added_order() {
        let mut deck = VocabularyDeck::default();
        deck.add(card("b", "β", t0() + Duration::minutes(1)));
        deck.add(card("a", "α", t0()));
        let words: Vec<_> = deck.cards().iter().map(|c| c.source_word.as_str()).collect();
        assert_eq!(words, vec!["a", "b"]);
    }
}
