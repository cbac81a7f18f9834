//! Bundled English -> Greek word list
//!
//! Three tiers ranked by frequency: beginner words start at rank 1,
//! intermediate at 501, advanced at 2001.

use std::collections::BTreeSet;

use crate::error::{Result, XenolexiaError};
use crate::types::{DictionaryEntry, Language, LanguagePair, PartOfSpeech, ProficiencyLevel};

use super::DictionarySource;

use crate::types::PartOfSpeech::{Adjective, Noun, Verb};

type Row = (&'static str, &'static str, PartOfSpeech, &'static [&'static str]);

const BEGINNER: &[Row] = &[
    ("house", "σπίτι", Noun, &["houses"]),
    ("water", "νερό", Noun, &[]),
    ("book", "βιβλίο", Noun, &["books"]),
    ("dog", "σκύλος", Noun, &["dogs"]),
    ("cat", "γάτα", Noun, &["cats"]),
    ("food", "φαγητό", Noun, &[]),
    ("friend", "φίλος", Noun, &["friends"]),
    ("family", "οικογένεια", Noun, &["families"]),
    ("child", "παιδί", Noun, &["children"]),
    ("mother", "μητέρα", Noun, &["mothers"]),
    ("father", "πατέρας", Noun, &["fathers"]),
    ("day", "ημέρα", Noun, &["days"]),
    ("night", "νύχτα", Noun, &["nights"]),
    ("time", "χρόνος", Noun, &[]),
    ("year", "χρόνος", Noun, &["years"]),
    ("man", "άνδρας", Noun, &["men"]),
    ("woman", "γυναίκα", Noun, &["women"]),
    ("name", "όνομα", Noun, &["names"]),
    ("world", "κόσμος", Noun, &[]),
    ("city", "πόλη", Noun, &["cities"]),
    ("go", "πηγαίνω", Verb, &["goes", "going", "went", "gone"]),
    ("come", "έρχομαι", Verb, &["comes", "coming", "came"]),
    ("see", "βλέπω", Verb, &["sees", "seeing", "saw", "seen"]),
    ("know", "ξέρω", Verb, &["knows", "knowing", "knew", "known"]),
    ("want", "θέλω", Verb, &["wants", "wanting", "wanted"]),
    ("love", "αγαπώ", Verb, &["loves", "loving", "loved"]),
    ("eat", "τρώω", Verb, &["eats", "eating", "ate", "eaten"]),
    ("drink", "πίνω", Verb, &["drinks", "drinking", "drank", "drunk"]),
    ("sleep", "κοιμάμαι", Verb, &["sleeps", "sleeping", "slept"]),
    ("walk", "περπατώ", Verb, &["walks", "walking", "walked"]),
    ("good", "καλός", Adjective, &[]),
    ("bad", "κακός", Adjective, &[]),
    ("big", "μεγάλος", Adjective, &[]),
    ("small", "μικρός", Adjective, &[]),
    ("new", "νέος", Adjective, &[]),
    ("old", "παλιός", Adjective, &[]),
    ("beautiful", "όμορφος", Adjective, &[]),
    ("happy", "χαρούμενος", Adjective, &[]),
    ("sad", "λυπημένος", Adjective, &[]),
    ("hot", "ζεστός", Adjective, &[]),
    ("cold", "κρύος", Adjective, &[]),
];

const INTERMEDIATE: &[Row] = &[
    ("government", "κυβέρνηση", Noun, &[]),
    ("problem", "πρόβλημα", Noun, &["problems"]),
    ("decision", "απόφαση", Noun, &["decisions"]),
    ("experience", "εμπειρία", Noun, &["experiences"]),
    ("opportunity", "ευκαιρία", Noun, &["opportunities"]),
    ("relationship", "σχέση", Noun, &["relationships"]),
    ("situation", "κατάσταση", Noun, &["situations"]),
    ("believe", "πιστεύω", Verb, &["believes", "believed", "believing"]),
    ("remember", "θυμάμαι", Verb, &["remembers", "remembered"]),
    ("understand", "καταλαβαίνω", Verb, &["understands", "understood"]),
    ("important", "σημαντικός", Adjective, &[]),
    ("different", "διαφορετικός", Adjective, &[]),
    ("possible", "πιθανός", Adjective, &[]),
    ("necessary", "απαραίτητος", Adjective, &[]),
];

const ADVANCED: &[Row] = &[
    ("phenomenon", "φαινόμενο", Noun, &["phenomena"]),
    ("hypothesis", "υπόθεση", Noun, &["hypotheses"]),
    ("consequence", "συνέπεια", Noun, &["consequences"]),
    ("comprehend", "κατανοώ", Verb, &["comprehends", "comprehended"]),
    ("elaborate", "επεξεργάζομαι", Verb, &["elaborates", "elaborated"]),
    ("sophisticated", "εκλεπτυσμένος", Adjective, &[]),
    ("inevitable", "αναπόφευκτος", Adjective, &[]),
    ("ambiguous", "διφορούμενος", Adjective, &[]),
];

/// Word lists compiled into the crate
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinSource;

impl BuiltinSource {
    pub fn supports(pair: LanguagePair) -> bool {
        pair == LanguagePair::new(Language::En, Language::El)
    }
}

impl DictionarySource for BuiltinSource {
    fn load(&self, pair: LanguagePair) -> Result<Vec<DictionaryEntry>> {
        if !Self::supports(pair) {
            return Err(XenolexiaError::UnsupportedLanguagePair(pair));
        }

        let tiers = [
            (BEGINNER, ProficiencyLevel::Beginner, 1u32),
            (INTERMEDIATE, ProficiencyLevel::Intermediate, 501),
            (ADVANCED, ProficiencyLevel::Advanced, 2001),
        ];

        let mut entries = Vec::new();
        for (rows, level, first_rank) in tiers {
            for (offset, &(source, target, pos, variants)) in rows.iter().enumerate() {
                entries.push(DictionaryEntry {
                    id: (entries.len() + 1).to_string(),
                    source_word: source.to_string(),
                    target_word: target.to_string(),
                    source_language: pair.source,
                    target_language: pair.target,
                    proficiency_level: level,
                    frequency_rank: first_rank + offset as u32,
                    part_of_speech: pos,
                    variants: variants.iter().map(|v| v.to_string()).collect::<BTreeSet<_>>(),
                    pronunciation: None,
                });
            }
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_tiers_and_ranks() {
        let pair = LanguagePair::new(Language::En, Language::El);
        let entries = BuiltinSource.load(pair).unwrap();
        assert_eq!(entries.len(), BEGINNER.len() + INTERMEDIATE.len() + ADVANCED.len());

        for entry in &entries {
            assert_eq!(
                ProficiencyLevel::from_frequency_rank(entry.frequency_rank),
                entry.proficiency_level,
                "rank/tier mismatch for {}",
                entry.source_word
            );
            assert!(!entry.variants.contains(&entry.source_word));
        }
    }

    #[test]
    fn test_builtin_rejects_other_pairs() {
        let pair = LanguagePair::new(Language::En, Language::Fr);
        assert!(matches!(
            BuiltinSource.load(pair),
            Err(XenolexiaError::UnsupportedLanguagePair(p)) if p == pair
        ));
    }
}
