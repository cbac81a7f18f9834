//! Lexical Substitution Pipeline
//!
//! Tokenizer -> Dictionary Index -> Substitution Selector -> Substitution Renderer
//! over one document, plus parallel processing of independent documents.
//!
//! An unsupported language pair is not an error: the document comes back
//! unchanged with [`Diagnostic::UnsupportedLanguagePair`]. Renderer contract
//! violations propagate as [`XenolexiaError::InvalidRange`].

use std::sync::Arc;
use std::time::Instant;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use crate::config::{CoreConfig, ProcessingOptions};
use crate::dictionary::{DictionaryCache, DictionaryIndex, JsonDirectorySource};
use crate::error::{Result, XenolexiaError};
use crate::renderer;
use crate::selector::SubstitutionSelector;
use crate::tokenizer::document_tokens;
use crate::types::{CandidateMatch, Diagnostic, ProcessedText, ProcessingStats};

// ==================== Core Pass ====================

/// Resolves every token of `document` against `index` at the given proficiency
pub fn find_matches<'a>(
    index: &'a DictionaryIndex,
    document: &'a str,
    options: &ProcessingOptions,
) -> Vec<CandidateMatch<'a>> {
    document_tokens(document)
        .map(|token| CandidateMatch {
            original_word: token.text,
            start_offset: token.start_offset,
            end_offset: token.end_offset,
            entry: index.resolve(token.text, options.proficiency_level),
        })
        .collect()
}

/// Runs the full pipeline over one document with an explicit index and RNG
pub fn process_with_index<R>(
    index: &DictionaryIndex,
    document: &str,
    options: &ProcessingOptions,
    rng: &mut R,
) -> Result<ProcessedText>
where
    R: Rng + ?Sized,
{
    let started = Instant::now();

    let candidates = find_matches(index, document, options);
    let eligible_words = candidates.iter().filter(|c| c.entry.is_some()).count();

    let selector = SubstitutionSelector::new(options.density, &options.exclude_words);
    let selected = selector.select(&candidates, rng);
    let (content, substitutions) = renderer::render(document, &selected)?;

    let stats = ProcessingStats {
        total_words: candidates.len(),
        eligible_words,
        replaced_words: substitutions.len(),
        processing_time_ms: started.elapsed().as_millis() as u64,
    };

    tracing::debug!(
        pair = %index.pair(),
        total = stats.total_words,
        eligible = stats.eligible_words,
        replaced = stats.replaced_words,
        "document processed"
    );

    Ok(ProcessedText {
        content,
        substitutions,
        stats,
        diagnostic: None,
    })
}

fn unchanged(document: &str, diagnostic: Diagnostic, started: Instant) -> ProcessedText {
    ProcessedText {
        content: document.to_string(),
        substitutions: Vec::new(),
        stats: ProcessingStats {
            total_words: document_tokens(document).count(),
            eligible_words: 0,
            replaced_words: 0,
            processing_time_ms: started.elapsed().as_millis() as u64,
        },
        diagnostic: Some(diagnostic),
    }
}

// ==================== Engine ====================

/// Document processor bound to a shared dictionary cache and reader options
#[derive(Debug, Clone)]
pub struct TranslationEngine {
    cache: Arc<DictionaryCache>,
    options: ProcessingOptions,
    /// Fixed seed for `process_content`
    seed: Option<u64>,
}

impl TranslationEngine {
    pub fn new(cache: Arc<DictionaryCache>, options: ProcessingOptions) -> Self {
        Self {
            cache,
            options,
            seed: None,
        }
    }

    /// Engine over the bundled word lists
    pub fn with_builtin(options: ProcessingOptions) -> Self {
        Self::new(Arc::new(DictionaryCache::builtin()), options)
    }

    /// Engine for a host process: word lists from `dictionary_dir` when set
    pub fn from_config(config: &CoreConfig) -> Self {
        let cache = match &config.dictionary_dir {
            Some(dir) => {
                tracing::info!(dir = %dir.display(), "using word lists from directory");
                DictionaryCache::new(JsonDirectorySource::new(dir.clone()))
            }
            None => DictionaryCache::builtin(),
        };
        let mut engine = Self::new(Arc::new(cache), config.processing_options());
        engine.seed = config.seed;
        engine
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn options(&self) -> &ProcessingOptions {
        &self.options
    }

    pub fn cache(&self) -> &Arc<DictionaryCache> {
        &self.cache
    }

    /// Replaces the reader options; a new pair is loaded lazily on next use
    pub fn update_options(&mut self, options: ProcessingOptions) {
        if options.pair() != self.options.pair() {
            tracing::debug!(from = %self.options.pair(), to = %options.pair(), "language pair changed");
        }
        self.options = options;
    }

    /// Processes `document` with the configured seed, or the process-level RNG
    pub fn process_content(&self, document: &str) -> Result<ProcessedText> {
        match self.seed {
            Some(seed) => self.process_content_seeded(document, seed),
            None => self.process_content_with_rng(document, &mut rand::thread_rng()),
        }
    }

    /// Processes `document` reproducibly from `seed`
    pub fn process_content_seeded(&self, document: &str, seed: u64) -> Result<ProcessedText> {
        self.process_content_with_rng(document, &mut ChaCha8Rng::seed_from_u64(seed))
    }

    pub fn process_content_with_rng<R>(&self, document: &str, rng: &mut R) -> Result<ProcessedText>
    where
        R: Rng + ?Sized,
    {
        let started = Instant::now();
        let pair = self.options.pair();

        let index = match self.cache.get_or_load(pair) {
            Ok(index) => index,
            Err(XenolexiaError::UnsupportedLanguagePair(pair)) => {
                tracing::warn!(%pair, "no dictionary for language pair, leaving document unchanged");
                return Ok(unchanged(
                    document,
                    Diagnostic::UnsupportedLanguagePair { pair },
                    started,
                ));
            }
            Err(e) => return Err(e),
        };

        process_with_index(&index, document, &self.options, rng)
    }

    /// Processes independent documents in parallel, results in input order
    ///
    /// Document `i` draws from ChaCha8 stream `i` of `seed`, so the output does
    /// not depend on thread scheduling.
    pub fn process_documents<S>(&self, documents: &[S], seed: u64) -> Result<Vec<ProcessedText>>
    where
        S: AsRef<str> + Sync,
    {
        documents
            .par_iter()
            .enumerate()
            .map(|(i, document)| {
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                rng.set_stream(i as u64);
                self.process_content_with_rng(document.as_ref(), &mut rng)
            })
            .collect()
    }
}
