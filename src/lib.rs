//! # xenolexia-core - immersive reading core
//!
//! Replaces a fraction of the words in a document with their foreign-language
//! translations and schedules the words a reader saves for review:
//!
//! - **Tokenizer** - words and their byte offsets, skipping markup
//! - **Dictionary** - per language pair word lists, indexed by surface form
//! - **Selector** - picks a density-bounded random subset of matches
//! - **Renderer** - splices case-preserving markers back into the document
//! - **Scheduler** - SM-2 spaced repetition over saved vocabulary
//!
//! ## Module layout
//!
//! - [`tokenizer`] - segments, tokens, offset helpers
//! - [`dictionary`] - sources, index, per-pair cache
//! - [`selector`] - density and exclusion rules
//! - [`renderer`] - marker rendering, stripping, context sentences
//! - [`pipeline`] - [`TranslationEngine`] tying the stages together
//! - [`scheduler`] - [`Sm2Scheduler`] and [`VocabularyDeck`]
//! - [`config`] - reader options and environment configuration
//! - [`logging`] - tracing subscriber setup for host processes
//! - [`types`] - shared types and constants
//!
//! ## Example
//!
//! ```rust
//! use xenolexia_core::{ProcessingOptions, TranslationEngine};
//!
//! let engine = TranslationEngine::with_builtin(ProcessingOptions::default().with_density(1.0));
//! let result = engine.process_content_seeded("<p>The dog saw the house.</p>", 42).unwrap();
//! assert_eq!(result.stats.replaced_words, result.stats.eligible_words);
//! assert_eq!(xenolexia_core::strip_markers(&result.content), "<p>The dog saw the house.</p>");
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod config;
pub mod dictionary;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod renderer;
pub mod scheduler;
pub mod selector;
pub mod tokenizer;
pub mod types;

// ============================================================================
// Re-exports
// ============================================================================

pub use types::*;

pub use config::{CoreConfig, ProcessingOptions, DEFAULT_DENSITY};
pub use dictionary::{BuiltinSource, DictionaryCache, DictionaryIndex, DictionarySource, JsonDirectorySource};
pub use error::{Result, XenolexiaError};
pub use logging::init_tracing;
pub use pipeline::{find_matches, process_with_index, TranslationEngine};
pub use renderer::{escape_text, extract_context_sentence, preserve_case, render, strip_markers};
pub use scheduler::{DeckStats, ReviewQuality, Sm2Params, Sm2Scheduler, VocabularyDeck};
pub use selector::SubstitutionSelector;
pub use tokenizer::{char_offset, document_tokens, plain_text};
