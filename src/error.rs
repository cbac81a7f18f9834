use crate::types::LanguagePair;

/// Errors raised by the substitution pipeline and the scheduler
#[derive(Debug, thiserror::Error)]
pub enum XenolexiaError {
    /// No word list exists for the pair. The pipeline degrades to an unchanged document.
    #[error("unsupported language pair: {0}")]
    UnsupportedLanguagePair(LanguagePair),
    /// An offset falls outside the document or off a char boundary.
    /// Indicates a tokenizer or renderer bug and must not be swallowed.
    #[error("invalid range {start}..{end} for document of length {len}")]
    InvalidRange { start: usize, end: usize, len: usize },
    #[error("review quality {0} is outside 0..=5")]
    InvalidQuality(i32),
    #[error("unknown vocabulary card: {0}")]
    UnknownCard(String),
    #[error("malformed dictionary data: {0}")]
    DictionaryData(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, XenolexiaError>;
