//! Context sentence extraction for saved words

use crate::tokenizer::segments;
use crate::types::SubstitutionRecord;

fn is_sentence_end(c: char) -> bool {
    matches!(c, '.' | '!' | '?' | '\n' | '。' | '！' | '？' | '…')
}

/// Plain-text sentence of the input `document` containing the substituted word
///
/// Tags are removed and whitespace collapsed. Returns `None` when the record's
/// source range does not fall inside one text segment of `document`.
pub fn extract_context_sentence(document: &str, record: &SubstitutionRecord) -> Option<String> {
    let mut plain = String::new();
    let mut word_range = None;

    for segment in segments(document) {
        let seg_end = segment.position + segment.text.len();
        if segment.position <= record.source_start && record.source_end <= seg_end {
            let start = plain.len() + (record.source_start - segment.position);
            word_range = Some((start, start + (record.source_end - record.source_start)));
        }
        plain.push_str(segment.text);
    }

    let (word_start, word_end) = word_range?;

    let sentence_start = plain[..word_start]
        .char_indices()
        .rev()
        .find(|&(_, c)| is_sentence_end(c))
        .map(|(i, c)| i + c.len_utf8())
        .unwrap_or(0);
    let sentence_end = plain[word_end..]
        .char_indices()
        .find(|&(_, c)| is_sentence_end(c))
        .map(|(i, c)| word_end + i + if c == '\n' { 0 } else { c.len_utf8() })
        .unwrap_or(plain.len());

    let sentence = plain[sentence_start..sentence_end]
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    (!sentence.is_empty()).then_some(sentence)
}
