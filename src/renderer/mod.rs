//! Substitution Renderer
//!
//! Rewrites a document, replacing selected words with foreign-word markers:
//!
//! ```text
//! <span class="foreign-word" data-original="House" data-source="house" data-position="42">Σπίτι</span>
//! ```
//!
//! `data-original` is the replaced text exactly as it appeared, `data-source` the
//! dictionary's source word, and `data-position` the marker's byte offset in the
//! processed document.
//!
//! A stray `<` (one with no closing `>`) ahead of a marker would swallow the
//! marker's opening tag, so the literal run between the previous tag or marker
//! and the new marker is text-escaped first. The marker then carries
//! `data-escaped="N"`, the byte length of that escaped run, and
//! [`strip_markers`] decodes exactly those bytes.
//!
//! Final positions are planned left to right (a marker's length depends only on
//! markers before it), then splices are applied right to left so every
//! not-yet-applied source range stays valid.

pub mod context;

use crate::error::{Result, XenolexiaError};
use crate::types::{CandidateMatch, SubstitutionRecord};

pub use context::extract_context_sentence;

/// CSS class that identifies substitution markers
pub const MARKER_CLASS: &str = "foreign-word";

const MARKER_OPEN: &str = "<span class=\"foreign-word\"";
const MARKER_CLOSE: &str = "</span>";

// ==================== Case & Escaping ====================

/// Applies the original word's capitalisation to its replacement
///
/// - fully uppercase original (with at least one cased letter) -> uppercase replacement
/// - leading capital -> capitalise the replacement's first character
/// - otherwise the replacement is returned as stored
pub fn preserve_case(original: &str, replacement: &str) -> String {
    let has_upper = original.chars().any(char::is_uppercase);
    if has_upper && !original.chars().any(char::is_lowercase) {
        return replacement.to_uppercase();
    }

    if original.chars().next().is_some_and(char::is_uppercase) {
        let mut chars = replacement.chars();
        return match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        };
    }

    replacement.to_string()
}

/// Escapes text content: `&`, `<` and `>` only, quotes stay verbatim
///
/// A record's `start_offset..end_offset` spans `escape_text(substituted_word)`.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

fn escape_attr(text: &str) -> String {
    escape_text(text).replace('"', "&quot;").replace('\'', "&#39;")
}

pub(crate) fn unescape_html(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

// ==================== Markers ====================

/// Opening tag of a marker; the display text and [`MARKER_CLOSE`] follow it
fn marker_open_tag(original: &str, source_word: &str, position: usize, escaped: usize) -> String {
    let mut open = format!(
        "{MARKER_OPEN} data-original=\"{}\" data-source=\"{}\" data-position=\"{}\"",
        escape_attr(original),
        escape_attr(source_word),
        position
    );
    if escaped > 0 {
        open.push_str(&format!(" data-escaped=\"{escaped}\""));
    }
    open.push('>');
    open
}

/// Full marker text for one substitution
pub fn render_marker(display: &str, original: &str, source_word: &str, position: usize) -> String {
    format!(
        "{}{}{MARKER_CLOSE}",
        marker_open_tag(original, source_word, position, 0),
        escape_text(display)
    )
}

fn check_range(document: &str, start: usize, end: usize) -> Result<()> {
    if start >= end
        || end > document.len()
        || !document.is_char_boundary(start)
        || !document.is_char_boundary(end)
    {
        return Err(XenolexiaError::InvalidRange {
            start,
            end,
            len: document.len(),
        });
    }
    Ok(())
}

/// Start of the literal run ending at `start`: after the last `>` or at `floor`
fn literal_run_start(document: &str, floor: usize, start: usize) -> usize {
    document[floor..start]
        .rfind('>')
        .map_or(floor, |i| floor + i + 1)
}

// ==================== Rendering ====================

struct Planned {
    /// Source byte where the splice begins; earlier than the word when a run is escaped
    splice_start: usize,
    replacement: String,
    record: SubstitutionRecord,
}

/// Replaces every selection in `document` and reports the realized substitutions
///
/// Selections may arrive in any order; they must be non-overlapping, lie on char
/// boundaries, carry an entry, and match the document text at their range. Any
/// violation is an [`XenolexiaError::InvalidRange`]. Records are returned in
/// increasing document order.
pub fn render(document: &str, selections: &[CandidateMatch<'_>]) -> Result<(String, Vec<SubstitutionRecord>)> {
    let mut ordered: Vec<&CandidateMatch<'_>> = selections.iter().collect();
    ordered.sort_by_key(|s| s.start_offset);

    let mut planned: Vec<Planned> = Vec::with_capacity(ordered.len());
    let mut delta: isize = 0;
    let mut previous_end = 0;

    for selection in ordered {
        let (start, end) = (selection.start_offset, selection.end_offset);
        let invalid = XenolexiaError::InvalidRange {
            start,
            end,
            len: document.len(),
        };
        check_range(document, start, end)?;
        if start < previous_end || &document[start..end] != selection.original_word {
            return Err(invalid);
        }
        let Some(entry) = selection.entry else {
            return Err(invalid);
        };

        let run_start = literal_run_start(document, previous_end, start);
        let run = &document[run_start..start];
        let (splice_start, lead) = if run.contains('<') {
            (run_start, escape_text(run))
        } else {
            (start, String::new())
        };
        previous_end = end;

        let original = &document[start..end];
        let display = preserve_case(original, &entry.target_word);
        let marker_start = (splice_start as isize + delta) as usize + lead.len();

        let open = marker_open_tag(original, &entry.source_word, marker_start, lead.len());
        let escaped_display = escape_text(&display);
        let marker = format!("{open}{escaped_display}{MARKER_CLOSE}");

        let display_start = marker_start + open.len();
        let record = SubstitutionRecord {
            original_word: original.to_string(),
            substituted_word: display,
            start_offset: display_start,
            end_offset: display_start + escaped_display.len(),
            marker_start,
            marker_end: marker_start + marker.len(),
            source_start: start,
            source_end: end,
            entry: entry.clone(),
        };

        let replacement = lead + &marker;
        delta += replacement.len() as isize - (end - splice_start) as isize;
        planned.push(Planned {
            splice_start,
            replacement,
            record,
        });
    }

    let mut output = document.to_string();
    for plan in planned.iter().rev() {
        output.replace_range(plan.splice_start..plan.record.source_end, &plan.replacement);
    }

    let records = planned.into_iter().map(|p| p.record).collect();
    Ok((output, records))
}

/// Restores the pre-substitution document
///
/// Each marker is replaced by its `data-original` text and its escaped lead-in
/// run is decoded. Only markers with a `data-source` attribute and a
/// `data-position` equal to their own offset are recognised; anything else,
/// malformed markers included, is left untouched. A marker copied verbatim from
/// an earlier run that still sits at its recorded offset is indistinguishable
/// from a fresh one and is stripped as well.
pub fn strip_markers(processed: &str) -> String {
    let mut out = String::with_capacity(processed.len());
    let mut copied = 0;
    let mut search = 0;

    while let Some(rel) = processed[search..].find(MARKER_OPEN) {
        let at = search + rel;
        let marker = parse_marker(&processed[at..]).filter(|m| {
            m.position == at
                && m.escaped <= at - copied
                && processed.is_char_boundary(at - m.escaped)
        });

        match marker {
            Some(marker) => {
                let lead_start = at - marker.escaped;
                out.push_str(&processed[copied..lead_start]);
                out.push_str(&unescape_html(&processed[lead_start..at]));
                out.push_str(&marker.original);
                copied = at + marker.len;
                search = copied;
            }
            None => search = at + MARKER_OPEN.len(),
        }
    }
    out.push_str(&processed[copied..]);
    out
}

struct ParsedMarker {
    original: String,
    position: usize,
    escaped: usize,
    /// Byte length of the whole marker
    len: usize,
}

fn attribute<'t>(open: &'t str, name: &str) -> Option<&'t str> {
    let key = format!(" {name}=\"");
    let start = open.find(&key)? + key.len();
    let len = open[start..].find('"')?;
    Some(&open[start..start + len])
}

/// Parses a marker at the start of `text`
fn parse_marker(text: &str) -> Option<ParsedMarker> {
    let open_end = text.find('>')?;
    let open = &text[..open_end];

    let original = unescape_html(attribute(open, "data-original")?);
    attribute(open, "data-source")?;
    let position = attribute(open, "data-position")?.parse().ok()?;
    let escaped = match attribute(open, "data-escaped") {
        Some(value) => value.parse().ok()?,
        None => 0,
    };

    let close = text[open_end..].find(MARKER_CLOSE)? + open_end;
    Some(ParsedMarker {
        original,
        position,
        escaped,
        len: close + MARKER_CLOSE.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::{document_tokens, plain_text};
    use crate::types::{DictionaryEntry, Language, PartOfSpeech, ProficiencyLevel};

    fn entry(source: &str, target: &str) -> DictionaryEntry {
        DictionaryEntry {
            id: source.to_string(),
            source_word: source.to_string(),
            target_word: target.to_string(),
            source_language: Language::En,
            target_language: Language::El,
            proficiency_level: ProficiencyLevel::Beginner,
            frequency_rank: 1,
            part_of_speech: PartOfSpeech::Noun,
            variants: Default::default(),
            pronunciation: None,
        }
    }

    fn select<'a>(doc: &'a str, word: &'a str, entry: &'a DictionaryEntry) -> CandidateMatch<'a> {
        let start = doc.find(word).unwrap();
        CandidateMatch {
            original_word: &doc[start..start + word.len()],
            start_offset: start,
            end_offset: start + word.len(),
            entry: Some(entry),
        }
    }

    #[test]
    fn test_preserve_case() {
        assert_eq!(preserve_case("HOUSE", "σπίτι"), "ΣΠΊΤΙ");
        assert_eq!(preserve_case("House", "σπίτι"), "Σπίτι");
        assert_eq!(preserve_case("house", "σπίτι"), "σπίτι");
        assert_eq!(preserve_case("house", "Σπίτι"), "Σπίτι");
        assert_eq!(preserve_case("DON'T", "όχι"), "ΌΧΙ");
        assert_eq!(preserve_case("I", "εγώ"), "ΕΓΏ");
        assert_eq!(preserve_case("House", ""), "");
    }

    #[test]
    fn test_render_single() {
        let doc = "<p>The House is big.</p>";
        let house = entry("house", "σπίτι");
        let (out, records) = render(doc, &[select(doc, "House", &house)]).unwrap();

        assert_eq!(records.len(), 1);
        let rec = &records[0];
        assert_eq!(rec.substituted_word, "Σπίτι");
        assert_eq!(&out[rec.start_offset..rec.end_offset], "Σπίτι");
        assert_eq!(rec.marker_start, 7);
        assert!(out[rec.marker_start..rec.marker_end].starts_with(MARKER_OPEN));
        assert!(out.contains("data-position=\"7\""));
        assert!(out.ends_with(" is big.</p>"));
    }

    #[test]
    fn test_render_multiple_offsets_final() {
        let doc = "dog and cat and dog";
        let dog = entry("dog", "σκύλος");
        let cat = entry("cat", "γάτα");
        let first_dog = select(doc, "dog", &dog);
        let second_dog = CandidateMatch {
            original_word: &doc[16..19],
            start_offset: 16,
            end_offset: 19,
            entry: Some(&dog),
        };
        // deliberately unsorted
        let selections = [second_dog, select(doc, "cat", &cat), first_dog];
        let (out, records) = render(doc, &selections).unwrap();

        assert_eq!(records.len(), 3);
        assert!(records.windows(2).all(|w| w[0].marker_end <= w[1].marker_start));
        for rec in &records {
            assert_eq!(&out[rec.start_offset..rec.end_offset], rec.substituted_word);
            let marker = &out[rec.marker_start..rec.marker_end];
            assert!(marker.contains(&format!("data-position=\"{}\"", rec.marker_start)));
            assert_eq!(&doc[rec.source_start..rec.source_end], rec.original_word);
        }
        assert_eq!(strip_markers(&out), doc);
    }

    #[test]
    fn test_render_empty_selection() {
        let doc = "<p>nothing</p>";
        let (out, records) = render(doc, &[]).unwrap();
        assert_eq!(out, doc);
        assert!(records.is_empty());
    }

    #[test]
    fn test_render_rejects_out_of_bounds() {
        let doc = "dog";
        let dog = entry("dog", "σκύλος");
        let bad = CandidateMatch {
            original_word: "dog",
            start_offset: 2,
            end_offset: 5,
            entry: Some(&dog),
        };
        assert!(matches!(
            render(doc, &[bad]),
            Err(XenolexiaError::InvalidRange { start: 2, end: 5, len: 3 })
        ));
    }

    #[test]
    fn test_render_rejects_overlap_and_mismatch() {
        let doc = "doggy";
        let dog = entry("dog", "σκύλος");
        let a = CandidateMatch {
            original_word: "dog",
            start_offset: 0,
            end_offset: 3,
            entry: Some(&dog),
        };
        let b = CandidateMatch {
            original_word: "ggy",
            start_offset: 2,
            end_offset: 5,
            entry: Some(&dog),
        };
        assert!(render(doc, &[a.clone(), b]).is_err());

        let wrong_text = CandidateMatch {
            original_word: "cat",
            ..a
        };
        assert!(render(doc, &[wrong_text]).is_err());
    }

    #[test]
    fn test_render_rejects_non_char_boundary() {
        let doc = "σπίτι";
        let e = entry("x", "y");
        let bad = CandidateMatch {
            original_word: "σ",
            start_offset: 1,
            end_offset: 2,
            entry: Some(&e),
        };
        assert!(render(doc, &[bad]).is_err());
    }

    #[test]
    fn test_escaping_round_trip() {
        let doc = "I don't know";
        let know = entry("know", "ξέρω");
        let dont = entry("don't", "<not>");
        let selections = [select(doc, "don't", &dont), select(doc, "know", &know)];
        let (out, records) = render(doc, &selections).unwrap();
        assert!(out.contains("data-original=\"don&#39;t\""));
        assert!(out.contains("&lt;not&gt;"));
        assert_eq!(records[0].substituted_word, "<not>");
        assert_eq!(strip_markers(&out), doc);
    }

    #[test]
    fn test_stray_angle_bracket_stays_literal() {
        let doc = "a < dog and a cat";
        let dog = entry("dog", "σκύλος");
        let cat = entry("cat", "γάτα");
        let (out, records) = render(doc, &[select(doc, "dog", &dog), select(doc, "cat", &cat)]).unwrap();

        assert!(out.starts_with("a &lt; <span class=\"foreign-word\""));
        assert!(out.contains("data-escaped=\"7\""));
        assert_eq!(plain_text(&out), "a &lt; σκύλος and a γάτα");

        let words: Vec<_> = document_tokens(&out).map(|t| t.text).collect();
        assert_eq!(words, vec!["a", "σκύλος", "and", "a", "γάτα"]);
        for rec in &records {
            assert_eq!(&out[rec.start_offset..rec.end_offset], rec.substituted_word);
            assert!(out[rec.marker_start..].starts_with(MARKER_OPEN));
        }
        assert_eq!(strip_markers(&out), doc);
    }

    #[test]
    fn test_stray_angle_bracket_after_tag() {
        let doc = "<p>x</p> 1 &lt; 2 < dog";
        let dog = entry("dog", "σκύλος");
        let (out, _) = render(doc, &[select(doc, "dog", &dog)]).unwrap();
        assert!(out.starts_with("<p>x</p> 1 &amp;lt; 2 &lt; <span"));
        assert_eq!(strip_markers(&out), doc);
    }

    #[test]
    fn test_record_range_covers_escaped_display() {
        let doc = "today the dog";
        let today = entry("today", "aujourd'hui");
        let dog = entry("dog", "Tom & Jerry");
        let (out, records) = render(doc, &[select(doc, "today", &today), select(doc, "dog", &dog)]).unwrap();

        assert_eq!(&out[records[0].start_offset..records[0].end_offset], "aujourd'hui");
        assert_eq!(records[0].substituted_word, "aujourd'hui");
        assert_eq!(&out[records[1].start_offset..records[1].end_offset], "Tom &amp; Jerry");
        assert_eq!(records[1].substituted_word, "Tom & Jerry");
        for rec in &records {
            assert_eq!(&out[rec.start_offset..rec.end_offset], escape_text(&rec.substituted_word));
        }
        assert_eq!(strip_markers(&out), doc);
    }

    #[test]
    fn test_strip_markers_ignores_foreign_spans() {
        let text = "dog <span class=\"foreign-word\" data-original=\"cat\">x</span> house";
        assert_eq!(strip_markers(text), text);

        let wrong_position = "ab <span class=\"foreign-word\" data-original=\"cat\" \
            data-source=\"cat\" data-position=\"0\">γάτα</span>";
        assert_eq!(strip_markers(wrong_position), wrong_position);
    }

    #[test]
    fn test_strip_markers_leaves_malformed() {
        let text = "a <span class=\"foreign-word\" data-original=\"x\">unterminated";
        assert_eq!(strip_markers(text), text);
        assert_eq!(strip_markers("plain <b>text</b>"), "plain <b>text</b>");
    }
}
