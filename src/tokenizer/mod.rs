//! Markup-Aware Tokenizer
//!
//! Splits a markup document into text segments (content outside `<...>` tags)
//! and each segment into word tokens.
//!
//! Rules:
//! - A tag is a `<` followed by the nearest `>`; an unmatched `<` is literal text
//! - A word is a maximal run of alphabetic characters (any script)
//! - An apostrophe between two letters (`don't`, `l’homme`) stays inside the word
//! - Combining diacritics continue a word that is already open
//! - Character references (`&amp;`, `&#39;`) are skipped, never tokenized
//!
//! Offsets are UTF-8 byte offsets. Iterators are lazy, `Clone`, and hold no
//! state beyond their cursor, so a sequence can be restarted by cloning it.

use crate::types::{TextSegment, Token};

// ==================== Character Classes ====================

/// Characters that can start or continue a word
pub fn is_word_char(c: char) -> bool {
    c.is_alphabetic()
}

/// Apostrophes accepted between two letters of one word
pub fn is_apostrophe(c: char) -> bool {
    matches!(c, '\'' | '\u{2019}' | '\u{02BC}')
}

/// Combining marks that extend the preceding letter (NFD accents etc.)
pub fn is_combining_mark(c: char) -> bool {
    matches!(
        c,
        '\u{0300}'..='\u{036F}'
            | '\u{1AB0}'..='\u{1AFF}'
            | '\u{1DC0}'..='\u{1DFF}'
            | '\u{20D0}'..='\u{20FF}'
            | '\u{FE20}'..='\u{FE2F}'
    )
}

/// Byte length of a character reference (`&amp;`, `&#160;`, `&#x2014;`) at the start of `text`
pub fn entity_len(text: &str) -> Option<usize> {
    let body = text.strip_prefix('&')?;
    let end = body.find(';')?;
    let name = &body[..end];
    let valid = match name.strip_prefix('#') {
        Some(num) => match num.strip_prefix(['x', 'X']) {
            Some(hex) => !hex.is_empty() && hex.chars().all(|c| c.is_ascii_hexdigit()),
            None => !num.is_empty() && num.chars().all(|c| c.is_ascii_digit()),
        },
        None => {
            name.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
                && name.chars().all(|c| c.is_ascii_alphanumeric())
        }
    };
    (valid && name.len() <= 32).then_some(end + 2)
}

// ==================== Segments ====================

/// Lazy iterator over the non-empty text segments of a document
#[derive(Debug, Clone)]
pub struct Segments<'a> {
    doc: &'a str,
    pos: usize,
}

/// Text segments of `doc`, in document order
pub fn segments(doc: &str) -> Segments<'_> {
    Segments { doc, pos: 0 }
}

impl<'a> Iterator for Segments<'a> {
    type Item = TextSegment<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.pos < self.doc.len() {
            let start = self.pos;
            let rest = &self.doc[start..];

            let Some(lt) = rest.find('<') else {
                self.pos = self.doc.len();
                return Some(TextSegment { text: rest, position: start });
            };

            match rest[lt..].find('>') {
                Some(gt) => {
                    self.pos = start + lt + gt + 1;
                    if lt > 0 {
                        return Some(TextSegment {
                            text: &rest[..lt],
                            position: start,
                        });
                    }
                }
                None => {
                    // unclosed tag: literal text from here to the end
                    self.pos = self.doc.len();
                    return Some(TextSegment { text: rest, position: start });
                }
            }
        }
        None
    }
}

// ==================== Tokens ====================

/// Lazy iterator over the word tokens of one segment (segment-local offsets)
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    text: &'a str,
    pos: usize,
}

/// Word tokens of a single text segment
pub fn tokens(text: &str) -> Tokens<'_> {
    Tokens { text, pos: 0 }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let start = loop {
            let rest = &self.text[self.pos..];
            let Some((i, c)) = rest
                .char_indices()
                .find(|&(_, c)| is_word_char(c) || c == '&')
            else {
                self.pos = self.text.len();
                return None;
            };
            if c != '&' {
                break self.pos + i;
            }
            self.pos += i + entity_len(&rest[i..]).unwrap_or(1);
        };

        let mut end = start;
        let mut chars = self.text[start..].char_indices().peekable();

        while let Some((i, c)) = chars.next() {
            let joins = if is_word_char(c) || is_combining_mark(c) {
                true
            } else if is_apostrophe(c) {
                matches!(chars.peek(), Some(&(_, next)) if is_word_char(next))
            } else {
                false
            };
            if !joins {
                break;
            }
            end = start + i + c.len_utf8();
        }

        self.pos = end;
        Some(Token {
            text: &self.text[start..end],
            start_offset: start,
            end_offset: end,
        })
    }
}

/// All word tokens of a document, with offsets shifted into document coordinates
pub fn document_tokens(doc: &str) -> impl Iterator<Item = Token<'_>> + Clone {
    segments(doc).flat_map(|segment| {
        tokens(segment.text).map(move |token| Token {
            text: token.text,
            start_offset: segment.position + token.start_offset,
            end_offset: segment.position + token.end_offset,
        })
    })
}

/// Document text with every tag removed
pub fn plain_text(doc: &str) -> String {
    segments(doc).map(|segment| segment.text).collect()
}

/// Converts a byte offset into a codepoint offset
///
/// Offsets past the end clamp to the document's char count; an offset inside a
/// multi-byte char counts that char as not yet reached.
pub fn char_offset(doc: &str, byte_offset: usize) -> usize {
    doc.char_indices()
        .take_while(|&(i, _)| i < byte_offset)
        .count()
}
