//! Splits plain text into bounded, overlapping chunks.
//!
//! Paragraphs (blank-line separated) are packed greedily up to `max_size`
//! characters. A paragraph longer than that is split on sentence boundaries
//! and packed the same way, each new sentence-level chunk seeded with the
//! trailing words of the previous one (at most `overlap` characters).
//! Sentences that do not fit next to a full seed are cut at word boundaries.
//! Chunk bodies are slices of the source, so whitespace inside a paragraph
//! survives; only the seed is joined with a single space.
//! Sizes are measured in `char`s, not bytes.

use tracing::debug;

use crate::config::ChunkingSettings;
use crate::error::Result;

const PARAGRAPH_SEP: &str = "\n\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunker {
    max_size: usize,
    overlap: usize,
}

impl Default for Chunker {
    fn default() -> Self {
        let ChunkingSettings { max_size, overlap } = ChunkingSettings::default();
        Self { max_size, overlap }
    }
}

impl Chunker {
    /// Fails with a configuration error when `max_size <= overlap`.
    pub fn new(max_size: usize, overlap: usize) -> Result<Self> {
        Self::from_settings(&ChunkingSettings { max_size, overlap })
    }

    pub fn from_settings(settings: &ChunkingSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self { max_size: settings.max_size, overlap: settings.overlap })
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Always returns at least one chunk; empty input yields one empty chunk.
    pub fn chunk(&self, text: &str) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut buffer = String::new();
        let mut buffer_len = 0usize;

        for paragraph in paragraphs(text) {
            let para_len = char_len(&paragraph);
            if para_len > self.max_size {
                flush(&mut buffer, &mut buffer_len, &mut chunks);
                chunks.extend(self.split_long_paragraph(&paragraph));
                continue;
            }
            if buffer_len > 0 && buffer_len + PARAGRAPH_SEP.len() + para_len > self.max_size {
                flush(&mut buffer, &mut buffer_len, &mut chunks);
            }
            if buffer_len > 0 {
                buffer.push_str(PARAGRAPH_SEP);
                buffer_len += PARAGRAPH_SEP.len();
            }
            buffer.push_str(&paragraph);
            buffer_len += para_len;
        }
        flush(&mut buffer, &mut buffer_len, &mut chunks);

        if chunks.is_empty() {
            debug!(chars = char_len(text), "no paragraphs found; slicing at fixed width");
            return self.slice_fixed(text);
        }
        chunks
    }

    /// Sentence-level packing for a paragraph longer than `max_size`.
    ///
    /// Chunk bodies are slices of `paragraph`, so internal whitespace is kept.
    /// Every chunk after the first starts with the trailing words of its
    /// predecessor plus one space.
    fn split_long_paragraph(&self, paragraph: &str) -> Vec<String> {
        let budget = self.piece_budget();
        let mut out = Vec::new();
        let mut seed = String::new();
        let mut body: Option<Span> = None;

        let pieces = sentence_spans(paragraph)
            .into_iter()
            .flat_map(|sentence| word_pieces(paragraph, sentence, budget));
        for piece in pieces {
            let Some((start, end)) = body else {
                body = Some(piece);
                continue;
            };
            let seed_len = if seed.is_empty() { 0 } else { char_len(&seed) + 1 };
            if seed_len + char_len(&paragraph[start..piece.1]) <= self.max_size {
                body = Some((start, piece.1));
                continue;
            }
            let chunk = with_seed(&seed, &paragraph[start..end]);
            let room = self.max_size.saturating_sub(char_len(&paragraph[piece.0..piece.1]) + 1);
            seed = trailing_words(&chunk, self.overlap.min(room));
            out.push(chunk);
            body = Some(piece);
        }
        if let Some((start, end)) = body {
            out.push(with_seed(&seed, &paragraph[start..end]));
        }
        out
    }

    /// Largest piece that still leaves room for a full overlap seed.
    fn piece_budget(&self) -> usize {
        if self.overlap == 0 {
            self.max_size
        } else {
            self.max_size.saturating_sub(self.overlap + 1).max(1)
        }
    }

    /// Last resort for input without any paragraph content.
    fn slice_fixed(&self, text: &str) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        if chars.is_empty() {
            return vec![text.to_string()];
        }
        let stride = self.max_size - self.overlap;
        let mut out = Vec::new();
        let mut start = 0;
        loop {
            let end = (start + self.max_size).min(chars.len());
            out.push(chars[start..end].iter().collect());
            if end == chars.len() {
                break;
            }
            start += stride;
        }
        out
    }
}

/// Validate the parameters and chunk `text` in one call.
pub fn chunk(text: &str, max_size: usize, overlap: usize) -> Result<Vec<String>> {
    Ok(Chunker::new(max_size, overlap)?.chunk(text))
}

fn flush(buffer: &mut String, buffer_len: &mut usize, chunks: &mut Vec<String>) {
    if *buffer_len > 0 {
        chunks.push(std::mem::take(buffer));
        *buffer_len = 0;
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn paragraphs(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut lines: Vec<&str> = Vec::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            push_paragraph(&mut lines, &mut out);
        } else {
            lines.push(line);
        }
    }
    push_paragraph(&mut lines, &mut out);
    out
}

fn push_paragraph(lines: &mut Vec<&str>, out: &mut Vec<String>) {
    if lines.is_empty() {
        return;
    }
    let paragraph = lines.join("\n");
    lines.clear();
    let trimmed = paragraph.trim();
    if !trimmed.is_empty() {
        out.push(trimmed.to_string());
    }
}

/// Byte range into a paragraph.
type Span = (usize, usize);

fn with_seed(seed: &str, body: &str) -> String {
    if seed.is_empty() {
        body.to_string()
    } else {
        format!("{seed} {body}")
    }
}

/// Sentences end at `.`, `?` or `!` followed by whitespace. Spans exclude
/// surrounding whitespace.
fn sentence_spans(text: &str) -> Vec<Span> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut iter = text.char_indices().peekable();
    while let Some((i, c)) = iter.next() {
        if !matches!(c, '.' | '?' | '!') {
            continue;
        }
        if let Some(&(next_at, next)) = iter.peek() {
            if next.is_whitespace() {
                out.extend(trim_span(text, start, i + c.len_utf8()));
                start = next_at;
            }
        }
    }
    out.extend(trim_span(text, start, text.len()));
    out
}

fn trim_span(text: &str, start: usize, end: usize) -> Option<Span> {
    let slice = &text[start..end];
    let trimmed = slice.trim();
    if trimmed.is_empty() {
        return None;
    }
    let lead = slice.len() - slice.trim_start().len();
    Some((start + lead, start + lead + trimmed.len()))
}

/// Split an over-long sentence at word boundaries into spans of at most
/// `budget` characters. A single word longer than that stays whole.
fn word_pieces(text: &str, sentence: Span, budget: usize) -> Vec<Span> {
    let (start, end) = sentence;
    if char_len(&text[start..end]) <= budget {
        return vec![sentence];
    }
    let mut out = Vec::new();
    let mut piece: Option<Span> = None;
    for (ws, we) in word_spans(&text[start..end], start) {
        piece = match piece {
            Some((ps, pe)) if char_len(&text[ps..we]) > budget => {
                out.push((ps, pe));
                Some((ws, we))
            }
            Some((ps, _)) => Some((ps, we)),
            None => Some((ws, we)),
        };
    }
    out.extend(piece);
    out
}

fn word_spans(text: &str, offset: usize) -> Vec<Span> {
    let mut out = Vec::new();
    let mut word_start = None;
    for (i, c) in text.char_indices() {
        if c.is_whitespace() {
            if let Some(s) = word_start.take() {
                out.push((offset + s, offset + i));
            }
        } else if word_start.is_none() {
            word_start = Some(i);
        }
    }
    if let Some(s) = word_start {
        out.push((offset + s, offset + text.len()));
    }
    out
}

/// Longest suffix of whole words that fits in `budget` characters.
fn trailing_words(chunk: &str, budget: usize) -> String {
    let mut taken: Vec<&str> = Vec::new();
    let mut len = 0usize;
    for word in chunk.split_whitespace().rev() {
        let extra = char_len(word) + usize::from(!taken.is_empty());
        if len + extra > budget {
            break;
        }
        len += extra;
        taken.push(word);
    }
    taken.reverse();
    taken.join(" ")
}
