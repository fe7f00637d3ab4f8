//! Chunking utilities for splitting long documents into overlapping segments.
//!
//! Windows are a fixed number of characters wide. A window that would cut
//! a sentence in half is pulled back to the last `.` or newline, as long as
//! that keeps most of the window. Consecutive windows overlap so a phrase
//! that straddles a boundary still appears whole in one chunk.

/// Default maximum chunk size in characters.
pub const DEFAULT_CHUNK_SIZE: usize = 1000;

/// Default overlap between chunks in characters.
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;

/// A sentence break is only used if it falls past this fraction of the window.
pub const BOUNDARY_THRESHOLD: f64 = 0.7;

/// A chunk of text from a larger document.
///
/// Produced by [`split_into_chunks`]. `text` is trimmed, and
/// `start_offset` is the byte offset of that trimmed text in the original
/// document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// The chunk text content.
    pub text: String,
    /// Zero-based chunk index within the document.
    pub index: usize,
    /// Byte offset where this chunk starts in the original document.
    pub start_offset: usize,
}

/// Split text into overlapping chunks that prefer sentence boundaries.
///
/// Sizes are measured in characters, so multi-byte UTF-8 text never splits
/// inside a code point.
///
/// # Examples
///
/// ```
/// use docqa::chunking::split_into_chunks;
///
/// // Short text returns a single chunk
/// let chunks = split_into_chunks("Hello, world!", 1000, 200);
/// assert_eq!(chunks.len(), 1);
/// assert_eq!(chunks[0].text, "Hello, world!");
///
/// // Long text gets split
/// let text = "A sentence that repeats. ".repeat(100);
/// let chunks = split_into_chunks(&text, 1000, 200);
/// assert!(chunks.len() >= 3);
/// ```
pub fn split_into_chunks(
    text: &str,
    max_chunk_size: usize,
    overlap: usize,
) -> Vec<Chunk> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let max_chunk_size = max_chunk_size.max(1);
    let char_count = text.chars().count();

    // Short text doesn't need chunking
    if char_count <= max_chunk_size {
        return trimmed_chunk(text, 0, text.len(), 0).into_iter().collect();
    }

    // Build a map of char index -> byte index for O(1) lookups
    let char_to_byte: Vec<usize> = text
        .char_indices()
        .map(|(byte_idx, _)| byte_idx)
        .chain(std::iter::once(text.len()))
        .collect();
    let chars: Vec<char> = text.chars().collect();

    let min_break = (max_chunk_size as f64 * BOUNDARY_THRESHOLD) as usize;
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < char_count {
        let mut end = (start + max_chunk_size).min(char_count);

        if end < char_count
            && let Some(boundary) =
                find_sentence_boundary(&chars, start + min_break, end)
        {
            end = boundary + 1;
        }

        if let Some(chunk) = trimmed_chunk(
            text,
            char_to_byte[start],
            char_to_byte[end],
            chunks.len(),
        ) {
            chunks.push(chunk);
        }

        if end >= char_count {
            break;
        }

        // Always move forward, even when overlap >= the window just taken.
        start = end.saturating_sub(overlap).max(start + 1);
    }

    chunks
}

/// Last `.` or `\n` strictly after `after` and before `end`.
fn find_sentence_boundary(
    chars: &[char],
    after: usize,
    end: usize,
) -> Option<usize> {
    (after + 1..end)
        .rev()
        .find(|&i| chars[i] == '.' || chars[i] == '\n')
}

fn trimmed_chunk(
    text: &str,
    start_byte: usize,
    end_byte: usize,
    index: usize,
) -> Option<Chunk> {
    let window = &text[start_byte..end_byte];
    let leading = window.len() - window.trim_start().len();
    let trimmed = window.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(Chunk {
        text: trimmed.to_string(),
        index,
        start_offset: start_byte + leading,
    })
}
