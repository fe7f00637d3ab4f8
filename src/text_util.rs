//! Helpers for showing slices of document text in a terminal.

use crate::similarity;

/// Number of characters shown when previewing a source document.
pub const SOURCE_PREVIEW_CHARS: usize = 200;

/// Lines kept on each side of the best-matching line in a snippet.
pub const SNIPPET_CONTEXT_LINES: usize = 2;

/// Lines shown from the top of a document when nothing matches.
pub const SNIPPET_HEAD_LINES: usize = 6;

/// Snippets longer than this are cut with [`preview`].
pub const SNIPPET_MAX_CHARS: usize = 400;

/// The first `max_chars` characters of `text`, with `...` appended when
/// anything was cut off.
///
/// # Examples
///
/// ```
/// use docqa::text_util::preview;
///
/// assert_eq!(preview("short", 10), "short");
/// assert_eq!(preview("a longer sentence", 8), "a longer...");
/// ```
pub fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_string(),
    }
}

/// A run of consecutive lines taken from a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snippet {
    pub text: String,
    /// 1-indexed line number of the first line in `text`.
    pub first_line: usize,
}

impl Snippet {
    /// The snippet with each line prefixed by its line number.
    pub fn numbered(&self) -> String {
        number_lines(&self.text, self.first_line)
    }
}

/// The lines around the line sharing the most words with `query`.
///
/// Words are compared the way the ranker compares them (lowercased,
/// whitespace-split), so each word of a multi-word query counts on its
/// own. Ties go to the earliest line. With no shared words at all, the
/// head of the document is returned. `None` for empty text.
///
/// # Examples
///
/// ```
/// use docqa::text_util::snippet_around;
///
/// let text = "intro\nsetup\nnotes\nthe rust compiler\nmore\nend";
/// let snippet = snippet_around(text, "Rust compiler flags").unwrap();
/// assert_eq!(snippet.first_line, 2);
/// assert!(snippet.text.contains("the rust compiler"));
/// ```
pub fn snippet_around(text: &str, query: &str) -> Option<Snippet> {
    let lines: Vec<&str> = text.lines().collect();
    if lines.is_empty() {
        return None;
    }

    let query_words = similarity::tokenize(query);
    let best = lines
        .iter()
        .enumerate()
        .map(|(idx, line)| {
            let shared = similarity::tokenize(line)
                .intersection(&query_words)
                .count();
            (idx, shared)
        })
        .filter(|&(_, shared)| shared > 0)
        .fold(None, |best: Option<(usize, usize)>, cur| match best {
            Some(b) if b.1 >= cur.1 => Some(b),
            _ => Some(cur),
        });

    let (start, end) = match best {
        Some((idx, _)) => (
            idx.saturating_sub(SNIPPET_CONTEXT_LINES),
            (idx + SNIPPET_CONTEXT_LINES + 1).min(lines.len()),
        ),
        None => (0, SNIPPET_HEAD_LINES.min(lines.len())),
    };

    Some(Snippet {
        text: preview(&lines[start..end].join("\n"), SNIPPET_MAX_CHARS),
        first_line: start + 1,
    })
}

/// Prefix each line with its number, right-aligned to the widest number.
///
/// ```
/// use docqa::text_util::number_lines;
///
/// assert_eq!(number_lines("a\nb", 9), " 9: a\n10: b");
/// ```
pub fn number_lines(text: &str, first_line: usize) -> String {
    let count = text.lines().count();
    let width = (first_line + count.saturating_sub(1)).to_string().len();
    text.lines()
        .zip(first_line..)
        .map(|(line, n)| format!("{n:>width$}: {line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// A window of lines selected by `get --from-line/--max-lines`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineWindow {
    pub text: String,
    pub first_line: usize,
    /// Lines past the end of the window that were left out.
    pub omitted: usize,
}

/// Select up to `max_lines` lines starting at 1-indexed `from_line`.
///
/// A `from_line` of 0 is treated as 1. Starting past the end gives an
/// empty window.
pub fn line_window(
    text: &str,
    from_line: usize,
    max_lines: Option<usize>,
) -> LineWindow {
    let first_line = from_line.max(1);
    let rest: Vec<&str> = text.lines().skip(first_line - 1).collect();
    let keep = max_lines.map_or(rest.len(), |max| max.min(rest.len()));

    LineWindow {
        text: rest[..keep].join("\n"),
        first_line,
        omitted: rest.len() - keep,
    }
}
