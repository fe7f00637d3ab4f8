//! Frequency-based summaries and keyword-matching answers.
//!
//! Neither function uses a language model. A summary is the few sentences
//! whose words are most frequent across the whole text. An answer is the
//! first sentences that mention a keyword from the question.

use std::collections::HashMap;

/// Maximum number of sentences kept in a summary.
pub const SUMMARY_SENTENCES: usize = 3;

/// Maximum number of sentences returned as an answer.
pub const ANSWER_SENTENCES: usize = 2;

/// Words this short or shorter are ignored when counting or matching.
const MIN_KEYWORD_CHARS: usize = 3;

/// Returned by [`answer_question`] when no sentence mentions a keyword.
pub const NO_ANSWER: &str = "I couldn't find specific information in the documents to answer your question.";

/// Split on runs of sentence terminators, dropping blank pieces.
fn split_sentences(text: &str) -> Vec<&str> {
    text.split(['.', '!', '?'])
        .filter(|s| !s.trim().is_empty())
        .collect()
}

fn is_keyword(word: &str) -> bool {
    word.chars().count() > MIN_KEYWORD_CHARS
}

/// Build a summary from the highest-scoring sentences of `text`.
///
/// A sentence scores the sum of document-wide frequencies of its words.
/// Sentences come out in score order (ties in document order), joined
/// with `". "` and terminated with a period.
///
/// # Examples
///
/// ```
/// use docqa::summarizer::generate_summary;
///
/// let text = "Rust keeps memory safe. Cats sleep. Rust compiles code into fast binaries.";
/// let summary = generate_summary(text);
/// assert!(summary.starts_with("Rust compiles code into fast binaries"));
/// assert!(summary.ends_with('.'));
/// ```
pub fn generate_summary(text: &str) -> String {
    let sentences = split_sentences(text);
    if sentences.is_empty() {
        return String::new();
    }

    let lowered = text.to_lowercase();
    let mut frequencies: HashMap<&str, usize> = HashMap::new();
    for word in lowered.split_whitespace().filter(|w| is_keyword(w)) {
        *frequencies.entry(word).or_default() += 1;
    }

    let mut scored: Vec<(&str, usize)> = sentences
        .iter()
        .map(|sentence| {
            let score = sentence
                .to_lowercase()
                .split_whitespace()
                .map(|word| frequencies.get(word).copied().unwrap_or(0))
                .sum();
            (sentence.trim(), score)
        })
        .collect();

    scored.sort_by(|a, b| b.1.cmp(&a.1));

    let top: Vec<&str> = scored
        .into_iter()
        .take(SUMMARY_SENTENCES)
        .map(|(sentence, _)| sentence)
        .collect();

    format!("{}.", top.join(". "))
}

/// Answer `question` with the first sentences of `context` that mention
/// one of its keywords.
///
/// Keywords are the question's lowercase words longer than three
/// characters, with surrounding punctuation removed. Matching is a plain
/// substring test against each lowercased sentence.
///
/// # Examples
///
/// ```
/// use docqa::summarizer::{answer_question, NO_ANSWER};
///
/// let context = "The launch is in March. Budget was approved.";
/// assert_eq!(answer_question("When is the launch?", context), "The launch is in March");
/// assert_eq!(answer_question("Who?", context), NO_ANSWER);
/// ```
pub fn answer_question(question: &str, context: &str) -> String {
    let keywords: Vec<String> = question
        .to_lowercase()
        .split_whitespace()
        .map(|word| {
            word.trim_matches(|c: char| !c.is_alphanumeric()).to_string()
        })
        .filter(|word| is_keyword(word))
        .collect();

    if keywords.is_empty() {
        return NO_ANSWER.to_string();
    }

    let relevant: Vec<&str> = split_sentences(context)
        .into_iter()
        .filter(|sentence| {
            let lowered = sentence.to_lowercase();
            keywords.iter().any(|k| lowered.contains(k.as_str()))
        })
        .map(str::trim)
        .take(ANSWER_SENTENCES)
        .collect();

    if relevant.is_empty() {
        return NO_ANSWER.to_string();
    }

    relevant.join(" ")
}
