//! Typing metrics: edit distance, accuracy and speed.
//!
//! All lengths are counted in `char`s so that multi-byte passages score the
//! same way as ASCII ones.

use crate::error::ScoreError;

/// Levenshtein distance between `reference` and `typed`.
///
/// The result is always in `0..=max(len(reference), len(typed))`.
///
/// ```
/// use typometer::scorer::distance;
///
/// assert_eq!(distance("kitten", "sitting"), 3);
/// assert_eq!(distance("", "abc"), 3);
/// ```
pub fn distance(reference: &str, typed: &str) -> usize {
    let typed: Vec<char> = typed.chars().collect();

    // row i of the table, starting with i = 0: j insertions
    let mut prev: Vec<usize> = (0..=typed.len()).collect();
    let mut curr = vec![0; typed.len() + 1];

    for (i, r) in reference.chars().enumerate() {
        curr[0] = i + 1;
        for (j, t) in typed.iter().enumerate() {
            let cost = usize::from(r != *t);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[typed.len()]
}

/// Accuracy in percent derived from the edit distance.
///
/// Two empty strings are a perfect match.
pub fn accuracy_percent(reference: &str, typed: &str) -> f64 {
    let max_len = reference.chars().count().max(typed.chars().count());
    if max_len == 0 {
        return 100.0;
    }

    100.0 * (1.0 - distance(reference, typed) as f64 / max_len as f64)
}

/// Cheaper accuracy approximation: share of reference positions that were
/// typed correctly, comparing character by character over the overlap.
///
/// A single skipped character shifts every following position, so this
/// underrates typists that drop a letter. Prefer [`accuracy_percent`].
pub fn positional_accuracy(reference: &str, typed: &str) -> f64 {
    let reference_len = reference.chars().count();
    if reference_len == 0 {
        return if typed.is_empty() { 100.0 } else { 0.0 };
    }

    let matching = reference
        .chars()
        .zip(typed.chars())
        .filter(|(r, t)| r == t)
        .count();

    matching as f64 / reference_len as f64 * 100.0
}

/// Number of whitespace separated words in `text`.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Typing speed in words per minute.
///
/// Returns [`ScoreError::InvalidDuration`] when `elapsed_secs` is zero,
/// negative or not finite instead of producing an infinite speed.
pub fn words_per_minute(typed: &str, elapsed_secs: f64) -> Result<f64, ScoreError> {
    if !elapsed_secs.is_finite() || elapsed_secs <= 0.0 {
        return Err(ScoreError::InvalidDuration(elapsed_secs));
    }

    Ok(word_count(typed) as f64 / (elapsed_secs / 60.0))
}

/// Every metric reported at the end of a test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Score {
    pub elapsed_secs: f64,
    pub words: usize,
    pub wpm: f64,
    pub accuracy: f64,
    pub positional_accuracy: f64,
    pub distance: usize,
}

/// Scores a finished attempt.
///
/// An invalid duration (a test ended before any time was measured) reports a
/// speed of `0.0` rather than failing the whole score.
pub fn score(reference: &str, typed: &str, elapsed_secs: f64) -> Score {
    let wpm = match words_per_minute(typed, elapsed_secs) {
        Ok(wpm) => wpm,
        Err(e) => {
            tracing::warn!(error = %e, "speed unavailable, reporting 0 wpm");
            0.0
        }
    };

    Score {
        elapsed_secs,
        words: word_count(typed),
        wpm,
        accuracy: accuracy_percent(reference, typed),
        positional_accuracy: positional_accuracy(reference, typed),
        distance: distance(reference, typed),
    }
}
