//! Greedy text wrapping over measured glyph widths.
//!
//! Wrapping is a pure function of the input text, the point size, the
//! available width, and a width-measurement callback. Explicit newlines are
//! hard breaks; within a paragraph, words accumulate greedily and the
//! *candidate* line string is measured on every step, so inter-word spaces
//! are counted at their real width rather than approximated by summing word
//! widths.

/// Measures the advance width of a string at a given point size.
///
/// The engine measures through this seam so tests can pin wrap decisions
/// with a deterministic stub instead of real font metrics.
pub trait TextMeasure {
    fn text_width(&self, text: &str, size: f64) -> f64;
}

/// Wraps `text` to fit `max_width`, returning the rendered lines in order.
///
/// Rules:
/// - explicit `\n` splits into independent wrap units;
/// - words never break mid-word: a single word wider than `max_width` gets a
///   line of its own;
/// - runs of whitespace collapse to a single space on output;
/// - an empty unit yields an explicit empty line, but trailing empty lines
///   of the whole block are trimmed.
pub fn wrap(text: &str, measure: &dyn TextMeasure, size: f64, max_width: f64) -> Vec<String> {
    let mut lines = Vec::new();

    for unit in text.split('\n') {
        let words: Vec<&str> = unit.split_whitespace().collect();
        if words.is_empty() {
            lines.push(String::new());
            continue;
        }

        let mut current = String::new();
        for word in words {
            if current.is_empty() {
                // First word of a line always lands, even if overwide.
                current.push_str(word);
                continue;
            }
            let candidate = format!("{} {}", current, word);
            if measure.text_width(&candidate, size) <= max_width {
                current = candidate;
            } else {
                lines.push(current);
                current = word.to_string();
            }
        }
        lines.push(current);
    }

    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every char is `self.0` points wide, spaces included.
    struct FixedCharWidth(f64);

    impl TextMeasure for FixedCharWidth {
        fn text_width(&self, text: &str, _size: f64) -> f64 {
            text.chars().count() as f64 * self.0
        }
    }

    #[test]
    fn test_single_line_fits() {
        let lines = wrap("Hello world", &FixedCharWidth(6.0), 12.0, 200.0);
        assert_eq!(lines, vec!["Hello world"]);
    }

    #[test]
    fn test_breaks_each_word() {
        // "Alpha beta" is 10 chars = 60pt, over the 40pt budget, so every
        // word lands on its own line.
        let lines = wrap("Alpha beta gamma", &FixedCharWidth(6.0), 10.0, 40.0);
        assert_eq!(lines, vec!["Alpha", "beta", "gamma"]);
    }

    #[test]
    fn test_explicit_newline_is_hard_break() {
        let lines = wrap("Hello\nWorld", &FixedCharWidth(6.0), 12.0, 200.0);
        assert_eq!(lines, vec!["Hello", "World"]);
    }

    #[test]
    fn test_empty_string_yields_no_lines() {
        let lines = wrap("", &FixedCharWidth(6.0), 12.0, 200.0);
        assert!(lines.is_empty(), "empty input should wrap to zero lines");
    }

    #[test]
    fn test_whitespace_only_yields_no_lines() {
        let lines = wrap("   \t  ", &FixedCharWidth(6.0), 12.0, 200.0);
        assert!(lines.is_empty());
    }

    #[test]
    fn test_interior_blank_line_preserved() {
        let lines = wrap("para one\n\npara two", &FixedCharWidth(6.0), 12.0, 500.0);
        assert_eq!(lines, vec!["para one", "", "para two"]);
    }

    #[test]
    fn test_trailing_blank_lines_trimmed() {
        let lines = wrap("text\n\n\n", &FixedCharWidth(6.0), 12.0, 500.0);
        assert_eq!(lines, vec!["text"]);
    }

    #[test]
    fn test_overwide_word_placed_alone() {
        // "incomprehensibilities" (21 chars = 126pt) exceeds 60pt but is
        // never split; neighbours wrap around it.
        let lines = wrap(
            "a incomprehensibilities b",
            &FixedCharWidth(6.0),
            12.0,
            60.0,
        );
        assert_eq!(lines, vec!["a", "incomprehensibilities", "b"]);
    }

    #[test]
    fn test_whitespace_runs_collapse() {
        let lines = wrap("one    two\tthree", &FixedCharWidth(6.0), 12.0, 500.0);
        assert_eq!(lines, vec!["one two three"]);
    }

    #[test]
    fn test_candidate_string_counts_joining_space() {
        // "ab cd" is 5 chars = 30pt. A word-sum approximation would see
        // 24pt and keep one line; measuring the candidate breaks it.
        let lines = wrap("ab cd", &FixedCharWidth(6.0), 12.0, 25.0);
        assert_eq!(lines, vec!["ab", "cd"]);
    }

    #[test]
    fn test_wrap_is_idempotent() {
        let measure = FixedCharWidth(6.0);
        let first = wrap(
            "The quick brown fox jumps over the lazy dog",
            &measure,
            10.0,
            100.0,
        );
        let rejoined = first.join("\n");
        let second = wrap(&rejoined, &measure, 10.0, 100.0);
        assert_eq!(first, second, "re-wrapping wrapped output must be stable");
    }

    #[test]
    fn test_zero_max_width_still_emits_words() {
        // Degenerate budget: every word overflows, each lands alone. The
        // caller decides whether a zero-width box draws at all.
        let lines = wrap("a b", &FixedCharWidth(6.0), 12.0, 0.0);
        assert_eq!(lines, vec!["a", "b"]);
    }
}
