//! Literal search over a snapshot.

use crate::snapshot::TextSnapshot;
use crate::span::Span;

/// Options for [`TextSnapshot::find_all`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FindOptions {
    /// Only accept matches not surrounded by word characters
    pub whole_word: bool,
    /// Compare characters exactly instead of by lowercase form
    pub match_case: bool,
}

impl FindOptions {
    /// Whole-word, case-sensitive matching.
    pub const EXACT_WORD: FindOptions = FindOptions {
        whole_word: true,
        match_case: true,
    };
}

/// Characters that make up a word for whole-word matching.
pub fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

impl TextSnapshot {
    /// Finds every non-overlapping occurrence of `pattern`, left to right.
    ///
    /// Returns character spans. An empty pattern matches nothing.
    pub fn find_all(&self, pattern: &str, options: FindOptions) -> Vec<Span> {
        let pattern: Vec<char> = pattern.chars().collect();
        if pattern.is_empty() || pattern.len() > self.len() {
            return Vec::new();
        }

        let text: Vec<char> = self.rope().chars().collect();
        let mut matches = Vec::new();
        let mut i = 0;

        while i + pattern.len() <= text.len() {
            let end = i + pattern.len();
            let candidate = &text[i..end];

            let found = chars_equal(candidate, &pattern, options.match_case)
                && (!options.whole_word || is_whole_word(&text, i, end));

            if found {
                matches.push(Span::new(i, end));
                i = end;
            } else {
                i += 1;
            }
        }

        matches
    }
}

fn chars_equal(a: &[char], b: &[char], match_case: bool) -> bool {
    if match_case {
        return a == b;
    }
    a.iter()
        .zip(b)
        .all(|(x, y)| x == y || x.to_lowercase().eq(y.to_lowercase()))
}

fn is_whole_word(text: &[char], start: usize, end: usize) -> bool {
    let before = start.checked_sub(1).map(|i| text[i]);
    let after = text.get(end).copied();
    !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TextBuffer;

    #[test]
    fn test_whole_word_match_case() {
        let snapshot = TextBuffer::from("dump dumpmem Dump _dump dump.x").snapshot();
        let found = snapshot.find_all("dump", FindOptions::EXACT_WORD);
        assert_eq!(found, vec![Span::new(0, 4), Span::new(24, 28)]);
    }

    #[test]
    fn test_substring_ignore_case() {
        let snapshot = TextBuffer::from("dump dumpmem Dump").snapshot();
        let found = snapshot.find_all("dump", FindOptions::default());
        assert_eq!(
            found,
            vec![Span::new(0, 4), Span::new(5, 9), Span::new(13, 17)]
        );
    }

    #[test]
    fn test_matches_do_not_overlap() {
        let snapshot = TextBuffer::from("aaaa").snapshot();
        let found = snapshot.find_all("aa", FindOptions::default());
        assert_eq!(found, vec![Span::new(0, 2), Span::new(2, 4)]);
    }

    #[test]
    fn test_path_literal() {
        let snapshot =
            TextBuffer::from("<file://C:/log.txt> and again C:/log.txt").snapshot();
        let found = snapshot.find_all("C:/log.txt", FindOptions::EXACT_WORD);
        assert_eq!(found, vec![Span::new(8, 18), Span::new(30, 40)]);
    }

    #[test]
    fn test_empty_pattern() {
        let snapshot = TextBuffer::from("abc").snapshot();
        assert!(snapshot.find_all("", FindOptions::EXACT_WORD).is_empty());
    }
}
