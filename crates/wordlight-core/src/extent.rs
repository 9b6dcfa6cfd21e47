//! Finding the word under an offset.

use wordlight_buffer::{Span, TextSnapshot, is_word_char};

/// The run of text found around an offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extent {
    pub span: Span,
    /// False for whitespace and line ends
    pub significant: bool,
}

/// Finds the bounds of the "word" touching an offset.
pub trait ExtentFinder: Send + Sync {
    /// Returns `None` only when `offset` is outside the snapshot.
    fn extent_of_word_at(&self, snapshot: &TextSnapshot, offset: usize) -> Option<Extent>;
}

/// Splits lines into identifier runs, whitespace runs and single
/// punctuation characters.
#[derive(Debug, Clone, Copy, Default)]
pub struct WordNavigator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Word,
    Whitespace,
    Punctuation,
}

impl CharClass {
    fn of(c: char) -> Self {
        if is_word_char(c) {
            CharClass::Word
        } else if c.is_whitespace() {
            CharClass::Whitespace
        } else {
            CharClass::Punctuation
        }
    }
}

impl ExtentFinder for WordNavigator {
    fn extent_of_word_at(&self, snapshot: &TextSnapshot, offset: usize) -> Option<Extent> {
        let line = snapshot.line_containing(offset).ok()?;
        let chars: Vec<char> = line.text.chars().collect();
        let column = offset - line.start;

        // On the line break or at the end of the text
        if column >= chars.len() {
            return Some(Extent {
                span: Span::empty(offset),
                significant: false,
            });
        }

        let class = CharClass::of(chars[column]);
        let (mut start, mut end) = (column, column + 1);

        if class != CharClass::Punctuation {
            while start > 0 && CharClass::of(chars[start - 1]) == class {
                start -= 1;
            }
            while end < chars.len() && CharClass::of(chars[end]) == class {
                end += 1;
            }
        }

        Some(Extent {
            span: Span::new(line.start + start, line.start + end),
            significant: class != CharClass::Whitespace,
        })
    }
}
