//! Text Selection
//!
//! Caret and selection offsets inside a text control, in characters.

/// Selection direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionDirection {
    #[default]
    None,
    Forward,
    Backward,
}

/// Selection range within a text control's value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextSelection {
    pub start: usize,
    pub end: usize,
    pub direction: SelectionDirection,
}

impl TextSelection {
    /// Selection spanning `start..end` (swapped if reversed)
    pub fn new(start: usize, end: usize) -> Self {
        if start <= end {
            Self { start, end, direction: SelectionDirection::Forward }
        } else {
            Self { start: end, end: start, direction: SelectionDirection::Backward }
        }
    }

    /// Collapsed caret at `offset`
    pub fn collapsed_at(offset: usize) -> Self {
        Self { start: offset, end: offset, direction: SelectionDirection::None }
    }

    /// Whether start == end
    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }

    /// Clamp both ends to a value of `len` characters
    pub fn clamp(self, len: usize) -> Self {
        Self {
            start: self.start.min(len),
            end: self.end.min(len),
            direction: self.direction,
        }
    }

    /// Replace the selected span of `value` with `text`, returning the new
    /// value and the caret after the inserted text
    pub fn replace(&self, value: &str, text: &str) -> (String, TextSelection) {
        let chars: Vec<char> = value.chars().collect();
        let sel = self.clamp(chars.len());
        let mut out: String = chars[..sel.start].iter().collect();
        out.push_str(text);
        out.extend(&chars[sel.end..]);
        (out, Self::collapsed_at(sel.start + text.chars().count()))
    }

    /// Apply a deletion: the selected span, or one character before
    /// (`forward == false`) or after the caret
    pub fn delete(&self, value: &str, forward: bool) -> (String, TextSelection) {
        let chars: Vec<char> = value.chars().collect();
        let sel = self.clamp(chars.len());
        let (from, to) = if !sel.is_collapsed() {
            (sel.start, sel.end)
        } else if forward {
            (sel.start, (sel.start + 1).min(chars.len()))
        } else {
            (sel.start.saturating_sub(1), sel.start)
        };
        let mut out: String = chars[..from].iter().collect();
        out.extend(&chars[to..]);
        (out, Self::collapsed_at(from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reversed_selection() {
        let sel = TextSelection::new(5, 2);
        assert_eq!((sel.start, sel.end), (2, 5));
        assert_eq!(sel.direction, SelectionDirection::Backward);
    }

    #[test]
    fn test_replace_selection() {
        let (value, caret) = TextSelection::new(1, 3).replace("abcd", "XY");
        assert_eq!(value, "aXYd");
        assert_eq!(caret, TextSelection::collapsed_at(3));
    }

    #[test]
    fn test_delete_backward_and_forward() {
        let caret = TextSelection::collapsed_at(2);
        assert_eq!(caret.delete("abcd", false).0, "acd");
        assert_eq!(caret.delete("abcd", true).0, "abd");
        assert_eq!(TextSelection::collapsed_at(0).delete("ab", false).0, "ab");
    }
}
