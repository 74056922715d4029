//! Masked Input
//!
//! Keeps a text field shaped like a fixed pattern such as `(000) 000-0000`,
//! where `0` marks a digit placeholder and every other character is a
//! literal. Edits are applied to the digits only and the field is then
//! re-rendered from a blank copy of the pattern.

use brisk_config::coerce::digits;
use brisk_dom::TextSelection;

/// Placeholder character in mask patterns
pub const PLACEHOLDER: char = '0';

/// Phone patterns for 10, 11 and 12 digits
pub const PHONE_MASKS: [&str; 3] = ["(000) 000-0000", "0+(000) 000-0000", "00+(000) 000-0000"];

/// Pattern plus expected digit count
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    pattern: Vec<char>,
    digit_count: usize,
}

/// Edit intercepted from an input event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    Insert(String),
    DeleteBackward,
    DeleteForward,
}

/// Result of applying an edit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Leave value and caret alone
    Rejected,
    Inserted { value: String, caret: usize },
    Deleted { value: String, caret: usize },
}

impl Mask {
    /// Mask over an arbitrary pattern
    pub fn new(pattern: &str) -> Self {
        let pattern: Vec<char> = pattern.chars().collect();
        let digit_count = pattern.iter().filter(|&&c| c == PLACEHOLDER).count();
        Self { pattern, digit_count }
    }

    /// Phone mask for `requested` digits; anything outside 10..=12 means 10
    pub fn phone(requested: usize) -> Self {
        let count = if (10..=12).contains(&requested) { requested } else { 10 };
        Self::new(PHONE_MASKS[count - 10])
    }

    pub fn pattern(&self) -> String {
        self.pattern.iter().collect()
    }

    pub fn digit_count(&self) -> usize {
        self.digit_count
    }

    /// Pattern with placeholders blanked and `digits` filled in from the left
    pub fn render(&self, digits: &str) -> String {
        let mut digits = digits.chars();
        let mut exhausted = false;
        self.pattern
            .iter()
            .map(|&c| {
                if c != PLACEHOLDER {
                    return c;
                }
                if exhausted {
                    return ' ';
                }
                match digits.next() {
                    Some(d) => d,
                    None => {
                        exhausted = true;
                        ' '
                    }
                }
            })
            .collect()
    }

    /// Apply `edit` to `value` whose selection is `caret`
    pub fn apply(&self, value: &str, caret: TextSelection, edit: &Edit) -> Outcome {
        let chars: Vec<char> = value.chars().collect();
        let sel = caret.clamp(chars.len());
        let before: String = chars[..sel.start].iter().collect();
        let selected: String = chars[sel.start..sel.end].iter().collect();
        let after: String = chars[sel.end..].iter().collect();

        match edit {
            Edit::Insert(text) => {
                let kept = digits(&before).len() + digits(&after).len();
                let room = self.digit_count.saturating_sub(kept);
                let typed = digits(text);
                if typed.is_empty() {
                    return self.type_through(value, sel.start, text);
                }
                let captured: String = typed.chars().take(room).collect();
                if captured.is_empty() {
                    return Outcome::Rejected;
                }
                let caret_digits = digits(&before).len() + captured.len();
                let all = format!("{}{}{}", digits(&before), captured, digits(&after));
                Outcome::Inserted {
                    value: self.render(&all),
                    caret: self.caret_after(caret_digits, caret_digits < all.len()),
                }
            }
            Edit::DeleteBackward | Edit::DeleteForward => {
                let (kept_before, kept_after) = if !selected.is_empty() {
                    (digits(&before), digits(&after))
                } else if *edit == Edit::DeleteBackward {
                    let mut head = digits(&before);
                    if head.pop().is_none() {
                        return Outcome::Rejected;
                    }
                    (head, digits(&after))
                } else {
                    let tail = digits(&after);
                    if tail.is_empty() {
                        return Outcome::Rejected;
                    }
                    (digits(&before), tail[1..].to_string())
                };
                let caret = match edit {
                    Edit::DeleteForward if selected.is_empty() => sel.start,
                    _ => self.caret_after(kept_before.len(), false),
                };
                Outcome::Deleted {
                    value: self.render(&format!("{kept_before}{kept_after}")),
                    caret,
                }
            }
        }
    }

    /// A literal typed where the pattern has that literal moves past it
    fn type_through(&self, value: &str, at: usize, text: &str) -> Outcome {
        let mut typed = text.chars();
        match (typed.next(), typed.next(), self.pattern.get(at)) {
            (Some(c), None, Some(&expected)) if c == expected && c != PLACEHOLDER => {
                Outcome::Inserted {
                    value: self.render(&digits(value)),
                    caret: at + 1,
                }
            }
            _ => Outcome::Rejected,
        }
    }

    /// Caret offset just past the `count`-th placeholder. With `skip_literals`
    /// the caret continues over literals up to the next placeholder.
    fn caret_after(&self, count: usize, skip_literals: bool) -> usize {
        let placeholders: Vec<usize> = self
            .pattern
            .iter()
            .enumerate()
            .filter(|&(_, &c)| c == PLACEHOLDER)
            .map(|(i, _)| i)
            .collect();
        if count == 0 {
            return placeholders.first().copied().unwrap_or(0);
        }
        let Some(&last) = placeholders.get(count - 1) else {
            return self.pattern.len();
        };
        match placeholders.get(count) {
            Some(&next) if skip_literals => next,
            _ => last + 1,
        }
    }
}
