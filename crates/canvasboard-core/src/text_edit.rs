//! In-place editing of a text box.

use crate::input::Key;
use crate::shapes::{ShapeId, Text};

/// Result of feeding a key into an editing session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    /// Content changed.
    Changed,
    /// Key consumed, content unchanged.
    Unchanged,
    /// Editing should end.
    Exit,
}

/// Cursor state for a text box being edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEditState {
    target: ShapeId,
    /// Cursor position as a char index.
    cursor: usize,
    /// Everything is selected; the next edit replaces the whole content.
    all_selected: bool,
}

impl TextEditState {
    /// Enter editing with all content selected.
    pub fn select_all(target: ShapeId, text: &Text) -> Self {
        Self {
            target,
            cursor: text.content.chars().count(),
            all_selected: true,
        }
    }

    pub fn target(&self) -> ShapeId {
        self.target
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_all_selected(&self) -> bool {
        self.all_selected
    }

    /// Apply a key to the text.
    pub fn apply(&mut self, text: &mut Text, key: &Key) -> EditOutcome {
        match key {
            Key::Escape => EditOutcome::Exit,
            Key::Character(c) => {
                self.insert(text, *c);
                EditOutcome::Changed
            }
            Key::Enter => {
                self.insert(text, '\n');
                EditOutcome::Changed
            }
            Key::Backspace => self.delete_backward(text),
            // Forward delete is not part of the editing keymap.
            Key::Delete => EditOutcome::Unchanged,
        }
    }

    fn insert(&mut self, text: &mut Text, c: char) {
        if self.all_selected {
            text.content.clear();
            self.cursor = 0;
            self.all_selected = false;
        }
        let byte = byte_index(&text.content, self.cursor);
        text.content.insert(byte, c);
        self.cursor += 1;
    }

    fn delete_backward(&mut self, text: &mut Text) -> EditOutcome {
        if self.all_selected {
            self.all_selected = false;
            self.cursor = 0;
            if text.content.is_empty() {
                return EditOutcome::Unchanged;
            }
            text.content.clear();
            return EditOutcome::Changed;
        }
        if self.cursor == 0 {
            return EditOutcome::Unchanged;
        }
        self.cursor -= 1;
        let byte = byte_index(&text.content, self.cursor);
        text.content.remove(byte);
        EditOutcome::Changed
    }
}

/// Byte offset of a char index, clamped to the end of the string.
fn byte_index(s: &str, char_index: usize) -> usize {
    s.char_indices()
        .nth(char_index)
        .map_or(s.len(), |(byte, _)| byte)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_first_keystroke_overwrites_placeholder() {
        let mut text = Text::placeholder();
        let mut edit = TextEditState::select_all(Uuid::new_v4(), &text);
        assert_eq!(edit.apply(&mut text, &Key::Character('H')), EditOutcome::Changed);
        assert_eq!(edit.apply(&mut text, &Key::Character('i')), EditOutcome::Changed);
        assert_eq!(text.content(), "Hi");
    }

    #[test]
    fn test_enter_backspace_escape() {
        let mut text = Text::new("");
        let mut edit = TextEditState::select_all(Uuid::new_v4(), &text);
        for key in [Key::Character('a'), Key::Enter, Key::Character('b')] {
            edit.apply(&mut text, &key);
        }
        assert_eq!(text.content(), "a\nb");
        assert_eq!(edit.apply(&mut text, &Key::Backspace), EditOutcome::Changed);
        assert_eq!(text.content(), "a\n");
        assert_eq!(edit.apply(&mut text, &Key::Escape), EditOutcome::Exit);
    }

    #[test]
    fn test_backspace_on_selection_clears() {
        let mut text = Text::new("héllo");
        let mut edit = TextEditState::select_all(Uuid::new_v4(), &text);
        assert_eq!(edit.apply(&mut text, &Key::Backspace), EditOutcome::Changed);
        assert_eq!(text.content(), "");
        assert_eq!(edit.apply(&mut text, &Key::Backspace), EditOutcome::Unchanged);
    }

    #[test]
    fn test_multibyte_cursor() {
        let mut text = Text::new("");
        let mut edit = TextEditState::select_all(Uuid::new_v4(), &text);
        edit.apply(&mut text, &Key::Character('é'));
        edit.apply(&mut text, &Key::Character('ü'));
        edit.apply(&mut text, &Key::Backspace);
        assert_eq!(text.content(), "é");
        assert_eq!(edit.cursor(), 1);
    }
}
