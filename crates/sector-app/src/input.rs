//! Terminal-agnostic keyboard input and line editing.

/// Keyboard input abstraction.
///
/// Decouples application logic from terminal libraries (crossterm, termion,
/// etc.) enabling deterministic simulation testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    /// Printable character.
    Char(char),
    /// Enter/Return key (submit).
    Enter,
    /// Backspace key (delete character before cursor).
    Backspace,
    /// Delete key (delete character at cursor).
    Delete,
    /// Tab key (next login field).
    Tab,
    /// Escape key (terminate session).
    Esc,
    /// Left arrow key.
    Left,
    /// Right arrow key.
    Right,
    /// Up arrow key.
    Up,
    /// Down arrow key.
    Down,
    /// Home key (cursor to start).
    Home,
    /// End key (cursor to end).
    End,
}

/// Single-line text buffer with a cursor.
///
/// The cursor counts characters, not bytes, so multi-byte input edits
/// cleanly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputLine {
    buffer: String,
    cursor: usize,
}

impl InputLine {
    /// Empty line.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current text.
    pub fn text(&self) -> &str {
        &self.buffer
    }

    /// Cursor position in characters.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// True if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Apply an editing key. Returns `true` if the line changed.
    ///
    /// Enter, Tab, Esc, Up and Down are not editing keys and are ignored.
    pub fn edit(&mut self, key: KeyInput) -> bool {
        let len = self.buffer.chars().count();
        match key {
            KeyInput::Char(c) => {
                let at = self.byte_offset(self.cursor);
                self.buffer.insert(at, c);
                self.cursor += 1;
                true
            },
            KeyInput::Backspace if self.cursor > 0 => {
                self.cursor -= 1;
                let at = self.byte_offset(self.cursor);
                self.buffer.remove(at);
                true
            },
            KeyInput::Delete if self.cursor < len => {
                let at = self.byte_offset(self.cursor);
                self.buffer.remove(at);
                true
            },
            KeyInput::Left if self.cursor > 0 => {
                self.cursor -= 1;
                true
            },
            KeyInput::Right if self.cursor < len => {
                self.cursor += 1;
                true
            },
            KeyInput::Home => {
                self.cursor = 0;
                true
            },
            KeyInput::End => {
                self.cursor = len;
                true
            },
            _ => false,
        }
    }

    /// Take the text and reset the line.
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.buffer)
    }

    fn byte_offset(&self, chars: usize) -> usize {
        self.buffer.char_indices().nth(chars).map_or(self.buffer.len(), |(i, _)| i)
    }
}

impl From<&str> for InputLine {
    fn from(text: &str) -> Self {
        Self { buffer: text.to_string(), cursor: text.chars().count() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(text: &str) -> InputLine {
        let mut line = InputLine::new();
        for c in text.chars() {
            line.edit(KeyInput::Char(c));
        }
        line
    }

    #[test]
    fn typing_appends_at_cursor() {
        let mut line = typed("hllo");
        line.edit(KeyInput::Home);
        line.edit(KeyInput::Right);
        line.edit(KeyInput::Char('e'));
        assert_eq!(line.text(), "hello");
        assert_eq!(line.cursor(), 2);
    }

    #[test]
    fn multibyte_characters_edit_cleanly() {
        let mut line = typed("héé");
        line.edit(KeyInput::Backspace);
        line.edit(KeyInput::Left);
        line.edit(KeyInput::Delete);
        assert_eq!(line.text(), "h");
    }

    #[test]
    fn backspace_at_start_is_ignored() {
        let mut line = InputLine::new();
        assert!(!line.edit(KeyInput::Backspace));
        assert!(!line.edit(KeyInput::Delete));
    }

    #[test]
    fn take_clears_line() {
        let mut line = InputLine::from("abc");
        assert_eq!(line.take(), "abc");
        assert!(line.is_empty());
        assert_eq!(line.cursor(), 0);
    }
}
