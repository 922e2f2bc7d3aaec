//! Entry of the one-time code sent by email, one character per box.


/// The state of a row of single character inputs.
///
/// Typing fills the focused box and moves to the next one, Backspace and Delete clear it and move
/// back. The entry locks once the last box is filled while every other box holds a character, or
/// when a code of exactly the right length is pasted. A locked entry ignores input until
/// [`Self::reset`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpEntry {
    boxes: Vec<Option<char>>,
    focus: usize,
    locked: bool,
}

impl OtpEntry {
    /// Number of boxes in the code form rendered by the relying party.
    pub const DEFAULT_LENGTH: usize = 6;

    /// An empty entry of `len` boxes, at least one.
    pub fn new(len: usize) -> Self {
        Self {
            boxes: vec![None; len.max(1)],
            focus: 0,
            locked: false,
        }
    }

    /// Number of boxes.
    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    /// Whether no box holds a character.
    pub fn is_empty(&self) -> bool {
        self.boxes.iter().all(Option::is_none)
    }

    /// Index of the focused box.
    pub fn focus(&self) -> usize {
        self.focus
    }

    /// Move the focus, e.g. when the user clicks a box. Out of range indexes are ignored.
    pub fn set_focus(&mut self, index: usize) {
        if index < self.len() {
            self.focus = index;
        }
    }

    /// Whether the entry stopped taking input.
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// The character in box `index`.
    pub fn get(&self, index: usize) -> Option<char> {
        self.boxes.get(index).copied().flatten()
    }

    /// The code, once every box is filled.
    pub fn code(&self) -> Option<String> {
        self.boxes.iter().copied().collect()
    }

    /// Type `text` into the focused box. Only its first letter or digit is kept, text without
    /// any clears the box.
    ///
    /// Returns the code when this completed the entry.
    pub fn input(&mut self, text: &str) -> Option<String> {
        if self.locked {
            return None;
        }
        let Some(symbol) = text.chars().find(char::is_ascii_alphanumeric) else {
            self.boxes[self.focus] = None;
            return None;
        };

        self.boxes[self.focus] = Some(symbol);
        if self.focus + 1 < self.len() {
            self.focus += 1;
            return None;
        }

        let code = self.code()?;
        self.locked = true;
        Some(code)
    }

    /// Handle Backspace or Delete: clear the focused box and move back one box.
    pub fn erase(&mut self) {
        if self.locked {
            return;
        }
        self.boxes[self.focus] = None;
        self.focus = self.focus.saturating_sub(1);
    }

    /// Paste a whole code. Anything but exactly [`Self::len`] letters or digits is ignored.
    ///
    /// Returns the code when it was accepted.
    pub fn paste(&mut self, text: &str) -> Option<String> {
        let text = text.trim();
        if self.locked
            || text.chars().count() != self.len()
            || !text.chars().all(|c| c.is_ascii_alphanumeric())
        {
            return None;
        }

        for (slot, symbol) in self.boxes.iter_mut().zip(text.chars()) {
            *slot = Some(symbol);
        }
        self.focus = self.len() - 1;
        self.locked = true;
        Some(text.to_owned())
    }

    /// Clear every box and unlock.
    pub fn reset(&mut self) {
        self.boxes.fill(None);
        self.focus = 0;
        self.locked = false;
    }
}

impl Default for OtpEntry {
    fn default() -> Self {
        Self::new(Self::DEFAULT_LENGTH)
    }
}
