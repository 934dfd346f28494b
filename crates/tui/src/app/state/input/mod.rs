/// Single-line editor backing the path composer.
#[derive(Default)]
pub struct InputState {
    pub buffer: Vec<char>,
    pub cursor: usize,
}

impl InputState {
    pub fn current(&self) -> String {
        self.buffer.iter().collect()
    }

    pub fn set_from(&mut self, value: &str) {
        self.buffer = value.chars().filter(|ch| *ch != '\n' && *ch != '\r').collect();
        self.cursor = self.buffer.len();
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.cursor = 0;
    }

    pub fn insert_char(&mut self, ch: char) {
        if ch == '\n' || ch == '\r' {
            return;
        }
        self.buffer.insert(self.cursor, ch);
        self.cursor += 1;
    }

    pub fn insert_str(&mut self, value: &str) {
        for ch in value.chars() {
            self.insert_char(ch);
        }
    }

    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        self.buffer.remove(self.cursor);
    }

    pub fn delete(&mut self) {
        if self.cursor >= self.buffer.len() {
            return;
        }
        self.buffer.remove(self.cursor);
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        if self.cursor < self.buffer.len() {
            self.cursor += 1;
        }
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.buffer.len();
    }

    pub fn kill_to_end(&mut self) {
        if self.cursor < self.buffer.len() {
            self.buffer.truncate(self.cursor);
        }
    }

    /// Deletes back to the previous path separator (or whitespace).
    pub fn delete_segment_back(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let is_separator = |ch: char| ch == '/' || ch == '\\' || ch.is_whitespace();
        while self.cursor > 0 && is_separator(self.buffer[self.cursor - 1]) {
            self.cursor -= 1;
            self.buffer.remove(self.cursor);
        }
        while self.cursor > 0 && !is_separator(self.buffer[self.cursor - 1]) {
            self.cursor -= 1;
            self.buffer.remove(self.cursor);
        }
    }
}
