use parking_lot::Mutex;

/// Free-form operator-visible messages, appended by the control core and
/// drained by the telemetry reporter, which clears the field after each
/// send.
pub struct MessageBoard {
    buffer: Mutex<String>,
}

impl MessageBoard {
    pub fn new() -> Self {
        Self {
            buffer: Mutex::new(String::new()),
        }
    }

    pub fn append(&self, message: &str) {
        let mut buffer = self.buffer.lock();

        if !buffer.is_empty() {
            buffer.push_str("; ");
        }
        buffer.push_str(message);
    }

    /// Current contents, leaving the board empty.
    pub fn drain(&self) -> String {
        std::mem::take(&mut *self.buffer.lock())
    }
}

impl Default for MessageBoard {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_accumulate_until_drained() {
        let board = MessageBoard::new();

        board.append("heating on");
        board.append("tank temperature limit reached");

        assert_eq!(board.drain(), "heating on; tank temperature limit reached");
        assert_eq!(board.drain(), "");
    }
}
