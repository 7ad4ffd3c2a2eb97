//! ANSI control sequences for driving the remote terminal.
//!
//! Remote sessions are rendered by writing escape sequences straight to the
//! SSH channel: the session enters the alternate screen once, and every
//! frame clears and redraws from the top-left.

/// Switch to the alternate screen buffer.
pub const ENTER_ALT_SCREEN: &str = "\x1b[?1049h";
/// Return to the normal screen buffer.
pub const LEAVE_ALT_SCREEN: &str = "\x1b[?1049l";
/// Hide the cursor.
pub const HIDE_CURSOR: &str = "\x1b[?25l";
/// Show the cursor.
pub const SHOW_CURSOR: &str = "\x1b[?25h";
/// Erase the whole screen.
pub const CLEAR_SCREEN: &str = "\x1b[2J";
/// Move the cursor to row 1, column 1.
pub const CURSOR_HOME: &str = "\x1b[H";

/// Build one full frame: clear, home, then `text` with bare newlines
/// converted to CRLF for the SSH channel.
pub fn frame(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 16);
    out.push_str(CLEAR_SCREEN);
    out.push_str(CURSOR_HOME);
    out.push_str(&text.replace('\n', "\r\n"));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_clears_before_drawing() {
        let out = frame("Hi");
        assert!(out.starts_with(CLEAR_SCREEN));
        assert!(out.ends_with("Hi"));
    }

    #[test]
    fn frame_converts_newlines_to_crlf() {
        let out = frame("a\nb\n\nc");
        assert!(out.ends_with("a\r\nb\r\n\r\nc"));
        assert!(!out.contains("\r\r"));
    }
}
