//! UI rendering
//!
//! Converts page state into terminal output using ratatui widgets. Pure:
//! takes state, renders widgets, no I/O.

use placard_app::Page;
use ratatui::{Frame, widgets::Paragraph};

/// Render the greeting frame at the top-left of the terminal.
pub fn render(frame: &mut Frame, page: &Page) {
    let paragraph = Paragraph::new(page.view());
    frame.render_widget(paragraph, frame.area());
}

#[cfg(test)]
mod tests {
    use placard_app::Page;
    use ratatui::{Terminal, backend::TestBackend};

    #[test]
    fn buffer_matches_greeting_frame() {
        let backend = TestBackend::new(30, 7);
        let mut terminal = Terminal::new(backend).unwrap();
        let page = Page::new("Hi");

        terminal.draw(|frame| super::render(frame, &page)).unwrap();

        terminal.backend().assert_buffer_lines([
            "******                        ",
            "* Hi *                        ",
            "******                        ",
            "                              ",
            "Press Ctrl+C to exit          ",
            "                              ",
            "                              ",
        ]);
    }

    #[test]
    fn frame_text_is_stable() {
        insta::assert_snapshot!(Page::new("Hi").view(), @r"
        ******
        * Hi *
        ******

        Press Ctrl+C to exit
        ");
    }

    #[test]
    fn redraw_is_stable() {
        let backend = TestBackend::new(30, 7);
        let mut terminal = Terminal::new(backend).unwrap();
        let page = Page::new("Hi");

        terminal.draw(|frame| super::render(frame, &page)).unwrap();
        let first = terminal.backend().buffer().clone();

        terminal.draw(|frame| super::render(frame, &page)).unwrap();
        assert_eq!(terminal.backend().buffer(), &first);
    }
}
