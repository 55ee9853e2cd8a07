//! Headless line-oriented screen driven by the VTE parser.

use std::collections::VecDeque;

use tracing::debug;
use vte::{Params, Perform};

use tend_core::Dimensions;

use crate::Emulator;

/// Headless emulator keeping a bounded scrollback of text lines.
///
/// Line feeds commit the current line; cursor addressing beyond the current
/// line is ignored.
pub struct VtScreen {
    parser: vte::Parser,
    state: ScreenState,
    focused: bool,
    focus_count: usize,
    disposed: bool,
}

impl std::fmt::Debug for VtScreen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VtScreen")
            .field("dimensions", &self.state.dimensions)
            .field("lines", &self.state.lines.len())
            .field("focused", &self.focused)
            .field("disposed", &self.disposed)
            .finish_non_exhaustive()
    }
}

impl VtScreen {
    /// Create a screen with the given size and scrollback capacity.
    pub fn new(dimensions: Dimensions, scrollback_lines: usize) -> Self {
        Self {
            parser: vte::Parser::new(),
            state: ScreenState {
                dimensions,
                scrollback_limit: scrollback_lines.max(1),
                lines: VecDeque::new(),
                current: Vec::new(),
                cursor_col: 0,
            },
            focused: false,
            focus_count: 0,
            disposed: false,
        }
    }

    /// Committed lines followed by the line being written.
    pub fn lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = self.state.lines.iter().cloned().collect();
        lines.push(self.state.current_line());
        lines
    }

    /// The last `rows` lines, as a UI would show them.
    pub fn visible_lines(&self) -> Vec<String> {
        let lines = self.lines();
        let rows = self.state.dimensions.rows as usize;
        let start = lines.len().saturating_sub(rows);
        lines[start..].to_vec()
    }

    /// All text joined with newlines.
    pub fn contents(&self) -> String {
        self.lines().join("\n")
    }

    /// Whether the emulator currently holds focus.
    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// How many times focus was given.
    pub fn focus_count(&self) -> usize {
        self.focus_count
    }

    /// Whether the emulator was disposed.
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

impl Emulator for VtScreen {
    fn write(&mut self, data: &str) {
        if self.disposed {
            return;
        }
        for byte in data.as_bytes() {
            self.parser.advance(&mut self.state, *byte);
        }
    }

    fn resize(&mut self, dimensions: Dimensions) {
        debug!("Screen resized to {}", dimensions);
        self.state.dimensions = dimensions;
    }

    fn focus(&mut self) {
        self.focused = true;
        self.focus_count += 1;
    }

    fn dispose(&mut self) {
        self.focused = false;
        self.disposed = true;
    }

    fn dimensions(&self) -> Dimensions {
        self.state.dimensions
    }
}

struct ScreenState {
    dimensions: Dimensions,
    scrollback_limit: usize,
    lines: VecDeque<String>,
    current: Vec<char>,
    cursor_col: usize,
}

impl ScreenState {
    fn cols(&self) -> usize {
        (self.dimensions.cols as usize).max(1)
    }

    fn current_line(&self) -> String {
        let line: String = self.current.iter().collect();
        line.trim_end().to_string()
    }

    fn commit_line(&mut self) {
        let line = self.current_line();
        self.lines.push_back(line);
        while self.lines.len() > self.scrollback_limit {
            self.lines.pop_front();
        }
        self.current.clear();
        self.cursor_col = 0;
    }

    fn clear(&mut self) {
        self.lines.clear();
        self.current.clear();
        self.cursor_col = 0;
    }

    fn first_param(params: &Params) -> u16 {
        params
            .iter()
            .next()
            .and_then(|param| param.first().copied())
            .unwrap_or(0)
    }
}

impl Perform for ScreenState {
    fn print(&mut self, c: char) {
        if self.cursor_col >= self.cols() {
            self.commit_line();
        }
        if self.cursor_col < self.current.len() {
            self.current[self.cursor_col] = c;
        } else {
            self.current.resize(self.cursor_col, ' ');
            self.current.push(c);
        }
        self.cursor_col += 1;
    }

    fn execute(&mut self, byte: u8) {
        match byte {
            // BS
            0x08 => self.cursor_col = self.cursor_col.saturating_sub(1),
            // HT, tab stops every 8 columns
            0x09 => {
                let next_tab = (self.cursor_col / 8 + 1) * 8;
                self.cursor_col = next_tab.min(self.cols() - 1);
            }
            // LF
            0x0A => self.commit_line(),
            // CR
            0x0D => self.cursor_col = 0,
            _ => {}
        }
    }

    fn csi_dispatch(
        &mut self,
        params: &Params,
        _intermediates: &[u8],
        _ignore: bool,
        action: char,
    ) {
        let n = Self::first_param(params);
        match action {
            // Erase in line
            'K' => match n {
                0 => self.current.truncate(self.cursor_col),
                1 => {
                    let end = self.cursor_col.min(self.current.len());
                    self.current[..end].fill(' ');
                }
                _ => self.current.clear(),
            },
            // Erase in display
            'J' if n >= 2 => self.clear(),
            // Cursor forward / backward
            'C' => self.cursor_col = (self.cursor_col + n.max(1) as usize).min(self.cols() - 1),
            'D' => self.cursor_col = self.cursor_col.saturating_sub(n.max(1) as usize),
            // Cursor horizontal absolute (1-based)
            'G' => self.cursor_col = (n.max(1) as usize - 1).min(self.cols() - 1),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn screen() -> VtScreen {
        VtScreen::new(Dimensions::new(5, 20), 100)
    }

    #[test]
    fn test_plain_text() {
        let mut screen = screen();
        screen.write("hello");
        assert_eq!(screen.lines(), vec!["hello"]);
    }

    #[test]
    fn test_crlf_commits_lines() {
        let mut screen = screen();
        screen.write("one\r\ntwo\r\nthree");
        assert_eq!(screen.lines(), vec!["one", "two", "three"]);
        assert_eq!(screen.contents(), "one\ntwo\nthree");
    }

    #[test]
    fn test_carriage_return_overwrites() {
        let mut screen = screen();
        screen.write("progress 10%\rprogress 99%");
        assert_eq!(screen.lines(), vec!["progress 99%"]);
    }

    #[test]
    fn test_backspace_then_overwrite() {
        let mut screen = screen();
        screen.write("lx\x08s");
        assert_eq!(screen.lines(), vec!["ls"]);
    }

    #[test]
    fn test_sgr_sequences_are_not_printed() {
        let mut screen = screen();
        screen.write("\x1b[1;32mok\x1b[0m done");
        assert_eq!(screen.lines(), vec!["ok done"]);
    }

    #[test]
    fn test_erase_line() {
        let mut screen = screen();
        screen.write("abcdef\r\x1b[3C\x1b[K");
        assert_eq!(screen.lines(), vec!["abc"]);
    }

    #[test]
    fn test_clear_screen() {
        let mut screen = screen();
        screen.write("a\r\nb\r\n\x1b[2Jc");
        assert_eq!(screen.lines(), vec!["c"]);
    }

    #[test]
    fn test_wraps_at_column_limit() {
        let mut screen = VtScreen::new(Dimensions::new(5, 4), 100);
        screen.write("abcdefg");
        assert_eq!(screen.lines(), vec!["abcd", "efg"]);
    }

    #[test]
    fn test_scrollback_is_bounded() {
        let mut screen = VtScreen::new(Dimensions::new(5, 20), 3);
        for i in 0..10 {
            screen.write(&format!("line {i}\r\n"));
        }
        assert_eq!(screen.lines(), vec!["line 7", "line 8", "line 9", ""]);
    }

    #[test]
    fn test_visible_lines() {
        let mut screen = VtScreen::new(Dimensions::new(2, 20), 100);
        screen.write("a\r\nb\r\nc");
        assert_eq!(screen.visible_lines(), vec!["b", "c"]);
    }

    #[test]
    fn test_escape_split_across_writes() {
        let mut screen = screen();
        screen.write("x\x1b[");
        screen.write("31my");
        assert_eq!(screen.lines(), vec!["xy"]);
    }

    #[test]
    fn test_focus_and_dispose() {
        let mut screen = screen();
        assert!(!screen.is_focused());
        screen.focus();
        screen.focus();
        assert!(screen.is_focused());
        assert_eq!(screen.focus_count(), 2);

        screen.dispose();
        assert!(screen.is_disposed());
        assert!(!screen.is_focused());

        screen.write("ignored");
        assert_eq!(screen.lines(), vec![""]);
    }

    #[test]
    fn test_resize() {
        let mut screen = screen();
        screen.resize(Dimensions::new(40, 120));
        assert_eq!(screen.dimensions(), Dimensions::new(40, 120));
    }
}
