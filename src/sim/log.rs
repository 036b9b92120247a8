/// Scrolling message log.
///
/// Lines are kept in insertion order; the panel shows at most
/// `visible` of them, chosen by `LogOrder`.

use serde::Deserialize;

use super::draw::TextSurface;

/// Panel size in characters. Row 0 stays blank, so one row fewer is
/// available for lines.
pub const PANEL_WIDTH: usize = 25;
pub const PANEL_HEIGHT: usize = 12;
pub const MAX_VISIBLE_LINES: usize = PANEL_HEIGHT - 1;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOrder {
    /// Newest lines, oldest of them on top.
    Recent,
    /// Longest lines first; equal lengths keep insertion order.
    Longest,
}

#[derive(Clone, Debug)]
pub struct MessageLog {
    lines: Vec<String>,
    visible: usize,
    history_limit: usize,
    order: LogOrder,
}

impl MessageLog {
    pub fn new(visible: usize, history_limit: usize, order: LogOrder) -> Self {
        let visible = visible.clamp(1, MAX_VISIBLE_LINES);
        MessageLog {
            lines: Vec::new(),
            visible,
            history_limit: history_limit.max(visible),
            order,
        }
    }

    pub fn add_line(&mut self, line: &str) {
        self.lines.push(capitalize(line));
        if self.lines.len() > self.history_limit {
            let excess = self.lines.len() - self.history_limit;
            self.lines.drain(..excess);
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[cfg(test)]
    pub fn last(&self) -> Option<&str> {
        self.lines.last().map(String::as_str)
    }

    /// Lines the panel shows, top to bottom. Never more than `visible`.
    pub fn visible_lines(&self) -> Vec<&str> {
        match self.order {
            LogOrder::Recent => {
                let start = self.lines.len().saturating_sub(self.visible);
                self.lines[start..].iter().map(String::as_str).collect()
            }
            LogOrder::Longest => {
                let mut sorted: Vec<&str> = self.lines.iter().map(String::as_str).collect();
                sorted.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()));
                sorted.truncate(self.visible);
                sorted
            }
        }
    }

    /// Clear the panel and draw the visible lines from row 1, column 1.
    pub fn render<S: TextSurface>(&self, surface: &mut S) {
        surface.clear();
        for (i, line) in self.visible_lines().into_iter().enumerate() {
            surface.draw_text(1, 1 + i, line);
        }
    }
}

/// Upper-case the first character, leave the rest untouched.
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::draw::TextBuffer;

    #[test]
    fn never_shows_more_than_visible() {
        let mut log = MessageLog::new(10, 200, LogOrder::Recent);
        for i in 0..57 {
            log.add_line(&format!("line {i}"));
            assert!(log.visible_lines().len() <= 10);
        }
        let shown = log.visible_lines();
        assert_eq!(shown.len(), 10);
        assert_eq!(shown[0], "Line 47");
        assert_eq!(shown[9], "Line 56");
    }

    #[test]
    fn longest_order_is_stable() {
        let mut log = MessageLog::new(3, 200, LogOrder::Longest);
        for s in ["ab", "abcd", "xy", "abc", "q"] {
            log.add_line(s);
        }
        assert_eq!(log.visible_lines(), vec!["Abcd", "Abc", "Ab"]);

        let mut log = MessageLog::new(10, 200, LogOrder::Longest);
        for i in 0..30 {
            log.add_line(&"x".repeat(i % 7));
        }
        assert_eq!(log.visible_lines().len(), 10);
    }

    #[test]
    fn capitalizes_only_first_char() {
        assert_eq!(capitalize("hello World"), "Hello World");
        assert_eq!(capitalize("élan"), "Élan");
        assert_eq!(capitalize(""), "");
        assert_eq!(capitalize("1abc"), "1abc");
    }

    #[test]
    fn history_is_bounded() {
        let mut log = MessageLog::new(10, 20, LogOrder::Recent);
        for i in 0..100 {
            log.add_line(&i.to_string());
        }
        assert_eq!(log.len(), 20);
        assert_eq!(log.last(), Some("99"));
    }

    #[test]
    fn visible_lines_fit_the_panel() {
        let mut log = MessageLog::new(50, 200, LogOrder::Recent);
        for i in 0..40 {
            log.add_line(&i.to_string());
        }
        assert_eq!(log.visible_lines().len(), MAX_VISIBLE_LINES);

        let mut panel = TextBuffer::new(PANEL_WIDTH, PANEL_HEIGHT);
        log.render(&mut panel);
        assert_eq!(panel.row(PANEL_HEIGHT - 1).trim(), "39");
    }

    #[test]
    fn render_draws_from_row_one() {
        let mut log = MessageLog::new(10, 200, LogOrder::Recent);
        log.add_line("you win");
        let mut panel = TextBuffer::new(12, 12);
        log.render(&mut panel);
        assert_eq!(panel.row(0).trim(), "");
        assert_eq!(panel.row(1), " You win    ");
    }
}
