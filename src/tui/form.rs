use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

/// Fields of the create panel, in Tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Title,
    ImageUrl,
    FilePath,
}

impl FormField {
    pub fn next(self) -> Self {
        match self {
            FormField::Title => FormField::ImageUrl,
            FormField::ImageUrl => FormField::FilePath,
            FormField::FilePath => FormField::Title,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            FormField::Title => FormField::FilePath,
            FormField::ImageUrl => FormField::Title,
            FormField::FilePath => FormField::ImageUrl,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FormField::Title => "Title",
            FormField::ImageUrl => "Image URL",
            FormField::FilePath => "Upload file",
        }
    }

    pub fn placeholder(self) -> &'static str {
        match self {
            FormField::Title => "Enter new task...",
            FormField::ImageUrl => "Or paste image URL",
            FormField::FilePath => "Path to a local image, Enter to load",
        }
    }
}

// ── Text editing ──────────────────────────────────────────────────────

/// Byte offset of the start of the word before `pos`.
fn word_start_before(s: &str, pos: usize) -> usize {
    let trimmed = s[..pos].trim_end();
    trimmed
        .char_indices()
        .rev()
        .find(|(_, c)| c.is_whitespace())
        .map_or(0, |(i, c)| i + c.len_utf8())
}

fn prev_char_boundary(s: &str, pos: usize) -> usize {
    s[..pos].chars().next_back().map_or(pos, |c| pos - c.len_utf8())
}

fn next_char_boundary(s: &str, pos: usize) -> usize {
    s[pos..].chars().next().map_or(pos, |c| pos + c.len_utf8())
}

/// Apply a key to a single-line buffer with a byte cursor. Returns `true` if
/// the key was consumed.
pub fn edit_line(buf: &mut String, cursor: &mut usize, code: KeyCode, modifiers: KeyModifiers) -> bool {
    *cursor = (*cursor).min(buf.len());
    let ctrl = modifiers.contains(KeyModifiers::CONTROL);
    let alt = modifiers.contains(KeyModifiers::ALT);

    match code {
        KeyCode::Left if alt => *cursor = word_start_before(buf, *cursor),
        KeyCode::Left => *cursor = prev_char_boundary(buf, *cursor),
        KeyCode::Right => *cursor = next_char_boundary(buf, *cursor),
        KeyCode::Home => *cursor = 0,
        KeyCode::End => *cursor = buf.len(),
        KeyCode::Char('a') if ctrl => *cursor = 0,
        KeyCode::Char('e') if ctrl => *cursor = buf.len(),
        KeyCode::Char('u') if ctrl => {
            buf.drain(..*cursor);
            *cursor = 0;
        }
        KeyCode::Char('w') if ctrl => {
            let start = word_start_before(buf, *cursor);
            buf.drain(start..*cursor);
            *cursor = start;
        }
        KeyCode::Backspace if alt => {
            let start = word_start_before(buf, *cursor);
            buf.drain(start..*cursor);
            *cursor = start;
        }
        KeyCode::Backspace => {
            let start = prev_char_boundary(buf, *cursor);
            buf.drain(start..*cursor);
            *cursor = start;
        }
        KeyCode::Delete => {
            let end = next_char_boundary(buf, *cursor);
            buf.drain(*cursor..end);
        }
        KeyCode::Char(c) if !ctrl && !alt => {
            buf.insert(*cursor, c);
            *cursor += c.len_utf8();
        }
        _ => return false,
    }
    true
}

/// The buffer with a block cursor drawn at `cursor`.
pub fn with_cursor(buf: &str, cursor: usize) -> String {
    let (before, after) = buf.split_at(cursor.min(buf.len()));
    format!("{before}\u{2588}{after}")
}

// ── Rendering helpers ─────────────────────────────────────────────────

/// Clear a centred `width`×`height` panel, draw its border and return the
/// inner area.
pub fn render_modal(
    frame: &mut Frame,
    title: &str,
    border_style: Style,
    width: u16,
    height: u16,
) -> Rect {
    let area = frame.area();
    let w = width.min(area.width.saturating_sub(4));
    let h = height.min(area.height.saturating_sub(4));
    let panel = Rect::new(
        area.width.saturating_sub(w) / 2,
        area.height.saturating_sub(h) / 2,
        w,
        h,
    );

    frame.render_widget(Clear, panel);
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style);
    let inner = block.inner(panel);
    frame.render_widget(block, panel);
    inner
}

/// One-line hint bar of `(key, description)` pairs.
pub fn render_hints(
    frame: &mut Frame,
    area: Rect,
    hints: &[(String, String)],
    key_style: Style,
    desc_style: Style,
) {
    let spans: Vec<Span<'_>> = hints
        .iter()
        .flat_map(|(key, desc)| {
            [
                Span::styled(format!(" {key}"), key_style),
                Span::styled(format!(":{desc} "), desc_style),
            ]
        })
        .collect();
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_keys(buf: &mut String, cursor: &mut usize, keys: &[(KeyCode, KeyModifiers)]) {
        for (code, mods) in keys {
            edit_line(buf, cursor, *code, *mods);
        }
    }

    #[test]
    fn field_order_cycles() {
        assert_eq!(FormField::Title.next(), FormField::ImageUrl);
        assert_eq!(FormField::FilePath.next(), FormField::Title);
        assert_eq!(FormField::Title.prev(), FormField::FilePath);
        for f in [FormField::Title, FormField::ImageUrl, FormField::FilePath] {
            assert_eq!(f.next().prev(), f);
        }
    }

    #[test]
    fn typing_inserts_at_cursor() {
        let mut buf = String::from("Buy mlk");
        let mut cursor = 6;
        assert!(edit_line(&mut buf, &mut cursor, KeyCode::Char('i'), KeyModifiers::NONE));
        assert_eq!(buf, "Buy milk");
        assert_eq!(cursor, 7);
    }

    #[test]
    fn shifted_characters_are_inserted() {
        let mut buf = String::new();
        let mut cursor = 0;
        edit_line(&mut buf, &mut cursor, KeyCode::Char('B'), KeyModifiers::SHIFT);
        assert_eq!(buf, "B");
    }

    #[test]
    fn backspace_and_delete_respect_multibyte_chars() {
        let mut buf = String::from("café!");
        let mut cursor = buf.len() - 1; // before '!'
        edit_line(&mut buf, &mut cursor, KeyCode::Backspace, KeyModifiers::NONE);
        assert_eq!(buf, "caf!");
        assert_eq!(cursor, 3);
        edit_line(&mut buf, &mut cursor, KeyCode::Delete, KeyModifiers::NONE);
        assert_eq!(buf, "caf");
    }

    #[test]
    fn word_and_line_deletion() {
        let mut buf = String::from("http://x /a.png");
        let mut cursor = buf.len();
        edit_line(&mut buf, &mut cursor, KeyCode::Char('w'), KeyModifiers::CONTROL);
        assert_eq!(buf, "http://x ");
        edit_line(&mut buf, &mut cursor, KeyCode::Backspace, KeyModifiers::ALT);
        assert_eq!(buf, "");
        assert_eq!(cursor, 0);

        let mut buf = String::from("one two");
        let mut cursor = 4;
        edit_line(&mut buf, &mut cursor, KeyCode::Char('u'), KeyModifiers::CONTROL);
        assert_eq!(buf, "two");
        assert_eq!(cursor, 0);
    }

    #[test]
    fn cursor_movement() {
        let mut buf = String::from("hello world");
        let mut cursor = buf.len();
        type_keys(
            &mut buf,
            &mut cursor,
            &[(KeyCode::Left, KeyModifiers::ALT)],
        );
        assert_eq!(cursor, 6);
        type_keys(
            &mut buf,
            &mut cursor,
            &[(KeyCode::Home, KeyModifiers::NONE), (KeyCode::Right, KeyModifiers::NONE)],
        );
        assert_eq!(cursor, 1);
        type_keys(&mut buf, &mut cursor, &[(KeyCode::End, KeyModifiers::NONE)]);
        assert_eq!(cursor, 11);
        type_keys(&mut buf, &mut cursor, &[(KeyCode::Right, KeyModifiers::NONE)]);
        assert_eq!(cursor, 11);
    }

    #[test]
    fn unhandled_keys_are_not_consumed() {
        let mut buf = String::new();
        let mut cursor = 0;
        assert!(!edit_line(&mut buf, &mut cursor, KeyCode::Tab, KeyModifiers::NONE));
        assert!(!edit_line(&mut buf, &mut cursor, KeyCode::Char('p'), KeyModifiers::CONTROL));
    }

    #[test]
    fn cursor_rendering() {
        assert_eq!(with_cursor("abc", 0), "\u{2588}abc");
        assert_eq!(with_cursor("abc", 2), "ab\u{2588}c");
        assert_eq!(with_cursor("abc", 9), "abc\u{2588}");
    }
}
