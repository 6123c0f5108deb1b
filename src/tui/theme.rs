use ratatui::style::{Color, Modifier, Style};
use serde::Deserialize;

use crate::api::TaskStatus;

/// Colours used by the board renderer.
///
/// Every slot can be overridden via `[theme]` in `config.toml`.
#[derive(Debug, Clone)]
pub struct Theme {
    // ── Borders ───────────────────────────────────────────────
    pub border_focused: Color,
    pub border_unfocused: Color,

    // ── Text ──────────────────────────────────────────────────
    pub text_primary: Color,
    pub text_secondary: Color,
    pub text_accent: Color,

    // ── Columns ───────────────────────────────────────────────
    pub todo: Color,
    pub in_progress: Color,
    pub done: Color,
    pub trash: Color,
    pub archive: Color,

    // ── Feedback ──────────────────────────────────────────────
    pub banner_error: Color,
    pub spinner: Color,

    // ── Forms ─────────────────────────────────────────────────
    pub form_border: Color,
    pub form_highlight: Color,
    pub form_dim: Color,

    // ── Misc ──────────────────────────────────────────────────
    pub selection_indicator: Color,
    pub image_link: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            border_focused: Color::Cyan,
            border_unfocused: Color::DarkGray,

            text_primary: Color::White,
            text_secondary: Color::DarkGray,
            text_accent: Color::Cyan,

            todo: Color::Cyan,
            in_progress: Color::Yellow,
            done: Color::Green,
            trash: Color::Red,
            archive: Color::Magenta,

            banner_error: Color::Red,
            spinner: Color::Yellow,

            form_border: Color::Yellow,
            form_highlight: Color::Yellow,
            form_dim: Color::DarkGray,

            selection_indicator: Color::Cyan,
            image_link: Color::Blue,
        }
    }
}

impl Theme {
    pub fn focused_border(&self) -> Style {
        Style::default().fg(self.border_focused)
    }

    pub fn unfocused_border(&self) -> Style {
        Style::default().fg(self.border_unfocused)
    }

    pub fn status_color(&self, status: TaskStatus) -> Color {
        match status {
            TaskStatus::Todo => self.todo,
            TaskStatus::InProgress => self.in_progress,
            TaskStatus::Done => self.done,
            TaskStatus::Trash => self.trash,
            TaskStatus::Archive => self.archive,
        }
    }

    /// Column header style for a status.
    pub fn status_style(&self, status: TaskStatus) -> Style {
        Style::default()
            .fg(self.status_color(status))
            .add_modifier(Modifier::BOLD)
    }

    pub fn banner_style(&self) -> Style {
        Style::default()
            .fg(self.text_primary)
            .bg(self.banner_error)
            .add_modifier(Modifier::BOLD)
    }

    pub fn secondary(&self) -> Style {
        Style::default().fg(self.text_secondary)
    }
}

// ── Config deserialization ────────────────────────────────────────────

/// All-optional mirror of [`Theme`] for the `[theme]` section.
///
/// Only `Some` fields override the default.
#[derive(Debug, Default, Deserialize, Clone)]
pub struct ThemeConfig {
    pub border_focused: Option<String>,
    pub border_unfocused: Option<String>,

    pub text_primary: Option<String>,
    pub text_secondary: Option<String>,
    pub text_accent: Option<String>,

    pub todo: Option<String>,
    pub in_progress: Option<String>,
    pub done: Option<String>,
    pub trash: Option<String>,
    pub archive: Option<String>,

    pub banner_error: Option<String>,
    pub spinner: Option<String>,

    pub form_border: Option<String>,
    pub form_highlight: Option<String>,
    pub form_dim: Option<String>,

    pub selection_indicator: Option<String>,
    pub image_link: Option<String>,
}

/// Parse `"cyan"`, `"dark_gray"`, `"rgb(R,G,B)"` and friends.
fn parse_color(s: &str) -> Option<Color> {
    let s = s.trim();
    if let Some(inner) = s.strip_prefix("rgb(").and_then(|r| r.strip_suffix(')')) {
        let channels: Vec<u8> = inner
            .split(',')
            .map(|c| c.trim().parse::<u8>())
            .collect::<Result<_, _>>()
            .ok()?;
        return match channels[..] {
            [r, g, b] => Some(Color::Rgb(r, g, b)),
            _ => None,
        };
    }

    let name = s.to_lowercase().replace(['-', '_'], "");
    let color = match name.as_str() {
        "black" => Color::Black,
        "red" => Color::Red,
        "green" => Color::Green,
        "yellow" => Color::Yellow,
        "blue" => Color::Blue,
        "magenta" => Color::Magenta,
        "cyan" => Color::Cyan,
        "gray" | "grey" => Color::Gray,
        "darkgray" | "darkgrey" => Color::DarkGray,
        "lightred" => Color::LightRed,
        "lightgreen" => Color::LightGreen,
        "lightyellow" => Color::LightYellow,
        "lightblue" => Color::LightBlue,
        "lightmagenta" => Color::LightMagenta,
        "lightcyan" => Color::LightCyan,
        "white" => Color::White,
        _ => return None,
    };
    Some(color)
}

fn apply(target: &mut Color, source: Option<&String>) {
    if let Some(s) = source {
        match parse_color(s) {
            Some(color) => *target = color,
            None => tracing::warn!(value = %s, "ignoring unknown theme colour"),
        }
    }
}

impl ThemeConfig {
    /// Defaults with any configured slots overridden.
    pub fn build(&self) -> Theme {
        let mut t = Theme::default();

        apply(&mut t.border_focused, self.border_focused.as_ref());
        apply(&mut t.border_unfocused, self.border_unfocused.as_ref());
        apply(&mut t.text_primary, self.text_primary.as_ref());
        apply(&mut t.text_secondary, self.text_secondary.as_ref());
        apply(&mut t.text_accent, self.text_accent.as_ref());
        apply(&mut t.todo, self.todo.as_ref());
        apply(&mut t.in_progress, self.in_progress.as_ref());
        apply(&mut t.done, self.done.as_ref());
        apply(&mut t.trash, self.trash.as_ref());
        apply(&mut t.archive, self.archive.as_ref());
        apply(&mut t.banner_error, self.banner_error.as_ref());
        apply(&mut t.spinner, self.spinner.as_ref());
        apply(&mut t.form_border, self.form_border.as_ref());
        apply(&mut t.form_highlight, self.form_highlight.as_ref());
        apply(&mut t.form_dim, self.form_dim.as_ref());
        apply(
            &mut t.selection_indicator,
            self.selection_indicator.as_ref(),
        );
        apply(&mut t.image_link, self.image_link.as_ref());

        t
    }
}
