use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
};

use crate::api::resolve_image_url;
use crate::board::Column;

use super::app::{App, InputMode};
use super::form::{self, FormField};
use super::keymap::Action;

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub fn draw(frame: &mut Frame, app: &App) {
    let banner_height = u16::from(app.state.error.is_some());
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(banner_height),
            Constraint::Length(6),
            Constraint::Percentage(60),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.area());

    draw_title_bar(frame, app, outer[0]);
    if let Some(error) = &app.state.error {
        let banner = Line::from(Span::styled(
            format!(" ✗ {error}  (Esc to dismiss) "),
            app.theme.banner_style(),
        ));
        frame.render_widget(Paragraph::new(banner), outer[1]);
    }
    draw_create_panel(frame, app, outer[2]);

    if !app.state.loaded && app.state.loading {
        let loading = Paragraph::new("\n  ⏳ Loading tasks...").style(app.theme.secondary());
        frame.render_widget(loading, outer[3]);
    } else {
        draw_columns(frame, app, outer[3], outer[4]);
    }

    draw_hint_bar(frame, app, outer[5]);

    match app.input_mode {
        InputMode::ConfirmDelete(id) => draw_confirm_delete(frame, app, id),
        InputMode::Help => draw_help(frame, app),
        InputMode::Normal | InputMode::Form(_) | InputMode::EditImage => {}
    }
}

fn draw_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![
        Span::styled(
            " taskboard ",
            Style::default()
                .fg(app.theme.text_accent)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!(" {} ", app.api_base), app.theme.secondary()),
    ];
    if app.state.in_flight {
        let frame_char = SPINNER[app.spinner_frame % SPINNER.len()];
        let label = if app.state.uploading {
            "Uploading..."
        } else {
            "Loading..."
        };
        spans.push(Span::styled(
            format!(" {frame_char} {label}"),
            Style::default().fg(app.theme.spinner),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

// ── Create panel ──

fn draw_create_panel(frame: &mut Frame, app: &App, area: Rect) {
    let active = match app.input_mode {
        InputMode::Form(field) => Some(field),
        _ => None,
    };
    let border = if active.is_some() {
        Style::default().fg(app.theme.form_border)
    } else {
        app.theme.unfocused_border()
    };
    let block = Block::default()
        .title(" New task (n) ")
        .borders(Borders::ALL)
        .border_style(border);

    let draft = &app.state.draft;
    let fields = [
        (FormField::Title, draft.title.as_str(), app.cursors.title),
        (
            FormField::ImageUrl,
            draft.image_url.as_str(),
            app.cursors.image_url,
        ),
        (
            FormField::FilePath,
            app.file_path.as_str(),
            app.cursors.file_path,
        ),
    ];

    let mut lines: Vec<Line> = fields
        .iter()
        .map(|&(field, value, cursor)| {
            let focused = active == Some(field);
            let label_style = if focused {
                Style::default()
                    .fg(app.theme.form_highlight)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(app.theme.text_secondary)
            };
            let value_span = if focused {
                Span::styled(
                    form::with_cursor(value, cursor),
                    Style::default().fg(app.theme.text_primary),
                )
            } else if value.is_empty() {
                Span::styled(field.placeholder(), Style::default().fg(app.theme.form_dim))
            } else {
                Span::styled(value.to_string(), Style::default().fg(app.theme.text_primary))
            };
            Line::from(vec![
                Span::styled(format!(" {:<12}", field.label()), label_style),
                value_span,
            ])
        })
        .collect();

    let submit = if app.state.uploading {
        Span::styled(" [ Uploading... ] ", Style::default().fg(app.theme.spinner))
    } else if app.state.can_create() && !app.reading_file {
        Span::styled(
            " [ Add Task ] ",
            Style::default()
                .fg(app.theme.form_highlight)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        Span::styled(" [ Add Task ] ", Style::default().fg(app.theme.form_dim))
    };
    let preview = match &draft.preview {
        _ if app.reading_file => Span::styled(
            "  reading file...",
            Style::default().fg(app.theme.form_dim),
        ),
        Some(preview) => Span::styled(
            format!("  🖼 {}", preview.summary()),
            Style::default().fg(app.theme.image_link),
        ),
        None => Span::raw(""),
    };
    lines.push(Line::from(vec![submit, preview]));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

// ── Columns ──

fn draw_columns(frame: &mut Frame, app: &App, top: Rect, bottom: Rect) {
    let columns = app.state.columns();

    let top_areas = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 3); 3])
        .split(top);
    let bottom_areas = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 2); 2])
        .split(bottom);

    let areas = top_areas.iter().chain(bottom_areas.iter());
    for (index, (column, area)) in columns.iter().zip(areas).enumerate() {
        draw_column(frame, app, column, index, *area);
    }
}

fn draw_column(frame: &mut Frame, app: &App, column: &Column<'_>, index: usize, area: Rect) {
    let focused = app.column == index
        && matches!(app.input_mode, InputMode::Normal | InputMode::EditImage);
    let status = column.status;
    let border = if focused {
        app.theme.focused_border()
    } else {
        app.theme.unfocused_border()
    };

    let title = format!(" {} {} ({}) ", status.symbol(), status.label(), column.len());
    let block = Block::default()
        .title(Span::styled(title, app.theme.status_style(status)))
        .borders(Borders::ALL)
        .border_style(border);

    if column.is_empty() {
        let msg = Paragraph::new("  No tasks")
            .style(app.theme.secondary())
            .block(block);
        frame.render_widget(msg, area);
        return;
    }

    let selected_row = app.rows[index];
    let edit_key = app.keymap.label_for(Action::EditImage).unwrap_or("i");
    let items: Vec<ListItem> = column
        .tasks
        .iter()
        .enumerate()
        .map(|(row, task)| {
            let selected = focused && row == selected_row;
            let prefix = if selected { "▸ " } else { "  " };
            let title_style = if selected {
                Style::default()
                    .fg(app.theme.selection_indicator)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(app.theme.text_primary)
            };

            let image_line = if let Some(edit) = app
                .state
                .image_edit
                .as_ref()
                .filter(|e| e.task_id == task.id)
            {
                Line::from(Span::styled(
                    format!("    ✎ {}", form::with_cursor(&edit.url, app.cursors.edit)),
                    Style::default().fg(app.theme.form_highlight),
                ))
            } else {
                let (image, affordance) = match task.image_ref() {
                    Some(image_ref) => (
                        Span::styled(
                            format!("    🖼 {}", resolve_image_url(&app.api_base, image_ref)),
                            Style::default().fg(app.theme.image_link),
                        ),
                        "Change",
                    ),
                    None => (
                        Span::styled("    no image", app.theme.secondary()),
                        "Add Image",
                    ),
                };
                Line::from(vec![
                    image,
                    Span::styled(
                        format!("  [{edit_key}: {affordance}]"),
                        Style::default().fg(app.theme.form_dim),
                    ),
                ])
            };

            ListItem::new(vec![
                Line::from(vec![
                    Span::styled(prefix, Style::default().fg(app.theme.selection_indicator)),
                    Span::styled(format!("#{} ", task.id), app.theme.secondary()),
                    Span::styled(task.title.clone(), title_style),
                ]),
                image_line,
            ])
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}

// ── Hint bar ──

fn draw_hint_bar(frame: &mut Frame, app: &App, area: Rect) {
    let key_style = Style::default()
        .fg(app.theme.text_accent)
        .add_modifier(Modifier::BOLD);
    let desc_style = app.theme.secondary();

    let hints: Vec<(String, String)> = match app.input_mode {
        InputMode::Form(FormField::FilePath) => vec![
            ("Enter".into(), "load file (empty clears)".into()),
            ("Tab".into(), "next field".into()),
            ("Esc".into(), "back".into()),
        ],
        InputMode::Form(_) => vec![
            ("Enter".into(), "add task".into()),
            ("Tab".into(), "next field".into()),
            ("Esc".into(), "back".into()),
        ],
        InputMode::EditImage => vec![
            ("Enter".into(), "save".into()),
            ("Esc".into(), "cancel".into()),
        ],
        InputMode::ConfirmDelete(_) => vec![
            ("y".into(), "delete forever".into()),
            ("n".into(), "keep".into()),
        ],
        InputMode::Help => vec![("any key".into(), "close help".into())],
        InputMode::Normal => normal_hints(app),
    };

    form::render_hints(frame, area, &hints, key_style, desc_style);
}

/// The actions valid for the selected task, then the global ones.
fn normal_hints(app: &App) -> Vec<(String, String)> {
    let mut hints = Vec::new();

    if let Some(task) = app.selected_task() {
        for &transition in task.status.transitions() {
            if let Some(key) = app.keymap.label_for_transition(transition) {
                hints.push((key.to_string(), transition.label(task.status).to_string()));
            }
        }
        if let Some(key) = app.keymap.label_for(Action::EditImage) {
            let label = if task.image_ref().is_some() {
                "Change image"
            } else {
                "Add Image"
            };
            hints.push((key.to_string(), label.into()));
        }
    }

    for (action, desc) in [
        (Action::NewTask, "new"),
        (Action::Reload, "reload"),
        (Action::ShowHelp, "help"),
        (Action::Quit, "quit"),
    ] {
        if let Some(key) = app.keymap.label_for(action) {
            hints.push((key.to_string(), desc.to_string()));
        }
    }
    hints
}

// ── Overlays ──

fn draw_confirm_delete(frame: &mut Frame, app: &App, id: i64) {
    let inner = form::render_modal(
        frame,
        " Delete forever ",
        Style::default().fg(app.theme.trash),
        50,
        5,
    );
    let name = app
        .state
        .task(id)
        .map_or_else(|| format!("#{id}"), |t| format!("#{} {}", t.id, t.title));
    let lines = vec![
        Line::from(Span::styled(
            format!("Permanently delete {name}?"),
            Style::default().fg(app.theme.text_primary),
        )),
        Line::from(""),
        Line::from(Span::styled("y: delete   n/Esc: keep", app.theme.secondary())),
    ];
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);
}

fn draw_help(frame: &mut Frame, app: &App) {
    let entries = app.keymap.help_entries();
    let height = entries
        .iter()
        .map(|(_, rows)| rows.len() as u16 + 2)
        .sum::<u16>()
        + 2;
    let inner = form::render_modal(frame, " Keys ", app.theme.focused_border(), 52, height);

    let mut lines = Vec::new();
    for (category, rows) in entries {
        lines.push(Line::from(Span::styled(
            category,
            Style::default()
                .fg(app.theme.text_accent)
                .add_modifier(Modifier::BOLD),
        )));
        for row in rows {
            lines.push(Line::from(vec![
                Span::styled(
                    format!("{:<10}", row.label),
                    Style::default().fg(app.theme.text_primary),
                ),
                Span::styled(row.description, app.theme.secondary()),
            ]));
        }
        lines.push(Line::from(""));
    }
    frame.render_widget(Paragraph::new(lines), inner);
}
