use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::DefaultTerminal;

use crate::api::{Task, TaskStatus};
use crate::board::{BoardState, Outcome, RequestKind, Transition};

use super::event::{self, AppEvent};
use super::form::{self, FormField};
use super::keymap::{Action, KeyMap};
use super::theme::Theme;
use super::ui;
use super::worker::{Job, Worker, WorkerEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Form(FormField),
    EditImage,
    ConfirmDelete(i64),
    Help,
}

/// Byte cursors for the editable buffers.
#[derive(Debug, Clone, Default)]
pub struct Cursors {
    pub title: usize,
    pub image_url: usize,
    pub file_path: usize,
    pub edit: usize,
}

pub struct App {
    pub state: BoardState,
    pub api_base: String,
    pub keymap: KeyMap,
    pub theme: Theme,
    pub input_mode: InputMode,
    pub should_quit: bool,

    // Selection: column index in `TaskStatus::ALL` order and a row per column
    pub column: usize,
    pub rows: [usize; 5],

    /// Path typed into the upload field; the loaded file lives in the draft.
    pub file_path: String,
    /// Set while a chosen file is being read; create waits for it.
    pub reading_file: bool,
    pub cursors: Cursors,
    pub spinner_frame: usize,
    tick_rate: Duration,
}

impl App {
    pub fn new(api_base: String, theme: Theme, tick_rate: Duration) -> Self {
        App {
            state: BoardState::default(),
            api_base,
            keymap: KeyMap::default_keymap(),
            theme,
            input_mode: InputMode::Normal,
            should_quit: false,
            column: 0,
            rows: [0; 5],
            file_path: String::new(),
            reading_file: false,
            cursors: Cursors::default(),
            spinner_frame: 0,
            tick_rate,
        }
    }

    pub fn run(&mut self, terminal: &mut DefaultTerminal, worker: &Worker) -> Result<()> {
        if let Some(request) = self.state.begin_load() {
            worker.submit(Job::Run(request))?;
        }

        loop {
            terminal.draw(|frame| ui::draw(frame, self))?;

            while let Some(event) = worker.try_next()? {
                self.handle_worker_event(event);
            }

            match event::poll(self.tick_rate)? {
                AppEvent::Key(key) => {
                    if let Some(job) = self.handle_key(key.code, key.modifiers) {
                        worker.submit(job)?;
                    }
                }
                AppEvent::Resize => {}
                AppEvent::Tick => {
                    if self.state.in_flight {
                        self.spinner_frame = self.spinner_frame.wrapping_add(1);
                    }
                }
            }

            if self.should_quit {
                return Ok(());
            }
        }
    }

    pub fn handle_worker_event(&mut self, event: WorkerEvent) {
        match event {
            WorkerEvent::Completed(completion) => {
                let created = completion.kind == RequestKind::Create
                    && !matches!(completion.outcome, Outcome::MutationFailed(_));
                self.state.apply(completion);
                self.clamp_selection();
                if self.input_mode == InputMode::EditImage && self.state.image_edit.is_none() {
                    self.input_mode = InputMode::Normal;
                }
                if created {
                    self.file_path.clear();
                    self.cursors = Cursors {
                        edit: self.cursors.edit,
                        ..Cursors::default()
                    };
                }
            }
            WorkerEvent::FileRead(Ok(file)) => {
                self.reading_file = false;
                tracing::info!(path = %file.path.display(), size = file.bytes.len(), "image selected");
                self.state.select_file(file);
            }
            WorkerEvent::FileRead(Err(err)) => {
                self.reading_file = false;
                tracing::warn!(error = %err, "could not read image file");
                self.state.clear_file();
                self.state.error = Some(err.to_string());
            }
        }
    }

    // ── Selection ──

    pub fn column_status(&self) -> TaskStatus {
        TaskStatus::ALL[self.column]
    }

    pub fn selected_task(&self) -> Option<&Task> {
        let columns = self.state.columns();
        columns[self.column].tasks.get(self.rows[self.column]).copied()
    }

    fn clamp_selection(&mut self) {
        let columns = self.state.columns();
        for (row, column) in self.rows.iter_mut().zip(columns.iter()) {
            *row = (*row).min(column.len().saturating_sub(1));
        }
    }

    fn move_column(&mut self, delta: isize) {
        let len = TaskStatus::ALL.len() as isize;
        self.column = (self.column as isize + delta).rem_euclid(len) as usize;
    }

    fn move_row(&mut self, down: bool) {
        let count = self.state.columns()[self.column].len();
        let row = &mut self.rows[self.column];
        if down {
            *row = (*row + 1).min(count.saturating_sub(1));
        } else {
            *row = row.saturating_sub(1);
        }
    }

    // ── Keys ──

    /// Handle one key press, returning background work to start, if any.
    pub fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> Option<Job> {
        match self.input_mode {
            InputMode::Normal => self.handle_normal_key(code, modifiers),
            InputMode::Form(field) => self.handle_form_key(field, code, modifiers),
            InputMode::EditImage => self.handle_edit_image_key(code, modifiers),
            InputMode::ConfirmDelete(id) => self.handle_confirm_delete_key(id, code),
            InputMode::Help => {
                self.input_mode = InputMode::Normal;
                None
            }
        }
    }

    fn handle_normal_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> Option<Job> {
        let action = self.keymap.lookup(code, modifiers)?;

        if let Some(transition) = action.transition() {
            return self.request_transition(transition);
        }

        match action {
            Action::Quit => self.should_quit = true,
            Action::ShowHelp => self.input_mode = InputMode::Help,
            Action::DismissError => self.state.dismiss_error(),
            Action::Reload => return self.state.begin_load().map(Job::Run),
            Action::MoveLeft => self.move_column(-1),
            Action::MoveRight => self.move_column(1),
            Action::MoveUp => self.move_row(false),
            Action::MoveDown => self.move_row(true),
            Action::NewTask => {
                self.cursors.title = self.state.draft.title.len();
                self.input_mode = InputMode::Form(FormField::Title);
            }
            Action::EditImage => {
                if let Some(id) = self.selected_task().map(|t| t.id) {
                    self.state.begin_image_edit(id);
                    self.cursors.edit = self.state.image_edit.as_ref().map_or(0, |e| e.url.len());
                    self.input_mode = InputMode::EditImage;
                }
            }
            Action::Start
            | Action::Done
            | Action::Back
            | Action::Trash
            | Action::Archive
            | Action::Restore
            | Action::Delete => {}
        }
        None
    }

    fn request_transition(&mut self, transition: Transition) -> Option<Job> {
        let task = self.selected_task()?;
        let id = task.id;
        transition.effect(task.status)?;

        if transition == Transition::Delete {
            self.input_mode = InputMode::ConfirmDelete(id);
            return None;
        }
        self.state.begin_transition(id, transition).map(Job::Run)
    }

    fn handle_confirm_delete_key(&mut self, id: i64, code: KeyCode) -> Option<Job> {
        match code {
            KeyCode::Char('y' | 'Y') => {
                self.input_mode = InputMode::Normal;
                self.state
                    .begin_transition(id, Transition::Delete)
                    .map(Job::Run)
            }
            KeyCode::Char('n' | 'N') | KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
                None
            }
            _ => None,
        }
    }

    fn handle_form_key(
        &mut self,
        field: FormField,
        code: KeyCode,
        modifiers: KeyModifiers,
    ) -> Option<Job> {
        match code {
            KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
                None
            }
            KeyCode::Tab => {
                self.input_mode = InputMode::Form(field.next());
                None
            }
            KeyCode::BackTab => {
                self.input_mode = InputMode::Form(field.prev());
                None
            }
            // The draft must not change under a running create.
            KeyCode::Enter if field == FormField::FilePath => {
                if self.state.in_flight || self.reading_file {
                    return None;
                }
                let path = self.file_path.trim();
                if path.is_empty() {
                    self.state.clear_file();
                    return None;
                }
                self.reading_file = true;
                Some(Job::ReadFile(PathBuf::from(path)))
            }
            KeyCode::Enter if self.reading_file => None,
            KeyCode::Enter => self.state.begin_create().map(Job::Run),
            _ => {
                let (buf, cursor) = match field {
                    FormField::Title => (&mut self.state.draft.title, &mut self.cursors.title),
                    FormField::ImageUrl => {
                        (&mut self.state.draft.image_url, &mut self.cursors.image_url)
                    }
                    FormField::FilePath => (&mut self.file_path, &mut self.cursors.file_path),
                };
                form::edit_line(buf, cursor, code, modifiers);
                None
            }
        }
    }

    fn handle_edit_image_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> Option<Job> {
        match code {
            KeyCode::Esc => {
                self.state.cancel_image_edit();
                self.input_mode = InputMode::Normal;
                None
            }
            KeyCode::Enter => self.state.begin_save_image().map(Job::Run),
            _ => {
                if let Some(edit) = self.state.image_edit.as_mut() {
                    form::edit_line(&mut edit.url, &mut self.cursors.edit, code, modifiers);
                }
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::SelectedFile;
    use crate::board::{Completion, Request};

    fn task(id: i64, status: TaskStatus) -> Task {
        Task {
            id,
            title: format!("task {id}"),
            status,
            image_url: None,
        }
    }

    fn app_with(tasks: Vec<Task>) -> App {
        let mut app = App::new(
            "http://localhost:8080".into(),
            Theme::default(),
            Duration::from_millis(250),
        );
        app.state.tasks = tasks;
        app
    }

    fn press(app: &mut App, c: char) -> Option<Job> {
        app.handle_key(KeyCode::Char(c), KeyModifiers::NONE)
    }

    fn reloaded(kind: RequestKind, tasks: Vec<Task>) -> WorkerEvent {
        WorkerEvent::Completed(Completion {
            kind,
            outcome: Outcome::Reloaded(tasks),
        })
    }

    #[test]
    fn transition_key_starts_status_request() {
        let mut app = app_with(vec![task(1, TaskStatus::Todo)]);
        match press(&mut app, 's') {
            Some(Job::Run(Request::SetStatus { id: 1, status })) => {
                assert_eq!(status, TaskStatus::InProgress);
            }
            _ => panic!("expected a status request"),
        }
        assert!(app.state.in_flight);
    }

    #[test]
    fn transition_not_offered_for_status_is_ignored() {
        let mut app = app_with(vec![task(1, TaskStatus::Todo)]);
        assert!(press(&mut app, 'a').is_none());
        assert!(!app.state.in_flight);
    }

    #[test]
    fn delete_asks_for_confirmation() {
        let mut app = app_with(vec![task(4, TaskStatus::Trash)]);
        app.column = 3;
        assert!(press(&mut app, 'x').is_none());
        assert_eq!(app.input_mode, InputMode::ConfirmDelete(4));

        assert!(press(&mut app, 'n').is_none());
        assert_eq!(app.input_mode, InputMode::Normal);

        press(&mut app, 'x');
        match press(&mut app, 'y') {
            Some(Job::Run(Request::Delete { id: 4 })) => {}
            _ => panic!("expected a delete request"),
        }
    }

    #[test]
    fn navigation_wraps_columns_and_clamps_rows() {
        let mut app = app_with(vec![task(1, TaskStatus::Todo), task(2, TaskStatus::Todo)]);
        press(&mut app, 'h');
        assert_eq!(app.column_status(), TaskStatus::Archive);
        press(&mut app, 'l');
        assert_eq!(app.column_status(), TaskStatus::Todo);

        press(&mut app, 'j');
        press(&mut app, 'j');
        assert_eq!(app.selected_task().map(|t| t.id), Some(2));
        press(&mut app, 'k');
        assert_eq!(app.selected_task().map(|t| t.id), Some(1));
    }

    #[test]
    fn form_typing_and_submit() {
        let mut app = app_with(vec![]);
        press(&mut app, 'n');
        assert_eq!(app.input_mode, InputMode::Form(FormField::Title));

        assert!(app.handle_key(KeyCode::Enter, KeyModifiers::NONE).is_none());
        for c in "Buy milk".chars() {
            press(&mut app, c);
        }
        assert_eq!(app.state.draft.title, "Buy milk");

        match app.handle_key(KeyCode::Enter, KeyModifiers::NONE) {
            Some(Job::Run(Request::Create { title, .. })) => assert_eq!(title, "Buy milk"),
            _ => panic!("expected a create request"),
        }
        assert!(app.state.uploading);

        app.handle_worker_event(reloaded(
            RequestKind::Create,
            vec![Task {
                image_url: Some(String::new()),
                ..task(1, TaskStatus::Todo)
            }],
        ));
        assert!(app.state.draft.title.is_empty());
        assert_eq!(app.cursors.title, 0);
        assert!(!app.state.uploading);
    }

    #[test]
    fn file_field_enter_reads_the_file() {
        let mut app = app_with(vec![]);
        app.input_mode = InputMode::Form(FormField::FilePath);
        for c in "/tmp/cat.png".chars() {
            press(&mut app, c);
        }
        match app.handle_key(KeyCode::Enter, KeyModifiers::NONE) {
            Some(Job::ReadFile(path)) => assert_eq!(path, PathBuf::from("/tmp/cat.png")),
            _ => panic!("expected a file read"),
        }

        app.handle_worker_event(WorkerEvent::FileRead(Ok(SelectedFile {
            path: PathBuf::from("/tmp/cat.png"),
            file_name: "cat.png".into(),
            mime: "image/png",
            bytes: vec![0; 4],
        })));
        assert!(app.state.draft.preview.is_some());
    }

    #[test]
    fn create_waits_for_a_pending_file_read() {
        let mut app = app_with(vec![]);
        app.input_mode = InputMode::Form(FormField::FilePath);
        for c in "/tmp/dog.png".chars() {
            press(&mut app, c);
        }
        assert!(matches!(
            app.handle_key(KeyCode::Enter, KeyModifiers::NONE),
            Some(Job::ReadFile(_))
        ));
        assert!(app.handle_key(KeyCode::Enter, KeyModifiers::NONE).is_none());

        app.handle_key(KeyCode::Tab, KeyModifiers::NONE);
        for c in "Walk".chars() {
            press(&mut app, c);
        }
        assert!(app.handle_key(KeyCode::Enter, KeyModifiers::NONE).is_none());
        assert!(!app.state.in_flight);

        app.handle_worker_event(WorkerEvent::FileRead(Ok(SelectedFile {
            path: PathBuf::from("/tmp/dog.png"),
            file_name: "dog.png".into(),
            mime: "image/png",
            bytes: vec![1, 2],
        })));
        match app.handle_key(KeyCode::Enter, KeyModifiers::NONE) {
            Some(Job::Run(Request::Create { file: Some(file), .. })) => {
                assert_eq!(file.file_name, "dog.png");
            }
            _ => panic!("expected a create carrying the file"),
        }
    }

    #[test]
    fn file_read_is_refused_while_a_request_runs() {
        let mut app = app_with(vec![]);
        app.state.begin_load();
        app.input_mode = InputMode::Form(FormField::FilePath);
        for c in "/tmp/a.png".chars() {
            press(&mut app, c);
        }
        assert!(app.handle_key(KeyCode::Enter, KeyModifiers::NONE).is_none());
        assert!(!app.reading_file);
    }

    #[test]
    fn image_edit_flow() {
        let mut app = app_with(vec![task(9, TaskStatus::Done)]);
        app.column = 2;
        press(&mut app, 'i');
        assert_eq!(app.input_mode, InputMode::EditImage);
        assert!(app.state.is_editing_image(9));

        for c in "/u/x.png".chars() {
            press(&mut app, c);
        }
        match app.handle_key(KeyCode::Enter, KeyModifiers::NONE) {
            Some(Job::Run(Request::SetImage { id: 9, image_url })) => {
                assert_eq!(image_url, "/u/x.png");
            }
            _ => panic!("expected an image request"),
        }

        app.handle_worker_event(reloaded(
            RequestKind::SetImage { id: 9 },
            vec![task(9, TaskStatus::Done)],
        ));
        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.state.image_edit, None);
    }

    #[test]
    fn escape_cancels_image_edit_without_request() {
        let mut app = app_with(vec![task(9, TaskStatus::Todo)]);
        press(&mut app, 'i');
        assert!(app.handle_key(KeyCode::Esc, KeyModifiers::NONE).is_none());
        assert_eq!(app.state.image_edit, None);
        assert_eq!(app.input_mode, InputMode::Normal);
        assert!(!app.state.in_flight);
    }

    #[test]
    fn selection_is_clamped_after_reload() {
        let mut app = app_with(vec![task(1, TaskStatus::Todo), task(2, TaskStatus::Todo)]);
        app.rows[0] = 1;
        app.state.begin_load();
        app.handle_worker_event(reloaded(RequestKind::Load, vec![task(1, TaskStatus::Todo)]));
        assert_eq!(app.rows[0], 0);
        assert_eq!(app.selected_task().map(|t| t.id), Some(1));
    }
}
