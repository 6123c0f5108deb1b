//! Board state and the request cycle that keeps it in sync with the server.
//!
//! Every user action follows the same three steps:
//!
//! 1. [`BoardState`]'s `begin_*` methods check the guard and turn the
//!    action into a [`Request`] (pure, no I/O).
//! 2. [`execute`] performs the mutation against a [`TaskApi`] and, if it
//!    succeeded, re-fetches the full list (I/O, may run on another thread).
//! 3. [`BoardState::apply`] folds the [`Completion`] back into the state.
//!
//! The server is the source of truth: the task list is only ever replaced
//! wholesale by a fresh fetch, never patched locally.

pub mod columns;
pub mod workflow;

pub use columns::{Column, partition};
pub use workflow::{Effect, Transition};

use crate::api::{ApiError, ApiResult, ImagePreview, SelectedFile, Task, TaskApi, TaskStatus};

pub const LOAD_FAILED: &str = "Failed to load tasks";
pub const CREATE_FAILED: &str = "Failed to create task";
pub const STATUS_FAILED: &str = "Failed to update status";
pub const DELETE_FAILED: &str = "Failed to delete task";
pub const IMAGE_FAILED: &str = "Failed to update image";

/// Contents of the create panel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateDraft {
    pub title: String,
    pub image_url: String,
    pub file: Option<SelectedFile>,
    pub preview: Option<ImagePreview>,
}

/// The single task whose image is being edited, with the replacement URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageEdit {
    pub task_id: i64,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Load,
    Create {
        title: String,
        image_url: String,
        file: Option<SelectedFile>,
    },
    SetStatus {
        id: i64,
        status: TaskStatus,
    },
    Delete {
        id: i64,
    },
    SetImage {
        id: i64,
        image_url: String,
    },
}

impl Request {
    pub fn kind(&self) -> RequestKind {
        match self {
            Request::Load => RequestKind::Load,
            Request::Create { .. } => RequestKind::Create,
            Request::SetStatus { .. } => RequestKind::SetStatus,
            Request::Delete { .. } => RequestKind::Delete,
            Request::SetImage { id, .. } => RequestKind::SetImage { id: *id },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Load,
    Create,
    SetStatus,
    Delete,
    SetImage { id: i64 },
}

impl RequestKind {
    /// Banner text when the server gives no message of its own.
    pub fn fallback_message(self) -> &'static str {
        match self {
            RequestKind::Load => LOAD_FAILED,
            RequestKind::Create => CREATE_FAILED,
            RequestKind::SetStatus => STATUS_FAILED,
            RequestKind::Delete => DELETE_FAILED,
            RequestKind::SetImage { .. } => IMAGE_FAILED,
        }
    }
}

#[derive(Debug)]
pub enum Outcome {
    /// The mutation (if any) went through and the list was re-fetched.
    Reloaded(Vec<Task>),
    /// The mutation went through but the follow-up fetch failed.
    ReloadFailed(ApiError),
    /// The mutation itself failed; no fetch was attempted.
    MutationFailed(ApiError),
}

#[derive(Debug)]
pub struct Completion {
    pub kind: RequestKind,
    pub outcome: Outcome,
}

/// Everything the board shows. Owned by one front end; rendering only ever
/// borrows it immutably.
#[derive(Debug, Clone, Default)]
pub struct BoardState {
    /// Last fetched snapshot, in server order.
    pub tasks: Vec<Task>,
    pub draft: CreateDraft,
    pub image_edit: Option<ImageEdit>,
    /// Banner text; cleared when the next request starts.
    pub error: Option<String>,
    pub loading: bool,
    pub uploading: bool,
    pub in_flight: bool,
    /// Set after the first successful fetch.
    pub loaded: bool,
}

impl BoardState {
    pub fn task(&self, id: i64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn columns(&self) -> [Column<'_>; 5] {
        partition(&self.tasks)
    }

    pub fn can_create(&self) -> bool {
        !self.in_flight && !self.draft.title.trim().is_empty()
    }

    // ── Starting requests ──

    pub fn begin_load(&mut self) -> Option<Request> {
        self.start(Request::Load)
    }

    /// A pasted URL is used unless a file was picked, in which case the
    /// file is uploaded and its server URL wins.
    pub fn begin_create(&mut self) -> Option<Request> {
        if self.draft.title.trim().is_empty() {
            return None;
        }
        let request = Request::Create {
            title: self.draft.title.clone(),
            image_url: self.draft.image_url.trim().to_string(),
            file: self.draft.file.clone(),
        };
        self.start(request)
    }

    /// Returns `None` if the task is unknown or the pipeline has no such edge
    /// from its current status.
    pub fn begin_transition(&mut self, id: i64, transition: Transition) -> Option<Request> {
        let from = self.task(id)?.status;
        let request = match transition.effect(from)? {
            Effect::SetStatus(status) => Request::SetStatus { id, status },
            Effect::Remove => Request::Delete { id },
        };
        self.start(request)
    }

    pub fn begin_save_image(&mut self) -> Option<Request> {
        let edit = self.image_edit.as_ref()?;
        let url = edit.url.trim();
        if url.is_empty() {
            return None;
        }
        let request = Request::SetImage {
            id: edit.task_id,
            image_url: url.to_string(),
        };
        self.start(request)
    }

    fn start(&mut self, request: Request) -> Option<Request> {
        if self.in_flight {
            tracing::debug!(?request, "request ignored, another is in flight");
            return None;
        }
        self.error = None;
        self.in_flight = true;
        self.loading = true;
        self.uploading = matches!(request, Request::Create { .. });
        Some(request)
    }

    // ── Finishing requests ──

    pub fn apply(&mut self, completion: Completion) {
        self.in_flight = false;
        self.loading = false;
        self.uploading = false;

        let Completion { kind, outcome } = completion;
        match outcome {
            Outcome::Reloaded(tasks) => {
                self.mutation_succeeded(kind);
                self.tasks = tasks;
                self.loaded = true;
                if let Some(edit) = &self.image_edit
                    && self.task(edit.task_id).is_none()
                {
                    self.image_edit = None;
                }
            }
            Outcome::ReloadFailed(err) => {
                self.mutation_succeeded(kind);
                self.error = Some(banner(&err, LOAD_FAILED));
            }
            Outcome::MutationFailed(err) => {
                self.error = Some(banner(&err, kind.fallback_message()));
            }
        }
    }

    fn mutation_succeeded(&mut self, kind: RequestKind) {
        match kind {
            RequestKind::Create => self.draft = CreateDraft::default(),
            RequestKind::SetImage { id } => {
                if self.image_edit.as_ref().is_some_and(|e| e.task_id == id) {
                    self.image_edit = None;
                }
            }
            RequestKind::Load | RequestKind::SetStatus | RequestKind::Delete => {}
        }
    }

    /// Run a request to completion on the calling thread.
    pub fn perform<A: TaskApi + ?Sized>(&mut self, api: &A, request: Request) {
        let completion = execute(api, &request);
        self.apply(completion);
    }

    // ── Local-only edits ──

    /// Open the image editor on `id`, closing it on any other task. The
    /// buffer starts with the task's current image reference.
    pub fn begin_image_edit(&mut self, id: i64) {
        let Some(task) = self.task(id) else {
            return;
        };
        self.image_edit = Some(ImageEdit {
            task_id: id,
            url: task.image_url.clone().unwrap_or_default(),
        });
    }

    pub fn cancel_image_edit(&mut self) {
        self.image_edit = None;
    }

    pub fn is_editing_image(&self, id: i64) -> bool {
        self.image_edit.as_ref().is_some_and(|e| e.task_id == id)
    }

    pub fn select_file(&mut self, file: SelectedFile) {
        self.draft.preview = Some(file.preview());
        self.draft.file = Some(file);
    }

    pub fn clear_file(&mut self) {
        self.draft.file = None;
        self.draft.preview = None;
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }
}

/// Perform `request` against `api`: the mutation first, then a full reload
/// if and only if the mutation succeeded.
pub fn execute<A: TaskApi + ?Sized>(api: &A, request: &Request) -> Completion {
    let kind = request.kind();
    let outcome = match mutate(api, request) {
        Err(err) => {
            tracing::warn!(error = %err, "{}", kind.fallback_message());
            Outcome::MutationFailed(err)
        }
        Ok(()) => match api.list_tasks() {
            Ok(tasks) => {
                tracing::debug!(count = tasks.len(), "tasks reloaded");
                Outcome::Reloaded(tasks)
            }
            Err(err) => {
                tracing::warn!(error = %err, "{LOAD_FAILED}");
                Outcome::ReloadFailed(err)
            }
        },
    };
    Completion { kind, outcome }
}

fn mutate<A: TaskApi + ?Sized>(api: &A, request: &Request) -> ApiResult<()> {
    match request {
        Request::Load => Ok(()),
        Request::Create {
            title,
            image_url,
            file,
        } => {
            let image_url = match file {
                Some(file) => {
                    let url = api.upload_image(file)?;
                    tracing::info!(file = %file.file_name, %url, "image uploaded");
                    url
                }
                None => image_url.clone(),
            };
            match api.create_task(title, Some(&image_url))? {
                Some(task) => tracing::info!(id = task.id, title = %task.title, "task created"),
                None => tracing::info!(%title, "task created"),
            }
            Ok(())
        }
        Request::SetStatus { id, status } => {
            api.set_status(*id, *status)?;
            tracing::info!(id, %status, "status updated");
            Ok(())
        }
        Request::Delete { id } => {
            api.delete_task(*id)?;
            tracing::info!(id, "task deleted");
            Ok(())
        }
        Request::SetImage { id, image_url } => {
            api.set_image(*id, image_url)?;
            tracing::info!(id, %image_url, "image updated");
            Ok(())
        }
    }
}

fn banner(err: &ApiError, fallback: &str) -> String {
    err.server_message().unwrap_or(fallback).to_string()
}
