use serde::{Deserialize, Serialize};

/// The fixed status pipeline. The server never reports anything else; a task
/// with an unknown status fails to decode rather than landing in a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Done,
    Trash,
    Archive,
}

impl TaskStatus {
    /// Board order: the three working columns, then the two holding areas.
    pub const ALL: [TaskStatus; 5] = [
        TaskStatus::Todo,
        TaskStatus::InProgress,
        TaskStatus::Done,
        TaskStatus::Trash,
        TaskStatus::Archive,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Done => "done",
            TaskStatus::Trash => "trash",
            TaskStatus::Archive => "archive",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TaskStatus::Todo => "TO DO",
            TaskStatus::InProgress => "IN PROGRESS",
            TaskStatus::Done => "DONE",
            TaskStatus::Trash => "TRASH",
            TaskStatus::Archive => "ARCHIVE",
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            TaskStatus::Todo => "☐",
            TaskStatus::InProgress => "●",
            TaskStatus::Done => "✓",
            TaskStatus::Trash => "✗",
            TaskStatus::Archive => "▣",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown task status '{s}'"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl Task {
    /// The stored image reference, treating an empty string the same as absent.
    pub fn image_ref(&self) -> Option<&str> {
        self.image_url.as_deref().filter(|url| !url.is_empty())
    }
}

/// Body of `POST /tasks`.
#[derive(Debug, Clone, Serialize)]
pub struct CreateTaskRequest<'a> {
    pub title: &'a str,
    pub image_url: &'a str,
}

/// Body of `PATCH /tasks/:id`. Only the fields that are set are sent.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PatchTaskRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<&'a str>,
}

/// `GET /tasks` payloads seen in the wild: a bare array, an object wrapping it
/// in `data`, or `null` for an empty store.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum TaskListPayload {
    Bare(Vec<Task>),
    Wrapped { data: Option<Vec<Task>> },
    Empty(()),
}

impl TaskListPayload {
    pub fn into_tasks(self) -> Vec<Task> {
        match self {
            TaskListPayload::Bare(tasks) => tasks,
            TaskListPayload::Wrapped { data } => data.unwrap_or_default(),
            TaskListPayload::Empty(()) => Vec::new(),
        }
    }
}

/// Body of a successful create or patch: the task itself, or the task
/// wrapped in `data`. Anything else carries no task.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum TaskPayload {
    Bare(Task),
    Wrapped { data: Option<Task> },
}

impl TaskPayload {
    pub fn into_task(self) -> Option<Task> {
        match self {
            TaskPayload::Bare(task) => Some(task),
            TaskPayload::Wrapped { data } => data,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    pub url: String,
}

/// Error body convention: `{ "error": "..." }`.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_status_parses_wire_names() {
        for status in TaskStatus::ALL {
            assert_eq!(status.as_str().parse::<TaskStatus>(), Ok(status));
        }
        assert!("pending".parse::<TaskStatus>().is_err());
        assert!("".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn task_decodes_without_image() {
        let task: Task =
            serde_json::from_str(r#"{"id":3,"title":"Buy milk","status":"todo"}"#).unwrap();
        assert_eq!(task.status, TaskStatus::Todo);
        assert_eq!(task.image_url, None);
        assert_eq!(task.image_ref(), None);
    }

    #[test]
    fn empty_image_url_counts_as_absent() {
        let task: Task = serde_json::from_str(
            r#"{"id":3,"title":"Buy milk","status":"in_progress","image_url":""}"#,
        )
        .unwrap();
        assert_eq!(task.image_url.as_deref(), Some(""));
        assert_eq!(task.image_ref(), None);
    }

    #[test]
    fn unknown_status_is_rejected() {
        let res: Result<Task, _> =
            serde_json::from_str(r#"{"id":1,"title":"x","status":"blocked"}"#);
        assert!(res.is_err());
    }

    #[test]
    fn list_payload_accepts_bare_wrapped_and_null() {
        let bare: TaskListPayload =
            serde_json::from_str(r#"[{"id":1,"title":"a","status":"done"}]"#).unwrap();
        assert_eq!(bare.into_tasks().len(), 1);

        let wrapped: TaskListPayload =
            serde_json::from_str(r#"{"data":[{"id":1,"title":"a","status":"trash"}]}"#).unwrap();
        assert_eq!(wrapped.into_tasks()[0].status, TaskStatus::Trash);

        let null_data: TaskListPayload = serde_json::from_str(r#"{"data":null}"#).unwrap();
        assert!(null_data.into_tasks().is_empty());

        let null: TaskListPayload = serde_json::from_str("null").unwrap();
        assert!(null.into_tasks().is_empty());
    }

    #[test]
    fn mutation_payload_accepts_bare_wrapped_or_unrelated_bodies() {
        let bare: TaskPayload =
            serde_json::from_str(r#"{"id":1,"title":"a","status":"todo"}"#).unwrap();
        assert_eq!(bare.into_task().map(|t| t.id), Some(1));

        let wrapped: TaskPayload = serde_json::from_str(
            r#"{"message":"Task created","data":{"id":2,"title":"b","status":"todo"}}"#,
        )
        .unwrap();
        assert_eq!(wrapped.into_task().map(|t| t.id), Some(2));

        let message: TaskPayload = serde_json::from_str(r#"{"message":"updated"}"#).unwrap();
        assert_eq!(message.into_task(), None);
    }

    #[test]
    fn patch_body_only_carries_set_fields() {
        let status = PatchTaskRequest {
            status: Some(TaskStatus::InProgress),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_string(&status).unwrap(),
            r#"{"status":"in_progress"}"#
        );

        let image = PatchTaskRequest {
            image_url: Some("http://x/a.png"),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_string(&image).unwrap(),
            r#"{"image_url":"http://x/a.png"}"#
        );
    }
}
