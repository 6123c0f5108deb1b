//! Client for the remote task store.
//!
//! Six calls, one request each. No retries, no caching and no error
//! interpretation: failures come back to the caller as [`ApiError`].

mod error;
pub mod image;
mod models;

pub use error::*;
pub use image::{ImagePreview, SelectedFile, resolve_image_url};
pub use models::*;

use reqwest::Method;
use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use url::Url;

/// The operations the task store exposes.
///
/// [`HttpTaskApi`] talks to the real server; tests substitute in-memory
/// implementations.
pub trait TaskApi {
    fn list_tasks(&self) -> ApiResult<Vec<Task>>;

    /// `image_url` of `None` is sent as an empty string.
    ///
    /// Mutations succeed on any 2xx. The echoed task is returned when the
    /// body carries one; callers reload the list either way.
    fn create_task(&self, title: &str, image_url: Option<&str>) -> ApiResult<Option<Task>>;

    fn delete_task(&self, id: i64) -> ApiResult<()>;

    fn set_status(&self, id: i64, status: TaskStatus) -> ApiResult<Option<Task>>;

    fn set_image(&self, id: i64, image_url: &str) -> ApiResult<Option<Task>>;

    /// Upload a file and return the URL the server assigned to it.
    fn upload_image(&self, file: &SelectedFile) -> ApiResult<String>;
}

impl<T: TaskApi + ?Sized> TaskApi for &T {
    fn list_tasks(&self) -> ApiResult<Vec<Task>> {
        (**self).list_tasks()
    }

    fn create_task(&self, title: &str, image_url: Option<&str>) -> ApiResult<Option<Task>> {
        (**self).create_task(title, image_url)
    }

    fn delete_task(&self, id: i64) -> ApiResult<()> {
        (**self).delete_task(id)
    }

    fn set_status(&self, id: i64, status: TaskStatus) -> ApiResult<Option<Task>> {
        (**self).set_status(id, status)
    }

    fn set_image(&self, id: i64, image_url: &str) -> ApiResult<Option<Task>> {
        (**self).set_image(id, image_url)
    }

    fn upload_image(&self, file: &SelectedFile) -> ApiResult<String> {
        (**self).upload_image(file)
    }
}

/// HTTP implementation of [`TaskApi`].
#[derive(Debug, Clone)]
pub struct HttpTaskApi {
    http: Client,
    base_url: String,
}

impl HttpTaskApi {
    /// Build a client rooted at `base_url`. Paths are appended to the base as
    /// given, so a base such as `http://host/api` keeps its `/api` prefix.
    pub fn new(base_url: &str) -> ApiResult<Self> {
        let base_url = normalize_base_url(base_url)?;
        let http = Client::builder()
            .user_agent(concat!("taskboard/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{path}", self.base_url);
        tracing::debug!(%method, %url, "api request");
        self.http.request(method, url)
    }

    fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> ApiResult<T> {
        let response = check_status(request.send()?)?;
        let text = response.text()?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Like [`send`](Self::send), but the body of a successful response is
    /// only decoded on a best-effort basis.
    fn send_mutation(&self, request: RequestBuilder) -> ApiResult<Option<Task>> {
        let response = check_status(request.send()?)?;
        let text = response.text()?;
        if text.trim().is_empty() {
            return Ok(None);
        }
        match serde_json::from_str::<TaskPayload>(&text) {
            Ok(payload) => Ok(payload.into_task()),
            Err(err) => {
                tracing::debug!(error = %err, "mutation response is not a task, ignoring body");
                Ok(None)
            }
        }
    }
}

impl TaskApi for HttpTaskApi {
    fn list_tasks(&self) -> ApiResult<Vec<Task>> {
        let payload: TaskListPayload = self.send(self.request(Method::GET, "/tasks"))?;
        Ok(payload.into_tasks())
    }

    fn create_task(&self, title: &str, image_url: Option<&str>) -> ApiResult<Option<Task>> {
        let body = CreateTaskRequest {
            title,
            image_url: image_url.unwrap_or_default(),
        };
        self.send_mutation(self.request(Method::POST, "/tasks").json(&body))
    }

    fn delete_task(&self, id: i64) -> ApiResult<()> {
        let response = self.request(Method::DELETE, &format!("/tasks/{id}")).send()?;
        check_status(response)?;
        Ok(())
    }

    fn set_status(&self, id: i64, status: TaskStatus) -> ApiResult<Option<Task>> {
        let body = PatchTaskRequest {
            status: Some(status),
            ..Default::default()
        };
        self.send_mutation(self.request(Method::PATCH, &format!("/tasks/{id}")).json(&body))
    }

    fn set_image(&self, id: i64, image_url: &str) -> ApiResult<Option<Task>> {
        let body = PatchTaskRequest {
            image_url: Some(image_url),
            ..Default::default()
        };
        self.send_mutation(self.request(Method::PATCH, &format!("/tasks/{id}")).json(&body))
    }

    fn upload_image(&self, file: &SelectedFile) -> ApiResult<String> {
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.file_name.clone())
            .mime_str(file.mime)?;
        let form = Form::new().part("image", part);
        let uploaded: UploadResponse =
            self.send(self.request(Method::POST, "/upload").multipart(form))?;
        Ok(uploaded.url)
    }
}

/// Validate `raw` and strip any trailing slash so paths can be appended.
pub fn normalize_base_url(raw: &str) -> ApiResult<String> {
    let trimmed = raw.trim();
    Url::parse(trimmed).map_err(|source| ApiError::InvalidBaseUrl {
        url: trimmed.to_string(),
        source,
    })?;
    Ok(trimmed.trim_end_matches('/').to_string())
}

fn check_status(response: Response) -> ApiResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let text = response.text().unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .ok()
        .and_then(|body| body.error);
    Err(ApiError::Server { status, message })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_is_validated_and_trimmed() {
        assert_eq!(
            normalize_base_url("http://localhost:8080/").unwrap(),
            "http://localhost:8080"
        );
        assert_eq!(
            normalize_base_url(" https://tasks.example.com/api ").unwrap(),
            "https://tasks.example.com/api"
        );
        assert!(matches!(
            normalize_base_url("not a url"),
            Err(ApiError::InvalidBaseUrl { .. })
        ));
    }

    #[test]
    fn client_keeps_normalized_base() {
        let api = HttpTaskApi::new("http://localhost:3001/").unwrap();
        assert_eq!(api.base_url(), "http://localhost:3001");
    }
}
