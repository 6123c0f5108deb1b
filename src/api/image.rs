use std::fs;
use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use super::error::{ApiError, ApiResult};

/// Turn a stored image reference into something displayable.
///
/// Absolute `http(s)://` references pass through untouched; anything else is
/// a server-relative path and gets the API origin prepended. An empty
/// reference resolves to an empty string.
pub fn resolve_image_url(api_base: &str, image_ref: &str) -> String {
    if image_ref.is_empty() {
        return String::new();
    }
    if is_absolute(image_ref) {
        return image_ref.to_string();
    }
    let base = api_base.trim_end_matches('/');
    if image_ref.starts_with('/') {
        format!("{base}{image_ref}")
    } else {
        format!("{base}/{image_ref}")
    }
}

fn is_absolute(image_ref: &str) -> bool {
    let lower = image_ref.get(..8).unwrap_or(image_ref).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// A local file picked for upload, read fully into memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub path: PathBuf,
    pub file_name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    pub fn read(path: impl AsRef<Path>) -> ApiResult<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| ApiError::File {
            path: path.display().to_string(),
            source,
        })?;
        let file_name = path
            .file_name()
            .map_or_else(|| "image".to_string(), |n| n.to_string_lossy().into_owned());
        Ok(SelectedFile {
            path: path.to_path_buf(),
            mime: mime_for(path),
            file_name,
            bytes,
        })
    }

    pub fn preview(&self) -> ImagePreview {
        ImagePreview {
            file_name: self.file_name.clone(),
            mime: self.mime,
            size: self.bytes.len(),
            data_url: format!("data:{};base64,{}", self.mime, STANDARD.encode(&self.bytes)),
        }
    }
}

/// Local, network-free stand-in for the uploaded image shown before submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePreview {
    pub file_name: String,
    pub mime: &'static str,
    pub size: usize,
    pub data_url: String,
}

impl ImagePreview {
    pub fn summary(&self) -> String {
        format!("{} ({}, {})", self.file_name, self.mime, format_size(self.size))
    }
}

fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "bmp" => "image/bmp",
        "ico" => "image/x-icon",
        "avif" => "image/avif",
        _ => "application/octet-stream",
    }
}

fn format_size(bytes: usize) -> String {
    if bytes >= 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else if bytes >= 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{bytes} B")
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const BASE: &str = "http://localhost:8080";

    #[test]
    fn empty_reference_resolves_to_empty() {
        assert_eq!(resolve_image_url(BASE, ""), "");
    }

    #[test]
    fn absolute_urls_pass_through() {
        assert_eq!(
            resolve_image_url(BASE, "http://cdn/x.png"),
            "http://cdn/x.png"
        );
        assert_eq!(
            resolve_image_url(BASE, "https://cdn/x.png"),
            "https://cdn/x.png"
        );
        assert_eq!(
            resolve_image_url(BASE, "HTTPS://cdn/x.png"),
            "HTTPS://cdn/x.png"
        );
    }

    #[test]
    fn relative_paths_get_the_api_origin() {
        assert_eq!(
            resolve_image_url(BASE, "/uploads/x.png"),
            "http://localhost:8080/uploads/x.png"
        );
        assert_eq!(
            resolve_image_url("http://h/api/", "/uploads/x.png"),
            "http://h/api/uploads/x.png"
        );
        assert_eq!(
            resolve_image_url(BASE, "uploads/x.png"),
            "http://localhost:8080/uploads/x.png"
        );
    }

    #[test]
    fn http_prefixed_path_is_not_mistaken_for_a_url() {
        assert_eq!(
            resolve_image_url(BASE, "httpdocs/x.png"),
            "http://localhost:8080/httpdocs/x.png"
        );
    }

    #[test]
    fn preview_is_a_data_url() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Cat.PNG");
        fs::File::create(&path).unwrap().write_all(b"abc").unwrap();

        let file = SelectedFile::read(&path).unwrap();
        assert_eq!(file.file_name, "Cat.PNG");
        assert_eq!(file.mime, "image/png");

        let preview = file.preview();
        assert_eq!(preview.data_url, "data:image/png;base64,YWJj");
        assert_eq!(preview.summary(), "Cat.PNG (image/png, 3 B)");
    }

    #[test]
    fn missing_file_is_a_file_error() {
        let err = SelectedFile::read("/definitely/not/here.png").unwrap_err();
        assert!(matches!(err, ApiError::File { .. }));
    }

    #[test]
    fn sizes_are_humanized() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.0 MB");
    }
}
