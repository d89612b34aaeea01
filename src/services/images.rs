use std::fmt::Write as _;
use std::time::Duration;

use chrono::Utc;
use futures_util::{StreamExt, stream};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::config::Config;
use crate::error::AppError;

/// Concurrent remote deletions in flight during a cascading cleanup.
const DELETE_CONCURRENCY: usize = 4;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

pub const MAX_FILE_SIZE: usize = 5 * 1024 * 1024;
pub const ALLOWED_CONTENT_TYPES: [&str; 4] =
    ["image/jpeg", "image/jpg", "image/png", "image/webp"];

/// A file received from a multipart upload, already read into memory.
pub struct ImageFile {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub public_id: String,
    pub url: String,
}

/// Aggregate of a best-effort batch deletion. Failures are reported,
/// never raised; callers decide what to do with the leftover URLs.
#[derive(Debug, Default)]
pub struct DeleteOutcome {
    pub succeeded: usize,
    pub failed: Vec<String>,
    pub total: usize,
}

#[derive(Deserialize)]
struct UploadResponse {
    public_id: String,
    secure_url: String,
}

#[derive(Deserialize)]
struct DestroyResponse {
    result: String,
}

/// Client for the external image host. Holds its own HTTP client so
/// every remote call carries a request timeout.
#[derive(Clone)]
pub struct ImageStorage {
    client: reqwest::Client,
    cloud_name: String,
    api_key: String,
    api_secret: String,
}

impl ImageStorage {
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            cloud_name: config.cloudinary_cloud_name.clone(),
            api_key: config.cloudinary_api_key.clone(),
            api_secret: config.cloudinary_api_secret.clone(),
        })
    }

    /// Uploads a batch of files under `folder`, one externally unique
    /// path per file. The batch is all-or-nothing: on any failure the
    /// files already uploaded are destroyed best-effort before the
    /// error is surfaced.
    pub async fn upload(
        &self,
        files: Vec<ImageFile>,
        folder: &str,
    ) -> Result<Vec<UploadedImage>, AppError> {
        let mut uploaded = Vec::with_capacity(files.len());

        for file in files {
            match self.upload_one(file, folder).await {
                Ok(img) => uploaded.push(img),
                Err(e) => {
                    for img in &uploaded {
                        if let Err(rollback_err) = self.destroy(&img.public_id).await {
                            tracing::warn!(
                                "rollback of partial upload {} failed: {}",
                                img.public_id,
                                rollback_err
                            );
                        }
                    }
                    return Err(e);
                }
            }
        }

        Ok(uploaded)
    }

    async fn upload_one(&self, file: ImageFile, folder: &str) -> Result<UploadedImage, AppError> {
        let public_id = format!("{}/{}", folder, Uuid::new_v4());
        let timestamp = Utc::now().timestamp();
        let signature = api_sign(
            &format!("overwrite=true&public_id={public_id}&timestamp={timestamp}"),
            &self.api_secret,
        );

        let part = reqwest::multipart::Part::bytes(file.bytes)
            .file_name(file.filename)
            .mime_str(&file.content_type)
            .map_err(|_| {
                AppError::Validation(format!(
                    "Tipo de contenido inválido: {}",
                    file.content_type
                ))
            })?;

        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("public_id", public_id)
            .text("overwrite", "true")
            .text("timestamp", timestamp.to_string())
            .text("signature_algorithm", "sha256")
            .text("api_key", self.api_key.clone())
            .text("signature", signature);

        let resp: UploadResponse = self
            .client
            .post(format!(
                "https://api.cloudinary.com/v1_1/{}/image/upload",
                self.cloud_name
            ))
            .multipart(form)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(UploadedImage {
            public_id: resp.public_id,
            url: resp.secure_url,
        })
    }

    async fn destroy(&self, public_id: &str) -> Result<bool, reqwest::Error> {
        let timestamp = Utc::now().timestamp();
        let signature = api_sign(
            &format!("public_id={public_id}&timestamp={timestamp}"),
            &self.api_secret,
        );

        let resp: DestroyResponse = self
            .client
            .post(format!(
                "https://api.cloudinary.com/v1_1/{}/image/destroy",
                self.cloud_name
            ))
            .form(&[
                ("public_id", public_id),
                ("timestamp", &timestamp.to_string()),
                ("signature_algorithm", "sha256"),
                ("api_key", &self.api_key),
                ("signature", &signature),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(resp.result == "ok")
    }

    /// Deletes a single image given its stored URL. Returns whether the
    /// remote host confirmed the deletion; a URL outside the recognized
    /// hosting domain is a no-op that returns false.
    pub async fn delete_image(&self, url: &str) -> bool {
        let Some(public_id) = extract_public_id(url) else {
            return false;
        };

        match self.destroy(&public_id).await {
            Ok(ok) => ok,
            Err(e) => {
                tracing::warn!("remote delete of {} failed: {}", public_id, e);
                false
            }
        }
    }

    /// Best-effort deletion of every URL, dispatched concurrently with
    /// a bounded cap. Partial failure is reported in the outcome, never
    /// raised.
    pub async fn delete_images(&self, urls: Vec<String>) -> DeleteOutcome {
        let total = urls.len();

        let results: Vec<(String, bool)> = stream::iter(urls)
            .map(|url| async move {
                let ok = self.delete_image(&url).await;
                (url, ok)
            })
            .buffer_unordered(DELETE_CONCURRENCY)
            .collect()
            .await;

        let mut outcome = DeleteOutcome {
            total,
            ..Default::default()
        };
        for (url, ok) in results {
            if ok {
                outcome.succeeded += 1;
            } else {
                outcome.failed.push(url);
            }
        }
        outcome
    }
}

/// Hex-encoded SHA-256 of the sorted parameter string with the API
/// secret appended, per the hosting provider's request signing scheme.
pub(crate) fn api_sign(params: &str, secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(params.as_bytes());
    hasher.update(secret.as_bytes());
    hasher.finalize().iter().fold(String::new(), |mut acc, b| {
        let _ = write!(acc, "{b:02x}");
        acc
    })
}

/// Whether a stored URL points at the image host. Anything else (a
/// placeholder, an external link typed by the owner) is outside the
/// cleanup protocol: there is nothing remote to delete.
pub fn is_hosted_url(url: &str) -> bool {
    url.contains("cloudinary.com")
}

/// Recovers the provider-side public id from a stored delivery URL:
/// `.../upload/[v<version>/]<public_id>.<ext>`. Returns None for URLs
/// that do not belong to the hosting domain.
pub fn extract_public_id(url: &str) -> Option<String> {
    if !is_hosted_url(url) {
        return None;
    }

    let url = url.split(['?', '#']).next().unwrap_or(url);
    let rest = url.split_once("/upload/").map(|(_, r)| r)?;

    // optional version segment: v<digits>/
    let rest = match rest.split_once('/') {
        Some((first, tail))
            if first.len() > 1
                && first.starts_with('v')
                && first[1..].chars().all(|c| c.is_ascii_digit()) =>
        {
            tail
        }
        _ => rest,
    };

    if rest.is_empty() {
        return None;
    }

    // strip the file extension from the final path segment only
    let public_id = match (rest.rfind('.'), rest.rfind('/')) {
        (Some(dot), Some(slash)) if dot > slash => &rest[..dot],
        (Some(dot), None) => &rest[..dot],
        _ => rest,
    };

    if public_id.is_empty() {
        None
    } else {
        Some(public_id.to_string())
    }
}

/// Multipart upload validation shared by the image endpoints.
pub fn validate_file(file: &ImageFile) -> Result<(), AppError> {
    if !ALLOWED_CONTENT_TYPES.contains(&file.content_type.as_str()) {
        return Err(AppError::Validation(format!(
            "Tipo de archivo no permitido: {}. Usa: {}",
            file.content_type,
            ALLOWED_CONTENT_TYPES.join(", ")
        )));
    }
    if file.bytes.len() > MAX_FILE_SIZE {
        return Err(AppError::Validation(format!(
            "El archivo {} excede el tamaño máximo de 5MB",
            file.filename
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_public_id_with_version_segment() {
        let url = "https://res.cloudinary.com/demo/image/upload/v1712345678/comercios/abc-123.jpg";
        assert_eq!(extract_public_id(url).as_deref(), Some("comercios/abc-123"));
    }

    #[test]
    fn extracts_public_id_without_version_segment() {
        let url = "https://res.cloudinary.com/demo/image/upload/general/foto.png";
        assert_eq!(extract_public_id(url).as_deref(), Some("general/foto"));
    }

    #[test]
    fn keeps_dots_in_folder_names() {
        let url = "https://res.cloudinary.com/demo/image/upload/v99/carpeta.v2/img.webp";
        assert_eq!(extract_public_id(url).as_deref(), Some("carpeta.v2/img"));
    }

    #[test]
    fn ignores_query_string() {
        let url = "https://res.cloudinary.com/demo/image/upload/v1/a/b.jpg?w=200";
        assert_eq!(extract_public_id(url).as_deref(), Some("a/b"));
    }

    #[test]
    fn hosted_url_check_excludes_foreign_hosts() {
        assert!(is_hosted_url(
            "https://res.cloudinary.com/demo/image/upload/a/b.jpg"
        ));
        assert!(!is_hosted_url("https://imgur.com/a/b.jpg"));
        assert!(!is_hosted_url("placeholder.png"));
    }

    #[test]
    fn foreign_urls_are_rejected() {
        assert_eq!(extract_public_id("https://example.com/upload/v1/a.jpg"), None);
        assert_eq!(extract_public_id("https://res.cloudinary.com/demo/image/fetch/a.jpg"), None);
        assert_eq!(extract_public_id(""), None);
    }

    #[test]
    fn version_prefix_requires_all_digits() {
        let url = "https://res.cloudinary.com/demo/image/upload/v123lol/a.jpg";
        assert_eq!(extract_public_id(url).as_deref(), Some("v123lol/a"));
    }

    #[test]
    fn api_sign_matches_known_vector() {
        let sig = api_sign("public_id=comercios/abc&timestamp=1700000000", "secreto");
        assert_eq!(
            sig,
            "421716774d0f4a197da3c53f0c47da6c045bf7d60c51fe4b4e9bd1a80d86ec22"
        );
    }

    #[test]
    fn validate_file_rejects_bad_type_and_size() {
        let bad_type = ImageFile {
            filename: "a.gif".into(),
            content_type: "image/gif".into(),
            bytes: vec![0; 10],
        };
        assert!(validate_file(&bad_type).is_err());

        // not even a well-formed mime; must never reach the upload form
        let malformed = ImageFile {
            filename: "a".into(),
            content_type: "imagen".into(),
            bytes: vec![0; 10],
        };
        assert!(validate_file(&malformed).is_err());

        let too_big = ImageFile {
            filename: "a.png".into(),
            content_type: "image/png".into(),
            bytes: vec![0; MAX_FILE_SIZE + 1],
        };
        assert!(validate_file(&too_big).is_err());

        let ok = ImageFile {
            filename: "a.png".into(),
            content_type: "image/png".into(),
            bytes: vec![0; 128],
        };
        assert!(validate_file(&ok).is_ok());
    }
}
