use google_cloud_storage::client::{Client, ClientConfig};
use google_cloud_storage::http::objects::upload::{Media, UploadObjectRequest, UploadType};
use std::env;
use uuid::Uuid;

use crate::models::draft::FileRef;

const MB: u64 = 1024 * 1024;

#[derive(Debug)]
pub enum UploadError {
    FileTooLarge(String),
    UnsupportedType(String),
    UnknownCategory(String),
    GcsError(String),
    EnvironmentError(String),
}

impl std::fmt::Display for UploadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UploadError::FileTooLarge(err) => write!(f, "File too large: {}", err),
            UploadError::UnsupportedType(err) => write!(f, "Unsupported file type: {}", err),
            UploadError::UnknownCategory(err) => write!(f, "Unknown upload category: {}", err),
            UploadError::GcsError(err) => write!(f, "GCS upload error: {}", err),
            UploadError::EnvironmentError(err) => write!(f, "Environment error: {}", err),
        }
    }
}

impl std::error::Error for UploadError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadCategory {
    /// Road test confirmation and licence photos. Checked before submission.
    Documents,
    /// Account profile image.
    Profile,
}

impl UploadCategory {
    pub fn parse(value: &str) -> Result<Self, UploadError> {
        match value {
            "documents" => Ok(UploadCategory::Documents),
            "profile" => Ok(UploadCategory::Profile),
            other => Err(UploadError::UnknownCategory(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UploadCategory::Documents => "documents",
            UploadCategory::Profile => "profile",
        }
    }

    pub fn max_size(&self) -> u64 {
        match self {
            UploadCategory::Documents => 10 * MB,
            UploadCategory::Profile => 5 * MB,
        }
    }

    fn file_extension(&self, content_type: &str) -> Result<&'static str, UploadError> {
        match (self, content_type) {
            (_, "image/jpeg") | (_, "image/jpg") => Ok("jpg"),
            (_, "image/png") => Ok("png"),
            (_, "image/webp") => Ok("webp"),
            (UploadCategory::Documents, "application/pdf") => Ok("pdf"),
            _ => Err(UploadError::UnsupportedType(format!(
                "{} not accepted for {}",
                content_type,
                self.as_str()
            ))),
        }
    }
}

pub struct UploadService {
    client: Client,
    bucket_name: String,
}

impl UploadService {
    pub async fn new() -> Result<Self, UploadError> {
        let bucket_name = env::var("DOCUMENT_BUCKET")
            .map_err(|_| UploadError::EnvironmentError("DOCUMENT_BUCKET not set".to_string()))?;

        let config = ClientConfig::default().with_auth().await.map_err(|e| {
            UploadError::GcsError(format!("Failed to create GCS client: {}", e))
        })?;

        let client = Client::new(config);

        Ok(Self {
            client,
            bucket_name,
        })
    }

    pub async fn upload(
        &self,
        category: UploadCategory,
        original_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<FileRef, UploadError> {
        let size = bytes.len() as u64;
        if size > category.max_size() {
            return Err(UploadError::FileTooLarge(format!(
                "{} bytes exceeds the {} byte limit for {}",
                size,
                category.max_size(),
                category.as_str()
            )));
        }

        let file_extension = category.file_extension(content_type)?;
        let timestamp = chrono::Utc::now().timestamp();
        let random_id = Uuid::new_v4();
        let object_name = format!(
            "{}/{}-{}.{}",
            category.as_str(),
            timestamp,
            random_id,
            file_extension
        );

        let upload_type = UploadType::Simple(Media::new(object_name.clone()));
        let upload_request = UploadObjectRequest {
            bucket: self.bucket_name.clone(),
            ..Default::default()
        };

        self.client
            .upload_object(&upload_request, bytes, &upload_type)
            .await
            .map_err(|e| UploadError::GcsError(format!("Failed to upload to GCS: {}", e)))?;

        let public_url = format!(
            "https://storage.googleapis.com/{}/{}",
            self.bucket_name, object_name
        );

        Ok(FileRef {
            url: public_url,
            original_name: original_name.to_string(),
            filename: object_name,
            size,
        })
    }
}
