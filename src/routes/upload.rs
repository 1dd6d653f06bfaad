use actix_multipart::Multipart;
use actix_web::{web, HttpResponse, Responder};
use futures::{StreamExt, TryStreamExt};

use crate::middleware::auth::Claims;
use crate::services::upload_service::{UploadCategory, UploadError, UploadService};

/// Multipart upload. The first file field wins; size and MIME limits depend
/// on the category in the path (`documents` or `profile`).
pub async fn upload_file(
    service: web::Data<UploadService>,
    path: web::Path<(String,)>,
    mut payload: Multipart,
    _claims: Claims,
) -> impl Responder {
    let category = match UploadCategory::parse(&path.into_inner().0) {
        Ok(category) => category,
        Err(err) => return HttpResponse::BadRequest().body(err.to_string()),
    };

    while let Ok(Some(mut field)) = payload.try_next().await {
        let content_type = field
            .content_type()
            .map(|mime| mime.to_string())
            .unwrap_or_default();

        let original_name = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .unwrap_or("upload")
            .to_string();

        let max_size = category.max_size() as usize;
        let mut bytes: Vec<u8> = Vec::new();

        while let Some(chunk) = field.next().await {
            match chunk {
                Ok(data) => {
                    // Stop reading as soon as the limit is blown instead of
                    // buffering the whole thing
                    if bytes.len() + data.len() > max_size {
                        return HttpResponse::PayloadTooLarge().body(format!(
                            "File exceeds the {} byte limit",
                            max_size
                        ));
                    }
                    bytes.extend_from_slice(&data);
                }
                Err(err) => {
                    log::debug!("Failed to read multipart chunk: {:?}", err);
                    return HttpResponse::BadRequest().body("Failed to read upload");
                }
            }
        }

        return match service
            .upload(category, &original_name, &content_type, bytes)
            .await
        {
            Ok(file_ref) => HttpResponse::Ok().json(file_ref),
            Err(UploadError::FileTooLarge(msg)) => HttpResponse::PayloadTooLarge().body(msg),
            Err(UploadError::UnsupportedType(msg)) => HttpResponse::BadRequest().body(msg),
            Err(UploadError::UnknownCategory(msg)) => HttpResponse::BadRequest().body(msg),
            Err(err) => {
                log::error!("Upload failed: {}", err);
                HttpResponse::InternalServerError().body("Failed to upload file")
            }
        };
    }

    HttpResponse::BadRequest().body("No file provided")
}
