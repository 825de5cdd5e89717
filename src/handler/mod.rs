pub mod admin_handler;
pub mod application_handler;
pub mod auth_handler;
pub mod candidate_handler;
pub mod contact_handler;
pub mod dashboard_handler;
pub mod export_handler;
pub mod job_handler;
pub mod profile_handler;
pub mod resume_handler;

use axum::extract::multipart::Multipart;
use axum::extract::rejection::JsonRejection;
use axum::http::{header, HeaderMap};
use axum::Json;
use tracing::{debug, error};

use crate::dto::File;
use crate::util::error::HandlerError;

/// Unwrap a JSON body, answering malformed input with a 400.
pub fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, HandlerError> {
    match payload {
        Ok(Json(body)) => Ok(body),
        Err(rejection) => {
            debug!("Rejected JSON body: {}", rejection);
            Err(HandlerError::bad_request(rejection.body_text()))
        }
    }
}

pub fn is_multipart(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("multipart/form-data"))
        .unwrap_or(false)
}

/// One part of a multipart form.
pub enum FormField {
    Text(String, String),
    File(String, File),
}

/// Read the whole form. Parts carrying a file name are files, the rest text.
pub async fn read_form(mut multipart: Multipart) -> Result<Vec<FormField>, HandlerError> {
    let mut fields = Vec::new();
    while let Some(field) = match multipart.next_field().await {
        Ok(f) => f,
        Err(e) => {
            error!("Error getting next field: {}", e);
            return Err(HandlerError::bad_request(format!("Failed to get next field: {}", e)));
        }
    } {
        let name = field.name().map(|s| s.to_string()).unwrap_or_default();
        let file_name = field.file_name().map(|s| s.to_string());
        let content_type = field.content_type().map(|s| s.to_string()).unwrap_or_default();
        let data = field.bytes().await.map_err(|e| {
            error!("Failed to read field {}: {}", name, e);
            HandlerError::bad_request(format!("Failed to read field {}: {}", name, e))
        })?;
        match file_name {
            Some(filename) => {
                debug!("Received file {} ({} bytes) in field {}", filename, data.len(), name);
                if data.is_empty() && filename.is_empty() {
                    continue;
                }
                fields.push(FormField::File(name, File { filename, content_type, content: data }));
            }
            None => fields.push(FormField::Text(name, String::from_utf8_lossy(&data).into_owned())),
        }
    }
    Ok(fields)
}
