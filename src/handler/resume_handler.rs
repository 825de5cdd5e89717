use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::sync::Arc;

use crate::service::resume_service::{ResumeDownload, ResumeService, ResumeServiceImpl};
use crate::util::error::HandlerError;

pub async fn download_resume_handler(
    State(service): State<Arc<ResumeServiceImpl>>,
    Path(id): Path<String>,
) -> Result<Response, HandlerError> {
    let res = match service.download(&id).await? {
        // Remote resumes are not proxied.
        ResumeDownload::Redirect(url) => (StatusCode::FOUND, [(header::LOCATION, url)]).into_response(),
        ResumeDownload::File { file_name, content_type, bytes } => (
            [
                (header::CONTENT_TYPE, content_type),
                (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{}\"", file_name)),
            ],
            bytes,
        )
            .into_response(),
    };
    Ok(res)
}

pub async fn view_resume_handler(
    State(service): State<Arc<ResumeServiceImpl>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let links = service.view(&id).await?;
    Ok(Json(links))
}

pub async fn download_all_resumes_handler(
    State(service): State<Arc<ResumeServiceImpl>>,
) -> Result<impl IntoResponse, HandlerError> {
    let archive = service.download_all().await?;
    Ok((
        [
            (header::CONTENT_TYPE, "application/zip"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"all_resumes.zip\""),
        ],
        archive,
    ))
}
