use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use std::sync::Arc;

use crate::service::export_service::{ExportService, ExportServiceImpl};
use crate::util::error::HandlerError;

fn csv_attachment(name: &str, body: String) -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{}.csv\"", name)),
        ],
        body,
    )
}

pub async fn export_candidates_handler(
    State(service): State<Arc<ExportServiceImpl>>,
) -> Result<impl IntoResponse, HandlerError> {
    let csv = service.candidates_csv().await?;
    Ok(csv_attachment("candidates", csv))
}

pub async fn export_applications_handler(
    State(service): State<Arc<ExportServiceImpl>>,
) -> Result<impl IntoResponse, HandlerError> {
    let csv = service.applications_csv().await?;
    Ok(csv_attachment("applications", csv))
}

pub async fn export_jobs_handler(
    State(service): State<Arc<ExportServiceImpl>>,
) -> Result<impl IntoResponse, HandlerError> {
    let csv = service.jobs_csv().await?;
    Ok(csv_attachment("jobs", csv))
}
