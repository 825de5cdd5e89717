use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::{Extension, Json};
use std::sync::Arc;

use crate::dto::application_dto::{ApplicationResponse, StatusUpdateRequest};
use crate::dto::ListQuery;
use crate::handler::json_body;
use crate::middlewares::auth_middleware::AuthAdmin;
use crate::service::application_service::{ApplicationService, ApplicationServiceImpl};
use crate::util::error::HandlerError;

pub async fn list_applications_handler(
    State(service): State<Arc<ApplicationServiceImpl>>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, HandlerError> {
    let res = service.list(query).await?;
    Ok(Json(res))
}

pub async fn count_applications_handler(
    State(service): State<Arc<ApplicationServiceImpl>>,
) -> Result<impl IntoResponse, HandlerError> {
    let res = service.count().await?;
    Ok(Json(res))
}

pub async fn get_application_handler(
    State(service): State<Arc<ApplicationServiceImpl>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let res = service.get(&id).await?;
    Ok(Json(res))
}

pub async fn update_application_status_handler(
    State(service): State<Arc<ApplicationServiceImpl>>,
    Extension(AuthAdmin(admin)): Extension<AuthAdmin>,
    Path(id): Path<String>,
    payload: Result<Json<StatusUpdateRequest>, JsonRejection>,
) -> Result<impl IntoResponse, HandlerError> {
    let request = json_body(payload)?;
    let application = service.update_status(&id, request, &admin).await?;
    Ok(Json(ApplicationResponse {
        message: "Application updated successfully".to_string(),
        application,
    }))
}

pub async fn applications_by_job_handler(
    State(service): State<Arc<ApplicationServiceImpl>>,
    Path(job_id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let res = service.by_job(&job_id).await?;
    Ok(Json(res))
}
