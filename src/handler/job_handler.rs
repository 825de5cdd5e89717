use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use std::sync::Arc;
use tracing::info;

use crate::dto::application_dto::{ApplicationResponse, ApplyForm};
use crate::dto::job_dto::{CreateJobRequest, JobQuery, JobResponse, JobStatusRequest};
use crate::dto::{ListQuery, MessageResponse};
use crate::handler::{json_body, read_form, FormField};
use crate::middlewares::auth_middleware::{AuthAdmin, AuthUser};
use crate::service::job_service::{JobService, JobServiceImpl};
use crate::util::error::HandlerError;

// Public listing
pub async fn list_jobs_handler(
    State(service): State<Arc<JobServiceImpl>>,
    Query(query): Query<JobQuery>,
) -> Result<impl IntoResponse, HandlerError> {
    let jobs = service.list_jobs(query).await?;
    Ok(Json(jobs))
}

pub async fn get_job_handler(
    State(service): State<Arc<JobServiceImpl>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let job = service.get_job(&id).await?;
    Ok(Json(job))
}

/// `POST /api/jobs`, answered with the bare job.
pub async fn create_job_handler(
    State(service): State<Arc<JobServiceImpl>>,
    Extension(AuthAdmin(admin)): Extension<AuthAdmin>,
    payload: Result<Json<CreateJobRequest>, JsonRejection>,
) -> Result<impl IntoResponse, HandlerError> {
    let request = json_body(payload)?;
    let job = service.create_job(request, &admin).await?;
    Ok((StatusCode::CREATED, Json(job)))
}

pub async fn apply_job_handler(
    State(service): State<Arc<JobServiceImpl>>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<impl IntoResponse, HandlerError> {
    let mut form = ApplyForm::default();
    for field in read_form(multipart).await? {
        match field {
            FormField::Text(name, value) => form.set_text_field(&name, value),
            FormField::File(name, file) if name == "resume" => form.resume = Some(file),
            FormField::File(name, _) => info!("Ignoring unexpected file field {}", name),
        }
    }
    let application = service.apply(&id, &user, form).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApplicationResponse {
            message: "Application submitted successfully".to_string(),
            application,
        }),
    ))
}

pub async fn my_applications_handler(
    State(service): State<Arc<JobServiceImpl>>,
    Extension(AuthUser(user)): Extension<AuthUser>,
) -> Result<impl IntoResponse, HandlerError> {
    let applications = service.my_applications(&user).await?;
    Ok(Json(applications))
}

// Admin management
pub async fn admin_list_jobs_handler(
    State(service): State<Arc<JobServiceImpl>>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, HandlerError> {
    let jobs = service.admin_list_jobs(query).await?;
    Ok(Json(jobs))
}

pub async fn admin_get_job_handler(
    State(service): State<Arc<JobServiceImpl>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let job = service.admin_get_job(&id).await?;
    Ok(Json(job))
}

pub async fn admin_create_job_handler(
    State(service): State<Arc<JobServiceImpl>>,
    Extension(AuthAdmin(admin)): Extension<AuthAdmin>,
    payload: Result<Json<CreateJobRequest>, JsonRejection>,
) -> Result<impl IntoResponse, HandlerError> {
    let request = json_body(payload)?;
    let job = service.create_job(request, &admin).await?;
    Ok((
        StatusCode::CREATED,
        Json(JobResponse { message: "Job created successfully".to_string(), job }),
    ))
}

pub async fn update_job_status_handler(
    State(service): State<Arc<JobServiceImpl>>,
    Path(id): Path<String>,
    payload: Result<Json<JobStatusRequest>, JsonRejection>,
) -> Result<impl IntoResponse, HandlerError> {
    let request = json_body(payload)?;
    let job = service.update_job_status(&id, request.status.as_deref()).await?;
    Ok(Json(JobResponse { message: "Job status updated successfully".to_string(), job }))
}

pub async fn delete_job_handler(
    State(service): State<Arc<JobServiceImpl>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    service.delete_job(&id).await?;
    Ok(Json(MessageResponse::new("Job and associated applications deleted successfully")))
}
