use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use std::sync::Arc;

use crate::dto::candidate_dto::{CandidateNotes, CandidateResponse, CandidateStatusRequest};
use crate::dto::{ListQuery, MessageResponse};
use crate::handler::json_body;
use crate::service::candidate_service::{CandidateService, CandidateServiceImpl};
use crate::util::error::HandlerError;

pub async fn list_candidates_handler(
    State(service): State<Arc<CandidateServiceImpl>>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, HandlerError> {
    let res = service.list(query).await?;
    Ok(Json(res))
}

pub async fn get_candidate_handler(
    State(service): State<Arc<CandidateServiceImpl>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let res = service.get(&id).await?;
    Ok(Json(res))
}

pub async fn candidate_applications_handler(
    State(service): State<Arc<CandidateServiceImpl>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let res = service.applications(&id).await?;
    Ok(Json(res))
}

pub async fn update_candidate_status_handler(
    State(service): State<Arc<CandidateServiceImpl>>,
    Path(id): Path<String>,
    payload: Result<Json<CandidateStatusRequest>, JsonRejection>,
) -> Result<impl IntoResponse, HandlerError> {
    let request = json_body(payload)?;
    let candidate = service.update_status(&id, request.status.as_deref()).await?;
    Ok(Json(CandidateResponse { message: "Candidate status updated".to_string(), candidate }))
}

pub async fn get_candidate_notes_handler(
    State(service): State<Arc<CandidateServiceImpl>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let res = service.get_notes(&id).await?;
    Ok(Json(res))
}

pub async fn save_candidate_notes_handler(
    State(service): State<Arc<CandidateServiceImpl>>,
    Path(id): Path<String>,
    payload: Result<Json<CandidateNotes>, JsonRejection>,
) -> Result<impl IntoResponse, HandlerError> {
    let request = json_body(payload)?;
    service.save_notes(&id, &request.notes).await?;
    Ok(Json(MessageResponse::new("Notes saved")))
}
