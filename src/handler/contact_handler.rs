use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use std::sync::Arc;

use crate::dto::contact_dto::ContactRequest;
use crate::dto::MessageResponse;
use crate::handler::json_body;
use crate::service::contact_service::{ContactService, ContactServiceImpl};
use crate::util::error::HandlerError;

pub async fn submit_contact_handler(
    State(service): State<Arc<ContactServiceImpl>>,
    payload: Result<Json<ContactRequest>, JsonRejection>,
) -> Result<impl IntoResponse, HandlerError> {
    let request = json_body(payload)?;
    service.submit(request).await?;
    Ok(Json(MessageResponse::new("Contact form submitted successfully")))
}
