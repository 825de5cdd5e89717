use axum::{middleware, routing::{get, patch}, Router};
use std::sync::Arc;

use crate::handler::candidate_handler::{
    candidate_applications_handler,
    get_candidate_handler,
    get_candidate_notes_handler,
    list_candidates_handler,
    save_candidate_notes_handler,
    update_candidate_status_handler,
};
use crate::middlewares::auth_middleware::{admin_auth, AuthState};
use crate::service::candidate_service::CandidateServiceImpl;

pub fn candidate_router(service: Arc<CandidateServiceImpl>, auth_state: Arc<AuthState>) -> Router {
    Router::new()
        .route("/candidates", get(list_candidates_handler))
        .route("/candidates/{id}", get(get_candidate_handler))
        .route("/candidates/{id}/applications", get(candidate_applications_handler))
        .route("/candidates/{id}/status", patch(update_candidate_status_handler))
        .route("/candidates/{id}/notes", get(get_candidate_notes_handler).post(save_candidate_notes_handler))
        .route_layer(middleware::from_fn_with_state(auth_state, admin_auth))
        .with_state(service)
}
