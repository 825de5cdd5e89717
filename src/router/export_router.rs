use axum::{middleware, routing::get, Router};
use std::sync::Arc;

use crate::handler::export_handler::{export_applications_handler, export_candidates_handler, export_jobs_handler};
use crate::middlewares::auth_middleware::{admin_auth, AuthState};
use crate::service::export_service::ExportServiceImpl;

pub fn export_router(service: Arc<ExportServiceImpl>, auth_state: Arc<AuthState>) -> Router {
    Router::new()
        .route("/export/candidates", get(export_candidates_handler))
        .route("/export/applications", get(export_applications_handler))
        .route("/export/jobs", get(export_jobs_handler))
        .route_layer(middleware::from_fn_with_state(auth_state, admin_auth))
        .with_state(service)
}
