use axum::{middleware, routing::get, Router};
use std::sync::Arc;

use crate::handler::resume_handler::{download_all_resumes_handler, download_resume_handler, view_resume_handler};
use crate::middlewares::auth_middleware::{admin_auth, AuthState};
use crate::service::resume_service::ResumeServiceImpl;

pub fn resume_router(service: Arc<ResumeServiceImpl>, auth_state: Arc<AuthState>) -> Router {
    Router::new()
        .route("/resumes/downloadAll", get(download_all_resumes_handler))
        .route("/resumes/{id}/download", get(download_resume_handler))
        .route("/resumes/{id}/view", get(view_resume_handler))
        .route_layer(middleware::from_fn_with_state(auth_state, admin_auth))
        .with_state(service)
}
