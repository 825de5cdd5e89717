use axum::{middleware, routing::{get, patch}, Router};
use std::sync::Arc;

use crate::handler::application_handler::{
    applications_by_job_handler,
    count_applications_handler,
    get_application_handler,
    list_applications_handler,
    update_application_status_handler,
};
use crate::middlewares::auth_middleware::{admin_auth, AuthState};
use crate::service::application_service::ApplicationServiceImpl;

pub fn application_router(service: Arc<ApplicationServiceImpl>, auth_state: Arc<AuthState>) -> Router {
    Router::new()
        .route("/applications", get(list_applications_handler))
        .route("/applications/count", get(count_applications_handler))
        .route("/applications/by-job/{job_id}", get(applications_by_job_handler))
        .route("/applications/{id}", get(get_application_handler))
        .route("/applications/{id}/status", patch(update_application_status_handler))
        .route_layer(middleware::from_fn_with_state(auth_state, admin_auth))
        .with_state(service)
}
