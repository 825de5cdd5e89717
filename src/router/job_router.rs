use axum::{middleware, routing::{get, patch, post}, Router};
use std::sync::Arc;

use crate::handler::job_handler::{
    admin_create_job_handler,
    admin_get_job_handler,
    admin_list_jobs_handler,
    apply_job_handler,
    create_job_handler,
    delete_job_handler,
    get_job_handler,
    list_jobs_handler,
    my_applications_handler,
    update_job_status_handler,
};
use crate::middlewares::auth_middleware::{admin_auth, user_auth, AuthState};
use crate::service::job_service::JobServiceImpl;

/// Mounted under `/api/jobs`.
pub fn job_router(service: Arc<JobServiceImpl>, auth_state: Arc<AuthState>) -> Router {
    // Public browsing
    let public = Router::new()
        .route("/", get(list_jobs_handler))
        .route("/{id}", get(get_job_handler));

    // Candidate routes
    let candidate = Router::new()
        .route("/{id}/apply", post(apply_job_handler))
        .route("/applications/me", get(my_applications_handler))
        .route_layer(middleware::from_fn_with_state(auth_state.clone(), user_auth));

    // Posting requires an admin token
    let admin = Router::new()
        .route("/", post(create_job_handler))
        .route_layer(middleware::from_fn_with_state(auth_state, admin_auth));

    public.merge(candidate).merge(admin).with_state(service)
}

/// Mounted under `/api/admin`.
pub fn admin_job_router(service: Arc<JobServiceImpl>, auth_state: Arc<AuthState>) -> Router {
    Router::new()
        .route("/jobs", get(admin_list_jobs_handler).post(admin_create_job_handler))
        .route("/jobs/{id}", get(admin_get_job_handler).delete(delete_job_handler))
        .route("/jobs/{id}/status", patch(update_job_status_handler))
        .route_layer(middleware::from_fn_with_state(auth_state, admin_auth))
        .with_state(service)
}
