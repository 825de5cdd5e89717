use axum::{middleware, routing::get, Router};
use std::sync::Arc;

use crate::handler::admin_handler::{get_admin_profile_handler, list_admins_handler, update_admin_profile_handler};
use crate::middlewares::auth_middleware::{admin_auth, AuthState};
use crate::service::admin_service::AdminServiceImpl;

pub fn admin_router(service: Arc<AdminServiceImpl>, auth_state: Arc<AuthState>) -> Router {
    Router::new()
        .route("/profile", get(get_admin_profile_handler).put(update_admin_profile_handler))
        .route("/admins", get(list_admins_handler))
        .route_layer(middleware::from_fn_with_state(auth_state, admin_auth))
        .with_state(service)
}
