use axum::{middleware, routing::{get, post}, Router};
use std::sync::Arc;

use crate::handler::auth_handler::{login_handler, logout_handler, refresh_handler, signup_handler};
use crate::handler::profile_handler::{get_profile_handler, update_profile_handler};
use crate::middlewares::auth_middleware::{user_auth, AuthState};
use crate::service::auth_service::AuthServiceImpl;
use crate::service::profile_service::ProfileServiceImpl;

/// Signup, login, logout and refresh of one account namespace.
pub fn auth_router(service: Arc<AuthServiceImpl>) -> Router {
    Router::new()
        .route("/signup", post(signup_handler))
        .route("/login", post(login_handler))
        .route("/logout", post(logout_handler))
        .route("/refresh", post(refresh_handler))
        .with_state(service)
}

pub fn profile_router(service: Arc<ProfileServiceImpl>, auth_state: Arc<AuthState>) -> Router {
    Router::new()
        .route("/profile", get(get_profile_handler).put(update_profile_handler))
        .route_layer(middleware::from_fn_with_state(auth_state, user_auth))
        .with_state(service)
}
