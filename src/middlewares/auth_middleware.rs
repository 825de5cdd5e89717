use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use bson::oid::ObjectId;
use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::model::admin::Admin;
use crate::model::user::User;
use crate::repository::admin_repo::AdminRepository;
use crate::repository::user_repo::UserRepository;
use crate::util::error::HandlerError;
use crate::util::jwt::{JwtTokenUtils, JwtTokenUtilsImpl, Role};

const NO_TOKEN: &str = "Access denied. No token provided.";
const INVALID_TOKEN: &str = "Invalid token.";

pub struct AuthState {
    pub jwt_utils: Arc<JwtTokenUtilsImpl>,
    pub users: Arc<dyn UserRepository>,
    pub admins: Arc<dyn AdminRepository>,
}

/// Candidate loaded from the bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

/// Administrator loaded from the bearer token.
#[derive(Debug, Clone)]
pub struct AuthAdmin(pub Admin);

/// Id of the account behind a valid access token of namespace `role`.
fn authenticate(state: &AuthState, req: &Request<Body>, role: Role) -> Result<ObjectId, HandlerError> {
    let header = req
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| HandlerError::unauthorized(NO_TOKEN))?;
    let token = state
        .jwt_utils
        .extract_token_from_header(header)
        .map_err(|_| HandlerError::unauthorized(NO_TOKEN))?;
    let claims = state.jwt_utils.validate_access_token(&token).map_err(|e| {
        debug!("Rejected access token: {}", e);
        HandlerError::unauthorized(INVALID_TOKEN)
    })?;
    if !state.jwt_utils.check_role_permission(&claims, role) {
        warn!("Token for role {} used on a {} route", claims.role, role.as_str());
        return Err(HandlerError::unauthorized(INVALID_TOKEN));
    }
    ObjectId::parse_str(&claims.sub).map_err(|_| HandlerError::unauthorized(INVALID_TOKEN))
}

pub async fn user_auth(
    State(state): State<Arc<AuthState>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, HandlerError> {
    let id = authenticate(&state, &req, Role::User)?;
    let user = state
        .users
        .find_by_id(&id)
        .await
        .map_err(|e| {
            error!("Failed to load user {}: {}", id, e);
            HandlerError::unauthorized(INVALID_TOKEN)
        })?
        .ok_or_else(|| HandlerError::unauthorized(INVALID_TOKEN))?;
    req.extensions_mut().insert(AuthUser(user));
    Ok(next.run(req).await)
}

pub async fn admin_auth(
    State(state): State<Arc<AuthState>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, HandlerError> {
    let id = authenticate(&state, &req, Role::Admin)?;
    let admin = state
        .admins
        .find_by_id(&id)
        .await
        .map_err(|e| {
            error!("Failed to load admin {}: {}", id, e);
            HandlerError::unauthorized(INVALID_TOKEN)
        })?
        .ok_or_else(|| HandlerError::unauthorized(INVALID_TOKEN))?;
    req.extensions_mut().insert(AuthAdmin(admin));
    Ok(next.run(req).await)
}
