use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use std::sync::Arc;
use tracing::info;

use crate::dto::auth_dto::{LoginRequest, RefreshRequest, SignupRequest};
use crate::dto::MessageResponse;
use crate::handler::json_body;
use crate::service::auth_service::{AuthService, AuthServiceImpl};
use crate::util::error::HandlerError;

pub const REFRESH_COOKIE: &str = "refreshToken";

fn refresh_cookie(token: String) -> Cookie<'static> {
    Cookie::build((REFRESH_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .build()
}

pub async fn signup_handler(
    State(service): State<Arc<AuthServiceImpl>>,
    jar: CookieJar,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<impl IntoResponse, HandlerError> {
    let request = json_body(payload)?;
    let res = service.signup(request).await?;
    let jar = jar.add(refresh_cookie(res.refresh_token.clone()));
    Ok((StatusCode::CREATED, jar, Json(res)))
}

pub async fn login_handler(
    State(service): State<Arc<AuthServiceImpl>>,
    jar: CookieJar,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, HandlerError> {
    let request = json_body(payload)?;
    let res = service.login(request).await?;
    let jar = jar.add(refresh_cookie(res.refresh_token.clone()));
    Ok((jar, Json(res)))
}

/// Tokens are stateless, so logging out only drops the refresh cookie.
pub async fn logout_handler(jar: CookieJar) -> impl IntoResponse {
    info!("Logout requested");
    // Sent even when the request carried no cookie.
    let mut cleared = refresh_cookie(String::new());
    cleared.make_removal();
    (jar.add(cleared), Json(MessageResponse::new("Logged out successfully")))
}

/// The token comes from the JSON body or, failing that, the refresh cookie.
pub async fn refresh_handler(
    State(service): State<Arc<AuthServiceImpl>>,
    jar: CookieJar,
    payload: Result<Json<RefreshRequest>, JsonRejection>,
) -> Result<impl IntoResponse, HandlerError> {
    let token = payload
        .ok()
        .and_then(|Json(body)| body.refresh_token)
        .filter(|t| !t.trim().is_empty())
        .or_else(|| {
            jar.get(REFRESH_COOKIE)
                .map(|c| c.value_trimmed().to_string())
                .filter(|t| !t.is_empty())
        })
        .ok_or_else(|| HandlerError::unauthorized("No refresh token provided"))?;
    let res = service.refresh(&token).await?;
    Ok(Json(res))
}
