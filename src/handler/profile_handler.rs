use axum::extract::{FromRequest, Multipart, Request, State};
use axum::response::IntoResponse;
use axum::{Extension, Json};
use std::sync::Arc;

use crate::dto::profile_dto::{ProfileResponse, ProfileUpdate};
use crate::handler::{is_multipart, json_body, read_form, FormField};
use crate::middlewares::auth_middleware::AuthUser;
use crate::service::profile_service::{ProfileService, ProfileServiceImpl};
use crate::util::error::HandlerError;

pub async fn get_profile_handler(
    State(service): State<Arc<ProfileServiceImpl>>,
    Extension(AuthUser(user)): Extension<AuthUser>,
) -> impl IntoResponse {
    Json(ProfileResponse {
        message: "Profile retrieved successfully".to_string(),
        profile: service.get_profile(&user),
    })
}

/// Accepts either a JSON body or a multipart form with an optional `profileImage` file.
pub async fn update_profile_handler(
    State(service): State<Arc<ProfileServiceImpl>>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    req: Request,
) -> Result<impl IntoResponse, HandlerError> {
    let update = if is_multipart(req.headers()) {
        let multipart = Multipart::from_request(req, &())
            .await
            .map_err(|e| HandlerError::bad_request(e.body_text()))?;
        let mut update = ProfileUpdate::default();
        for field in read_form(multipart).await? {
            match field {
                FormField::Text(name, value) => update.set_text_field(&name, value),
                FormField::File(name, file) if name == "profileImage" => update.profile_image_file = Some(file),
                FormField::File(..) => {}
            }
        }
        update
    } else {
        json_body(Json::<ProfileUpdate>::from_request(req, &()).await)?
    };
    let profile = service.update_profile(user, update).await?;
    Ok(Json(ProfileResponse { message: "Profile updated successfully".to_string(), profile }))
}
