use axum::extract::{FromRequest, Multipart, Request, State};
use axum::response::IntoResponse;
use axum::{Extension, Json};
use std::sync::Arc;

use crate::dto::admin_dto::{AdminProfileResponse, AdminProfileUpdate};
use crate::dto::MessageResponse;
use crate::handler::{is_multipart, json_body, read_form, FormField};
use crate::middlewares::auth_middleware::AuthAdmin;
use crate::service::admin_service::{AdminService, AdminServiceImpl};
use crate::util::error::HandlerError;

pub async fn get_admin_profile_handler(
    State(service): State<Arc<AdminServiceImpl>>,
    Extension(AuthAdmin(admin)): Extension<AuthAdmin>,
) -> impl IntoResponse {
    Json(AdminProfileResponse { profile: service.get_profile(&admin) })
}

pub async fn update_admin_profile_handler(
    State(service): State<Arc<AdminServiceImpl>>,
    Extension(AuthAdmin(admin)): Extension<AuthAdmin>,
    req: Request,
) -> Result<impl IntoResponse, HandlerError> {
    let update = if is_multipart(req.headers()) {
        let multipart = Multipart::from_request(req, &())
            .await
            .map_err(|e| HandlerError::bad_request(e.body_text()))?;
        let mut update = AdminProfileUpdate::default();
        for field in read_form(multipart).await? {
            match field {
                FormField::Text(name, value) => update.set_text_field(&name, value),
                FormField::File(name, file) if name == "profileImage" => update.profile_image = Some(file),
                FormField::File(..) => {}
            }
        }
        update
    } else {
        json_body(Json::<AdminProfileUpdate>::from_request(req, &()).await)?
    };
    service.update_profile(admin, update).await?;
    Ok(Json(MessageResponse::new("Profile updated successfully")))
}

pub async fn list_admins_handler(
    State(service): State<Arc<AdminServiceImpl>>,
) -> Result<impl IntoResponse, HandlerError> {
    let admins = service.list_admins().await?;
    Ok(Json(admins))
}
