use crate::dto::profile_dto::{ProfileUpdate, ProfileView};
use crate::model::user::User;
use crate::repository::user_repo::UserRepository;
use crate::util::error::ServiceError;
use crate::util::password::{PasswordUtils, PasswordUtilsImpl};
use crate::util::storage::{extension_of, FileStorage};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use regex::Regex;
use std::sync::{Arc, OnceLock};
use tracing::{info, instrument, warn};

const INVALID_IMAGE: &str = "Invalid image data";

fn data_url_pattern() -> Result<&'static Regex, ServiceError> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^data:image/([a-zA-Z]+);base64,(.+)$").ok())
        .as_ref()
        .ok_or_else(|| ServiceError::InternalError("data URL pattern failed to compile".to_string()))
}

/// Split `data:image/<ext>;base64,<data>` into the extension and decoded bytes.
pub fn decode_data_url(value: &str) -> Result<(String, Vec<u8>), ServiceError> {
    let captures = data_url_pattern()?
        .captures(value.trim())
        .ok_or_else(|| ServiceError::InvalidInput(INVALID_IMAGE.to_string()))?;
    let bytes = STANDARD
        .decode(captures[2].trim())
        .map_err(|_| ServiceError::InvalidInput(INVALID_IMAGE.to_string()))?;
    Ok((captures[1].to_lowercase(), bytes))
}

#[async_trait]
pub trait ProfileService: Send + Sync {
    fn get_profile(&self, user: &User) -> ProfileView;
    async fn update_profile(&self, user: User, update: ProfileUpdate) -> Result<ProfileView, ServiceError>;
}

pub struct ProfileServiceImpl {
    pub users: Arc<dyn UserRepository>,
    pub storage: Arc<FileStorage>,
}

impl ProfileServiceImpl {
    pub fn new(users: Arc<dyn UserRepository>, storage: Arc<FileStorage>) -> Self {
        ProfileServiceImpl { users, storage }
    }

    /// New stored value of `profileImage`, or None to keep the current one.
    async fn resolve_image(&self, user_id: &str, update: &ProfileUpdate) -> Result<Option<Option<String>>, ServiceError> {
        let millis = chrono::Utc::now().timestamp_millis();
        if let Some(file) = &update.profile_image_file {
            let name = format!("profile_{}_{}{}", user_id, millis, extension_of(&file.filename));
            let path = self.storage.save_profile_image(&name, &file.content).await?;
            return Ok(Some(Some(path)));
        }
        match update.profile_image.as_deref() {
            None => Ok(None),
            Some(value) if value.starts_with("data:image") => {
                let (ext, bytes) = decode_data_url(value)?;
                let name = format!("profile_{}_{}.{}", user_id, millis, ext);
                let path = self.storage.save_profile_image(&name, &bytes).await?;
                Ok(Some(Some(path)))
            }
            Some(value) if value.trim().is_empty() => Ok(Some(None)),
            Some(value) => Ok(Some(Some(value.to_string()))),
        }
    }
}

#[async_trait]
impl ProfileService for ProfileServiceImpl {
    fn get_profile(&self, user: &User) -> ProfileView {
        ProfileView::from(user)
    }

    #[instrument(skip(self, user, update), fields(user = ?user.id))]
    async fn update_profile(&self, mut user: User, update: ProfileUpdate) -> Result<ProfileView, ServiceError> {
        let user_id = user.id.map(|id| id.to_hex()).unwrap_or_default();
        // Image problems must reject the request before anything is written.
        if let Some(value) = update.profile_image.as_deref().filter(|v| v.starts_with("data:image")) {
            if update.profile_image_file.is_none() {
                decode_data_url(value).inspect_err(|_| warn!("Malformed data URL for profile image"))?;
            }
        }

        if let Some(fullname) = update.fullname.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
            user.fullname = fullname.to_string();
        }
        for (slot, value) in [
            (&mut user.title, &update.title),
            (&mut user.about, &update.about),
            (&mut user.age, &update.age),
            (&mut user.national_id, &update.national_id),
            (&mut user.phone, &update.phone),
            (&mut user.address, &update.address),
            (&mut user.city, &update.city),
            (&mut user.country, &update.country),
            (&mut user.date_of_birth, &update.date_of_birth),
        ] {
            if let Some(value) = value {
                *slot = Some(value.clone());
            }
        }
        if let Some(experience) = &update.experience {
            user.experience = experience.clone();
        }
        if let Some(education) = &update.education {
            user.education = education.clone();
        }
        if let Some(new_password) = update.new_password.as_deref().filter(|p| !p.is_empty()) {
            user.password = PasswordUtilsImpl::hash_password(new_password)
                .map_err(|e| ServiceError::InternalError(format!("Password hash error: {}", e)))?;
            info!("Password changed");
        }
        if let Some(image) = self.resolve_image(&user_id, &update).await? {
            user.profile_image = image;
        }

        let user = self.users.update(user).await?;
        info!("Profile updated");
        Ok(ProfileView::from(&user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_data_url() {
        let (ext, bytes) = decode_data_url("data:image/PNG;base64,aGVsbG8=").unwrap();
        assert_eq!(ext, "png");
        assert_eq!(bytes, b"hello");
    }

    #[test]
    fn test_decode_rejects_malformed() {
        for value in ["data:image/png,aGVsbG8=", "data:image/png;base64,@@@", "data:image/;base64,aGVsbG8="] {
            let err = decode_data_url(value).unwrap_err();
            assert!(matches!(err, ServiceError::InvalidInput(ref m) if m == INVALID_IMAGE), "{}", value);
        }
    }
}
