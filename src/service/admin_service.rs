use crate::dto::admin_dto::{AdminProfileUpdate, AdminView};
use crate::dto::auth_dto::AccountView;
use crate::dto::hex_id;
use crate::model::admin::Admin;
use crate::repository::admin_repo::AdminRepository;
use crate::util::error::ServiceError;
use crate::util::password::{PasswordUtils, PasswordUtilsImpl};
use crate::util::storage::{extension_of, FileStorage};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, instrument, warn};

#[async_trait]
pub trait AdminService: Send + Sync {
    fn get_profile(&self, admin: &Admin) -> AdminView;
    async fn update_profile(&self, admin: Admin, update: AdminProfileUpdate) -> Result<(), ServiceError>;
    async fn list_admins(&self) -> Result<Vec<AccountView>, ServiceError>;
}

pub struct AdminServiceImpl {
    pub admins: Arc<dyn AdminRepository>,
    pub storage: Arc<FileStorage>,
}

impl AdminServiceImpl {
    pub fn new(admins: Arc<dyn AdminRepository>, storage: Arc<FileStorage>) -> Self {
        AdminServiceImpl { admins, storage }
    }
}

#[async_trait]
impl AdminService for AdminServiceImpl {
    fn get_profile(&self, admin: &Admin) -> AdminView {
        AdminView::from(admin)
    }

    #[instrument(skip(self, admin, update), fields(admin = ?admin.id))]
    async fn update_profile(&self, mut admin: Admin, update: AdminProfileUpdate) -> Result<(), ServiceError> {
        if let Some(fullname) = update.fullname.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
            admin.fullname = fullname.to_string();
        }

        if let Some(new_password) = update.new_password.as_deref().filter(|p| !p.is_empty()) {
            let current = update.current_password.as_deref().unwrap_or_default();
            let matches = PasswordUtilsImpl::verify_password(current, &admin.password).unwrap_or(false);
            if !matches {
                warn!("Admin password change with wrong current password");
                return Err(ServiceError::InvalidInput("Current password is incorrect".to_string()));
            }
            admin.password = PasswordUtilsImpl::hash_password(new_password)
                .map_err(|e| ServiceError::InternalError(format!("Password hash error: {}", e)))?;
            info!("Admin password changed");
        }

        if let Some(file) = &update.profile_image {
            let name = format!(
                "admin_{}_{}{}",
                hex_id(&admin.id),
                chrono::Utc::now().timestamp_millis(),
                extension_of(&file.filename)
            );
            admin.profile_image = Some(self.storage.save_profile_image(&name, &file.content).await?);
        }

        self.admins.update(admin).await?;
        info!("Admin profile updated");
        Ok(())
    }

    async fn list_admins(&self) -> Result<Vec<AccountView>, ServiceError> {
        let admins = self.admins.list().await?;
        Ok(admins
            .iter()
            .map(|admin| AccountView {
                id: hex_id(&admin.id),
                fullname: admin.fullname.clone(),
                email: admin.email.clone(),
            })
            .collect())
    }
}
