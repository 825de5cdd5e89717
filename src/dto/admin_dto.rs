use crate::dto::{hex_id, rfc3339, File};
use crate::model::admin::Admin;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminView {
    pub id: String,
    pub fullname: String,
    pub email: String,
    pub profile_image: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl From<&Admin> for AdminView {
    fn from(admin: &Admin) -> Self {
        AdminView {
            id: hex_id(&admin.id),
            fullname: admin.fullname.clone(),
            email: admin.email.clone(),
            profile_image: admin.profile_image.clone(),
            created_at: rfc3339(&admin.created_at),
            updated_at: rfc3339(&admin.updated_at),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminProfileResponse {
    pub profile: AdminView,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AdminProfileUpdate {
    pub fullname: Option<String>,
    pub current_password: Option<String>,
    pub new_password: Option<String>,
    #[serde(skip)]
    pub profile_image: Option<File>,
}

impl AdminProfileUpdate {
    pub fn set_text_field(&mut self, name: &str, value: String) {
        match name {
            "fullname" => self.fullname = Some(value),
            "currentPassword" => self.current_password = Some(value),
            "newPassword" => self.new_password = Some(value),
            _ => {}
        }
    }
}
