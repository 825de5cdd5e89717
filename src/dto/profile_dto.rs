use crate::dto::{hex_id, File};
use crate::model::user::{Education, Experience, User};
use serde::{Deserialize, Deserializer, Serialize};

/// Candidate profile edit. Every `None` leaves the stored value alone.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub fullname: Option<String>,
    pub title: Option<String>,
    pub about: Option<String>,
    #[serde(deserialize_with = "string_or_number")]
    pub age: Option<String>,
    pub national_id: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub date_of_birth: Option<String>,
    pub experience: Option<Vec<Experience>>,
    pub education: Option<Vec<Education>>,
    /// A URL, a `data:image/...;base64,` payload, or empty to clear
    pub profile_image: Option<String>,
    pub new_password: Option<String>,
    /// File part of a multipart request
    #[serde(skip)]
    pub profile_image_file: Option<File>,
}

impl ProfileUpdate {
    /// Apply one multipart text field. Unknown names are ignored.
    pub fn set_text_field(&mut self, name: &str, value: String) {
        match name {
            "fullname" => self.fullname = Some(value),
            "title" => self.title = Some(value),
            "about" => self.about = Some(value),
            "age" => self.age = Some(value),
            "nationalId" => self.national_id = Some(value),
            "phone" => self.phone = Some(value),
            "address" => self.address = Some(value),
            "city" => self.city = Some(value),
            "country" => self.country = Some(value),
            "dateOfBirth" => self.date_of_birth = Some(value),
            "profileImage" => self.profile_image = Some(value),
            "newPassword" => self.new_password = Some(value),
            // Sent as JSON strings; anything unparseable becomes an empty list.
            "experience" => self.experience = Some(serde_json::from_str(&value).unwrap_or_default()),
            "education" => self.education = Some(serde_json::from_str(&value).unwrap_or_default()),
            _ => {}
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<serde_json::Value>::deserialize(deserializer)? {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Every profile field, missing text rendered as `""` and missing lists as `[]`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    pub id: String,
    pub fullname: String,
    pub email: String,
    pub title: String,
    pub about: String,
    pub age: String,
    pub national_id: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub country: String,
    pub date_of_birth: String,
    pub experience: Vec<Experience>,
    pub education: Vec<Education>,
    pub profile_image: String,
}

impl From<&User> for ProfileView {
    fn from(user: &User) -> Self {
        let text = |value: &Option<String>| value.clone().unwrap_or_default();
        ProfileView {
            id: hex_id(&user.id),
            fullname: user.fullname.clone(),
            email: user.email.clone(),
            title: text(&user.title),
            about: text(&user.about),
            age: text(&user.age),
            national_id: text(&user.national_id),
            phone: text(&user.phone),
            address: text(&user.address),
            city: text(&user.city),
            country: text(&user.country),
            date_of_birth: text(&user.date_of_birth),
            experience: user.experience.clone(),
            education: user.education.clone(),
            profile_image: text(&user.profile_image),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileResponse {
    pub message: String,
    pub profile: ProfileView,
}
