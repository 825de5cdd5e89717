use crate::model::contact::Contact;
use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct ContactRequest {
    #[validate(length(min = 2, max = 100, message = "Name must be between 2 and 100 characters"))]
    pub name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 5, max = 200, message = "Subject must be between 5 and 200 characters"))]
    pub subject: String,
    #[validate(length(min = 10, max = 1000, message = "Message must be between 10 and 1000 characters"))]
    pub message: String,
}

impl From<ContactRequest> for Contact {
    fn from(request: ContactRequest) -> Self {
        Contact {
            id: None,
            name: request.name.trim().to_string(),
            email: request.email.trim().to_lowercase(),
            subject: request.subject.trim().to_string(),
            message: request.message.trim().to_string(),
            created_at: None,
        }
    }
}
