use crate::dto::contact_dto::ContactRequest;
use crate::dto::validation_message;
use crate::model::contact::Contact;
use crate::repository::contact_repo::ContactRepository;
use crate::util::error::ServiceError;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, instrument};
use validator::Validate;

#[async_trait]
pub trait ContactService: Send + Sync {
    async fn submit(&self, request: ContactRequest) -> Result<(), ServiceError>;
}

pub struct ContactServiceImpl {
    pub contacts: Arc<dyn ContactRepository>,
}

impl ContactServiceImpl {
    pub fn new(contacts: Arc<dyn ContactRepository>) -> Self {
        ContactServiceImpl { contacts }
    }
}

#[async_trait]
impl ContactService for ContactServiceImpl {
    #[instrument(skip(self, request), fields(email = %request.email))]
    async fn submit(&self, request: ContactRequest) -> Result<(), ServiceError> {
        request
            .validate()
            .map_err(|errors| ServiceError::InvalidInput(validation_message(&errors)))?;
        let contact = self.contacts.insert(Contact::from(request)).await?;
        info!("Contact message {:?} received", contact.id);
        Ok(())
    }
}
