use crate::model::contact::Contact;
use crate::repository::mongo::CONTACTS;
use crate::repository::repository_error::RepositoryResult;
use async_trait::async_trait;
use bson::{oid::ObjectId, DateTime};
use mongodb::Database;
use tracing::{error, info};

#[async_trait]
pub trait ContactRepository: Send + Sync {
    async fn insert(&self, contact: Contact) -> RepositoryResult<Contact>;
}

pub struct ContactRepositoryImpl {
    collection: mongodb::Collection<Contact>,
}

impl ContactRepositoryImpl {
    pub fn new(db: &Database) -> Self {
        ContactRepositoryImpl { collection: db.collection::<Contact>(CONTACTS) }
    }
}

#[async_trait]
impl ContactRepository for ContactRepositoryImpl {
    #[tracing::instrument(skip(self, contact), fields(email = %contact.email))]
    async fn insert(&self, mut contact: Contact) -> RepositoryResult<Contact> {
        contact.id = Some(ObjectId::new());
        contact.created_at = Some(DateTime::now());
        let result = self.collection.insert_one(&contact, None).await;
        match result {
            Ok(_) => {
                info!("Contact message stored");
                Ok(contact)
            }
            Err(e) => {
                error!("Failed to store contact message: {}", e);
                Err(e.into())
            }
        }
    }
}
