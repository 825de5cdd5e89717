use crate::model::admin::Admin;
use crate::repository::mongo::{replace_fields, ADMINS};
use crate::repository::repository_error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use bson::{doc, oid::ObjectId, DateTime};
use futures::TryStreamExt;
use mongodb::options::FindOptions;
use mongodb::Database;
use tracing::{error, info};

#[async_trait]
pub trait AdminRepository: Send + Sync {
    async fn insert(&self, admin: Admin) -> RepositoryResult<Admin>;
    async fn update(&self, admin: Admin) -> RepositoryResult<Admin>;
    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<Admin>>;
    async fn find_by_id(&self, id: &ObjectId) -> RepositoryResult<Option<Admin>>;
    async fn list(&self) -> RepositoryResult<Vec<Admin>>;
}

pub struct AdminRepositoryImpl {
    collection: mongodb::Collection<Admin>,
}

impl AdminRepositoryImpl {
    pub fn new(db: &Database) -> Self {
        AdminRepositoryImpl { collection: db.collection::<Admin>(ADMINS) }
    }
}

#[async_trait]
impl AdminRepository for AdminRepositoryImpl {
    #[tracing::instrument(skip(self, admin), fields(email = %admin.email))]
    async fn insert(&self, mut admin: Admin) -> RepositoryResult<Admin> {
        admin.id = Some(ObjectId::new());
        let now = DateTime::now();
        admin.created_at = Some(now);
        admin.updated_at = Some(now);
        match self.collection.insert_one(&admin, None).await {
            Ok(_) => {
                info!("Admin inserted");
                Ok(admin)
            }
            Err(e) => {
                error!("Failed to insert admin: {}", e);
                Err(e.into())
            }
        }
    }

    #[tracing::instrument(skip(self, admin), fields(id = ?admin.id))]
    async fn update(&self, mut admin: Admin) -> RepositoryResult<Admin> {
        let id = admin.id.ok_or_else(|| RepositoryError::validation("Cannot update an admin without an id"))?;
        admin.updated_at = Some(DateTime::now());
        let update = replace_fields(&admin, &["profileImage"])?;
        let result = self.collection.update_one(doc! { "_id": id }, update, None).await?;
        if result.matched_count == 0 {
            return Err(RepositoryError::not_found(format!("No admin found to update for ID: {}", id)));
        }
        Ok(admin)
    }

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<Admin>> {
        Ok(self.collection.find_one(doc! { "email": email.to_lowercase() }, None).await?)
    }

    async fn find_by_id(&self, id: &ObjectId) -> RepositoryResult<Option<Admin>> {
        Ok(self.collection.find_one(doc! { "_id": id }, None).await?)
    }

    async fn list(&self) -> RepositoryResult<Vec<Admin>> {
        let options = FindOptions::builder().sort(doc! { "createdAt": 1 }).build();
        let cursor = self.collection.find(None, options).await?;
        Ok(cursor.try_collect().await?)
    }
}
