use crate::model::user::User;
use crate::repository::mongo::{contains_ci, replace_fields, USERS};
use crate::repository::repository_error::{RepositoryError, RepositoryResult};
use crate::repository::Page;
use async_trait::async_trait;
use bson::{doc, oid::ObjectId, DateTime, Document};
use futures::TryStreamExt;
use mongodb::options::{FindOneAndUpdateOptions, FindOptions, ReturnDocument};
use mongodb::Database;
use tracing::{error, info};

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn insert(&self, user: User) -> RepositoryResult<User>;
    /// Overwrite every stored field of `user`, matched by its id.
    async fn update(&self, user: User) -> RepositoryResult<User>;
    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>>;
    async fn find_by_id(&self, id: &ObjectId) -> RepositoryResult<Option<User>>;
    async fn find_by_ids(&self, ids: &[ObjectId]) -> RepositoryResult<Vec<User>>;
    /// Newest first; `search` matches fullname or email.
    async fn list(&self, search: Option<&str>, page: Option<Page>) -> RepositoryResult<Vec<User>>;
    async fn count(&self, search: Option<&str>) -> RepositoryResult<u64>;
    async fn set_status(&self, id: &ObjectId, status: &str) -> RepositoryResult<Option<User>>;
    /// Returns false when no user has this id.
    async fn set_notes(&self, id: &ObjectId, notes: &str) -> RepositoryResult<bool>;
}

/// Optional fields an update may clear.
pub const OPTIONAL_FIELDS: [&str; 12] = [
    "title",
    "about",
    "age",
    "nationalId",
    "phone",
    "address",
    "city",
    "country",
    "dateOfBirth",
    "profileImage",
    "status",
    "adminNotes",
];

pub fn update_document(user: &User) -> RepositoryResult<Document> {
    replace_fields(user, &OPTIONAL_FIELDS)
}

pub fn search_filter(search: Option<&str>) -> Document {
    match search.map(str::trim).filter(|s| !s.is_empty()) {
        Some(term) => doc! {
            "$or": [
                { "fullname": contains_ci(term) },
                { "email": contains_ci(term) },
            ]
        },
        None => doc! {},
    }
}

pub struct UserRepositoryImpl {
    collection: mongodb::Collection<User>,
}

impl UserRepositoryImpl {
    pub fn new(db: &Database) -> Self {
        UserRepositoryImpl { collection: db.collection::<User>(USERS) }
    }
}

#[async_trait]
impl UserRepository for UserRepositoryImpl {
    #[tracing::instrument(skip(self, user), fields(email = %user.email))]
    async fn insert(&self, mut user: User) -> RepositoryResult<User> {
        user.id = Some(ObjectId::new());
        let now = DateTime::now();
        user.created_at = Some(now);
        user.updated_at = Some(now);
        match self.collection.insert_one(&user, None).await {
            Ok(_) => {
                info!("User inserted");
                Ok(user)
            }
            Err(e) => {
                error!("Failed to insert user: {}", e);
                Err(e.into())
            }
        }
    }

    #[tracing::instrument(skip(self, user), fields(id = ?user.id))]
    async fn update(&self, mut user: User) -> RepositoryResult<User> {
        let id = user.id.ok_or_else(|| RepositoryError::validation("Cannot update a user without an id"))?;
        user.updated_at = Some(DateTime::now());
        let result = self.collection.update_one(doc! { "_id": id }, update_document(&user)?, None).await?;
        if result.matched_count == 0 {
            error!("No user found to update for ID: {}", id);
            return Err(RepositoryError::not_found(format!("No user found to update for ID: {}", id)));
        }
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        Ok(self.collection.find_one(doc! { "email": email.to_lowercase() }, None).await?)
    }

    async fn find_by_id(&self, id: &ObjectId) -> RepositoryResult<Option<User>> {
        Ok(self.collection.find_one(doc! { "_id": id }, None).await?)
    }

    async fn find_by_ids(&self, ids: &[ObjectId]) -> RepositoryResult<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let cursor = self.collection.find(doc! { "_id": { "$in": ids.to_vec() } }, None).await?;
        Ok(cursor.try_collect().await?)
    }

    #[tracing::instrument(skip(self))]
    async fn list(&self, search: Option<&str>, page: Option<Page>) -> RepositoryResult<Vec<User>> {
        let options = FindOptions::builder()
            .sort(doc! { "createdAt": -1 })
            .skip(page.map(|p| p.skip))
            .limit(page.map(|p| p.limit))
            .build();
        let cursor = self.collection.find(search_filter(search), options).await?;
        let users: Vec<User> = cursor.try_collect().await?;
        info!("Fetched {} users", users.len());
        Ok(users)
    }

    async fn count(&self, search: Option<&str>) -> RepositoryResult<u64> {
        Ok(self.collection.count_documents(search_filter(search), None).await?)
    }

    #[tracing::instrument(skip(self))]
    async fn set_status(&self, id: &ObjectId, status: &str) -> RepositoryResult<Option<User>> {
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();
        let update = doc! { "$set": { "status": status, "updatedAt": DateTime::now() } };
        Ok(self.collection.find_one_and_update(doc! { "_id": id }, update, options).await?)
    }

    #[tracing::instrument(skip(self, notes))]
    async fn set_notes(&self, id: &ObjectId, notes: &str) -> RepositoryResult<bool> {
        let update = doc! { "$set": { "adminNotes": notes, "updatedAt": DateTime::now() } };
        let result = self.collection.update_one(doc! { "_id": id }, update, None).await?;
        Ok(result.matched_count > 0)
    }
}
