use crate::model::application::{Application, ApplicationStatus};
use crate::repository::mongo::{bson_count, APPLICATIONS};
use crate::repository::repository_error::RepositoryResult;
use crate::repository::Page;
use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Bson, DateTime, Document};
use futures::TryStreamExt;
use mongodb::options::{FindOneAndUpdateOptions, FindOptions, ReturnDocument};
use mongodb::Database;
use serde::Serialize;
use tracing::{error, info};

/// Ids resolved from a free-text search; an application matches when either side does.
#[derive(Debug, Clone, Default)]
pub struct SearchMatch {
    pub users: Vec<ObjectId>,
    pub jobs: Vec<ObjectId>,
}

#[derive(Debug, Clone, Default)]
pub struct ApplicationFilter {
    pub user: Option<ObjectId>,
    pub users: Option<Vec<ObjectId>>,
    pub job: Option<ObjectId>,
    pub status: Option<ApplicationStatus>,
    pub with_resume: bool,
    pub matching: Option<SearchMatch>,
}

impl ApplicationFilter {
    pub fn for_user(user: ObjectId) -> Self {
        ApplicationFilter { user: Some(user), ..Default::default() }
    }

    pub fn for_job(job: ObjectId) -> Self {
        ApplicationFilter { job: Some(job), ..Default::default() }
    }

    pub fn to_document(&self) -> Document {
        let mut filter = Document::new();
        if let Some(user) = self.user {
            filter.insert("user", user);
        } else if let Some(users) = &self.users {
            filter.insert("user", doc! { "$in": users.clone() });
        }
        if let Some(job) = self.job {
            filter.insert("job", job);
        }
        if let Some(status) = self.status {
            filter.insert("status", status.as_str());
        }
        if self.with_resume {
            filter.insert("resumeLink", doc! { "$exists": true, "$nin": [Bson::Null, ""] });
        }
        if let Some(matching) = &self.matching {
            filter.insert(
                "$or",
                vec![
                    doc! { "user": { "$in": matching.users.clone() } },
                    doc! { "job": { "$in": matching.jobs.clone() } },
                ],
            );
        }
        filter
    }
}

/// Optional field edit: `None` leaves the stored value, `Some(None)` clears it.
pub type Patch<T> = Option<Option<T>>;

/// One admin review of an application, written in a single `$set`.
#[derive(Debug, Clone)]
pub struct StatusUpdate {
    pub status: ApplicationStatus,
    pub reviewed_by: ObjectId,
    pub reviewed_at: DateTime,
    pub admin_notes: Patch<String>,
    pub interview_date: Patch<String>,
}

impl StatusUpdate {
    pub fn to_update(&self) -> Document {
        let mut set = doc! {
            "status": self.status.as_str(),
            "reviewedAt": self.reviewed_at,
            "reviewedBy": self.reviewed_by,
        };
        let mut unset = Document::new();
        for (field, patch) in [("adminNotes", &self.admin_notes), ("interviewDate", &self.interview_date)] {
            match patch {
                Some(Some(value)) => {
                    set.insert(field, value.clone());
                }
                Some(None) => {
                    unset.insert(field, "");
                }
                None => {}
            }
        }
        let mut update = doc! { "$set": set };
        if !unset.is_empty() {
            update.insert("$unset", unset);
        }
        update
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusCount {
    pub status: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthCount {
    pub year: i32,
    pub month: u32,
    pub count: u64,
}

#[async_trait]
pub trait ApplicationRepository: Send + Sync {
    async fn insert(&self, application: Application) -> RepositoryResult<Application>;
    async fn find_by_id(&self, id: &ObjectId) -> RepositoryResult<Option<Application>>;
    async fn exists_for(&self, user: &ObjectId, job: &ObjectId) -> RepositoryResult<bool>;
    /// Newest first.
    async fn list(&self, filter: &ApplicationFilter, page: Option<Page>) -> RepositoryResult<Vec<Application>>;
    async fn count(&self, filter: &ApplicationFilter) -> RepositoryResult<u64>;
    /// Returns the document after the write, or None when the id is unknown.
    async fn update_status(&self, id: &ObjectId, update: &StatusUpdate) -> RepositoryResult<Option<Application>>;
    async fn delete_by_job(&self, job: &ObjectId) -> RepositoryResult<u64>;
    async fn count_by_status(&self, filter: &ApplicationFilter) -> RepositoryResult<Vec<StatusCount>>;
    /// Ascending by year then month.
    async fn count_by_month(&self) -> RepositoryResult<Vec<MonthCount>>;
    /// Number of distinct jobs that received at least one application.
    async fn count_distinct_jobs(&self) -> RepositoryResult<u64>;
}

pub struct ApplicationRepositoryImpl {
    collection: mongodb::Collection<Application>,
}

impl ApplicationRepositoryImpl {
    pub fn new(db: &Database) -> Self {
        ApplicationRepositoryImpl { collection: db.collection::<Application>(APPLICATIONS) }
    }
}

#[async_trait]
impl ApplicationRepository for ApplicationRepositoryImpl {
    #[tracing::instrument(skip(self, application), fields(job = %application.job, user = %application.user))]
    async fn insert(&self, mut application: Application) -> RepositoryResult<Application> {
        application.id = Some(ObjectId::new());
        application.created_at = Some(DateTime::now());
        match self.collection.insert_one(&application, None).await {
            Ok(_) => {
                info!("Application created successfully");
                Ok(application)
            }
            Err(e) => {
                error!("Failed to create application: {}", e);
                Err(e.into())
            }
        }
    }

    async fn find_by_id(&self, id: &ObjectId) -> RepositoryResult<Option<Application>> {
        Ok(self.collection.find_one(doc! { "_id": id }, None).await?)
    }

    async fn exists_for(&self, user: &ObjectId, job: &ObjectId) -> RepositoryResult<bool> {
        let count = self.collection.count_documents(doc! { "user": user, "job": job }, None).await?;
        Ok(count > 0)
    }

    #[tracing::instrument(skip(self))]
    async fn list(&self, filter: &ApplicationFilter, page: Option<Page>) -> RepositoryResult<Vec<Application>> {
        let options = FindOptions::builder()
            .sort(doc! { "createdAt": -1 })
            .skip(page.map(|p| p.skip))
            .limit(page.map(|p| p.limit))
            .build();
        let cursor = self.collection.find(filter.to_document(), options).await?;
        let applications: Vec<Application> = cursor.try_collect().await?;
        info!("Fetched {} applications", applications.len());
        Ok(applications)
    }

    async fn count(&self, filter: &ApplicationFilter) -> RepositoryResult<u64> {
        Ok(self.collection.count_documents(filter.to_document(), None).await?)
    }

    #[tracing::instrument(skip(self, update), fields(id = %id, status = %update.status))]
    async fn update_status(&self, id: &ObjectId, update: &StatusUpdate) -> RepositoryResult<Option<Application>> {
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();
        let result = self
            .collection
            .find_one_and_update(doc! { "_id": id }, update.to_update(), options)
            .await?;
        match &result {
            Some(_) => info!("Application status updated"),
            None => error!("No application found to update for ID: {}", id),
        }
        Ok(result)
    }

    #[tracing::instrument(skip(self), fields(job = %job))]
    async fn delete_by_job(&self, job: &ObjectId) -> RepositoryResult<u64> {
        let result = self.collection.delete_many(doc! { "job": job }, None).await?;
        info!("Deleted {} applications", result.deleted_count);
        Ok(result.deleted_count)
    }

    async fn count_by_status(&self, filter: &ApplicationFilter) -> RepositoryResult<Vec<StatusCount>> {
        let pipeline = vec![
            doc! { "$match": filter.to_document() },
            doc! { "$group": { "_id": "$status", "count": { "$sum": 1 } } },
            doc! { "$sort": { "_id": 1 } },
        ];
        let rows: Vec<Document> = self.collection.aggregate(pipeline, None).await?.try_collect().await?;
        Ok(rows
            .iter()
            .map(|row| StatusCount {
                status: row.get_str("_id").unwrap_or("pending").to_string(),
                count: bson_count(row.get("count")),
            })
            .collect())
    }

    async fn count_by_month(&self) -> RepositoryResult<Vec<MonthCount>> {
        let pipeline = vec![
            doc! { "$match": { "createdAt": { "$type": "date" } } },
            doc! { "$group": {
                "_id": { "year": { "$year": "$createdAt" }, "month": { "$month": "$createdAt" } },
                "count": { "$sum": 1 },
            } },
            doc! { "$sort": { "_id.year": 1, "_id.month": 1 } },
        ];
        let rows: Vec<Document> = self.collection.aggregate(pipeline, None).await?.try_collect().await?;
        let mut months = Vec::with_capacity(rows.len());
        for row in &rows {
            let key = row.get_document("_id")?;
            months.push(MonthCount {
                year: key.get_i32("year")?,
                month: key.get_i32("month")?.max(1) as u32,
                count: bson_count(row.get("count")),
            });
        }
        Ok(months)
    }

    async fn count_distinct_jobs(&self) -> RepositoryResult<u64> {
        let jobs = self.collection.distinct("job", None, None).await?;
        Ok(jobs.len() as u64)
    }
}
