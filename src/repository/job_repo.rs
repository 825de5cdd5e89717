use crate::model::job::{Job, JobStatus};
use crate::repository::mongo::{contains_ci, JOBS};
use crate::repository::repository_error::RepositoryResult;
use crate::repository::Page;
use async_trait::async_trait;
use bson::{doc, oid::ObjectId, DateTime, Document};
use futures::TryStreamExt;
use mongodb::options::{FindOneAndUpdateOptions, FindOptions, ReturnDocument};
use mongodb::Database;
use tracing::{error, info};

/// Listing criteria for jobs. Text fields are case-insensitive substring matches.
#[derive(Debug, Clone, Default)]
pub struct JobFilter {
    /// Matches title, company or description
    pub search: Option<String>,
    pub title: Option<String>,
    pub location: Option<String>,
    pub department: Option<String>,
    pub job_type: Option<String>,
    pub status: Option<JobStatus>,
}

impl JobFilter {
    /// Drops blank values and the `all` placeholder sent by the candidate site.
    pub fn criterion(value: Option<String>) -> Option<String> {
        value
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("all"))
    }

    pub fn to_document(&self) -> Document {
        let mut filter = Document::new();
        if let Some(search) = &self.search {
            filter.insert(
                "$or",
                vec![
                    doc! { "title": contains_ci(search) },
                    doc! { "company": contains_ci(search) },
                    doc! { "description": contains_ci(search) },
                ],
            );
        }
        for (field, value) in [
            ("title", &self.title),
            ("location", &self.location),
            ("department", &self.department),
            ("type", &self.job_type),
        ] {
            if let Some(value) = value {
                filter.insert(field, contains_ci(value));
            }
        }
        match self.status {
            // Jobs stored without a status are active.
            Some(JobStatus::Active) => {
                filter.insert("status", doc! { "$in": [JobStatus::Active.as_str(), null, ""] });
            }
            Some(status) => {
                filter.insert("status", status.as_str());
            }
            None => {}
        }
        filter
    }
}

#[async_trait]
pub trait JobRepository: Send + Sync {
    async fn insert(&self, job: Job) -> RepositoryResult<Job>;
    async fn find_by_id(&self, id: &ObjectId) -> RepositoryResult<Option<Job>>;
    async fn find_by_ids(&self, ids: &[ObjectId]) -> RepositoryResult<Vec<Job>>;
    /// Newest first.
    async fn list(&self, filter: &JobFilter, page: Option<Page>) -> RepositoryResult<Vec<Job>>;
    async fn count(&self, filter: &JobFilter) -> RepositoryResult<u64>;
    async fn set_status(&self, id: &ObjectId, status: JobStatus) -> RepositoryResult<Option<Job>>;
    /// Returns false when nothing was deleted.
    async fn delete(&self, id: &ObjectId) -> RepositoryResult<bool>;
}

pub struct JobRepositoryImpl {
    collection: mongodb::Collection<Job>,
}

impl JobRepositoryImpl {
    pub fn new(db: &Database) -> Self {
        JobRepositoryImpl { collection: db.collection::<Job>(JOBS) }
    }
}

#[async_trait]
impl JobRepository for JobRepositoryImpl {
    #[tracing::instrument(skip(self, job), fields(title = %job.title))]
    async fn insert(&self, mut job: Job) -> RepositoryResult<Job> {
        job.id = Some(ObjectId::new());
        let now = DateTime::now();
        job.created_at = Some(now);
        job.updated_at = Some(now);
        match self.collection.insert_one(&job, None).await {
            Ok(_) => {
                info!("Job created successfully");
                Ok(job)
            }
            Err(e) => {
                error!("Failed to create job: {}", e);
                Err(e.into())
            }
        }
    }

    async fn find_by_id(&self, id: &ObjectId) -> RepositoryResult<Option<Job>> {
        Ok(self.collection.find_one(doc! { "_id": id }, None).await?)
    }

    async fn find_by_ids(&self, ids: &[ObjectId]) -> RepositoryResult<Vec<Job>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let cursor = self.collection.find(doc! { "_id": { "$in": ids.to_vec() } }, None).await?;
        Ok(cursor.try_collect().await?)
    }

    #[tracing::instrument(skip(self))]
    async fn list(&self, filter: &JobFilter, page: Option<Page>) -> RepositoryResult<Vec<Job>> {
        let options = FindOptions::builder()
            .sort(doc! { "createdAt": -1 })
            .skip(page.map(|p| p.skip))
            .limit(page.map(|p| p.limit))
            .build();
        let cursor = self.collection.find(filter.to_document(), options).await?;
        let jobs: Vec<Job> = cursor.try_collect().await?;
        info!("Fetched {} jobs", jobs.len());
        Ok(jobs)
    }

    async fn count(&self, filter: &JobFilter) -> RepositoryResult<u64> {
        Ok(self.collection.count_documents(filter.to_document(), None).await?)
    }

    #[tracing::instrument(skip(self), fields(id = %id, status = %status))]
    async fn set_status(&self, id: &ObjectId, status: JobStatus) -> RepositoryResult<Option<Job>> {
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();
        let update = doc! { "$set": { "status": status.as_str(), "updatedAt": DateTime::now() } };
        Ok(self.collection.find_one_and_update(doc! { "_id": id }, update, options).await?)
    }

    #[tracing::instrument(skip(self), fields(id = %id))]
    async fn delete(&self, id: &ObjectId) -> RepositoryResult<bool> {
        let result = self.collection.delete_one(doc! { "_id": id }, None).await?;
        Ok(result.deleted_count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::Bson;

    #[test]
    fn test_all_placeholder_disables_criterion() {
        assert_eq!(JobFilter::criterion(Some("all".to_string())), None);
        assert_eq!(JobFilter::criterion(Some("ALL".to_string())), None);
        assert_eq!(JobFilter::criterion(Some("  ".to_string())), None);
        assert_eq!(JobFilter::criterion(Some(" Remote ".to_string())), Some("Remote".to_string()));
    }

    #[test]
    fn test_search_spans_title_company_description() {
        let filter = JobFilter { search: Some("rust".to_string()), ..Default::default() };
        let document = filter.to_document();
        assert_eq!(document.get_array("$or").unwrap().len(), 3);
    }

    #[test]
    fn test_field_filters_and_status() {
        let filter = JobFilter {
            location: Some("Cairo".to_string()),
            job_type: Some("Full-time".to_string()),
            status: Some(JobStatus::Active),
            ..Default::default()
        };
        let document = filter.to_document();
        assert!(document.get_document("location").is_ok());
        assert!(document.get_document("type").is_ok());
        let active = document.get_document("status").unwrap().get_array("$in").unwrap();
        assert!(active.contains(&Bson::String("active".to_string())));
        assert!(active.contains(&Bson::Null));
        assert!(!document.contains_key("department"));
    }

    #[test]
    fn test_other_statuses_match_exactly() {
        let filter = JobFilter { status: Some(JobStatus::Closed), ..Default::default() };
        assert_eq!(filter.to_document().get_str("status").unwrap(), "closed");
    }
}
