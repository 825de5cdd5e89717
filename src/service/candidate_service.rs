use crate::dto::candidate_dto::{
    CandidateApplications, CandidateDetail, CandidateList, CandidateListItem, CandidateNotes, CandidateView,
};
use crate::dto::{ListQuery, Pagination};
use crate::model::user::User;
use crate::repository::application_repo::{ApplicationFilter, ApplicationRepository};
use crate::repository::job_repo::JobRepository;
use crate::repository::user_repo::UserRepository;
use crate::repository::Page;
use crate::service::{application_views, parse_object_id};
use crate::util::error::ServiceError;
use async_trait::async_trait;
use bson::oid::ObjectId;
use std::sync::Arc;
use tracing::{info, instrument};

const CANDIDATE_NOT_FOUND: &str = "Candidate not found";

#[async_trait]
pub trait CandidateService: Send + Sync {
    async fn list(&self, query: ListQuery) -> Result<CandidateList, ServiceError>;
    async fn get(&self, id: &str) -> Result<CandidateDetail, ServiceError>;
    async fn applications(&self, id: &str) -> Result<CandidateApplications, ServiceError>;
    async fn update_status(&self, id: &str, status: Option<&str>) -> Result<CandidateView, ServiceError>;
    async fn get_notes(&self, id: &str) -> Result<CandidateNotes, ServiceError>;
    async fn save_notes(&self, id: &str, notes: &str) -> Result<(), ServiceError>;
}

pub struct CandidateServiceImpl {
    pub users: Arc<dyn UserRepository>,
    pub applications: Arc<dyn ApplicationRepository>,
    pub jobs: Arc<dyn JobRepository>,
}

impl CandidateServiceImpl {
    pub fn new(
        users: Arc<dyn UserRepository>,
        applications: Arc<dyn ApplicationRepository>,
        jobs: Arc<dyn JobRepository>,
    ) -> Self {
        CandidateServiceImpl { users, applications, jobs }
    }

    async fn find(&self, id: &ObjectId) -> Result<User, ServiceError> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(CANDIDATE_NOT_FOUND.to_string()))
    }

    async fn list_item(&self, user: &User) -> Result<CandidateListItem, ServiceError> {
        let Some(id) = user.id else {
            return Ok(CandidateListItem::new(user, 0, None));
        };
        let filter = ApplicationFilter::for_user(id);
        let count = self.applications.count(&filter).await?;
        let latest = self.applications.list(&filter, Some(Page::new(1, 1))).await?.into_iter().next();
        let item = match &latest {
            Some(application) => {
                let title = self.jobs.find_by_id(&application.job).await?.map(|job| job.title);
                CandidateListItem::new(user, count, Some((application, title)))
            }
            None => CandidateListItem::new(user, count, None),
        };
        Ok(item)
    }
}

#[async_trait]
impl CandidateService for CandidateServiceImpl {
    #[instrument(skip(self))]
    async fn list(&self, query: ListQuery) -> Result<CandidateList, ServiceError> {
        let (page, limit) = (query.page(), query.limit());
        let search = query.search();
        let users = self.users.list(search, Some(Page::new(page, limit))).await?;
        let total_candidates = self.users.count(search).await?;

        let application_filter = match search {
            Some(_) => {
                let matching = self.users.list(search, None).await?;
                ApplicationFilter {
                    users: Some(matching.iter().filter_map(|u| u.id).collect()),
                    ..Default::default()
                }
            }
            None => ApplicationFilter::default(),
        };
        let total_applications = self.applications.count(&application_filter).await?;

        let mut candidates = Vec::with_capacity(users.len());
        for user in &users {
            candidates.push(self.list_item(user).await?);
        }
        Ok(CandidateList {
            candidates,
            total_candidates,
            total_applications,
            pagination: Pagination::new(page, limit, total_candidates),
        })
    }

    async fn get(&self, id: &str) -> Result<CandidateDetail, ServiceError> {
        let id = parse_object_id(id, "candidate")?;
        let user = self.find(&id).await?;
        let filter = ApplicationFilter::for_user(id);
        let applications = self.applications.list(&filter, None).await?;
        let application_stats = self.applications.count_by_status(&filter).await?;
        // Listed newest first, so the first submission is the last one.
        let candidate = CandidateView::from(&user).with_fallback(applications.last());
        Ok(CandidateDetail {
            candidate,
            applications: application_views(&applications, self.jobs.as_ref(), None).await?,
            application_stats,
        })
    }

    async fn applications(&self, id: &str) -> Result<CandidateApplications, ServiceError> {
        let id = parse_object_id(id, "candidate")?;
        let applications = self.applications.list(&ApplicationFilter::for_user(id), None).await?;
        Ok(CandidateApplications {
            applications: application_views(&applications, self.jobs.as_ref(), None).await?,
        })
    }

    #[instrument(skip(self))]
    async fn update_status(&self, id: &str, status: Option<&str>) -> Result<CandidateView, ServiceError> {
        let id = parse_object_id(id, "candidate")?;
        let status = status
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ServiceError::InvalidInput("Candidate ID and status are required".to_string()))?;
        let user = self
            .users
            .set_status(&id, status)
            .await?
            .ok_or_else(|| ServiceError::NotFound(CANDIDATE_NOT_FOUND.to_string()))?;
        info!("Candidate {} status set to {}", id, status);
        Ok(CandidateView::from(&user))
    }

    async fn get_notes(&self, id: &str) -> Result<CandidateNotes, ServiceError> {
        let id = parse_object_id(id, "candidate")?;
        let user = self.find(&id).await?;
        Ok(CandidateNotes { notes: user.admin_notes.unwrap_or_default() })
    }

    #[instrument(skip(self, notes))]
    async fn save_notes(&self, id: &str, notes: &str) -> Result<(), ServiceError> {
        let id = parse_object_id(id, "candidate")?;
        if !self.users.set_notes(&id, notes).await? {
            return Err(ServiceError::NotFound(CANDIDATE_NOT_FOUND.to_string()));
        }
        info!("Notes saved for candidate {}", id);
        Ok(())
    }
}
