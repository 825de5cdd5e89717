use crate::dto::application_dto::{
    ApplicationCount, ApplicationDetail, ApplicationList, ApplicationView, ApplicationsByJob, StatusUpdateRequest,
};
use crate::dto::job_dto::{JobSummary, JobView};
use crate::dto::{ListQuery, Pagination};
use crate::model::admin::Admin;
use crate::model::application::ApplicationStatus;
use crate::repository::application_repo::{ApplicationFilter, ApplicationRepository, SearchMatch, StatusUpdate};
use crate::repository::job_repo::{JobFilter, JobRepository};
use crate::repository::user_repo::UserRepository;
use crate::repository::Page;
use crate::service::{account_view, application_views, parse_object_id};
use crate::util::error::ServiceError;
use async_trait::async_trait;
use bson::DateTime;
use std::sync::Arc;
use tracing::{info, instrument, warn};

const APPLICATION_NOT_FOUND: &str = "Application not found";

/// Status filter or update value; anything outside the vocabulary is a 400.
pub fn parse_status(raw: &str) -> Result<ApplicationStatus, ServiceError> {
    raw.parse::<ApplicationStatus>().map_err(ServiceError::InvalidInput)
}

#[async_trait]
pub trait ApplicationService: Send + Sync {
    async fn list(&self, query: ListQuery) -> Result<ApplicationList, ServiceError>;
    async fn count(&self) -> Result<ApplicationCount, ServiceError>;
    async fn get(&self, id: &str) -> Result<ApplicationDetail, ServiceError>;
    async fn update_status(&self, id: &str, request: StatusUpdateRequest, admin: &Admin) -> Result<ApplicationView, ServiceError>;
    async fn by_job(&self, job_id: &str) -> Result<ApplicationsByJob, ServiceError>;
}

pub struct ApplicationServiceImpl {
    pub applications: Arc<dyn ApplicationRepository>,
    pub jobs: Arc<dyn JobRepository>,
    pub users: Arc<dyn UserRepository>,
}

impl ApplicationServiceImpl {
    pub fn new(
        applications: Arc<dyn ApplicationRepository>,
        jobs: Arc<dyn JobRepository>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        ApplicationServiceImpl { applications, jobs, users }
    }

    /// Candidates whose name or email match, plus jobs whose title does.
    async fn search_match(&self, term: &str) -> Result<SearchMatch, ServiceError> {
        let users = self.users.list(Some(term), None).await?;
        let jobs = self
            .jobs
            .list(&JobFilter { title: Some(term.to_string()), ..Default::default() }, None)
            .await?;
        Ok(SearchMatch {
            users: users.iter().filter_map(|u| u.id).collect(),
            jobs: jobs.iter().filter_map(|j| j.id).collect(),
        })
    }
}

#[async_trait]
impl ApplicationService for ApplicationServiceImpl {
    #[instrument(skip(self))]
    async fn list(&self, query: ListQuery) -> Result<ApplicationList, ServiceError> {
        let mut filter = ApplicationFilter {
            status: query.status().map(parse_status).transpose()?,
            ..Default::default()
        };
        if let Some(term) = query.search() {
            filter.matching = Some(self.search_match(term).await?);
        }
        let (page, limit) = (query.page(), query.limit());
        let applications = self.applications.list(&filter, Some(Page::new(page, limit))).await?;
        let total = self.applications.count(&filter).await?;
        Ok(ApplicationList {
            applications: application_views(&applications, self.jobs.as_ref(), Some(self.users.as_ref())).await?,
            pagination: Pagination::new(page, limit, total).with_total_applications(total),
        })
    }

    async fn count(&self) -> Result<ApplicationCount, ServiceError> {
        let total = self.applications.count(&ApplicationFilter::default()).await?;
        Ok(ApplicationCount { total_applications: total })
    }

    async fn get(&self, id: &str) -> Result<ApplicationDetail, ServiceError> {
        let id = parse_object_id(id, "application")?;
        let application = self
            .applications
            .find_by_id(&id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(APPLICATION_NOT_FOUND.to_string()))?;
        let job = self.jobs.find_by_id(&application.job).await?;
        let user = self.users.find_by_id(&application.user).await?;
        Ok(ApplicationDetail {
            application: ApplicationView::from(&application)
                .with_job(job.as_ref().map(JobSummary::from))
                .with_user(user.as_ref().map(account_view)),
        })
    }

    #[instrument(skip(self, request, admin), fields(admin = ?admin.id))]
    async fn update_status(&self, id: &str, request: StatusUpdateRequest, admin: &Admin) -> Result<ApplicationView, ServiceError> {
        let id = parse_object_id(id, "application")?;
        let raw = request
            .status
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ServiceError::InvalidInput("Status is required".to_string()))?;
        let status = parse_status(raw).inspect_err(|_| warn!("Rejected status value {:?}", raw))?;
        let reviewed_by = admin
            .id
            .ok_or_else(|| ServiceError::Unauthorized("Authentication required".to_string()))?;

        let update = StatusUpdate {
            status,
            reviewed_by,
            reviewed_at: DateTime::now(),
            admin_notes: request.notes,
            interview_date: request.interview_date,
        };
        let application = self
            .applications
            .update_status(&id, &update)
            .await?
            .ok_or_else(|| ServiceError::NotFound(APPLICATION_NOT_FOUND.to_string()))?;
        info!("Application {} set to {}", id, status);
        let job = self.jobs.find_by_id(&application.job).await?;
        Ok(ApplicationView::from(&application).with_job(job.as_ref().map(JobSummary::from)))
    }

    async fn by_job(&self, job_id: &str) -> Result<ApplicationsByJob, ServiceError> {
        let job_id = parse_object_id(job_id, "job")?;
        let job = self
            .jobs
            .find_by_id(&job_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Job not found".to_string()))?;
        let filter = ApplicationFilter::for_job(job_id);
        let applications = self.applications.list(&filter, None).await?;
        let status_counts = self.applications.count_by_status(&filter).await?;
        Ok(ApplicationsByJob {
            job: JobView::from(&job),
            applications: application_views(&applications, self.jobs.as_ref(), Some(self.users.as_ref())).await?,
            status_counts,
        })
    }
}
