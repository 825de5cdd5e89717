use crate::dto::dashboard_dto::{ChartsResponse, DashboardStats, StatsResponse};
use crate::dto::job_dto::JobView;
use crate::model::job::JobStatus;
use crate::repository::application_repo::{ApplicationFilter, ApplicationRepository};
use crate::repository::job_repo::{JobFilter, JobRepository};
use crate::repository::user_repo::UserRepository;
use crate::repository::Page;
use crate::service::application_views;
use crate::util::error::ServiceError;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::instrument;

const RECENT: u64 = 5;

#[async_trait]
pub trait DashboardService: Send + Sync {
    async fn stats(&self) -> Result<StatsResponse, ServiceError>;
    async fn charts(&self) -> Result<ChartsResponse, ServiceError>;
}

pub struct DashboardServiceImpl {
    pub jobs: Arc<dyn JobRepository>,
    pub applications: Arc<dyn ApplicationRepository>,
    pub users: Arc<dyn UserRepository>,
}

impl DashboardServiceImpl {
    pub fn new(
        jobs: Arc<dyn JobRepository>,
        applications: Arc<dyn ApplicationRepository>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        DashboardServiceImpl { jobs, applications, users }
    }
}

#[async_trait]
impl DashboardService for DashboardServiceImpl {
    #[instrument(skip(self))]
    async fn stats(&self) -> Result<StatsResponse, ServiceError> {
        let all_jobs = JobFilter::default();
        let all_applications = ApplicationFilter::default();
        let active = JobFilter { status: Some(JobStatus::Active), ..Default::default() };

        let stats = DashboardStats {
            total_jobs: self.jobs.count(&all_jobs).await?,
            total_applications: self.applications.count(&all_applications).await?,
            total_candidates: self.users.count(None).await?,
            active_jobs: self.jobs.count(&active).await?,
            positions_applied_for: self.applications.count_distinct_jobs().await?,
        };

        let recent = self.applications.list(&all_applications, Some(Page::new(1, RECENT))).await?;
        let recent_applications = application_views(&recent, self.jobs.as_ref(), Some(self.users.as_ref())).await?;
        let recent_jobs = self.jobs.list(&all_jobs, Some(Page::new(1, RECENT))).await?;

        Ok(StatsResponse {
            stats,
            recent_applications,
            recent_jobs: recent_jobs.iter().map(JobView::from).collect(),
        })
    }

    #[instrument(skip(self))]
    async fn charts(&self) -> Result<ChartsResponse, ServiceError> {
        Ok(ChartsResponse {
            applications_by_month: self.applications.count_by_month().await?,
            applications_by_status: self.applications.count_by_status(&ApplicationFilter::default()).await?,
        })
    }
}
