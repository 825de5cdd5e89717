use crate::dto::application_dto::{ApplicationView, ApplyForm};
use crate::dto::job_dto::{
    AdminJobDetail, AdminJobItem, AdminJobList, CreateJobRequest, JobDetail, JobQuery, JobSummary, JobView,
};
use crate::dto::{ListQuery, Pagination};
use crate::model::admin::Admin;
use crate::model::job::JobStatus;
use crate::model::user::User;
use crate::repository::application_repo::{ApplicationFilter, ApplicationRepository};
use crate::repository::job_repo::{JobFilter, JobRepository};
use crate::repository::repository_error::RepositoryError;
use crate::repository::user_repo::UserRepository;
use crate::repository::Page;
use crate::service::{application_views, parse_object_id};
use crate::util::error::ServiceError;
use crate::util::storage::FileStorage;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

const ALREADY_APPLIED: &str = "You have already applied for this job";
const JOB_NOT_FOUND: &str = "Job not found";

#[async_trait]
pub trait JobService: Send + Sync {
    async fn list_jobs(&self, query: JobQuery) -> Result<Vec<JobSummary>, ServiceError>;
    async fn get_job(&self, id: &str) -> Result<JobDetail, ServiceError>;
    async fn create_job(&self, request: CreateJobRequest, admin: &Admin) -> Result<JobView, ServiceError>;
    async fn apply(&self, job_id: &str, user: &User, form: ApplyForm) -> Result<ApplicationView, ServiceError>;
    async fn my_applications(&self, user: &User) -> Result<Vec<ApplicationView>, ServiceError>;

    async fn admin_list_jobs(&self, query: ListQuery) -> Result<AdminJobList, ServiceError>;
    async fn admin_get_job(&self, id: &str) -> Result<AdminJobDetail, ServiceError>;
    async fn update_job_status(&self, id: &str, status: Option<&str>) -> Result<JobView, ServiceError>;
    async fn delete_job(&self, id: &str) -> Result<(), ServiceError>;
}

pub struct JobServiceImpl {
    pub jobs: Arc<dyn JobRepository>,
    pub applications: Arc<dyn ApplicationRepository>,
    pub users: Arc<dyn UserRepository>,
    pub storage: Arc<FileStorage>,
}

impl JobServiceImpl {
    pub fn new(
        jobs: Arc<dyn JobRepository>,
        applications: Arc<dyn ApplicationRepository>,
        users: Arc<dyn UserRepository>,
        storage: Arc<FileStorage>,
    ) -> Self {
        JobServiceImpl { jobs, applications, users, storage }
    }
}

fn parse_job_status(raw: Option<&str>) -> Result<JobStatus, ServiceError> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ServiceError::InvalidInput("Status is required".to_string()))?
        .parse::<JobStatus>()
        .map_err(|_| ServiceError::InvalidInput("Status must be one of: active, inactive, closed".to_string()))
}

#[async_trait]
impl JobService for JobServiceImpl {
    #[instrument(skip(self))]
    async fn list_jobs(&self, query: JobQuery) -> Result<Vec<JobSummary>, ServiceError> {
        let jobs = self.jobs.list(&JobFilter::from(query), None).await?;
        Ok(jobs.iter().map(JobSummary::from).collect())
    }

    async fn get_job(&self, id: &str) -> Result<JobDetail, ServiceError> {
        let id = parse_object_id(id, "job")?;
        let job = self
            .jobs
            .find_by_id(&id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(JOB_NOT_FOUND.to_string()))?;
        Ok(JobDetail::from(&job))
    }

    #[instrument(skip(self, request, admin), fields(admin = ?admin.id))]
    async fn create_job(&self, request: CreateJobRequest, admin: &Admin) -> Result<JobView, ServiceError> {
        let mut job = request.into_job().map_err(ServiceError::InvalidInput)?;
        job.created_by = admin.id;
        let job = self.jobs.insert(job).await?;
        info!("Job created: {:?}", job.id);
        Ok(JobView::from(&job))
    }

    #[instrument(skip(self, user, form), fields(user = ?user.id))]
    async fn apply(&self, job_id: &str, user: &User, form: ApplyForm) -> Result<ApplicationView, ServiceError> {
        form.check_required().map_err(ServiceError::InvalidInput)?;
        let job_id = parse_object_id(job_id, "job")?;
        let user_id = user
            .id
            .ok_or_else(|| ServiceError::Unauthorized("Authentication required".to_string()))?;

        let job = self
            .jobs
            .find_by_id(&job_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(JOB_NOT_FOUND.to_string()))?;
        if !job.accepts_applications() {
            warn!("Application to non-active job {}", job_id);
            return Err(ServiceError::InvalidInput("Cannot apply to an inactive job".to_string()));
        }
        if self.applications.exists_for(&user_id, &job_id).await? {
            return Err(ServiceError::InvalidInput(ALREADY_APPLIED.to_string()));
        }

        let mut form = form;
        let resume_link = match form.resume.take() {
            Some(resume) if resume.size() > 0 => Some(self.storage.save_resume(&resume.filename, &resume.content).await?),
            _ => None,
        };
        let application = form.into_application(job_id, user_id, resume_link);
        let application = match self.applications.insert(application).await {
            Ok(application) => application,
            Err(RepositoryError::AlreadyExists(_)) => return Err(ServiceError::InvalidInput(ALREADY_APPLIED.to_string())),
            Err(e) => {
                error!("Failed to store application: {}", e);
                return Err(e.into());
            }
        };
        info!("Application {:?} submitted for job {}", application.id, job_id);
        Ok(ApplicationView::from(&application).with_job(Some(JobSummary::from(&job))))
    }

    async fn my_applications(&self, user: &User) -> Result<Vec<ApplicationView>, ServiceError> {
        let user_id = user
            .id
            .ok_or_else(|| ServiceError::Unauthorized("Authentication required".to_string()))?;
        let applications = self.applications.list(&ApplicationFilter::for_user(user_id), None).await?;
        let views = application_views(&applications, self.jobs.as_ref(), None).await?;
        Ok(views.into_iter().map(ApplicationView::with_normalized_interview_date).collect())
    }

    #[instrument(skip(self))]
    async fn admin_list_jobs(&self, query: ListQuery) -> Result<AdminJobList, ServiceError> {
        let filter = JobFilter {
            title: query.search().map(str::to_string),
            status: query.status().map(|s| parse_job_status(Some(s))).transpose()?,
            ..Default::default()
        };
        let (page, limit) = (query.page(), query.limit());
        let jobs = self.jobs.list(&filter, Some(Page::new(page, limit))).await?;
        let total = self.jobs.count(&filter).await?;

        let mut items = Vec::with_capacity(jobs.len());
        for job in &jobs {
            let application_count = match job.id {
                Some(id) => self.applications.count(&ApplicationFilter::for_job(id)).await?,
                None => 0,
            };
            items.push(AdminJobItem { job: JobView::from(job), application_count });
        }
        Ok(AdminJobList {
            jobs: items,
            pagination: Pagination::new(page, limit, total).with_total_jobs(total),
        })
    }

    async fn admin_get_job(&self, id: &str) -> Result<AdminJobDetail, ServiceError> {
        let id = parse_object_id(id, "job")?;
        let job = self
            .jobs
            .find_by_id(&id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(JOB_NOT_FOUND.to_string()))?;
        let filter = ApplicationFilter::for_job(id);
        let application_count = self.applications.count(&filter).await?;
        let recent = self.applications.list(&filter, Some(Page::new(1, 10))).await?;
        let recent_applications = application_views(&recent, self.jobs.as_ref(), Some(self.users.as_ref())).await?;
        Ok(AdminJobDetail {
            job: JobView::from(&job),
            application_count,
            recent_applications,
        })
    }

    #[instrument(skip(self))]
    async fn update_job_status(&self, id: &str, status: Option<&str>) -> Result<JobView, ServiceError> {
        let id = parse_object_id(id, "job")?;
        let status = parse_job_status(status)?;
        let job = self
            .jobs
            .set_status(&id, status)
            .await?
            .ok_or_else(|| ServiceError::NotFound(JOB_NOT_FOUND.to_string()))?;
        info!("Job {} is now {}", id, status);
        Ok(JobView::from(&job))
    }

    #[instrument(skip(self))]
    async fn delete_job(&self, id: &str) -> Result<(), ServiceError> {
        let id = parse_object_id(id, "job")?;
        if self.jobs.find_by_id(&id).await?.is_none() {
            return Err(ServiceError::NotFound(JOB_NOT_FOUND.to_string()));
        }
        let removed = self.applications.delete_by_job(&id).await?;
        self.jobs.delete(&id).await?;
        info!("Deleted job {} and {} applications", id, removed);
        Ok(())
    }
}
