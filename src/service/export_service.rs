use crate::dto::ymd;
use crate::repository::admin_repo::AdminRepository;
use crate::repository::application_repo::{ApplicationFilter, ApplicationRepository};
use crate::repository::job_repo::{JobFilter, JobRepository};
use crate::repository::user_repo::UserRepository;
use crate::service::{jobs_by_id, users_by_id};
use crate::util::csv::{or_missing, CsvWriter};
use crate::util::error::ServiceError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument};

pub const CANDIDATE_COLUMNS: [&str; 5] = ["fullname", "email", "phone", "applicationCount", "joinedDate"];
pub const APPLICATION_COLUMNS: [&str; 9] = [
    "candidateName",
    "candidateEmail",
    "candidatePhone",
    "jobTitle",
    "company",
    "status",
    "experience",
    "skills",
    "appliedDate",
];
pub const JOB_COLUMNS: [&str; 8] = [
    "title",
    "description",
    "company",
    "location",
    "status",
    "applicationCount",
    "createdBy",
    "createdDate",
];

#[async_trait]
pub trait ExportService: Send + Sync {
    async fn candidates_csv(&self) -> Result<String, ServiceError>;
    async fn applications_csv(&self) -> Result<String, ServiceError>;
    async fn jobs_csv(&self) -> Result<String, ServiceError>;
}

pub struct ExportServiceImpl {
    pub users: Arc<dyn UserRepository>,
    pub admins: Arc<dyn AdminRepository>,
    pub jobs: Arc<dyn JobRepository>,
    pub applications: Arc<dyn ApplicationRepository>,
}

impl ExportServiceImpl {
    pub fn new(
        users: Arc<dyn UserRepository>,
        admins: Arc<dyn AdminRepository>,
        jobs: Arc<dyn JobRepository>,
        applications: Arc<dyn ApplicationRepository>,
    ) -> Self {
        ExportServiceImpl { users, admins, jobs, applications }
    }
}

#[async_trait]
impl ExportService for ExportServiceImpl {
    #[instrument(skip(self))]
    async fn candidates_csv(&self) -> Result<String, ServiceError> {
        let users = self.users.list(None, None).await?;
        let mut csv = CsvWriter::new(&CANDIDATE_COLUMNS);
        for user in &users {
            let count = match user.id {
                Some(id) => self.applications.count(&ApplicationFilter::for_user(id)).await?,
                None => 0,
            };
            csv.row([
                or_missing(Some(user.fullname.as_str())),
                or_missing(Some(user.email.as_str())),
                or_missing(user.phone.as_deref()),
                count.to_string(),
                or_missing(ymd(&user.created_at).as_deref()),
            ]);
        }
        info!("Exported {} candidates", users.len());
        Ok(csv.finish())
    }

    #[instrument(skip(self))]
    async fn applications_csv(&self) -> Result<String, ServiceError> {
        let applications = self.applications.list(&ApplicationFilter::default(), None).await?;
        let jobs = jobs_by_id(self.jobs.as_ref(), applications.iter().map(|a| a.job)).await?;
        let users = users_by_id(self.users.as_ref(), applications.iter().map(|a| a.user)).await?;

        let mut csv = CsvWriter::new(&APPLICATION_COLUMNS);
        for application in &applications {
            let job = jobs.get(&application.job);
            let user = users.get(&application.user);
            let name = match application.full_name.trim() {
                "" => user.map(|u| u.fullname.as_str()),
                name => Some(name),
            };
            let skills = application.skills.join("; ");
            csv.row([
                or_missing(name),
                or_missing(Some(application.email.as_str())),
                or_missing(Some(application.phone.as_str())),
                or_missing(job.map(|j| j.title.as_str())),
                or_missing(job.and_then(|j| j.company.as_deref())),
                application.status.as_str().to_string(),
                or_missing(Some(application.experience.as_str())),
                or_missing(Some(skills.as_str())),
                or_missing(ymd(&application.created_at).as_deref()),
            ]);
        }
        info!("Exported {} applications", applications.len());
        Ok(csv.finish())
    }

    #[instrument(skip(self))]
    async fn jobs_csv(&self) -> Result<String, ServiceError> {
        let jobs = self.jobs.list(&JobFilter::default(), None).await?;
        let admins: HashMap<_, _> = self
            .admins
            .list()
            .await?
            .into_iter()
            .filter_map(|admin| admin.id.map(|id| (id, admin.fullname)))
            .collect();

        let mut csv = CsvWriter::new(&JOB_COLUMNS);
        for job in &jobs {
            let count = match job.id {
                Some(id) => self.applications.count(&ApplicationFilter::for_job(id)).await?,
                None => 0,
            };
            let status = job.status().map(|s| s.as_str().to_string()).or_else(|| job.status.clone());
            csv.row([
                or_missing(Some(job.title.as_str())),
                or_missing(Some(job.description.as_str())),
                or_missing(job.company.as_deref()),
                or_missing(job.location.as_deref()),
                or_missing(status.as_deref()),
                count.to_string(),
                or_missing(job.created_by.and_then(|id| admins.get(&id)).map(String::as_str)),
                or_missing(ymd(&job.created_at).as_deref()),
            ]);
        }
        info!("Exported {} jobs", jobs.len());
        Ok(csv.finish())
    }
}
