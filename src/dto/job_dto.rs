use crate::dto::application_dto::ApplicationView;
use crate::dto::{hex_id, rfc3339, Pagination};
use crate::model::job::{Job, JobStatus};
use crate::repository::job_repo::JobFilter;
use serde::{Deserialize, Deserializer, Serialize};

/// Public job board filters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobQuery {
    pub search: Option<String>,
    pub location: Option<String>,
    pub department: Option<String>,
    #[serde(rename = "type")]
    pub job_type: Option<String>,
}

impl From<JobQuery> for JobFilter {
    fn from(query: JobQuery) -> Self {
        JobFilter {
            search: JobFilter::criterion(query.search),
            location: JobFilter::criterion(query.location),
            department: JobFilter::criterion(query.department),
            job_type: JobFilter::criterion(query.job_type),
            ..Default::default()
        }
    }
}

fn status_label(job: &Job) -> String {
    job.status()
        .map(|s| s.as_str().to_string())
        .or_else(|| job.status.clone())
        .unwrap_or_default()
}

/// One card on the public job board.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSummary {
    pub id: String,
    pub title: String,
    pub description: String,
    pub created_by: String,
    pub created_at: Option<String>,
    pub company: String,
    pub location: String,
    pub department: String,
    #[serde(rename = "type")]
    pub job_type: String,
    pub posted: String,
    pub status: String,
}

impl From<&Job> for JobSummary {
    fn from(job: &Job) -> Self {
        JobSummary {
            id: hex_id(&job.id),
            title: job.title.clone(),
            description: job.description.clone(),
            created_by: hex_id(&job.created_by),
            created_at: rfc3339(&job.created_at),
            company: job.company.clone().unwrap_or_default(),
            location: job.location.clone().unwrap_or_default(),
            department: job.department.clone().unwrap_or_default(),
            job_type: job.job_type.clone().unwrap_or_default(),
            posted: job.posted.clone().unwrap_or_default(),
            status: status_label(job),
        }
    }
}

fn split_lines(value: &Option<String>) -> Vec<String> {
    value
        .as_deref()
        .map(|text| {
            text.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Job page: the summary plus the line lists.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDetail {
    #[serde(flatten)]
    pub summary: JobSummary,
    pub salary: String,
    pub responsibilities: Vec<String>,
    pub qualifications: Vec<String>,
    pub requirements: Vec<String>,
}

impl From<&Job> for JobDetail {
    fn from(job: &Job) -> Self {
        JobDetail {
            summary: JobSummary::from(job),
            salary: job.salary.clone().unwrap_or_default(),
            responsibilities: split_lines(&job.responsibilities),
            qualifications: split_lines(&job.qualification),
            requirements: split_lines(&job.requirements),
        }
    }
}

/// The stored job as the admin dashboard sees it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobView {
    pub id: String,
    pub title: String,
    pub description: String,
    pub company: Option<String>,
    pub location: Option<String>,
    pub department: Option<String>,
    #[serde(rename = "type")]
    pub job_type: Option<String>,
    pub qualification: Option<String>,
    pub salary: Option<String>,
    pub posted: Option<String>,
    pub requirements: Option<String>,
    pub responsibilities: Option<String>,
    pub status: String,
    pub created_by: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl From<&Job> for JobView {
    fn from(job: &Job) -> Self {
        JobView {
            id: hex_id(&job.id),
            title: job.title.clone(),
            description: job.description.clone(),
            company: job.company.clone(),
            location: job.location.clone(),
            department: job.department.clone(),
            job_type: job.job_type.clone(),
            qualification: job.qualification.clone(),
            salary: job.salary.clone(),
            posted: job.posted.clone(),
            requirements: job.requirements.clone(),
            responsibilities: job.responsibilities.clone(),
            status: status_label(job),
            created_by: job.created_by.map(|id| id.to_hex()),
            created_at: rfc3339(&job.created_at),
            updated_at: rfc3339(&job.updated_at),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminJobItem {
    #[serde(flatten)]
    pub job: JobView,
    pub application_count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminJobList {
    pub jobs: Vec<AdminJobItem>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminJobDetail {
    pub job: JobView,
    pub application_count: u64,
    pub recent_applications: Vec<ApplicationView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobResponse {
    pub message: String,
    pub job: JobView,
}

/// Posting form. List fields may be sent as newline separated text or as arrays.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateJobRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub department: Option<String>,
    #[serde(rename = "type")]
    pub job_type: Option<String>,
    #[serde(deserialize_with = "text_or_lines", alias = "qualifications")]
    pub qualification: Option<String>,
    pub salary: Option<String>,
    pub posted: Option<String>,
    #[serde(deserialize_with = "text_or_lines")]
    pub requirements: Option<String>,
    #[serde(deserialize_with = "text_or_lines")]
    pub responsibilities: Option<String>,
    pub status: Option<String>,
}

fn text_or_lines<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum TextOrLines {
        Text(String),
        Lines(Vec<String>),
    }
    Ok(Option::<TextOrLines>::deserialize(deserializer)?.map(|value| match value {
        TextOrLines::Text(text) => text,
        TextOrLines::Lines(lines) => lines.join("\n"),
    }))
}

fn present(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl CreateJobRequest {
    /// Validated job, not yet stored.
    pub fn into_job(self) -> Result<Job, String> {
        let (title, description) = match (present(self.title), present(self.description)) {
            (Some(title), Some(description)) => (title, description),
            _ => return Err("Title and description are required".to_string()),
        };
        let status = match present(self.status) {
            Some(raw) => raw.parse::<JobStatus>()?,
            None => JobStatus::Active,
        };
        Ok(Job {
            title,
            description,
            company: present(self.company),
            location: present(self.location),
            department: present(self.department),
            job_type: present(self.job_type),
            qualification: present(self.qualification),
            salary: present(self.salary),
            posted: present(self.posted),
            requirements: present(self.requirements),
            responsibilities: present(self.responsibilities),
            status: Some(status.as_str().to_string()),
            ..Default::default()
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct JobStatusRequest {
    pub status: Option<String>,
}
