use crate::dto::auth_dto::AccountView;
use crate::dto::job_dto::{JobSummary, JobView};
use crate::dto::{double_option, hex_id, rfc3339, File, Pagination};
use crate::model::application::{Application, ApplicationStatus};
use crate::repository::application_repo::StatusCount;
use bson::oid::ObjectId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Multipart application form as received from the candidate site.
#[derive(Debug, Clone, Default)]
pub struct ApplyForm {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub experience: Option<String>,
    pub skills: Vec<String>,
    pub current_salary: Option<f64>,
    pub expected_salary: Option<f64>,
    pub notice_period: Option<String>,
    pub cover_letter: Option<String>,
    pub portfolio_link: Option<String>,
    pub resume: Option<File>,
}

fn present(value: &Option<String>) -> Option<String> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

impl ApplyForm {
    pub fn set_text_field(&mut self, name: &str, value: String) {
        match name {
            "fullName" => self.full_name = Some(value),
            "email" => self.email = Some(value),
            "phone" => self.phone = Some(value),
            "address" => self.address = Some(value),
            "experience" => self.experience = Some(value),
            "skills" | "skills[]" => self.add_skills(&value),
            "currentSalary" => self.current_salary = value.trim().parse().ok(),
            "expectedSalary" => self.expected_salary = value.trim().parse().ok(),
            "noticePeriod" => self.notice_period = Some(value),
            "coverLetter" => self.cover_letter = Some(value),
            "portfolioLink" => self.portfolio_link = Some(value),
            _ => {}
        }
    }

    /// Skills arrive as repeated fields, a JSON array, or comma separated text.
    pub fn add_skills(&mut self, raw: &str) {
        let raw = raw.trim();
        let parsed: Vec<String> = if raw.starts_with('[') {
            serde_json::from_str(raw).unwrap_or_default()
        } else {
            raw.split(',').map(str::to_string).collect()
        };
        self.skills.extend(
            parsed
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
        );
    }

    pub fn check_required(&self) -> Result<(), String> {
        if present(&self.full_name).is_none() || present(&self.email).is_none() || present(&self.phone).is_none() {
            return Err("Full name, email, and phone are required".to_string());
        }
        Ok(())
    }

    pub fn into_application(self, job: ObjectId, user: ObjectId, resume_link: Option<String>) -> Application {
        Application {
            id: None,
            job,
            user,
            full_name: present(&self.full_name).unwrap_or_default(),
            email: present(&self.email).unwrap_or_default().to_lowercase(),
            phone: present(&self.phone).unwrap_or_default(),
            address: present(&self.address),
            experience: present(&self.experience).unwrap_or_default(),
            skills: self.skills,
            current_salary: self.current_salary,
            expected_salary: self.expected_salary,
            notice_period: present(&self.notice_period),
            cover_letter: present(&self.cover_letter),
            resume_link,
            portfolio_link: present(&self.portfolio_link),
            status: ApplicationStatus::Pending,
            admin_notes: None,
            interview_date: None,
            reviewed_at: None,
            reviewed_by: None,
            created_at: None,
        }
    }
}

/// `DD-MM-YYYY` or `DD/MM/YYYY` becomes midnight UTC in ISO-8601; anything else is kept.
pub fn normalize_interview_date(raw: &str) -> String {
    let trimmed = raw.trim();
    ["%d-%m-%Y", "%d/%m/%Y"]
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string())
        .unwrap_or_else(|| raw.to_string())
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationView {
    pub id: String,
    pub job_id: String,
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job: Option<JobSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<AccountView>,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub address: Option<String>,
    pub experience: String,
    pub skills: Vec<String>,
    pub current_salary: Option<f64>,
    pub expected_salary: Option<f64>,
    pub notice_period: Option<String>,
    pub cover_letter: Option<String>,
    pub resume_link: Option<String>,
    pub portfolio_link: Option<String>,
    pub status: ApplicationStatus,
    pub status_label: &'static str,
    pub admin_notes: Option<String>,
    pub interview_date: Option<String>,
    pub reviewed_at: Option<String>,
    pub reviewed_by: Option<String>,
    pub created_at: Option<String>,
}

impl From<&Application> for ApplicationView {
    fn from(application: &Application) -> Self {
        ApplicationView {
            id: hex_id(&application.id),
            job_id: application.job.to_hex(),
            user_id: application.user.to_hex(),
            job: None,
            user: None,
            full_name: application.full_name.clone(),
            email: application.email.clone(),
            phone: application.phone.clone(),
            address: application.address.clone(),
            experience: application.experience.clone(),
            skills: application.skills.clone(),
            current_salary: application.current_salary,
            expected_salary: application.expected_salary,
            notice_period: application.notice_period.clone(),
            cover_letter: application.cover_letter.clone(),
            resume_link: application.resume_link.clone(),
            portfolio_link: application.portfolio_link.clone(),
            status: application.status,
            status_label: application.status.label(),
            admin_notes: application.admin_notes.clone(),
            interview_date: application.interview_date.clone(),
            reviewed_at: rfc3339(&application.reviewed_at),
            reviewed_by: application.reviewed_by.map(|id| id.to_hex()),
            created_at: rfc3339(&application.created_at),
        }
    }
}

impl ApplicationView {
    pub fn with_job(mut self, job: Option<JobSummary>) -> Self {
        self.job = job;
        self
    }

    pub fn with_user(mut self, user: Option<AccountView>) -> Self {
        self.user = user;
        self
    }

    pub fn with_normalized_interview_date(mut self) -> Self {
        self.interview_date = self.interview_date.as_deref().map(normalize_interview_date);
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ApplicationResponse {
    pub message: String,
    pub application: ApplicationView,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApplicationDetail {
    pub application: ApplicationView,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApplicationList {
    pub applications: Vec<ApplicationView>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationCount {
    pub total_applications: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationsByJob {
    pub job: JobView,
    pub applications: Vec<ApplicationView>,
    pub status_counts: Vec<StatusCount>,
}

/// Admin review. `notes` and `interviewDate` set to `null` are cleared.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StatusUpdateRequest {
    pub status: Option<String>,
    #[serde(deserialize_with = "double_option", alias = "adminNotes")]
    pub notes: Option<Option<String>>,
    #[serde(deserialize_with = "double_option")]
    pub interview_date: Option<Option<String>>,
}
