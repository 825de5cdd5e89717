use crate::dto::application_dto::ApplicationView;
use crate::dto::profile_dto::ProfileView;
use crate::dto::{rfc3339, Pagination};
use crate::model::application::Application;
use crate::model::user::User;
use crate::repository::application_repo::StatusCount;
use crate::util::csv::MISSING;
use serde::{Deserialize, Serialize};

/// A candidate profile as shown to admins, with the admin-set status.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateView {
    #[serde(flatten)]
    pub profile: ProfileView,
    pub status: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl From<&User> for CandidateView {
    fn from(user: &User) -> Self {
        CandidateView {
            profile: ProfileView::from(user),
            status: user.status.clone(),
            created_at: rfc3339(&user.created_at),
            updated_at: rfc3339(&user.updated_at),
        }
    }
}

impl CandidateView {
    /// Profiles created before the candidate filled them in borrow the name
    /// and phone from the first application.
    pub fn with_fallback(mut self, first_application: Option<&Application>) -> Self {
        if let Some(application) = first_application {
            if self.profile.fullname.trim().is_empty() {
                self.profile.fullname = application.full_name.clone();
            }
            if self.profile.phone.trim().is_empty() {
                self.profile.phone = application.phone.clone();
            }
        }
        self
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateListItem {
    #[serde(flatten)]
    pub profile: ProfileView,
    pub created_at: Option<String>,
    pub application_count: u64,
    /// Title of the job in the latest application
    pub position: String,
    /// Status of the latest application
    pub status: String,
    pub submission_date: Option<String>,
}

impl CandidateListItem {
    pub fn new(user: &User, application_count: u64, latest: Option<(&Application, Option<String>)>) -> Self {
        let (position, status, submission_date) = match latest {
            Some((application, job_title)) => (
                job_title.unwrap_or_else(|| MISSING.to_string()),
                application.status.as_str().to_string(),
                rfc3339(&application.created_at),
            ),
            None => (MISSING.to_string(), MISSING.to_string(), None),
        };
        CandidateListItem {
            profile: ProfileView::from(user),
            created_at: rfc3339(&user.created_at),
            application_count,
            position,
            status,
            submission_date,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateList {
    pub candidates: Vec<CandidateListItem>,
    pub total_candidates: u64,
    pub total_applications: u64,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateDetail {
    pub candidate: CandidateView,
    pub applications: Vec<ApplicationView>,
    pub application_stats: Vec<StatusCount>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CandidateApplications {
    pub applications: Vec<ApplicationView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CandidateResponse {
    pub message: String,
    pub candidate: CandidateView,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CandidateStatusRequest {
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CandidateNotes {
    pub notes: String,
}
