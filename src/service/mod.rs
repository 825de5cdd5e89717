pub mod admin_service;
pub mod application_service;
pub mod auth_service;
pub mod candidate_service;
pub mod contact_service;
pub mod dashboard_service;
pub mod export_service;
pub mod job_service;
pub mod profile_service;
pub mod resume_service;

use crate::dto::application_dto::ApplicationView;
use crate::dto::auth_dto::AccountView;
use crate::dto::job_dto::JobSummary;
use crate::dto::hex_id;
use crate::model::application::Application;
use crate::model::job::Job;
use crate::model::user::User;
use crate::repository::job_repo::JobRepository;
use crate::repository::user_repo::UserRepository;
use crate::util::error::ServiceError;
use bson::oid::ObjectId;
use std::collections::{HashMap, HashSet};

/// Parse a path id; `what` names the resource in the 400 message.
pub fn parse_object_id(raw: &str, what: &str) -> Result<ObjectId, ServiceError> {
    ObjectId::parse_str(raw.trim()).map_err(|_| ServiceError::InvalidInput(format!("Invalid {} ID", what)))
}

fn distinct<I: IntoIterator<Item = ObjectId>>(ids: I) -> Vec<ObjectId> {
    let mut seen = HashSet::new();
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}

pub async fn jobs_by_id(jobs: &dyn JobRepository, ids: impl IntoIterator<Item = ObjectId>) -> Result<HashMap<ObjectId, Job>, ServiceError> {
    let found = jobs.find_by_ids(&distinct(ids)).await?;
    Ok(found.into_iter().filter_map(|job| job.id.map(|id| (id, job))).collect())
}

pub async fn users_by_id(users: &dyn UserRepository, ids: impl IntoIterator<Item = ObjectId>) -> Result<HashMap<ObjectId, User>, ServiceError> {
    let found = users.find_by_ids(&distinct(ids)).await?;
    Ok(found.into_iter().filter_map(|user| user.id.map(|id| (id, user))).collect())
}

pub fn account_view(user: &User) -> AccountView {
    AccountView {
        id: hex_id(&user.id),
        fullname: user.fullname.clone(),
        email: user.email.clone(),
    }
}

/// Render applications with their job embedded and, when `users` is given, the candidate.
pub async fn application_views(
    applications: &[Application],
    jobs: &dyn JobRepository,
    users: Option<&dyn UserRepository>,
) -> Result<Vec<ApplicationView>, ServiceError> {
    let job_map = jobs_by_id(jobs, applications.iter().map(|a| a.job)).await?;
    let user_map = match users {
        Some(users) => users_by_id(users, applications.iter().map(|a| a.user)).await?,
        None => HashMap::new(),
    };
    Ok(applications
        .iter()
        .map(|application| {
            ApplicationView::from(application)
                .with_job(job_map.get(&application.job).map(JobSummary::from))
                .with_user(user_map.get(&application.user).map(account_view))
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_object_id_message() {
        let err = parse_object_id("nope", "application").unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(ref m) if m == "Invalid application ID"));
        assert!(parse_object_id(&ObjectId::new().to_hex(), "job").is_ok());
    }

    #[test]
    fn test_distinct_keeps_first_occurrence() {
        let a = ObjectId::new();
        let b = ObjectId::new();
        assert_eq!(distinct([a, b, a]), vec![a, b]);
    }
}
