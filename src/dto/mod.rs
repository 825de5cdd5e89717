pub mod admin_dto;
pub mod application_dto;
pub mod auth_dto;
pub mod candidate_dto;
pub mod contact_dto;
pub mod dashboard_dto;
pub mod job_dto;
pub mod profile_dto;

use bson::{oid::ObjectId, DateTime};
use bytes::Bytes;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use validator::ValidationErrors;

/// An uploaded multipart file part.
#[derive(Debug, Clone)]
pub struct File {
    pub filename: String,
    pub content_type: String,
    pub content: Bytes,
}

impl File {
    pub fn size(&self) -> usize {
        self.content.len()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new<T: Into<String>>(message: T) -> Self {
        MessageResponse { message: message.into() }
    }
}

/// `?page=&limit=&status=&search=` shared by the admin listings.
///
/// Numbers are kept as text so a malformed value falls back to the default
/// instead of rejecting the request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub status: Option<String>,
    pub search: Option<String>,
}

impl ListQuery {
    pub fn page(&self) -> u64 {
        parse_positive(self.page.as_deref()).unwrap_or(1)
    }

    pub fn limit(&self) -> u64 {
        parse_positive(self.limit.as_deref()).unwrap_or(10).min(100)
    }

    pub fn search(&self) -> Option<&str> {
        self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    /// Blank and `all` mean no status filter.
    pub fn status(&self) -> Option<&str> {
        self.status
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case("all"))
    }
}

fn parse_positive(raw: Option<&str>) -> Option<u64> {
    raw.and_then(|v| v.trim().parse::<u64>().ok()).filter(|v| *v > 0)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u64,
    pub total_pages: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_jobs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_applications: Option<u64>,
    pub has_next: bool,
    pub has_prev: bool,
}

impl Pagination {
    pub fn new(page: u64, limit: u64, total: u64) -> Self {
        let total_pages = total.div_ceil(limit.max(1));
        Pagination {
            current_page: page,
            total_pages,
            total_jobs: None,
            total_applications: None,
            has_next: page < total_pages,
            has_prev: page > 1,
        }
    }

    pub fn with_total_jobs(mut self, total: u64) -> Self {
        self.total_jobs = Some(total);
        self
    }

    pub fn with_total_applications(mut self, total: u64) -> Self {
        self.total_applications = Some(total);
        self
    }
}

/// Collapse validator output into one client message, fields in name order.
pub fn validation_message(errors: &ValidationErrors) -> String {
    let fields: BTreeMap<_, _> = errors.field_errors().into_iter().collect();
    fields
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(message) => message.to_string(),
                None => format!("{} is invalid", field),
            })
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`).
pub fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

pub fn hex_id(id: &Option<ObjectId>) -> String {
    id.map(|id| id.to_hex()).unwrap_or_default()
}

pub fn rfc3339(date: &Option<DateTime>) -> Option<String> {
    date.map(|d| d.to_chrono().to_rfc3339_opts(chrono::SecondsFormat::Millis, true))
}

/// `YYYY-MM-DD`, as written in the CSV exports.
pub fn ymd(date: &Option<DateTime>) -> Option<String> {
    date.map(|d| d.to_chrono().format("%Y-%m-%d").to_string())
}
