use crate::dto::application_dto::ApplicationView;
use crate::dto::job_dto::JobView;
use crate::repository::application_repo::{MonthCount, StatusCount};
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_jobs: u64,
    pub total_applications: u64,
    pub total_candidates: u64,
    pub active_jobs: u64,
    /// Distinct jobs with at least one application
    pub positions_applied_for: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub stats: DashboardStats,
    pub recent_applications: Vec<ApplicationView>,
    pub recent_jobs: Vec<JobView>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartsResponse {
    pub applications_by_month: Vec<MonthCount>,
    pub applications_by_status: Vec<StatusCount>,
}
