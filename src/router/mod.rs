pub mod admin_router;
pub mod application_router;
pub mod auth_router;
pub mod candidate_router;
pub mod contact_router;
pub mod dashboard_router;
pub mod export_router;
pub mod job_router;
pub mod resume_router;
