#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use bson::{oid::ObjectId, DateTime};
use chrono::Datelike;
use http_body_util::BodyExt;
use job_portal_backend::app::app::{create_router, AppContext};
use job_portal_backend::config::{AppConfig, JwtConfig};
use job_portal_backend::model::admin::Admin;
use job_portal_backend::model::application::Application;
use job_portal_backend::model::contact::Contact;
use job_portal_backend::model::job::{Job, JobStatus};
use job_portal_backend::model::user::User;
use job_portal_backend::repository::admin_repo::AdminRepository;
use job_portal_backend::repository::application_repo::{
    ApplicationFilter, ApplicationRepository, MonthCount, StatusCount, StatusUpdate,
};
use job_portal_backend::repository::contact_repo::ContactRepository;
use job_portal_backend::repository::job_repo::{JobFilter, JobRepository};
use job_portal_backend::repository::repository_error::{RepositoryError, RepositoryResult};
use job_portal_backend::repository::user_repo::UserRepository;
use job_portal_backend::repository::Page;
use job_portal_backend::util::jwt::{JwtTokenUtils, JwtTokenUtilsImpl, Role};
use job_portal_backend::util::password::{PasswordUtils, PasswordUtilsImpl};
use job_portal_backend::util::storage::FileStorage;
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tower::ServiceExt;

pub const PASSWORD: &str = "Secret123";

fn contains(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn contains_opt(haystack: &Option<String>, needle: &str) -> bool {
    haystack.as_deref().is_some_and(|h| contains(h, needle))
}

/// Newest first, ties broken by insertion order.
fn newest_first<T: Clone>(items: &[T], created: impl Fn(&T) -> Option<DateTime>) -> Vec<T> {
    let mut sorted: Vec<T> = items.iter().rev().cloned().collect();
    sorted.sort_by_key(|item| std::cmp::Reverse(created(item).map(|d| d.timestamp_millis())));
    sorted
}

fn paginate<T>(items: Vec<T>, page: Option<Page>) -> Vec<T> {
    match page {
        Some(page) => items.into_iter().skip(page.skip as usize).take(page.limit as usize).collect(),
        None => items,
    }
}

#[derive(Default)]
pub struct MemoryUsers {
    pub items: Mutex<Vec<User>>,
    /// Lookups by id fail like an unreachable database
    pub offline: AtomicBool,
}

impl MemoryUsers {
    fn matching(&self, search: Option<&str>) -> Vec<User> {
        let items = self.items.lock().unwrap();
        let all = newest_first(&items, |u| u.created_at);
        match search.map(str::trim).filter(|s| !s.is_empty()) {
            Some(term) => all.into_iter().filter(|u| contains(&u.fullname, term) || contains(&u.email, term)).collect(),
            None => all,
        }
    }
}

#[async_trait]
impl UserRepository for MemoryUsers {
    async fn insert(&self, mut user: User) -> RepositoryResult<User> {
        let mut items = self.items.lock().unwrap();
        if items.iter().any(|u| u.email == user.email) {
            return Err(RepositoryError::already_exists("email"));
        }
        user.id = Some(ObjectId::new());
        user.created_at = user.created_at.or(Some(DateTime::now()));
        user.updated_at = user.created_at;
        items.push(user.clone());
        Ok(user)
    }

    async fn update(&self, user: User) -> RepositoryResult<User> {
        let mut items = self.items.lock().unwrap();
        let slot = items
            .iter_mut()
            .find(|u| u.id.is_some() && u.id == user.id)
            .ok_or_else(|| RepositoryError::not_found("user"))?;
        *slot = user.clone();
        slot.updated_at = Some(DateTime::now());
        Ok(slot.clone())
    }

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        Ok(self.items.lock().unwrap().iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: &ObjectId) -> RepositoryResult<Option<User>> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(RepositoryError::database("connection refused"));
        }
        Ok(self.items.lock().unwrap().iter().find(|u| u.id == Some(*id)).cloned())
    }

    async fn find_by_ids(&self, ids: &[ObjectId]) -> RepositoryResult<Vec<User>> {
        let items = self.items.lock().unwrap();
        Ok(items.iter().filter(|u| u.id.is_some_and(|id| ids.contains(&id))).cloned().collect())
    }

    async fn list(&self, search: Option<&str>, page: Option<Page>) -> RepositoryResult<Vec<User>> {
        Ok(paginate(self.matching(search), page))
    }

    async fn count(&self, search: Option<&str>) -> RepositoryResult<u64> {
        Ok(self.matching(search).len() as u64)
    }

    async fn set_status(&self, id: &ObjectId, status: &str) -> RepositoryResult<Option<User>> {
        let mut items = self.items.lock().unwrap();
        Ok(items.iter_mut().find(|u| u.id == Some(*id)).map(|u| {
            u.status = Some(status.to_string());
            u.clone()
        }))
    }

    async fn set_notes(&self, id: &ObjectId, notes: &str) -> RepositoryResult<bool> {
        let mut items = self.items.lock().unwrap();
        Ok(items.iter_mut().find(|u| u.id == Some(*id)).map(|u| u.admin_notes = Some(notes.to_string())).is_some())
    }
}

#[derive(Default)]
pub struct MemoryAdmins {
    pub items: Mutex<Vec<Admin>>,
}

#[async_trait]
impl AdminRepository for MemoryAdmins {
    async fn insert(&self, mut admin: Admin) -> RepositoryResult<Admin> {
        let mut items = self.items.lock().unwrap();
        if items.iter().any(|a| a.email == admin.email) {
            return Err(RepositoryError::already_exists("email"));
        }
        admin.id = Some(ObjectId::new());
        admin.created_at = Some(DateTime::now());
        items.push(admin.clone());
        Ok(admin)
    }

    async fn update(&self, admin: Admin) -> RepositoryResult<Admin> {
        let mut items = self.items.lock().unwrap();
        let slot = items
            .iter_mut()
            .find(|a| a.id.is_some() && a.id == admin.id)
            .ok_or_else(|| RepositoryError::not_found("admin"))?;
        *slot = admin.clone();
        Ok(admin)
    }

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<Admin>> {
        Ok(self.items.lock().unwrap().iter().find(|a| a.email == email).cloned())
    }

    async fn find_by_id(&self, id: &ObjectId) -> RepositoryResult<Option<Admin>> {
        Ok(self.items.lock().unwrap().iter().find(|a| a.id == Some(*id)).cloned())
    }

    async fn list(&self) -> RepositoryResult<Vec<Admin>> {
        Ok(self.items.lock().unwrap().clone())
    }
}

#[derive(Default)]
pub struct MemoryJobs {
    pub items: Mutex<Vec<Job>>,
}

impl MemoryJobs {
    fn matching(&self, filter: &JobFilter) -> Vec<Job> {
        let items = self.items.lock().unwrap();
        newest_first(&items, |j| j.created_at)
            .into_iter()
            .filter(|job| {
                filter.search.as_deref().map_or(true, |s| {
                    contains(&job.title, s) || contains_opt(&job.company, s) || contains(&job.description, s)
                })
            })
            .filter(|job| filter.title.as_deref().map_or(true, |t| contains(&job.title, t)))
            .filter(|job| filter.location.as_deref().map_or(true, |l| contains_opt(&job.location, l)))
            .filter(|job| filter.department.as_deref().map_or(true, |d| contains_opt(&job.department, d)))
            .filter(|job| filter.job_type.as_deref().map_or(true, |t| contains_opt(&job.job_type, t)))
            .filter(|job| filter.status.map_or(true, |s| job.status() == Some(s)))
            .collect()
    }
}

#[async_trait]
impl JobRepository for MemoryJobs {
    async fn insert(&self, mut job: Job) -> RepositoryResult<Job> {
        job.id = Some(ObjectId::new());
        job.created_at = job.created_at.or(Some(DateTime::now()));
        self.items.lock().unwrap().push(job.clone());
        Ok(job)
    }

    async fn find_by_id(&self, id: &ObjectId) -> RepositoryResult<Option<Job>> {
        Ok(self.items.lock().unwrap().iter().find(|j| j.id == Some(*id)).cloned())
    }

    async fn find_by_ids(&self, ids: &[ObjectId]) -> RepositoryResult<Vec<Job>> {
        let items = self.items.lock().unwrap();
        Ok(items.iter().filter(|j| j.id.is_some_and(|id| ids.contains(&id))).cloned().collect())
    }

    async fn list(&self, filter: &JobFilter, page: Option<Page>) -> RepositoryResult<Vec<Job>> {
        Ok(paginate(self.matching(filter), page))
    }

    async fn count(&self, filter: &JobFilter) -> RepositoryResult<u64> {
        Ok(self.matching(filter).len() as u64)
    }

    async fn set_status(&self, id: &ObjectId, status: JobStatus) -> RepositoryResult<Option<Job>> {
        let mut items = self.items.lock().unwrap();
        Ok(items.iter_mut().find(|j| j.id == Some(*id)).map(|j| {
            j.status = Some(status.as_str().to_string());
            j.updated_at = Some(DateTime::now());
            j.clone()
        }))
    }

    async fn delete(&self, id: &ObjectId) -> RepositoryResult<bool> {
        let mut items = self.items.lock().unwrap();
        let before = items.len();
        items.retain(|j| j.id != Some(*id));
        Ok(items.len() != before)
    }
}

#[derive(Default)]
pub struct MemoryApplications {
    pub items: Mutex<Vec<Application>>,
}

fn application_matches(application: &Application, filter: &ApplicationFilter) -> bool {
    if let Some(user) = filter.user {
        if application.user != user {
            return false;
        }
    } else if let Some(users) = &filter.users {
        if !users.contains(&application.user) {
            return false;
        }
    }
    if filter.job.is_some_and(|job| application.job != job) {
        return false;
    }
    if filter.status.is_some_and(|status| application.status != status) {
        return false;
    }
    if filter.with_resume && !application.has_resume() {
        return false;
    }
    if let Some(matching) = &filter.matching {
        if !matching.users.contains(&application.user) && !matching.jobs.contains(&application.job) {
            return false;
        }
    }
    true
}

impl MemoryApplications {
    fn matching(&self, filter: &ApplicationFilter) -> Vec<Application> {
        let items = self.items.lock().unwrap();
        newest_first(&items, |a| a.created_at)
            .into_iter()
            .filter(|a| application_matches(a, filter))
            .collect()
    }
}

#[async_trait]
impl ApplicationRepository for MemoryApplications {
    async fn insert(&self, mut application: Application) -> RepositoryResult<Application> {
        let mut items = self.items.lock().unwrap();
        // Mirrors the unique (user, job) index.
        if items.iter().any(|a| a.user == application.user && a.job == application.job) {
            return Err(RepositoryError::already_exists("application"));
        }
        application.id = Some(ObjectId::new());
        application.created_at = application.created_at.or(Some(DateTime::now()));
        items.push(application.clone());
        Ok(application)
    }

    async fn find_by_id(&self, id: &ObjectId) -> RepositoryResult<Option<Application>> {
        Ok(self.items.lock().unwrap().iter().find(|a| a.id == Some(*id)).cloned())
    }

    async fn exists_for(&self, user: &ObjectId, job: &ObjectId) -> RepositoryResult<bool> {
        Ok(self.items.lock().unwrap().iter().any(|a| a.user == *user && a.job == *job))
    }

    async fn list(&self, filter: &ApplicationFilter, page: Option<Page>) -> RepositoryResult<Vec<Application>> {
        Ok(paginate(self.matching(filter), page))
    }

    async fn count(&self, filter: &ApplicationFilter) -> RepositoryResult<u64> {
        Ok(self.matching(filter).len() as u64)
    }

    async fn update_status(&self, id: &ObjectId, update: &StatusUpdate) -> RepositoryResult<Option<Application>> {
        let mut items = self.items.lock().unwrap();
        Ok(items.iter_mut().find(|a| a.id == Some(*id)).map(|a| {
            a.status = update.status;
            a.reviewed_by = Some(update.reviewed_by);
            a.reviewed_at = Some(update.reviewed_at);
            if let Some(notes) = &update.admin_notes {
                a.admin_notes = notes.clone();
            }
            if let Some(date) = &update.interview_date {
                a.interview_date = date.clone();
            }
            a.clone()
        }))
    }

    async fn delete_by_job(&self, job: &ObjectId) -> RepositoryResult<u64> {
        let mut items = self.items.lock().unwrap();
        let before = items.len();
        items.retain(|a| a.job != *job);
        Ok((before - items.len()) as u64)
    }

    async fn count_by_status(&self, filter: &ApplicationFilter) -> RepositoryResult<Vec<StatusCount>> {
        let mut counts = BTreeMap::new();
        for application in self.matching(filter) {
            *counts.entry(application.status.as_str().to_string()).or_insert(0u64) += 1;
        }
        Ok(counts.into_iter().map(|(status, count)| StatusCount { status, count }).collect())
    }

    async fn count_by_month(&self) -> RepositoryResult<Vec<MonthCount>> {
        let mut counts = BTreeMap::new();
        for application in self.items.lock().unwrap().iter() {
            if let Some(created) = application.created_at {
                let date = created.to_chrono();
                *counts.entry((date.year(), date.month())).or_insert(0u64) += 1;
            }
        }
        Ok(counts.into_iter().map(|((year, month), count)| MonthCount { year, month, count }).collect())
    }

    async fn count_distinct_jobs(&self) -> RepositoryResult<u64> {
        let items = self.items.lock().unwrap();
        Ok(items.iter().map(|a| a.job).collect::<HashSet<_>>().len() as u64)
    }
}

#[derive(Default)]
pub struct MemoryContacts {
    pub items: Mutex<Vec<Contact>>,
}

#[async_trait]
impl ContactRepository for MemoryContacts {
    async fn insert(&self, mut contact: Contact) -> RepositoryResult<Contact> {
        contact.id = Some(ObjectId::new());
        contact.created_at = Some(DateTime::now());
        self.items.lock().unwrap().push(contact.clone());
        Ok(contact)
    }
}

/// A router over in-memory collections and a throwaway uploads directory.
pub struct TestApp {
    pub router: Router,
    pub users: Arc<MemoryUsers>,
    pub admins: Arc<MemoryAdmins>,
    pub jobs: Arc<MemoryJobs>,
    pub applications: Arc<MemoryApplications>,
    pub contacts: Arc<MemoryContacts>,
    pub jwt_utils: Arc<JwtTokenUtilsImpl>,
    pub storage: Arc<FileStorage>,
    pub uploads: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(AppConfig::default()).await
    }

    pub async fn with_config(config: AppConfig) -> Self {
        let uploads = TempDir::new().unwrap();
        let storage = Arc::new(FileStorage::new(uploads.path().to_path_buf()));
        storage.init().await.unwrap();
        let users = Arc::new(MemoryUsers::default());
        let admins = Arc::new(MemoryAdmins::default());
        let jobs = Arc::new(MemoryJobs::default());
        let applications = Arc::new(MemoryApplications::default());
        let contacts = Arc::new(MemoryContacts::default());
        let jwt_utils = Arc::new(JwtTokenUtilsImpl::new(JwtConfig::default()));

        let ctx = AppContext {
            users: users.clone(),
            admins: admins.clone(),
            jobs: jobs.clone(),
            applications: applications.clone(),
            contacts: contacts.clone(),
            jwt_utils: jwt_utils.clone(),
            storage: storage.clone(),
            config,
        };
        TestApp {
            router: create_router(&ctx),
            users,
            admins,
            jobs,
            applications,
            contacts,
            jwt_utils,
            storage,
            uploads,
        }
    }

    pub async fn send(&self, req: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(req).await.unwrap()
    }

    pub async fn add_user(&self, fullname: &str, email: &str) -> User {
        let hash = PasswordUtilsImpl::hash_password(PASSWORD).unwrap();
        self.users.insert(User::new(fullname.to_string(), email.to_string(), hash)).await.unwrap()
    }

    pub async fn add_admin(&self, fullname: &str, email: &str) -> Admin {
        let admin = Admin {
            fullname: fullname.to_string(),
            email: email.to_string(),
            password: PasswordUtilsImpl::hash_password(PASSWORD).unwrap(),
            ..Default::default()
        };
        self.admins.insert(admin).await.unwrap()
    }

    pub async fn add_job(&self, title: &str, status: Option<&str>) -> Job {
        let job = Job {
            title: title.to_string(),
            description: format!("{} role", title),
            company: Some("Acme".to_string()),
            location: Some("Remote".to_string()),
            status: status.map(str::to_string),
            ..Default::default()
        };
        self.jobs.insert(job).await.unwrap()
    }

    pub async fn add_application(&self, job: &Job, user: &User, resume_link: Option<&str>) -> Application {
        let application = Application {
            id: None,
            job: job.id.unwrap(),
            user: user.id.unwrap(),
            full_name: user.fullname.clone(),
            email: user.email.clone(),
            phone: "0555000000".to_string(),
            address: None,
            experience: "3 years".to_string(),
            skills: vec!["Rust".to_string()],
            current_salary: None,
            expected_salary: None,
            notice_period: None,
            cover_letter: None,
            resume_link: resume_link.map(str::to_string),
            portfolio_link: None,
            status: Default::default(),
            admin_notes: None,
            interview_date: None,
            reviewed_at: None,
            reviewed_by: None,
            created_at: None,
        };
        self.applications.insert(application).await.unwrap()
    }

    pub fn user_token(&self, user: &User) -> String {
        let id = user.id.unwrap().to_hex();
        self.jwt_utils.generate_access_token(&id, &user.email, Role::User).unwrap()
    }

    pub fn admin_token(&self, admin: &Admin) -> String {
        let id = admin.id.unwrap().to_hex();
        self.jwt_utils.generate_access_token(&id, &admin.email, Role::Admin).unwrap()
    }
}

pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri).header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

pub const BOUNDARY: &str = "X-JOB-PORTAL-BOUNDARY";

/// Hand-built multipart body: text fields then `(field, file name, bytes)` files.
pub fn multipart_body(fields: &[(&str, &str)], files: &[(&str, &str, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes());
        body.extend_from_slice(value.as_bytes());
        body.extend_from_slice(b"\r\n");
    }
    for (name, file_name, bytes) in files {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n", name, file_name).as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn multipart_request(method: &str, uri: &str, token: Option<&str>, body: Vec<u8>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", format!("multipart/form-data; boundary={}", BOUNDARY));
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    builder.body(Body::from(body)).unwrap()
}

pub async fn body_bytes(resp: Response<Body>) -> Vec<u8> {
    resp.into_body().collect().await.unwrap().to_bytes().to_vec()
}

pub async fn body_json(resp: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(resp).await).unwrap()
}
