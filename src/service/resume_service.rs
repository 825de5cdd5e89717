use crate::model::application::Application;
use crate::repository::application_repo::{ApplicationFilter, ApplicationRepository};
use crate::repository::user_repo::UserRepository;
use crate::service::{parse_object_id, users_by_id};
use crate::util::error::ServiceError;
use crate::util::storage::{base_name, extension_of, sanitize_file_name, FileStorage, ResumeLocation, PUBLIC_PREFIX, RESUMES_DIR};
use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashSet;
use std::io::Write;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

const NO_RESUME: &str = "No resume found for this application";

pub enum ResumeDownload {
    Redirect(String),
    File {
        file_name: String,
        content_type: String,
        bytes: Vec<u8>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeLinks {
    pub resume_url: String,
    pub portfolio_url: Option<String>,
}

/// `<candidate>_resume<ext>` with the name made header and archive safe.
pub fn download_name(candidate: &str, stored: &str) -> String {
    let mut name = sanitize_file_name(candidate.trim());
    if name.is_empty() {
        name = "candidate".to_string();
    }
    format!("{}_resume{}", name, extension_of(stored))
}

/// Append `_1`, `_2`, ... before the extension until the name is unused.
pub fn dedupe_name(name: String, taken: &mut HashSet<String>) -> String {
    if taken.insert(name.clone()) {
        return name;
    }
    let (stem, ext) = match name.rfind('.') {
        Some(dot) if dot > 0 => (&name[..dot], &name[dot..]),
        _ => (name.as_str(), ""),
    };
    let mut n = 1;
    loop {
        let candidate = format!("{}_{}{}", stem, n, ext);
        if taken.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

#[async_trait]
pub trait ResumeService: Send + Sync {
    async fn download(&self, id: &str) -> Result<ResumeDownload, ServiceError>;
    async fn view(&self, id: &str) -> Result<ResumeLinks, ServiceError>;
    /// ZIP archive of every resume stored on disk.
    async fn download_all(&self) -> Result<Vec<u8>, ServiceError>;
}

pub struct ResumeServiceImpl {
    pub applications: Arc<dyn ApplicationRepository>,
    pub users: Arc<dyn UserRepository>,
    pub storage: Arc<FileStorage>,
}

impl ResumeServiceImpl {
    pub fn new(applications: Arc<dyn ApplicationRepository>, users: Arc<dyn UserRepository>, storage: Arc<FileStorage>) -> Self {
        ResumeServiceImpl { applications, users, storage }
    }

    /// The application and its stored resume reference.
    async fn with_resume(&self, id: &str) -> Result<(Application, String), ServiceError> {
        let id = parse_object_id(id, "application")?;
        let application = self
            .applications
            .find_by_id(&id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Application not found".to_string()))?;
        match application.resume_link.clone().filter(|link| !link.trim().is_empty()) {
            Some(link) => Ok((application, link)),
            None => Err(ServiceError::NotFound(NO_RESUME.to_string())),
        }
    }

    async fn candidate_name(&self, application: &Application) -> Result<String, ServiceError> {
        let user = self.users.find_by_id(&application.user).await?;
        Ok(user
            .map(|u| u.fullname)
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| application.full_name.clone()))
    }
}

#[async_trait]
impl ResumeService for ResumeServiceImpl {
    #[instrument(skip(self))]
    async fn download(&self, id: &str) -> Result<ResumeDownload, ServiceError> {
        let (application, stored) = self.with_resume(id).await?;
        let path = match self.storage.resolve_resume(&stored).await {
            ResumeLocation::Remote(url) => return Ok(ResumeDownload::Redirect(url)),
            ResumeLocation::Local(path) => path,
            ResumeLocation::Missing => return Err(ServiceError::NotFound("Resume file not found".to_string())),
        };
        let bytes = self.storage.read(&path).await?;
        let file_name = download_name(&self.candidate_name(&application).await?, &stored);
        let content_type = mime_guess::from_path(&path).first_or_octet_stream().essence_str().to_string();
        info!("Serving resume {} ({} bytes)", path.display(), bytes.len());
        Ok(ResumeDownload::File { file_name, content_type, bytes })
    }

    async fn view(&self, id: &str) -> Result<ResumeLinks, ServiceError> {
        let (application, stored) = self.with_resume(id).await?;
        let resume_url = match self.storage.resolve_resume(&stored).await {
            ResumeLocation::Remote(url) => url,
            _ => format!("{}/{}/{}", PUBLIC_PREFIX, RESUMES_DIR, base_name(&stored)),
        };
        Ok(ResumeLinks {
            resume_url,
            portfolio_url: application.portfolio_link.filter(|link| !link.trim().is_empty()),
        })
    }

    #[instrument(skip(self))]
    async fn download_all(&self) -> Result<Vec<u8>, ServiceError> {
        let filter = ApplicationFilter { with_resume: true, ..Default::default() };
        let applications = self.applications.list(&filter, None).await?;
        if applications.is_empty() {
            return Err(ServiceError::NotFound("No resumes found to download".to_string()));
        }
        let users = users_by_id(self.users.as_ref(), applications.iter().map(|a| a.user)).await?;

        let mut entries = Vec::new();
        let mut taken = HashSet::new();
        for application in &applications {
            let Some(stored) = application.resume_link.as_deref() else { continue };
            let path = match self.storage.resolve_resume(stored).await {
                ResumeLocation::Local(path) => path,
                ResumeLocation::Remote(_) | ResumeLocation::Missing => {
                    debug!("Skipping resume of application {:?}", application.id);
                    continue;
                }
            };
            let bytes = match self.storage.read(&path).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!("Cannot read {}: {}", path.display(), e);
                    continue;
                }
            };
            let candidate = users
                .get(&application.user)
                .map(|u| u.fullname.clone())
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| application.full_name.clone());
            entries.push((dedupe_name(download_name(&candidate, stored), &mut taken), bytes));
        }

        let archive = build_zip(&entries).map_err(|e| ServiceError::InternalError(format!("Failed to build archive: {}", e)))?;
        info!("Archived {} resumes", entries.len());
        Ok(archive)
    }
}

fn build_zip(entries: &[(String, Vec<u8>)]) -> zip::result::ZipResult<Vec<u8>> {
    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        let mut zip = zip::ZipWriter::new(&mut cursor);
        let options = zip::write::FileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated)
            .unix_permissions(0o644);
        for (name, bytes) in entries {
            zip.start_file(name.as_str(), options)?;
            zip.write_all(bytes)?;
        }
        zip.finish()?;
    }
    Ok(cursor.into_inner())
}
