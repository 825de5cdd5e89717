use std::path::{Path, PathBuf};
use tracing::{debug, error, info, instrument, warn};

pub const RESUMES_DIR: &str = "resumes";
pub const PROFILE_IMAGES_DIR: &str = "profile_images";
/// URL prefix under which the uploads tree is served
pub const PUBLIC_PREFIX: &str = "/uploads";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("File system error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid file name: {0}")]
    InvalidName(String),
}

/// Where a stored resume reference points to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResumeLocation {
    /// External http(s) URL, answered with a redirect
    Remote(String),
    Local(PathBuf),
    /// Nothing on disk under the resolved name
    Missing,
}

/// Uploads tree on local disk: `<root>/resumes` and `<root>/profile_images`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FileStorage { root: root.into() }
    }

    #[instrument(skip(self), fields(root = %self.root.display()))]
    pub async fn init(&self) -> Result<(), StorageError> {
        for dir in [RESUMES_DIR, PROFILE_IMAGES_DIR] {
            tokio::fs::create_dir_all(self.root.join(dir)).await?;
        }
        info!("Upload directories ready");
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn resume_path(&self, name: &str) -> PathBuf {
        self.root.join(RESUMES_DIR).join(name)
    }

    /// Writes an uploaded resume and returns the stored file name.
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn save_resume(&self, original_name: &str, bytes: &[u8]) -> Result<String, StorageError> {
        let name = unique_name(original_name);
        self.write(RESUMES_DIR, &name, bytes).await?;
        Ok(name)
    }

    /// Writes a profile image under `name` and returns its public path.
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn save_profile_image(&self, name: &str, bytes: &[u8]) -> Result<String, StorageError> {
        let name = sanitize_file_name(name);
        if name.is_empty() {
            return Err(StorageError::InvalidName("empty profile image name".to_string()));
        }
        self.write(PROFILE_IMAGES_DIR, &name, bytes).await?;
        Ok(format!("{}/{}/{}", PUBLIC_PREFIX, PROFILE_IMAGES_DIR, name))
    }

    async fn write(&self, dir: &str, name: &str, bytes: &[u8]) -> Result<(), StorageError> {
        let dir = self.root.join(dir);
        tokio::fs::create_dir_all(&dir).await?;
        let path = dir.join(name);
        if let Err(e) = tokio::fs::write(&path, bytes).await {
            error!("Failed to write {}: {}", path.display(), e);
            return Err(e.into());
        }
        debug!("Stored {} ({} bytes)", path.display(), bytes.len());
        Ok(())
    }

    /// Resolve a stored resume reference.
    ///
    /// Whatever was stored (bare name, relative path, legacy absolute path from
    /// another OS) is reduced to its base name and looked up in `resumes/`.
    pub async fn resolve_resume(&self, stored: &str) -> ResumeLocation {
        let stored = stored.trim();
        if stored.starts_with("http://") || stored.starts_with("https://") {
            return ResumeLocation::Remote(stored.to_string());
        }
        let name = base_name(stored);
        if name.is_empty() || name == "." || name == ".." {
            return ResumeLocation::Missing;
        }
        let path = self.resume_path(name);
        match tokio::fs::try_exists(&path).await {
            Ok(true) => ResumeLocation::Local(path),
            Ok(false) => {
                warn!("Resume file not found: {}", path.display());
                ResumeLocation::Missing
            }
            Err(e) => {
                warn!("Cannot stat {}: {}", path.display(), e);
                ResumeLocation::Missing
            }
        }
    }

    pub async fn read(&self, path: &Path) -> Result<Vec<u8>, StorageError> {
        Ok(tokio::fs::read(path).await?)
    }
}

/// Last path component, splitting on both `/` and `\`.
pub fn base_name(stored: &str) -> &str {
    stored.rsplit(['/', '\\']).next().unwrap_or(stored).trim()
}

/// Keeps ASCII letters, digits, `.`, `-` and `_`; everything else becomes `_`.
pub fn sanitize_file_name(name: &str) -> String {
    let name = base_name(name);
    let cleaned: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
        .collect();
    cleaned.trim_start_matches('.').to_string()
}

/// `<millis>-<uuid>-<sanitised original name>`
pub fn unique_name(original: &str) -> String {
    let mut safe = sanitize_file_name(original);
    if safe.is_empty() {
        safe = "file".to_string();
    }
    format!("{}-{}-{}", chrono::Utc::now().timestamp_millis(), uuid::Uuid::new_v4().simple(), safe)
}

/// Extension including the dot, or empty.
pub fn extension_of(name: &str) -> String {
    Path::new(base_name(name))
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_name_handles_windows_paths() {
        assert_eq!(base_name(r"C:\Users\dev\project\uploads\resumes\cv.pdf"), "cv.pdf");
        assert_eq!(base_name("C:/Users/dev/uploads/resumes/cv.pdf"), "cv.pdf");
        assert_eq!(base_name("uploads/resumes/cv.pdf"), "cv.pdf");
        assert_eq!(base_name("cv.pdf"), "cv.pdf");
    }

    #[test]
    fn test_sanitize_strips_separators_and_spaces() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("my resume (1).pdf"), "my_resume__1_.pdf");
        assert_eq!(sanitize_file_name(".hidden"), "hidden");
    }

    #[test]
    fn test_unique_names_differ() {
        let a = unique_name("cv.pdf");
        let b = unique_name("cv.pdf");
        assert_ne!(a, b);
        assert!(a.ends_with("-cv.pdf"));
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("cv.PDF"), ".PDF");
        assert_eq!(extension_of(r"C:\x\resume.docx"), ".docx");
        assert_eq!(extension_of("noext"), "");
    }

    #[tokio::test]
    async fn test_resolve_remote_local_and_missing() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        storage.init().await.unwrap();

        let stored = storage.save_resume("cv.pdf", b"%PDF-1.4").await.unwrap();
        let legacy = format!(r"C:\old\server\uploads\resumes\{}", stored);

        assert_eq!(
            storage.resolve_resume("https://cdn.example.com/cv.pdf").await,
            ResumeLocation::Remote("https://cdn.example.com/cv.pdf".to_string())
        );
        assert_eq!(storage.resolve_resume(&legacy).await, ResumeLocation::Local(storage.resume_path(&stored)));
        assert_eq!(storage.resolve_resume("gone.pdf").await, ResumeLocation::Missing);
        assert_eq!(storage.resolve_resume("").await, ResumeLocation::Missing);
    }

    #[tokio::test]
    async fn test_profile_image_public_path() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        let path = storage.save_profile_image("profile_1_2.png", b"png").await.unwrap();
        assert_eq!(path, "/uploads/profile_images/profile_1_2.png");
        assert!(dir.path().join("profile_images/profile_1_2.png").exists());
    }
}
