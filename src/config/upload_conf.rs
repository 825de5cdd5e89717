use std::env;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Location of the uploads tree on local disk.
#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub upload_dir: PathBuf,
}

impl UploadConfig {
    pub fn from_env() -> Self {
        let upload_dir = env::var("UPLOAD_DIR").unwrap_or_else(|_| {
            warn!("UPLOAD_DIR not set, using default: uploads");
            "uploads".to_string()
        });
        debug!("Upload directory: {}", upload_dir);
        UploadConfig { upload_dir: PathBuf::from(upload_dir) }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        UploadConfig { upload_dir: PathBuf::from("uploads") }
    }
}
