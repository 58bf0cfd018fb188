use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use url::Url;
use uuid::Uuid;

use crate::error::{MirrorError, Result};
use crate::path_utils::get_extension;

/// Suffix appended to a page's own target path to name its asset directory.
pub const RESOURCE_DIR_SUFFIX: &str = "-res";

/// Decides where mirrored pages land on disk.
#[derive(Debug, Clone)]
pub struct FileManager {
    base_dir: PathBuf,
    suffix: String,
}

impl FileManager {
    pub fn new(base_dir: &Path) -> Result<Self> {
        let base_dir = base_dir.to_path_buf();
        fs::create_dir_all(&base_dir).map_err(|e| MirrorError::filesystem(&base_dir, e))?;

        Ok(Self {
            base_dir,
            suffix: ".html".to_string(),
        })
    }

    pub fn with_suffix(mut self, suffix: &str) -> Self {
        self.suffix = suffix.to_string();
        self
    }

    /// `<base>/<host>[:port]<path><suffix>`. A bare directory path is
    /// completed with `index` so it still names a file.
    pub fn page_path(&self, url: &Url) -> PathBuf {
        let mut name = url.host_str().unwrap_or_default().to_string();
        if let Some(port) = url.port() {
            name.push_str(&format!(":{}", port));
        }

        let path = url.path();
        name.push_str(path);
        if path.is_empty() || path.ends_with('/') {
            if !name.ends_with('/') {
                name.push('/');
            }
            name.push_str("index");
        }
        name.push_str(&self.suffix);

        let mut file_path = self.base_dir.clone();
        for segment in name.split('/').filter(|s| !s.is_empty()) {
            file_path.push(segment);
        }
        file_path
    }

    /// Same as [`FileManager::page_path`] but also creates the parent
    /// directory so the page can be written straight away.
    pub fn prepare_page_path(&self, url: &Url) -> Result<PathBuf> {
        let path = self.page_path(url);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| MirrorError::filesystem(parent, e))?;
        }
        Ok(path)
    }
}

/// The per-page directory holding that page's assets.
pub fn resource_dir(target: &Path) -> PathBuf {
    let mut dir = OsString::from(target.as_os_str());
    dir.push(RESOURCE_DIR_SUFFIX);
    PathBuf::from(dir)
}

pub fn create_resource_dir(target: &Path) -> Result<PathBuf> {
    let dir = resource_dir(target);
    fs::create_dir_all(&dir).map_err(|e| MirrorError::filesystem(&dir, e))?;
    Ok(dir)
}

/// A fresh, collision-free location for an asset referenced as `reference`
/// from the page saved at `target`. The reference's extension is kept.
pub fn asset_path(target: &Path, reference: &str) -> PathBuf {
    let mut name = Uuid::new_v4().to_string();
    if let Some(ext) = get_extension(reference) {
        name.push('.');
        name.push_str(ext);
    }
    resource_dir(target).join(name)
}
