use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::error::{PhotoError, Result};

const TEMP_MARKER: &str = ".tmp-";
const MAX_NAME_LEN: usize = 255;
const MAX_EXTENSION_LEN: usize = 10;

/// Uploaded photo files on local disk, one file per photo.
///
/// Names are generated on save (a UUIDv7 token plus the original
/// extension), so the store never overwrites an existing blob. There is no
/// in-memory index; every call goes to the filesystem.
#[derive(Clone, Debug)]
pub struct BlobStore {
    root: PathBuf,
}

impl BlobStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Lower-cased extension of a client-supplied filename, if it is short
    /// and plain ASCII alphanumeric.
    pub fn extension_of(original_name: &str) -> Option<String> {
        let extension = Path::new(original_name).extension()?.to_str()?;
        let valid = !extension.is_empty()
            && extension.len() <= MAX_EXTENSION_LEN
            && extension.bytes().all(|b| b.is_ascii_alphanumeric());
        valid.then(|| extension.to_ascii_lowercase())
    }

    /// A single path segment inside the root. Older data files hold names
    /// like `1715000000000.JPG (1)`, so anything without a separator, a
    /// control character, a leading `.` or `..` is accepted.
    pub fn is_valid_name(name: &str) -> bool {
        !name.is_empty()
            && name.len() <= MAX_NAME_LEN
            && !name.starts_with('.')
            && !name.contains("..")
            && !name.chars().any(|c| matches!(c, '/' | '\\') || c.is_control())
    }

    pub fn generate_name(extension: Option<&str>) -> String {
        let token = Uuid::now_v7().simple();
        match extension {
            Some(extension) => format!("{token}.{extension}"),
            None => token.to_string(),
        }
    }

    pub fn path_for(&self, name: &str) -> Result<PathBuf> {
        if !Self::is_valid_name(name) {
            return Err(PhotoError::InvalidName(name.to_string()));
        }
        Ok(self.root.join(name))
    }

    pub async fn ensure_root(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|err| PhotoError::io(&self.root, err))
    }

    pub async fn exists(&self, name: &str) -> Result<bool> {
        let path = self.path_for(name)?;
        tokio::fs::try_exists(&path)
            .await
            .map_err(|err| PhotoError::io(path, err))
    }

    /// Write `content` under a fresh name and return that name.
    ///
    /// The bytes land in a temp file first and are renamed into place, so a
    /// failed write never leaves a partial blob under a real name.
    pub async fn save(&self, content: &[u8], extension: Option<&str>) -> Result<String> {
        self.ensure_root().await?;

        let name = Self::generate_name(extension);
        let path = self.path_for(&name)?;
        let tmp = self
            .root
            .join(format!("{name}{TEMP_MARKER}{}", Uuid::new_v4().simple()));

        if let Err(err) = write_file(&tmp, content).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(PhotoError::io(tmp, err));
        }

        if let Err(err) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(PhotoError::io(path, err));
        }

        Ok(name)
    }

    pub async fn delete(&self, name: &str) -> Result<()> {
        let path = self.path_for(name)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(PhotoError::BlobMissing(name.to_string()))
            }
            Err(err) => Err(PhotoError::io(path, err)),
        }
    }

    /// Names of every stored blob, sorted. Temp files from in-flight or
    /// interrupted saves are skipped.
    pub async fn list_names(&self) -> Result<Vec<String>> {
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Vec::new());
            }
            Err(err) => return Err(PhotoError::io(&self.root, err)),
        };

        let mut names = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|err| PhotoError::io(&self.root, err))?
        {
            let file_type = entry
                .file_type()
                .await
                .map_err(|err| PhotoError::io(entry.path(), err))?;
            if !file_type.is_file() {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
                continue;
            };
            if name.contains(TEMP_MARKER) || !Self::is_valid_name(&name) {
                continue;
            }
            names.push(name);
        }

        names.sort();
        Ok(names)
    }
}

async fn write_file(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let mut file = tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await?;
    file.write_all(content).await?;
    file.flush().await?;
    file.sync_all().await
}
