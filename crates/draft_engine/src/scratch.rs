use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::{Builder, NamedTempFile};

/// Ensure the scratch directory exists; create if missing.
pub fn ensure_scratch_dir(dir: &Path) -> io::Result<()> {
    if dir.exists() {
        let meta = fs::metadata(dir)?;
        if !meta.is_dir() {
            return Err(io::Error::other(format!(
                "scratch path {} is not a directory",
                dir.display()
            )));
        }
        return Ok(());
    }
    fs::create_dir_all(dir)
}

/// Temporary file holding one downloaded cover image.
///
/// The name is unique per upload (`cover-{upload_id}-XXXX.{ext}`) and the
/// file is deleted when the value is released or dropped, whichever comes
/// first.
pub struct ScratchFile {
    inner: NamedTempFile,
    file_name: String,
}

impl ScratchFile {
    pub fn create(dir: &Path, upload_id: &str, extension: &str) -> io::Result<Self> {
        let prefix = format!("cover-{upload_id}-");
        let suffix = format!(".{extension}");
        let inner = Builder::new()
            .prefix(&prefix)
            .suffix(&suffix)
            .tempfile_in(dir)?;
        let file_name = inner
            .path()
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| format!("cover-{upload_id}{suffix}"));
        Ok(Self { inner, file_name })
    }

    pub fn path(&self) -> &Path {
        self.inner.path()
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Async handle for streaming bytes into the file.
    pub fn writer(&self) -> io::Result<tokio::fs::File> {
        let file = self.inner.as_file().try_clone()?;
        Ok(tokio::fs::File::from_std(file))
    }

    /// Delete the file now, reporting any error. Returns the removed path.
    pub fn release(self) -> io::Result<PathBuf> {
        let path = self.inner.path().to_path_buf();
        self.inner.close()?;
        Ok(path)
    }
}
