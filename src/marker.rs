use anyhow::Context;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// A local file whose modification time records the last successful synchronization.
/// Its content is never read.
pub struct SyncMarker {
    path: PathBuf,
}

impl SyncMarker {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Files modified after this instant need uploading. Without a marker every file does.
    pub fn cutoff(&self) -> anyhow::Result<SystemTime> {
        match std::fs::metadata(&self.path) {
            Ok(metadata) => metadata.modified().with_context(|| {
                format!("cannot read modification time of {}", self.path.display())
            }),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(UNIX_EPOCH),
            Err(error) => Err(error)
                .with_context(|| format!("cannot inspect marker {}", self.path.display())),
        }
    }

    /// Sets the marker's modification time to now, creating it if needed.
    pub fn touch(&self) -> anyhow::Result<()> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("cannot open marker {}", self.path.display()))?;
        file.set_modified(SystemTime::now())
            .with_context(|| format!("cannot update marker {}", self.path.display()))?;
        Ok(())
    }
}
