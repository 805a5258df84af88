use crate::SyncOptions;
use crate::config::Credentials;
use crate::manifest::{MANIFEST, ManifestEntry};
use crate::marker::SyncMarker;
use crate::remote::{Connector, RemoteError, RemoteSession, remote_dir};
use anyhow::Context;
use std::fs::File;
use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Why a single file did not make it to the server. Only `ReturnToBase` stops the run.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("cannot change to remote directory {path}: {source}")]
    ChangeDirectory { path: String, source: RemoteError },
    #[error("cannot open {}: {source}", path.display())]
    OpenLocal {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot store '{filename}': {source}")]
    Store {
        filename: String,
        source: RemoteError,
    },
    /// The session could not be put back into the base directory after an upload.
    #[error("cannot return to remote directory {path}: {source}")]
    ReturnToBase { path: String, source: RemoteError },
}

impl UploadError {
    /// Whether the session is left in an unknown state and the run has to stop.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::ReturnToBase { .. })
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Files stored successfully.
    pub uploaded: usize,
    /// Files that qualified for upload but failed.
    pub failed: usize,
}

pub struct SiteSync<C> {
    options: SyncOptions,
    credentials: Credentials,
    connector: C,
}

impl<C: Connector> SiteSync<C> {
    pub fn new(options: SyncOptions, credentials: Credentials, connector: C) -> Self {
        Self {
            options,
            credentials,
            connector,
        }
    }

    /// Uploads every manifest file changed since the last successful run.
    ///
    /// The marker is touched only once the whole manifest has been walked and at least one
    /// file was uploaded, so an interrupted run re-uploads the same files next time.
    pub fn synchronize(&self) -> anyhow::Result<SyncReport> {
        let marker = SyncMarker::new(&self.credentials.last_update_filename);
        let cutoff = marker.cutoff()?;
        tracing::info!(
            "Last update date/time={}",
            chrono::DateTime::<chrono::Utc>::from(cutoff).to_rfc3339()
        );

        let session = self
            .connector
            .connect(&self.credentials)
            .with_context(|| format!("cannot log into '{}'", self.credentials.server))?;
        let mut session = QuitOnDrop::new(session);

        let mut report = SyncReport::default();
        for entry in MANIFEST {
            for local_path in self.changed_files(entry, cutoff)? {
                let Some(filename) = local_path.file_name().and_then(|name| name.to_str()) else {
                    tracing::error!("Skipping '{}': not a UTF-8 file name", local_path.display());
                    report.failed += 1;
                    continue;
                };
                let filename = filename.to_string();
                match upload_file(
                    &mut *session,
                    &local_path,
                    &filename,
                    &self.options.remote_base,
                    entry.sub_path,
                    entry.permissions,
                ) {
                    Ok(()) => report.uploaded += 1,
                    Err(error) if error.is_fatal() => {
                        return Err(error).context("the connection is no longer usable");
                    }
                    Err(error) => {
                        tracing::error!("FAILURE uploading '{filename}': {error}");
                        report.failed += 1;
                    }
                }
            }
        }
        drop(session);

        tracing::info!("Uploaded {} files.", report.uploaded);
        if report.failed > 0 {
            tracing::warn!("{} files failed to upload", report.failed);
        }
        if report.uploaded > 0 {
            marker.touch()?;
        }
        Ok(report)
    }

    /// Files matching `entry` directly inside its directory that need uploading.
    fn changed_files(
        &self,
        entry: &ManifestEntry,
        cutoff: SystemTime,
    ) -> anyhow::Result<Vec<PathBuf>> {
        let mut dir = self.options.source_path.clone();
        if !entry.sub_path.is_empty() {
            dir.push(entry.sub_path);
        }
        let pattern = format!(
            "{}/{}",
            glob::Pattern::escape(&dir.to_string_lossy()),
            entry.file_spec
        );

        // Hidden files such as `.draft.html` are never part of the site.
        let options = glob::MatchOptions {
            require_literal_leading_dot: true,
            ..Default::default()
        };
        let mut files = vec![];
        for path in glob::glob_with(&pattern, options)
            .with_context(|| format!("invalid pattern {pattern}"))?
        {
            let path = match path {
                Ok(path) => path,
                Err(error) => {
                    tracing::warn!("Cannot read {}: {}", error.path().display(), error.error());
                    continue;
                }
            };
            let metadata = match std::fs::metadata(&path) {
                Ok(metadata) => metadata,
                Err(error) => {
                    tracing::warn!("Cannot inspect {}: {error}", path.display());
                    continue;
                }
            };
            if !metadata.is_file() {
                continue;
            }
            if self.options.force_update {
                files.push(path);
                continue;
            }
            match metadata.modified() {
                Ok(modified) if modified > cutoff => files.push(path),
                Ok(_) => tracing::trace!("Unchanged: {}", path.display()),
                Err(error) => {
                    tracing::warn!("Cannot read modification time of {}: {error}", path.display())
                }
            }
        }
        Ok(files)
    }
}

/// Uploads `local_path` as `filename` into `remote_base/sub_path` and sets its permissions.
///
/// Whatever happens, the session is moved back to `remote_base` afterwards so the next
/// upload starts from a known directory.
pub fn upload_file<S: RemoteSession + ?Sized>(
    session: &mut S,
    local_path: &Path,
    filename: &str,
    remote_base: &str,
    sub_path: &str,
    permissions: u32,
) -> Result<(), UploadError> {
    let result = store_file(session, local_path, filename, remote_base, sub_path, permissions);

    let base = remote_dir(remote_base, "");
    if let Err(source) = session.change_dir(&base) {
        if let Err(error) = result {
            tracing::error!("FAILURE uploading '{filename}': {error}");
        }
        return Err(UploadError::ReturnToBase { path: base, source });
    }
    result
}

fn store_file<S: RemoteSession + ?Sized>(
    session: &mut S,
    local_path: &Path,
    filename: &str,
    remote_base: &str,
    sub_path: &str,
    permissions: u32,
) -> Result<(), UploadError> {
    let remote_path = remote_dir(remote_base, sub_path);
    session
        .change_dir(&remote_path)
        .map_err(|source| UploadError::ChangeDirectory {
            path: remote_path.clone(),
            source,
        })?;
    tracing::debug!("Changed directory to {remote_path}");

    let mut file = File::open(local_path).map_err(|source| UploadError::OpenLocal {
        path: local_path.to_path_buf(),
        source,
    })?;
    session
        .store(filename, &mut file)
        .map_err(|source| UploadError::Store {
            filename: filename.to_string(),
            source,
        })?;
    tracing::info!("Uploaded '{filename}' to {remote_path}");

    // Servers without SITE CHMOD still get the file.
    match session.site(&format!("CHMOD {permissions} {filename}")) {
        Ok(reply) => tracing::debug!("Permissions change: '{reply}'"),
        Err(error) => tracing::debug!("Permissions change failed: '{error}'"),
    }
    Ok(())
}

/// Sends `QUIT` when dropped, so the connection is closed on every exit path.
struct QuitOnDrop<S: RemoteSession> {
    session: S,
}

impl<S: RemoteSession> QuitOnDrop<S> {
    fn new(session: S) -> Self {
        Self { session }
    }
}

impl<S: RemoteSession> Deref for QuitOnDrop<S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.session
    }
}

impl<S: RemoteSession> DerefMut for QuitOnDrop<S> {
    fn deref_mut(&mut self) -> &mut S {
        &mut self.session
    }
}

impl<S: RemoteSession> Drop for QuitOnDrop<S> {
    fn drop(&mut self) {
        if let Err(error) = self.session.quit() {
            tracing::debug!("Closing the connection failed: {error}");
        }
    }
}
