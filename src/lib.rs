use std::path::PathBuf;

pub mod config;
pub mod manifest;
pub mod marker;
pub mod remote;
pub mod sync;
pub mod utils;

/// What a single run should synchronize, and how.
#[derive(Clone, Debug)]
pub struct SyncOptions {
    /// Local site output directory, e.g. Pelican's `output/`.
    pub source_path: PathBuf,
    /// Directory on the server the site lives under. Empty means the FTP root.
    pub remote_base: String,
    /// Upload every matching file, ignoring the last synchronization time.
    pub force_update: bool,
}

impl SyncOptions {
    pub fn new(
        source_path: impl Into<PathBuf>,
        remote_base: impl Into<String>,
        force_update: bool,
    ) -> Result<Self, config::ConfigError> {
        let source_path = source_path.into();
        if source_path.as_os_str().is_empty() {
            return Err(config::ConfigError::MissingSourcePath);
        }
        Ok(Self {
            source_path,
            remote_base: remote_base.into(),
            force_update,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_source_path_is_rejected() {
        let err = SyncOptions::new("", "www", false).unwrap_err();
        assert!(matches!(err, config::ConfigError::MissingSourcePath));
    }

    #[test]
    fn remote_base_may_be_empty() {
        let options = SyncOptions::new("output", "", true).unwrap();
        assert_eq!(options.source_path, PathBuf::from("output"));
        assert!(options.remote_base.is_empty());
        assert!(options.force_update);
    }
}
