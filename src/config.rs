use anyhow::Context;
use std::path::{Path, PathBuf};

pub const DEFAULT_CREDENTIALS_FILE: &str = "creds.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("no source path given, pass the site output directory with --source-path")]
    MissingSourcePath,
}

/// Login details for the FTP server, kept in a private local file.
#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Credentials {
    /// Host name of the server, optionally with a `:port` suffix.
    pub server: String,
    pub user: String,
    pub password: String,
    /// File whose modification time records the last successful upload.
    #[serde(default = "default_last_update_filename")]
    pub last_update_filename: PathBuf,
}

impl Credentials {
    pub fn write(&self, path: &Path) -> anyhow::Result<()> {
        let config = toml::to_string_pretty(self).context("cannot serialize credentials")?;
        std::fs::write(path, config).context("cannot write credentials")?;
        Ok(())
    }

    /// Placeholder values written by `init`.
    pub fn template() -> Self {
        Self {
            server: "ftp.domain.com".to_string(),
            user: "user@domain.com".to_string(),
            password: "password".to_string(),
            last_update_filename: default_last_update_filename(),
        }
    }
}

fn default_last_update_filename() -> PathBuf {
    PathBuf::from("lastupdate.txt")
}

/// Source of the server login and marker file name.
pub trait CredentialProvider {
    fn credentials(&self) -> anyhow::Result<Credentials>;
}

impl CredentialProvider for Credentials {
    fn credentials(&self) -> anyhow::Result<Credentials> {
        Ok(self.clone())
    }
}

/// Credentials stored as TOML on disk.
pub struct CredentialsFile {
    path: PathBuf,
}

impl CredentialsFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `creds.toml` in the working directory if present, otherwise the one in the user's
    /// config directory.
    pub fn locate() -> Self {
        let local = PathBuf::from(DEFAULT_CREDENTIALS_FILE);
        if local.is_file() {
            return Self::new(local);
        }
        match directories::ProjectDirs::from("", "", "site-ftp-sync") {
            Some(dirs) => Self::new(dirs.config_dir().join(DEFAULT_CREDENTIALS_FILE)),
            None => Self::new(local),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialProvider for CredentialsFile {
    fn credentials(&self) -> anyhow::Result<Credentials> {
        load_credentials(&self.path)
    }
}

pub fn load_credentials(path: &Path) -> anyhow::Result<Credentials> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("cannot load credentials file from {}", path.display()))?;
    let credentials: Credentials =
        toml::from_str(&data).context("cannot load credentials as TOML")?;
    Ok(credentials)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_filename_defaults() {
        let credentials: Credentials = toml::from_str(
            r#"
server = "ftp.example.org"
user = "me@example.org"
password = "hunter2"
"#,
        )
        .unwrap();
        assert_eq!(credentials.server, "ftp.example.org");
        assert_eq!(
            credentials.last_update_filename,
            PathBuf::from("lastupdate.txt")
        );
    }

    #[test]
    fn template_is_loadable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CREDENTIALS_FILE);
        Credentials::template().write(&path).unwrap();

        let loaded = CredentialsFile::new(&path).credentials().unwrap();
        assert_eq!(loaded, Credentials::template());
    }

    #[test]
    fn missing_file_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.toml");
        let err = load_credentials(&path).unwrap_err();
        assert!(format!("{err}").contains("nope.toml"));
    }
}
