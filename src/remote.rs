use crate::config::Credentials;
use std::io::Read;
use suppaftp::types::FileType;
use suppaftp::{FtpError, FtpStream};

pub const DEFAULT_FTP_PORT: u16 = 21;

#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    /// The server answered with a reply code the command does not accept.
    #[error("server replied '{0}'")]
    Rejected(String),
    #[error(transparent)]
    Ftp(FtpError),
}

impl From<FtpError> for RemoteError {
    fn from(error: FtpError) -> Self {
        match error {
            FtpError::UnexpectedResponse(response) => {
                let text = String::from_utf8_lossy(&response.body).trim().to_string();
                Self::Rejected(format!("{} {text}", response.status.code()))
            }
            other => Self::Ftp(other),
        }
    }
}

/// The commands a synchronization run issues over a logged-in connection.
pub trait RemoteSession {
    fn change_dir(&mut self, path: &str) -> Result<(), RemoteError>;

    /// Stores `reader` as `filename` in the current directory, in binary mode.
    /// A transfer completed with 226 counts as success. 250 is accepted as well, since
    /// some servers close the data connection with it after a complete write.
    fn store(&mut self, filename: &str, reader: &mut dyn Read) -> Result<u64, RemoteError>;

    /// Sends `SITE <command>` and returns the server's reply.
    fn site(&mut self, command: &str) -> Result<String, RemoteError>;

    fn quit(&mut self) -> Result<(), RemoteError>;
}

/// Opens authenticated sessions.
pub trait Connector {
    type Session: RemoteSession;

    fn connect(&self, credentials: &Credentials) -> Result<Self::Session, RemoteError>;
}

/// Plain FTP through `suppaftp`.
pub struct FtpConnector;

impl Connector for FtpConnector {
    type Session = FtpSession;

    fn connect(&self, credentials: &Credentials) -> Result<FtpSession, RemoteError> {
        let address = server_address(&credentials.server);
        tracing::debug!("Connecting to '{address}'");
        let mut stream = FtpStream::connect(address.as_str())?;
        stream.login(credentials.user.as_str(), credentials.password.as_str())?;
        stream.transfer_type(FileType::Binary)?;
        tracing::debug!("Logged into '{}'", credentials.server);
        Ok(FtpSession { stream })
    }
}

pub struct FtpSession {
    stream: FtpStream,
}

impl RemoteSession for FtpSession {
    fn change_dir(&mut self, path: &str) -> Result<(), RemoteError> {
        self.stream.cwd(path)?;
        Ok(())
    }

    fn store(&mut self, filename: &str, mut reader: &mut dyn Read) -> Result<u64, RemoteError> {
        Ok(self.stream.put_file(filename, &mut reader)?)
    }

    fn site(&mut self, command: &str) -> Result<String, RemoteError> {
        let response = self.stream.site(command)?;
        let text = String::from_utf8_lossy(&response.body).trim().to_string();
        Ok(format!("{} {text}", response.status.code()))
    }

    fn quit(&mut self) -> Result<(), RemoteError> {
        self.stream.quit()?;
        Ok(())
    }
}

/// `host`, `host:port`, `[v6addr]` or `[v6addr]:port`; the FTP port is assumed when none is
/// given. A bare IPv6 literal is taken to carry no port.
fn server_address(server: &str) -> String {
    if let Some(rest) = server.strip_prefix('[') {
        return match rest.split_once(']') {
            Some((_, port)) if port.starts_with(':') => server.to_string(),
            _ => format!("{server}:{DEFAULT_FTP_PORT}"),
        };
    }
    match server.split_once(':') {
        None => format!("{server}:{DEFAULT_FTP_PORT}"),
        Some((_, port)) if port.parse::<u16>().is_ok() => server.to_string(),
        Some(_) => format!("[{server}]:{DEFAULT_FTP_PORT}"),
    }
}

/// Absolute remote directory for `sub_path` under `remote_base`, e.g. `/www/theme/css`.
/// The FTP root is `/`.
pub fn remote_dir(remote_base: &str, sub_path: &str) -> String {
    let components: Vec<&str> = remote_base
        .split('/')
        .chain(sub_path.split('/'))
        .filter(|component| !component.is_empty() && *component != ".")
        .collect();
    format!("/{}", components.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_dir_joins_base_and_sub_path() {
        assert_eq!(remote_dir("", ""), "/");
        assert_eq!(remote_dir("", "theme/css"), "/theme/css");
        assert_eq!(remote_dir("www", ""), "/www");
        assert_eq!(remote_dir("www", "theme/css"), "/www/theme/css");
        assert_eq!(remote_dir("/www/", "images"), "/www/images");
    }

    #[test]
    fn port_defaults_to_ftp() {
        assert_eq!(server_address("ftp.example.org"), "ftp.example.org:21");
        assert_eq!(server_address("ftp.example.org:2121"), "ftp.example.org:2121");
    }

    #[test]
    fn ipv6_literals() {
        assert_eq!(server_address("::1"), "[::1]:21");
        assert_eq!(server_address("fe80::2:21"), "[fe80::2:21]:21");
        assert_eq!(server_address("[::1]"), "[::1]:21");
        assert_eq!(server_address("[::1]:2121"), "[::1]:2121");
    }
}
