use anyhow::Context;
use clap::Parser;
use site_ftp_sync::SyncOptions;
use site_ftp_sync::config::{CredentialProvider, Credentials, CredentialsFile};
use site_ftp_sync::remote::FtpConnector;
use site_ftp_sync::sync::SiteSync;
use site_ftp_sync::utils::{LogLevel, init_logging};
use std::path::PathBuf;

/// Upload the parts of a generated static site that changed since the last run.
#[derive(clap::Parser)]
#[command(version)]
struct Args {
    #[clap(subcommand)]
    cmd: Option<Command>,
    /// Path to the site output directory.
    #[clap(long, short = 's', alias = "source_path", default_value = "")]
    source_path: PathBuf,
    /// The base directory on the FTP server to store the files.
    #[clap(long, short = 'r', alias = "remote_base", default_value = "")]
    remote_base: String,
    /// Update (overwrite) files even if they are unchanged since the last update.
    /// Note: does not check dates of remote files.
    #[clap(long, short = 'f', alias = "force_update")]
    force_update: bool,
    #[clap(long, short = 'l', value_enum, ignore_case = true, default_value_t = LogLevel::Info)]
    log_level: LogLevel,
    /// TOML file with the server login and the last-update marker name.
    #[clap(long, env = "SITE_FTP_SYNC_CREDENTIALS")]
    credentials: Option<PathBuf>,
}

#[derive(clap::Parser)]
enum Command {
    /// Write a credentials template to fill in.
    Init,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.log_level)?;

    let credentials = match &args.credentials {
        Some(path) => CredentialsFile::new(path),
        None => CredentialsFile::locate(),
    };

    match args.cmd {
        Some(Command::Init) => {
            let path = credentials.path();
            if path.is_file() {
                println!("{} already exists, not doing anything with it", path.display());
                return Ok(());
            }
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("cannot create {}", parent.display()))?;
            }
            Credentials::template()
                .write(path)
                .context("cannot write credentials")?;
            println!("Created credentials file at {}", path.display());
        }
        None => {
            let options = match SyncOptions::new(
                args.source_path,
                args.remote_base,
                args.force_update,
            ) {
                Ok(options) => options,
                Err(error) => {
                    eprintln!("{error}");
                    std::process::exit(1);
                }
            };
            let credentials = credentials
                .credentials()
                .context("cannot load credentials. Run the `init` command to create them.")?;
            SiteSync::new(options, credentials, FtpConnector).synchronize()?;
        }
    }

    Ok(())
}
