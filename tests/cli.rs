use std::process::Command;

fn site_ftp_sync() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_site-ftp-sync"));
    cmd.env_remove("RUST_LOG")
        .env_remove("SITE_FTP_SYNC_CREDENTIALS");
    cmd
}

#[test]
fn empty_source_path_exits_before_connecting() {
    let dir = tempfile::tempdir().unwrap();
    // Points at an unreachable server: reaching the network stage would fail differently.
    std::fs::write(
        dir.path().join("creds.toml"),
        "server = \"127.0.0.1:1\"\nuser = \"u\"\npassword = \"p\"\n",
    )
    .unwrap();

    let output = site_ftp_sync()
        .current_dir(dir.path())
        .args(["--source-path", ""])
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no source path given"), "{stderr}");
    assert!(!stderr.contains("cannot log into"), "{stderr}");
}

#[test]
fn init_writes_credentials_template() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("creds.toml");

    let output = site_ftp_sync()
        .args(["--credentials", path.to_str().unwrap(), "init"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.contains("server = \"ftp.domain.com\""), "{written}");
    assert!(written.contains("last_update_filename"), "{written}");
}

#[test]
fn unknown_log_level_is_rejected() {
    let output = site_ftp_sync()
        .args(["--source-path", "output", "--log-level", "chatty"])
        .output()
        .unwrap();

    assert!(!output.status.success());
}
