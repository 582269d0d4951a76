use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};

use crate::config::Config;

/// Credential check for the login gate. The static implementation below is
/// a placeholder for a real identity service.
pub trait CredentialCheck {
    fn authenticate(&self, username: &str, password: &str) -> bool;
}

pub struct StaticCredentials {
    username: String,
    password: String,
}

impl StaticCredentials {
    pub fn from_config(config: &Config) -> Self {
        Self {
            username: config.username.clone(),
            password: config.password.clone(),
        }
    }
}

impl CredentialCheck for StaticCredentials {
    fn authenticate(&self, username: &str, password: &str) -> bool {
        username == self.username && password == self.password
    }
}

// --- Session gate ---
//
// The session is a marker file in the data directory. Commands that touch
// application data check it before doing anything else.

fn session_path() -> PathBuf {
    if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "apptrack") {
        proj_dirs.data_dir().join("session")
    } else {
        PathBuf::from(".apptrack-session")
    }
}

pub fn open_session_at(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, "")?;
    Ok(())
}

pub fn close_session_at(path: &Path) -> Result<()> {
    if path.exists() {
        std::fs::remove_file(path)?;
    }
    Ok(())
}

pub fn open_session() -> Result<()> {
    open_session_at(&session_path())
}

pub fn close_session() -> Result<()> {
    close_session_at(&session_path())
}

pub fn is_logged_in() -> bool {
    session_path().exists()
}

pub fn ensure_logged_in() -> Result<()> {
    if !is_logged_in() {
        return Err(anyhow!("Not logged in. Run 'apptrack login' first."));
    }
    Ok(())
}
