use crate::domain::session::Session;
use crate::utils::error::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// Keeps the current session in a small JSON file between CLI invocations.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `{config_dir}/trinity/session.json`, or `./.trinity-session.json`
    /// on platforms without a config directory.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .map(|dir| dir.join("trinity").join("session.json"))
            .unwrap_or_else(|| PathBuf::from(".trinity-session.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Option<Session>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let data = fs::read(&self.path)?;
        match serde_json::from_slice(&data) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                tracing::warn!(
                    "⚠️ Ignoring unreadable session file {}: {}",
                    self.path.display(),
                    e
                );
                Ok(None)
            }
        }
    }

    pub fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_vec_pretty(session)?)?;
        tracing::debug!("Session saved to {}", self.path.display());
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
