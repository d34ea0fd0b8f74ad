use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// The username/password pair resent on every protected request.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

// Keep passwords out of debug output and log lines.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Client-side state. "Logged in" only decides which menu entries are shown;
/// the server never sees it. The credentials themselves are what authorize.
#[derive(Debug, Default)]
pub struct Session {
    credentials: Option<Credentials>,
    artifacts: Vec<PathBuf>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn login(&mut self, username: String, password: String) {
        self.credentials = Some(Credentials { username, password });
    }

    /// Forgets the credentials. Rendered pages stay until `cleanup_artifacts`.
    pub fn clear(&mut self) {
        self.credentials = None;
    }

    pub fn is_logged_in(&self) -> bool {
        self.credentials.is_some()
    }

    pub fn username(&self) -> Option<&str> {
        self.credentials.as_ref().map(|c| c.username.as_str())
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    /// Remembers a file we wrote so it gets deleted later.
    pub fn track_artifact(&mut self, path: PathBuf) {
        if !self.artifacts.contains(&path) {
            self.artifacts.push(path);
        }
    }

    pub fn artifacts(&self) -> &[PathBuf] {
        &self.artifacts
    }

    /// Best-effort delete of every tracked file. Failures are logged at debug
    /// level and otherwise ignored.
    pub fn cleanup_artifacts(&mut self) {
        for path in self.artifacts.drain(..) {
            remove_quietly(&path);
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.cleanup_artifacts();
    }
}

fn remove_quietly(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => log::debug!("removed {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => log::debug!("could not remove {}: {}", path.display(), e),
    }
}
