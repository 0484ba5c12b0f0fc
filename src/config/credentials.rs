// BMC credentials, read from disk on every push

use crate::error::SyncError;
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Locations of the files holding a BMC's username and password
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CredentialPaths {
    #[serde(default)]
    pub username_file: PathBuf,
    #[serde(default)]
    pub password_file: PathBuf,
}

impl CredentialPaths {
    /// Read both credential files
    ///
    /// Never cached: a rotated password is picked up on the next push.
    pub fn read(&self) -> Result<Credentials, SyncError> {
        Ok(Credentials {
            username: read_secret(&self.username_file)?,
            password: read_secret(&self.password_file)?,
        })
    }
}

fn read_secret(path: &Path) -> Result<String, SyncError> {
    // Blocking read; secret files are a few bytes
    let contents = fs::read_to_string(path).map_err(|source| SyncError::Credentials {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(contents.trim().to_string())
}

/// Username/password pair handed to the vendor tool
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
