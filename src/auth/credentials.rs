//! Credential storage for the Dropline client.
//!
//! This module provides the token pair type and the file engine that
//! persists it to `~/.dropline/credentials.json`.

use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::PathBuf;

/// The credentials directory name.
const CREDENTIALS_DIR: &str = ".dropline";

/// The credentials file name.
const CREDENTIALS_FILE: &str = "credentials.json";

/// A bearer credential pair for the Dropline API.
///
/// Both halves travel together: a pair is created whole on login or
/// refresh and replaced whole on every rotation. A missing half means
/// there is no session, which is why the store holds `Option<TokenPair>`
/// rather than a pair of optional fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenPair {
    /// Short-lived access token attached to requests.
    pub access_token: String,
    /// Long-lived refresh token presented to the renew endpoint.
    pub refresh_token: String,
}

impl TokenPair {
    /// Create a new token pair.
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }
}

/// Manages credential storage and retrieval on disk.
#[derive(Debug)]
pub struct CredentialsManager {
    /// Path to the credentials file.
    credentials_path: PathBuf,
}

impl CredentialsManager {
    /// Create a new CredentialsManager using the default location.
    ///
    /// Returns `None` if the home directory cannot be determined.
    pub fn new() -> Option<Self> {
        let home = dirs::home_dir()?;
        let credentials_path = home.join(CREDENTIALS_DIR).join(CREDENTIALS_FILE);
        Some(Self { credentials_path })
    }

    /// Create a CredentialsManager reading and writing a specific file.
    pub fn with_path(credentials_path: PathBuf) -> Self {
        Self { credentials_path }
    }

    /// Get the path to the credentials file.
    pub fn credentials_path(&self) -> &PathBuf {
        &self.credentials_path
    }

    /// Load the stored pair.
    ///
    /// Returns `None` if the file doesn't exist, can't be read, or doesn't
    /// contain a complete pair. A corrupt file reads the same as no file;
    /// the caller re-authenticates either way.
    pub fn load(&self) -> Option<TokenPair> {
        if !self.credentials_path.exists() {
            return None;
        }

        let file = match File::open(&self.credentials_path) {
            Ok(f) => f,
            Err(_) => return None,
        };

        let reader = BufReader::new(file);
        match serde_json::from_reader(reader) {
            Ok(pair) => Some(pair),
            Err(_) => None,
        }
    }

    /// Save a pair to the credentials file.
    ///
    /// Creates the parent directory if it doesn't exist.
    /// Returns `true` if successful, `false` otherwise.
    pub fn save(&self, pair: &TokenPair) -> bool {
        // Ensure the parent directory exists
        if let Some(parent) = self.credentials_path.parent() {
            if !parent.exists() && fs::create_dir_all(parent).is_err() {
                return false;
            }
        }

        let file = match File::create(&self.credentials_path) {
            Ok(f) => f,
            Err(_) => return false,
        };

        let mut writer = BufWriter::new(file);
        if serde_json::to_writer_pretty(&mut writer, pair).is_err() {
            return false;
        }

        writer.flush().is_ok()
    }

    /// Clear the stored pair.
    ///
    /// Removes the credentials file if it exists.
    /// Returns `true` if successful or the file didn't exist, `false` otherwise.
    pub fn clear(&self) -> bool {
        if !self.credentials_path.exists() {
            return true;
        }

        fs::remove_file(&self.credentials_path).is_ok()
    }
}
