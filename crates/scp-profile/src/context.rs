//! On-disk profile layout
//!
//! ```text
//! <home>/.cmp/.configurations   non-credential attributes
//! <home>/.cmp/.credentials      credential attributes
//! <home>/.cmp/.cmplock          empty; its mtime marks the last session start
//! ```

use crate::codec;
use crate::error::{ProfileError, Result};
use crate::legacy::{LEGACY_DIR_NAME, LegacyLayout};
use crate::profile::{CONFIGURATIONS, CREDENTIALS, Profile, ProfileSet};
use chrono::{DateTime, Utc};
use std::fs::{self, File, FileTimes, OpenOptions};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

pub const CONFIG_DIR_NAME: &str = ".cmp";
pub const CONFIGURATIONS_FILE: &str = ".configurations";
pub const CREDENTIALS_FILE: &str = ".credentials";
pub const LOCK_FILE: &str = ".cmplock";

/// Overrides the profile directory
pub const ENV_CONFIG_DIR: &str = "SCP_TF_CONFIG_DIR";

/// Advisory session marker
///
/// Touching the marker bumps its mtime to advertise that a session started.
/// It never excludes other processes: concurrent sessions all touch it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockMarker {
    path: PathBuf,
}

impl LockMarker {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Create the marker if absent, otherwise update its access and modification times
    pub fn touch(&self) -> std::io::Result<()> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let now = SystemTime::now();
        file.set_times(FileTimes::new().set_accessed(now).set_modified(now))
    }

    /// Last time a session touched the marker
    pub fn modified(&self) -> Option<DateTime<Utc>> {
        let modified = fs::metadata(&self.path).ok()?.modified().ok()?;
        Some(DateTime::<Utc>::from(modified))
    }
}

/// Where profiles live on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileContext {
    config_dir: PathBuf,
    configurations_file: String,
    credentials_file: String,
    lock_file: String,
    legacy_dir: Option<PathBuf>,
}

impl ProfileContext {
    /// Context for the current user
    ///
    /// `SCP_TF_CONFIG_DIR` wins over `<home>/.cmp`. Only the home-based
    /// context falls back to the JSON layout under `<home>/.scp`.
    pub fn new() -> Result<Self> {
        if let Ok(dir) = std::env::var(ENV_CONFIG_DIR)
            && !dir.is_empty()
        {
            return Ok(Self::with_dir(dir));
        }

        let home = dirs::home_dir().ok_or(ProfileError::HomeDirNotFound)?;
        Ok(Self::with_dir(home.join(CONFIG_DIR_NAME)).with_legacy_dir(home.join(LEGACY_DIR_NAME)))
    }

    /// Context rooted at an explicit directory, without a legacy fallback
    pub fn with_dir(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
            configurations_file: CONFIGURATIONS_FILE.to_string(),
            credentials_file: CREDENTIALS_FILE.to_string(),
            lock_file: LOCK_FILE.to_string(),
            legacy_dir: None,
        }
    }

    /// Read the JSON layout in `dir` when the profile files leave gaps
    pub fn with_legacy_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.legacy_dir = Some(dir.into());
        self
    }

    pub fn legacy_layout(&self) -> Option<LegacyLayout> {
        self.legacy_dir.as_ref().map(|dir| LegacyLayout::with_dir(dir.clone()))
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn configurations_path(&self) -> PathBuf {
        self.config_dir.join(&self.configurations_file)
    }

    pub fn credentials_path(&self) -> PathBuf {
        self.config_dir.join(&self.credentials_file)
    }

    pub fn lock_path(&self) -> PathBuf {
        self.config_dir.join(&self.lock_file)
    }

    /// Path of a logical profile file (`credentials` or `configurations`)
    pub fn path_for(&self, logical_name: &str) -> Result<PathBuf> {
        match logical_name {
            CREDENTIALS => Ok(self.credentials_path()),
            CONFIGURATIONS => Ok(self.configurations_path()),
            other => Err(ProfileError::UnknownProfileFile(other.to_string())),
        }
    }

    /// Create the profile directory if it does not exist yet
    pub fn ensure_config_directory(&self) -> Result<()> {
        if self.config_dir.is_dir() {
            return Ok(());
        }

        let mut builder = fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(0o777);
        }
        builder
            .create(&self.config_dir)
            .map_err(|e| ProfileError::FileError {
                path: self.config_dir.clone(),
                message: e.to_string(),
            })?;

        tracing::debug!("Created profile directory: {}", self.config_dir.display());
        Ok(())
    }

    pub fn lock_marker(&self) -> LockMarker {
        LockMarker::new(self.lock_path())
    }

    /// Create or touch the lock marker
    ///
    /// Failures are logged and otherwise ignored.
    pub fn ensure_lock_file(&self) -> LockMarker {
        let marker = self.lock_marker();
        if let Err(e) = marker.touch() {
            tracing::warn!(
                path = %marker.path().display(),
                error = %e,
                "Could not touch session marker"
            );
        }
        marker
    }

    /// Prepare the directory and advertise a new session
    #[tracing::instrument(skip(self), fields(config_dir = %self.config_dir.display()))]
    pub fn start_session(&self) -> Result<LockMarker> {
        self.ensure_config_directory()?;
        Ok(self.ensure_lock_file())
    }

    /// Load a single logical profile file
    pub fn load_profile(&self, logical_name: &str) -> Result<Profile> {
        let path = self.path_for(logical_name)?;
        let file = File::open(&path).map_err(|e| ProfileError::FileError {
            path: path.clone(),
            message: e.to_string(),
        })?;
        codec::decode(logical_name, BufReader::new(file))
    }

    /// Load the credentials and configurations files
    ///
    /// A missing, unreadable or malformed file is left out of the returned
    /// set instead of failing the whole load.
    #[tracing::instrument(skip(self), fields(config_dir = %self.config_dir.display()))]
    pub fn load_profiles(&self) -> ProfileSet {
        let mut set = ProfileSet::new(self.config_dir.display().to_string());

        for logical_name in [CREDENTIALS, CONFIGURATIONS] {
            match self.load_profile(logical_name) {
                Ok(profile) => set.insert(logical_name, profile),
                Err(ProfileError::FileError { path, message }) => {
                    tracing::debug!(
                        path = %path.display(),
                        "Profile file not loaded: {}",
                        message
                    );
                }
                Err(e) => {
                    tracing::warn!(file = logical_name, error = %e, "Skipping malformed profile file");
                }
            }
        }

        tracing::debug!("Loaded {} profile files", set.len());
        set
    }

    /// Write a logical profile file, replacing its previous content
    pub fn save_profile(&self, logical_name: &str, profile: &Profile) -> Result<()> {
        let path = self.path_for(logical_name)?;
        self.ensure_config_directory()?;

        let file = File::create(&path).map_err(|e| ProfileError::FileError {
            path: path.clone(),
            message: e.to_string(),
        })?;
        codec::encode(profile, BufWriter::new(file))?;

        tracing::debug!(path = %path.display(), sections = profile.len(), "Saved profile file");
        Ok(())
    }
}
