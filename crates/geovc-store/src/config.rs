use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::traits::ConfigStore;

/// Format/version identity of a storage backend.
///
/// Recorded in the repository's [`ConfigStore`] on first open as
/// `storage.<kind>=<name>` and `<name>.version=<version>`. Subsequent
/// opens verify the recorded values and refuse the connection on
/// mismatch, so a repository created by one backend version is never
/// silently reinterpreted by another.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StorageFormat {
    /// Which store this format describes ("objects", "staging", "graph", "refs").
    pub kind: String,
    /// Backend implementation name (e.g. "memory").
    pub name: String,
    /// Backend format version (semver string).
    pub version: String,
}

impl StorageFormat {
    pub fn new(
        kind: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            kind: kind.into(),
            name: name.into(),
            version: version.into(),
        }
    }

    fn storage_key(&self) -> String {
        format!("storage.{}", self.kind)
    }

    fn version_key(&self) -> String {
        format!("{}.version", self.name)
    }

    /// Record this format in the config store (first open).
    pub fn configure(&self, config: &dyn ConfigStore) -> StoreResult<()> {
        config.put_config(&self.storage_key(), &self.name)?;
        config.put_config(&self.version_key(), &self.version)?;
        debug!(kind = %self.kind, name = %self.name, version = %self.version, "configured storage format");
        Ok(())
    }

    /// Verify a previously recorded format, failing with
    /// `RepositoryConnection` naming expected vs. found values.
    pub fn verify(&self, config: &dyn ConfigStore) -> StoreResult<()> {
        let found_name = config.get_config(&self.storage_key())?;
        if found_name.as_deref() != Some(self.name.as_str()) {
            return Err(StoreError::RepositoryConnection {
                expected: format!("{}={}", self.storage_key(), self.name),
                found: format!(
                    "{}={}",
                    self.storage_key(),
                    found_name.as_deref().unwrap_or("<unset>")
                ),
            });
        }

        let found_version = config.get_config(&self.version_key())?;
        if found_version.as_deref() != Some(self.version.as_str()) {
            return Err(StoreError::RepositoryConnection {
                expected: format!("{}={}", self.version_key(), self.version),
                found: format!(
                    "{}={}",
                    self.version_key(),
                    found_version.as_deref().unwrap_or("<unset>")
                ),
            });
        }

        Ok(())
    }

    /// Record the format if unset, verify it otherwise.
    pub fn configure_or_verify(&self, config: &dyn ConfigStore) -> StoreResult<()> {
        if config.get_config(&self.storage_key())?.is_none() {
            self.configure(config)
        } else {
            self.verify(config)
        }
    }
}
