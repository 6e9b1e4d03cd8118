//! JSON file repository
//!
//! Keeps the whole policy list in one JSON array on disk. Every save
//! rewrites the file: the list is written to a sibling temp file which is
//! then renamed over the target, so readers never observe a half-written
//! list.

use std::path::{Path, PathBuf};
use std::time::Instant;

use async_trait::async_trait;
use chrono::Utc;
use tokio::fs;

use core_kernel::{AdapterHealth, DomainPort, HealthCheckResult, HealthCheckable, PortError};
use domain_policy::{Policy, PolicyRecord, PolicyRepository};

use crate::error::StorageError;

/// Repository storing the policy list in a single JSON file
#[derive(Debug, Clone)]
pub struct JsonFileRepository {
    path: PathBuf,
}

impl JsonFileRepository {
    /// Creates a repository for the file at `path`
    ///
    /// Nothing is touched on disk until the first load or save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_else(|| "policies.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn directory(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    /// Reads and decodes the stored list
    pub async fn read_records(&self) -> Result<Vec<PolicyRecord>, StorageError> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "No stored policies yet");
                return Ok(Vec::new());
            }
            Err(error) => return Err(StorageError::io(&self.path, error)),
        };

        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&content).map_err(|error| StorageError::malformed(&self.path, error))
    }

    /// Encodes and writes the list, replacing the previous content
    pub async fn write_policies(&self, policies: &[Policy]) -> Result<(), StorageError> {
        let encoded = serde_json::to_vec_pretty(policies)?;

        let directory = self.directory();
        fs::create_dir_all(directory)
            .await
            .map_err(|error| StorageError::io(directory, error))?;

        let temp = self.temp_path();
        fs::write(&temp, &encoded)
            .await
            .map_err(|error| StorageError::io(&temp, error))?;
        fs::rename(&temp, &self.path)
            .await
            .map_err(|error| StorageError::io(&self.path, error))?;

        tracing::debug!(
            path = %self.path.display(),
            policies = policies.len(),
            bytes = encoded.len(),
            "Policies written"
        );
        Ok(())
    }
}

impl DomainPort for JsonFileRepository {}

#[async_trait]
impl HealthCheckable for JsonFileRepository {
    async fn health_check(&self) -> HealthCheckResult {
        let started = Instant::now();
        let directory = self.directory();

        let (status, message) = match fs::metadata(directory).await {
            Ok(metadata) if metadata.permissions().readonly() => (
                AdapterHealth::Degraded,
                Some(format!("{} is read-only", directory.display())),
            ),
            Ok(metadata) if metadata.is_dir() => (AdapterHealth::Healthy, None),
            Ok(_) => (
                AdapterHealth::Unhealthy,
                Some(format!("{} is not a directory", directory.display())),
            ),
            // Created on first save.
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => (
                AdapterHealth::Healthy,
                Some(format!("{} will be created on first save", directory.display())),
            ),
            Err(error) => (AdapterHealth::Unhealthy, Some(error.to_string())),
        };

        HealthCheckResult {
            adapter_id: "json-file-repository".to_string(),
            status,
            latency_ms: started.elapsed().as_millis() as u64,
            message,
            checked_at: Utc::now(),
        }
    }
}

#[async_trait]
impl PolicyRepository for JsonFileRepository {
    async fn load(&self) -> Result<Vec<PolicyRecord>, PortError> {
        Ok(self.read_records().await?)
    }

    async fn save(&self, policies: &[Policy]) -> Result<(), PortError> {
        Ok(self.write_policies(policies).await?)
    }
}
