//! Staging storage
//!
//! Inventory artifacts are written as JSON under a per-project, per-run
//! directory before being uploaded in one go:
//!
//! ```text
//! {root}/{project}/{timestamp}/{resource-type}.json
//! {root}/{project}/{timestamp}/config.json
//! {root}/{project}/latest.json
//! ```

use crate::config::Config;
use crate::error::StoreError;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Format of the run timestamp, UTC with second resolution
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d-%H-%M-%S";

/// Name of the pointer file describing the latest run
pub const LATEST_FILE: &str = "latest.json";

/// Current UTC time formatted as a run timestamp
pub fn now_timestamp() -> String {
    Utc::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Resource types successfully stored during one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub timestamp: String,
    pub processed: Vec<String>,
}

/// Where one inventory run writes its artifacts
#[derive(Debug, Clone)]
pub struct RunContext {
    staging_root: PathBuf,
    project_id: String,
    timestamp: String,
}

impl RunContext {
    pub fn new(staging_root: impl Into<PathBuf>, project_id: &str, timestamp: &str) -> Self {
        Self {
            staging_root: staging_root.into(),
            project_id: project_id.to_string(),
            timestamp: timestamp.to_string(),
        }
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    /// Everything produced for the project; this is what gets uploaded
    pub fn project_dir(&self) -> PathBuf {
        self.staging_root.join(&self.project_id)
    }

    pub fn run_dir(&self) -> PathBuf {
        self.project_dir().join(&self.timestamp)
    }

    pub fn resource_path(&self, resource_type: &str) -> PathBuf {
        self.run_dir().join(format!("{}.json", resource_type))
    }

    pub fn config_path(&self) -> PathBuf {
        self.run_dir().join("config.json")
    }

    pub fn latest_path(&self) -> PathBuf {
        self.project_dir().join(LATEST_FILE)
    }
}

fn write_json<T: Serialize + ?Sized>(
    path: &Path,
    artifact: &str,
    value: &T,
) -> Result<(), StoreError> {
    let content = serde_json::to_string_pretty(value).map_err(|source| StoreError::Json {
        artifact: artifact.to_string(),
        source,
    })?;

    let io_err = |source: std::io::Error| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    std::fs::write(path, content).map_err(io_err)?;

    Ok(())
}

/// Write the records listed for one resource type
pub fn store_resource_list(
    ctx: &RunContext,
    resource_type: &str,
    records: &[Value],
) -> Result<PathBuf, StoreError> {
    let path = ctx.resource_path(resource_type);
    tracing::info!("> Writing inventory to temporary file: {}", path.display());
    write_json(&path, resource_type, records)?;
    Ok(path)
}

/// Write the configuration used for this run
pub fn store_config(ctx: &RunContext, config: &Config) -> Result<PathBuf, StoreError> {
    let path = ctx.config_path();
    tracing::info!("> Writing config to temporary file: {}", path.display());
    write_json(&path, "config", config)?;
    Ok(path)
}

/// Overwrite the latest-run pointer
pub fn store_snapshot(ctx: &RunContext, snapshot: &Snapshot) -> Result<PathBuf, StoreError> {
    let path = ctx.latest_path();
    tracing::info!("> Writing snapshot to temporary file: {}", path.display());
    write_json(&path, "snapshot", snapshot)?;
    Ok(path)
}
