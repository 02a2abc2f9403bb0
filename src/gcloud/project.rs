//! GCP Projects
//!
//! Project metadata and enabled API services, read through gcloud.

use super::builders;
use super::runner::{run_checked, CommandRunner};
use crate::error::{Error, Result};
use serde_json::Value;

/// Project information
#[derive(Debug, Clone)]
pub struct ProjectDescription {
    pub project_id: String,
    pub name: String,
    pub project_number: String,
    pub lifecycle_state: String,
}

impl From<&Value> for ProjectDescription {
    fn from(value: &Value) -> Self {
        let field = |key: &str, default: &str| {
            value
                .get(key)
                .and_then(|v| v.as_str())
                .unwrap_or(default)
                .to_string()
        };

        Self {
            project_id: field("projectId", "-"),
            name: field("name", "-"),
            project_number: field("projectNumber", "-"),
            lifecycle_state: field("lifecycleState", "UNKNOWN"),
        }
    }
}

impl ProjectDescription {
    pub fn project_number(&self) -> Option<u64> {
        self.project_number.parse().ok()
    }

    pub fn is_active(&self) -> bool {
        self.lifecycle_state == "ACTIVE"
    }
}

fn parse_json(output: &str, action: &str) -> Result<Value> {
    serde_json::from_str(output).map_err(|e| Error::UnexpectedOutput {
        action: action.to_string(),
        reason: e.to_string(),
    })
}

/// Describe a project
pub fn describe_project<R: CommandRunner + ?Sized>(
    runner: &R,
    project: &str,
) -> Result<ProjectDescription> {
    let action = "retrieve project description";
    let result = run_checked(runner, &builders::project_describe(project), action)?;
    let value = parse_json(&result.message, action)?;
    Ok(ProjectDescription::from(&value))
}

/// Names of the API services enabled on a project, e.g. `compute.googleapis.com`
pub fn list_enabled_services<R: CommandRunner + ?Sized>(
    runner: &R,
    project: &str,
) -> Result<Vec<String>> {
    let action = "list enabled services";
    let result = run_checked(runner, &builders::services_list_enabled(project), action)?;
    let value = parse_json(&result.message, action)?;

    let services = value
        .as_array()
        .map(|arr| arr.iter().filter_map(service_name).collect())
        .unwrap_or_default();

    Ok(services)
}

/// `config.name` when present, else the last segment of
/// `projects/123/services/compute.googleapis.com`
fn service_name(entry: &Value) -> Option<String> {
    if let Some(name) = entry
        .get("config")
        .and_then(|c| c.get("name"))
        .and_then(|v| v.as_str())
    {
        return Some(name.to_string());
    }

    entry
        .get("name")
        .and_then(|v| v.as_str())
        .map(|name| name.rsplit('/').next().unwrap_or(name).to_string())
}
