//! Command builders
//!
//! Pure functions turning configuration values into gcloud invocations.
//! Describe commands are quiet: "not found" is an expected outcome for them.

use super::command::GcloudCommand;
use crate::config::{Config, DISABLED_SERVICES_ENV};
use crate::error::ConfigError;
use crate::resource::ResourceType;
use std::path::Path;

/// Name of the Cloud Run Job performing the inventory
pub const JOB_NAME: &str = "gcp-inventory";

/// Name of the Cloud Scheduler job triggering [`JOB_NAME`]
pub const SCHEDULER_NAME: &str = "gcp-inventory-schedule";

/// Create or update, chosen from a prior existence check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Create,
    Update,
}

impl Action {
    pub fn from_exists(exists: bool) -> Self {
        if exists {
            Action::Update
        } else {
            Action::Create
        }
    }

    pub fn verb(self) -> &'static str {
        match self {
            Action::Create => "create",
            Action::Update => "update",
        }
    }

    /// Progress form used in log lines
    pub fn progressive(self) -> &'static str {
        match self {
            Action::Create => "Creating",
            Action::Update => "Updating",
        }
    }
}

// =============================================================================
// Project
// =============================================================================

pub fn project_describe(project: &str) -> GcloudCommand {
    GcloudCommand::new(["projects", "describe", project]).json_output()
}

pub fn services_list_enabled(project: &str) -> GcloudCommand {
    GcloudCommand::new(["services", "list", "--enabled"])
        .flag("--project", project)
        .json_output()
}

// =============================================================================
// Cloud Storage
// =============================================================================

pub fn bucket_describe(config: &Config) -> GcloudCommand {
    GcloudCommand::new(["storage", "buckets", "describe"])
        .arg(format!("gs://{}", config.target_bucket))
        .flag("--project", config.bucket_project())
        .json_output()
        .quiet()
}

/// Recursive copy of a local directory into the target bucket
pub fn upload_directory(config: &Config, dir: &Path) -> GcloudCommand {
    GcloudCommand::new(["storage", "cp", "--recursive"])
        .arg(dir.display().to_string())
        .arg(format!("gs://{}/", config.target_bucket))
        .flag("--project", config.bucket_project())
}

// =============================================================================
// IAM
// =============================================================================

pub fn service_account_describe(config: &Config, email: &str) -> GcloudCommand {
    GcloudCommand::new(["iam", "service-accounts", "describe", email])
        .flag("--project", &config.project_id)
        .json_output()
        .quiet()
}

/// Default compute identity used by the scheduler to invoke the job
pub fn compute_service_account(project_number: u64) -> String {
    format!("{}-compute@developer.gserviceaccount.com", project_number)
}

// =============================================================================
// Cloud Run Job
// =============================================================================

pub fn job_describe(config: &Config) -> GcloudCommand {
    GcloudCommand::new(["run", "jobs", "describe", JOB_NAME])
        .flag("--region", &config.job_region)
        .flag("--project", &config.project_id)
        .json_output()
        .quiet()
}

/// Environment handed to the job so it can resolve its config at runtime.
///
/// Uses gcloud's `^@^` alternate delimiter since locations contain commas.
pub fn job_env_vars(config: &Config) -> String {
    let disabled = config.disabled_services().join(",");
    let pairs = [
        ("PROJECT_ID", config.project_id.as_str()),
        ("TARGET_LOCATIONS", config.target_locations.as_str()),
        ("TARGET_BUCKET", config.target_bucket.as_str()),
        ("TARGET_BUCKET_PROJECT", config.bucket_project()),
        (DISABLED_SERVICES_ENV, disabled.as_str()),
    ];

    let joined = pairs
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("@");

    format!("^@^{}", joined)
}

pub fn job_deploy(config: &Config, exists: bool) -> GcloudCommand {
    let action = Action::from_exists(exists);

    GcloudCommand::new(["run", "jobs", action.verb(), JOB_NAME])
        .flag("--image", config.image_ref())
        .flag("--region", &config.job_region)
        .flag("--project", &config.project_id)
        .flag("--args", "inventory")
        .flag("--set-env-vars", job_env_vars(config))
        .optional("--service-account", config.service_account_email.as_deref())
        .json_output()
}

// =============================================================================
// Cloud Scheduler
// =============================================================================

/// Cloud Run Admin v1 endpoint that starts an execution of the job
pub fn job_run_uri(region: &str, project: &str) -> String {
    format!(
        "https://{}-run.googleapis.com/apis/run.googleapis.com/v1/namespaces/{}/jobs/{}:run",
        region, project, JOB_NAME
    )
}

pub fn scheduler_describe(config: &Config) -> GcloudCommand {
    GcloudCommand::new(["scheduler", "jobs", "describe", SCHEDULER_NAME])
        .flag("--location", &config.job_region)
        .flag("--project", &config.project_id)
        .json_output()
        .quiet()
}

pub fn scheduler_deploy(config: &Config, exists: bool) -> Result<GcloudCommand, ConfigError> {
    let project_number = config
        .project_number
        .ok_or(ConfigError::MissingField("ProjectNumber"))?;
    let action = Action::from_exists(exists);

    Ok(
        GcloudCommand::new(["scheduler", "jobs", action.verb(), "http", SCHEDULER_NAME])
            .flag("--location", &config.job_region)
            .optional("--schedule", config.schedule.as_deref())
            .flag("--uri", job_run_uri(&config.job_region, &config.project_id))
            .flag("--http-method", "POST")
            .flag(
                "--oauth-service-account-email",
                compute_service_account(project_number),
            )
            .flag("--project", &config.project_id)
            .json_output(),
    )
}

// =============================================================================
// Listings
// =============================================================================

/// List instances of one resource type.
///
/// A supplied location becomes `--location` for types that need a location
/// qualifier and `--region` otherwise; without one the listing is global.
/// Failures are left to the caller to classify and log.
pub fn list(project: &str, resource: &ResourceType, location: Option<&str>) -> GcloudCommand {
    let location_flag = if resource.requires_location {
        "--location"
    } else {
        "--region"
    };

    GcloudCommand::new(resource.group.iter().map(String::as_str))
        .arg("list")
        .flag("--project", project)
        .optional(location_flag, location)
        .json_output()
        .quiet()
}
