//! Deploy procedure
//!
//! Provisions the inventory Cloud Run Job and the Cloud Scheduler trigger
//! that runs it, in dependency order. The bucket and the optional service
//! account must already exist; they are never created here.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::gcloud::builders::{self, Action, JOB_NAME, SCHEDULER_NAME};
use crate::gcloud::checks;
use crate::gcloud::project;
use crate::gcloud::runner::{run_checked, CommandRunner};

/// What the deploy did to each managed resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeployReport {
    pub job: Action,
    pub scheduler: Action,
}

/// Run the deploy sequence against an already validated configuration.
///
/// `config.project_number` is filled in from the project description.
pub fn run<R: CommandRunner + ?Sized>(runner: &R, config: &mut Config) -> Result<DeployReport> {
    let project_id = config.require("ProjectId")?.to_string();
    config.require("TargetBucket")?;
    config.require("JobRegion")?;

    tracing::info!("> Deploying to project: {}", project_id);

    tracing::info!("* Retrieving project description");
    let description = project::describe_project(runner, &project_id)?;
    let project_number = description
        .project_number()
        .ok_or_else(|| Error::UnexpectedOutput {
            action: "retrieve project description".to_string(),
            reason: format!("invalid projectNumber '{}'", description.project_number),
        })?;
    tracing::info!(
        "  Project '{}' ({}) number: {}",
        description.name,
        description.project_id,
        project_number
    );
    if !description.is_active() {
        tracing::warn!(
            "  Project {} lifecycle state is {}",
            description.project_id,
            description.lifecycle_state
        );
    }
    config.project_number = Some(project_number);

    tracing::info!("* Checking if bucket '{}' exists", config.target_bucket);
    if !checks::bucket_exists(runner, config) {
        return Err(Error::PreconditionMissing {
            kind: "bucket",
            name: config.target_bucket.clone(),
        });
    }
    tracing::info!(
        "  Bucket '{}' in project '{}' exists",
        config.target_bucket,
        config.bucket_project()
    );

    if let Some(email) = config.service_account_email.as_deref() {
        tracing::info!("* Checking if service account '{}' exists", email);
        if !checks::service_account_exists(runner, config, email) {
            return Err(Error::PreconditionMissing {
                kind: "service account",
                name: email.to_string(),
            });
        }
        tracing::info!("  Service account '{}' exists", email);
    }

    tracing::info!("* Checking if Cloud Run Job '{}' exists", JOB_NAME);
    let exists = checks::job_exists(runner, config);
    let job = Action::from_exists(exists);
    if exists {
        tracing::info!("  Cloud Run Job '{}' exists", JOB_NAME);
    } else {
        tracing::info!(
            "  Cloud Run Job '{}' does not exist in region: {}",
            JOB_NAME,
            config.job_region
        );
    }

    tracing::info!("> {} Cloud Run Job...", job.progressive());
    run_checked(
        runner,
        &builders::job_deploy(config, exists),
        &format!("{} Cloud Run Job", job.verb()),
    )?;
    tracing::info!("  Cloud Run Job '{}' ready", JOB_NAME);

    tracing::info!("* Checking if Cloud Scheduler '{}' exists", SCHEDULER_NAME);
    let exists = checks::scheduler_exists(runner, config);
    let scheduler = Action::from_exists(exists);
    if exists {
        tracing::info!("  Cloud Scheduler exists");
    } else {
        tracing::info!("  Cloud Scheduler does not exist");
    }

    tracing::info!("> {} Cloud Scheduler...", scheduler.progressive());
    let cmd = builders::scheduler_deploy(config, exists)?;
    run_checked(runner, &cmd, &format!("{} Cloud Scheduler", scheduler.verb()))?;
    tracing::info!("  Cloud Scheduler '{}' ready", SCHEDULER_NAME);

    tracing::info!("! Done");
    Ok(DeployReport { job, scheduler })
}
