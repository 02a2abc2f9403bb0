//! Inventory procedure
//!
//! Lists every supported resource type of the target project, stages the
//! results as JSON and uploads the staging directory to the target bucket.
//!
//! Per resource type the run is best effort: a listing or write failure
//! drops that type and the run goes on. The config and the snapshot index
//! the run, so failing to write either one aborts it.

use crate::config::Config;
use crate::error::Result;
use crate::gcloud::builders;
use crate::gcloud::project;
use crate::gcloud::runner::{run_checked, CommandRunner};
use crate::resource::{list_resource, Registry};
use crate::store::{self, RunContext, Snapshot};
use std::path::Path;

/// Run one inventory pass, staging under `staging_root`
pub fn run<R: CommandRunner + ?Sized>(
    runner: &R,
    registry: &Registry,
    config: &Config,
    staging_root: &Path,
) -> Result<Snapshot> {
    let project_id = config.require("ProjectId")?;
    config.require("TargetBucket")?;

    let ctx = RunContext::new(staging_root, project_id, &store::now_timestamp());
    run_in(runner, registry, config, &ctx)
}

/// Run one inventory pass within an existing run context
pub fn run_in<R: CommandRunner + ?Sized>(
    runner: &R,
    registry: &Registry,
    config: &Config,
    ctx: &RunContext,
) -> Result<Snapshot> {
    let project_id = config.require("ProjectId")?;

    tracing::info!("> Inventoring project: {}", project_id);
    tracing::info!(
        "> Bucket: gs://{} in project '{}'",
        config.target_bucket,
        config.bucket_project()
    );

    tracing::debug!("Known resource types: {}", registry.keys().join(", "));
    for name in config.services.keys() {
        if registry.get(name).is_none() {
            tracing::warn!("Services entry '{}' matches no known resource type", name);
        }
    }

    let enabled = project::list_enabled_services(runner, project_id)?;
    let resource_types = registry.supported(&enabled, config);
    tracing::info!(
        "> {} enabled service(s), {} supported resource type(s)",
        enabled.len(),
        resource_types.len()
    );

    let locations = config.locations();
    let mut processed = Vec::new();

    for resource_type in resource_types {
        if resource_type.requires_location && locations.is_empty() {
            tracing::warn!(
                "No target locations configured; {} will be empty",
                resource_type.key
            );
        }

        let records = list_resource(runner, project_id, resource_type, &locations);

        match store::store_resource_list(ctx, &resource_type.key, &records) {
            Ok(_) => processed.push(resource_type.key.clone()),
            Err(e) => {
                tracing::error!("Skipping {}: {}", resource_type.key, e);
            },
        }
    }

    store::store_config(ctx, config)?;

    let snapshot = Snapshot {
        timestamp: ctx.timestamp().to_string(),
        processed,
    };
    store::store_snapshot(ctx, &snapshot)?;

    let upload = builders::upload_directory(config, &ctx.project_dir());
    tracing::info!("> Uploading {} to gs://{}", ctx.project_dir().display(), config.target_bucket);
    run_checked(runner, &upload, "upload inventory")?;

    tracing::info!("! Done: {} resource type(s) inventoried", snapshot.processed.len());
    Ok(snapshot)
}
