//! Resource listing
//!
//! Lists instances of a resource type, fanning out over locations when the
//! type needs a location qualifier. A failed listing never aborts the run:
//! it contributes an empty result.

use super::registry::ResourceType;
use crate::gcloud::builders;
use crate::gcloud::runner::CommandRunner;
use serde_json::Value;

/// gcloud error text returned when a location does not host a resource type
const LOCATION_UNSUPPORTED_PATTERN: &str = "INVALID_ARGUMENT: Location";

/// Why a listing command failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingFailure {
    /// The location does not support this resource type; benign
    LocationUnsupported,
    Other,
}

/// Classify the error text of a failed listing
pub fn classify_listing_failure(message: &str) -> ListingFailure {
    if message.contains(LOCATION_UNSUPPORTED_PATTERN) {
        ListingFailure::LocationUnsupported
    } else {
        ListingFailure::Other
    }
}

/// Parse `--format json` listing output into opaque records
pub fn parse_records(output: &str) -> Result<Vec<Value>, serde_json::Error> {
    if output.trim().is_empty() {
        return Ok(Vec::new());
    }

    match serde_json::from_str(output)? {
        Value::Array(items) => Ok(items),
        Value::Null => Ok(Vec::new()),
        other => Ok(vec![other]),
    }
}

/// List one resource type in one location, or globally
pub fn list_in<R: CommandRunner + ?Sized>(
    runner: &R,
    project: &str,
    resource: &ResourceType,
    location: Option<&str>,
) -> Vec<Value> {
    tracing::info!(
        "* Retrieving {} instance(s) from location({}) ...",
        resource.display_name,
        location.unwrap_or("all")
    );

    let result = runner.run(&builders::list(project, resource, location));

    if !result.success {
        match classify_listing_failure(&result.message) {
            ListingFailure::LocationUnsupported => tracing::info!(
                "  {} not supported in location {}",
                resource.key,
                location.unwrap_or("-")
            ),
            ListingFailure::Other => tracing::error!(
                "Failed to list {}: {}",
                resource.key,
                result.message.trim()
            ),
        }
        return Vec::new();
    }

    match parse_records(&result.message) {
        Ok(records) => records,
        Err(e) => {
            tracing::error!("Unparseable listing for {}: {}", resource.key, e);
            Vec::new()
        },
    }
}

/// List every instance of a resource type
pub fn list_resource<R: CommandRunner + ?Sized>(
    runner: &R,
    project: &str,
    resource: &ResourceType,
    locations: &[String],
) -> Vec<Value> {
    if !resource.requires_location {
        return list_in(runner, project, resource, None);
    }

    locations
        .iter()
        .flat_map(|location| list_in(runner, project, resource, Some(location.as_str())))
        .collect()
}
