//! Configuration Management
//!
//! Deployment and inventory settings, read from a YAML file or from the
//! process environment. Both paths run the same validation.

pub mod cron;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Container image used for the Cloud Run Job when none is configured
pub const DEFAULT_IMAGE: &str = "ghcr.io/gcp-inventory/gcp-inventory";

/// Image tag used when none is configured
pub const DEFAULT_IMAGE_TAG: &str = "latest";

/// Environment variables that override `ProjectId`, in priority order
const PROJECT_ENV_KEYS: &[&str] = &["_PROJECT_ID", "PROJECT_ID", "PROJECT"];

/// Environment variable carrying the switched-off resource types
pub const DISABLED_SERVICES_ENV: &str = "DISABLED_SERVICES";

/// Toggle for one inventoried resource type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Service {
    pub enabled: bool,
}

/// Deployment and inventory settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "PascalCase")]
pub struct Config {
    /// Resource type name -> toggle
    #[serde(default)]
    pub services: BTreeMap<String, Service>,
    /// Project that hosts the job and gets inventoried
    #[serde(default)]
    pub project_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_number: Option<u64>,
    #[serde(default)]
    pub target_bucket: String,
    /// Project owning the bucket; defaults to `ProjectId`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_bucket_project: Option<String>,
    /// Comma or semicolon delimited
    #[serde(default)]
    pub target_locations: String,
    #[serde(default)]
    pub job_region: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_account_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_tag: Option<String>,
}

impl Config {
    /// Parse and validate a YAML document
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Config = serde_yaml::from_str(yaml)?;
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file, applying the project override
    /// from the process environment
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Self::load_with(path, |key| std::env::var(key).ok())
    }

    pub fn load_with<F>(path: &Path, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let mut config = Self::from_yaml_str(&content)?;

        if let Some(project) = project_override(&lookup) {
            tracing::debug!("ProjectId overridden from environment: {}", project);
            config.project_id = project;
        }

        Ok(config)
    }

    /// Build configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_env_with<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let project_number = match get("PROJECT_NUMBER") {
            Some(raw) => Some(raw.trim().parse::<u64>().map_err(|_| {
                ConfigError::InvalidValue {
                    field: "PROJECT_NUMBER",
                    value: raw.clone(),
                }
            })?),
            None => None,
        };

        let services: BTreeMap<String, Service> = get(DISABLED_SERVICES_ENV)
            .map(|raw| {
                split_list(&raw)
                    .into_iter()
                    .map(|name| (name, Service { enabled: false }))
                    .collect()
            })
            .unwrap_or_default();

        let mut config = Config {
            services,
            project_id: project_override(&lookup).unwrap_or_default(),
            project_number,
            target_bucket: get("TARGET_BUCKET").unwrap_or_default(),
            target_bucket_project: get("TARGET_BUCKET_PROJECT"),
            target_locations: get("TARGET_LOCATIONS").unwrap_or_default(),
            job_region: get("JOB_REGION").unwrap_or_default(),
            schedule: get("SCHEDULE"),
            service_account_email: get("SERVICE_ACCOUNT_EMAIL"),
            image: get("IMAGE"),
            image_tag: get("IMAGE_TAG"),
        };

        config.normalize();
        config.validate()?;
        Ok(config)
    }

    /// Blank optional strings are treated as absent
    fn normalize(&mut self) {
        for field in [
            &mut self.target_bucket_project,
            &mut self.schedule,
            &mut self.service_account_email,
            &mut self.image,
            &mut self.image_tag,
        ] {
            if field.as_deref().is_some_and(|v| v.trim().is_empty()) {
                *field = None;
            }
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(schedule) = &self.schedule {
            cron::validate(schedule).map_err(|reason| ConfigError::InvalidSchedule {
                schedule: schedule.clone(),
                reason,
            })?;
        }
        Ok(())
    }

    /// Fail when a setting the caller depends on is blank
    pub fn require(&self, field: &'static str) -> Result<&str, ConfigError> {
        let value = match field {
            "ProjectId" => self.project_id.as_str(),
            "TargetBucket" => self.target_bucket.as_str(),
            "JobRegion" => self.job_region.as_str(),
            _ => "",
        };
        if value.trim().is_empty() {
            return Err(ConfigError::MissingField(field));
        }
        Ok(value)
    }

    /// Target locations, split on `,` or `;`
    pub fn locations(&self) -> Vec<String> {
        split_list(&self.target_locations)
    }

    /// Project owning the target bucket
    pub fn bucket_project(&self) -> &str {
        self.target_bucket_project
            .as_deref()
            .unwrap_or(&self.project_id)
    }

    /// Full image reference for the job container
    pub fn image_ref(&self) -> String {
        format!(
            "{}:{}",
            self.image.as_deref().unwrap_or(DEFAULT_IMAGE),
            self.image_tag.as_deref().unwrap_or(DEFAULT_IMAGE_TAG)
        )
    }

    /// Whether a resource type is switched on. Types without a toggle are on.
    pub fn is_enabled(&self, resource_type: &str) -> bool {
        self.services
            .get(resource_type)
            .map(|s| s.enabled)
            .unwrap_or(true)
    }

    /// Resource types switched off by their toggle
    pub fn disabled_services(&self) -> Vec<&str> {
        self.services
            .iter()
            .filter(|(_, s)| !s.enabled)
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

/// Split a `,` or `;` delimited list, dropping blank entries
fn split_list(raw: &str) -> Vec<String> {
    raw.split([',', ';'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn project_override<F>(lookup: &F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    PROJECT_ENV_KEYS
        .iter()
        .filter_map(|key| lookup(key))
        .find(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SAMPLE: &str = include_str!("../../templates/config.yaml");

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_parse_sample_config() {
        let config = Config::from_yaml_str(SAMPLE).unwrap();
        assert_eq!(config.project_id, "PROJECT_NOT_SET");
        assert_eq!(config.locations().len(), 2);
        assert_eq!(config.job_region, "us-central1");
        assert!(config.service_account_email.is_none());
        assert!(config.services.contains_key("compute-instances"));
    }

    #[test]
    fn test_minimal_config_defaults() {
        let config = Config::from_yaml_str("Schedule: '* * * * *'\nJobRegion: jobregion\n").unwrap();
        assert!(config.service_account_email.is_none());
        assert!(config.services.is_empty());
        assert_eq!(config.image_ref(), "ghcr.io/gcp-inventory/gcp-inventory:latest");
    }

    #[test]
    fn test_invalid_schedule_rejected() {
        let err = Config::from_yaml_str("Schedule: '* * * *'\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSchedule { .. }));
    }

    #[test]
    fn test_empty_schedule_is_absent() {
        let config = Config::from_yaml_str("Schedule: ''\n").unwrap();
        assert!(config.schedule.is_none());
    }

    #[test]
    fn test_unknown_service_key_rejected() {
        let yaml = "Services:\n  compute-instances:\n    enabled: true\n    color: blue\n";
        let err = Config::from_yaml_str(yaml).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_malformed_yaml_rejected() {
        assert!(matches!(
            Config::from_yaml_str("Services: [unclosed").unwrap_err(),
            ConfigError::Parse(_)
        ));
    }

    #[test]
    fn test_locations_accept_both_delimiters() {
        let config = Config {
            target_locations: "us-central1, europe-west1;asia-east1;;".to_string(),
            ..Default::default()
        };
        assert_eq!(
            config.locations(),
            vec!["us-central1", "europe-west1", "asia-east1"]
        );
    }

    #[test]
    fn test_bucket_project_falls_back_to_project() {
        let mut config = Config {
            project_id: "target-proj".to_string(),
            ..Default::default()
        };
        assert_eq!(config.bucket_project(), "target-proj");
        config.target_bucket_project = Some("bucket-proj".to_string());
        assert_eq!(config.bucket_project(), "bucket-proj");
    }

    #[test]
    fn test_service_toggles() {
        let yaml = "Services:\n  storage-buckets:\n    enabled: false\n";
        let config = Config::from_yaml_str(yaml).unwrap();
        assert!(!config.is_enabled("storage-buckets"));
        assert!(config.is_enabled("compute-instances"));
    }

    #[test]
    fn test_config_from_environment() {
        let config = Config::from_env_with(env(&[
            ("SCHEDULE", "0 */1 * * *"),
            ("PROJECT_ID", "inventoried-project"),
            ("TARGET_LOCATIONS", "us-east1,us-west1"),
            ("PROJECT_NUMBER", "123456789"),
        ]))
        .unwrap();
        assert_eq!(config.schedule.as_deref(), Some("0 */1 * * *"));
        assert_eq!(config.project_id, "inventoried-project");
        assert_eq!(config.project_number, Some(123456789));
        assert_eq!(config.locations(), vec!["us-east1", "us-west1"]);
    }

    #[test]
    fn test_environment_disabled_services() {
        let config = Config::from_env_with(env(&[
            ("PROJECT_ID", "p"),
            ("DISABLED_SERVICES", "storage-buckets; compute-disks,"),
        ]))
        .unwrap();

        assert!(!config.is_enabled("storage-buckets"));
        assert!(!config.is_enabled("compute-disks"));
        assert!(config.is_enabled("compute-instances"));
        assert_eq!(config.disabled_services(), vec!["compute-disks", "storage-buckets"]);
    }

    #[test]
    fn test_environment_schedule_validated() {
        let err = Config::from_env_with(env(&[("SCHEDULE", "every hour")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSchedule { .. }));
    }

    #[test]
    fn test_environment_project_number_must_be_numeric() {
        let err = Config::from_env_with(env(&[("PROJECT_NUMBER", "abc")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_project_override_priority() {
        let lookup = env(&[("PROJECT", "third"), ("PROJECT_ID", "second")]);
        assert_eq!(project_override(&lookup).as_deref(), Some("second"));
        let lookup = env(&[("_PROJECT_ID", "first"), ("PROJECT_ID", "second")]);
        assert_eq!(project_override(&lookup).as_deref(), Some("first"));
    }

    #[test]
    fn test_load_applies_project_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, SAMPLE).unwrap();

        let config = Config::load_with(&path, env(&[("PROJECT_ID", "from-env")])).unwrap();
        assert_eq!(config.project_id, "from-env");

        let config = Config::load_with(&path, env(&[])).unwrap();
        assert_eq!(config.project_id, "PROJECT_NOT_SET");
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load_with(Path::new("/nonexistent/config.yaml"), env(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_require_blank_field() {
        let config = Config::default();
        assert!(matches!(
            config.require("ProjectId"),
            Err(ConfigError::MissingField("ProjectId"))
        ));
    }

    #[test]
    fn test_json_round_trip_preserves_scalars() {
        let config = Config {
            project_id: "p".to_string(),
            project_number: Some(42),
            target_bucket: "b".to_string(),
            target_bucket_project: Some("bp".to_string()),
            target_locations: "us-east1;us-west1".to_string(),
            job_region: "northamerica-northeast1".to_string(),
            schedule: Some("0 3 * * *".to_string()),
            service_account_email: Some("sa@p.iam.gserviceaccount.com".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["JobRegion"], "northamerica-northeast1");

        let back: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
