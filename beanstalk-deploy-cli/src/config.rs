//! Deployment settings from flags, environment variables and an optional
//! TOML file.
//!
//! Precedence, highest first: command-line flag or its `PLUGIN_*` variable,
//! the AWS fallback variables for the key pair, the TOML file, built-in
//! defaults.
//!
//! The key pair is taken whole from one layer; halves from different layers
//! are never combined. Approval for ambient credentials only comes from
//! `--yaml-verified` or `DRONE_YAML_VERIFIED`, never from the file.

use std::path::Path;

use anyhow::{bail, Context, Result};
use beanstalk_deploy::{DeploymentRequest, Region, SourceBundle};
use clap::builder::BoolishValueParser;
use clap::Args;
use serde::Deserialize;

/// Settings accepted on the command line or through `PLUGIN_*` variables.
#[derive(Debug, Default, Args)]
pub struct Settings {
    /// AWS access key ID (falls back to AWS_ACCESS_KEY_ID)
    #[arg(long, env = "PLUGIN_ACCESS_KEY")]
    pub access_key: Option<String>,

    /// AWS secret access key (falls back to AWS_SECRET_ACCESS_KEY)
    #[arg(long, env = "PLUGIN_SECRET_KEY", hide_env_values = true)]
    pub secret_key: Option<String>,

    /// AWS region (default: us-east-1)
    #[arg(long, env = "PLUGIN_REGION")]
    pub region: Option<String>,

    /// S3 bucket holding the bundle
    #[arg(long, env = "PLUGIN_BUCKET")]
    pub bucket: Option<String>,

    /// S3 key of the bundle
    #[arg(long, env = "PLUGIN_BUCKET_KEY")]
    pub bucket_key: Option<String>,

    /// Elastic Beanstalk application name
    #[arg(long, env = "PLUGIN_APPLICATION")]
    pub application: Option<String>,

    /// Base environment name; `-stable` or `-beta` is appended
    #[arg(long, env = "PLUGIN_ENVIRONMENT_NAME")]
    pub environment_name: Option<String>,

    /// Label of the application version to create
    #[arg(long, env = "PLUGIN_VERSION_LABEL")]
    pub version_label: Option<String>,

    /// Description of the application version
    #[arg(long, env = "PLUGIN_DESCRIPTION")]
    pub description: Option<String>,

    /// Create the application if it does not exist
    #[arg(long, env = "PLUGIN_AUTO_CREATE", num_args = 0..=1, default_missing_value = "true", value_parser = BoolishValueParser::new())]
    pub auto_create: Option<bool>,

    /// Have Elastic Beanstalk preprocess and validate the bundle
    #[arg(long, env = "PLUGIN_PROCESS", num_args = 0..=1, default_missing_value = "true", value_parser = BoolishValueParser::new())]
    pub process: Option<bool>,

    /// Roll the derived environment forward to the new version
    #[arg(long, env = "PLUGIN_ENVIRONMENT_UPDATE", num_args = 0..=1, default_missing_value = "true", value_parser = BoolishValueParser::new())]
    pub environment_update: Option<bool>,

    /// Pipeline configuration is verified; allows ambient credentials
    #[arg(long, env = "DRONE_YAML_VERIFIED", num_args = 0..=1, default_missing_value = "true", value_parser = BoolishValueParser::new())]
    pub yaml_verified: Option<bool>,
}

/// Optional TOML file with the same settings as [`Settings`], except
/// `yaml_verified`.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    pub region: Option<String>,
    pub bucket: Option<String>,
    pub bucket_key: Option<String>,
    pub application: Option<String>,
    pub environment_name: Option<String>,
    pub version_label: Option<String>,
    pub description: Option<String>,
    pub auto_create: Option<bool>,
    pub process: Option<bool>,
    pub environment_update: Option<bool>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }
}

/// Treats empty strings as unset.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// The first layer that supplies either half of the key pair.
fn key_pair(layers: [(Option<String>, Option<String>); 3]) -> (Option<String>, Option<String>) {
    layers
        .into_iter()
        .map(|(access_key, secret_key)| (non_empty(access_key), non_empty(secret_key)))
        .find(|(access_key, secret_key)| access_key.is_some() || secret_key.is_some())
        .unwrap_or((None, None))
}

fn required(value: Option<String>, flag: &str, env: &str) -> Result<String> {
    match non_empty(value) {
        Some(value) => Ok(value),
        None => bail!("Missing required setting: pass --{flag} or set {env}"),
    }
}

impl Settings {
    /// Merge with `file` and build the request.
    ///
    /// `env` looks up the AWS fallback variables for the key pair.
    pub fn into_request<F>(self, file: FileConfig, env: F) -> Result<DeploymentRequest>
    where
        F: Fn(&str) -> Option<String>,
    {
        let (access_key, secret_key) = key_pair([
            (self.access_key, self.secret_key),
            (env("AWS_ACCESS_KEY_ID"), env("AWS_SECRET_ACCESS_KEY")),
            (file.access_key, file.secret_key),
        ]);

        let region: Region = non_empty(self.region)
            .or_else(|| non_empty(file.region))
            .map(|region| region.parse::<Region>())
            .transpose()?
            .unwrap_or_default();

        let bucket = required(non_empty(self.bucket).or(file.bucket), "bucket", "PLUGIN_BUCKET")?;
        let bucket_key = required(
            non_empty(self.bucket_key).or(file.bucket_key),
            "bucket-key",
            "PLUGIN_BUCKET_KEY",
        )?;
        let application = required(
            non_empty(self.application).or(file.application),
            "application",
            "PLUGIN_APPLICATION",
        )?;
        let version_label = required(
            non_empty(self.version_label).or(file.version_label),
            "version-label",
            "PLUGIN_VERSION_LABEL",
        )?;

        let request = DeploymentRequest::new(
            region,
            SourceBundle::new(bucket, bucket_key),
            application,
            version_label,
        )
        .with_credentials(
            access_key.unwrap_or_default(),
            secret_key.unwrap_or_default(),
        )
        .with_ambient_credentials_approved(self.yaml_verified.unwrap_or(false))
        .with_environment(
            non_empty(self.environment_name)
                .or(file.environment_name)
                .unwrap_or_default(),
        )
        .with_description(non_empty(self.description).or(file.description).unwrap_or_default())
        .with_auto_create_application(self.auto_create.or(file.auto_create).unwrap_or(false))
        .with_process(self.process.or(file.process).unwrap_or(false))
        .with_environment_update(
            self.environment_update
                .or(file.environment_update)
                .unwrap_or(false),
        );

        Ok(request)
    }
}
