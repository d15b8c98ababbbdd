//! The deployment request: everything one run needs, fixed up front.

use std::fmt;
use std::str::FromStr;

use secrecy::SecretString;
use thiserror::Error;

use crate::credentials::CredentialSource;
use crate::error::DeploymentResult;

/// An AWS region identifier such as `us-east-1`.
///
/// Any well-formed region code is accepted; [`Region::DOCUMENTED`] lists the
/// regions the step is documented against.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Region(String);

impl Region {
    /// Regions the deployment step is documented and exercised against.
    pub const DOCUMENTED: &'static [&'static str] = &[
        "us-east-1",
        "us-west-1",
        "us-west-2",
        "eu-west-1",
        "ap-southeast-1",
        "ap-southeast-2",
        "ap-northeast-1",
        "sa-east-1",
    ];

    /// Region used when none is configured.
    pub const DEFAULT: &'static str = "us-east-1";

    /// The region code.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this region appears in [`Region::DOCUMENTED`].
    pub fn is_documented(&self) -> bool {
        Self::DOCUMENTED.contains(&self.0.as_str())
    }
}

impl Default for Region {
    fn default() -> Self {
        Self(Self::DEFAULT.to_string())
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A region string that is not shaped like an AWS region code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid region '{region}': expected a code like 'us-east-1'")]
pub struct InvalidRegion {
    region: String,
}

impl FromStr for Region {
    type Err = InvalidRegion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidRegion {
            region: s.to_string(),
        };

        let segments: Vec<&str> = s.split('-').collect();
        if segments.len() < 3 {
            return Err(invalid());
        }
        let well_formed = segments.iter().all(|segment| {
            !segment.is_empty()
                && segment
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        });
        let numbered = segments
            .last()
            .is_some_and(|last| last.chars().all(|c| c.is_ascii_digit()));

        if well_formed && numbered {
            Ok(Self(s.to_string()))
        } else {
            Err(invalid())
        }
    }
}

/// Location of an already uploaded bundle in S3.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceBundle {
    pub bucket: String,
    pub key: String,
}

impl SourceBundle {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }
}

/// Parameters for one deployment run.
///
/// Built once, executed once, then dropped. The secret key is held in a
/// [`SecretString`] and shows up as redacted in `Debug` output.
///
/// # Examples
///
/// ```
/// use beanstalk_deploy::{DeploymentRequest, Region, SourceBundle};
///
/// let request = DeploymentRequest::new(
///     Region::default(),
///     SourceBundle::new("artifacts", "app/3.1.4.zip"),
///     "app1",
///     "3.1.4",
/// )
/// .with_credentials("AKIAEXAMPLE", "wJalrXUtnFEMI")
/// .with_environment("app1env")
/// .with_environment_update(true);
///
/// assert_eq!(request.target_environment(), "app1env-stable");
/// assert!(!format!("{request:?}").contains("wJalrXUtnFEMI"));
/// ```
#[derive(Debug, Clone)]
pub struct DeploymentRequest {
    access_key: Option<String>,
    secret_key: Option<SecretString>,
    ambient_credentials_approved: bool,
    region: Region,
    bundle: SourceBundle,
    application: String,
    environment_name: String,
    version_label: String,
    description: String,
    auto_create_application: bool,
    process: bool,
    environment_update: bool,
}

impl DeploymentRequest {
    /// Create a request with no credentials, no environment and every flag
    /// off.
    pub fn new(
        region: Region,
        bundle: SourceBundle,
        application: impl Into<String>,
        version_label: impl Into<String>,
    ) -> Self {
        Self {
            access_key: None,
            secret_key: None,
            ambient_credentials_approved: false,
            region,
            bundle,
            application: application.into(),
            environment_name: String::new(),
            version_label: version_label.into(),
            description: String::new(),
            auto_create_application: false,
            process: false,
            environment_update: false,
        }
    }

    /// Use a static access key pair. Empty values count as absent.
    pub fn with_credentials(
        mut self,
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        let access_key = access_key.into();
        let secret_key = secret_key.into();
        self.access_key = (!access_key.is_empty()).then_some(access_key);
        self.secret_key = (!secret_key.is_empty()).then(|| SecretString::from(secret_key));
        self
    }

    /// Allow falling back to the ambient identity when no key pair is set.
    pub fn with_ambient_credentials_approved(mut self, approved: bool) -> Self {
        self.ambient_credentials_approved = approved;
        self
    }

    pub fn with_environment(mut self, environment_name: impl Into<String>) -> Self {
        self.environment_name = environment_name.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_auto_create_application(mut self, auto_create: bool) -> Self {
        self.auto_create_application = auto_create;
        self
    }

    pub fn with_process(mut self, process: bool) -> Self {
        self.process = process;
        self
    }

    pub fn with_environment_update(mut self, environment_update: bool) -> Self {
        self.environment_update = environment_update;
        self
    }

    /// Resolve which credentials this run may use.
    ///
    /// Fails with [`SecurityPolicyViolation`](crate::DeploymentError::SecurityPolicyViolation)
    /// when no key pair is set and ambient credentials were not approved.
    pub fn credential_source(&self) -> DeploymentResult<CredentialSource> {
        CredentialSource::resolve(
            self.access_key.as_deref(),
            self.secret_key.as_ref(),
            self.ambient_credentials_approved,
        )
    }

    pub fn region(&self) -> &Region {
        &self.region
    }

    pub fn bundle(&self) -> &SourceBundle {
        &self.bundle
    }

    pub fn application(&self) -> &str {
        &self.application
    }

    /// Base environment name, before the channel suffix.
    pub fn environment_name(&self) -> &str {
        &self.environment_name
    }

    pub fn version_label(&self) -> &str {
        &self.version_label
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn auto_create_application(&self) -> bool {
        self.auto_create_application
    }

    pub fn process(&self) -> bool {
        self.process
    }

    pub fn environment_update(&self) -> bool {
        self.environment_update
    }

    pub fn ambient_credentials_approved(&self) -> bool {
        self.ambient_credentials_approved
    }

    /// Full name of the environment an update would target.
    pub fn target_environment(&self) -> String {
        crate::naming::environment_name(&self.environment_name, &self.version_label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn request() -> DeploymentRequest {
        DeploymentRequest::new(
            Region::default(),
            SourceBundle::new("b", "k"),
            "app",
            "1.0",
        )
    }

    #[test]
    fn test_region_parses_well_formed_codes() {
        for code in ["us-east-1", "ap-southeast-2", "us-gov-west-1", "il-central-1"] {
            let region: Region = code.parse().unwrap();
            assert_eq!(region.as_str(), code);
        }
    }

    #[test]
    fn test_region_rejects_malformed_codes() {
        for code in ["", "us-east", "US-EAST-1", "us-east-one", "us--1", "us east 1"] {
            assert!(code.parse::<Region>().is_err(), "accepted {code:?}");
        }
        let err = "mars".parse::<Region>().unwrap_err();
        assert!(err.to_string().contains("'mars'"));
    }

    #[test]
    fn test_documented_regions() {
        assert!(Region::default().is_documented());
        assert!("sa-east-1".parse::<Region>().unwrap().is_documented());
        assert!(!"eu-central-2".parse::<Region>().unwrap().is_documented());
        for code in Region::DOCUMENTED {
            assert!(code.parse::<Region>().is_ok());
        }
    }

    #[test]
    fn test_new_request_defaults() {
        let request = request();
        assert_eq!(request.region().as_str(), "us-east-1");
        assert_eq!(request.environment_name(), "");
        assert_eq!(request.description(), "");
        assert!(!request.auto_create_application());
        assert!(!request.process());
        assert!(!request.environment_update());
        assert!(!request.ambient_credentials_approved());
    }

    #[test]
    fn test_empty_credentials_count_as_absent() {
        let request = request().with_credentials("", "");
        assert!(request.access_key.is_none());
        assert!(request.secret_key.is_none());

        let request = request.with_credentials("AK", "");
        assert_eq!(request.access_key.as_deref(), Some("AK"));
        assert!(request.secret_key.is_none());
    }

    #[test]
    fn test_debug_redacts_secret_key() {
        let request = request().with_credentials("AK", "super-secret-value");
        let debug = format!("{request:?}");
        assert!(debug.contains("AK"));
        assert!(!debug.contains("super-secret-value"));
    }

    #[test]
    fn test_target_environment_uses_channel_suffix() {
        let request = request().with_environment("web");
        assert_eq!(request.target_environment(), "web-stable");

        let request = DeploymentRequest::new(
            Region::default(),
            SourceBundle::new("b", "k"),
            "app",
            "1.0-rc1",
        )
        .with_environment("web");
        assert_eq!(request.target_environment(), "web-beta");
    }
}
