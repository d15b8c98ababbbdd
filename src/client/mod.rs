//! The two Elastic Beanstalk calls a deployment makes.
//!
//! [`BeanstalkClient`] is the seam between the executor and the provider.
//! The AWS-backed implementation lives in [`aws`] (feature `aws`, on by
//! default); [`memory::InMemoryBeanstalk`] records calls and can be told to
//! fail, which is what the tests run against.

#[cfg(feature = "aws")]
pub mod aws;
pub mod memory;

use async_trait::async_trait;

use crate::error::ClientError;
use crate::request::{DeploymentRequest, SourceBundle};

/// Input of the create-application-version call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateApplicationVersion {
    pub application_name: String,
    pub version_label: String,
    pub description: String,
    pub auto_create_application: bool,
    pub process: bool,
    pub source_bundle: SourceBundle,
}

impl CreateApplicationVersion {
    pub fn from_request(request: &DeploymentRequest) -> Self {
        Self {
            application_name: request.application().to_string(),
            version_label: request.version_label().to_string(),
            description: request.description().to_string(),
            auto_create_application: request.auto_create_application(),
            process: request.process(),
            source_bundle: request.bundle().clone(),
        }
    }
}

/// Input of the update-environment call.
///
/// `environment_name` is the derived name, suffix included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateEnvironment {
    pub application_name: String,
    pub environment_name: String,
    pub version_label: String,
    pub description: String,
}

impl UpdateEnvironment {
    pub fn from_request(request: &DeploymentRequest) -> Self {
        Self {
            application_name: request.application().to_string(),
            environment_name: request.target_environment(),
            version_label: request.version_label().to_string(),
            description: request.description().to_string(),
        }
    }
}

/// Client for the Elastic Beanstalk operations used by a deployment.
///
/// Each call returns once the provider has accepted (or rejected) the
/// request. Implementations must not retry beyond what their transport does
/// by default.
#[async_trait]
pub trait BeanstalkClient: Send + Sync {
    /// Register a new application version backed by an S3 bundle.
    async fn create_application_version(
        &self,
        input: &CreateApplicationVersion,
    ) -> Result<(), ClientError>;

    /// Point an environment at an application version.
    async fn update_environment(&self, input: &UpdateEnvironment) -> Result<(), ClientError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Region;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_inputs_from_request() {
        let request = DeploymentRequest::new(
            Region::default(),
            SourceBundle::new("b", "k"),
            "app1",
            "3.1.4-beta1",
        )
        .with_environment("app1env")
        .with_description("d")
        .with_auto_create_application(true)
        .with_process(true);

        assert_eq!(
            CreateApplicationVersion::from_request(&request),
            CreateApplicationVersion {
                application_name: "app1".into(),
                version_label: "3.1.4-beta1".into(),
                description: "d".into(),
                auto_create_application: true,
                process: true,
                source_bundle: SourceBundle::new("b", "k"),
            }
        );
        assert_eq!(
            UpdateEnvironment::from_request(&request),
            UpdateEnvironment {
                application_name: "app1".into(),
                environment_name: "app1env-beta".into(),
                version_label: "3.1.4-beta1".into(),
                description: "d".into(),
            }
        );
    }
}
