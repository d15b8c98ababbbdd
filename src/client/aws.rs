//! Elastic Beanstalk client backed by the AWS SDK.
//!
//! Only compiled with the `aws` feature (enabled by default).

use async_trait::async_trait;
use aws_sdk_elasticbeanstalk::config::{Credentials, Region as SdkRegion};
use aws_sdk_elasticbeanstalk::error::{DisplayErrorContext, ProvideErrorMetadata};
use aws_sdk_elasticbeanstalk::types::S3Location;
use aws_sdk_elasticbeanstalk::Client;

use super::{BeanstalkClient, CreateApplicationVersion, UpdateEnvironment};
use crate::credentials::CredentialSource;
use crate::error::ClientError;
use crate::request::Region;

/// Name reported by the static credentials provider.
const PROVIDER_NAME: &str = "beanstalk-deploy";

/// [`BeanstalkClient`] that talks to the Elastic Beanstalk API.
///
/// # Examples
///
/// ```rust,no_run
/// use beanstalk_deploy::client::aws::ElasticBeanstalk;
/// use beanstalk_deploy::{CredentialSource, Region};
///
/// # async fn example() {
/// let client = ElasticBeanstalk::connect(&Region::default(), &CredentialSource::Ambient).await;
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ElasticBeanstalk {
    client: Client,
}

impl ElasticBeanstalk {
    /// Wrap a pre-built SDK client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a region-scoped client.
    ///
    /// Explicit credentials are installed as a static provider for this
    /// client only. Ambient credentials go through the SDK's default chain
    /// (environment, shared profile, container and instance metadata).
    /// Retry and timeout settings are the SDK defaults.
    pub async fn connect(region: &Region, credentials: &CredentialSource) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(SdkRegion::new(region.as_str().to_string()));

        if let CredentialSource::Explicit(creds) = credentials {
            loader = loader.credentials_provider(Credentials::new(
                creds.access_key_id(),
                creds.secret_access_key(),
                None,
                None,
                PROVIDER_NAME,
            ));
        }

        let config = loader.load().await;
        tracing::debug!(
            region = %region,
            credentials = credentials.kind(),
            "Elastic Beanstalk client configured"
        );
        Self::new(Client::new(&config))
    }
}

/// Maps an AWS SDK error to a [`ClientError`], keeping the service error
/// code and message when the service returned one.
fn map_sdk_error<E>(operation: &'static str, err: E) -> ClientError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    let message = err
        .message()
        .map(str::to_string)
        .unwrap_or_else(|| DisplayErrorContext(&err).to_string());
    let code = err.code().map(str::to_string);

    let mapped = ClientError::new(operation, message);
    let mapped = match code {
        Some(code) => mapped.with_code(code),
        None => mapped,
    };
    mapped.with_source(err)
}

#[async_trait]
impl BeanstalkClient for ElasticBeanstalk {
    async fn create_application_version(
        &self,
        input: &CreateApplicationVersion,
    ) -> Result<(), ClientError> {
        let source_bundle = S3Location::builder()
            .s3_bucket(&input.source_bundle.bucket)
            .s3_key(&input.source_bundle.key)
            .build();

        self.client
            .create_application_version()
            .application_name(&input.application_name)
            .version_label(&input.version_label)
            .description(&input.description)
            .auto_create_application(input.auto_create_application)
            .process(input.process)
            .source_bundle(source_bundle)
            .send()
            .await
            .map_err(|e| map_sdk_error("CreateApplicationVersion", e))?;

        Ok(())
    }

    async fn update_environment(&self, input: &UpdateEnvironment) -> Result<(), ClientError> {
        self.client
            .update_environment()
            .application_name(&input.application_name)
            .environment_name(&input.environment_name)
            .version_label(&input.version_label)
            .description(&input.description)
            .send()
            .await
            .map_err(|e| map_sdk_error("UpdateEnvironment", e))?;

        Ok(())
    }
}
