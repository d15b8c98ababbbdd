//! Deployment execution.
//!
//! A run is a straight line:
//!
//! 1. resolve credentials (reject ambient credentials unless approved)
//! 2. build a region-scoped client
//! 3. record what is about to happen
//! 4. create the application version
//! 5. if requested, update the derived environment to that version
//!
//! The first failure ends the run. Nothing is retried and nothing is rolled
//! back: when step 5 fails the version created in step 4 stays registered.

use crate::client::{BeanstalkClient, CreateApplicationVersion, UpdateEnvironment};
use crate::error::{DeploymentError, DeploymentResult};
use crate::observability::{Field, Level, ObservabilitySink, TracingSink};
use crate::request::DeploymentRequest;

/// What a successful run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentOutcome {
    pub application: String,
    pub version_label: String,
    /// Derived environment name, when an update was issued.
    pub updated_environment: Option<String>,
}

/// Runs a [`DeploymentRequest`] against a [`BeanstalkClient`].
///
/// # Examples
///
/// ```
/// use beanstalk_deploy::client::memory::InMemoryBeanstalk;
/// use beanstalk_deploy::observability::MemorySink;
/// use beanstalk_deploy::{DeploymentExecutor, DeploymentRequest, Region, SourceBundle};
///
/// # let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
/// # rt.block_on(async {
/// let client = InMemoryBeanstalk::new();
/// let executor = DeploymentExecutor::new(client.clone()).with_sink(MemorySink::new());
///
/// let request = DeploymentRequest::new(
///     Region::default(),
///     SourceBundle::new("b", "k"),
///     "app1",
///     "3.1.4",
/// )
/// .with_credentials("AK", "SK")
/// .with_environment("app1env")
/// .with_environment_update(true);
///
/// let outcome = executor.execute(&request).await.unwrap();
/// assert_eq!(outcome.updated_environment.as_deref(), Some("app1env-stable"));
/// assert_eq!(client.call_count(), 2);
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct DeploymentExecutor<C, S = TracingSink> {
    client: C,
    sink: S,
}

impl<C: BeanstalkClient> DeploymentExecutor<C> {
    /// Executor that reports through `tracing`.
    pub fn new(client: C) -> Self {
        Self {
            client,
            sink: TracingSink,
        }
    }
}

impl<C: BeanstalkClient, S: ObservabilitySink> DeploymentExecutor<C, S> {
    /// Replace the observability sink.
    pub fn with_sink<T: ObservabilitySink>(self, sink: T) -> DeploymentExecutor<C, T> {
        DeploymentExecutor {
            client: self.client,
            sink,
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Run the request once.
    ///
    /// The credential policy is checked again here so that a client built
    /// by other means still cannot run an unapproved ambient deployment.
    pub async fn execute(&self, request: &DeploymentRequest) -> DeploymentResult<DeploymentOutcome> {
        if let Err(err) = request.credential_source() {
            report(&self.sink, "Deployment rejected", &err);
            return Err(err);
        }

        if !request.region().is_documented() {
            self.sink.record(
                Level::WARN,
                "Region is not in the documented region list",
                &[Field::new("region", request.region().to_string())],
            );
        }

        self.sink.record(
            Level::INFO,
            "Attempting to create and update",
            &attempt_fields(request),
        );

        let version = CreateApplicationVersion::from_request(request);
        if let Err(source) = self.client.create_application_version(&version).await {
            let err = DeploymentError::ApplicationVersion {
                application: version.application_name,
                version_label: version.version_label,
                source,
            };
            report(&self.sink, "Problem create application", &err);
            return Err(err);
        }

        let mut outcome = DeploymentOutcome {
            application: version.application_name,
            version_label: version.version_label,
            updated_environment: None,
        };

        if !request.environment_update() {
            tracing::debug!(
                version_label = %outcome.version_label,
                "environment update disabled, version registered only"
            );
            return Ok(outcome);
        }

        if request.environment_name().is_empty() {
            let err = DeploymentError::MissingEnvironmentName;
            report(&self.sink, "Can't update environment", &err);
            return Err(err);
        }

        let update = UpdateEnvironment::from_request(request);
        if let Err(source) = self.client.update_environment(&update).await {
            let err = DeploymentError::EnvironmentUpdate {
                environment: update.environment_name,
                version_label: update.version_label,
                source,
            };
            report(&self.sink, "Problem updating beanstalk", &err);
            return Err(err);
        }

        outcome.updated_environment = Some(update.environment_name);
        Ok(outcome)
    }
}

/// Fields of the record emitted before any remote call.
fn attempt_fields(request: &DeploymentRequest) -> Vec<Field> {
    vec![
        Field::new("region", request.region().to_string()),
        Field::new("application-name", request.application()),
        Field::new("environment", request.environment_name()),
        Field::new("bucket", request.bundle().bucket.as_str()),
        Field::new("bucket-key", request.bundle().key.as_str()),
        Field::new("versionlabel", request.version_label()),
        Field::new("description", request.description()),
        Field::new("env-update", request.environment_update()),
        Field::new("auto-create", request.auto_create_application()),
    ]
}

/// Record a failure with its cause.
fn report<S: ObservabilitySink + ?Sized>(sink: &S, message: &str, err: &DeploymentError) {
    let cause = match err.client_error() {
        Some(client_error) => client_error.to_string(),
        None => err.to_string(),
    };
    sink.record(Level::ERROR, message, &[Field::new("error", cause)]);
}

/// Deploy against AWS Elastic Beanstalk.
///
/// Resolves credentials, builds a client for the request's region and runs
/// the request once. Records go to `tracing`.
#[cfg(feature = "aws")]
pub async fn deploy(request: &DeploymentRequest) -> DeploymentResult<DeploymentOutcome> {
    use crate::client::aws::ElasticBeanstalk;

    let credentials = match request.credential_source() {
        Ok(credentials) => credentials,
        Err(err) => {
            report(&TracingSink, "Deployment rejected", &err);
            return Err(err);
        },
    };

    let client = ElasticBeanstalk::connect(request.region(), &credentials).await;
    DeploymentExecutor::new(client).execute(request).await
}
