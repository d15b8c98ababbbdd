//! Error types for deployment operations.

use thiserror::Error;

/// Boxed provider error kept as the source of a [`ClientError`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors returned by [`DeploymentExecutor`](crate::DeploymentExecutor) and
/// [`deploy`](crate::deploy).
///
/// Exactly one error is returned per run: the first failure stops the
/// sequence. Nothing is retried.
///
/// # Examples
///
/// ```
/// use beanstalk_deploy::DeploymentError;
///
/// let err = DeploymentError::MissingEnvironmentName;
/// assert!(err.version_registered());
/// assert!(err.to_string().contains("environment name"));
/// ```
#[derive(Debug, Error)]
pub enum DeploymentError {
    /// No explicit credentials were supplied and ambient credentials were
    /// not approved. Raised before any network call.
    #[error(
        "security policy violation: ambient credentials require a verified pipeline configuration"
    )]
    SecurityPolicyViolation,

    /// The create-application-version call failed.
    #[error("failed to create application version '{version_label}' for '{application}'")]
    ApplicationVersion {
        application: String,
        version_label: String,
        #[source]
        source: ClientError,
    },

    /// An environment update was requested without an environment name.
    #[error("can't update environment without environment name")]
    MissingEnvironmentName,

    /// The update-environment call failed. The application version was
    /// already registered and is left in place.
    #[error("failed to update environment '{environment}' to version '{version_label}'")]
    EnvironmentUpdate {
        environment: String,
        version_label: String,
        #[source]
        source: ClientError,
    },
}

impl DeploymentError {
    /// Whether the application version was registered before this error.
    ///
    /// Callers use this to tell a clean failure from a partial success that
    /// left a new version behind without rolling it out.
    pub fn version_registered(&self) -> bool {
        matches!(
            self,
            Self::MissingEnvironmentName | Self::EnvironmentUpdate { .. }
        )
    }

    /// The underlying provider error, if the failure came from a remote call.
    pub fn client_error(&self) -> Option<&ClientError> {
        match self {
            Self::ApplicationVersion { source, .. } | Self::EnvironmentUpdate { source, .. } => {
                Some(source)
            },
            _ => None,
        }
    }
}

/// A failed call against the Elastic Beanstalk API.
#[derive(Debug, Error)]
#[error("{operation} failed: {message}")]
pub struct ClientError {
    operation: &'static str,
    message: String,
    code: Option<String>,
    #[source]
    source: Option<BoxError>,
}

impl ClientError {
    /// Create an error for `operation` with a human-readable message.
    pub fn new(operation: &'static str, message: impl Into<String>) -> Self {
        Self {
            operation,
            message: message.into(),
            code: None,
            source: None,
        }
    }

    /// Attach the provider's error code (e.g. `InsufficientPrivilegesException`).
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Attach the underlying error.
    pub fn with_source(mut self, source: impl Into<BoxError>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Name of the API operation that failed.
    pub fn operation(&self) -> &'static str {
        self.operation
    }

    /// Provider error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Provider error code, when the service returned one.
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }
}

/// Result type for deployment operations.
pub type DeploymentResult<T> = Result<T, DeploymentError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_client_error_display_and_accessors() {
        let err = ClientError::new("CreateApplicationVersion", "bucket does not exist")
            .with_code("S3LocationNotInServiceRegionException");

        assert_eq!(
            err.to_string(),
            "CreateApplicationVersion failed: bucket does not exist"
        );
        assert_eq!(err.operation(), "CreateApplicationVersion");
        assert_eq!(err.code(), Some("S3LocationNotInServiceRegionException"));
        assert!(err.source().is_none());
    }

    #[test]
    fn test_client_error_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::TimedOut, "connect timeout");
        let err = ClientError::new("UpdateEnvironment", "dispatch failure").with_source(io);

        let source = err.source().map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("connect timeout"));
    }

    #[test]
    fn test_version_registered() {
        let cause = || ClientError::new("UpdateEnvironment", "throttled");

        assert!(!DeploymentError::SecurityPolicyViolation.version_registered());
        assert!(!DeploymentError::ApplicationVersion {
            application: "app".into(),
            version_label: "1.0".into(),
            source: ClientError::new("CreateApplicationVersion", "denied"),
        }
        .version_registered());
        assert!(DeploymentError::MissingEnvironmentName.version_registered());
        assert!(DeploymentError::EnvironmentUpdate {
            environment: "app-stable".into(),
            version_label: "1.0".into(),
            source: cause(),
        }
        .version_registered());
    }

    #[test]
    fn test_deployment_error_source_chain() {
        let err = DeploymentError::EnvironmentUpdate {
            environment: "app-beta".into(),
            version_label: "1.0-rc1".into(),
            source: ClientError::new("UpdateEnvironment", "no such environment"),
        };

        assert!(err.to_string().contains("app-beta"));
        assert_eq!(
            err.source().map(|s| s.to_string()).as_deref(),
            Some("UpdateEnvironment failed: no such environment")
        );
        assert_eq!(
            err.client_error().map(ClientError::message),
            Some("no such environment")
        );
        assert!(DeploymentError::SecurityPolicyViolation
            .client_error()
            .is_none());
    }
}
