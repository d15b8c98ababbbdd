//! Publish a bundle to AWS Elastic Beanstalk.
//!
//! A deployment registers a new application version that points at a bundle
//! already uploaded to S3, then optionally rolls a running environment
//! forward to it. The environment actually updated is derived from the
//! version label: pre-release labels (containing `-`) go to
//! `{environment}-beta`, all others to `{environment}-stable`.
//!
//! # Module Organization
//!
//! - [`request`] - The deployment request and its parts
//! - [`credentials`] - Static key pair vs. ambient identity
//! - [`naming`] - Release channel and derived environment names
//! - [`client`] - The Elastic Beanstalk client trait and implementations
//! - [`observability`] - Structured records emitted during a run
//! - [`executor`] - The deployment sequence
//! - [`error`] - Error types
//!
//! # Example
//!
//! ```rust,no_run
//! use beanstalk_deploy::{deploy, DeploymentRequest, SourceBundle};
//!
//! # async fn example() -> Result<(), beanstalk_deploy::DeploymentError> {
//! let request = DeploymentRequest::new(
//!     "eu-west-1".parse().unwrap(),
//!     SourceBundle::new("my-artifacts", "web/1.4.0.zip"),
//!     "web",
//!     "1.4.0",
//! )
//! .with_ambient_credentials_approved(true)
//! .with_environment("web")
//! .with_environment_update(true);
//!
//! let outcome = deploy(&request).await?;
//! assert_eq!(outcome.updated_environment.as_deref(), Some("web-stable"));
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod credentials;
pub mod error;
pub mod executor;
pub mod naming;
pub mod observability;
pub mod request;

pub use client::BeanstalkClient;
pub use credentials::CredentialSource;
pub use error::{ClientError, DeploymentError, DeploymentResult};
#[cfg(feature = "aws")]
pub use executor::deploy;
pub use executor::{DeploymentExecutor, DeploymentOutcome};
pub use naming::ReleaseChannel;
pub use request::{DeploymentRequest, InvalidRegion, Region, SourceBundle};
