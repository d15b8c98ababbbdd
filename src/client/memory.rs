//! In-memory [`BeanstalkClient`] that records every call.
//!
//! Clones share state, so a test can hand one clone to the executor and
//! inspect the calls through another.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{BeanstalkClient, CreateApplicationVersion, UpdateEnvironment};
use crate::error::ClientError;

#[derive(Debug, Default)]
struct State {
    application_versions: Vec<CreateApplicationVersion>,
    environment_updates: Vec<UpdateEnvironment>,
    create_failure: Option<String>,
    update_failure: Option<String>,
}

/// Recording client with scriptable failures.
///
/// # Examples
///
/// ```
/// use beanstalk_deploy::client::memory::InMemoryBeanstalk;
///
/// let client = InMemoryBeanstalk::new().failing_update_environment("environment is busy");
/// assert_eq!(client.call_count(), 0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryBeanstalk {
    state: Arc<Mutex<State>>,
}

impl InMemoryBeanstalk {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every create-application-version call fail with `message`.
    pub fn failing_create_application_version(self, message: impl Into<String>) -> Self {
        self.state.lock().create_failure = Some(message.into());
        self
    }

    /// Make every update-environment call fail with `message`.
    pub fn failing_update_environment(self, message: impl Into<String>) -> Self {
        self.state.lock().update_failure = Some(message.into());
        self
    }

    /// Create-application-version calls issued so far, failed ones included.
    pub fn application_versions(&self) -> Vec<CreateApplicationVersion> {
        self.state.lock().application_versions.clone()
    }

    /// Update-environment calls issued so far, failed ones included.
    pub fn environment_updates(&self) -> Vec<UpdateEnvironment> {
        self.state.lock().environment_updates.clone()
    }

    /// Total number of remote calls issued.
    pub fn call_count(&self) -> usize {
        let state = self.state.lock();
        state.application_versions.len() + state.environment_updates.len()
    }
}

#[async_trait]
impl BeanstalkClient for InMemoryBeanstalk {
    async fn create_application_version(
        &self,
        input: &CreateApplicationVersion,
    ) -> Result<(), ClientError> {
        let mut state = self.state.lock();
        state.application_versions.push(input.clone());
        match &state.create_failure {
            Some(message) => Err(ClientError::new("CreateApplicationVersion", message.clone())),
            None => Ok(()),
        }
    }

    async fn update_environment(&self, input: &UpdateEnvironment) -> Result<(), ClientError> {
        let mut state = self.state.lock();
        state.environment_updates.push(input.clone());
        match &state.update_failure {
            Some(message) => Err(ClientError::new("UpdateEnvironment", message.clone())),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::SourceBundle;

    fn version_input() -> CreateApplicationVersion {
        CreateApplicationVersion {
            application_name: "app".into(),
            version_label: "1.0".into(),
            description: String::new(),
            auto_create_application: false,
            process: false,
            source_bundle: SourceBundle::new("b", "k"),
        }
    }

    #[tokio::test]
    async fn test_records_calls_across_clones() {
        let client = InMemoryBeanstalk::new();
        let observer = client.clone();

        client
            .create_application_version(&version_input())
            .await
            .unwrap();

        assert_eq!(observer.application_versions(), vec![version_input()]);
        assert!(observer.environment_updates().is_empty());
        assert_eq!(observer.call_count(), 1);
    }

    #[tokio::test]
    async fn test_scripted_failure_still_records_call() {
        let client = InMemoryBeanstalk::new().failing_create_application_version("denied");

        let err = client
            .create_application_version(&version_input())
            .await
            .unwrap_err();

        assert_eq!(err.operation(), "CreateApplicationVersion");
        assert_eq!(err.message(), "denied");
        assert_eq!(client.call_count(), 1);
    }
}
