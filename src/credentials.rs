//! Credential selection.
//!
//! A run either carries a static key pair or falls back to the ambient
//! identity of the machine it runs on (instance profile, task role,
//! environment, shared config). The fallback must be approved explicitly:
//! a pipeline that never configured keys should not silently deploy with
//! whatever role the build agent happens to have.

use std::fmt;

use secrecy::{ExposeSecret, SecretString};

use crate::error::{DeploymentError, DeploymentResult};

/// A static access key pair, scoped to a single run.
#[derive(Clone)]
pub struct StaticCredentials {
    access_key_id: String,
    secret_access_key: SecretString,
}

impl StaticCredentials {
    pub fn access_key_id(&self) -> &str {
        &self.access_key_id
    }

    /// Expose the secret for handing to the SDK. Never log the result.
    pub fn secret_access_key(&self) -> &str {
        self.secret_access_key.expose_secret()
    }
}

impl fmt::Debug for StaticCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"[REDACTED]")
            .finish()
    }
}

/// Where the client gets its credentials from.
#[derive(Debug, Clone)]
pub enum CredentialSource {
    /// Key pair supplied with the request.
    Explicit(StaticCredentials),
    /// The provider's default identity chain.
    Ambient,
}

impl CredentialSource {
    /// Pick a credential source.
    ///
    /// Both halves of the key pair must be present for [`Explicit`](Self::Explicit).
    /// Otherwise [`Ambient`](Self::Ambient) is returned only when
    /// `ambient_approved` is set.
    pub fn resolve(
        access_key: Option<&str>,
        secret_key: Option<&SecretString>,
        ambient_approved: bool,
    ) -> DeploymentResult<Self> {
        match (access_key, secret_key) {
            (Some(access_key), Some(secret_key))
                if !access_key.is_empty() && !secret_key.expose_secret().is_empty() =>
            {
                Ok(Self::Explicit(StaticCredentials {
                    access_key_id: access_key.to_string(),
                    secret_access_key: secret_key.clone(),
                }))
            },
            _ if ambient_approved => Ok(Self::Ambient),
            _ => Err(DeploymentError::SecurityPolicyViolation),
        }
    }

    pub fn is_ambient(&self) -> bool {
        matches!(self, Self::Ambient)
    }

    /// Short label for log output.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Explicit(_) => "static",
            Self::Ambient => "ambient",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret(value: &str) -> SecretString {
        SecretString::from(value.to_string())
    }

    #[test]
    fn test_key_pair_resolves_to_explicit() {
        let source = CredentialSource::resolve(Some("AK"), Some(&secret("SK")), false).unwrap();
        match source {
            CredentialSource::Explicit(creds) => {
                assert_eq!(creds.access_key_id(), "AK");
                assert_eq!(creds.secret_access_key(), "SK");
            },
            CredentialSource::Ambient => panic!("expected explicit credentials"),
        }
    }

    #[test]
    fn test_key_pair_wins_over_ambient_approval() {
        let source = CredentialSource::resolve(Some("AK"), Some(&secret("SK")), true).unwrap();
        assert!(!source.is_ambient());
        assert_eq!(source.kind(), "static");
    }

    #[test]
    fn test_missing_pair_without_approval_is_rejected() {
        for (key, sk) in [
            (None, None),
            (Some("AK"), None),
            (None, Some(secret("SK"))),
            (Some(""), Some(secret(""))),
        ] {
            let result = CredentialSource::resolve(key, sk.as_ref(), false);
            assert!(matches!(
                result,
                Err(DeploymentError::SecurityPolicyViolation)
            ));
        }
    }

    #[test]
    fn test_missing_pair_with_approval_is_ambient() {
        let source = CredentialSource::resolve(Some("AK"), None, true).unwrap();
        assert!(source.is_ambient());
        assert_eq!(source.kind(), "ambient");
    }

    #[test]
    fn test_debug_hides_secret() {
        let source = CredentialSource::resolve(Some("AK"), Some(&secret("hunter2")), false).unwrap();
        let debug = format!("{source:?}");
        assert!(debug.contains("AK"));
        assert!(!debug.contains("hunter2"));
    }
}
