//! Environment naming convention.
//!
//! A single environment parameter routes to one of two real environments
//! depending on the version label: labels carrying a pre-release marker
//! (any `-`) go to `{environment}-beta`, everything else goes to
//! `{environment}-stable`.
//!
//! ```text
//! prod + 2.0         -> prod-stable
//! prod + 2.0-canary  -> prod-beta
//! prod + a-b-c       -> prod-beta
//! ```

use std::fmt;

/// Separator that marks a pre-release version label.
pub const PRERELEASE_SEPARATOR: char = '-';

/// Release channel encoded in a version label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReleaseChannel {
    /// Label without a pre-release marker.
    Stable,
    /// Label with at least one pre-release marker.
    Beta,
}

impl ReleaseChannel {
    /// Classify a version label.
    ///
    /// The label is split on `-`; more than one segment means beta. Empty
    /// segments count, so `"-rc"` and `"1.0-"` are beta too.
    pub fn of(version_label: &str) -> Self {
        if version_label.split(PRERELEASE_SEPARATOR).count() > 1 {
            Self::Beta
        } else {
            Self::Stable
        }
    }

    /// Suffix appended to the base environment name.
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Stable => "-stable",
            Self::Beta => "-beta",
        }
    }
}

impl fmt::Display for ReleaseChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stable => write!(f, "stable"),
            Self::Beta => write!(f, "beta"),
        }
    }
}

/// Derive the full environment name for a deployment.
///
/// # Examples
///
/// ```
/// use beanstalk_deploy::naming::environment_name;
///
/// assert_eq!(environment_name("myapp", "1.2.3"), "myapp-stable");
/// assert_eq!(environment_name("myapp", "1.2.3-rc1"), "myapp-beta");
/// ```
pub fn environment_name(environment: &str, version_label: &str) -> String {
    format!(
        "{}{}",
        environment,
        ReleaseChannel::of(version_label).suffix()
    )
}
