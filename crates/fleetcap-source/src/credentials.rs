//! Device credential resolution

use std::env;

use tracing::debug;

use crate::error::SourceError;

/// Username and password for a device session
#[derive(Clone)]
pub struct Credentials {
    /// Login user
    pub username: String,
    password: String,
}

impl Credentials {
    /// Create credentials
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Password, for handing to the transport
    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Supplies credentials for each device in a run
pub trait CredentialProvider: Send + Sync {
    /// Resolve credentials for `device`
    ///
    /// # Errors
    /// Returns `SourceError::AuthenticationFailed` if no credentials are available.
    fn credentials(&self, device: &str) -> Result<Credentials, SourceError>;
}

/// The same credentials for every device
#[derive(Debug, Clone)]
pub struct StaticCredentials(Credentials);

impl StaticCredentials {
    pub fn new(credentials: Credentials) -> Self {
        Self(credentials)
    }
}

impl CredentialProvider for StaticCredentials {
    fn credentials(&self, _device: &str) -> Result<Credentials, SourceError> {
        Ok(self.0.clone())
    }
}

/// Credentials read from environment variables on each lookup
#[derive(Debug, Clone)]
pub struct EnvCredentials {
    username_var: String,
    password_var: String,
}

impl EnvCredentials {
    /// Default username variable
    pub const USERNAME_VAR: &'static str = "FLEETCAP_USERNAME";
    /// Default password variable
    pub const PASSWORD_VAR: &'static str = "FLEETCAP_PASSWORD";

    pub fn new(username_var: impl Into<String>, password_var: impl Into<String>) -> Self {
        Self {
            username_var: username_var.into(),
            password_var: password_var.into(),
        }
    }
}

impl Default for EnvCredentials {
    fn default() -> Self {
        Self::new(Self::USERNAME_VAR, Self::PASSWORD_VAR)
    }
}

impl CredentialProvider for EnvCredentials {
    fn credentials(&self, device: &str) -> Result<Credentials, SourceError> {
        let username = env::var(&self.username_var).map_err(|_| {
            SourceError::AuthenticationFailed(format!(
                "environment variable {} not set",
                self.username_var
            ))
        })?;
        let password = env::var(&self.password_var).map_err(|_| {
            SourceError::AuthenticationFailed(format!(
                "environment variable {} not set",
                self.password_var
            ))
        })?;

        debug!(device = %device, user = %username, "resolved credentials from environment");

        Ok(Credentials::new(username, password))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_password() {
        let creds = Credentials::new("netops", "hunter2");
        let rendered = format!("{creds:?}");

        assert!(rendered.contains("netops"));
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn test_static_credentials() {
        let provider = StaticCredentials::new(Credentials::new("netops", "secret"));
        let creds = provider.credentials("edge1").unwrap();

        assert_eq!(creds.username, "netops");
        assert_eq!(creds.password(), "secret");
    }

    #[test]
    fn test_env_credentials_missing_var() {
        let provider = EnvCredentials::new(
            "FLEETCAP_TEST_UNSET_USER_VAR",
            "FLEETCAP_TEST_UNSET_PASSWORD_VAR",
        );

        let err = provider.credentials("edge1").unwrap_err();
        assert!(matches!(err, SourceError::AuthenticationFailed(_)));
        assert!(err.is_connection_failure());
    }
}
