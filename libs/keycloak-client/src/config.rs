use std::time::Duration;

use crate::error::ValidationError;

const KEYCLOAK_URL: &str = "KEYCLOAK_URL";
const KEYCLOAK_HTTP_TIMEOUT_SECS: &str = "KEYCLOAK_HTTP_TIMEOUT_SECS";

const DEFAULT_KEYCLOAK_URL: &str = "http://localhost:8080";

const ADMIN_REALMS_PATH: &str = "admin/realms";
const REALMS_PATH: &str = "realms";

/// Connection settings for a Keycloak server.
#[derive(Debug, Clone)]
pub struct KeycloakConfig {
    pub base_url: String,
    /// Per-request timeout. `None` leaves the transport default in place.
    pub timeout: Option<Duration>,
}

impl KeycloakConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: None,
        }
    }

    pub fn from_env() -> Self {
        let base_url =
            std::env::var(KEYCLOAK_URL).unwrap_or_else(|_| DEFAULT_KEYCLOAK_URL.to_string());
        let timeout = std::env::var(KEYCLOAK_HTTP_TIMEOUT_SECS)
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs);

        Self { base_url, timeout }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Base URL without its trailing slash. Fails when blank.
    pub(crate) fn normalized_base_url(&self) -> Result<String, ValidationError> {
        let trimmed = self.base_url.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Required("baseUrl"));
        }
        if !trimmed.starts_with("http://") && !trimmed.starts_with("https://") {
            return Err(ValidationError::InvalidBaseUrl(trimmed.to_string()));
        }
        Ok(trimmed.trim_end_matches('/').to_string())
    }
}

/// Resolved root URLs shared by every resource client.
#[derive(Debug, Clone)]
pub(crate) struct Endpoints {
    admin_url: String,
    auth_url: String,
}

impl Endpoints {
    pub(crate) fn new(base_url: &str) -> Self {
        Self {
            admin_url: format!("{base_url}/{ADMIN_REALMS_PATH}"),
            auth_url: format!("{base_url}/{REALMS_PATH}"),
        }
    }

    /// `{base}/admin/realms/{realm}/{path}`
    pub(crate) fn admin(&self, realm: &str, path: &str) -> String {
        format!("{}/{}/{}", self.admin_url, segment(realm), path)
    }

    /// `{base}/realms/{realm}/protocol/openid-connect/{endpoint}`
    pub(crate) fn openid_connect(&self, realm: &str, endpoint: &str) -> String {
        format!(
            "{}/{}/protocol/openid-connect/{}",
            self.auth_url,
            segment(realm),
            endpoint
        )
    }
}

/// Percent-encodes a single path segment.
pub(crate) fn segment(value: &str) -> std::borrow::Cow<'_, str> {
    urlencoding::encode(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_stripped() {
        let config = KeycloakConfig::new("https://sso.example.com/");
        assert_eq!(
            config.normalized_base_url().unwrap(),
            "https://sso.example.com"
        );
    }

    #[test]
    fn blank_base_url_is_rejected() {
        let err = KeycloakConfig::new("  ").normalized_base_url().unwrap_err();
        assert_eq!(err.to_string(), "baseUrl is required");
    }

    #[test]
    fn base_url_without_scheme_is_rejected() {
        let err = KeycloakConfig::new("sso.example.com")
            .normalized_base_url()
            .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidBaseUrl(_)));
    }

    #[test]
    fn endpoints_are_realm_scoped() {
        let endpoints = Endpoints::new("http://kc:8080");
        assert_eq!(
            endpoints.admin("demo", "users/42"),
            "http://kc:8080/admin/realms/demo/users/42"
        );
        assert_eq!(
            endpoints.openid_connect("demo", "token"),
            "http://kc:8080/realms/demo/protocol/openid-connect/token"
        );
    }

    #[test]
    fn realm_names_are_percent_encoded() {
        let endpoints = Endpoints::new("http://kc:8080");
        assert_eq!(
            endpoints.admin("my realm", "groups"),
            "http://kc:8080/admin/realms/my%20realm/groups"
        );
    }
}
