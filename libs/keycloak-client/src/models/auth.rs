use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;

use crate::error::ValidationError;
use crate::validation::require;

/// Confidential client used against the token and revocation endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientCredentials {
    pub client_id: String,
    #[serde(rename = "client_secret", default)]
    pub secret: Option<Secret<String>>,
}

impl ClientCredentials {
    pub fn new(client_id: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            secret: Some(Secret::new(secret.into())),
        }
    }

    /// Public client, no secret.
    pub fn public(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            secret: None,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require(&self.client_id, "clientId")
    }

    pub(crate) fn form_params(&self) -> Vec<(String, String)> {
        let mut params = vec![("client_id".to_string(), self.client_id.clone())];
        if let Some(secret) = &self.secret {
            params.push((
                "client_secret".to_string(),
                secret.expose_secret().clone(),
            ));
        }
        params
    }
}

/// Resource owner credentials for the password grant.
#[derive(Debug, Clone, Deserialize)]
pub struct UserLogin {
    pub username: String,
    pub password: Secret<String>,
}

impl UserLogin {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: Secret::new(password.into()),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require(&self.username, "username")?;
        require(self.password.expose_secret(), "password")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_id_is_required() {
        let credentials = ClientCredentials::new(" ", "secret");
        assert_eq!(
            credentials.validate(),
            Err(ValidationError::Required("clientId"))
        );
    }

    #[test]
    fn public_client_sends_no_secret() {
        let params = ClientCredentials::public("spa").form_params();
        assert_eq!(params, vec![("client_id".to_string(), "spa".to_string())]);
    }

    #[test]
    fn user_login_requires_password() {
        let login = UserLogin::new("jdoe", "");
        assert_eq!(login.validate(), Err(ValidationError::Required("password")));
    }

    #[test]
    fn secret_is_redacted_in_debug_output() {
        let credentials = ClientCredentials::new("backend", "do-not-print");
        assert!(!format!("{credentials:?}").contains("do-not-print"));
    }
}
