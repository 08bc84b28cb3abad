//! OpenID Connect token, revocation and UMA endpoints

use async_trait::async_trait;
use secrecy::ExposeSecret;

use crate::error::ValidationError;
use crate::models::{ClientCredentials, TokenResponse, UserLogin};
use crate::request::KcRequest;
use crate::response::{KcOperationResponse, KcResponse};
use crate::validation::{require, require_access};

use super::Api;

const TOKEN_ENDPOINT: &str = "token";
const REVOCATION_ENDPOINT: &str = "revoke";
const UMA_TICKET_GRANT: &str = "urn:ietf:params:oauth:grant-type:uma-ticket";

/// Optional parameters of the resource owner password grant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PasswordGrantOptions {
    pub scope: Option<String>,
    pub resource: Option<String>,
}

#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn get_client_credentials_token(
        &self,
        realm: &str,
        credentials: &ClientCredentials,
    ) -> Result<KcResponse<TokenResponse>, ValidationError>;

    async fn get_resource_owner_password_token(
        &self,
        realm: &str,
        credentials: &ClientCredentials,
        login: &UserLogin,
        options: &PasswordGrantOptions,
    ) -> Result<KcResponse<TokenResponse>, ValidationError>;

    async fn refresh_access_token(
        &self,
        realm: &str,
        credentials: &ClientCredentials,
        refresh_token: &str,
    ) -> Result<KcResponse<TokenResponse>, ValidationError>;

    /// Payload is `true` when Keycloak accepted the revocation.
    async fn revoke_access_token(
        &self,
        realm: &str,
        credentials: &ClientCredentials,
        access_token: &str,
    ) -> Result<KcResponse<bool>, ValidationError>;

    async fn revoke_refresh_token(
        &self,
        realm: &str,
        credentials: &ClientCredentials,
        refresh_token: &str,
    ) -> Result<KcResponse<bool>, ValidationError>;

    /// Exchanges `access_token` for a request party token scoped to `audience`.
    async fn get_request_party_token(
        &self,
        realm: &str,
        access_token: &str,
        audience: &str,
        permissions: &[String],
    ) -> Result<KcResponse<TokenResponse>, ValidationError>;

    /// Checks a user's password by requesting a password-grant token, then
    /// revokes whatever tokens were issued.
    ///
    /// A rejected login is not an error: the payload is `false` and
    /// `is_error` stays unset as long as Keycloak explained the rejection.
    async fn validate_password(
        &self,
        realm: &str,
        credentials: &ClientCredentials,
        login: &UserLogin,
    ) -> Result<KcOperationResponse<bool>, ValidationError> {
        let token_response = self
            .get_resource_owner_password_token(
                realm,
                credentials,
                login,
                &PasswordGrantOptions::default(),
            )
            .await?;

        let mut operation = KcOperationResponse::default();
        operation.record(&token_response);

        if token_response.is_error {
            return Ok(operation.reject(token_response));
        }

        let token = token_response.response.unwrap_or_default();
        let refresh_token = token.refresh_token.unwrap_or_default();

        if !token.access_token.trim().is_empty() {
            let revoked = self
                .revoke_access_token(realm, credentials, &token.access_token)
                .await?;
            operation.record(&revoked);
        }
        if !refresh_token.trim().is_empty() {
            let revoked = self
                .revoke_refresh_token(realm, credentials, &refresh_token)
                .await?;
            operation.record(&revoked);
        }

        operation.response = Some(true);
        Ok(operation)
    }
}

/// Token endpoint client.
pub struct Auth {
    api: Api,
}

impl Auth {
    pub(crate) fn new(api: Api) -> Self {
        Self { api }
    }

    async fn token_request(
        &self,
        realm: &str,
        form: Vec<(String, String)>,
        context: &str,
    ) -> KcResponse<TokenResponse> {
        let url = self.api.openid_connect(realm, TOKEN_ENDPOINT);
        self.api.send(KcRequest::post(url).form(form), context).await
    }

    async fn revoke(
        &self,
        realm: &str,
        credentials: &ClientCredentials,
        token: &str,
        token_type_hint: &str,
        context: &str,
    ) -> KcResponse<bool> {
        let mut form = credentials.form_params();
        form.push(("token".to_string(), token.to_string()));
        form.push(("token_type_hint".to_string(), token_type_hint.to_string()));

        let url = self.api.openid_connect(realm, REVOCATION_ENDPOINT);
        let response = self
            .api
            .send_empty(KcRequest::post(url).form(form), context)
            .await;
        let accepted = response.status_code().is_some_and(|s| s.is_success());
        response.map(|_| Some(accepted))
    }
}

fn grant(grant_type: &str) -> (String, String) {
    ("grant_type".to_string(), grant_type.to_string())
}

#[async_trait]
impl AuthApi for Auth {
    async fn get_client_credentials_token(
        &self,
        realm: &str,
        credentials: &ClientCredentials,
    ) -> Result<KcResponse<TokenResponse>, ValidationError> {
        require(realm, "realm")?;
        credentials.validate()?;

        let mut form = credentials.form_params();
        form.push(grant("client_credentials"));

        Ok(self
            .token_request(realm, form, "Unable to get client credentials token")
            .await)
    }

    async fn get_resource_owner_password_token(
        &self,
        realm: &str,
        credentials: &ClientCredentials,
        login: &UserLogin,
        options: &PasswordGrantOptions,
    ) -> Result<KcResponse<TokenResponse>, ValidationError> {
        require(realm, "realm")?;
        credentials.validate()?;
        login.validate()?;

        let mut form = credentials.form_params();
        form.push(grant("password"));
        form.push(("username".to_string(), login.username.clone()));
        form.push((
            "password".to_string(),
            login.password.expose_secret().clone(),
        ));
        for (name, value) in [("scope", &options.scope), ("resource", &options.resource)] {
            if let Some(value) = value.as_deref().filter(|v| !v.trim().is_empty()) {
                form.push((name.to_string(), value.to_string()));
            }
        }

        Ok(self
            .token_request(realm, form, "Unable to get resource owner password token")
            .await)
    }

    async fn refresh_access_token(
        &self,
        realm: &str,
        credentials: &ClientCredentials,
        refresh_token: &str,
    ) -> Result<KcResponse<TokenResponse>, ValidationError> {
        require(realm, "realm")?;
        require(refresh_token, "refreshToken")?;
        credentials.validate()?;

        let mut form = credentials.form_params();
        form.push(grant("refresh_token"));
        form.push(("refresh_token".to_string(), refresh_token.to_string()));

        Ok(self
            .token_request(realm, form, "Unable to refresh access token")
            .await)
    }

    async fn revoke_access_token(
        &self,
        realm: &str,
        credentials: &ClientCredentials,
        access_token: &str,
    ) -> Result<KcResponse<bool>, ValidationError> {
        require(realm, "realm")?;
        require(access_token, "accessToken")?;
        credentials.validate()?;

        Ok(self
            .revoke(
                realm,
                credentials,
                access_token,
                "access_token",
                "Unable to revoke access token",
            )
            .await)
    }

    async fn revoke_refresh_token(
        &self,
        realm: &str,
        credentials: &ClientCredentials,
        refresh_token: &str,
    ) -> Result<KcResponse<bool>, ValidationError> {
        require(realm, "realm")?;
        require(refresh_token, "refreshToken")?;
        credentials.validate()?;

        Ok(self
            .revoke(
                realm,
                credentials,
                refresh_token,
                "refresh_token",
                "Unable to revoke refresh token",
            )
            .await)
    }

    async fn get_request_party_token(
        &self,
        realm: &str,
        access_token: &str,
        audience: &str,
        permissions: &[String],
    ) -> Result<KcResponse<TokenResponse>, ValidationError> {
        require_access(realm, access_token)?;
        require(audience, "audience")?;

        let mut form = vec![
            grant(UMA_TICKET_GRANT),
            ("audience".to_string(), audience.to_string()),
        ];
        form.extend(
            permissions
                .iter()
                .map(|permission| ("permission".to_string(), permission.clone())),
        );

        let url = self.api.openid_connect(realm, TOKEN_ENDPOINT);
        Ok(self
            .api
            .send(
                KcRequest::post(url).bearer(access_token).form(form),
                "Unable to get request party token",
            )
            .await)
    }
}
