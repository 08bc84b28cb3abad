use async_trait::async_trait;

use crate::config::segment;
use crate::error::ValidationError;
use crate::models::{ClientInitialAccess, CreateClientInitialAccess};
use crate::request::KcRequest;
use crate::response::KcResponse;
use crate::validation::{require, require_access};

use super::Api;

const CLIENTS_INITIAL_ACCESS: &str = "clients-initial-access";

/// Initial access tokens for dynamic client registration.
#[async_trait]
pub trait ClientInitialAccessApi: Send + Sync {
    async fn create(
        &self,
        realm: &str,
        access_token: &str,
        request: &CreateClientInitialAccess,
    ) -> Result<KcResponse<ClientInitialAccess>, ValidationError>;

    async fn list(
        &self,
        realm: &str,
        access_token: &str,
    ) -> Result<KcResponse<Vec<ClientInitialAccess>>, ValidationError>;

    async fn delete(
        &self,
        realm: &str,
        access_token: &str,
        id: &str,
    ) -> Result<KcResponse<()>, ValidationError>;
}

pub struct ClientInitialAccessTokens {
    api: Api,
}

impl ClientInitialAccessTokens {
    pub(crate) fn new(api: Api) -> Self {
        Self { api }
    }
}

#[async_trait]
impl ClientInitialAccessApi for ClientInitialAccessTokens {
    async fn create(
        &self,
        realm: &str,
        access_token: &str,
        request: &CreateClientInitialAccess,
    ) -> Result<KcResponse<ClientInitialAccess>, ValidationError> {
        require_access(realm, access_token)?;

        let url = self.api.admin(realm, CLIENTS_INITIAL_ACCESS);
        Ok(self
            .api
            .send(
                KcRequest::post(url).bearer(access_token).json(request),
                "Unable to create client initial access token",
            )
            .await)
    }

    async fn list(
        &self,
        realm: &str,
        access_token: &str,
    ) -> Result<KcResponse<Vec<ClientInitialAccess>>, ValidationError> {
        require_access(realm, access_token)?;

        let url = self.api.admin(realm, CLIENTS_INITIAL_ACCESS);
        Ok(self
            .api
            .send(
                KcRequest::get(url).bearer(access_token),
                "Unable to list client initial access tokens",
            )
            .await)
    }

    async fn delete(
        &self,
        realm: &str,
        access_token: &str,
        id: &str,
    ) -> Result<KcResponse<()>, ValidationError> {
        require_access(realm, access_token)?;
        require(id, "id")?;

        let url = self
            .api
            .admin(realm, &format!("{CLIENTS_INITIAL_ACCESS}/{}", segment(id)));
        Ok(self
            .api
            .send_empty(
                KcRequest::delete(url).bearer(access_token),
                "Unable to delete client initial access token",
            )
            .await)
    }
}
