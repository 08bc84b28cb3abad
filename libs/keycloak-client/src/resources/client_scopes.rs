use async_trait::async_trait;

use crate::config::segment;
use crate::error::ValidationError;
use crate::models::ClientScope;
use crate::request::KcRequest;
use crate::response::KcResponse;
use crate::validation::{require, require_access};

use super::Api;

#[async_trait]
pub trait ClientScopesApi: Send + Sync {
    async fn create(
        &self,
        realm: &str,
        access_token: &str,
        scope: &ClientScope,
    ) -> Result<KcResponse<()>, ValidationError>;

    async fn list(
        &self,
        realm: &str,
        access_token: &str,
    ) -> Result<KcResponse<Vec<ClientScope>>, ValidationError>;

    async fn get(
        &self,
        realm: &str,
        access_token: &str,
        scope_id: &str,
    ) -> Result<KcResponse<ClientScope>, ValidationError>;

    async fn update(
        &self,
        realm: &str,
        access_token: &str,
        scope_id: &str,
        scope: &ClientScope,
    ) -> Result<KcResponse<()>, ValidationError>;

    async fn delete(
        &self,
        realm: &str,
        access_token: &str,
        scope_id: &str,
    ) -> Result<KcResponse<()>, ValidationError>;
}

pub struct ClientScopes {
    api: Api,
}

impl ClientScopes {
    pub(crate) fn new(api: Api) -> Self {
        Self { api }
    }

    fn scope_url(&self, realm: &str, scope_id: &str) -> String {
        self.api
            .admin(realm, &format!("client-scopes/{}", segment(scope_id)))
    }
}

#[async_trait]
impl ClientScopesApi for ClientScopes {
    async fn create(
        &self,
        realm: &str,
        access_token: &str,
        scope: &ClientScope,
    ) -> Result<KcResponse<()>, ValidationError> {
        require_access(realm, access_token)?;

        let url = self.api.admin(realm, "client-scopes");
        Ok(self
            .api
            .send_empty(
                KcRequest::post(url).bearer(access_token).json(scope),
                "Unable to create client scope",
            )
            .await)
    }

    async fn list(
        &self,
        realm: &str,
        access_token: &str,
    ) -> Result<KcResponse<Vec<ClientScope>>, ValidationError> {
        require_access(realm, access_token)?;

        let url = self.api.admin(realm, "client-scopes");
        Ok(self
            .api
            .send(
                KcRequest::get(url).bearer(access_token),
                "Unable to list client scopes",
            )
            .await)
    }

    async fn get(
        &self,
        realm: &str,
        access_token: &str,
        scope_id: &str,
    ) -> Result<KcResponse<ClientScope>, ValidationError> {
        require_access(realm, access_token)?;
        require(scope_id, "scopeId")?;

        Ok(self
            .api
            .send(
                KcRequest::get(self.scope_url(realm, scope_id)).bearer(access_token),
                "Unable to get client scope",
            )
            .await)
    }

    async fn update(
        &self,
        realm: &str,
        access_token: &str,
        scope_id: &str,
        scope: &ClientScope,
    ) -> Result<KcResponse<()>, ValidationError> {
        require_access(realm, access_token)?;
        require(scope_id, "scopeId")?;

        Ok(self
            .api
            .send_empty(
                KcRequest::put(self.scope_url(realm, scope_id))
                    .bearer(access_token)
                    .json(scope),
                "Unable to update client scope",
            )
            .await)
    }

    async fn delete(
        &self,
        realm: &str,
        access_token: &str,
        scope_id: &str,
    ) -> Result<KcResponse<()>, ValidationError> {
        require_access(realm, access_token)?;
        require(scope_id, "scopeId")?;

        Ok(self
            .api
            .send_empty(
                KcRequest::delete(self.scope_url(realm, scope_id)).bearer(access_token),
                "Unable to delete client scope",
            )
            .await)
    }
}
