//! Client-level role mappings of groups and users

use async_trait::async_trait;

use crate::config::segment;
use crate::error::ValidationError;
use crate::models::Role;
use crate::query::QueryBuilder;
use crate::request::KcRequest;
use crate::response::KcResponse;
use crate::validation::{require, require_access};

use super::role_mappings::MappingTarget;
use super::Api;

#[async_trait]
pub trait ClientRoleMappingsApi: Send + Sync {
    /// No request is sent when `roles` is empty.
    async fn add_client_role_mappings(
        &self,
        realm: &str,
        access_token: &str,
        target: MappingTarget<'_>,
        client_id: &str,
        roles: &[Role],
    ) -> Result<KcResponse<()>, ValidationError>;

    async fn list_client_role_mappings(
        &self,
        realm: &str,
        access_token: &str,
        target: MappingTarget<'_>,
        client_id: &str,
    ) -> Result<KcResponse<Vec<Role>>, ValidationError>;

    /// No request is sent when `roles` is empty.
    async fn delete_client_role_mappings(
        &self,
        realm: &str,
        access_token: &str,
        target: MappingTarget<'_>,
        client_id: &str,
        roles: &[Role],
    ) -> Result<KcResponse<()>, ValidationError>;

    async fn list_available_client_role_mappings(
        &self,
        realm: &str,
        access_token: &str,
        target: MappingTarget<'_>,
        client_id: &str,
    ) -> Result<KcResponse<Vec<Role>>, ValidationError>;

    async fn list_composite_client_role_mappings(
        &self,
        realm: &str,
        access_token: &str,
        target: MappingTarget<'_>,
        client_id: &str,
        brief_representation: Option<bool>,
    ) -> Result<KcResponse<Vec<Role>>, ValidationError>;
}

pub struct ClientRoleMappings {
    api: Api,
}

impl ClientRoleMappings {
    pub(crate) fn new(api: Api) -> Self {
        Self { api }
    }

    /// `{target}/role-mappings/clients/{client_id}{suffix}`
    fn url(
        &self,
        realm: &str,
        target: MappingTarget<'_>,
        client_id: &str,
        suffix: &str,
    ) -> String {
        self.api.admin(
            realm,
            &format!(
                "{}/clients/{}{suffix}",
                target.role_mappings_path(),
                segment(client_id)
            ),
        )
    }
}

fn validate(
    realm: &str,
    access_token: &str,
    target: MappingTarget<'_>,
    client_id: &str,
) -> Result<(), ValidationError> {
    require_access(realm, access_token)?;
    target.validate()?;
    require(client_id, "clientId")
}

#[async_trait]
impl ClientRoleMappingsApi for ClientRoleMappings {
    async fn add_client_role_mappings(
        &self,
        realm: &str,
        access_token: &str,
        target: MappingTarget<'_>,
        client_id: &str,
        roles: &[Role],
    ) -> Result<KcResponse<()>, ValidationError> {
        validate(realm, access_token, target, client_id)?;
        if roles.is_empty() {
            return Ok(KcResponse::default());
        }

        Ok(self
            .api
            .send_empty(
                KcRequest::post(self.url(realm, target, client_id, ""))
                    .bearer(access_token)
                    .json(roles),
                &format!("Unable to add {} client role mappings", target.kind()),
            )
            .await)
    }

    async fn list_client_role_mappings(
        &self,
        realm: &str,
        access_token: &str,
        target: MappingTarget<'_>,
        client_id: &str,
    ) -> Result<KcResponse<Vec<Role>>, ValidationError> {
        validate(realm, access_token, target, client_id)?;

        Ok(self
            .api
            .send(
                KcRequest::get(self.url(realm, target, client_id, "")).bearer(access_token),
                &format!("Unable to list {} client role mappings", target.kind()),
            )
            .await)
    }

    async fn delete_client_role_mappings(
        &self,
        realm: &str,
        access_token: &str,
        target: MappingTarget<'_>,
        client_id: &str,
        roles: &[Role],
    ) -> Result<KcResponse<()>, ValidationError> {
        validate(realm, access_token, target, client_id)?;
        if roles.is_empty() {
            return Ok(KcResponse::default());
        }

        Ok(self
            .api
            .send_empty(
                KcRequest::delete(self.url(realm, target, client_id, ""))
                    .bearer(access_token)
                    .json(roles),
                &format!("Unable to delete {} client role mappings", target.kind()),
            )
            .await)
    }

    async fn list_available_client_role_mappings(
        &self,
        realm: &str,
        access_token: &str,
        target: MappingTarget<'_>,
        client_id: &str,
    ) -> Result<KcResponse<Vec<Role>>, ValidationError> {
        validate(realm, access_token, target, client_id)?;

        Ok(self
            .api
            .send(
                KcRequest::get(self.url(realm, target, client_id, "/available"))
                    .bearer(access_token),
                &format!("Unable to list {} available client role mappings", target.kind()),
            )
            .await)
    }

    async fn list_composite_client_role_mappings(
        &self,
        realm: &str,
        access_token: &str,
        target: MappingTarget<'_>,
        client_id: &str,
        brief_representation: Option<bool>,
    ) -> Result<KcResponse<Vec<Role>>, ValidationError> {
        validate(realm, access_token, target, client_id)?;

        let query = QueryBuilder::new()
            .flag("briefRepresentation", brief_representation)
            .build();
        Ok(self
            .api
            .send(
                KcRequest::get(self.url(realm, target, client_id, &format!("/composite{query}")))
                    .bearer(access_token),
                &format!("Unable to list {} composite client role mappings", target.kind()),
            )
            .await)
    }
}
