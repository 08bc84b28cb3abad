//! Roles attached to the scope of a client scope or of a client

use async_trait::async_trait;

use crate::config::segment;
use crate::error::ValidationError;
use crate::models::Role;
use crate::query::Filter;
use crate::request::KcRequest;
use crate::response::KcResponse;
use crate::validation::{require, require_access};

use super::Api;

/// Entity whose scope holds the mapped roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeOwner<'a> {
    ClientScope(&'a str),
    Client(&'a str),
}

impl ScopeOwner<'_> {
    pub(crate) fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Self::ClientScope(id) => require(id, "scopeId"),
            Self::Client(id) => require(id, "clientId"),
        }
    }

    /// Name reported when the client owning the mapped roles is missing.
    fn role_client_name(&self) -> &'static str {
        match self {
            Self::ClientScope(_) => "clientId",
            Self::Client(_) => "clientName",
        }
    }

    fn scope_mappings_path(&self) -> String {
        match self {
            Self::ClientScope(id) => format!("client-scopes/{}/scope-mappings", segment(id)),
            Self::Client(id) => format!("clients/{}/scope-mappings", segment(id)),
        }
    }
}

#[async_trait]
pub trait ScopeMappingsApi: Send + Sync {
    /// Adds roles of `role_client` to the owner's scope. No request is sent
    /// when `roles` is empty.
    async fn add_client_roles(
        &self,
        realm: &str,
        access_token: &str,
        owner: ScopeOwner<'_>,
        role_client: &str,
        roles: &[Role],
    ) -> Result<KcResponse<()>, ValidationError>;

    async fn list_client_roles(
        &self,
        realm: &str,
        access_token: &str,
        owner: ScopeOwner<'_>,
        role_client: &str,
    ) -> Result<KcResponse<Vec<Role>>, ValidationError>;

    /// No request is sent when `roles` is empty.
    async fn remove_client_roles(
        &self,
        realm: &str,
        access_token: &str,
        owner: ScopeOwner<'_>,
        role_client: &str,
        roles: &[Role],
    ) -> Result<KcResponse<()>, ValidationError>;

    async fn available_client_roles(
        &self,
        realm: &str,
        access_token: &str,
        owner: ScopeOwner<'_>,
        role_client: &str,
    ) -> Result<KcResponse<Vec<Role>>, ValidationError>;

    async fn composite_client_roles(
        &self,
        realm: &str,
        access_token: &str,
        owner: ScopeOwner<'_>,
        role_client: &str,
        filter: Option<&Filter>,
    ) -> Result<KcResponse<Vec<Role>>, ValidationError>;

    /// No request is sent when `roles` is empty.
    async fn add_realm_roles(
        &self,
        realm: &str,
        access_token: &str,
        owner: ScopeOwner<'_>,
        roles: &[Role],
    ) -> Result<KcResponse<()>, ValidationError>;

    async fn list_realm_roles(
        &self,
        realm: &str,
        access_token: &str,
        owner: ScopeOwner<'_>,
    ) -> Result<KcResponse<Vec<Role>>, ValidationError>;

    /// No request is sent when `roles` is empty.
    async fn remove_realm_roles(
        &self,
        realm: &str,
        access_token: &str,
        owner: ScopeOwner<'_>,
        roles: &[Role],
    ) -> Result<KcResponse<()>, ValidationError>;

    async fn available_realm_roles(
        &self,
        realm: &str,
        access_token: &str,
        owner: ScopeOwner<'_>,
    ) -> Result<KcResponse<Vec<Role>>, ValidationError>;

    async fn composite_realm_roles(
        &self,
        realm: &str,
        access_token: &str,
        owner: ScopeOwner<'_>,
        filter: Option<&Filter>,
    ) -> Result<KcResponse<Vec<Role>>, ValidationError>;
}

pub struct ScopeMappings {
    api: Api,
}

impl ScopeMappings {
    pub(crate) fn new(api: Api) -> Self {
        Self { api }
    }

    fn client_level_url(
        &self,
        realm: &str,
        owner: ScopeOwner<'_>,
        role_client: &str,
        suffix: &str,
    ) -> String {
        self.api.admin(
            realm,
            &format!(
                "{}/clients/{}{suffix}",
                owner.scope_mappings_path(),
                segment(role_client)
            ),
        )
    }

    fn realm_level_url(&self, realm: &str, owner: ScopeOwner<'_>, suffix: &str) -> String {
        self.api
            .admin(realm, &format!("{}/realm{suffix}", owner.scope_mappings_path()))
    }
}

fn validate_owner(
    realm: &str,
    access_token: &str,
    owner: ScopeOwner<'_>,
) -> Result<(), ValidationError> {
    require_access(realm, access_token)?;
    owner.validate()
}

fn validate_client_level(
    realm: &str,
    access_token: &str,
    owner: ScopeOwner<'_>,
    role_client: &str,
) -> Result<(), ValidationError> {
    validate_owner(realm, access_token, owner)?;
    require(role_client, owner.role_client_name())
}

fn filter_query(filter: Option<&Filter>) -> String {
    filter.map_or_else(|| Filter::default().to_query(), Filter::to_query)
}

#[async_trait]
impl ScopeMappingsApi for ScopeMappings {
    async fn add_client_roles(
        &self,
        realm: &str,
        access_token: &str,
        owner: ScopeOwner<'_>,
        role_client: &str,
        roles: &[Role],
    ) -> Result<KcResponse<()>, ValidationError> {
        validate_client_level(realm, access_token, owner, role_client)?;
        if roles.is_empty() {
            return Ok(KcResponse::default());
        }

        Ok(self
            .api
            .send_empty(
                KcRequest::post(self.client_level_url(realm, owner, role_client, ""))
                    .bearer(access_token)
                    .json(roles),
                "Unable to add client-level roles to the client's scope",
            )
            .await)
    }

    async fn list_client_roles(
        &self,
        realm: &str,
        access_token: &str,
        owner: ScopeOwner<'_>,
        role_client: &str,
    ) -> Result<KcResponse<Vec<Role>>, ValidationError> {
        validate_client_level(realm, access_token, owner, role_client)?;

        Ok(self
            .api
            .send(
                KcRequest::get(self.client_level_url(realm, owner, role_client, ""))
                    .bearer(access_token),
                "Unable to get the roles associated with a client's scope",
            )
            .await)
    }

    async fn remove_client_roles(
        &self,
        realm: &str,
        access_token: &str,
        owner: ScopeOwner<'_>,
        role_client: &str,
        roles: &[Role],
    ) -> Result<KcResponse<()>, ValidationError> {
        validate_client_level(realm, access_token, owner, role_client)?;
        if roles.is_empty() {
            return Ok(KcResponse::default());
        }

        Ok(self
            .api
            .send_empty(
                KcRequest::delete(self.client_level_url(realm, owner, role_client, ""))
                    .bearer(access_token)
                    .json(roles),
                "Unable to remove client-level roles from the client's scope",
            )
            .await)
    }

    async fn available_client_roles(
        &self,
        realm: &str,
        access_token: &str,
        owner: ScopeOwner<'_>,
        role_client: &str,
    ) -> Result<KcResponse<Vec<Role>>, ValidationError> {
        validate_client_level(realm, access_token, owner, role_client)?;

        Ok(self
            .api
            .send(
                KcRequest::get(self.client_level_url(realm, owner, role_client, "/available"))
                    .bearer(access_token),
                "Unable to list client roles available to the client's scope",
            )
            .await)
    }

    async fn composite_client_roles(
        &self,
        realm: &str,
        access_token: &str,
        owner: ScopeOwner<'_>,
        role_client: &str,
        filter: Option<&Filter>,
    ) -> Result<KcResponse<Vec<Role>>, ValidationError> {
        validate_client_level(realm, access_token, owner, role_client)?;

        let suffix = format!("/composite{}", filter_query(filter));
        Ok(self
            .api
            .send(
                KcRequest::get(self.client_level_url(realm, owner, role_client, &suffix))
                    .bearer(access_token),
                "Unable to list effective client roles of the client's scope",
            )
            .await)
    }

    async fn add_realm_roles(
        &self,
        realm: &str,
        access_token: &str,
        owner: ScopeOwner<'_>,
        roles: &[Role],
    ) -> Result<KcResponse<()>, ValidationError> {
        validate_owner(realm, access_token, owner)?;
        if roles.is_empty() {
            return Ok(KcResponse::default());
        }

        Ok(self
            .api
            .send_empty(
                KcRequest::post(self.realm_level_url(realm, owner, ""))
                    .bearer(access_token)
                    .json(roles),
                "Unable to add a set of realm-level roles to the client's scope",
            )
            .await)
    }

    async fn list_realm_roles(
        &self,
        realm: &str,
        access_token: &str,
        owner: ScopeOwner<'_>,
    ) -> Result<KcResponse<Vec<Role>>, ValidationError> {
        validate_owner(realm, access_token, owner)?;

        Ok(self
            .api
            .send(
                KcRequest::get(self.realm_level_url(realm, owner, "")).bearer(access_token),
                "Unable to get realm-level roles associated with the client's scope",
            )
            .await)
    }

    async fn remove_realm_roles(
        &self,
        realm: &str,
        access_token: &str,
        owner: ScopeOwner<'_>,
        roles: &[Role],
    ) -> Result<KcResponse<()>, ValidationError> {
        validate_owner(realm, access_token, owner)?;
        if roles.is_empty() {
            return Ok(KcResponse::default());
        }

        Ok(self
            .api
            .send_empty(
                KcRequest::delete(self.realm_level_url(realm, owner, ""))
                    .bearer(access_token)
                    .json(roles),
                "Unable to remove a set of realm-level roles from the client's scope",
            )
            .await)
    }

    async fn available_realm_roles(
        &self,
        realm: &str,
        access_token: &str,
        owner: ScopeOwner<'_>,
    ) -> Result<KcResponse<Vec<Role>>, ValidationError> {
        validate_owner(realm, access_token, owner)?;

        Ok(self
            .api
            .send(
                KcRequest::get(self.realm_level_url(realm, owner, "/available"))
                    .bearer(access_token),
                "Unable to list realm roles available to the client's scope",
            )
            .await)
    }

    async fn composite_realm_roles(
        &self,
        realm: &str,
        access_token: &str,
        owner: ScopeOwner<'_>,
        filter: Option<&Filter>,
    ) -> Result<KcResponse<Vec<Role>>, ValidationError> {
        validate_owner(realm, access_token, owner)?;

        let suffix = format!("/composite{}", filter_query(filter));
        Ok(self
            .api
            .send(
                KcRequest::get(self.realm_level_url(realm, owner, &suffix)).bearer(access_token),
                "Unable to list effective realm-level roles associated with the client's scope",
            )
            .await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_selects_scope_mappings_root() {
        assert_eq!(
            ScopeOwner::ClientScope("s1").scope_mappings_path(),
            "client-scopes/s1/scope-mappings"
        );
        assert_eq!(
            ScopeOwner::Client("c1").scope_mappings_path(),
            "clients/c1/scope-mappings"
        );
    }

    #[test]
    fn missing_role_client_is_named_after_owner() {
        assert_eq!(
            validate_client_level("demo", "token", ScopeOwner::ClientScope("s1"), ""),
            Err(ValidationError::Required("clientId"))
        );
        assert_eq!(
            validate_client_level("demo", "token", ScopeOwner::Client("c1"), ""),
            Err(ValidationError::Required("clientName"))
        );
        assert_eq!(
            validate_owner("demo", "token", ScopeOwner::ClientScope("")),
            Err(ValidationError::Required("scopeId"))
        );
    }
}
