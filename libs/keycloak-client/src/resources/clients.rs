//! Keycloak clients (relying-party registrations) of a realm

use std::collections::HashMap;

use async_trait::async_trait;

use crate::config::segment;
use crate::error::ValidationError;
use crate::models::{
    AccessToken, Client, ClientScope, Count, Credentials, GlobalRequestResult,
    PermissionManagement, ProtocolMapper, Session, User,
};
use crate::query::{ClientFilter, Filter, QueryBuilder};
use crate::request::KcRequest;
use crate::response::KcResponse;
use crate::validation::{require, require_access};

use super::Api;

#[async_trait]
pub trait ClientsApi: Send + Sync {
    async fn create(
        &self,
        realm: &str,
        access_token: &str,
        client: &Client,
    ) -> Result<KcResponse<()>, ValidationError>;

    async fn list(
        &self,
        realm: &str,
        access_token: &str,
        filter: Option<&ClientFilter>,
    ) -> Result<KcResponse<Vec<Client>>, ValidationError>;

    /// `id` is the internal id, not the `clientId`.
    async fn get(
        &self,
        realm: &str,
        access_token: &str,
        id: &str,
    ) -> Result<KcResponse<Client>, ValidationError>;

    async fn update(
        &self,
        realm: &str,
        access_token: &str,
        id: &str,
        client: &Client,
    ) -> Result<KcResponse<()>, ValidationError>;

    async fn delete(
        &self,
        realm: &str,
        access_token: &str,
        id: &str,
    ) -> Result<KcResponse<()>, ValidationError>;

    async fn generate_new_secret(
        &self,
        realm: &str,
        access_token: &str,
        id: &str,
    ) -> Result<KcResponse<Credentials>, ValidationError>;

    async fn get_secret(
        &self,
        realm: &str,
        access_token: &str,
        id: &str,
    ) -> Result<KcResponse<Credentials>, ValidationError>;

    async fn get_rotated_secret(
        &self,
        realm: &str,
        access_token: &str,
        id: &str,
    ) -> Result<KcResponse<Credentials>, ValidationError>;

    async fn invalidate_rotated_secret(
        &self,
        realm: &str,
        access_token: &str,
        id: &str,
    ) -> Result<KcResponse<Credentials>, ValidationError>;

    async fn default_scopes(
        &self,
        realm: &str,
        access_token: &str,
        id: &str,
    ) -> Result<KcResponse<Vec<ClientScope>>, ValidationError>;

    async fn add_default_scope(
        &self,
        realm: &str,
        access_token: &str,
        id: &str,
        scope_id: &str,
    ) -> Result<KcResponse<()>, ValidationError>;

    async fn delete_default_scope(
        &self,
        realm: &str,
        access_token: &str,
        id: &str,
        scope_id: &str,
    ) -> Result<KcResponse<()>, ValidationError>;

    async fn optional_scopes(
        &self,
        realm: &str,
        access_token: &str,
        id: &str,
    ) -> Result<KcResponse<Vec<ClientScope>>, ValidationError>;

    async fn add_optional_scope(
        &self,
        realm: &str,
        access_token: &str,
        id: &str,
        scope_id: &str,
    ) -> Result<KcResponse<()>, ValidationError>;

    async fn delete_optional_scope(
        &self,
        realm: &str,
        access_token: &str,
        id: &str,
        scope_id: &str,
    ) -> Result<KcResponse<()>, ValidationError>;

    /// Access token Keycloak would issue to `user_id` for this client.
    async fn generate_example_access_token(
        &self,
        realm: &str,
        access_token: &str,
        id: &str,
        user_id: &str,
        scope: Option<&str>,
    ) -> Result<KcResponse<AccessToken>, ValidationError>;

    async fn generate_example_id_token(
        &self,
        realm: &str,
        access_token: &str,
        id: &str,
        user_id: &str,
        scope: Option<&str>,
    ) -> Result<KcResponse<AccessToken>, ValidationError>;

    /// Userinfo claims are free-form, so the payload is raw JSON.
    async fn generate_example_user_info(
        &self,
        realm: &str,
        access_token: &str,
        id: &str,
        user_id: &str,
        scope: Option<&str>,
    ) -> Result<KcResponse<serde_json::Value>, ValidationError>;

    async fn protocol_mappers(
        &self,
        realm: &str,
        access_token: &str,
        id: &str,
        scope: Option<&str>,
    ) -> Result<KcResponse<Vec<ProtocolMapper>>, ValidationError>;

    async fn scoped_protocol_mappers_in_container(
        &self,
        realm: &str,
        access_token: &str,
        id: &str,
        role_container_id: &str,
        scope: Option<&str>,
    ) -> Result<KcResponse<Vec<ProtocolMapper>>, ValidationError>;

    async fn unscoped_protocol_mappers_in_container(
        &self,
        realm: &str,
        access_token: &str,
        id: &str,
        role_container_id: &str,
        scope: Option<&str>,
    ) -> Result<KcResponse<Vec<ProtocolMapper>>, ValidationError>;

    async fn get_authorization_management_permission(
        &self,
        realm: &str,
        access_token: &str,
        id: &str,
    ) -> Result<KcResponse<PermissionManagement>, ValidationError>;

    async fn set_authorization_management_permission(
        &self,
        realm: &str,
        access_token: &str,
        id: &str,
        permission: &PermissionManagement,
    ) -> Result<KcResponse<PermissionManagement>, ValidationError>;

    async fn register_node(
        &self,
        realm: &str,
        access_token: &str,
        id: &str,
        node: &HashMap<String, String>,
    ) -> Result<KcResponse<()>, ValidationError>;

    async fn delete_node(
        &self,
        realm: &str,
        access_token: &str,
        id: &str,
        node_name: &str,
    ) -> Result<KcResponse<()>, ValidationError>;

    async fn count_offline_sessions(
        &self,
        realm: &str,
        access_token: &str,
        id: &str,
    ) -> Result<KcResponse<Count>, ValidationError>;

    async fn offline_sessions(
        &self,
        realm: &str,
        access_token: &str,
        id: &str,
        filter: Option<&Filter>,
    ) -> Result<KcResponse<Vec<Session>>, ValidationError>;

    async fn push_revocation(
        &self,
        realm: &str,
        access_token: &str,
        id: &str,
    ) -> Result<KcResponse<GlobalRequestResult>, ValidationError>;

    /// Regenerates the registration access token; the client comes back with it set.
    async fn registration_access_token(
        &self,
        realm: &str,
        access_token: &str,
        id: &str,
    ) -> Result<KcResponse<Client>, ValidationError>;

    async fn service_account_user(
        &self,
        realm: &str,
        access_token: &str,
        id: &str,
    ) -> Result<KcResponse<User>, ValidationError>;

    async fn count_sessions(
        &self,
        realm: &str,
        access_token: &str,
        id: &str,
    ) -> Result<KcResponse<Count>, ValidationError>;

    async fn test_available_nodes(
        &self,
        realm: &str,
        access_token: &str,
        id: &str,
    ) -> Result<KcResponse<GlobalRequestResult>, ValidationError>;

    async fn user_sessions(
        &self,
        realm: &str,
        access_token: &str,
        id: &str,
        filter: Option<&Filter>,
    ) -> Result<KcResponse<Vec<Session>>, ValidationError>;
}

pub struct Clients {
    api: Api,
}

impl Clients {
    pub(crate) fn new(api: Api) -> Self {
        Self { api }
    }

    fn client_url(&self, realm: &str, id: &str, suffix: &str) -> String {
        self.api
            .admin(realm, &format!("clients/{}{suffix}", segment(id)))
    }

    async fn get_from<T: serde::de::DeserializeOwned>(
        &self,
        realm: &str,
        access_token: &str,
        id: &str,
        suffix: &str,
        context: &str,
    ) -> Result<KcResponse<T>, ValidationError> {
        validate_client(realm, access_token, id)?;

        Ok(self
            .api
            .send(
                KcRequest::get(self.client_url(realm, id, suffix)).bearer(access_token),
                context,
            )
            .await)
    }

    fn evaluate_url(&self, realm: &str, id: &str, path: &str, query: QueryBuilder) -> String {
        self.client_url(realm, id, &format!("/evaluate-scopes/{path}{}", query.build()))
    }
}

fn validate_client(realm: &str, access_token: &str, id: &str) -> Result<(), ValidationError> {
    require_access(realm, access_token)?;
    require(id, "id")
}

fn filter_query(filter: Option<&Filter>) -> String {
    filter.map_or_else(|| Filter::default().to_query(), Filter::to_query)
}

/// `?scope=..&userId=..`; scope is left out when blank.
fn example_query(user_id: &str, scope: Option<&str>) -> QueryBuilder {
    QueryBuilder::new()
        .text("scope", scope)
        .text("userId", Some(user_id))
}

#[async_trait]
impl ClientsApi for Clients {
    async fn create(
        &self,
        realm: &str,
        access_token: &str,
        client: &Client,
    ) -> Result<KcResponse<()>, ValidationError> {
        require_access(realm, access_token)?;

        Ok(self
            .api
            .send_empty(
                KcRequest::post(self.api.admin(realm, "clients"))
                    .bearer(access_token)
                    .json(client),
                "Unable to add realm client",
            )
            .await)
    }

    async fn list(
        &self,
        realm: &str,
        access_token: &str,
        filter: Option<&ClientFilter>,
    ) -> Result<KcResponse<Vec<Client>>, ValidationError> {
        require_access(realm, access_token)?;

        let query =
            filter.map_or_else(|| ClientFilter::default().to_query(), ClientFilter::to_query);
        Ok(self
            .api
            .send(
                KcRequest::get(self.api.admin(realm, &format!("clients{query}")))
                    .bearer(access_token),
                "Unable to list realm client",
            )
            .await)
    }

    async fn get(
        &self,
        realm: &str,
        access_token: &str,
        id: &str,
    ) -> Result<KcResponse<Client>, ValidationError> {
        self.get_from(realm, access_token, id, "", "Unable to get realm client")
            .await
    }

    async fn update(
        &self,
        realm: &str,
        access_token: &str,
        id: &str,
        client: &Client,
    ) -> Result<KcResponse<()>, ValidationError> {
        validate_client(realm, access_token, id)?;

        Ok(self
            .api
            .send_empty(
                KcRequest::put(self.client_url(realm, id, ""))
                    .bearer(access_token)
                    .json(client),
                "Unable to update realm client",
            )
            .await)
    }

    async fn delete(
        &self,
        realm: &str,
        access_token: &str,
        id: &str,
    ) -> Result<KcResponse<()>, ValidationError> {
        validate_client(realm, access_token, id)?;

        Ok(self
            .api
            .send_empty(
                KcRequest::delete(self.client_url(realm, id, "")).bearer(access_token),
                "Unable to delete realm client",
            )
            .await)
    }

    async fn generate_new_secret(
        &self,
        realm: &str,
        access_token: &str,
        id: &str,
    ) -> Result<KcResponse<Credentials>, ValidationError> {
        validate_client(realm, access_token, id)?;

        Ok(self
            .api
            .send(
                KcRequest::post(self.client_url(realm, id, "/client-secret")).bearer(access_token),
                "Unable to generate realm client new secret",
            )
            .await)
    }

    async fn get_secret(
        &self,
        realm: &str,
        access_token: &str,
        id: &str,
    ) -> Result<KcResponse<Credentials>, ValidationError> {
        self.get_from(
            realm,
            access_token,
            id,
            "/client-secret",
            "Unable to get realm client secret",
        )
        .await
    }

    async fn get_rotated_secret(
        &self,
        realm: &str,
        access_token: &str,
        id: &str,
    ) -> Result<KcResponse<Credentials>, ValidationError> {
        self.get_from(
            realm,
            access_token,
            id,
            "/client-secret/rotated",
            "Unable to get realm client rotated secret",
        )
        .await
    }

    async fn invalidate_rotated_secret(
        &self,
        realm: &str,
        access_token: &str,
        id: &str,
    ) -> Result<KcResponse<Credentials>, ValidationError> {
        validate_client(realm, access_token, id)?;

        Ok(self
            .api
            .send(
                KcRequest::delete(self.client_url(realm, id, "/client-secret/rotated"))
                    .bearer(access_token),
                "Unable to invalidate realm client rotated secret",
            )
            .await)
    }

    async fn default_scopes(
        &self,
        realm: &str,
        access_token: &str,
        id: &str,
    ) -> Result<KcResponse<Vec<ClientScope>>, ValidationError> {
        self.get_from(
            realm,
            access_token,
            id,
            "/default-client-scopes",
            "Unable to list realm client default scopes",
        )
        .await
    }

    async fn add_default_scope(
        &self,
        realm: &str,
        access_token: &str,
        id: &str,
        scope_id: &str,
    ) -> Result<KcResponse<()>, ValidationError> {
        validate_client(realm, access_token, id)?;
        require(scope_id, "scopeId")?;

        let suffix = format!("/default-client-scopes/{}", segment(scope_id));
        Ok(self
            .api
            .send_empty(
                KcRequest::put(self.client_url(realm, id, &suffix)).bearer(access_token),
                "Unable to add scope to realm client default scopes",
            )
            .await)
    }

    async fn delete_default_scope(
        &self,
        realm: &str,
        access_token: &str,
        id: &str,
        scope_id: &str,
    ) -> Result<KcResponse<()>, ValidationError> {
        validate_client(realm, access_token, id)?;
        require(scope_id, "scopeId")?;

        let suffix = format!("/default-client-scopes/{}", segment(scope_id));
        Ok(self
            .api
            .send_empty(
                KcRequest::delete(self.client_url(realm, id, &suffix)).bearer(access_token),
                "Unable to delete scope from realm client default scopes",
            )
            .await)
    }

    async fn optional_scopes(
        &self,
        realm: &str,
        access_token: &str,
        id: &str,
    ) -> Result<KcResponse<Vec<ClientScope>>, ValidationError> {
        self.get_from(
            realm,
            access_token,
            id,
            "/optional-client-scopes",
            "Unable to get realm client optional scopes",
        )
        .await
    }

    async fn add_optional_scope(
        &self,
        realm: &str,
        access_token: &str,
        id: &str,
        scope_id: &str,
    ) -> Result<KcResponse<()>, ValidationError> {
        validate_client(realm, access_token, id)?;
        require(scope_id, "scopeId")?;

        let suffix = format!("/optional-client-scopes/{}", segment(scope_id));
        Ok(self
            .api
            .send_empty(
                KcRequest::put(self.client_url(realm, id, &suffix)).bearer(access_token),
                "Unable to add scope to realm client optional scopes",
            )
            .await)
    }

    async fn delete_optional_scope(
        &self,
        realm: &str,
        access_token: &str,
        id: &str,
        scope_id: &str,
    ) -> Result<KcResponse<()>, ValidationError> {
        validate_client(realm, access_token, id)?;
        require(scope_id, "scopeId")?;

        let suffix = format!("/optional-client-scopes/{}", segment(scope_id));
        Ok(self
            .api
            .send_empty(
                KcRequest::delete(self.client_url(realm, id, &suffix)).bearer(access_token),
                "Unable to delete scope from realm client optional scopes",
            )
            .await)
    }

    async fn generate_example_access_token(
        &self,
        realm: &str,
        access_token: &str,
        id: &str,
        user_id: &str,
        scope: Option<&str>,
    ) -> Result<KcResponse<AccessToken>, ValidationError> {
        validate_client(realm, access_token, id)?;
        require(user_id, "userId")?;

        let url = self.evaluate_url(
            realm,
            id,
            "generate-example-access-token",
            example_query(user_id, scope),
        );
        Ok(self
            .api
            .send(
                KcRequest::get(url).bearer(access_token),
                "Unable to generate realm client example access token",
            )
            .await)
    }

    async fn generate_example_id_token(
        &self,
        realm: &str,
        access_token: &str,
        id: &str,
        user_id: &str,
        scope: Option<&str>,
    ) -> Result<KcResponse<AccessToken>, ValidationError> {
        validate_client(realm, access_token, id)?;
        require(user_id, "userId")?;

        let url = self.evaluate_url(
            realm,
            id,
            "generate-example-id-token",
            example_query(user_id, scope),
        );
        Ok(self
            .api
            .send(
                KcRequest::get(url).bearer(access_token),
                "Unable to generate realm client example ID token",
            )
            .await)
    }

    async fn generate_example_user_info(
        &self,
        realm: &str,
        access_token: &str,
        id: &str,
        user_id: &str,
        scope: Option<&str>,
    ) -> Result<KcResponse<serde_json::Value>, ValidationError> {
        validate_client(realm, access_token, id)?;
        require(user_id, "userId")?;

        let url = self.evaluate_url(
            realm,
            id,
            "generate-example-userinfo",
            example_query(user_id, scope),
        );
        Ok(self
            .api
            .send(
                KcRequest::get(url).bearer(access_token),
                "Unable to generate realm client example user info",
            )
            .await)
    }

    async fn protocol_mappers(
        &self,
        realm: &str,
        access_token: &str,
        id: &str,
        scope: Option<&str>,
    ) -> Result<KcResponse<Vec<ProtocolMapper>>, ValidationError> {
        validate_client(realm, access_token, id)?;

        let url = self.evaluate_url(
            realm,
            id,
            "protocol-mappers",
            QueryBuilder::new().text("scope", scope),
        );
        Ok(self
            .api
            .send(
                KcRequest::get(url).bearer(access_token),
                "Unable to retrieve protocol mappers for the client",
            )
            .await)
    }

    async fn scoped_protocol_mappers_in_container(
        &self,
        realm: &str,
        access_token: &str,
        id: &str,
        role_container_id: &str,
        scope: Option<&str>,
    ) -> Result<KcResponse<Vec<ProtocolMapper>>, ValidationError> {
        validate_client(realm, access_token, id)?;
        require(role_container_id, "roleContainerId")?;

        let url = self.evaluate_url(
            realm,
            id,
            &format!("scope-mappings/{}/granted", segment(role_container_id)),
            QueryBuilder::new()
                .text("scope", scope)
                .text("roleContainerId", Some(role_container_id)),
        );
        Ok(self
            .api
            .send(
                KcRequest::get(url).bearer(access_token),
                "Unable to get realm client scoped protocol mappers in role container",
            )
            .await)
    }

    async fn unscoped_protocol_mappers_in_container(
        &self,
        realm: &str,
        access_token: &str,
        id: &str,
        role_container_id: &str,
        scope: Option<&str>,
    ) -> Result<KcResponse<Vec<ProtocolMapper>>, ValidationError> {
        validate_client(realm, access_token, id)?;
        require(role_container_id, "roleContainerId")?;

        let url = self.evaluate_url(
            realm,
            id,
            &format!("scope-mappings/{}/not-granted", segment(role_container_id)),
            QueryBuilder::new()
                .text("scope", scope)
                .text("roleContainerId", Some(role_container_id)),
        );
        Ok(self
            .api
            .send(
                KcRequest::get(url).bearer(access_token),
                "Unable to get realm client unscoped protocol mappers in role container",
            )
            .await)
    }

    async fn get_authorization_management_permission(
        &self,
        realm: &str,
        access_token: &str,
        id: &str,
    ) -> Result<KcResponse<PermissionManagement>, ValidationError> {
        self.get_from(
            realm,
            access_token,
            id,
            "/management/permissions",
            "Unable to retrieve client authorization management permissions",
        )
        .await
    }

    async fn set_authorization_management_permission(
        &self,
        realm: &str,
        access_token: &str,
        id: &str,
        permission: &PermissionManagement,
    ) -> Result<KcResponse<PermissionManagement>, ValidationError> {
        validate_client(realm, access_token, id)?;

        Ok(self
            .api
            .send(
                KcRequest::put(self.client_url(realm, id, "/management/permissions"))
                    .bearer(access_token)
                    .json(permission),
                "Unable to set client authorization management permissions",
            )
            .await)
    }

    async fn register_node(
        &self,
        realm: &str,
        access_token: &str,
        id: &str,
        node: &HashMap<String, String>,
    ) -> Result<KcResponse<()>, ValidationError> {
        validate_client(realm, access_token, id)?;

        Ok(self
            .api
            .send_empty(
                KcRequest::post(self.client_url(realm, id, "/nodes"))
                    .bearer(access_token)
                    .json(node),
                "Unable to register realm client new cluster node",
            )
            .await)
    }

    async fn delete_node(
        &self,
        realm: &str,
        access_token: &str,
        id: &str,
        node_name: &str,
    ) -> Result<KcResponse<()>, ValidationError> {
        validate_client(realm, access_token, id)?;
        require(node_name, "nodeName")?;

        let suffix = format!("/nodes/{}", segment(node_name));
        Ok(self
            .api
            .send_empty(
                KcRequest::delete(self.client_url(realm, id, &suffix)).bearer(access_token),
                "Unable to delete realm client cluster node",
            )
            .await)
    }

    async fn count_offline_sessions(
        &self,
        realm: &str,
        access_token: &str,
        id: &str,
    ) -> Result<KcResponse<Count>, ValidationError> {
        self.get_from(
            realm,
            access_token,
            id,
            "/offline-session-count",
            "Unable to get realm client offline sessions count",
        )
        .await
    }

    async fn offline_sessions(
        &self,
        realm: &str,
        access_token: &str,
        id: &str,
        filter: Option<&Filter>,
    ) -> Result<KcResponse<Vec<Session>>, ValidationError> {
        let suffix = format!("/offline-sessions{}", filter_query(filter));
        self.get_from(
            realm,
            access_token,
            id,
            &suffix,
            "Unable to get realm client offline sessions",
        )
        .await
    }

    async fn push_revocation(
        &self,
        realm: &str,
        access_token: &str,
        id: &str,
    ) -> Result<KcResponse<GlobalRequestResult>, ValidationError> {
        validate_client(realm, access_token, id)?;

        Ok(self
            .api
            .send(
                KcRequest::post(self.client_url(realm, id, "/push-revocation"))
                    .bearer(access_token),
                "Unable to push realm client revocation",
            )
            .await)
    }

    async fn registration_access_token(
        &self,
        realm: &str,
        access_token: &str,
        id: &str,
    ) -> Result<KcResponse<Client>, ValidationError> {
        validate_client(realm, access_token, id)?;

        Ok(self
            .api
            .send(
                KcRequest::post(self.client_url(realm, id, "/registration-access-token"))
                    .bearer(access_token),
                "Unable to create realm client registration access token",
            )
            .await)
    }

    async fn service_account_user(
        &self,
        realm: &str,
        access_token: &str,
        id: &str,
    ) -> Result<KcResponse<User>, ValidationError> {
        self.get_from(
            realm,
            access_token,
            id,
            "/service-account-user",
            "Unable to get realm client service account user",
        )
        .await
    }

    async fn count_sessions(
        &self,
        realm: &str,
        access_token: &str,
        id: &str,
    ) -> Result<KcResponse<Count>, ValidationError> {
        self.get_from(
            realm,
            access_token,
            id,
            "/session-count",
            "Unable to get realm client sessions count",
        )
        .await
    }

    async fn test_available_nodes(
        &self,
        realm: &str,
        access_token: &str,
        id: &str,
    ) -> Result<KcResponse<GlobalRequestResult>, ValidationError> {
        self.get_from(
            realm,
            access_token,
            id,
            "/test-nodes-available",
            "Unable to test realm client available nodes",
        )
        .await
    }

    async fn user_sessions(
        &self,
        realm: &str,
        access_token: &str,
        id: &str,
        filter: Option<&Filter>,
    ) -> Result<KcResponse<Vec<Session>>, ValidationError> {
        let suffix = format!("/user-sessions{}", filter_query(filter));
        self.get_from(
            realm,
            access_token,
            id,
            &suffix,
            "Unable to get realm client users sessions",
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn example_query_puts_scope_before_user() {
        assert_eq!(
            example_query("u1", Some("openid email")).build(),
            "?scope=openid%20email&userId=u1"
        );
        assert_eq!(example_query("u1", None).build(), "?userId=u1");
        assert_eq!(example_query("u1", Some(" ")).build(), "?userId=u1");
    }

    #[test]
    fn client_id_is_required() {
        assert_eq!(
            validate_client("demo", "token", ""),
            Err(ValidationError::Required("id"))
        );
    }
}
