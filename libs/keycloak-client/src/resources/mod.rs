//! Per-resource clients, one trait and one implementation per Keycloak resource

mod attack_detection;
mod auth;
mod client_initial_access;
mod client_role_mappings;
mod client_scopes;
mod clients;
mod groups;
mod protocol_mappers;
mod role_mappings;
mod roles;
mod scope_mappings;
mod users;

pub use attack_detection::{AttackDetection, AttackDetectionApi};
pub use auth::{Auth, AuthApi, PasswordGrantOptions};
pub use client_initial_access::{ClientInitialAccessApi, ClientInitialAccessTokens};
pub use client_role_mappings::{ClientRoleMappings, ClientRoleMappingsApi};
pub use client_scopes::{ClientScopes, ClientScopesApi};
pub use clients::{Clients, ClientsApi};
pub use groups::{Groups, GroupsApi};
pub use protocol_mappers::{MapperOwner, ProtocolMappers, ProtocolMappersApi};
pub use role_mappings::{MappingTarget, RoleMappings, RoleMappingsApi};
pub use roles::{RoleRef, Roles, RolesApi};
pub use scope_mappings::{ScopeMappings, ScopeMappingsApi, ScopeOwner};
pub use users::{Users, UsersApi};

use serde::de::DeserializeOwned;

use crate::config::Endpoints;
use crate::request::{KcRequest, RequestHandler};
use crate::response::KcResponse;

/// Transport and URL roots shared by all resource clients.
#[derive(Clone)]
pub(crate) struct Api {
    handler: RequestHandler,
    endpoints: Endpoints,
}

impl Api {
    pub(crate) fn new(handler: RequestHandler, endpoints: Endpoints) -> Self {
        Self { handler, endpoints }
    }

    pub(crate) fn admin(&self, realm: &str, path: &str) -> String {
        self.endpoints.admin(realm, path)
    }

    pub(crate) fn openid_connect(&self, realm: &str, endpoint: &str) -> String {
        self.endpoints.openid_connect(realm, endpoint)
    }

    pub(crate) async fn send<T: DeserializeOwned>(
        &self,
        request: KcRequest,
        context: &str,
    ) -> KcResponse<T> {
        self.handler.send(request, context).await
    }

    pub(crate) async fn send_empty(&self, request: KcRequest, context: &str) -> KcResponse<()> {
        self.handler.send_empty(request, context).await
    }
}
