//! # Keycloak Client
//!
//! Typed bindings for the Keycloak Admin REST API and the OpenID Connect
//! token endpoints.
//!
//! Every operation follows the same shape: required arguments are checked
//! first and a missing one is returned as `Err(ValidationError)` without any
//! network I/O. Once a request is sent, whatever happens (transport failure,
//! non-2xx status, undecodable body) is reported inside the returned
//! [`KcResponse`] together with [`MonitoringMetrics`] for the call.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use keycloak_client::{KeycloakClient, KeycloakConfig, UsersApi, AuthApi};
//! use keycloak_client::models::ClientCredentials;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = KeycloakClient::new(KeycloakConfig::from_env())?;
//!
//!     let credentials = ClientCredentials::new("admin-cli", "secret");
//!     let token = client.auth().get_client_credentials_token("demo", &credentials).await?;
//!     let access_token = token.response.map(|t| t.access_token).unwrap_or_default();
//!
//!     let users = client.users().list("demo", &access_token, None).await?;
//!     if users.is_error {
//!         eprintln!("{:?}", users.error_message);
//!     }
//!     Ok(())
//! }
//! ```

pub mod models;
pub mod resources;

mod authorization;
mod config;
mod error;
mod query;
mod request;
mod response;
mod validation;

pub use authorization::{check_permission, PermissionCheck};
pub use config::KeycloakConfig;
pub use error::{ClientBuildError, RequestError, ValidationError};
pub use query::{ClientFilter, Filter, GroupFilter, UserFilter};
pub use response::{KcOperationResponse, KcResponse, MonitoringMetrics};

pub use resources::{
    AttackDetectionApi, AuthApi, ClientInitialAccessApi, ClientRoleMappingsApi, ClientScopesApi,
    ClientsApi, GroupsApi, MapperOwner, MappingTarget, PasswordGrantOptions, ProtocolMappersApi,
    RoleMappingsApi, RoleRef, RolesApi, ScopeMappingsApi, ScopeOwner, UsersApi,
};

use config::Endpoints;
use request::RequestHandler;
use resources::{
    Api, AttackDetection, Auth, ClientInitialAccessTokens, ClientRoleMappings, ClientScopes,
    Clients, Groups, ProtocolMappers, RoleMappings, Roles, ScopeMappings, Users,
};
use tracing::info;

/// Entry point holding one client per Keycloak resource.
///
/// All resource clients share a single `reqwest::Client`, so cloning is not
/// needed to issue concurrent calls; borrow the facade instead.
pub struct KeycloakClient {
    auth: Auth,
    attack_detection: AttackDetection,
    client_initial_access: ClientInitialAccessTokens,
    client_role_mappings: ClientRoleMappings,
    client_scopes: ClientScopes,
    clients: Clients,
    groups: Groups,
    protocol_mappers: ProtocolMappers,
    role_mappings: RoleMappings,
    roles: Roles,
    scope_mappings: ScopeMappings,
    users: Users,
}

impl KeycloakClient {
    pub fn new(config: KeycloakConfig) -> Result<Self, ClientBuildError> {
        let base_url = config.normalized_base_url()?;
        let handler = RequestHandler::new(config.timeout)?;
        info!(base_url = %base_url, "Keycloak client initialized");
        Ok(Self::from_parts(handler, &base_url))
    }

    /// Uses a preconfigured `reqwest::Client` (proxy, TLS roots, default headers).
    /// The config's timeout is ignored in favour of the given client's.
    pub fn with_http_client(
        config: KeycloakConfig,
        http: reqwest::Client,
    ) -> Result<Self, ValidationError> {
        let base_url = config.normalized_base_url()?;
        Ok(Self::from_parts(RequestHandler::with_client(http), &base_url))
    }

    fn from_parts(handler: RequestHandler, base_url: &str) -> Self {
        let api = Api::new(handler, Endpoints::new(base_url));
        Self {
            auth: Auth::new(api.clone()),
            attack_detection: AttackDetection::new(api.clone()),
            client_initial_access: ClientInitialAccessTokens::new(api.clone()),
            client_role_mappings: ClientRoleMappings::new(api.clone()),
            client_scopes: ClientScopes::new(api.clone()),
            clients: Clients::new(api.clone()),
            groups: Groups::new(api.clone()),
            protocol_mappers: ProtocolMappers::new(api.clone()),
            role_mappings: RoleMappings::new(api.clone()),
            roles: Roles::new(api.clone()),
            scope_mappings: ScopeMappings::new(api.clone()),
            users: Users::new(api),
        }
    }

    pub fn auth(&self) -> &Auth {
        &self.auth
    }

    /// Checks a caller's bearer token against a protected resource; see
    /// [`check_permission`].
    pub async fn check_permission(
        &self,
        check: &PermissionCheck<'_>,
    ) -> Result<KcOperationResponse<bool>, ValidationError> {
        authorization::check_permission(&self.users, &self.auth, check).await
    }

    pub fn attack_detection(&self) -> &AttackDetection {
        &self.attack_detection
    }

    pub fn client_initial_access(&self) -> &ClientInitialAccessTokens {
        &self.client_initial_access
    }

    pub fn client_role_mappings(&self) -> &ClientRoleMappings {
        &self.client_role_mappings
    }

    pub fn client_scopes(&self) -> &ClientScopes {
        &self.client_scopes
    }

    pub fn clients(&self) -> &Clients {
        &self.clients
    }

    pub fn groups(&self) -> &Groups {
        &self.groups
    }

    pub fn protocol_mappers(&self) -> &ProtocolMappers {
        &self.protocol_mappers
    }

    pub fn role_mappings(&self) -> &RoleMappings {
        &self.role_mappings
    }

    pub fn roles(&self) -> &Roles {
        &self.roles
    }

    pub fn scope_mappings(&self) -> &ScopeMappings {
        &self.scope_mappings
    }

    pub fn users(&self) -> &Users {
        &self.users
    }
}
