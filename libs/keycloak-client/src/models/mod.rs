//! Data records mirroring Keycloak's JSON representations

mod attack_detection;
mod auth;
mod client;
mod common;
mod group;
mod role;
mod scope;
mod token;
mod user;

pub use attack_detection::UserBruteForceStatus;
pub use auth::{ClientCredentials, UserLogin};
pub use client::{
    Client, ClientAccess, ClientAuthenticatorType, ClientInitialAccess,
    CreateClientInitialAccess, DecisionStrategy, PolicyEnforcementMode, PolicyLogic, Resource,
    ResourcePolicy, ResourceScope, ResourceServer,
};
pub use common::{Count, Credentials, GlobalRequestResult, PermissionManagement, Protocol};
pub use group::Group;
pub use role::{ClientRoleMapping, Role, RoleComposites, RoleMapping};
pub use scope::{ClientScope, ProtocolMapper};
pub use token::{
    AccessToken, AccessTokenAuthorization, AccessTokenCategory, AddressClaimSet, CertConf, Issuer,
    Permission, TokenResponse, TokenRoleAccess,
};
pub use user::{FederatedIdentity, Session, User, UserAccess, UserConsent};
