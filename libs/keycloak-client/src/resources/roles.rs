//! Realm roles (by name and by id) and client roles

use async_trait::async_trait;

use crate::config::segment;
use crate::error::ValidationError;
use crate::models::{Group, PermissionManagement, Role, User};
use crate::query::Filter;
use crate::request::KcRequest;
use crate::response::KcResponse;
use crate::validation::{require, require_access};

use super::Api;

/// Realm role addressed either by name (`roles/{name}`) or by id (`roles-by-id/{id}`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleRef<'a> {
    Name(&'a str),
    Id(&'a str),
}

impl RoleRef<'_> {
    pub(crate) fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Self::Name(name) => require(name, "name"),
            Self::Id(id) => require(id, "id"),
        }
    }

    pub(crate) fn path(&self) -> String {
        match self {
            Self::Name(name) => format!("roles/{}", segment(name)),
            Self::Id(id) => format!("roles-by-id/{}", segment(id)),
        }
    }

    fn context(&self, action: &str) -> String {
        match self {
            Self::Name(_) => format!("Unable to {action}"),
            Self::Id(_) => format!("Unable to {action} by role id"),
        }
    }
}

const ROLE_NOT_FOUND: &str = "could not find role";

/// Turns a role lookup into an existence check.
///
/// A "Could not find role" reply means `false` without error; any other
/// failure is passed through.
fn role_existence(lookup: KcResponse<Role>) -> KcResponse<bool> {
    let not_found = lookup.is_error
        && lookup
            .error_message
            .as_deref()
            .is_some_and(|message| message.to_lowercase().contains(ROLE_NOT_FOUND));

    if not_found {
        return KcResponse {
            is_error: false,
            error_message: None,
            exception: None,
            ..lookup.map(|_| Some(false))
        };
    }
    if lookup.is_error {
        return lookup.map(|_| None);
    }
    lookup.map(|role| {
        role.and_then(|role| role.id)
            .filter(|id| !id.trim().is_empty())
            .map(|_| true)
    })
}

fn filter_query(filter: Option<&Filter>) -> String {
    filter.map_or_else(|| Filter::default().to_query(), Filter::to_query)
}

#[async_trait]
pub trait RolesApi: Send + Sync {
    async fn create(
        &self,
        realm: &str,
        access_token: &str,
        role: &Role,
    ) -> Result<KcResponse<()>, ValidationError>;

    async fn list(
        &self,
        realm: &str,
        access_token: &str,
        filter: Option<&Filter>,
    ) -> Result<KcResponse<Vec<Role>>, ValidationError>;

    async fn get(
        &self,
        realm: &str,
        access_token: &str,
        role: RoleRef<'_>,
    ) -> Result<KcResponse<Role>, ValidationError>;

    async fn is_role_exists(
        &self,
        realm: &str,
        access_token: &str,
        name: &str,
    ) -> Result<KcResponse<bool>, ValidationError>;

    async fn update(
        &self,
        realm: &str,
        access_token: &str,
        role_ref: RoleRef<'_>,
        role: &Role,
    ) -> Result<KcResponse<()>, ValidationError>;

    async fn delete(
        &self,
        realm: &str,
        access_token: &str,
        role: RoleRef<'_>,
    ) -> Result<KcResponse<()>, ValidationError>;

    /// No request is sent when `roles` is empty.
    async fn add_composites(
        &self,
        realm: &str,
        access_token: &str,
        role: RoleRef<'_>,
        roles: &[Role],
    ) -> Result<KcResponse<()>, ValidationError>;

    /// No request is sent when `roles` is empty.
    async fn delete_composites(
        &self,
        realm: &str,
        access_token: &str,
        role: RoleRef<'_>,
        roles: &[Role],
    ) -> Result<KcResponse<()>, ValidationError>;

    async fn list_composites(
        &self,
        realm: &str,
        access_token: &str,
        role: RoleRef<'_>,
    ) -> Result<KcResponse<Vec<Role>>, ValidationError>;

    async fn client_level_composites(
        &self,
        realm: &str,
        access_token: &str,
        role: RoleRef<'_>,
        client_id: &str,
    ) -> Result<KcResponse<Vec<Role>>, ValidationError>;

    async fn realm_level_composites(
        &self,
        realm: &str,
        access_token: &str,
        role: RoleRef<'_>,
    ) -> Result<KcResponse<Vec<Role>>, ValidationError>;

    async fn groups(
        &self,
        realm: &str,
        access_token: &str,
        name: &str,
        filter: Option<&Filter>,
    ) -> Result<KcResponse<Vec<Group>>, ValidationError>;

    async fn users(
        &self,
        realm: &str,
        access_token: &str,
        name: &str,
        filter: Option<&Filter>,
    ) -> Result<KcResponse<Vec<User>>, ValidationError>;

    async fn get_authorization_management_permission(
        &self,
        realm: &str,
        access_token: &str,
        role: RoleRef<'_>,
    ) -> Result<KcResponse<PermissionManagement>, ValidationError>;

    async fn set_authorization_management_permission(
        &self,
        realm: &str,
        access_token: &str,
        role: RoleRef<'_>,
        permission: &PermissionManagement,
    ) -> Result<KcResponse<PermissionManagement>, ValidationError>;

    async fn create_client_role(
        &self,
        realm: &str,
        access_token: &str,
        client_id: &str,
        role: &Role,
    ) -> Result<KcResponse<()>, ValidationError>;

    async fn list_client_roles(
        &self,
        realm: &str,
        access_token: &str,
        client_id: &str,
        filter: Option<&Filter>,
    ) -> Result<KcResponse<Vec<Role>>, ValidationError>;

    async fn get_client_role(
        &self,
        realm: &str,
        access_token: &str,
        client_id: &str,
        name: &str,
    ) -> Result<KcResponse<Role>, ValidationError>;

    async fn is_client_role_exists(
        &self,
        realm: &str,
        access_token: &str,
        client_id: &str,
        name: &str,
    ) -> Result<KcResponse<bool>, ValidationError>;

    async fn update_client_role(
        &self,
        realm: &str,
        access_token: &str,
        client_id: &str,
        name: &str,
        role: &Role,
    ) -> Result<KcResponse<()>, ValidationError>;

    async fn delete_client_role(
        &self,
        realm: &str,
        access_token: &str,
        client_id: &str,
        name: &str,
    ) -> Result<KcResponse<()>, ValidationError>;

    /// No request is sent when `roles` is empty.
    async fn add_client_role_composites(
        &self,
        realm: &str,
        access_token: &str,
        client_id: &str,
        name: &str,
        roles: &[Role],
    ) -> Result<KcResponse<()>, ValidationError>;

    async fn list_client_role_composites(
        &self,
        realm: &str,
        access_token: &str,
        client_id: &str,
        name: &str,
    ) -> Result<KcResponse<Vec<Role>>, ValidationError>;

    /// No request is sent when `roles` is empty.
    async fn delete_client_role_composites(
        &self,
        realm: &str,
        access_token: &str,
        client_id: &str,
        name: &str,
        roles: &[Role],
    ) -> Result<KcResponse<()>, ValidationError>;

    async fn client_role_groups(
        &self,
        realm: &str,
        access_token: &str,
        client_id: &str,
        name: &str,
        filter: Option<&Filter>,
    ) -> Result<KcResponse<Vec<Group>>, ValidationError>;

    async fn get_client_role_management_permission(
        &self,
        realm: &str,
        access_token: &str,
        client_id: &str,
        name: &str,
    ) -> Result<KcResponse<PermissionManagement>, ValidationError>;

    async fn set_client_role_management_permission(
        &self,
        realm: &str,
        access_token: &str,
        client_id: &str,
        name: &str,
        permission: &PermissionManagement,
    ) -> Result<KcResponse<PermissionManagement>, ValidationError>;

    async fn client_role_users(
        &self,
        realm: &str,
        access_token: &str,
        client_id: &str,
        name: &str,
        filter: Option<&Filter>,
    ) -> Result<KcResponse<Vec<User>>, ValidationError>;
}

pub struct Roles {
    api: Api,
}

impl Roles {
    pub(crate) fn new(api: Api) -> Self {
        Self { api }
    }

    fn role_url(&self, realm: &str, role: RoleRef<'_>, suffix: &str) -> String {
        self.api.admin(realm, &format!("{}{suffix}", role.path()))
    }

    fn client_roles_url(&self, realm: &str, client_id: &str, suffix: &str) -> String {
        self.api
            .admin(realm, &format!("clients/{}/roles{suffix}", segment(client_id)))
    }

    fn client_role_url(&self, realm: &str, client_id: &str, name: &str, suffix: &str) -> String {
        self.client_roles_url(realm, client_id, &format!("/{}{suffix}", segment(name)))
    }
}

fn validate_role(
    realm: &str,
    access_token: &str,
    role: RoleRef<'_>,
) -> Result<(), ValidationError> {
    require_access(realm, access_token)?;
    role.validate()
}

fn validate_client_role(
    realm: &str,
    access_token: &str,
    client_id: &str,
    name: &str,
) -> Result<(), ValidationError> {
    require_access(realm, access_token)?;
    require(client_id, "clientId")?;
    require(name, "name")
}

#[async_trait]
impl RolesApi for Roles {
    async fn create(
        &self,
        realm: &str,
        access_token: &str,
        role: &Role,
    ) -> Result<KcResponse<()>, ValidationError> {
        require_access(realm, access_token)?;

        Ok(self
            .api
            .send_empty(
                KcRequest::post(self.api.admin(realm, "roles"))
                    .bearer(access_token)
                    .json(role),
                "Unable to create realm role",
            )
            .await)
    }

    async fn list(
        &self,
        realm: &str,
        access_token: &str,
        filter: Option<&Filter>,
    ) -> Result<KcResponse<Vec<Role>>, ValidationError> {
        require_access(realm, access_token)?;

        let url = self
            .api
            .admin(realm, &format!("roles{}", filter_query(filter)));
        Ok(self
            .api
            .send(
                KcRequest::get(url).bearer(access_token),
                "Unable to list realm roles",
            )
            .await)
    }

    async fn get(
        &self,
        realm: &str,
        access_token: &str,
        role: RoleRef<'_>,
    ) -> Result<KcResponse<Role>, ValidationError> {
        validate_role(realm, access_token, role)?;

        Ok(self
            .api
            .send(
                KcRequest::get(self.role_url(realm, role, "")).bearer(access_token),
                &role.context("get realm role"),
            )
            .await)
    }

    async fn is_role_exists(
        &self,
        realm: &str,
        access_token: &str,
        name: &str,
    ) -> Result<KcResponse<bool>, ValidationError> {
        let lookup = self.get(realm, access_token, RoleRef::Name(name)).await?;
        Ok(role_existence(lookup))
    }

    async fn update(
        &self,
        realm: &str,
        access_token: &str,
        role_ref: RoleRef<'_>,
        role: &Role,
    ) -> Result<KcResponse<()>, ValidationError> {
        validate_role(realm, access_token, role_ref)?;

        Ok(self
            .api
            .send_empty(
                KcRequest::put(self.role_url(realm, role_ref, ""))
                    .bearer(access_token)
                    .json(role),
                &role_ref.context("update realm role"),
            )
            .await)
    }

    async fn delete(
        &self,
        realm: &str,
        access_token: &str,
        role: RoleRef<'_>,
    ) -> Result<KcResponse<()>, ValidationError> {
        validate_role(realm, access_token, role)?;

        Ok(self
            .api
            .send_empty(
                KcRequest::delete(self.role_url(realm, role, "")).bearer(access_token),
                &role.context("delete realm role"),
            )
            .await)
    }

    async fn add_composites(
        &self,
        realm: &str,
        access_token: &str,
        role: RoleRef<'_>,
        roles: &[Role],
    ) -> Result<KcResponse<()>, ValidationError> {
        validate_role(realm, access_token, role)?;
        if roles.is_empty() {
            return Ok(KcResponse::default());
        }

        Ok(self
            .api
            .send_empty(
                KcRequest::post(self.role_url(realm, role, "/composites"))
                    .bearer(access_token)
                    .json(roles),
                &role.context("add realm role composites"),
            )
            .await)
    }

    async fn delete_composites(
        &self,
        realm: &str,
        access_token: &str,
        role: RoleRef<'_>,
        roles: &[Role],
    ) -> Result<KcResponse<()>, ValidationError> {
        validate_role(realm, access_token, role)?;
        if roles.is_empty() {
            return Ok(KcResponse::default());
        }

        Ok(self
            .api
            .send_empty(
                KcRequest::delete(self.role_url(realm, role, "/composites"))
                    .bearer(access_token)
                    .json(roles),
                &role.context("delete realm composite role"),
            )
            .await)
    }

    async fn list_composites(
        &self,
        realm: &str,
        access_token: &str,
        role: RoleRef<'_>,
    ) -> Result<KcResponse<Vec<Role>>, ValidationError> {
        validate_role(realm, access_token, role)?;

        Ok(self
            .api
            .send(
                KcRequest::get(self.role_url(realm, role, "/composites")).bearer(access_token),
                &role.context("list realm role composites"),
            )
            .await)
    }

    async fn client_level_composites(
        &self,
        realm: &str,
        access_token: &str,
        role: RoleRef<'_>,
        client_id: &str,
    ) -> Result<KcResponse<Vec<Role>>, ValidationError> {
        validate_role(realm, access_token, role)?;
        require(client_id, "clientId")?;

        let suffix = format!("/composites/clients/{}", segment(client_id));
        Ok(self
            .api
            .send(
                KcRequest::get(self.role_url(realm, role, &suffix)).bearer(access_token),
                &role.context("get role client level composites"),
            )
            .await)
    }

    async fn realm_level_composites(
        &self,
        realm: &str,
        access_token: &str,
        role: RoleRef<'_>,
    ) -> Result<KcResponse<Vec<Role>>, ValidationError> {
        validate_role(realm, access_token, role)?;

        Ok(self
            .api
            .send(
                KcRequest::get(self.role_url(realm, role, "/composites/realm"))
                    .bearer(access_token),
                &role.context("get role realm level composites"),
            )
            .await)
    }

    async fn groups(
        &self,
        realm: &str,
        access_token: &str,
        name: &str,
        filter: Option<&Filter>,
    ) -> Result<KcResponse<Vec<Group>>, ValidationError> {
        let role = RoleRef::Name(name);
        validate_role(realm, access_token, role)?;

        let suffix = format!("/groups{}", filter_query(filter));
        Ok(self
            .api
            .send(
                KcRequest::get(self.role_url(realm, role, &suffix)).bearer(access_token),
                "Unable to list realm role groups",
            )
            .await)
    }

    async fn users(
        &self,
        realm: &str,
        access_token: &str,
        name: &str,
        filter: Option<&Filter>,
    ) -> Result<KcResponse<Vec<User>>, ValidationError> {
        let role = RoleRef::Name(name);
        validate_role(realm, access_token, role)?;

        let suffix = format!("/users{}", filter_query(filter));
        Ok(self
            .api
            .send(
                KcRequest::get(self.role_url(realm, role, &suffix)).bearer(access_token),
                "Unable to list realm role users",
            )
            .await)
    }

    async fn get_authorization_management_permission(
        &self,
        realm: &str,
        access_token: &str,
        role: RoleRef<'_>,
    ) -> Result<KcResponse<PermissionManagement>, ValidationError> {
        validate_role(realm, access_token, role)?;

        Ok(self
            .api
            .send(
                KcRequest::get(self.role_url(realm, role, "/management/permissions"))
                    .bearer(access_token),
                &role.context("get realm role management permission"),
            )
            .await)
    }

    async fn set_authorization_management_permission(
        &self,
        realm: &str,
        access_token: &str,
        role: RoleRef<'_>,
        permission: &PermissionManagement,
    ) -> Result<KcResponse<PermissionManagement>, ValidationError> {
        validate_role(realm, access_token, role)?;

        Ok(self
            .api
            .send(
                KcRequest::put(self.role_url(realm, role, "/management/permissions"))
                    .bearer(access_token)
                    .json(permission),
                &role.context("set realm role management permission"),
            )
            .await)
    }

    async fn create_client_role(
        &self,
        realm: &str,
        access_token: &str,
        client_id: &str,
        role: &Role,
    ) -> Result<KcResponse<()>, ValidationError> {
        require_access(realm, access_token)?;
        require(client_id, "clientId")?;

        Ok(self
            .api
            .send_empty(
                KcRequest::post(self.client_roles_url(realm, client_id, ""))
                    .bearer(access_token)
                    .json(role),
                "Unable to create client role",
            )
            .await)
    }

    async fn list_client_roles(
        &self,
        realm: &str,
        access_token: &str,
        client_id: &str,
        filter: Option<&Filter>,
    ) -> Result<KcResponse<Vec<Role>>, ValidationError> {
        require_access(realm, access_token)?;
        require(client_id, "clientId")?;

        Ok(self
            .api
            .send(
                KcRequest::get(self.client_roles_url(realm, client_id, &filter_query(filter)))
                    .bearer(access_token),
                "Unable to list client roles",
            )
            .await)
    }

    async fn get_client_role(
        &self,
        realm: &str,
        access_token: &str,
        client_id: &str,
        name: &str,
    ) -> Result<KcResponse<Role>, ValidationError> {
        validate_client_role(realm, access_token, client_id, name)?;

        Ok(self
            .api
            .send(
                KcRequest::get(self.client_role_url(realm, client_id, name, ""))
                    .bearer(access_token),
                "Unable to get client role",
            )
            .await)
    }

    async fn is_client_role_exists(
        &self,
        realm: &str,
        access_token: &str,
        client_id: &str,
        name: &str,
    ) -> Result<KcResponse<bool>, ValidationError> {
        let lookup = self
            .get_client_role(realm, access_token, client_id, name)
            .await?;
        Ok(role_existence(lookup))
    }

    async fn update_client_role(
        &self,
        realm: &str,
        access_token: &str,
        client_id: &str,
        name: &str,
        role: &Role,
    ) -> Result<KcResponse<()>, ValidationError> {
        validate_client_role(realm, access_token, client_id, name)?;

        Ok(self
            .api
            .send_empty(
                KcRequest::put(self.client_role_url(realm, client_id, name, ""))
                    .bearer(access_token)
                    .json(role),
                "Unable to update client role",
            )
            .await)
    }

    async fn delete_client_role(
        &self,
        realm: &str,
        access_token: &str,
        client_id: &str,
        name: &str,
    ) -> Result<KcResponse<()>, ValidationError> {
        validate_client_role(realm, access_token, client_id, name)?;

        Ok(self
            .api
            .send_empty(
                KcRequest::delete(self.client_role_url(realm, client_id, name, ""))
                    .bearer(access_token),
                "Unable to delete client role",
            )
            .await)
    }

    async fn add_client_role_composites(
        &self,
        realm: &str,
        access_token: &str,
        client_id: &str,
        name: &str,
        roles: &[Role],
    ) -> Result<KcResponse<()>, ValidationError> {
        validate_client_role(realm, access_token, client_id, name)?;
        if roles.is_empty() {
            return Ok(KcResponse::default());
        }

        Ok(self
            .api
            .send_empty(
                KcRequest::post(self.client_role_url(realm, client_id, name, "/composites"))
                    .bearer(access_token)
                    .json(roles),
                "Unable to add composite to the client roles",
            )
            .await)
    }

    async fn list_client_role_composites(
        &self,
        realm: &str,
        access_token: &str,
        client_id: &str,
        name: &str,
    ) -> Result<KcResponse<Vec<Role>>, ValidationError> {
        validate_client_role(realm, access_token, client_id, name)?;

        Ok(self
            .api
            .send(
                KcRequest::get(self.client_role_url(realm, client_id, name, "/composites"))
                    .bearer(access_token),
                "Unable to get client composite roles",
            )
            .await)
    }

    async fn delete_client_role_composites(
        &self,
        realm: &str,
        access_token: &str,
        client_id: &str,
        name: &str,
        roles: &[Role],
    ) -> Result<KcResponse<()>, ValidationError> {
        validate_client_role(realm, access_token, client_id, name)?;
        if roles.is_empty() {
            return Ok(KcResponse::default());
        }

        Ok(self
            .api
            .send_empty(
                KcRequest::delete(self.client_role_url(realm, client_id, name, "/composites"))
                    .bearer(access_token)
                    .json(roles),
                "Unable to remove composite from the client roles",
            )
            .await)
    }

    async fn client_role_groups(
        &self,
        realm: &str,
        access_token: &str,
        client_id: &str,
        name: &str,
        filter: Option<&Filter>,
    ) -> Result<KcResponse<Vec<Group>>, ValidationError> {
        validate_client_role(realm, access_token, client_id, name)?;

        let suffix = format!("/groups{}", filter_query(filter));
        Ok(self
            .api
            .send(
                KcRequest::get(self.client_role_url(realm, client_id, name, &suffix))
                    .bearer(access_token),
                "Unable to list client role groups",
            )
            .await)
    }

    async fn get_client_role_management_permission(
        &self,
        realm: &str,
        access_token: &str,
        client_id: &str,
        name: &str,
    ) -> Result<KcResponse<PermissionManagement>, ValidationError> {
        validate_client_role(realm, access_token, client_id, name)?;

        Ok(self
            .api
            .send(
                KcRequest::get(self.client_role_url(
                    realm,
                    client_id,
                    name,
                    "/management/permissions",
                ))
                .bearer(access_token),
                "Unable to get client role management permission",
            )
            .await)
    }

    async fn set_client_role_management_permission(
        &self,
        realm: &str,
        access_token: &str,
        client_id: &str,
        name: &str,
        permission: &PermissionManagement,
    ) -> Result<KcResponse<PermissionManagement>, ValidationError> {
        validate_client_role(realm, access_token, client_id, name)?;

        Ok(self
            .api
            .send(
                KcRequest::put(self.client_role_url(
                    realm,
                    client_id,
                    name,
                    "/management/permissions",
                ))
                .bearer(access_token)
                .json(permission),
                "Unable to set client role management permission",
            )
            .await)
    }

    async fn client_role_users(
        &self,
        realm: &str,
        access_token: &str,
        client_id: &str,
        name: &str,
        filter: Option<&Filter>,
    ) -> Result<KcResponse<Vec<User>>, ValidationError> {
        validate_client_role(realm, access_token, client_id, name)?;

        let suffix = format!("/users{}", filter_query(filter));
        Ok(self
            .api
            .send(
                KcRequest::get(self.client_role_url(realm, client_id, name, &suffix))
                    .bearer(access_token),
                "Unable to get client role users",
            )
            .await)
    }
}
