//! Realm-level role mappings of groups and users

use async_trait::async_trait;

use crate::config::segment;
use crate::error::ValidationError;
use crate::models::{Role, RoleMapping};
use crate::query::Filter;
use crate::request::KcRequest;
use crate::response::KcResponse;
use crate::validation::{require, require_access};

use super::Api;

/// Holder of role mappings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingTarget<'a> {
    Group(&'a str),
    User(&'a str),
}

impl MappingTarget<'_> {
    pub(crate) fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Self::Group(id) => require(id, "groupId"),
            Self::User(id) => require(id, "userId"),
        }
    }

    /// `groups/{id}/role-mappings` or `users/{id}/role-mappings`
    pub(crate) fn role_mappings_path(&self) -> String {
        match self {
            Self::Group(id) => format!("groups/{}/role-mappings", segment(id)),
            Self::User(id) => format!("users/{}/role-mappings", segment(id)),
        }
    }

    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Self::Group(_) => "group",
            Self::User(_) => "user",
        }
    }
}

#[async_trait]
pub trait RoleMappingsApi: Send + Sync {
    /// Realm and client role mappings of the target.
    async fn get_role_mappings(
        &self,
        realm: &str,
        access_token: &str,
        target: MappingTarget<'_>,
    ) -> Result<KcResponse<RoleMapping>, ValidationError>;

    /// No request is sent when `roles` is empty.
    async fn add_realm_role_mappings(
        &self,
        realm: &str,
        access_token: &str,
        target: MappingTarget<'_>,
        roles: &[Role],
    ) -> Result<KcResponse<()>, ValidationError>;

    async fn list_realm_role_mappings(
        &self,
        realm: &str,
        access_token: &str,
        target: MappingTarget<'_>,
    ) -> Result<KcResponse<Vec<Role>>, ValidationError>;

    /// No request is sent when `roles` is empty.
    async fn delete_realm_role_mappings(
        &self,
        realm: &str,
        access_token: &str,
        target: MappingTarget<'_>,
        roles: &[Role],
    ) -> Result<KcResponse<()>, ValidationError>;

    async fn list_available_realm_role_mappings(
        &self,
        realm: &str,
        access_token: &str,
        target: MappingTarget<'_>,
    ) -> Result<KcResponse<Vec<Role>>, ValidationError>;

    /// Realm roles mapped directly or through composites and group membership.
    async fn list_effective_realm_role_mappings(
        &self,
        realm: &str,
        access_token: &str,
        target: MappingTarget<'_>,
        filter: Option<&Filter>,
    ) -> Result<KcResponse<Vec<Role>>, ValidationError>;
}

pub struct RoleMappings {
    api: Api,
}

impl RoleMappings {
    pub(crate) fn new(api: Api) -> Self {
        Self { api }
    }

    fn url(&self, realm: &str, target: MappingTarget<'_>, suffix: &str) -> String {
        self.api
            .admin(realm, &format!("{}{suffix}", target.role_mappings_path()))
    }
}

#[async_trait]
impl RoleMappingsApi for RoleMappings {
    async fn get_role_mappings(
        &self,
        realm: &str,
        access_token: &str,
        target: MappingTarget<'_>,
    ) -> Result<KcResponse<RoleMapping>, ValidationError> {
        require_access(realm, access_token)?;
        target.validate()?;

        Ok(self
            .api
            .send(
                KcRequest::get(self.url(realm, target, "")).bearer(access_token),
                &format!("Unable to get {} role mappings", target.kind()),
            )
            .await)
    }

    async fn add_realm_role_mappings(
        &self,
        realm: &str,
        access_token: &str,
        target: MappingTarget<'_>,
        roles: &[Role],
    ) -> Result<KcResponse<()>, ValidationError> {
        require_access(realm, access_token)?;
        target.validate()?;
        if roles.is_empty() {
            return Ok(KcResponse::default());
        }

        Ok(self
            .api
            .send_empty(
                KcRequest::post(self.url(realm, target, "/realm"))
                    .bearer(access_token)
                    .json(roles),
                &format!("Unable to add {} realm role mappings", target.kind()),
            )
            .await)
    }

    async fn list_realm_role_mappings(
        &self,
        realm: &str,
        access_token: &str,
        target: MappingTarget<'_>,
    ) -> Result<KcResponse<Vec<Role>>, ValidationError> {
        require_access(realm, access_token)?;
        target.validate()?;

        Ok(self
            .api
            .send(
                KcRequest::get(self.url(realm, target, "/realm")).bearer(access_token),
                &format!("Unable to list {} realm role mappings", target.kind()),
            )
            .await)
    }

    async fn delete_realm_role_mappings(
        &self,
        realm: &str,
        access_token: &str,
        target: MappingTarget<'_>,
        roles: &[Role],
    ) -> Result<KcResponse<()>, ValidationError> {
        require_access(realm, access_token)?;
        target.validate()?;
        if roles.is_empty() {
            return Ok(KcResponse::default());
        }

        Ok(self
            .api
            .send_empty(
                KcRequest::delete(self.url(realm, target, "/realm"))
                    .bearer(access_token)
                    .json(roles),
                &format!("Unable to delete {} realm role mappings", target.kind()),
            )
            .await)
    }

    async fn list_available_realm_role_mappings(
        &self,
        realm: &str,
        access_token: &str,
        target: MappingTarget<'_>,
    ) -> Result<KcResponse<Vec<Role>>, ValidationError> {
        require_access(realm, access_token)?;
        target.validate()?;

        Ok(self
            .api
            .send(
                KcRequest::get(self.url(realm, target, "/realm/available")).bearer(access_token),
                &format!("Unable to list {} available realm role mappings", target.kind()),
            )
            .await)
    }

    async fn list_effective_realm_role_mappings(
        &self,
        realm: &str,
        access_token: &str,
        target: MappingTarget<'_>,
        filter: Option<&Filter>,
    ) -> Result<KcResponse<Vec<Role>>, ValidationError> {
        require_access(realm, access_token)?;
        target.validate()?;

        let query = filter.map_or_else(|| Filter::default().to_query(), Filter::to_query);
        Ok(self
            .api
            .send(
                KcRequest::get(self.url(realm, target, &format!("/realm/composite{query}")))
                    .bearer(access_token),
                &format!("Unable to list {} effective realm role mappings", target.kind()),
            )
            .await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_selects_path_and_required_id() {
        assert_eq!(
            MappingTarget::Group("g 1").role_mappings_path(),
            "groups/g%201/role-mappings"
        );
        assert_eq!(
            MappingTarget::User("u1").role_mappings_path(),
            "users/u1/role-mappings"
        );
        assert_eq!(
            MappingTarget::User("").validate(),
            Err(ValidationError::Required("userId"))
        );
        assert_eq!(
            MappingTarget::Group(" ").validate(),
            Err(ValidationError::Required("groupId"))
        );
    }
}
