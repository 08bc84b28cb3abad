use async_trait::async_trait;

use crate::config::segment;
use crate::error::ValidationError;
use crate::models::{Count, Group, PermissionManagement, User};
use crate::query::GroupFilter;
use crate::request::KcRequest;
use crate::response::KcResponse;
use crate::validation::{require, require_access};

use super::Api;

#[async_trait]
pub trait GroupsApi: Send + Sync {
    async fn create(
        &self,
        realm: &str,
        access_token: &str,
        group: &Group,
    ) -> Result<KcResponse<()>, ValidationError>;

    async fn list(
        &self,
        realm: &str,
        access_token: &str,
        filter: Option<&GroupFilter>,
    ) -> Result<KcResponse<Vec<Group>>, ValidationError>;

    async fn count(
        &self,
        realm: &str,
        access_token: &str,
        filter: Option<&GroupFilter>,
    ) -> Result<KcResponse<Count>, ValidationError>;

    async fn get(
        &self,
        realm: &str,
        access_token: &str,
        group_id: &str,
    ) -> Result<KcResponse<Group>, ValidationError>;

    async fn update(
        &self,
        realm: &str,
        access_token: &str,
        group_id: &str,
        group: &Group,
    ) -> Result<KcResponse<()>, ValidationError>;

    async fn delete(
        &self,
        realm: &str,
        access_token: &str,
        group_id: &str,
    ) -> Result<KcResponse<()>, ValidationError>;

    /// Creates `child` under the group, or moves it there when it already has an id.
    async fn add_child(
        &self,
        realm: &str,
        access_token: &str,
        group_id: &str,
        child: &Group,
    ) -> Result<KcResponse<()>, ValidationError>;

    async fn get_authorization_management_permission(
        &self,
        realm: &str,
        access_token: &str,
        group_id: &str,
    ) -> Result<KcResponse<PermissionManagement>, ValidationError>;

    async fn set_authorization_management_permission(
        &self,
        realm: &str,
        access_token: &str,
        group_id: &str,
        permission: &PermissionManagement,
    ) -> Result<KcResponse<PermissionManagement>, ValidationError>;

    async fn members(
        &self,
        realm: &str,
        access_token: &str,
        group_id: &str,
    ) -> Result<KcResponse<Vec<User>>, ValidationError>;
}

pub struct Groups {
    api: Api,
}

impl Groups {
    pub(crate) fn new(api: Api) -> Self {
        Self { api }
    }

    fn group_url(&self, realm: &str, group_id: &str, suffix: &str) -> String {
        self.api
            .admin(realm, &format!("groups/{}{suffix}", segment(group_id)))
    }
}

fn group_query(filter: Option<&GroupFilter>) -> String {
    filter.map_or_else(|| GroupFilter::default().to_query(), GroupFilter::to_query)
}

#[async_trait]
impl GroupsApi for Groups {
    async fn create(
        &self,
        realm: &str,
        access_token: &str,
        group: &Group,
    ) -> Result<KcResponse<()>, ValidationError> {
        require_access(realm, access_token)?;

        let url = self.api.admin(realm, "groups");
        Ok(self
            .api
            .send_empty(
                KcRequest::post(url).bearer(access_token).json(group),
                "Unable to create group",
            )
            .await)
    }

    async fn list(
        &self,
        realm: &str,
        access_token: &str,
        filter: Option<&GroupFilter>,
    ) -> Result<KcResponse<Vec<Group>>, ValidationError> {
        require_access(realm, access_token)?;

        let url = self
            .api
            .admin(realm, &format!("groups{}", group_query(filter)));
        Ok(self
            .api
            .send(
                KcRequest::get(url).bearer(access_token),
                "Unable to list groups",
            )
            .await)
    }

    async fn count(
        &self,
        realm: &str,
        access_token: &str,
        filter: Option<&GroupFilter>,
    ) -> Result<KcResponse<Count>, ValidationError> {
        require_access(realm, access_token)?;

        let url = self
            .api
            .admin(realm, &format!("groups/count{}", group_query(filter)));
        Ok(self
            .api
            .send(
                KcRequest::get(url).bearer(access_token),
                "Unable to count groups",
            )
            .await)
    }

    async fn get(
        &self,
        realm: &str,
        access_token: &str,
        group_id: &str,
    ) -> Result<KcResponse<Group>, ValidationError> {
        require_access(realm, access_token)?;
        require(group_id, "groupId")?;

        Ok(self
            .api
            .send(
                KcRequest::get(self.group_url(realm, group_id, "")).bearer(access_token),
                "Unable to get group",
            )
            .await)
    }

    async fn update(
        &self,
        realm: &str,
        access_token: &str,
        group_id: &str,
        group: &Group,
    ) -> Result<KcResponse<()>, ValidationError> {
        require_access(realm, access_token)?;
        require(group_id, "groupId")?;

        Ok(self
            .api
            .send_empty(
                KcRequest::put(self.group_url(realm, group_id, ""))
                    .bearer(access_token)
                    .json(group),
                "Unable to update group",
            )
            .await)
    }

    async fn delete(
        &self,
        realm: &str,
        access_token: &str,
        group_id: &str,
    ) -> Result<KcResponse<()>, ValidationError> {
        require_access(realm, access_token)?;
        require(group_id, "groupId")?;

        Ok(self
            .api
            .send_empty(
                KcRequest::delete(self.group_url(realm, group_id, "")).bearer(access_token),
                "Unable to delete group",
            )
            .await)
    }

    async fn add_child(
        &self,
        realm: &str,
        access_token: &str,
        group_id: &str,
        child: &Group,
    ) -> Result<KcResponse<()>, ValidationError> {
        require_access(realm, access_token)?;
        require(group_id, "groupId")?;

        Ok(self
            .api
            .send_empty(
                KcRequest::post(self.group_url(realm, group_id, "/children"))
                    .bearer(access_token)
                    .json(child),
                "Unable to add child group",
            )
            .await)
    }

    async fn get_authorization_management_permission(
        &self,
        realm: &str,
        access_token: &str,
        group_id: &str,
    ) -> Result<KcResponse<PermissionManagement>, ValidationError> {
        require_access(realm, access_token)?;
        require(group_id, "groupId")?;

        Ok(self
            .api
            .send(
                KcRequest::get(self.group_url(realm, group_id, "/management/permissions"))
                    .bearer(access_token),
                "Unable to get group authorization management permission",
            )
            .await)
    }

    async fn set_authorization_management_permission(
        &self,
        realm: &str,
        access_token: &str,
        group_id: &str,
        permission: &PermissionManagement,
    ) -> Result<KcResponse<PermissionManagement>, ValidationError> {
        require_access(realm, access_token)?;
        require(group_id, "groupId")?;

        Ok(self
            .api
            .send(
                KcRequest::put(self.group_url(realm, group_id, "/management/permissions"))
                    .bearer(access_token)
                    .json(permission),
                "Unable to set group authorization management permission",
            )
            .await)
    }

    async fn members(
        &self,
        realm: &str,
        access_token: &str,
        group_id: &str,
    ) -> Result<KcResponse<Vec<User>>, ValidationError> {
        require_access(realm, access_token)?;
        require(group_id, "groupId")?;

        Ok(self
            .api
            .send(
                KcRequest::get(self.group_url(realm, group_id, "/members")).bearer(access_token),
                "Unable to list group members",
            )
            .await)
    }
}
