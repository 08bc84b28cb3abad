use async_trait::async_trait;

use crate::config::segment;
use crate::error::ValidationError;
use crate::models::{Count, Credentials, Group, Session, User};
use crate::query::{Filter, UserFilter};
use crate::request::KcRequest;
use crate::response::KcResponse;
use crate::validation::{require, require_access};

use super::Api;

#[async_trait]
pub trait UsersApi: Send + Sync {
    /// Created user's id is available through [`KcResponse::created_id`].
    async fn create(
        &self,
        realm: &str,
        access_token: &str,
        user: &User,
    ) -> Result<KcResponse<()>, ValidationError>;

    async fn list(
        &self,
        realm: &str,
        access_token: &str,
        filter: Option<&UserFilter>,
    ) -> Result<KcResponse<Vec<User>>, ValidationError>;

    async fn count(
        &self,
        realm: &str,
        access_token: &str,
        filter: Option<&UserFilter>,
    ) -> Result<KcResponse<u64>, ValidationError>;

    async fn get(
        &self,
        realm: &str,
        access_token: &str,
        user_id: &str,
    ) -> Result<KcResponse<User>, ValidationError>;

    async fn update(
        &self,
        realm: &str,
        access_token: &str,
        user_id: &str,
        user: &User,
    ) -> Result<KcResponse<()>, ValidationError>;

    async fn delete(
        &self,
        realm: &str,
        access_token: &str,
        user_id: &str,
    ) -> Result<KcResponse<()>, ValidationError>;

    async fn is_user_exists_by_email(
        &self,
        realm: &str,
        access_token: &str,
        email: &str,
    ) -> Result<KcResponse<bool>, ValidationError>;

    async fn credentials(
        &self,
        realm: &str,
        access_token: &str,
        user_id: &str,
    ) -> Result<KcResponse<Vec<Credentials>>, ValidationError>;

    async fn delete_credential(
        &self,
        realm: &str,
        access_token: &str,
        user_id: &str,
        credential_id: &str,
    ) -> Result<KcResponse<()>, ValidationError>;

    async fn update_credential_label(
        &self,
        realm: &str,
        access_token: &str,
        user_id: &str,
        credential_id: &str,
        label: &str,
    ) -> Result<KcResponse<()>, ValidationError>;

    async fn groups(
        &self,
        realm: &str,
        access_token: &str,
        user_id: &str,
        filter: Option<&Filter>,
    ) -> Result<KcResponse<Vec<Group>>, ValidationError>;

    async fn count_groups(
        &self,
        realm: &str,
        access_token: &str,
        user_id: &str,
        filter: Option<&Filter>,
    ) -> Result<KcResponse<Count>, ValidationError>;

    async fn join_group(
        &self,
        realm: &str,
        access_token: &str,
        user_id: &str,
        group_id: &str,
    ) -> Result<KcResponse<()>, ValidationError>;

    async fn leave_group(
        &self,
        realm: &str,
        access_token: &str,
        user_id: &str,
        group_id: &str,
    ) -> Result<KcResponse<()>, ValidationError>;

    async fn reset_password(
        &self,
        realm: &str,
        access_token: &str,
        user_id: &str,
        credentials: &Credentials,
    ) -> Result<KcResponse<()>, ValidationError>;

    async fn sessions(
        &self,
        realm: &str,
        access_token: &str,
        user_id: &str,
    ) -> Result<KcResponse<Vec<Session>>, ValidationError>;

    async fn delete_session(
        &self,
        realm: &str,
        access_token: &str,
        session_id: &str,
    ) -> Result<KcResponse<()>, ValidationError>;

    /// Removes every session of the user.
    async fn logout(
        &self,
        realm: &str,
        access_token: &str,
        user_id: &str,
    ) -> Result<KcResponse<()>, ValidationError>;
}

pub struct Users {
    api: Api,
}

impl Users {
    pub(crate) fn new(api: Api) -> Self {
        Self { api }
    }

    /// `users/{user_id}{suffix}`
    fn user_url(&self, realm: &str, user_id: &str, suffix: &str) -> String {
        self.api
            .admin(realm, &format!("users/{}{suffix}", segment(user_id)))
    }
}

fn user_query(filter: Option<&UserFilter>) -> String {
    filter.map_or_else(|| UserFilter::default().to_query(), UserFilter::to_query)
}

fn filter_query(filter: Option<&Filter>) -> String {
    filter.map_or_else(|| Filter::default().to_query(), Filter::to_query)
}

#[async_trait]
impl UsersApi for Users {
    async fn create(
        &self,
        realm: &str,
        access_token: &str,
        user: &User,
    ) -> Result<KcResponse<()>, ValidationError> {
        require_access(realm, access_token)?;

        let url = self.api.admin(realm, "users");
        Ok(self
            .api
            .send_empty(
                KcRequest::post(url).bearer(access_token).json(user),
                "Unable to create user",
            )
            .await)
    }

    async fn list(
        &self,
        realm: &str,
        access_token: &str,
        filter: Option<&UserFilter>,
    ) -> Result<KcResponse<Vec<User>>, ValidationError> {
        require_access(realm, access_token)?;

        let url = self.api.admin(realm, &format!("users{}", user_query(filter)));
        Ok(self
            .api
            .send(
                KcRequest::get(url).bearer(access_token),
                "Unable to list users",
            )
            .await)
    }

    async fn count(
        &self,
        realm: &str,
        access_token: &str,
        filter: Option<&UserFilter>,
    ) -> Result<KcResponse<u64>, ValidationError> {
        require_access(realm, access_token)?;

        let url = self
            .api
            .admin(realm, &format!("users/count{}", user_query(filter)));
        Ok(self
            .api
            .send(
                KcRequest::get(url).bearer(access_token),
                "Unable to count users",
            )
            .await)
    }

    async fn get(
        &self,
        realm: &str,
        access_token: &str,
        user_id: &str,
    ) -> Result<KcResponse<User>, ValidationError> {
        require_access(realm, access_token)?;
        require(user_id, "userId")?;

        Ok(self
            .api
            .send(
                KcRequest::get(self.user_url(realm, user_id, "")).bearer(access_token),
                "Unable to get user",
            )
            .await)
    }

    async fn update(
        &self,
        realm: &str,
        access_token: &str,
        user_id: &str,
        user: &User,
    ) -> Result<KcResponse<()>, ValidationError> {
        require_access(realm, access_token)?;
        require(user_id, "userId")?;

        Ok(self
            .api
            .send_empty(
                KcRequest::put(self.user_url(realm, user_id, ""))
                    .bearer(access_token)
                    .json(user),
                "Unable to update user",
            )
            .await)
    }

    async fn delete(
        &self,
        realm: &str,
        access_token: &str,
        user_id: &str,
    ) -> Result<KcResponse<()>, ValidationError> {
        require_access(realm, access_token)?;
        require(user_id, "userId")?;

        Ok(self
            .api
            .send_empty(
                KcRequest::delete(self.user_url(realm, user_id, "")).bearer(access_token),
                "Unable to delete user",
            )
            .await)
    }

    async fn is_user_exists_by_email(
        &self,
        realm: &str,
        access_token: &str,
        email: &str,
    ) -> Result<KcResponse<bool>, ValidationError> {
        require_access(realm, access_token)?;
        require(email, "email")?;

        let filter = UserFilter {
            email: Some(email.to_string()),
            exact: Some(true),
            ..UserFilter::default()
        };
        let users = self.list(realm, access_token, Some(&filter)).await?;
        if users.is_error {
            return Ok(users.map(|_| None));
        }
        Ok(users.map(|found| Some(found.is_some_and(|users| !users.is_empty()))))
    }

    async fn credentials(
        &self,
        realm: &str,
        access_token: &str,
        user_id: &str,
    ) -> Result<KcResponse<Vec<Credentials>>, ValidationError> {
        require_access(realm, access_token)?;
        require(user_id, "userId")?;

        Ok(self
            .api
            .send(
                KcRequest::get(self.user_url(realm, user_id, "/credentials"))
                    .bearer(access_token),
                "Unable to list user credentials",
            )
            .await)
    }

    async fn delete_credential(
        &self,
        realm: &str,
        access_token: &str,
        user_id: &str,
        credential_id: &str,
    ) -> Result<KcResponse<()>, ValidationError> {
        require_access(realm, access_token)?;
        require(user_id, "userId")?;
        require(credential_id, "credentialId")?;

        let suffix = format!("/credentials/{}", segment(credential_id));
        Ok(self
            .api
            .send_empty(
                KcRequest::delete(self.user_url(realm, user_id, &suffix)).bearer(access_token),
                "Unable to delete user credential",
            )
            .await)
    }

    async fn update_credential_label(
        &self,
        realm: &str,
        access_token: &str,
        user_id: &str,
        credential_id: &str,
        label: &str,
    ) -> Result<KcResponse<()>, ValidationError> {
        require_access(realm, access_token)?;
        require(user_id, "userId")?;
        require(credential_id, "credentialId")?;
        require(label, "label")?;

        let suffix = format!("/credentials/{}/userLabel", segment(credential_id));
        Ok(self
            .api
            .send_empty(
                KcRequest::put(self.user_url(realm, user_id, &suffix))
                    .bearer(access_token)
                    .text(label),
                "Unable to update user credential label",
            )
            .await)
    }

    async fn groups(
        &self,
        realm: &str,
        access_token: &str,
        user_id: &str,
        filter: Option<&Filter>,
    ) -> Result<KcResponse<Vec<Group>>, ValidationError> {
        require_access(realm, access_token)?;
        require(user_id, "userId")?;

        let suffix = format!("/groups{}", filter_query(filter));
        Ok(self
            .api
            .send(
                KcRequest::get(self.user_url(realm, user_id, &suffix)).bearer(access_token),
                "Unable to list user groups",
            )
            .await)
    }

    async fn count_groups(
        &self,
        realm: &str,
        access_token: &str,
        user_id: &str,
        filter: Option<&Filter>,
    ) -> Result<KcResponse<Count>, ValidationError> {
        require_access(realm, access_token)?;
        require(user_id, "userId")?;

        let suffix = format!("/groups/count{}", filter_query(filter));
        Ok(self
            .api
            .send(
                KcRequest::get(self.user_url(realm, user_id, &suffix)).bearer(access_token),
                "Unable to count user groups",
            )
            .await)
    }

    async fn join_group(
        &self,
        realm: &str,
        access_token: &str,
        user_id: &str,
        group_id: &str,
    ) -> Result<KcResponse<()>, ValidationError> {
        require_access(realm, access_token)?;
        require(user_id, "userId")?;
        require(group_id, "groupId")?;

        let suffix = format!("/groups/{}", segment(group_id));
        Ok(self
            .api
            .send_empty(
                KcRequest::put(self.user_url(realm, user_id, &suffix)).bearer(access_token),
                "Unable to add user to group",
            )
            .await)
    }

    async fn leave_group(
        &self,
        realm: &str,
        access_token: &str,
        user_id: &str,
        group_id: &str,
    ) -> Result<KcResponse<()>, ValidationError> {
        require_access(realm, access_token)?;
        require(user_id, "userId")?;
        require(group_id, "groupId")?;

        let suffix = format!("/groups/{}", segment(group_id));
        Ok(self
            .api
            .send_empty(
                KcRequest::delete(self.user_url(realm, user_id, &suffix)).bearer(access_token),
                "Unable to remove user from group",
            )
            .await)
    }

    async fn reset_password(
        &self,
        realm: &str,
        access_token: &str,
        user_id: &str,
        credentials: &Credentials,
    ) -> Result<KcResponse<()>, ValidationError> {
        require_access(realm, access_token)?;
        require(user_id, "userId")?;

        Ok(self
            .api
            .send_empty(
                KcRequest::put(self.user_url(realm, user_id, "/reset-password"))
                    .bearer(access_token)
                    .json(credentials),
                "Unable to reset user password",
            )
            .await)
    }

    async fn sessions(
        &self,
        realm: &str,
        access_token: &str,
        user_id: &str,
    ) -> Result<KcResponse<Vec<Session>>, ValidationError> {
        require_access(realm, access_token)?;
        require(user_id, "userId")?;

        Ok(self
            .api
            .send(
                KcRequest::get(self.user_url(realm, user_id, "/sessions")).bearer(access_token),
                "Unable to list user sessions",
            )
            .await)
    }

    async fn delete_session(
        &self,
        realm: &str,
        access_token: &str,
        session_id: &str,
    ) -> Result<KcResponse<()>, ValidationError> {
        require_access(realm, access_token)?;
        require(session_id, "sessionId")?;

        let url = self
            .api
            .admin(realm, &format!("sessions/{}", segment(session_id)));
        Ok(self
            .api
            .send_empty(
                KcRequest::delete(url).bearer(access_token),
                "Unable to delete user session",
            )
            .await)
    }

    async fn logout(
        &self,
        realm: &str,
        access_token: &str,
        user_id: &str,
    ) -> Result<KcResponse<()>, ValidationError> {
        require_access(realm, access_token)?;
        require(user_id, "userId")?;

        Ok(self
            .api
            .send_empty(
                KcRequest::post(self.user_url(realm, user_id, "/logout")).bearer(access_token),
                "Unable to logout user",
            )
            .await)
    }
}
