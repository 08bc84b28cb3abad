//! Brute-force detection status of users

use async_trait::async_trait;

use crate::config::segment;
use crate::error::ValidationError;
use crate::models::UserBruteForceStatus;
use crate::request::KcRequest;
use crate::response::KcResponse;
use crate::validation::{require, require_access};

use super::Api;

const BRUTE_FORCE_USERS: &str = "attack-detection/brute-force/users";

#[async_trait]
pub trait AttackDetectionApi: Send + Sync {
    /// Clears login failures for one user, or for every user when `user_id` is `None`.
    async fn delete_users_login_failure(
        &self,
        realm: &str,
        access_token: &str,
        user_id: Option<&str>,
    ) -> Result<KcResponse<()>, ValidationError>;

    async fn get_user_status(
        &self,
        realm: &str,
        access_token: &str,
        user_id: &str,
    ) -> Result<KcResponse<UserBruteForceStatus>, ValidationError>;
}

pub struct AttackDetection {
    api: Api,
}

impl AttackDetection {
    pub(crate) fn new(api: Api) -> Self {
        Self { api }
    }
}

#[async_trait]
impl AttackDetectionApi for AttackDetection {
    async fn delete_users_login_failure(
        &self,
        realm: &str,
        access_token: &str,
        user_id: Option<&str>,
    ) -> Result<KcResponse<()>, ValidationError> {
        require_access(realm, access_token)?;

        let path = match user_id {
            Some(id) => {
                require(id, "userId")?;
                format!("{BRUTE_FORCE_USERS}/{}", segment(id))
            }
            None => BRUTE_FORCE_USERS.to_string(),
        };
        let url = self.api.admin(realm, &path);

        Ok(self
            .api
            .send_empty(
                KcRequest::delete(url).bearer(access_token),
                "Unable to clear users login failures",
            )
            .await)
    }

    async fn get_user_status(
        &self,
        realm: &str,
        access_token: &str,
        user_id: &str,
    ) -> Result<KcResponse<UserBruteForceStatus>, ValidationError> {
        require_access(realm, access_token)?;
        require(user_id, "userId")?;

        let url = self
            .api
            .admin(realm, &format!("{BRUTE_FORCE_USERS}/{}", segment(user_id)));

        Ok(self
            .api
            .send(
                KcRequest::get(url).bearer(access_token),
                "Unable to get user brute force status",
            )
            .await)
    }
}
