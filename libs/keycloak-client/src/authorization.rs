//! Resource permission checks for bearer tokens issued by Keycloak
//!
//! The realm is taken from the token's `iss` claim. The check passes when the
//! token's user still exists, the token's session (`sid`) is among the user's
//! active sessions, and Keycloak grants a request party token for
//! `resource#scope`. Every round trip is recorded in the returned
//! [`KcOperationResponse`].

use tracing::{debug, warn};

use crate::error::ValidationError;
use crate::models::AccessToken;
use crate::resources::{AuthApi, UsersApi};
use crate::response::KcOperationResponse;
use crate::validation::require;

/// A caller asking for `scope` on `resource`.
#[derive(Debug, Clone, Copy)]
pub struct PermissionCheck<'a> {
    /// Bearer token presented by the caller.
    pub access_token: &'a str,
    /// Admin token of the caller's realm, used for the user and session lookups.
    pub admin_token: &'a str,
    /// Client id of the resource server that owns `resource`.
    pub audience: &'a str,
    pub resource: &'a str,
    pub scope: &'a str,
}

impl PermissionCheck<'_> {
    /// UMA permission requested from the token endpoint.
    pub fn permission(&self) -> String {
        format!("{}#{}", self.resource, self.scope)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require(self.access_token, "accessToken")?;
        require(self.admin_token, "adminToken")?;
        require(self.audience, "audience")?;
        require(self.resource, "resource")?;
        require(self.scope, "scope")
    }
}

/// Runs a [`PermissionCheck`] with the given user and token clients.
///
/// The payload is `true` only when every step passed. A denial Keycloak
/// explained, or one decided from the token itself, leaves `is_error` unset.
pub async fn check_permission<U, A>(
    users: &U,
    auth: &A,
    check: &PermissionCheck<'_>,
) -> Result<KcOperationResponse<bool>, ValidationError>
where
    U: UsersApi + ?Sized,
    A: AuthApi + ?Sized,
{
    check.validate()?;
    let mut operation = KcOperationResponse::default();

    let Some(claims) = AccessToken::decode(check.access_token) else {
        debug!("Access token is not a readable JWT");
        return Ok(operation.deny("Unable to read access token claims"));
    };
    let Some(issuer) = claims.issuer() else {
        debug!(iss = ?claims.iss, "Access token issuer names no realm");
        return Ok(operation.deny("Unable to extract realm from token issuer"));
    };
    let Some(user_id) = non_blank(claims.sub.as_deref()) else {
        return Ok(operation.deny("Unable to extract user subject"));
    };
    let Some(session_id) = non_blank(claims.sid.as_deref()) else {
        return Ok(operation.deny("Unable to extract session id"));
    };
    let realm = issuer.realm.as_str();

    let user = users.get(realm, check.admin_token, user_id).await?;
    operation.record(&user);
    if user.is_error {
        return Ok(operation.reject(user));
    }

    let sessions = users.sessions(realm, check.admin_token, user_id).await?;
    operation.record(&sessions);
    if sessions.is_error {
        return Ok(operation.reject(sessions));
    }
    let active = sessions
        .response
        .unwrap_or_default()
        .iter()
        .any(|session| session.id.as_deref() == Some(session_id));
    if !active {
        debug!(%realm, user_id, session_id, "Session is no longer active");
        return Ok(operation.deny(format!(
            "Session {session_id} not found for user {user_id}"
        )));
    }

    let permission = check.permission();
    let rpt = auth
        .get_request_party_token(
            realm,
            check.access_token,
            check.audience,
            std::slice::from_ref(&permission),
        )
        .await?;
    operation.record(&rpt);
    if rpt.is_error {
        warn!(
            %realm,
            audience = check.audience,
            %permission,
            "Access to protected resource is denied"
        );
        return Ok(operation.reject(rpt));
    }

    operation.response = Some(true);
    Ok(operation)
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check<'a>(resource: &'a str, scope: &'a str) -> PermissionCheck<'a> {
        PermissionCheck {
            access_token: "user-token",
            admin_token: "admin-token",
            audience: "api",
            resource,
            scope,
        }
    }

    #[test]
    fn permission_joins_resource_and_scope() {
        assert_eq!(check("invoices", "read").permission(), "invoices#read");
    }

    #[test]
    fn blank_fields_are_reported_in_order() {
        assert_eq!(
            check(" ", "read").validate(),
            Err(ValidationError::Required("resource"))
        );
        assert_eq!(
            check("invoices", "").validate(),
            Err(ValidationError::Required("scope"))
        );
        let no_admin = PermissionCheck {
            admin_token: "",
            ..check("invoices", "read")
        };
        assert_eq!(no_admin.validate(), Err(ValidationError::Required("adminToken")));
    }
}
