use std::collections::HashMap;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Reply of the OpenID Connect token endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_expires_in: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_state: Option<String>,
    #[serde(rename = "not-before-policy", skip_serializing_if = "Option::is_none")]
    pub not_before_policy: Option<i64>,
    /// Set on request party tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upgraded: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
}

impl TokenResponse {
    /// Claims carried by the access token. The signature is not checked.
    pub fn claims(&self) -> Option<AccessToken> {
        decode_jwt_payload(&self.access_token)
    }

    /// `sid` claim of the access token, if present and readable.
    pub fn session_id(&self) -> Option<String> {
        self.claims().and_then(|claims| claims.sid)
    }
}

/// Keycloak server and realm named by a token's `iss` claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issuer {
    /// `scheme://authority`, without a trailing slash
    pub base_url: String,
    pub realm: String,
}

impl Issuer {
    /// Splits `https://sso.example.com/realms/demo` into its base URL and realm.
    pub fn parse(iss: &str) -> Option<Self> {
        let (scheme, rest) = iss.trim().split_once("://")?;
        let (authority, path) = rest.split_once('/')?;
        let realm = path.strip_prefix("realms/")?.trim_end_matches('/');
        if scheme.is_empty() || authority.is_empty() || realm.is_empty() || realm.contains('/') {
            return None;
        }

        Some(Self {
            base_url: format!("{scheme}://{authority}"),
            realm: realm.to_string(),
        })
    }
}

fn decode_jwt_payload<T: DeserializeOwned>(token: &str) -> Option<T> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .ok()?;
    serde_json::from_slice(&bytes).ok()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccessTokenCategory {
    Internal,
    Access,
    Id,
    Admin,
    Userinfo,
    Logout,
    AuthorizationResponse,
}

/// Decoded access token payload as issued by Keycloak.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccessToken {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<AddressClaimSet>,
    #[serde(rename = "allowed-origins", skip_serializing_if = "Option::is_none")]
    pub allowed_origins: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub at_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_time: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorization: Option<AccessTokenAuthorization>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub azp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birthdate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub c_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<AccessTokenCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claims_locales: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cnf: Option<CertConf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_verified: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number_verified: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub realm_access: Option<TokenRoleAccess>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_access: Option<HashMap<String, TokenRoleAccess>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub s_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(rename = "trusted-certs", skip_serializing_if = "Option::is_none")]
    pub trusted_certs: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub typ: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zoneinfo: Option<String>,
    /// Claims without a dedicated field (`aud`, custom mapper output, ...)
    #[serde(flatten)]
    pub other_claims: HashMap<String, serde_json::Value>,
}

impl AccessToken {
    /// Reads the payload of a raw JWT. The signature is not checked.
    pub fn decode(token: &str) -> Option<Self> {
        decode_jwt_payload(token)
    }

    pub fn issuer(&self) -> Option<Issuer> {
        self.iss.as_deref().and_then(Issuer::parse)
    }

    /// Realm roles from the `realm_access` claim.
    pub fn realm_roles(&self) -> Vec<String> {
        self.realm_access.as_ref().map(non_blank_roles).unwrap_or_default()
    }

    /// Roles granted by client `audience`, from the `resource_access` claim.
    pub fn client_roles(&self, audience: &str) -> Vec<String> {
        self.resource_access
            .as_ref()
            .and_then(|access| access.get(audience))
            .map(non_blank_roles)
            .unwrap_or_default()
    }
}

fn non_blank_roles(access: &TokenRoleAccess) -> Vec<String> {
    access
        .roles
        .iter()
        .filter(|role| !role.trim().is_empty())
        .cloned()
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressClaimSet {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatted: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locality: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street_address: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRoleAccess {
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verify_caller: Option<bool>,
}

/// Permissions granted in a request party token.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccessTokenAuthorization {
    #[serde(default)]
    pub permissions: Vec<Permission>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Permission {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rsid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rsname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scopes: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claims: Option<HashMap<String, serde_json::Value>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertConf {
    #[serde(rename = "x5t#S256", skip_serializing_if = "Option::is_none")]
    pub x5t_s256: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn jwt(payload: serde_json::Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256","typ":"JWT"}"#);
        let body = URL_SAFE_NO_PAD.encode(payload.to_string());
        format!("{header}.{body}.signature")
    }

    #[test]
    fn token_endpoint_reply_is_decoded() {
        let token: TokenResponse = serde_json::from_value(json!({
            "access_token": "a.b.c",
            "expires_in": 300,
            "refresh_expires_in": 1800,
            "refresh_token": "r.s.t",
            "token_type": "Bearer",
            "not-before-policy": 0,
            "session_state": "0a1b",
            "scope": "profile email"
        }))
        .unwrap();
        assert_eq!(token.expires_in, Some(300));
        assert_eq!(token.not_before_policy, Some(0));
        assert_eq!(token.token_type.as_deref(), Some("Bearer"));
    }

    #[test]
    fn session_id_comes_from_sid_claim() {
        let token = TokenResponse {
            access_token: jwt(json!({
                "sid": "4b8e1c",
                "azp": "backend",
                "aud": ["account"],
                "realm_access": {"roles": ["offline_access"]}
            })),
            ..TokenResponse::default()
        };

        assert_eq!(token.session_id().as_deref(), Some("4b8e1c"));
        let claims = token.claims().unwrap();
        assert_eq!(claims.azp.as_deref(), Some("backend"));
        assert_eq!(claims.realm_access.unwrap().roles, vec!["offline_access"]);
        assert_eq!(claims.other_claims["aud"], json!(["account"]));
    }

    #[test]
    fn issuer_splits_into_base_url_and_realm() {
        let issuer = Issuer::parse("https://sso.example.com:8443/realms/demo").unwrap();
        assert_eq!(issuer.base_url, "https://sso.example.com:8443");
        assert_eq!(issuer.realm, "demo");

        assert_eq!(
            Issuer::parse("http://kc/realms/demo/").map(|i| i.realm),
            Some("demo".to_string())
        );
        assert!(Issuer::parse("http://kc/auth/demo").is_none());
        assert!(Issuer::parse("http://kc/realms/").is_none());
        assert!(Issuer::parse("not a url").is_none());
    }

    #[test]
    fn roles_are_read_from_realm_and_resource_access() {
        let claims = AccessToken::decode(&jwt(json!({
            "iss": "http://kc/realms/demo",
            "realm_access": {"roles": ["offline_access", " "]},
            "resource_access": {
                "api": {"roles": ["reader", "writer"]},
                "account": {"roles": ["view-profile"]}
            }
        })))
        .unwrap();

        assert_eq!(claims.realm_roles(), vec!["offline_access"]);
        assert_eq!(claims.client_roles("api"), vec!["reader", "writer"]);
        assert!(claims.client_roles("billing").is_empty());
        assert_eq!(claims.issuer().unwrap().realm, "demo");
    }

    #[test]
    fn token_without_role_claims_has_no_roles() {
        let claims = AccessToken::decode(&jwt(json!({"sub": "u1"}))).unwrap();
        assert!(claims.realm_roles().is_empty());
        assert!(claims.client_roles("api").is_empty());
        assert!(claims.issuer().is_none());
    }

    #[test]
    fn opaque_token_has_no_session_id() {
        let token = TokenResponse {
            access_token: "not-a-jwt".into(),
            ..TokenResponse::default()
        };
        assert!(token.session_id().is_none());
    }
}
