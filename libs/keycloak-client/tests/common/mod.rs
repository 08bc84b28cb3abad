#![allow(dead_code)]

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use keycloak_client::{KeycloakClient, KeycloakConfig};
use wiremock::MockServer;

pub const REALM: &str = "demo";
pub const TOKEN: &str = "admin-token";

/// Mock Keycloak plus a client pointed at it, shared by one test.
pub struct TestContext {
    pub server: MockServer,
    pub client: KeycloakClient,
    pub realm: String,
    pub token: String,
}

impl TestContext {
    pub async fn new() -> Self {
        init_tracing();
        let server = MockServer::start().await;
        let client = KeycloakClient::new(KeycloakConfig::new(server.uri()))
            .expect("mock server uri is a valid base url");

        Self {
            server,
            client,
            realm: REALM.to_string(),
            token: TOKEN.to_string(),
        }
    }

    /// Path of an admin endpoint as seen by the mock server.
    pub fn admin_path(&self, path: &str) -> String {
        format!("/admin/realms/{}/{}", self.realm, path)
    }

    pub fn openid_path(&self, endpoint: &str) -> String {
        format!("/realms/{}/protocol/openid-connect/{}", self.realm, endpoint)
    }

    /// `iss` claim of tokens issued by the mock server's realm.
    pub fn issuer(&self) -> String {
        format!("{}/realms/{}", self.server.uri(), self.realm)
    }

    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }

    /// Query string of every request the server saw, in order.
    pub async fn received_queries(&self) -> Vec<Option<String>> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .map(|request| request.url.query().map(String::from))
            .collect()
    }
}

/// Unsigned JWT carrying `claims`.
pub fn jwt(claims: serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.signature")
}

/// Client whose base URL refuses connections.
pub fn unreachable_client() -> KeycloakClient {
    KeycloakClient::new(KeycloakConfig::new("http://127.0.0.1:1"))
        .expect("static url is valid")
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "keycloak_client=debug".into()),
        )
        .with_test_writer()
        .try_init();
}
