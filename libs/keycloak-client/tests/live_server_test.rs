//! Runs against a real Keycloak when `KEYCLOAK_URL`, `KEYCLOAK_REALM`,
//! `KEYCLOAK_CLIENT_ID` and `KEYCLOAK_CLIENT_SECRET` are set; skipped otherwise.

use keycloak_client::models::ClientCredentials;
use keycloak_client::{AuthApi, KeycloakClient, KeycloakConfig};
use reqwest::{Method, StatusCode};

struct LiveServer {
    client: KeycloakClient,
    realm: String,
    client_id: String,
    client_secret: String,
}

fn live_server() -> Option<LiveServer> {
    let var = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());
    let (Some(url), Some(realm), Some(client_id), Some(client_secret)) = (
        var("KEYCLOAK_URL"),
        var("KEYCLOAK_REALM"),
        var("KEYCLOAK_CLIENT_ID"),
        var("KEYCLOAK_CLIENT_SECRET"),
    ) else {
        eprintln!("Skipping live Keycloak test: KEYCLOAK_* variables not set");
        return None;
    };

    let client = KeycloakClient::new(KeycloakConfig::new(url)).expect("valid KEYCLOAK_URL");
    Some(LiveServer {
        client,
        realm,
        client_id,
        client_secret,
    })
}

#[tokio::test]
async fn test_live_wrong_secret_is_unauthorized() {
    let Some(server) = live_server() else {
        return;
    };

    let response = server
        .client
        .auth()
        .get_client_credentials_token(
            &server.realm,
            &ClientCredentials::new(&server.client_id, "definitely-wrong"),
        )
        .await
        .unwrap();

    assert!(response.is_error);
    assert_eq!(response.status_code(), Some(StatusCode::UNAUTHORIZED));
    assert!(!response.error_message.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn test_live_refresh_token_revocation() {
    let Some(server) = live_server() else {
        return;
    };
    let credentials = ClientCredentials::new(&server.client_id, &server.client_secret);

    let token = server
        .client
        .auth()
        .get_client_credentials_token(&server.realm, &credentials)
        .await
        .unwrap();
    assert!(!token.is_error, "{:?}", token.error_message);

    // Client credentials grants only carry a refresh token when the client enables it.
    let Some(refresh_token) = token.response.and_then(|t| t.refresh_token) else {
        eprintln!("Skipping revocation: client issues no refresh token");
        return;
    };

    let revoked = server
        .client
        .auth()
        .revoke_refresh_token(&server.realm, &credentials, &refresh_token)
        .await
        .unwrap();

    assert!(!revoked.is_error);
    let metrics = revoked.monitoring_metrics.unwrap();
    assert_eq!(metrics.status_code, Some(StatusCode::OK));
    assert_eq!(metrics.http_method, Method::POST);
}
