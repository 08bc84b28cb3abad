mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use mockall::{mock, Sequence};
use reqwest::{Method, StatusCode};
use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, ResponseTemplate};

use common::TestContext;
use keycloak_client::models::{ClientCredentials, TokenResponse, UserLogin};
use keycloak_client::{AuthApi, KcResponse, PasswordGrantOptions, ValidationError};

mock! {
    pub Auth {}

    #[async_trait]
    impl AuthApi for Auth {
        async fn get_client_credentials_token(
            &self,
            realm: &str,
            credentials: &ClientCredentials,
        ) -> Result<KcResponse<TokenResponse>, ValidationError>;
        async fn get_resource_owner_password_token(
            &self,
            realm: &str,
            credentials: &ClientCredentials,
            login: &UserLogin,
            options: &PasswordGrantOptions,
        ) -> Result<KcResponse<TokenResponse>, ValidationError>;
        async fn refresh_access_token(
            &self,
            realm: &str,
            credentials: &ClientCredentials,
            refresh_token: &str,
        ) -> Result<KcResponse<TokenResponse>, ValidationError>;
        async fn revoke_access_token(
            &self,
            realm: &str,
            credentials: &ClientCredentials,
            access_token: &str,
        ) -> Result<KcResponse<bool>, ValidationError>;
        async fn revoke_refresh_token(
            &self,
            realm: &str,
            credentials: &ClientCredentials,
            refresh_token: &str,
        ) -> Result<KcResponse<bool>, ValidationError>;
        async fn get_request_party_token(
            &self,
            realm: &str,
            access_token: &str,
            audience: &str,
            permissions: &[String],
        ) -> Result<KcResponse<TokenResponse>, ValidationError>;
    }
}

fn credentials() -> ClientCredentials {
    ClientCredentials::new("backend", "s3cret")
}

fn token_body() -> serde_json::Value {
    json!({
        "access_token": "header.payload.signature",
        "expires_in": 300,
        "refresh_expires_in": 1800,
        "refresh_token": "refresh-1",
        "token_type": "Bearer",
        "not-before-policy": 0,
        "session_state": "s1",
        "scope": "profile email"
    })
}

// ==================== TOKEN ENDPOINT TESTS ====================

#[tokio::test]
async fn test_client_credentials_token_posts_form() {
    let ctx = TestContext::new().await;
    Mock::given(method("POST"))
        .and(path(ctx.openid_path("token")))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("client_id=backend"))
        .and(body_string_contains("client_secret=s3cret"))
        .and(body_string_contains("grant_type=client_credentials"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body()))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let response = ctx
        .client
        .auth()
        .get_client_credentials_token(&ctx.realm, &credentials())
        .await
        .unwrap();

    assert!(!response.is_error);
    let token = response.response.unwrap();
    assert_eq!(token.access_token, "header.payload.signature");
    assert_eq!(token.refresh_token.as_deref(), Some("refresh-1"));
    assert_eq!(token.not_before_policy, Some(0));
}

#[tokio::test]
async fn test_wrong_secret_is_reported_in_envelope() {
    let ctx = TestContext::new().await;
    Mock::given(method("POST"))
        .and(path(ctx.openid_path("token")))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": "unauthorized_client",
            "error_description": "Invalid client or Invalid client credentials"
        })))
        .mount(&ctx.server)
        .await;

    let response = ctx
        .client
        .auth()
        .get_client_credentials_token(&ctx.realm, &ClientCredentials::new("c1", "wrong"))
        .await
        .unwrap();

    assert!(response.is_error);
    assert_eq!(response.status_code(), Some(StatusCode::UNAUTHORIZED));
    assert!(!response.error_message.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn test_blank_client_id_is_a_validation_error() {
    let ctx = TestContext::new().await;

    let err = ctx
        .client
        .auth()
        .get_client_credentials_token(&ctx.realm, &ClientCredentials::new(" ", "x"))
        .await
        .unwrap_err();

    assert_eq!(err, ValidationError::Required("clientId"));
}

#[tokio::test]
async fn test_password_grant_sends_optional_scope() {
    let ctx = TestContext::new().await;
    Mock::given(method("POST"))
        .and(path(ctx.openid_path("token")))
        .and(body_string_contains("grant_type=password"))
        .and(body_string_contains("username=alice"))
        .and(body_string_contains("scope=openid"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body()))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let options = PasswordGrantOptions {
        scope: Some("openid".to_string()),
        resource: None,
    };
    let response = ctx
        .client
        .auth()
        .get_resource_owner_password_token(
            &ctx.realm,
            &credentials(),
            &UserLogin::new("alice", "pw"),
            &options,
        )
        .await
        .unwrap();

    assert!(!response.is_error);
}

#[tokio::test]
async fn test_revoking_refresh_token_succeeds() {
    let ctx = TestContext::new().await;
    Mock::given(method("POST"))
        .and(path(ctx.openid_path("revoke")))
        .and(body_string_contains("token=refresh-1"))
        .and(body_string_contains("token_type_hint=refresh_token"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let response = ctx
        .client
        .auth()
        .revoke_refresh_token(&ctx.realm, &credentials(), "refresh-1")
        .await
        .unwrap();

    assert!(!response.is_error);
    assert_eq!(response.response, Some(true));
    let metrics = response.monitoring_metrics.unwrap();
    assert_eq!(metrics.status_code, Some(StatusCode::OK));
    assert_eq!(metrics.http_method, Method::POST);
}

#[tokio::test]
async fn test_request_party_token_repeats_permissions() {
    let ctx = TestContext::new().await;
    Mock::given(method("POST"))
        .and(path(ctx.openid_path("token")))
        .and(header("authorization", ctx.bearer().as_str()))
        .and(body_string_contains("audience=api"))
        .and(body_string_contains("permission=read"))
        .and(body_string_contains("permission=write"))
        .and(body_string_contains("uma-ticket"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "rpt",
            "upgraded": false
        })))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let response = ctx
        .client
        .auth()
        .get_request_party_token(
            &ctx.realm,
            &ctx.token,
            "api",
            &["read".to_string(), "write".to_string()],
        )
        .await
        .unwrap();

    let token = response.response.unwrap();
    assert_eq!(token.access_token, "rpt");
    assert_eq!(token.upgraded, Some(false));
}

// ==================== PASSWORD VALIDATION TESTS ====================

#[tokio::test]
async fn test_validate_password_revokes_issued_tokens() {
    let ctx = TestContext::new().await;
    Mock::given(method("POST"))
        .and(path(ctx.openid_path("token")))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body()))
        .expect(1)
        .mount(&ctx.server)
        .await;
    Mock::given(method("POST"))
        .and(path(ctx.openid_path("revoke")))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&ctx.server)
        .await;

    let result = ctx
        .client
        .auth()
        .validate_password(&ctx.realm, &credentials(), &UserLogin::new("alice", "pw"))
        .await
        .unwrap();

    assert!(!result.is_error);
    assert_eq!(result.response, Some(true));
    assert_eq!(result.monitoring_metrics.len(), 3);
}

#[tokio::test]
async fn test_validate_password_rejected_login_is_false() {
    let ctx = TestContext::new().await;
    Mock::given(method("POST"))
        .and(path(ctx.openid_path("token")))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Invalid user credentials"
        })))
        .mount(&ctx.server)
        .await;
    Mock::given(method("POST"))
        .and(path(ctx.openid_path("revoke")))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&ctx.server)
        .await;

    let result = ctx
        .client
        .auth()
        .validate_password(&ctx.realm, &credentials(), &UserLogin::new("alice", "bad"))
        .await
        .unwrap();

    assert_eq!(result.response, Some(false));
    assert!(!result.is_error);
    assert!(result.error_message.unwrap().contains("invalid_grant"));
    assert_eq!(result.monitoring_metrics.len(), 1);
}

#[tokio::test]
async fn test_validate_password_skips_missing_refresh_token() {
    let mut auth = MockAuth::new();
    auth.expect_get_resource_owner_password_token()
        .times(1)
        .returning(|_, _, _, _| {
            Ok(KcResponse {
                response: Some(TokenResponse {
                    access_token: "access-1".to_string(),
                    ..TokenResponse::default()
                }),
                ..KcResponse::default()
            })
        });

    let revoked = Arc::new(AtomicUsize::new(0));
    let counter = revoked.clone();
    auth.expect_revoke_access_token()
        .withf(|realm, _, token| realm == "demo" && token == "access-1")
        .times(1)
        .returning(move |_, _, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(KcResponse {
                response: Some(true),
                ..KcResponse::default()
            })
        });
    auth.expect_revoke_refresh_token().times(0);

    let result = auth
        .validate_password("demo", &credentials(), &UserLogin::new("alice", "pw"))
        .await
        .unwrap();

    assert_eq!(result.response, Some(true));
    assert_eq!(revoked.load(Ordering::SeqCst), 1);
    assert!(result.monitoring_metrics.is_empty());
}

#[tokio::test]
async fn test_validate_password_transport_failure_is_error() {
    let mut auth = MockAuth::new();
    auth.expect_get_resource_owner_password_token()
        .returning(|_, _, _, _| {
            Ok(KcResponse {
                is_error: true,
                ..KcResponse::default()
            })
        });
    auth.expect_revoke_access_token().times(0);

    let result = auth
        .validate_password("demo", &credentials(), &UserLogin::new("alice", "pw"))
        .await
        .unwrap();

    assert_eq!(result.response, Some(false));
    assert!(result.is_error);
}

#[tokio::test]
async fn test_validate_password_revokes_access_before_refresh() {
    let mut auth = MockAuth::new();
    let mut seq = Sequence::new();
    auth.expect_get_resource_owner_password_token()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _, _, _| {
            Ok(KcResponse {
                response: Some(TokenResponse {
                    access_token: "access-1".to_string(),
                    refresh_token: Some("refresh-1".to_string()),
                    ..TokenResponse::default()
                }),
                ..KcResponse::default()
            })
        });
    auth.expect_revoke_access_token()
        .withf(|_, _, token| token == "access-1")
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _, _| {
            Ok(KcResponse {
                response: Some(true),
                ..KcResponse::default()
            })
        });
    auth.expect_revoke_refresh_token()
        .withf(|_, _, token| token == "refresh-1")
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _, _| {
            Ok(KcResponse {
                response: Some(true),
                ..KcResponse::default()
            })
        });

    let result = auth
        .validate_password("demo", &credentials(), &UserLogin::new("alice", "pw"))
        .await
        .unwrap();

    assert_eq!(result.response, Some(true));
    assert!(!result.is_error);
}
