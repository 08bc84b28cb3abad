mod common;

use reqwest::StatusCode;
use serde_json::json;
use wiremock::matchers::{any, body_string_contains, header, method, path};
use wiremock::{Mock, ResponseTemplate};

use common::{jwt, TestContext};
use keycloak_client::{PermissionCheck, ValidationError};

fn user_token(ctx: &TestContext) -> String {
    jwt(json!({
        "iss": ctx.issuer(),
        "sub": "u1",
        "sid": "s1",
        "azp": "web"
    }))
}

fn invoices_read<'a>(ctx: &'a TestContext, access_token: &'a str) -> PermissionCheck<'a> {
    PermissionCheck {
        access_token,
        admin_token: &ctx.token,
        audience: "billing-api",
        resource: "invoices",
        scope: "read",
    }
}

async fn mount_user(ctx: &TestContext, sessions: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(ctx.admin_path("users/u1")))
        .and(header("authorization", ctx.bearer().as_str()))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"id": "u1", "username": "alice"})),
        )
        .expect(1)
        .mount(&ctx.server)
        .await;
    Mock::given(method("GET"))
        .and(path(ctx.admin_path("users/u1/sessions")))
        .and(header("authorization", ctx.bearer().as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(sessions))
        .expect(1)
        .mount(&ctx.server)
        .await;
}

// ==================== GRANTED TESTS ====================

#[tokio::test]
async fn test_active_session_with_granted_permission_passes() {
    let ctx = TestContext::new().await;
    let token = user_token(&ctx);
    mount_user(&ctx, json!([{"id": "s0"}, {"id": "s1", "userId": "u1"}])).await;
    let bearer = format!("Bearer {token}");
    Mock::given(method("POST"))
        .and(path(ctx.openid_path("token")))
        .and(header("authorization", bearer.as_str()))
        .and(body_string_contains("uma-ticket"))
        .and(body_string_contains("audience=billing-api"))
        .and(body_string_contains("permission=invoices%23read"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "rpt",
            "upgraded": false
        })))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let result = ctx
        .client
        .check_permission(&invoices_read(&ctx, &token))
        .await
        .unwrap();

    assert_eq!(result.response, Some(true));
    assert!(!result.is_error);
    assert!(result.error_message.is_none());
    assert_eq!(result.monitoring_metrics.len(), 3);
}

// ==================== DENIED TESTS ====================

#[tokio::test]
async fn test_closed_session_is_denied_without_asking_for_rpt() {
    let ctx = TestContext::new().await;
    let token = user_token(&ctx);
    mount_user(&ctx, json!([{"id": "other"}])).await;
    Mock::given(method("POST"))
        .and(path(ctx.openid_path("token")))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&ctx.server)
        .await;

    let result = ctx
        .client
        .check_permission(&invoices_read(&ctx, &token))
        .await
        .unwrap();

    assert_eq!(result.response, Some(false));
    assert!(!result.is_error);
    assert!(result.error_message.unwrap().contains("Session s1"));
    assert_eq!(result.monitoring_metrics.len(), 2);
}

#[tokio::test]
async fn test_rpt_refusal_is_a_denial() {
    let ctx = TestContext::new().await;
    let token = user_token(&ctx);
    mount_user(&ctx, json!([{"id": "s1"}])).await;
    Mock::given(method("POST"))
        .and(path(ctx.openid_path("token")))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": "access_denied",
            "error_description": "not_authorized"
        })))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let result = ctx
        .client
        .check_permission(&invoices_read(&ctx, &token))
        .await
        .unwrap();

    assert_eq!(result.response, Some(false));
    assert!(!result.is_error);
    assert!(result.error_message.unwrap().contains("access_denied"));
    assert_eq!(result.monitoring_metrics.len(), 3);
    assert_eq!(
        result.monitoring_metrics[2].status_code,
        Some(StatusCode::FORBIDDEN)
    );
}

#[tokio::test]
async fn test_deleted_user_is_denied() {
    let ctx = TestContext::new().await;
    let token = user_token(&ctx);
    Mock::given(method("GET"))
        .and(path(ctx.admin_path("users/u1")))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": "User not found"
        })))
        .expect(1)
        .mount(&ctx.server)
        .await;
    Mock::given(method("GET"))
        .and(path(ctx.admin_path("users/u1/sessions")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&ctx.server)
        .await;

    let result = ctx
        .client
        .check_permission(&invoices_read(&ctx, &token))
        .await
        .unwrap();

    assert_eq!(result.response, Some(false));
    assert!(!result.is_error);
    assert_eq!(result.monitoring_metrics.len(), 1);
    assert_eq!(
        result.monitoring_metrics[0].status_code,
        Some(StatusCode::NOT_FOUND)
    );
}

#[tokio::test]
async fn test_token_without_realm_issuer_is_denied_locally() {
    let ctx = TestContext::new().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&ctx.server)
        .await;

    let no_issuer = jwt(json!({"sub": "u1", "sid": "s1"}));
    let result = ctx
        .client
        .check_permission(&invoices_read(&ctx, &no_issuer))
        .await
        .unwrap();
    assert_eq!(result.response, Some(false));
    assert!(result.monitoring_metrics.is_empty());

    let opaque = "not-a-jwt".to_string();
    let result = ctx
        .client
        .check_permission(&invoices_read(&ctx, &opaque))
        .await
        .unwrap();
    assert_eq!(result.response, Some(false));
    assert!(!result.is_error);
}

#[tokio::test]
async fn test_token_without_session_id_is_denied_locally() {
    let ctx = TestContext::new().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&ctx.server)
        .await;

    let token = jwt(json!({"iss": ctx.issuer(), "sub": "u1"}));
    let result = ctx
        .client
        .check_permission(&invoices_read(&ctx, &token))
        .await
        .unwrap();

    assert_eq!(result.response, Some(false));
    assert_eq!(
        result.error_message.as_deref(),
        Some("Unable to extract session id")
    );
}

// ==================== VALIDATION TESTS ====================

#[tokio::test]
async fn test_blank_scope_fails_before_any_request() {
    let ctx = TestContext::new().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&ctx.server)
        .await;

    let token = user_token(&ctx);
    let check = PermissionCheck {
        scope: " ",
        ..invoices_read(&ctx, &token)
    };
    let err = ctx.client.check_permission(&check).await.unwrap_err();

    assert_eq!(err, ValidationError::Required("scope"));
}
