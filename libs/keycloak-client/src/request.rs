//! Single-attempt HTTP pipeline shared by every resource client

use std::time::{Duration, Instant};

use reqwest::header::{ACCEPT, CONTENT_TYPE, LOCATION};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error};

use crate::error::RequestError;
use crate::response::{KcResponse, MonitoringMetrics};

const APPLICATION_JSON: &str = "application/json";
const TEXT_PLAIN: &str = "text/plain";

enum Body {
    Empty,
    Json(Result<Vec<u8>, serde_json::Error>),
    Text(String),
    Form(Vec<(String, String)>),
}

/// One outbound call: verb, URL, optional bearer token and optional body.
pub(crate) struct KcRequest {
    method: Method,
    url: String,
    bearer: Option<String>,
    body: Body,
}

impl KcRequest {
    pub(crate) fn new(method: Method, url: String) -> Self {
        Self {
            method,
            url,
            bearer: None,
            body: Body::Empty,
        }
    }

    pub(crate) fn get(url: String) -> Self {
        Self::new(Method::GET, url)
    }

    pub(crate) fn post(url: String) -> Self {
        Self::new(Method::POST, url)
    }

    pub(crate) fn put(url: String) -> Self {
        Self::new(Method::PUT, url)
    }

    pub(crate) fn delete(url: String) -> Self {
        Self::new(Method::DELETE, url)
    }

    pub(crate) fn bearer(mut self, access_token: &str) -> Self {
        self.bearer = Some(access_token.to_string());
        self
    }

    /// Encodes `body` now; an encoding failure surfaces when the request is sent.
    pub(crate) fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Self {
        self.body = Body::Json(serde_json::to_vec(body));
        self
    }

    pub(crate) fn text(mut self, body: impl Into<String>) -> Self {
        self.body = Body::Text(body.into());
        self
    }

    pub(crate) fn form(mut self, params: Vec<(String, String)>) -> Self {
        self.body = Body::Form(params);
        self
    }
}

/// Sends [`KcRequest`]s over a shared connection pool.
#[derive(Clone)]
pub(crate) struct RequestHandler {
    http: Client,
}

impl RequestHandler {
    pub(crate) fn new(timeout: Option<Duration>) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
        })
    }

    pub(crate) fn with_client(http: Client) -> Self {
        Self { http }
    }

    /// Sends the request and decodes a JSON payload into `T`.
    pub(crate) async fn send<T: DeserializeOwned>(
        &self,
        request: KcRequest,
        context: &str,
    ) -> KcResponse<T> {
        self.execute(request, context, |body| {
            if body.trim().is_empty() {
                Ok(None)
            } else {
                serde_json::from_str(body).map(Some)
            }
        })
        .await
    }

    /// Sends the request and ignores whatever a successful reply contains.
    pub(crate) async fn send_empty(&self, request: KcRequest, context: &str) -> KcResponse<()> {
        self.execute(request, context, |_| Ok(None)).await
    }

    async fn execute<T>(
        &self,
        request: KcRequest,
        context: &str,
        decode: impl FnOnce(&str) -> Result<Option<T>, serde_json::Error>,
    ) -> KcResponse<T> {
        let method = request.method.clone();
        let url = request.url.clone();
        let started = Instant::now();

        let builder = match self.build(request) {
            Ok(builder) => builder,
            Err(e) => {
                let exception = RequestError::Serialize(e);
                error!(%method, %url, error = %exception, "{context}");
                let metrics = metrics(&method, &url, None, started, Some(exception.to_string()));
                return KcResponse::failed(exception, metrics);
            }
        };

        let reply = match builder.send().await {
            Ok(reply) => reply,
            Err(e) => {
                let exception = RequestError::Transport(e);
                error!(%method, %url, error = %exception, "{context}");
                let metrics = metrics(&method, &url, None, started, Some(exception.to_string()));
                return KcResponse::failed(exception, metrics);
            }
        };

        let status = reply.status();
        let location = reply
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(String::from);

        let body = match reply.text().await {
            Ok(body) => body,
            Err(e) => {
                let exception = RequestError::Transport(e);
                error!(%method, %url, status = status.as_u16(), error = %exception, "{context}");
                let metrics =
                    metrics(&method, &url, Some(status), started, Some(exception.to_string()));
                return KcResponse::failed(exception, metrics);
            }
        };

        let response = classify(
            status,
            &body,
            decode,
            metrics(&method, &url, Some(status), started, None),
        );
        if response.is_error {
            error!(
                %method,
                %url,
                status = status.as_u16(),
                error = response.error_message.as_deref().unwrap_or_default(),
                "{context}"
            );
        } else {
            debug!(
                %method,
                %url,
                status = status.as_u16(),
                elapsed_ms = response
                    .monitoring_metrics
                    .as_ref()
                    .map(|m| m.request_milliseconds)
                    .unwrap_or_default() as u64,
                "Keycloak request completed"
            );
        }

        KcResponse { location, ..response }
    }

    fn build(&self, request: KcRequest) -> Result<RequestBuilder, serde_json::Error> {
        let mut builder = self
            .http
            .request(request.method, &request.url)
            .header(ACCEPT, APPLICATION_JSON);

        if let Some(token) = request.bearer.as_deref() {
            builder = builder.bearer_auth(token);
        }

        builder = match request.body {
            Body::Empty => builder,
            Body::Json(encoded) => builder.header(CONTENT_TYPE, APPLICATION_JSON).body(encoded?),
            Body::Text(text) => builder.header(CONTENT_TYPE, TEXT_PLAIN).body(text),
            Body::Form(params) => builder.form(&params),
        };

        Ok(builder)
    }
}

fn metrics(
    method: &Method,
    url: &str,
    status_code: Option<StatusCode>,
    started: Instant,
    error: Option<String>,
) -> MonitoringMetrics {
    MonitoringMetrics {
        http_method: method.clone(),
        url: url.to_string(),
        status_code,
        request_milliseconds: started.elapsed().as_millis(),
        error,
    }
}

/// Maps a completed reply onto the envelope.
///
/// Non-2xx: error, message taken from the body. 204 or blank body: no
/// payload. Otherwise the body is decoded; a decode failure is an error that
/// keeps the status.
fn classify<T>(
    status: StatusCode,
    body: &str,
    decode: impl FnOnce(&str) -> Result<Option<T>, serde_json::Error>,
    mut metrics: MonitoringMetrics,
) -> KcResponse<T> {
    if !status.is_success() {
        metrics.error = Some(body.to_string());
        return KcResponse {
            is_error: true,
            error_message: Some(body.to_string()),
            monitoring_metrics: Some(metrics),
            ..KcResponse::default()
        };
    }

    if status == StatusCode::NO_CONTENT {
        return KcResponse {
            monitoring_metrics: Some(metrics),
            ..KcResponse::default()
        };
    }

    match decode(body) {
        Ok(response) => KcResponse {
            response,
            monitoring_metrics: Some(metrics),
            ..KcResponse::default()
        },
        Err(e) => {
            let exception = RequestError::Deserialize(e);
            metrics.error = Some(exception.to_string());
            KcResponse::failed(exception, metrics)
        }
    }
}
