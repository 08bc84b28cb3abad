//! Uniform response envelope returned by every operation

use reqwest::{Method, StatusCode};

use crate::error::RequestError;

/// Timing and outcome of a single HTTP round trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitoringMetrics {
    pub http_method: Method,
    pub url: String,
    /// `None` when the request never produced a response
    pub status_code: Option<StatusCode>,
    pub request_milliseconds: u128,
    pub error: Option<String>,
}

/// Outcome of one call to Keycloak.
///
/// Operational failures (transport, non-2xx status, undecodable body) are
/// reported here with `is_error` set instead of being returned as `Err`.
/// An envelope produced without talking to the server (for example adding an
/// empty list of roles) carries no metrics.
#[derive(Debug)]
pub struct KcResponse<T> {
    pub response: Option<T>,
    pub is_error: bool,
    pub error_message: Option<String>,
    pub exception: Option<RequestError>,
    pub monitoring_metrics: Option<MonitoringMetrics>,
    /// `Location` header of the reply, set by create endpoints
    pub location: Option<String>,
}

impl<T> Default for KcResponse<T> {
    fn default() -> Self {
        Self {
            response: None,
            is_error: false,
            error_message: None,
            exception: None,
            monitoring_metrics: None,
            location: None,
        }
    }
}

impl<T> KcResponse<T> {
    pub(crate) fn failed(
        exception: RequestError,
        metrics: MonitoringMetrics,
    ) -> Self {
        Self {
            is_error: true,
            error_message: Some(exception.to_string()),
            exception: Some(exception),
            monitoring_metrics: Some(metrics),
            ..Self::default()
        }
    }

    pub fn is_success(&self) -> bool {
        !self.is_error
    }

    pub fn status_code(&self) -> Option<StatusCode> {
        self.monitoring_metrics.as_ref().and_then(|m| m.status_code)
    }

    /// Id assigned by Keycloak to a newly created entity.
    ///
    /// Location format: `http://host/admin/realms/{realm}/users/{id}`
    pub fn created_id(&self) -> Option<&str> {
        self.location
            .as_deref()
            .and_then(|location| location.trim_end_matches('/').rsplit('/').next())
            .filter(|id| !id.is_empty())
    }

    /// Replaces the payload, keeping status, error and metrics.
    pub fn map<U>(self, f: impl FnOnce(Option<T>) -> Option<U>) -> KcResponse<U> {
        KcResponse {
            response: f(self.response),
            is_error: self.is_error,
            error_message: self.error_message,
            exception: self.exception,
            monitoring_metrics: self.monitoring_metrics,
            location: self.location,
        }
    }
}

/// Result of an operation made of several round trips; one metrics entry per
/// call actually performed.
#[derive(Debug)]
pub struct KcOperationResponse<T> {
    pub response: Option<T>,
    pub is_error: bool,
    pub error_message: Option<String>,
    pub exception: Option<RequestError>,
    pub monitoring_metrics: Vec<MonitoringMetrics>,
}

impl<T> Default for KcOperationResponse<T> {
    fn default() -> Self {
        Self {
            response: None,
            is_error: false,
            error_message: None,
            exception: None,
            monitoring_metrics: Vec::new(),
        }
    }
}

impl<T> KcOperationResponse<T> {
    pub(crate) fn record<U>(&mut self, step: &KcResponse<U>) {
        if let Some(metrics) = &step.monitoring_metrics {
            self.monitoring_metrics.push(metrics.clone());
        }
    }
}

impl KcOperationResponse<bool> {
    /// Ends the operation with a `false` verdict taken from a failed step.
    ///
    /// A step Keycloak answered with an explanation is a rejection, not an
    /// error; only a failure without a message (transport, decode) sets
    /// `is_error`.
    pub(crate) fn reject<U>(mut self, step: KcResponse<U>) -> Self {
        self.is_error = step
            .error_message
            .as_deref()
            .map_or(true, |message| message.trim().is_empty());
        self.error_message = step.error_message;
        self.exception = step.exception;
        self.response = Some(false);
        self
    }

    /// Ends the operation with a `false` verdict decided locally.
    pub(crate) fn deny(mut self, reason: impl Into<String>) -> Self {
        self.error_message = Some(reason.into());
        self.response = Some(false);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(status: Option<StatusCode>) -> MonitoringMetrics {
        MonitoringMetrics {
            http_method: Method::POST,
            url: "http://kc/admin/realms/demo/users".to_string(),
            status_code: status,
            request_milliseconds: 3,
            error: None,
        }
    }

    #[test]
    fn default_envelope_is_a_silent_success() {
        let response: KcResponse<String> = KcResponse::default();
        assert!(response.is_success());
        assert!(response.monitoring_metrics.is_none());
        assert!(response.status_code().is_none());
    }

    #[test]
    fn created_id_is_last_location_segment() {
        let response: KcResponse<()> = KcResponse {
            location: Some(
                "http://kc/admin/realms/demo/users/6f1c0a2e-8d1b-4c61-9b7e-2f4c8e0a9d11".into(),
            ),
            monitoring_metrics: Some(metrics(Some(StatusCode::CREATED))),
            ..KcResponse::default()
        };
        assert_eq!(
            response.created_id(),
            Some("6f1c0a2e-8d1b-4c61-9b7e-2f4c8e0a9d11")
        );
        assert_eq!(response.status_code(), Some(StatusCode::CREATED));
    }

    #[test]
    fn created_id_is_absent_without_location() {
        let response: KcResponse<()> = KcResponse::default();
        assert!(response.created_id().is_none());
    }

    #[test]
    fn map_keeps_error_state() {
        let response: KcResponse<u32> = KcResponse {
            is_error: true,
            error_message: Some("boom".into()),
            monitoring_metrics: Some(metrics(Some(StatusCode::BAD_REQUEST))),
            ..KcResponse::default()
        };
        let mapped = response.map(|_| Some(false));
        assert!(mapped.is_error);
        assert_eq!(mapped.response, Some(false));
        assert_eq!(mapped.error_message.as_deref(), Some("boom"));
        assert_eq!(mapped.status_code(), Some(StatusCode::BAD_REQUEST));
    }

    #[test]
    fn operation_response_collects_only_performed_calls() {
        let mut operation: KcOperationResponse<bool> = KcOperationResponse::default();
        let performed: KcResponse<()> = KcResponse {
            monitoring_metrics: Some(metrics(Some(StatusCode::OK))),
            ..KcResponse::default()
        };
        operation.record(&performed);
        operation.record(&KcResponse::<()>::default());
        assert_eq!(operation.monitoring_metrics.len(), 1);
    }

    #[test]
    fn rejection_with_message_is_not_an_error() {
        let step: KcResponse<()> = KcResponse {
            is_error: true,
            error_message: Some("access_denied".to_string()),
            ..KcResponse::default()
        };
        let rejected = KcOperationResponse::default().reject(step);
        assert_eq!(rejected.response, Some(false));
        assert!(!rejected.is_error);
        assert_eq!(rejected.error_message.as_deref(), Some("access_denied"));
    }

    #[test]
    fn rejection_without_message_is_an_error() {
        let step: KcResponse<()> = KcResponse {
            is_error: true,
            error_message: Some("  ".to_string()),
            ..KcResponse::default()
        };
        let rejected = KcOperationResponse::default().reject(step);
        assert_eq!(rejected.response, Some(false));
        assert!(rejected.is_error);
    }

    #[test]
    fn local_denial_keeps_recorded_metrics() {
        let mut operation = KcOperationResponse::default();
        operation.record(&KcResponse::<()> {
            monitoring_metrics: Some(metrics(Some(StatusCode::OK))),
            ..KcResponse::default()
        });
        let denied = operation.deny("Session s1 not found");
        assert_eq!(denied.response, Some(false));
        assert!(!denied.is_error);
        assert_eq!(denied.monitoring_metrics.len(), 1);
    }
}
