//! Error types for the Keycloak client
//!
//! Two tiers: [`ValidationError`] is returned before any network I/O when the
//! caller passed bad input; [`RequestError`] is captured inside the response
//! envelope for failures that happen while talking to the server.

use thiserror::Error;

/// Invalid input detected on the client side. No request was sent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValidationError {
    /// A required argument was blank or missing
    #[error("{0} is required")]
    Required(&'static str),

    /// The configured base URL cannot address a Keycloak server
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),
}

/// Failure captured while performing a request.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum RequestError {
    /// Connection, DNS, TLS or timeout failure
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body did not match the expected shape
    #[error("Failed to parse response: {0}")]
    Deserialize(#[source] serde_json::Error),

    /// The request body could not be encoded
    #[error("Failed to encode request body: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// Failure while constructing a [`crate::KeycloakClient`].
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ClientBuildError {
    #[error(transparent)]
    Config(#[from] ValidationError),

    #[error("Failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}
