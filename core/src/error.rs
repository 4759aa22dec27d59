//! Error types for the discount-code client.
//!
//! # Design
//! `NotFound` and `Validation` get dedicated variants because callers branch
//! on "the code does not exist" and "the shop rejected the payload" far more
//! often than on anything else. `RateLimited` only classifies a 429; waiting
//! and retrying is left to the host's transport. All other non-2xx responses
//! land in `HttpError` with the raw status code and body for debugging.

use thiserror::Error;

/// Errors returned by `DiscountCodeClient` build and parse methods.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server returned 404: the price rule or discount code does not exist.
    #[error("resource not found")]
    NotFound,

    /// The server returned 422 with field-level messages.
    #[error("validation failed: {}", .errors.join(", "))]
    Validation { errors: Vec<String> },

    /// The server returned 429. `retry_after` is in seconds when the shop
    /// sent a `Retry-After` header.
    #[error("rate limited (retry after {retry_after:?}s)")]
    RateLimited { retry_after: Option<u64> },

    /// The server returned a non-2xx status not covered above.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// Client configuration is missing or malformed.
    #[error("invalid configuration: {0}")]
    Config(String),
}
