//! Stateless HTTP request builder and response parser for discount codes.
//!
//! # Design
//! `DiscountCodeClient` holds only its resolved base URL, path prefix and
//! optional access token, and carries no mutable state between calls. Each
//! CRUD operation is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`. The
//! host executes the actual HTTP round-trip, keeping the core deterministic
//! and free of I/O dependencies.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{
    DiscountCode, DiscountCodeEnvelope, DiscountCodeUpdate, DiscountCodesEnvelope,
    NewDiscountCode, UpdateBody,
};

const ACCESS_TOKEN_HEADER: &str = "x-shopify-access-token";

/// Synchronous, stateless client for the price-rule discount-code resource.
///
/// Builds `HttpRequest` values and parses `HttpResponse` values without
/// touching the network. The caller is responsible for executing the HTTP
/// round-trip between `build_*` and `parse_*`.
#[derive(Debug, Clone)]
pub struct DiscountCodeClient {
    base_url: String,
    path_prefix: String,
    access_token: Option<String>,
}

impl DiscountCodeClient {
    /// Client for the unversioned `admin` API with no access token.
    pub fn new(base_url: &str) -> Self {
        Self::from_config(&ClientConfig::new(base_url))
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            path_prefix: config.path_prefix(),
            access_token: config.access_token.clone(),
        }
    }

    pub fn build_list_discount_codes(&self, price_rule_id: u64) -> HttpRequest {
        self.request(HttpMethod::Get, self.collection_path(price_rule_id), None)
    }

    pub fn build_get_discount_code(&self, price_rule_id: u64, id: u64) -> HttpRequest {
        self.request(HttpMethod::Get, self.member_path(price_rule_id, id), None)
    }

    pub fn build_create_discount_code(
        &self,
        price_rule_id: u64,
        input: &NewDiscountCode,
    ) -> Result<HttpRequest, ApiError> {
        let body = to_json(&DiscountCodeEnvelope { discount_code: input })?;
        Ok(self.request(HttpMethod::Post, self.collection_path(price_rule_id), Some(body)))
    }

    pub fn build_update_discount_code(
        &self,
        price_rule_id: u64,
        id: u64,
        input: &DiscountCodeUpdate,
    ) -> Result<HttpRequest, ApiError> {
        let body = to_json(&DiscountCodeEnvelope {
            discount_code: UpdateBody { id, fields: input },
        })?;
        Ok(self.request(HttpMethod::Put, self.member_path(price_rule_id, id), Some(body)))
    }

    pub fn build_delete_discount_code(&self, price_rule_id: u64, id: u64) -> HttpRequest {
        self.request(HttpMethod::Delete, self.member_path(price_rule_id, id), None)
    }

    pub fn parse_list_discount_codes(
        &self,
        response: HttpResponse,
    ) -> Result<Vec<DiscountCode>, ApiError> {
        check_status(&response, 200)?;
        let envelope: DiscountCodesEnvelope = from_json(&response.body)?;
        debug!(count = envelope.discount_codes.len(), "parsed discount codes");
        Ok(envelope.discount_codes)
    }

    pub fn parse_get_discount_code(&self, response: HttpResponse) -> Result<DiscountCode, ApiError> {
        check_status(&response, 200)?;
        parse_single(&response)
    }

    pub fn parse_create_discount_code(
        &self,
        response: HttpResponse,
    ) -> Result<DiscountCode, ApiError> {
        check_status(&response, 201)?;
        parse_single(&response)
    }

    pub fn parse_update_discount_code(
        &self,
        response: HttpResponse,
    ) -> Result<DiscountCode, ApiError> {
        check_status(&response, 200)?;
        parse_single(&response)
    }

    /// The shop answers 204 (some versions 200); whatever body it sends
    /// along is ignored.
    pub fn parse_delete_discount_code(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, 204)?;
        Ok(())
    }

    fn collection_path(&self, price_rule_id: u64) -> String {
        format!(
            "{}/{}/price_rules/{price_rule_id}/discount_codes.json",
            self.base_url, self.path_prefix
        )
    }

    fn member_path(&self, price_rule_id: u64, id: u64) -> String {
        format!(
            "{}/{}/price_rules/{price_rule_id}/discount_codes/{id}.json",
            self.base_url, self.path_prefix
        )
    }

    fn request(&self, method: HttpMethod, path: String, body: Option<String>) -> HttpRequest {
        let mut headers = Vec::new();
        if body.is_some() {
            headers.push(("content-type".to_string(), "application/json".to_string()));
        }
        if let Some(token) = &self.access_token {
            headers.push((ACCESS_TOKEN_HEADER.to_string(), token.clone()));
        }
        debug!(%method, path = path.as_str(), "built request");
        HttpRequest {
            method,
            path,
            headers,
            body,
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String, ApiError> {
    serde_json::to_string(value).map_err(|e| ApiError::SerializationError(e.to_string()))
}

fn from_json<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

fn parse_single(response: &HttpResponse) -> Result<DiscountCode, ApiError> {
    let envelope: DiscountCodeEnvelope<DiscountCode> = from_json(&response.body)?;
    debug!(id = envelope.discount_code.id, "parsed discount code");
    Ok(envelope.discount_code)
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse, expected: u16) -> Result<(), ApiError> {
    if (200..300).contains(&response.status) {
        if response.status != expected {
            debug!(status = response.status, expected, "accepted non-canonical success status");
        }
        return Ok(());
    }
    warn!(status = response.status, expected, "unexpected response status");
    match response.status {
        404 => Err(ApiError::NotFound),
        422 => Err(ApiError::Validation {
            errors: validation_errors(&response.body),
        }),
        429 => Err(ApiError::RateLimited {
            retry_after: response
                .header("retry-after")
                .and_then(|v| v.trim().parse::<f64>().ok())
                .filter(|secs| secs.is_finite() && *secs >= 0.0 && *secs <= u64::MAX as f64)
                .map(|secs| secs.ceil() as u64),
        }),
        status => Err(ApiError::HttpError {
            status,
            body: response.body.clone(),
        }),
    }
}

/// Flatten a Shopify `errors` body into sorted `field: message` strings.
///
/// The shop uses three shapes: a bare string, a list of strings, or a map
/// from field name to a list of messages (or a single message). Anything
/// unparseable is reported verbatim.
fn validation_errors(body: &str) -> Vec<String> {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return vec![body.to_string()];
    };
    let errors = match value.get("errors").or_else(|| value.get("error")) {
        Some(errors) => errors,
        None => return vec![body.to_string()],
    };

    let mut out = match errors {
        serde_json::Value::String(message) => vec![message.clone()],
        serde_json::Value::Array(items) => items.iter().map(value_text).collect(),
        serde_json::Value::Object(fields) => fields
            .iter()
            .flat_map(|(field, messages)| match messages {
                serde_json::Value::Array(items) => items
                    .iter()
                    .map(|m| format!("{field}: {}", value_text(m)))
                    .collect::<Vec<_>>(),
                other => vec![format!("{field}: {}", value_text(other))],
            })
            .collect(),
        other => vec![other.to_string()],
    };
    out.sort();
    out
}

fn value_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
