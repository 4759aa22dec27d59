//! Synchronous Shopify discount-code client core.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values for the
//! `price_rules/{id}/discount_codes` resource without touching the network
//! (host-does-IO pattern). The caller executes the actual HTTP round-trip,
//! making the core fully deterministic and testable.
//!
//! # Design
//! - `DiscountCodeClient` is stateless: base URL, path prefix, access token.
//! - Each CRUD operation is split into `build_*` (produces request) and
//!   `parse_*` (consumes response), so the I/O boundary is explicit.
//! - Types use owned `String` / `Vec` fields to simplify FFI mapping.
//! - DTOs are defined independently from the mock-shop crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod types;

pub use client::DiscountCodeClient;
pub use config::ClientConfig;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use types::{DiscountCode, DiscountCodeUpdate, NewDiscountCode};
