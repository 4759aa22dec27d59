//! C-ABI wrapper around `discount-core`.
//!
//! # Overview
//! Exposes the discount-code CRUD API through `extern "C"` functions so any
//! language with a C FFI can build and parse Shopify HTTP requests/responses
//! without linking to serde directly.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - Per-operation `build_*` / `parse_*` mirrors the core API 1:1.
//! - A single `FfiDiscountResult` envelope with `FfiDataTag` + `void* data`
//!   conveys success payloads and errors uniformly.
//! - The C caller owns all returned pointers and must call the matching
//!   `discount_free_*` function to release them.

pub mod types;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::panic::catch_unwind;

use discount_core::http::HttpResponse;
use discount_core::types::{DiscountCodeUpdate, NewDiscountCode};
use discount_core::ClientConfig;

use types::*;

/// Borrow a C string as `&str`; null or invalid UTF-8 yields `None`.
fn opt_str<'a>(s: *const c_char) -> Option<&'a str> {
    if s.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(s) }.to_str().ok()
}

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a new `DiscountCodeClient` for the shop at `base_url`.
///
/// `api_version` and `access_token` may be null. Returns null if `base_url`
/// is null or if an internal panic occurs. The caller must free the returned
/// pointer with `discount_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn discount_client_new(
    base_url: *const c_char,
    api_version: *const c_char,
    access_token: *const c_char,
) -> *mut FfiDiscountClient {
    catch_unwind(|| {
        let Some(url) = opt_str(base_url) else {
            return std::ptr::null_mut();
        };
        let mut config = ClientConfig::new(url);
        if let Some(version) = opt_str(api_version) {
            config = config.with_api_version(version);
        }
        if let Some(token) = opt_str(access_token) {
            config = config.with_access_token(token);
        }
        let client = discount_core::DiscountCodeClient::from_config(&config);
        Box::into_raw(Box::new(FfiDiscountClient { inner: client }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a client created by `discount_client_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn discount_client_free(client: *mut FfiDiscountClient) {
    if !client.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(client) });
        });
    }
}

// ---------------------------------------------------------------------------
// Build request functions
// ---------------------------------------------------------------------------

/// Build an HTTP request listing the discount codes of a price rule.
///
/// Returns null if `client` is null.
/// The caller must free the returned pointer with `discount_free_request`.
#[unsafe(no_mangle)]
pub extern "C" fn discount_build_list_codes(
    client: *const FfiDiscountClient,
    price_rule_id: u64,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        FfiHttpRequest::from_core(client.inner.build_list_discount_codes(price_rule_id))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build an HTTP request fetching a single discount code.
///
/// Returns null if `client` is null.
#[unsafe(no_mangle)]
pub extern "C" fn discount_build_get_code(
    client: *const FfiDiscountClient,
    price_rule_id: u64,
    id: u64,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        FfiHttpRequest::from_core(client.inner.build_get_discount_code(price_rule_id, id))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build an HTTP request creating a discount code under a price rule.
///
/// Returns null if `client` or `code` is null, or if serialization fails.
#[unsafe(no_mangle)]
pub extern "C" fn discount_build_create_code(
    client: *const FfiDiscountClient,
    price_rule_id: u64,
    code: *const c_char,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let Some(code) = opt_str(code) else {
            return std::ptr::null_mut();
        };
        let client = unsafe { &*client };
        let input = NewDiscountCode {
            code: code.to_string(),
        };
        match client.inner.build_create_discount_code(price_rule_id, &input) {
            Ok(req) => FfiHttpRequest::from_core(req),
            Err(_) => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build an HTTP request updating a discount code.
///
/// `code` may be null (leave unchanged). Returns null if `client` is null,
/// if a non-null `code` is not valid UTF-8, or if serialization fails.
#[unsafe(no_mangle)]
pub extern "C" fn discount_build_update_code(
    client: *const FfiDiscountClient,
    price_rule_id: u64,
    id: u64,
    code: *const c_char,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let code = if code.is_null() {
            None
        } else {
            match unsafe { CStr::from_ptr(code) }.to_str() {
                Ok(code) => Some(code.to_string()),
                Err(_) => return std::ptr::null_mut(),
            }
        };
        let client = unsafe { &*client };
        let input = DiscountCodeUpdate { code };
        match client.inner.build_update_discount_code(price_rule_id, id, &input) {
            Ok(req) => FfiHttpRequest::from_core(req),
            Err(_) => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build an HTTP request deleting a discount code.
///
/// Returns null if `client` is null.
#[unsafe(no_mangle)]
pub extern "C" fn discount_build_delete_code(
    client: *const FfiDiscountClient,
    price_rule_id: u64,
    id: u64,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        FfiHttpRequest::from_core(client.inner.build_delete_discount_code(price_rule_id, id))
    })
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Parse response functions
// ---------------------------------------------------------------------------

/// Convert an `FfiHttpResponse` to a core `HttpResponse`. A null body is
/// treated as empty.
fn ffi_response_to_core(resp: &FfiHttpResponse) -> HttpResponse {
    let body = opt_str(resp.body).unwrap_or("").to_string();
    let headers = opt_str(resp.retry_after)
        .map(|v| vec![("retry-after".to_string(), v.to_string())])
        .unwrap_or_default();
    HttpResponse {
        status: resp.status,
        headers,
        body,
    }
}

/// Shared null checks and panic guard for every `discount_parse_*` entry
/// point.
fn parse_with(
    name: &'static str,
    client: *const FfiDiscountClient,
    response: *const FfiHttpResponse,
    parse: impl Fn(&discount_core::DiscountCodeClient, HttpResponse) -> *mut FfiDiscountResult
        + std::panic::UnwindSafe,
) -> *mut FfiDiscountResult {
    catch_unwind(move || {
        if client.is_null() {
            return FfiDiscountResult::null_arg("client");
        }
        if response.is_null() {
            return FfiDiscountResult::null_arg("response");
        }
        let client = unsafe { &*client };
        let resp = unsafe { &*response };
        parse(&client.inner, ffi_response_to_core(resp))
    })
    .unwrap_or_else(|_| FfiDiscountResult::panic(&format!("panic in {name}")))
}

/// Parse an HTTP response from a list request.
///
/// Returns a result with `data_tag = DiscountCodeList` on success.
#[unsafe(no_mangle)]
pub extern "C" fn discount_parse_list_codes(
    client: *const FfiDiscountClient,
    response: *const FfiHttpResponse,
) -> *mut FfiDiscountResult {
    parse_with("discount_parse_list_codes", client, response, |c, resp| {
        match c.parse_list_discount_codes(resp) {
            Ok(codes) => FfiDiscountResult::ok_code_list(codes),
            Err(e) => FfiDiscountResult::from_error(e),
        }
    })
}

/// Parse an HTTP response from a get request.
///
/// Returns a result with `data_tag = DiscountCode` on success.
#[unsafe(no_mangle)]
pub extern "C" fn discount_parse_get_code(
    client: *const FfiDiscountClient,
    response: *const FfiHttpResponse,
) -> *mut FfiDiscountResult {
    parse_with("discount_parse_get_code", client, response, |c, resp| {
        match c.parse_get_discount_code(resp) {
            Ok(code) => FfiDiscountResult::ok_code(code),
            Err(e) => FfiDiscountResult::from_error(e),
        }
    })
}

/// Parse an HTTP response from a create request.
///
/// Returns a result with `data_tag = DiscountCode` on success (status 201).
#[unsafe(no_mangle)]
pub extern "C" fn discount_parse_create_code(
    client: *const FfiDiscountClient,
    response: *const FfiHttpResponse,
) -> *mut FfiDiscountResult {
    parse_with("discount_parse_create_code", client, response, |c, resp| {
        match c.parse_create_discount_code(resp) {
            Ok(code) => FfiDiscountResult::ok_code(code),
            Err(e) => FfiDiscountResult::from_error(e),
        }
    })
}

/// Parse an HTTP response from an update request.
///
/// Returns a result with `data_tag = DiscountCode` on success.
#[unsafe(no_mangle)]
pub extern "C" fn discount_parse_update_code(
    client: *const FfiDiscountClient,
    response: *const FfiHttpResponse,
) -> *mut FfiDiscountResult {
    parse_with("discount_parse_update_code", client, response, |c, resp| {
        match c.parse_update_discount_code(resp) {
            Ok(code) => FfiDiscountResult::ok_code(code),
            Err(e) => FfiDiscountResult::from_error(e),
        }
    })
}

/// Parse an HTTP response from a delete request.
///
/// Returns a result with `data_tag = None` on success (status 204).
#[unsafe(no_mangle)]
pub extern "C" fn discount_parse_delete_code(
    client: *const FfiDiscountClient,
    response: *const FfiHttpResponse,
) -> *mut FfiDiscountResult {
    parse_with("discount_parse_delete_code", client, response, |c, resp| {
        match c.parse_delete_discount_code(resp) {
            Ok(()) => FfiDiscountResult::ok_empty(),
            Err(e) => FfiDiscountResult::from_error(e),
        }
    })
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an `FfiHttpRequest` returned by any `discount_build_*` function.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn discount_free_request(req: *mut FfiHttpRequest) {
    if req.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let req = unsafe { Box::from_raw(req) };
        if !req.path.is_null() {
            drop(unsafe { CString::from_raw(req.path) });
        }
        if !req.body.is_null() {
            drop(unsafe { CString::from_raw(req.body) });
        }
        if !req.headers.is_null() && req.headers_len > 0 {
            let headers: Box<[FfiHeader]> = unsafe {
                Box::from_raw(std::ptr::slice_from_raw_parts_mut(
                    req.headers,
                    req.headers_len as usize,
                ))
            };
            for h in headers.iter() {
                if !h.key.is_null() {
                    drop(unsafe { CString::from_raw(h.key) });
                }
                if !h.value.is_null() {
                    drop(unsafe { CString::from_raw(h.value) });
                }
            }
        }
    });
}

/// Free an `FfiDiscountResult` returned by any `discount_parse_*` function.
/// Safe to call with null. Uses `data_tag` to determine what `data` points to.
#[unsafe(no_mangle)]
pub extern "C" fn discount_free_result(result: *mut FfiDiscountResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        if !result.error_message.is_null() {
            drop(unsafe { CString::from_raw(result.error_message) });
        }
        if result.data.is_null() {
            return;
        }
        match result.data_tag {
            FfiDataTag::DiscountCode => {
                let code = unsafe { Box::from_raw(result.data as *mut FfiDiscountCode) };
                free_code_fields(&code);
            }
            FfiDataTag::DiscountCodeList => {
                let list = unsafe { Box::from_raw(result.data as *mut FfiDiscountCodeList) };
                if !list.items.is_null() && list.len > 0 {
                    let items: Box<[FfiDiscountCode]> = unsafe {
                        Box::from_raw(std::ptr::slice_from_raw_parts_mut(
                            list.items,
                            list.len as usize,
                        ))
                    };
                    for item in items.iter() {
                        free_code_fields(item);
                    }
                }
            }
            FfiDataTag::None => {}
        }
    });
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn discount_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { CString::from_raw(s) });
        });
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
