//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type but uses C-compatible representations:
//! `*mut c_char` instead of `String`, raw pointers instead of `Vec`, and
//! tagged enums with explicit discriminants. Conversion functions live here
//! to keep `lib.rs` focused on the `extern "C"` surface.

use std::ffi::CString;
use std::os::raw::c_char;

use discount_core::error::ApiError;
use discount_core::http::HttpMethod;
use discount_core::DiscountCode;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// Opaque handle to a `DiscountCodeClient`. C callers receive a pointer to
/// this and pass it back into every FFI function.
pub struct FfiDiscountClient {
    pub(crate) inner: discount_core::DiscountCodeClient,
}

/// Copy a Rust string into a heap C string. Interior NULs cannot come out of
/// the JSON layer, but map them to an empty string rather than panicking.
pub(crate) fn c_string(s: impl Into<Vec<u8>>) -> *mut c_char {
    CString::new(s).unwrap_or_default().into_raw()
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// HTTP method as a C enum.
#[repr(C)]
pub enum FfiHttpMethod {
    Get = 0,
    Post = 1,
    Put = 2,
    Delete = 3,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => FfiHttpMethod::Get,
            HttpMethod::Post => FfiHttpMethod::Post,
            HttpMethod::Put => FfiHttpMethod::Put,
            HttpMethod::Delete => FfiHttpMethod::Delete,
        }
    }
}

/// A single HTTP header as a key-value pair of C strings.
#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// An HTTP request described as C-compatible plain data.
///
/// Built by `discount_build_*` functions. The C caller executes the request
/// and passes the response back through `discount_parse_*`.
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    pub path: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    pub body: *mut c_char,
}

impl FfiHttpRequest {
    /// Convert a core `HttpRequest` into a heap-allocated `FfiHttpRequest`.
    pub(crate) fn from_core(req: discount_core::HttpRequest) -> *mut Self {
        let path = c_string(req.path);
        let body = match req.body {
            Some(b) => c_string(b),
            None => std::ptr::null_mut(),
        };

        let headers_len = req.headers.len() as u32;
        let headers = if req.headers.is_empty() {
            std::ptr::null_mut()
        } else {
            let ffi_headers: Box<[FfiHeader]> = req
                .headers
                .into_iter()
                .map(|(k, v)| FfiHeader {
                    key: c_string(k),
                    value: c_string(v),
                })
                .collect();
            Box::into_raw(ffi_headers) as *mut FfiHeader
        };

        Box::into_raw(Box::new(FfiHttpRequest {
            method: req.method.into(),
            path,
            headers,
            headers_len,
            body,
        }))
    }
}

// ---------------------------------------------------------------------------
// Response input (caller-provided, not heap-allocated by us)
// ---------------------------------------------------------------------------

/// An HTTP response described as C-compatible plain data.
///
/// The C caller constructs this on the stack after executing an HTTP request,
/// then passes a pointer to a `discount_parse_*` function. The FFI layer reads
/// but does not free these fields. `retry_after` is the `Retry-After` header
/// value or null.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub body: *const c_char,
    pub retry_after: *const c_char,
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Error codes returned in `FfiDiscountResult`.
#[repr(C)]
#[derive(Debug)]
pub enum FfiErrorCode {
    Ok = 0,
    NotFound = 1,
    Http = 2,
    Deserialization = 3,
    Serialization = 4,
    Panic = 5,
    NullArg = 6,
    Validation = 7,
    RateLimited = 8,
    Config = 9,
}

/// Tag that tells `discount_free_result` what `FfiDiscountResult::data`
/// points to.
#[repr(C)]
#[derive(Debug)]
pub enum FfiDataTag {
    None = 0,
    DiscountCode = 1,
    DiscountCodeList = 2,
}

/// A single discount code exposed to C. Timestamps are RFC 3339 strings or
/// null when the shop omitted them.
#[repr(C)]
pub struct FfiDiscountCode {
    pub id: u64,
    pub price_rule_id: u64,
    pub code: *mut c_char,
    pub usage_count: u64,
    pub created_at: *mut c_char,
    pub updated_at: *mut c_char,
}

impl FfiDiscountCode {
    fn from_core(code: DiscountCode) -> Self {
        FfiDiscountCode {
            id: code.id,
            price_rule_id: code.price_rule_id,
            code: c_string(code.code),
            usage_count: code.usage_count,
            created_at: timestamp(code.created_at),
            updated_at: timestamp(code.updated_at),
        }
    }
}

fn timestamp(at: Option<OffsetDateTime>) -> *mut c_char {
    at.and_then(|t| t.format(&Rfc3339).ok())
        .map_or(std::ptr::null_mut(), c_string)
}

/// A list of discount codes exposed to C.
#[repr(C)]
pub struct FfiDiscountCodeList {
    pub items: *mut FfiDiscountCode,
    pub len: u32,
}

/// Result envelope for all parse operations.
///
/// On success `error_code` is `Ok`, `error_message` is null, and `data`
/// points to the parsed payload (tagged by `data_tag`).
/// On failure `error_code` describes the category, `error_message` is a
/// human-readable C string, and `data` is null. For `RateLimited`,
/// `retry_after_secs` is the server hint or -1.
#[repr(C)]
pub struct FfiDiscountResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub http_status: u16,
    pub retry_after_secs: i64,
    pub data_tag: FfiDataTag,
    pub data: *mut std::ffi::c_void,
}

impl FfiDiscountResult {
    fn boxed(
        error_code: FfiErrorCode,
        error_message: *mut c_char,
        http_status: u16,
        data_tag: FfiDataTag,
        data: *mut std::ffi::c_void,
    ) -> *mut Self {
        Box::into_raw(Box::new(FfiDiscountResult {
            error_code,
            error_message,
            http_status,
            retry_after_secs: -1,
            data_tag,
            data,
        }))
    }

    /// Build a success result carrying a single `FfiDiscountCode`.
    pub(crate) fn ok_code(code: DiscountCode) -> *mut Self {
        let data = Box::into_raw(Box::new(FfiDiscountCode::from_core(code)));
        Self::boxed(
            FfiErrorCode::Ok,
            std::ptr::null_mut(),
            0,
            FfiDataTag::DiscountCode,
            data as *mut std::ffi::c_void,
        )
    }

    /// Build a success result carrying a `FfiDiscountCodeList`.
    pub(crate) fn ok_code_list(codes: Vec<DiscountCode>) -> *mut Self {
        let len = codes.len() as u32;
        let items = if codes.is_empty() {
            std::ptr::null_mut()
        } else {
            let items: Box<[FfiDiscountCode]> =
                codes.into_iter().map(FfiDiscountCode::from_core).collect();
            Box::into_raw(items) as *mut FfiDiscountCode
        };

        let list = Box::into_raw(Box::new(FfiDiscountCodeList { items, len }));
        Self::boxed(
            FfiErrorCode::Ok,
            std::ptr::null_mut(),
            0,
            FfiDataTag::DiscountCodeList,
            list as *mut std::ffi::c_void,
        )
    }

    /// Build a success result with no data payload (e.g. delete).
    pub(crate) fn ok_empty() -> *mut Self {
        Self::boxed(
            FfiErrorCode::Ok,
            std::ptr::null_mut(),
            0,
            FfiDataTag::None,
            std::ptr::null_mut(),
        )
    }

    /// Build an error result from an `ApiError`.
    pub(crate) fn from_error(err: ApiError) -> *mut Self {
        let msg = c_string(err.to_string());
        let (error_code, http_status) = match &err {
            ApiError::NotFound => (FfiErrorCode::NotFound, 404u16),
            ApiError::Validation { .. } => (FfiErrorCode::Validation, 422),
            ApiError::RateLimited { .. } => (FfiErrorCode::RateLimited, 429),
            ApiError::HttpError { status, .. } => (FfiErrorCode::Http, *status),
            ApiError::DeserializationError(_) => (FfiErrorCode::Deserialization, 0),
            ApiError::SerializationError(_) => (FfiErrorCode::Serialization, 0),
            ApiError::Config(_) => (FfiErrorCode::Config, 0),
        };

        let retry_after_secs = match err {
            ApiError::RateLimited {
                retry_after: Some(secs),
            } => i64::try_from(secs).unwrap_or(i64::MAX),
            _ => -1,
        };
        Box::into_raw(Box::new(FfiDiscountResult {
            error_code,
            error_message: msg,
            http_status,
            retry_after_secs,
            data_tag: FfiDataTag::None,
            data: std::ptr::null_mut(),
        }))
    }

    /// Build an error result for a null argument.
    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::boxed(
            FfiErrorCode::NullArg,
            c_string(format!("null argument: {name}")),
            0,
            FfiDataTag::None,
            std::ptr::null_mut(),
        )
    }

    /// Build an error result for a caught panic.
    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::boxed(
            FfiErrorCode::Panic,
            c_string(msg),
            0,
            FfiDataTag::None,
            std::ptr::null_mut(),
        )
    }
}

/// Free the C-string fields of an `FfiDiscountCode` (but not the struct itself).
pub(crate) fn free_code_fields(code: &FfiDiscountCode) {
    for field in [code.code, code.created_at, code.updated_at] {
        if !field.is_null() {
            drop(unsafe { CString::from_raw(field) });
        }
    }
}
