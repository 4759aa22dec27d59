//! In-memory imitation of the Shopify discount-code endpoints.
//!
//! Serves the same routes under `/admin` and `/admin/api/{MOCK_API_VERSION}`
//! so clients can be exercised with or without an API version configured.

use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use time::OffsetDateTime;
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info};

pub const MOCK_API_VERSION: &str = "2024-01";

const FIRST_ID: u64 = 1054381139;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DiscountCode {
    pub id: u64,
    pub price_rule_id: u64,
    pub code: String,
    pub usage_count: u64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Deserialize)]
pub struct NewDiscountCode {
    pub code: String,
}

#[derive(Deserialize)]
pub struct DiscountCodeUpdate {
    pub id: Option<u64>,
    pub code: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct Single<T> {
    pub discount_code: T,
}

#[derive(Serialize, Deserialize)]
pub struct Many<T> {
    pub discount_codes: Vec<T>,
}

#[derive(Debug, Default)]
pub struct Shop {
    codes: BTreeMap<u64, DiscountCode>,
    next_id: u64,
}

impl Shop {
    fn allocate_id(&mut self) -> u64 {
        let id = FIRST_ID + self.next_id;
        self.next_id += 1;
        id
    }

    fn find_mut(&mut self, price_rule_id: u64, id: u64) -> Option<&mut DiscountCode> {
        self.codes
            .get_mut(&id)
            .filter(|code| code.price_rule_id == price_rule_id)
    }

    fn code_taken(&self, price_rule_id: u64, code: &str, except: Option<u64>) -> bool {
        self.codes.values().any(|existing| {
            existing.price_rule_id == price_rule_id
                && existing.code == code
                && Some(existing.id) != except
        })
    }
}

pub type Db = Arc<RwLock<Shop>>;

/// Error responses shaped the way Shopify sends them.
pub enum ShopError {
    NotFound,
    Invalid(&'static str, &'static str),
    /// The body did not decode into a `discount_code` envelope.
    Malformed(StatusCode, String),
}

impl From<JsonRejection> for ShopError {
    fn from(rejection: JsonRejection) -> Self {
        ShopError::Malformed(rejection.status(), rejection.body_text())
    }
}

impl IntoResponse for ShopError {
    fn into_response(self) -> Response {
        match &self {
            ShopError::NotFound => debug!("rejected: not found"),
            ShopError::Invalid(field, message) => debug!(field, message, "rejected: invalid"),
            ShopError::Malformed(status, message) => {
                debug!(%status, message = message.as_str(), "rejected: malformed body")
            }
        }
        match self {
            ShopError::NotFound => {
                (StatusCode::NOT_FOUND, Json(json!({"errors": "Not Found"}))).into_response()
            }
            ShopError::Invalid(field, message) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({"errors": {field: [message]}})),
            )
                .into_response(),
            ShopError::Malformed(status, message) => (
                status,
                Json(json!({"errors": {"discount_code": [message]}})),
            )
                .into_response(),
        }
    }
}

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Shop::default()));
    let routes = Router::new()
        .route(
            "/price_rules/{price_rule_id}/discount_codes.json",
            get(list_codes).post(create_code),
        )
        .route(
            "/price_rules/{price_rule_id}/discount_codes/{file}",
            get(get_code).put(update_code).delete(delete_code),
        );
    Router::new()
        .nest("/admin", routes.clone())
        .nest(&format!("/admin/api/{MOCK_API_VERSION}"), routes)
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "mock shop listening");
    }
    axum::serve(listener, app()).await
}

/// `{id}.json` -> `id`. Anything else addresses no resource.
fn member_id(file: &str) -> Result<u64, ShopError> {
    file.strip_suffix(".json")
        .and_then(|id| id.parse().ok())
        .ok_or(ShopError::NotFound)
}

fn validate_code(code: &str) -> Result<(), ShopError> {
    if code.trim().is_empty() {
        return Err(ShopError::Invalid("code", "can't be blank"));
    }
    Ok(())
}

async fn list_codes(
    State(db): State<Db>,
    Path(price_rule_id): Path<u64>,
) -> Json<Many<DiscountCode>> {
    let shop = db.read().await;
    let discount_codes = shop
        .codes
        .values()
        .filter(|code| code.price_rule_id == price_rule_id)
        .cloned()
        .collect::<Vec<_>>();
    debug!(price_rule_id, count = discount_codes.len(), "listed discount codes");
    Json(Many { discount_codes })
}

async fn create_code(
    State(db): State<Db>,
    Path(price_rule_id): Path<u64>,
    input: Result<Json<Single<NewDiscountCode>>, JsonRejection>,
) -> Result<(StatusCode, Json<Single<DiscountCode>>), ShopError> {
    let Json(input) = input?;
    let input = input.discount_code;
    validate_code(&input.code)?;

    let mut shop = db.write().await;
    if shop.code_taken(price_rule_id, &input.code, None) {
        return Err(ShopError::Invalid("code", "must be unique"));
    }
    let now = OffsetDateTime::now_utc();
    let code = DiscountCode {
        id: shop.allocate_id(),
        price_rule_id,
        code: input.code,
        usage_count: 0,
        created_at: now,
        updated_at: now,
    };
    debug!(id = code.id, price_rule_id, "created discount code");
    shop.codes.insert(code.id, code.clone());
    Ok((StatusCode::CREATED, Json(Single { discount_code: code })))
}

async fn get_code(
    State(db): State<Db>,
    Path((price_rule_id, file)): Path<(u64, String)>,
) -> Result<Json<Single<DiscountCode>>, ShopError> {
    let id = member_id(&file)?;
    let shop = db.read().await;
    let discount_code = shop
        .codes
        .get(&id)
        .filter(|code| code.price_rule_id == price_rule_id)
        .cloned()
        .ok_or(ShopError::NotFound)?;
    debug!(id, price_rule_id, "fetched discount code");
    Ok(Json(Single { discount_code }))
}

async fn update_code(
    State(db): State<Db>,
    Path((price_rule_id, file)): Path<(u64, String)>,
    input: Result<Json<Single<DiscountCodeUpdate>>, JsonRejection>,
) -> Result<Json<Single<DiscountCode>>, ShopError> {
    let id = member_id(&file)?;
    let Json(input) = input?;
    let input = input.discount_code;
    if input.id.is_some_and(|body_id| body_id != id) {
        return Err(ShopError::Invalid("id", "does not match the requested resource"));
    }
    if let Some(code) = &input.code {
        validate_code(code)?;
    }

    let mut shop = db.write().await;
    if let Some(code) = &input.code {
        if shop.code_taken(price_rule_id, code, Some(id)) {
            return Err(ShopError::Invalid("code", "must be unique"));
        }
    }
    let existing = shop.find_mut(price_rule_id, id).ok_or(ShopError::NotFound)?;
    if let Some(code) = input.code {
        existing.code = code;
    }
    existing.updated_at = OffsetDateTime::now_utc();
    debug!(id, price_rule_id, "updated discount code");
    Ok(Json(Single {
        discount_code: existing.clone(),
    }))
}

async fn delete_code(
    State(db): State<Db>,
    Path((price_rule_id, file)): Path<(u64, String)>,
) -> Result<StatusCode, ShopError> {
    let id = member_id(&file)?;
    let mut shop = db.write().await;
    shop.find_mut(price_rule_id, id).ok_or(ShopError::NotFound)?;
    shop.codes.remove(&id);
    debug!(id, price_rule_id, "deleted discount code");
    Ok(StatusCode::NO_CONTENT)
}
