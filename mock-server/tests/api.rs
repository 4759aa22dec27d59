use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_shop::{app, DiscountCode, Many, Single, MOCK_API_VERSION};
use tower::ServiceExt;

const COLLECTION: &str = "/admin/price_rules/507328175/discount_codes.json";

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(String::new())
        .unwrap()
}

// --- list ---

#[tokio::test]
async fn list_codes_empty() {
    let resp = app().oneshot(empty_request("GET", COLLECTION)).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let codes: Many<DiscountCode> = body_json(resp).await;
    assert!(codes.discount_codes.is_empty());
}

#[tokio::test]
async fn versioned_prefix_is_served() {
    let uri = format!("/admin/api/{MOCK_API_VERSION}/price_rules/1/discount_codes.json");
    let resp = app().oneshot(empty_request("GET", &uri)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn non_numeric_price_rule_returns_400() {
    let resp = app()
        .oneshot(empty_request("GET", "/admin/price_rules/abc/discount_codes.json"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- create ---

#[tokio::test]
async fn create_code_returns_201() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            COLLECTION,
            r#"{"discount_code":{"code":"SUMMERSALE10OFF"}}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Single<DiscountCode> = body_json(resp).await;
    assert_eq!(created.discount_code.id, 1054381139);
    assert_eq!(created.discount_code.price_rule_id, 507328175);
    assert_eq!(created.discount_code.code, "SUMMERSALE10OFF");
    assert_eq!(created.discount_code.usage_count, 0);
}

#[tokio::test]
async fn create_blank_code_returns_422() {
    let resp = app()
        .oneshot(json_request("POST", COLLECTION, r#"{"discount_code":{"code":""}}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body["errors"]["code"][0], "can't be blank");
}

#[tokio::test]
async fn create_without_envelope_returns_422() {
    let resp = app()
        .oneshot(json_request("POST", COLLECTION, r#"{"code":"SUMMERSALE10OFF"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: serde_json::Value = body_json(resp).await;
    assert!(body["errors"]["discount_code"][0].is_string());
}

#[tokio::test]
async fn create_with_empty_envelope_returns_shopify_errors() {
    let resp = app()
        .oneshot(json_request("POST", COLLECTION, r#"{"discount_code":{}}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: serde_json::Value = body_json(resp).await;
    assert!(body["errors"]["discount_code"][0].is_string());
}

#[tokio::test]
async fn create_with_broken_json_returns_shopify_errors() {
    let resp = app()
        .oneshot(json_request("POST", COLLECTION, "{not json"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = body_json(resp).await;
    assert!(body["errors"]["discount_code"][0].is_string());
}

// --- get ---

#[tokio::test]
async fn get_code_not_found() {
    let resp = app()
        .oneshot(empty_request(
            "GET",
            "/admin/price_rules/507328175/discount_codes/1.json",
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body["errors"], "Not Found");
}

#[tokio::test]
async fn get_code_without_json_suffix_not_found() {
    let resp = app()
        .oneshot(empty_request(
            "GET",
            "/admin/price_rules/507328175/discount_codes/1",
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- update ---

#[tokio::test]
async fn update_code_not_found() {
    let resp = app()
        .oneshot(json_request(
            "PUT",
            "/admin/price_rules/507328175/discount_codes/1.json",
            r#"{"discount_code":{"id":1,"code":"NOPE"}}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_with_wrong_field_type_returns_shopify_errors() {
    let resp = app()
        .oneshot(json_request(
            "PUT",
            "/admin/price_rules/507328175/discount_codes/1.json",
            r#"{"discount_code":{"code":42}}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: serde_json::Value = body_json(resp).await;
    assert!(body["errors"]["discount_code"][0].is_string());
}

// --- delete ---

#[tokio::test]
async fn delete_code_not_found() {
    let resp = app()
        .oneshot(empty_request(
            "DELETE",
            "/admin/price_rules/507328175/discount_codes/1.json",
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- full CRUD lifecycle ---

#[tokio::test]
async fn crud_lifecycle() {
    use tower::Service;

    let mut app = app().into_service();

    // create
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            COLLECTION,
            r#"{"discount_code":{"code":"SUMMERSALE10OFF"}}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Single<DiscountCode> = body_json(resp).await;
    let id = created.discount_code.id;
    let member = format!("/admin/price_rules/507328175/discount_codes/{id}.json");

    // duplicate code under the same price rule is rejected
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            COLLECTION,
            r#"{"discount_code":{"code":"SUMMERSALE10OFF"}}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // list: one code
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("GET", COLLECTION))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let codes: Many<DiscountCode> = body_json(resp).await;
    assert_eq!(codes.discount_codes.len(), 1);
    assert_eq!(codes.discount_codes[0].id, id);

    // other price rules do not see it
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request(
            "GET",
            &format!("/admin/price_rules/1/discount_codes/{id}.json"),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // get
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("GET", &member))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let fetched: Single<DiscountCode> = body_json(resp).await;
    assert_eq!(fetched.discount_code.code, "SUMMERSALE10OFF");

    // update: id stays, code changes
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "PUT",
            &member,
            &format!(r#"{{"discount_code":{{"id":{id},"code":"WINTERSALE20OFF"}}}}"#),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Single<DiscountCode> = body_json(resp).await;
    assert_eq!(updated.discount_code.id, id);
    assert_eq!(updated.discount_code.code, "WINTERSALE20OFF");

    // update with a mismatched body id is rejected
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "PUT",
            &member,
            r#"{"discount_code":{"id":1,"code":"X"}}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // delete
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("DELETE", &member))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    let body = body_bytes(resp).await;
    assert!(body.is_empty());

    // get after delete: 404
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("GET", &member))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // list after delete: empty
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("GET", COLLECTION))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let codes: Many<DiscountCode> = body_json(resp).await;
    assert!(codes.discount_codes.is_empty());
}
