use crate::{test_app, test_app_with_cors};
use axum::{
    Router,
    body::Body,
    http::{Method, Request, Response, StatusCode, header::CONTENT_TYPE},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use sqlx::{Pool, Sqlite};
use test_log::test;
use tower::Service;

mod location;

fn json_request(method: Method, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method(method)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("Failed to build request")
}

fn empty_request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method(method)
        .body(Body::empty())
        .expect("Failed to build request")
}

async fn send(app: &mut Router, req: Request<Body>) -> Response<Body> {
    app.as_service()
        .call(req)
        .await
        .expect("Failed to execute request")
}

/// consumes the response and parses its body as json
async fn body_json(response: Response<Body>) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to collect body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("Response body is not json")
}

/// compares a point's coordinates, allowing for float parsing differences in
/// the sql fixtures
fn assert_coordinates(geometry: &Value, expected: [f64; 2]) {
    assert_eq!(geometry["type"], "Point");
    let coords = geometry["coordinates"].as_array().expect("coordinates is not an array");
    assert_eq!(coords.len(), 2);
    for (actual, expected) in coords.iter().zip(expected) {
        let actual = actual.as_f64().expect("coordinate is not a number");
        assert!((actual - expected).abs() < 1e-9, "{actual} != {expected}");
    }
}

#[test(sqlx::test(migrations = "../db/migrations/"))]
async fn test_root_redirects(pool: Pool<Sqlite>) {
    let mut app = test_app(pool).await.expect("failed to create test app");
    let response = send(&mut app, empty_request(Method::GET, "/")).await;
    assert_eq!(response.status(), StatusCode::PERMANENT_REDIRECT);
    assert_eq!(response.headers()["location"], "/api/locations/");
}

#[test(sqlx::test(migrations = "../db/migrations/"))]
async fn test_request_id_is_propagated(pool: Pool<Sqlite>) {
    let mut app = test_app(pool).await.expect("failed to create test app");
    let response = send(&mut app, empty_request(Method::GET, "/api/locations/")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
}

#[test(sqlx::test(migrations = "../db/migrations/"))]
async fn test_cors_preflight(pool: Pool<Sqlite>) {
    let origin = "http://localhost:5173";
    let mut app = test_app_with_cors(pool, &[origin.to_string()])
        .await
        .expect("failed to create test app");
    let req = Request::builder()
        .uri("/api/locations/")
        .method(Method::OPTIONS)
        .header("origin", origin)
        .header("access-control-request-method", "POST")
        .body(Body::empty())
        .expect("Failed to build request");
    let response = send(&mut app, req).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["access-control-allow-origin"], origin);
    assert_eq!(response.headers()["access-control-allow-credentials"], "true");
}

#[test(sqlx::test(migrations = "../db/migrations/"))]
async fn test_invalid_cors_origin(pool: Pool<Sqlite>) {
    assert!(
        test_app_with_cors(pool, &["not a\nheader".to_string()])
            .await
            .is_err()
    );
}
