use super::*;
use test_log::test;

#[test(sqlx::test(migrations = "../db/migrations/"))]
async fn test_list_empty(pool: Pool<Sqlite>) {
    let mut app = test_app(pool).await.expect("failed to create test app");
    let response = send(&mut app, empty_request(Method::GET, "/api/locations/")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({"type": "FeatureCollection", "features": []})
    );
}

#[test(sqlx::test(
    migrations = "../db/migrations/",
    fixtures(path = "../../../../db/fixtures", scripts("locations"))
))]
async fn test_list_locations(pool: Pool<Sqlite>) {
    let mut app = test_app(pool).await.expect("failed to create test app");
    let response = send(&mut app, empty_request(Method::GET, "/api/locations/")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["type"], "FeatureCollection");
    let features = body["features"].as_array().expect("features is not an array");
    assert_eq!(
        features.iter().map(|f| f["id"].clone()).collect::<Vec<_>>(),
        vec![json!(1), json!(2), json!(3), json!(4)]
    );
    assert_eq!(features[0]["type"], "Feature");
    assert_coordinates(&features[0]["geometry"], [-73.968285, 40.785091]);
    assert_eq!(
        features[0]["properties"],
        json!({"name": "Central Park", "category": "park"})
    );
    assert_eq!(features[3]["properties"]["category"], Value::Null);
}

#[test(sqlx::test(
    migrations = "../db/migrations/",
    fixtures(path = "../../../../db/fixtures", scripts("locations"))
))]
async fn test_list_by_category(pool: Pool<Sqlite>) {
    let mut app = test_app(pool).await.expect("failed to create test app");
    let response = send(
        &mut app,
        empty_request(Method::GET, "/api/locations/?category=park"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let features = body["features"].as_array().expect("features is not an array");
    assert_eq!(features.len(), 2);
    assert!(
        features
            .iter()
            .all(|f| f["properties"]["category"] == "park")
    );
}

#[test(sqlx::test(
    migrations = "../db/migrations/",
    fixtures(path = "../../../../db/fixtures", scripts("locations"))
))]
async fn test_list_geojson_alias(pool: Pool<Sqlite>) {
    let mut app = test_app(pool).await.expect("failed to create test app");
    let response = send(&mut app, empty_request(Method::GET, "/api/locations/")).await;
    let listed = body_json(response).await;

    let response = send(&mut app, empty_request(Method::GET, "/api/locations/geojson/")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let aliased = body_json(response).await;
    assert_eq!(aliased["type"], "FeatureCollection");
    assert_eq!(aliased["features"].as_array().map(Vec::len), Some(4));
    assert_eq!(aliased, listed);
}

#[test(sqlx::test(migrations = "../db/migrations/"))]
async fn test_list_rejects_bad_query(pool: Pool<Sqlite>) {
    let mut app = test_app(pool).await.expect("failed to create test app");
    let uri = "/api/locations/?category=a&category=b";
    let response = send(&mut app, empty_request(Method::GET, uri)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response.headers()[CONTENT_TYPE], "application/json");
    let err = body_json(response).await;
    assert!(err["error"].is_string());
}

#[test(sqlx::test(migrations = "../db/migrations/"))]
async fn test_create_from_feature(pool: Pool<Sqlite>) {
    let mut app = test_app(pool).await.expect("failed to create test app");
    let input = json!({
        "type": "Feature",
        "geometry": {"type": "Point", "coordinates": [2.2945, 48.8584]},
        "properties": {"name": "Eiffel Tower", "category": "landmark"}
    });
    let response = send(&mut app, json_request(Method::POST, "/api/locations/", &input)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    assert_eq!(created["geometry"], input["geometry"]);
    assert_eq!(created["properties"], input["properties"]);
    let id = created["id"].as_i64().expect("id is not an integer");

    let response = send(
        &mut app,
        empty_request(Method::GET, &format!("/api/locations/{id}/")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, created);
}

#[test(sqlx::test(migrations = "../db/migrations/"))]
async fn test_create_from_flat_body(pool: Pool<Sqlite>) {
    let mut app = test_app(pool).await.expect("failed to create test app");
    let input = json!({"name": "Cafe", "latitude": 10.5, "longitude": -20.25});
    let response = send(&mut app, json_request(Method::POST, "/api/locations/", &input)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    assert_eq!(created["type"], "Feature");
    assert_eq!(created["geometry"]["coordinates"], json!([-20.25, 10.5]));
    assert_eq!(created["properties"], json!({"name": "Cafe", "category": ""}));
}

#[test(sqlx::test(migrations = "../db/migrations/"))]
async fn test_create_invalid(pool: Pool<Sqlite>) {
    let mut app = test_app(pool).await.expect("failed to create test app");

    async fn check_bad_request(app: &mut Router, body: Value, expected_field: &str) {
        let response = send(app, json_request(Method::POST, "/api/locations/", &body)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{body}");
        let err = body_json(response).await;
        let msg = err["error"].as_str().expect("error message is not a string");
        assert!(msg.contains(expected_field), "'{msg}' should mention '{expected_field}'");
    }

    check_bad_request(
        &mut app,
        json!({"name": "x", "longitude": 1.0}),
        "latitude",
    )
    .await;
    check_bad_request(
        &mut app,
        json!({"name": "x", "latitude": "abc", "longitude": 1.0}),
        "latitude",
    )
    .await;
    check_bad_request(
        &mut app,
        json!({"properties": {"name": "x"}}),
        "geometry",
    )
    .await;
    check_bad_request(
        &mut app,
        json!({"properties": {"name": "x"}, "geometry": {"type": "Point"}}),
        "coordinates",
    )
    .await;
    check_bad_request(&mut app, json!("just a string"), "object").await;

    // nothing was stored
    let response = send(&mut app, empty_request(Method::GET, "/api/locations/")).await;
    assert_eq!(body_json(response).await["features"], json!([]));
}

#[test(sqlx::test(migrations = "../db/migrations/"))]
async fn test_create_unparseable_body(pool: Pool<Sqlite>) {
    let mut app = test_app(pool).await.expect("failed to create test app");
    let req = Request::builder()
        .uri("/api/locations/")
        .method(Method::POST)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .expect("Failed to build request");
    let response = send(&mut app, req).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let err = body_json(response).await;
    assert!(err["error"].is_string());
}

#[test(sqlx::test(
    migrations = "../db/migrations/",
    fixtures(path = "../../../../db/fixtures", scripts("locations"))
))]
async fn test_show_location(pool: Pool<Sqlite>) {
    let mut app = test_app(pool).await.expect("failed to create test app");
    let response = send(&mut app, empty_request(Method::GET, "/api/locations/3/")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["id"], 3);
    assert_eq!(body["properties"]["name"], "Blue Bottle");
    assert_coordinates(&body["geometry"], [-73.998, 40.722]);

    let response = send(&mut app, empty_request(Method::GET, "/api/locations/99/")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_json(response).await["error"].is_string());

    let response = send(&mut app, empty_request(Method::GET, "/api/locations/abc/")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[test(sqlx::test(
    migrations = "../db/migrations/",
    fixtures(path = "../../../../db/fixtures", scripts("locations"))
))]
async fn test_replace_location(pool: Pool<Sqlite>) {
    let mut app = test_app(pool).await.expect("failed to create test app");
    let input = json!({"name": "Renamed", "category": "garden", "latitude": 1.0, "longitude": 2.0});
    let response = send(&mut app, json_request(Method::PUT, "/api/locations/1/", &input)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(
        body,
        json!({
            "type": "Feature",
            "geometry": {"type": "Point", "coordinates": [2.0, 1.0]},
            "properties": {"name": "Renamed", "category": "garden"},
            "id": 1
        })
    );

    let response = send(&mut app, empty_request(Method::GET, "/api/locations/1/")).await;
    assert_eq!(body_json(response).await, body);

    // a full replacement needs both coordinates
    let response = send(
        &mut app,
        json_request(Method::PUT, "/api/locations/1/", &json!({"name": "x"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = send(&mut app, json_request(Method::PUT, "/api/locations/99/", &input)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[test(sqlx::test(
    migrations = "../db/migrations/",
    fixtures(path = "../../../../db/fixtures", scripts("locations"))
))]
async fn test_modify_location(pool: Pool<Sqlite>) {
    let mut app = test_app(pool).await.expect("failed to create test app");
    let response = send(
        &mut app,
        json_request(Method::PATCH, "/api/locations/2/", &json!({"category": null})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["properties"], json!({"name": "Prospect Park", "category": null}));
    assert_coordinates(&body["geometry"], [-73.968956, 40.660204]);

    let response = send(
        &mut app,
        json_request(
            Method::PATCH,
            "/api/locations/2/",
            &json!({
                "properties": {"name": "Moved"},
                "geometry": {"type": "Point", "coordinates": [5, 6]}
            }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["properties"]["name"], "Moved");
    assert_eq!(body["geometry"]["coordinates"], json!([5.0, 6.0]));

    let response = send(
        &mut app,
        json_request(Method::PATCH, "/api/locations/2/", &json!({"longitude": "west"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = send(
        &mut app,
        json_request(Method::PATCH, "/api/locations/99/", &json!({"name": "x"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[test(sqlx::test(
    migrations = "../db/migrations/",
    fixtures(path = "../../../../db/fixtures", scripts("locations"))
))]
async fn test_delete_location(pool: Pool<Sqlite>) {
    let mut app = test_app(pool).await.expect("failed to create test app");
    let response = send(&mut app, empty_request(Method::DELETE, "/api/locations/4/")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = send(&mut app, empty_request(Method::GET, "/api/locations/4/")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // deleting again is not a silent success
    let response = send(&mut app, empty_request(Method::DELETE, "/api/locations/4/")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
