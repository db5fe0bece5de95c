mod common;

use axum::http::{Method, StatusCode};
use common::{empty_request, json_request, multipart_request, TestApp};
use serde_json::{json, Value};

async fn create_recipe(app: &TestApp, token: &str, payload: Value) -> Value {
    let (status, body) = app
        .send(json_request(
            Method::POST,
            "/api/recipe/recipes/",
            Some(token),
            payload,
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED, "body: {body}");
    body
}

fn tag_names(value: &Value) -> Vec<&str> {
    value
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["name"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn recipes_require_authentication() {
    let app = TestApp::new();
    let (status, _) = app
        .send(empty_request(Method::GET, "/api/recipe/recipes/", None))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn create_recipe_returns_detail_with_nested_tags() {
    let app = TestApp::new();
    let token = app.signup("user@example.com").await;

    let body = create_recipe(
        &app,
        &token,
        json!({
            "title": "Thai Prawn Curry",
            "time_minutes": 30,
            "price": "2.50",
            "tags": [{"name": "Thai"}, {"name": "Dinner"}],
            "ingredients": [{"name": "Prawns"}],
        }),
    )
    .await;

    assert_eq!(body["title"], "Thai Prawn Curry");
    assert_eq!(body["price"], "2.50");
    assert_eq!(body["description"], "");
    assert_eq!(body["link"], "");
    assert_eq!(body["image"], Value::Null);
    assert_eq!(tag_names(&body["tags"]), vec!["Dinner", "Thai"]);
    assert_eq!(tag_names(&body["ingredients"]), vec!["Prawns"]);
}

#[tokio::test]
async fn list_is_newest_first_and_limited_to_caller() {
    let app = TestApp::new();
    let token = app.signup("user@example.com").await;
    let other = app.signup("other@example.com").await;

    let first = create_recipe(
        &app,
        &token,
        json!({"title": "First", "time_minutes": 5, "price": 1}),
    )
    .await;
    let second = create_recipe(
        &app,
        &token,
        json!({"title": "Second", "time_minutes": 5, "price": "1.00"}),
    )
    .await;
    create_recipe(
        &app,
        &other,
        json!({"title": "Foreign", "time_minutes": 5, "price": "1.00"}),
    )
    .await;

    let (status, body) = app
        .send(empty_request(Method::GET, "/api/recipe/recipes/", Some(&token)))
        .await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&Value> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|recipe| &recipe["id"])
        .collect();
    assert_eq!(ids, vec![&second["id"], &first["id"]]);
    assert!(body[0].get("description").is_none());

    let uri = format!("/api/recipe/recipes/{}/", first["id"]);
    let (status, _) = app
        .send(empty_request(Method::GET, &uri, Some(&other)))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_filters_by_tag_ids() {
    let app = TestApp::new();
    let token = app.signup("user@example.com").await;

    let vegan = create_recipe(
        &app,
        &token,
        json!({"title": "Curry", "time_minutes": 5, "price": "1.00", "tags": [{"name": "Vegan"}]}),
    )
    .await;
    create_recipe(
        &app,
        &token,
        json!({"title": "Steak", "time_minutes": 5, "price": "1.00"}),
    )
    .await;

    let uri = format!("/api/recipe/recipes/?tags={}", vegan["tags"][0]["id"]);
    let (status, body) = app
        .send(empty_request(Method::GET, &uri, Some(&token)))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["title"], "Curry");

    let (status, body) = app
        .send(empty_request(
            Method::GET,
            "/api/recipe/recipes/?tags=1,abc",
            Some(&token),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["tags"].is_array());
}

#[tokio::test]
async fn patch_replaces_or_keeps_tags() {
    let app = TestApp::new();
    let token = app.signup("user@example.com").await;
    let recipe = create_recipe(
        &app,
        &token,
        json!({
            "title": "Porridge",
            "time_minutes": 5,
            "price": "1.00",
            "tags": [{"name": "Breakfast"}],
        }),
    )
    .await;
    let uri = format!("/api/recipe/recipes/{}/", recipe["id"]);

    let (status, body) = app
        .send(json_request(
            Method::PATCH,
            &uri,
            Some(&token),
            json!({"title": "Oats"}),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Oats");
    assert_eq!(tag_names(&body["tags"]), vec!["Breakfast"]);

    let (status, body) = app
        .send(json_request(
            Method::PATCH,
            &uri,
            Some(&token),
            json!({"tags": [{"name": "Lunch"}]}),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(tag_names(&body["tags"]), vec!["Lunch"]);

    let (status, body) = app
        .send(json_request(Method::PATCH, &uri, Some(&token), json!({"tags": []})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["tags"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn null_fields_are_rejected_and_leave_recipe_unchanged() {
    let app = TestApp::new();
    let token = app.signup("user@example.com").await;
    let recipe = create_recipe(
        &app,
        &token,
        json!({
            "title": "Soup",
            "time_minutes": 10,
            "price": "1.00",
            "tags": [{"name": "A"}],
        }),
    )
    .await;
    let uri = format!("/api/recipe/recipes/{}/", recipe["id"]);

    let (status, body) = app
        .send(json_request(
            Method::PATCH,
            &uri,
            Some(&token),
            json!({"title": null, "price": null}),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["title"], json!(["This field may not be null."]));

    let (status, body) = app
        .send(json_request(Method::PATCH, &uri, Some(&token), json!({"price": null})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["price"], json!(["This field may not be null."]));

    let (status, body) = app
        .send(json_request(
            Method::PUT,
            &uri,
            Some(&token),
            json!({"title": "Soup", "time_minutes": 10, "price": "1.00", "tags": null}),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["tags"], json!(["This field may not be null."]));

    let (status, body) = app.send(empty_request(Method::GET, &uri, Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Soup");
    assert_eq!(body["price"], "1.00");
    assert_eq!(tag_names(&body["tags"]), vec!["A"]);
}

#[tokio::test]
async fn put_requires_core_fields_and_delete_removes() {
    let app = TestApp::new();
    let token = app.signup("user@example.com").await;
    let recipe = create_recipe(
        &app,
        &token,
        json!({"title": "Pie", "time_minutes": 5, "price": "1.00"}),
    )
    .await;
    let uri = format!("/api/recipe/recipes/{}/", recipe["id"]);

    let (status, body) = app
        .send(json_request(Method::PUT, &uri, Some(&token), json!({"title": "Tart"})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["time_minutes"].is_array());

    let (status, body) = app
        .send(json_request(
            Method::PUT,
            &uri,
            Some(&token),
            json!({"title": "Tart", "time_minutes": 12, "price": "3.75", "link": "https://example.com"}),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["price"], "3.75");
    assert_eq!(body["link"], "https://example.com");

    let (status, _) = app
        .send(empty_request(Method::DELETE, &uri, Some(&token)))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app.send(empty_request(Method::GET, &uri, Some(&token))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_recipe_input_is_rejected() {
    let app = TestApp::new();
    let token = app.signup("user@example.com").await;

    let (status, body) = app
        .send(json_request(
            Method::POST,
            "/api/recipe/recipes/",
            Some(&token),
            json!({"title": "  ", "time_minutes": 5, "price": "1.00"}),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["title"].is_array());

    let (status, _) = app
        .send(json_request(
            Method::POST,
            "/api/recipe/recipes/",
            Some(&token),
            json!({"title": "Pricey", "time_minutes": 5, "price": "1000.00"}),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn upload_image_stores_file_and_serves_it() {
    let app = TestApp::new();
    let token = app.signup("user@example.com").await;
    let recipe = create_recipe(
        &app,
        &token,
        json!({"title": "Pie", "time_minutes": 5, "price": "1.00"}),
    )
    .await;
    let uri = format!("/api/recipe/recipes/{}/upload-image/", recipe["id"]);

    let (status, body) = app
        .send(multipart_request(&uri, &token, "image", "pie.png", b"png-bytes"))
        .await;
    assert_eq!(status, StatusCode::OK, "body: {body}");
    assert_eq!(body["id"], recipe["id"]);
    let image_url = body["image"].as_str().unwrap().to_string();
    assert!(image_url.starts_with("/media/uploads/recipe/"));
    assert!(image_url.ends_with(".png"));

    let relative = image_url.trim_start_matches("/media/");
    assert!(app.media_dir.path().join(relative).exists());

    let (status, bytes) = app
        .send_raw(empty_request(Method::GET, &image_url, None))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bytes, b"png-bytes");
}

#[tokio::test]
async fn upload_image_bad_request() {
    let app = TestApp::new();
    let token = app.signup("user@example.com").await;
    let recipe = create_recipe(
        &app,
        &token,
        json!({"title": "Pie", "time_minutes": 5, "price": "1.00"}),
    )
    .await;
    let uri = format!("/api/recipe/recipes/{}/upload-image/", recipe["id"]);

    let (status, body) = app
        .send(multipart_request(&uri, &token, "image", "notimage.txt", b"text"))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["image"].is_array());

    let (status, body) = app
        .send(multipart_request(&uri, &token, "other", "pie.png", b"png"))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["image"].is_array());
}

#[tokio::test]
async fn oversized_upload_is_payload_too_large() {
    let app = TestApp::with_max_upload_bytes(1024);
    let token = app.signup("user@example.com").await;
    let recipe = create_recipe(
        &app,
        &token,
        json!({"title": "Pie", "time_minutes": 5, "price": "1.00"}),
    )
    .await;
    let uri = format!("/api/recipe/recipes/{}/upload-image/", recipe["id"]);

    let (status, _) = app
        .send(multipart_request(&uri, &token, "image", "big.png", &[7u8; 4096]))
        .await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);

    let detail = format!("/api/recipe/recipes/{}/", recipe["id"]);
    let (_, body) = app
        .send(empty_request(Method::GET, &detail, Some(&token)))
        .await;
    assert!(body["image"].is_null());
}
