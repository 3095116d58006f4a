mod common;

use axum::http::StatusCode;
use common::{app, create, send};
use serde_json::json;

#[tokio::test]
async fn test_create_and_get_category() {
    let app = app();
    let id = create(&app, json!({ "name": "  Tools  ", "description": "Hand tools" })).await;

    let (status, body) = send(&app, "GET", &format!("/api/categories/{id}"), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["name"], "Tools");
    assert_eq!(body["data"]["isActive"], true);
    assert!(body["data"]["parentCategory"].is_null());
    assert!(body["data"]["createdAt"].is_string());
}

#[tokio::test]
async fn test_create_embeds_parent() {
    let app = app();
    let home = create(&app, json!({ "name": "Home", "description": "Everything home" })).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/categories",
        Some(json!({ "name": "Kitchen", "parentCategory": home })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    let parent = &body["data"]["parentCategory"];
    assert_eq!(parent["_id"], home.as_str());
    assert_eq!(parent["name"], "Home");
    assert_eq!(parent["description"], "Everything home");
    assert!(parent["createdAt"].is_string());
}

#[tokio::test]
async fn test_duplicate_name_is_rejected() {
    let app = app();
    create(&app, json!({ "name": "Tools" })).await;

    let (status, body) = send(&app, "POST", "/api/categories", Some(json!({ "name": "Tools" }))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["status"], "fail");
    assert_eq!(
        body["message"],
        "The value 'Tools' already exists for field 'name'. Please use another value."
    );
}

#[tokio::test]
async fn test_validation_reports_every_field() {
    let app = app();

    let (status, body) = send(
        &app,
        "POST",
        "/api/categories",
        Some(json!({ "name": "X", "parentCategory": "123" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Validation failed");
    let fields: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|error| error["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["name", "parentCategory"]);
    assert_eq!(
        body["errors"][0]["message"],
        "Category name must be between 2 and 50 characters"
    );
}

#[tokio::test]
async fn test_update_merges_fields() {
    let app = app();
    let id = create(&app, json!({ "name": "Tools", "description": "Old" })).await;

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/categories/{id}"),
        Some(json!({ "description": "Hand and power tools" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Tools");
    assert_eq!(body["data"]["description"], "Hand and power tools");
}

#[tokio::test]
async fn test_update_to_used_name_is_duplicate() {
    let app = app();
    create(&app, json!({ "name": "Garden" })).await;
    let id = create(&app, json!({ "name": "Tools" })).await;

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/categories/{id}"),
        Some(json!({ "name": "Garden" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "The value 'Garden' already exists for field 'name'. Please use another value."
    );

    let (_, body) = send(&app, "GET", &format!("/api/categories/{id}"), None).await;
    assert_eq!(body["data"]["name"], "Tools");
}

#[tokio::test]
async fn test_logical_delete_keeps_record() {
    let app = app();
    let id = create(&app, json!({ "name": "Seasonal" })).await;

    let (status, body) = send(
        &app,
        "DELETE",
        &format!("/api/categories/{id}?logical=true"),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Category deactivated");
    assert_eq!(body["data"]["isActive"], false);

    let (status, body) = send(&app, "GET", &format!("/api/categories/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["isActive"], false);
}

#[tokio::test]
async fn test_physical_delete_removes_record() {
    let app = app();
    let id = create(&app, json!({ "name": "Clearance" })).await;

    let (status, body) = send(&app, "DELETE", &format!("/api/categories/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Category deleted successfully");
    assert!(body.get("data").is_none());

    let (status, body) = send(&app, "GET", &format!("/api/categories/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], format!("No category found with id {id}"));
}

#[tokio::test]
async fn test_delete_rejects_unknown_logical_value() {
    let app = app();
    let id = create(&app, json!({ "name": "Clearance" })).await;

    let (status, body) = send(
        &app,
        "DELETE",
        &format!("/api/categories/{id}?logical=maybe"),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["field"], "logical");
}

#[tokio::test]
async fn test_malformed_id_is_rejected() {
    let app = app();

    let (status, body) = send(&app, "GET", "/api/categories/abc", None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid value: _id = abc");
}

#[tokio::test]
async fn test_list_filters_sorts_and_paginates() {
    let app = app();
    let home = create(&app, json!({ "name": "Home", "description": "Everything home" })).await;
    create(&app, json!({ "name": "Kitchen", "parentCategory": home })).await;
    create(&app, json!({ "name": "Garden" })).await;
    create(&app, json!({ "name": "Tools", "isActive": false })).await;

    let (status, body) = send(&app, "GET", "/api/categories?name=E&limit=2", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
    assert_eq!(body["total"], 3);
    assert_eq!(body["page"], 1);
    assert_eq!(body["pages"], 2);
    assert_eq!(body["data"][0]["name"], "Garden");
    assert_eq!(body["data"][1]["name"], "Home");

    let (_, body) = send(&app, "GET", "/api/categories?name=E&limit=2&page=2", None).await;
    assert_eq!(body["count"], 1);
    let kitchen = &body["data"][0];
    assert_eq!(kitchen["name"], "Kitchen");
    assert_eq!(kitchen["parentCategory"]["name"], "Home");
    assert_eq!(kitchen["parentCategory"]["isActive"], true);
    assert!(kitchen["parentCategory"].get("createdAt").is_none());
}

#[tokio::test]
async fn test_list_filters_by_active_flag_and_sorts_desc() {
    let app = app();
    create(&app, json!({ "name": "Garden" })).await;
    create(&app, json!({ "name": "Tools" })).await;
    create(&app, json!({ "name": "Archive", "isActive": false })).await;

    let (status, body) = send(
        &app,
        "GET",
        "/api/categories?isActive=true&sortBy=name&order=desc",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);
    assert_eq!(body["data"][0]["name"], "Tools");
    assert_eq!(body["data"][1]["name"], "Garden");
}

#[tokio::test]
async fn test_list_rejects_bad_parameters() {
    let app = app();

    let (status, body) = send(&app, "GET", "/api/categories?isActive=yes&sortBy=colour", None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"].as_array().unwrap().len(), 2);
}
