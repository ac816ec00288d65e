//! HTTP behaviour of the interaction routes.

mod support;

use axum::http::{Method, StatusCode};
use serde_json::{json, Value};
use support::{app, create_idea, get, json_request, record, send};

async fn idea_id(app: &axum::Router) -> String {
    let idea = create_idea(app, "LocalEats Collective", "alice").await;
    idea["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn record_then_read_back() {
    let app = app();
    let id = idea_id(&app).await;

    let (status, row) = record(&app, "bob", &id, true, Some(8)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(row["swipe"], true);
    assert_eq!(row["rating"], 8);

    let (status, mine) = send(&app, get(&format!("/interactions?ideaId={id}&userId=bob"), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mine["id"], row["id"]);

    let (status, absent) = send(&app, get(&format!("/interactions?ideaId={id}&userId=carol"), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(absent, Value::Null);
}

#[tokio::test]
async fn stats_match_the_worked_example() {
    let app = app();
    let id = idea_id(&app).await;

    record(&app, "a", &id, true, Some(8)).await;
    record(&app, "b", &id, false, Some(6)).await;
    record(&app, "c", &id, true, None).await;

    let (status, stats) = send(&app, get(&format!("/interactions?ideaId={id}"), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["idea_id"], id.as_str());
    assert_eq!(stats["total"], 3);
    assert_eq!(stats["accepted"], 2);
    assert_eq!(stats["would_use_percentage"], 67);
    assert_eq!(stats["mean_rating"], 7.0);
    assert_eq!(stats["interactions"].as_array().map(Vec::len), Some(3));
}

#[tokio::test]
async fn stats_without_ratings_report_null_mean() {
    let app = app();
    let id = idea_id(&app).await;
    record(&app, "a", &id, false, None).await;

    let (_, stats) = send(&app, get(&format!("/interactions?ideaId={id}"), None)).await;
    assert_eq!(stats["total"], 1);
    assert_eq!(stats["would_use_percentage"], 0);
    assert_eq!(stats["mean_rating"], Value::Null);
}

#[tokio::test]
async fn rerating_overwrites_and_unrated_swipe_keeps_rating() {
    let app = app();
    let id = idea_id(&app).await;

    let (_, first) = record(&app, "bob", &id, true, Some(8)).await;
    let (_, second) = record(&app, "bob", &id, false, None).await;
    assert_eq!(first["id"], second["id"]);
    assert_eq!(second["swipe"], false);
    assert_eq!(second["rating"], 8);

    let (_, stats) = send(&app, get(&format!("/interactions?ideaId={id}"), None)).await;
    assert_eq!(stats["total"], 1);
}

#[tokio::test]
async fn record_rejects_bad_input() {
    let app = app();
    let id = idea_id(&app).await;

    let missing = [
        json!({ "idea_id": id, "swipe": true }),
        json!({ "user_id": "bob", "swipe": true }),
        json!({ "user_id": "bob", "idea_id": id }),
        json!({ "user_id": "bob", "idea_id": "nope", "swipe": true }),
        json!({ "user_id": "bob", "idea_id": id, "swipe": true, "rating": 0 }),
        json!({ "user_id": "bob", "idea_id": id, "swipe": true, "rating": 11 }),
        json!({ "user_id": "bob", "idea_id": id, "swipe": "yes" }),
        json!({ "user_id": "bob", "idea_id": id, "swipe": true, "rating": 7.5 }),
        json!({ "user_id": "bob", "idea_id": id, "swipe": true, "rating": "7" }),
    ];
    for body in missing {
        let (status, error) = send(&app, json_request(Method::POST, "/interactions", body.clone(), None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
        assert!(error["error"].as_str().is_some(), "{body}: {error}");
    }

    let (status, _) = record(&app, "bob", &uuid::Uuid::now_v7().to_string(), true, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn stats_require_an_idea_id() {
    let app = app();
    let (status, body) = send(&app, get("/interactions", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap_or_default().contains("ideaId"));

    let (status, _) = send(&app, get("/interactions?ideaId=", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, get("/interactions?ideaId=a&ideaId=b", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().is_some());
}

#[tokio::test]
async fn body_without_json_content_type_is_a_json_400() {
    let app = app();
    let id = idea_id(&app).await;

    let request = axum::http::Request::post("/interactions")
        .body(axum::body::Body::from(
            json!({ "user_id": "bob", "idea_id": id, "swipe": true }).to_string(),
        ))
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().is_some());

    let request = axum::http::Request::post("/interactions")
        .header(axum::http::header::CONTENT_TYPE, "application/json")
        .body(axum::body::Body::from("{not json"))
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().is_some());
}

#[tokio::test]
async fn padded_user_ids_refer_to_the_same_user() {
    let app = app();
    let id = idea_id(&app).await;

    record(&app, "bob ", &id, true, Some(6)).await;

    let (_, feed) = send(&app, get("/ideas?userId=bob", None)).await;
    assert_eq!(feed, json!([]));

    let (_, mine) = send(&app, get(&format!("/interactions?ideaId={id}&userId=bob"), None)).await;
    assert_eq!(mine["user_id"], "bob");
    assert_eq!(mine["rating"], 6);
}

#[tokio::test]
async fn token_fills_in_and_guards_the_user() {
    let app = app();
    let id = idea_id(&app).await;

    let (status, row) = send(
        &app,
        json_request(Method::POST, "/interactions", json!({ "idea_id": id, "swipe": true }), Some("bob")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(row["user_id"], "bob");

    let (status, _) = send(
        &app,
        json_request(
            Method::POST,
            "/interactions",
            json!({ "user_id": "carol", "idea_id": id, "swipe": true }),
            Some("bob"),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, get(&format!("/interactions?ideaId={id}&userId=carol"), Some("bob"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
