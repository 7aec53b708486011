//! Public content listings.

use axum::http::StatusCode;

use crate::database::NewArticle;
use crate::e2e_tests::helpers::*;
use crate::testing::new_article;

fn seed_articles(app: &TestApp, count: usize) {
    for i in 0..count {
        app.test_db
            .database
            .insert_article(&NewArticle {
                featured: i % 10 == 0,
                view_count: i64::try_from(i * 7 % 13).expect("small"),
                ..new_article(&format!("story-{i}"))
            })
            .expect("insert");
    }
}

fn ids(response: &TestResponse) -> Vec<i64> {
    response
        .json()
        .as_array()
        .expect("array")
        .iter()
        .map(|article| article["id"].as_i64().expect("numeric id"))
        .collect()
}

#[tokio::test]
async fn test_default_limit_is_twenty_newest_first() {
    let app = TestApp::new();
    seed_articles(&app, 30);

    let response = app.get("/api/articles", None).await;
    assert_eq!(response.status, StatusCode::OK);

    let ids = ids(&response);
    assert_eq!(ids.len(), 20);
    assert!(ids.windows(2).all(|pair| pair[0] > pair[1]));
    assert_eq!(ids[0], 30);
}

#[tokio::test]
async fn test_explicit_limit() {
    let app = TestApp::new();
    seed_articles(&app, 10);

    let response = app.get("/api/articles?limit=3", None).await;
    assert_eq!(ids(&response), [10, 9, 8]);
}

#[tokio::test]
async fn test_oversized_limit_is_clamped() {
    let app = TestApp::new();
    seed_articles(&app, 5);

    for uri in ["/api/articles?limit=1000", "/api/articles?limit=5000000000"] {
        let response = app.get(uri, None).await;
        assert_eq!(response.status, StatusCode::OK, "{uri}");
        assert_eq!(ids(&response), [5, 4, 3, 2, 1], "{uri}");
    }
}

#[tokio::test]
async fn test_invalid_limit_is_bad_request() {
    let app = TestApp::new();

    for uri in ["/api/articles?limit=abc", "/api/articles?limit=-1"] {
        let response = app.get(uri, None).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{uri}");
    }
}

#[tokio::test]
async fn test_empty_database_lists_are_empty() {
    let app = TestApp::new();
    for uri in [
        "/api/articles",
        "/api/articles/featured",
        "/api/articles/popular",
        "/api/categories",
        "/api/tags",
    ] {
        let response = app.get(uri, None).await;
        assert_eq!(response.status, StatusCode::OK, "{uri}");
        assert_eq!(response.json(), serde_json::json!([]), "{uri}");
    }
}

#[tokio::test]
async fn test_featured_default_limit_is_one() {
    let app = TestApp::new();
    seed_articles(&app, 30);

    let response = app.get("/api/articles/featured", None).await;
    let body = response.json();
    let articles = body.as_array().expect("array");
    assert_eq!(articles.len(), 1);
    assert_eq!(articles[0]["featured"], true);
    assert_eq!(articles[0]["slug"], "story-20");
}

#[tokio::test]
async fn test_popular_default_limit_is_five_by_views() {
    let app = TestApp::new();
    seed_articles(&app, 13);

    let response = app.get("/api/articles/popular", None).await;
    let body = response.json();
    let views: Vec<i64> = body
        .as_array()
        .expect("array")
        .iter()
        .map(|article| article["viewCount"].as_i64().expect("numeric"))
        .collect();
    assert_eq!(views, [12, 11, 10, 9, 8]);
}

#[tokio::test]
async fn test_categories_and_tags_sorted() {
    let app = TestApp::new();
    let database = &app.test_db.database;
    database.insert_category("World", "world").expect("insert");
    database.insert_category("Culture", "culture").expect("insert");
    database.insert_tag("quiz", "quiz").expect("insert");
    database.insert_tag("listicle", "listicle").expect("insert");

    let categories = app.get("/api/categories", None).await.json();
    assert_eq!(categories[0]["name"], "Culture");
    assert_eq!(categories[1]["name"], "World");

    let tags = app.get("/api/tags", None).await.json();
    assert_eq!(tags[0]["name"], "listicle");
    assert_eq!(tags[1]["name"], "quiz");
}
