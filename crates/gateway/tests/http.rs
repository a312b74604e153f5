//! HTTP surface tests against a seeded SQLite blog store

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use blogforge_common::config::{AppConfig, DatabaseConfig};
use blogforge_common::db::schema;
use blogforge_common::{
    ContentPart, DbPool, ImageMap, ImageMapEntry, NewPost, Repository, StagedImage,
};
use blogforge_gateway::{create_router, AppState};
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

const PIXELS: &[u8] = b"\x89PNG fake payload";

struct TestApp {
    _dir: TempDir,
    router: Router,
    db: DbPool,
    repo: Repository,
    post_id: i32,
}

async fn setup() -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("blog.db").display());

    let mut config = AppConfig::default();
    config.database = DatabaseConfig::for_url(url);
    config.database.max_connections = 1;

    let db = DbPool::new(&config.database).await.unwrap();
    schema::create_all(db.write()).await.unwrap();

    let file_path = dir.path().join("img_0000beef.png");
    std::fs::write(&file_path, PIXELS).unwrap();

    let mut images = ImageMap::new();
    images.insert(
        "img_0000beef".into(),
        ImageMapEntry::staged(
            1,
            StagedImage {
                file_path,
                file_name: "img_0000beef.png".into(),
                content_type: "image/png".into(),
                width: 3,
                height: 2,
            },
        ),
    );

    let parts = vec![
        ContentPart::paragraph("Transmission lines"),
        ContentPart::paragraph("Reflection coefficient"),
        ContentPart::image("img_0000beef"),
        ContentPart::paragraph("Smith chart"),
    ];

    let repo = Repository::new(db.clone());
    let stored = repo
        .store_post(
            NewPost::new("Smith charts", Some("Xiaoyou Wu".into())),
            &parts,
            &images,
        )
        .await
        .unwrap();

    TestApp {
        _dir: dir,
        router: create_router(AppState::new(config, db.clone())),
        db,
        repo,
        post_id: stored.post_id,
    }
}

async fn get(router: &Router, uri: &str) -> axum::response::Response {
    router
        .clone()
        .oneshot(Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn body_bytes(res: axum::response::Response) -> Vec<u8> {
    res.into_body().collect().await.unwrap().to_bytes().to_vec()
}

async fn json_body(res: axum::response::Response) -> Value {
    serde_json::from_slice(&body_bytes(res).await).unwrap()
}

#[tokio::test]
async fn health_ok_and_sets_request_id() {
    let app = setup().await;

    let res = get(&app.router, "/health").await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().get("x-request-id").is_some());

    let body = json_body(res).await;
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn ready_pings_database() {
    let app = setup().await;

    let res = get(&app.router, "/ready").await;
    assert_eq!(res.status(), StatusCode::OK);

    let body = json_body(res).await;
    assert_eq!(body["status"], "ready");
    assert_eq!(body["checks"]["database"]["status"], "up");
}

#[tokio::test]
async fn list_posts_returns_summaries() {
    let app = setup().await;

    let res = get(&app.router, "/api/blog_posts").await;
    assert_eq!(res.status(), StatusCode::OK);

    let body = json_body(res).await;
    let posts = body.as_array().unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0]["id"], app.post_id);
    assert_eq!(posts[0]["title"], "Smith charts");
    assert_eq!(posts[0]["author"], "Xiaoyou Wu");
    assert_eq!(posts[0]["pub_date"].as_str().unwrap().len(), 19);
    assert!(posts[0]["last_modified"].is_string());
}

#[tokio::test]
async fn post_detail_has_ordered_blocks_and_inline_image() {
    let app = setup().await;

    let res = get(&app.router, &format!("/api/blog/{}", app.post_id)).await;
    assert_eq!(res.status(), StatusCode::OK);

    let body = json_body(res).await;
    assert_eq!(body["title"], "Smith charts");

    let blocks = body["content_blocks"].as_array().unwrap();
    assert_eq!(blocks.len(), 4);
    for (i, block) in blocks.iter().enumerate() {
        assert_eq!(block["sequence"], i);
    }
    assert_eq!(blocks[0]["type"], "paragraph");
    assert_eq!(blocks[0]["content"], "Transmission lines");
    assert!(blocks[0].get("image_data").is_none());

    let image = &blocks[2];
    assert_eq!(image["type"], "image");
    assert_eq!(image["content"], "img_0000beef");
    assert_eq!(image["image_name"], "img_0000beef.png");
    assert_eq!(image["content_type"], "image/png");
    assert_eq!(image["width"], 3);
    assert_eq!(image["height"], 2);
    assert!(image["image_data"]
        .as_str()
        .unwrap()
        .starts_with("data:image/png;base64,"));
}

#[tokio::test]
async fn missing_post_is_404_json() {
    let app = setup().await;

    let res = get(&app.router, "/api/blog/999").await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let body = json_body(res).await;
    assert_eq!(body, serde_json::json!({ "error": "Blog post not found" }));
}

#[tokio::test]
async fn non_integer_post_id_is_404_json() {
    let app = setup().await;

    for uri in ["/api/blog/latest", "/api/blog/1.5", "/api/blog/99999999999"] {
        let res = get(&app.router, uri).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND, "{uri}");

        let body = json_body(res).await;
        assert_eq!(body, serde_json::json!({ "error": "Blog post not found" }));
    }
}

#[tokio::test]
async fn non_integer_image_id_is_plain_404() {
    let app = setup().await;

    let res = get(&app.router, "/api/blog/image/cover.png").await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_bytes(res).await, b"Image not found");
}

#[tokio::test]
async fn image_endpoint_serves_raw_bytes() {
    let app = setup().await;
    let image_id = app.repo.get_images_by_post(app.post_id).await.unwrap()[0].id;

    let res = get(&app.router, &format!("/api/blog/image/{}", image_id)).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()[header::CONTENT_TYPE], "image/png");
    assert_eq!(body_bytes(res).await, PIXELS);
}

#[tokio::test]
async fn missing_image_is_plain_404() {
    let app = setup().await;

    let res = get(&app.router, "/api/blog/image/4242").await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert!(res.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/plain"));
    assert_eq!(body_bytes(res).await, b"Image not found");
}

#[tokio::test]
async fn deleted_image_row_leaves_bare_block() {
    let app = setup().await;
    let image_id = app.repo.get_images_by_post(app.post_id).await.unwrap()[0].id;
    assert!(app.repo.delete_image(image_id).await.unwrap());

    let res = get(&app.router, &format!("/api/blog/{}", app.post_id)).await;
    assert_eq!(res.status(), StatusCode::OK);

    let body = json_body(res).await;
    assert_eq!(
        body["content_blocks"][2],
        serde_json::json!({ "type": "image", "content": "img_0000beef", "sequence": 2 })
    );
}

#[tokio::test]
async fn database_failure_is_500_json() {
    let app = setup().await;
    schema::drop_all(app.db.write()).await.unwrap();

    let res = get(&app.router, "/api/blog_posts").await;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = json_body(res).await;
    assert!(body["error"].as_str().is_some_and(|msg| !msg.is_empty()));
}

#[tokio::test]
async fn demo_routes() {
    let app = setup().await;

    let res = get(&app.router, "/home/Ada").await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_bytes(res).await, b"<h1>Hello Ada </br> </h1>");

    let res = get(&app.router, "/home/%3Cscript%3Ealert(1)%3C%2Fscript%3E").await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        body_bytes(res).await,
        b"<h1>Hello &lt;script&gt;alert(1)&lt;/script&gt; </br> </h1>"
    );

    let res = get(&app.router, "/test?a=1&b=two").await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_bytes(res).await, b"a=1&b=two");
}

#[tokio::test]
async fn cors_allows_configured_origin() {
    let app = setup().await;

    let res = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/blog_posts")
                .header(header::ORIGIN, "http://localhost:3000")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        res.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "http://localhost:3000"
    );
}
