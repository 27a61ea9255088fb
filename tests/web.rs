//! HTTP contract tests
//!
//! These run against the real route table with a lazily-connecting pool: the
//! paths under test (auth redirects, pre-persistence validation, the cached
//! index, the anonymous following feed) resolve before any query is issued,
//! so no database is required.

use actix_web::http::{header, StatusCode};
use actix_web::middleware::NormalizePath;
use actix_web::{test, web, App};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use posts_service::cache::PageCache;
use posts_service::config::{
    AppConfig, CacheConfig, Config, CorsConfig, DatabaseConfig, PaginationConfig,
};
use posts_service::middleware::{LOGIN_URL, VIEWER_HEADER};
use posts_service::routes;

const EMPTY_TEXT_MESSAGE: &str = "Вы что-то хотели сказать?";
const BROKEN_IMAGE_MESSAGE: &str =
    "Загрузите правильное изображение. Файл, который вы загрузили, поврежден или не является изображением.";

fn lazy_pool() -> PgPool {
    PgPoolOptions::new()
        .connect_lazy("postgresql://postgres@localhost/posts_unreachable")
        .expect("lazy pool")
}

fn test_config() -> Config {
    Config {
        app: AppConfig {
            env: "test".to_string(),
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        cors: CorsConfig {
            allowed_origins: "*".to_string(),
        },
        database: DatabaseConfig {
            url: String::new(),
            max_connections: 1,
        },
        cache: CacheConfig {
            enabled: true,
            ttl_secs: 20,
        },
        pagination: PaginationConfig { page_size: 10 },
    }
}

macro_rules! test_app {
    ($cache:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(lazy_pool()))
                .app_data($cache.clone())
                .app_data(web::Data::new(test_config()))
                .wrap(NormalizePath::trim())
                .configure(routes::configure),
        )
        .await
    };
}

const BOUNDARY: &str = "----postsservicetest";

/// Hand-rolled multipart/form-data body
fn multipart_body(fields: &[(&str, &str)], image: Option<&[u8]>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some(data) = image {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"upload.gif\"\r\nContent-Type: image/gif\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn multipart_post(uri: &str, viewer: Option<Uuid>, body: Vec<u8>) -> actix_web::test::TestRequest {
    let mut req = test::TestRequest::post().uri(uri).insert_header((
        header::CONTENT_TYPE,
        format!("multipart/form-data; boundary={BOUNDARY}"),
    ));
    if let Some(id) = viewer {
        req = req.insert_header((VIEWER_HEADER, id.to_string()));
    }
    req.set_payload(body)
}

#[actix_web::test]
async fn unauthenticated_get_new_post_redirects_to_login() {
    let cache = web::Data::new(PageCache::disabled());
    let app = test_app!(cache);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/new").to_request()).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(resp.headers().get(header::LOCATION).unwrap(), LOGIN_URL);
}

#[actix_web::test]
async fn unauthenticated_post_creation_redirects_to_login() {
    let cache = web::Data::new(PageCache::disabled());
    let app = test_app!(cache);

    let body = multipart_body(&[("text", "Where is Kroshka Ru?")], None);
    let resp = test::call_service(&app, multipart_post("/new", None, body).to_request()).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(resp.headers().get(header::LOCATION).unwrap(), LOGIN_URL);
}

#[actix_web::test]
async fn authenticated_get_new_post_form_is_ok() {
    let cache = web::Data::new(PageCache::disabled());
    let app = test_app!(cache);

    let req = test::TestRequest::get()
        .uri("/new")
        .insert_header((VIEWER_HEADER, Uuid::new_v4().to_string()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn empty_text_submission_fails_before_any_write() {
    let cache = web::Data::new(PageCache::disabled());
    let app = test_app!(cache);

    let body = multipart_body(&[("text", "")], None);
    let resp =
        test::call_service(&app, multipart_post("/new", Some(Uuid::new_v4()), body).to_request())
            .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body = test::read_body(resp).await;
    let payload: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(payload["error"], EMPTY_TEXT_MESSAGE);
}

#[actix_web::test]
async fn missing_text_field_fails_with_same_message() {
    let cache = web::Data::new(PageCache::disabled());
    let app = test_app!(cache);

    let body = multipart_body(&[], None);
    let resp =
        test::call_service(&app, multipart_post("/new", Some(Uuid::new_v4()), body).to_request())
            .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body = test::read_body(resp).await;
    let payload: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(payload["error"], EMPTY_TEXT_MESSAGE);
}

#[actix_web::test]
async fn non_image_upload_fails_before_any_write() {
    let cache = web::Data::new(PageCache::disabled());
    let app = test_app!(cache);

    let body = multipart_body(
        &[("text", "post with no-image")],
        Some(b"<!doctype html><p>not an image</p>"),
    );
    let resp =
        test::call_service(&app, multipart_post("/new", Some(Uuid::new_v4()), body).to_request())
            .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body = test::read_body(resp).await;
    let payload: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(payload["error"], BROKEN_IMAGE_MESSAGE);
}

#[actix_web::test]
async fn unauthenticated_comment_redirects_to_login() {
    let cache = web::Data::new(PageCache::disabled());
    let app = test_app!(cache);

    let req = test::TestRequest::post()
        .uri("/kenga/1/comment")
        .set_form(&[("text", "nice post")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(resp.headers().get(header::LOCATION).unwrap(), LOGIN_URL);
}

#[actix_web::test]
async fn anonymous_following_feed_is_an_empty_page() {
    let cache = web::Data::new(PageCache::disabled());
    let app = test_app!(cache);

    let resp =
        test::call_service(&app, test::TestRequest::get().uri("/follow").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = test::read_body(resp).await;
    let payload: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(payload["items"].as_array().unwrap().len(), 0);
    assert_eq!(payload["total_items"], 0);
}

#[actix_web::test]
async fn index_serves_cached_snapshot_within_ttl() {
    let cache = web::Data::new(PageCache::new(std::time::Duration::from_secs(20)));
    let snapshot = r#"{"items":[],"page":1,"total_pages":1,"total_items":0}"#;
    cache.put(&PageCache::index_key(1), snapshot.to_string());

    let app = test_app!(cache);

    // Served from the cache: the unreachable database is never touched.
    let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = test::read_body(resp).await;
    assert_eq!(body, snapshot.as_bytes());
}

#[actix_web::test]
async fn trailing_slashes_are_normalized() {
    let cache = web::Data::new(PageCache::disabled());
    let app = test_app!(cache);

    let resp =
        test::call_service(&app, test::TestRequest::get().uri("/new/").to_request()).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(resp.headers().get(header::LOCATION).unwrap(), LOGIN_URL);
}
