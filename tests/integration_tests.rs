//! Integration tests for the app server
//!
//! These drive the full router (static files, locale detection, translation
//! loading, document rendering and the error view) with in-process requests.

use alt_transport_frontend::{
    config::{Config, Environment},
    i18n::DetectionMethod,
    render::{PageContext, PageRenderer, RenderFailure, RouteHandle, RouteModule},
    server::{self, AppState, ASSETS_CACHE_CONTROL, PUBLIC_CACHE_CONTROL},
};
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
};
use http_body_util::BodyExt;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

// ==================== Test Helpers ====================

/// Lay out a client build and translation resources under `temp_dir`.
fn create_fixture(temp_dir: &TempDir) {
    let root = temp_dir.path();

    let assets = root.join("build/client/assets");
    std::fs::create_dir_all(&assets).expect("Failed to create assets dir");
    std::fs::write(assets.join("app-1a2b3c.js"), "console.log('app');").expect("Failed to write asset");
    std::fs::write(root.join("build/client/robots.txt"), "User-agent: *\nDisallow: /\n")
        .expect("Failed to write robots.txt");
    std::fs::write(root.join("build/client/assets-manifest.json"), "{}").expect("Failed to write manifest");

    let resources = [
        ("nb", "common", r#"{"title": "Alternativ transport", "error": {"generic": "Noe gikk galt", "contact": "Skriv til {{email}}"}}"#),
        ("en", "common", r#"{"title": "Alternative transport", "error": {"generic": "Something broke", "contact": "Write to {{email}}"}}"#),
        ("nb", "home", r#"{"title": "Velkommen", "description": "Finn bussen din"}"#),
        ("en", "home", r#"{"title": "Welcome", "description": "Find your bus"}"#),
    ];
    for (language, namespace, body) in resources {
        let dir = root.join("locales").join(language);
        std::fs::create_dir_all(&dir).expect("Failed to create locale dir");
        std::fs::write(dir.join(format!("{}.json", namespace)), body).expect("Failed to write resource");
    }
}

/// Create a test config rooted in `temp_dir`
fn create_test_config(temp_dir: &TempDir, environment: Environment) -> Config {
    Config {
        port: 0,
        environment,
        build_dir: temp_dir.path().join("build"),
        locales_dir: temp_dir.path().join("locales"),
        fallback_language: "nb".to_string(),
        supported_languages: vec!["nb".to_string(), "en".to_string()],
        detection_order: None,
        locale_cookie: "lng".to_string(),
        support_email: "support@example.no".to_string(),
    }
}

fn app(config: Config) -> axum::Router {
    server::router(AppState::from_config(config).expect("Failed to build state"))
}

async fn get(app: axum::Router, uri: &str, headers: &[(&str, &str)]) -> Response {
    let mut builder = Request::builder().uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    app.oneshot(builder.body(Body::empty()).unwrap())
        .await
        .expect("Router is infallible")
}

async fn body_text(response: Response) -> String {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read body")
        .to_bytes();
    String::from_utf8(bytes.to_vec()).expect("Body is not UTF-8")
}

struct FailingPage;

impl PageRenderer for FailingPage {
    fn render(&self, _ctx: &mut PageContext<'_>) -> Result<String, RenderFailure> {
        Err(RenderFailure::Error {
            message: "Loader exploded".to_string(),
            stack: Some("at loader (routes/broken.rs:12)".to_string()),
        })
    }
}

fn app_with_failing_page(config: Config) -> axum::Router {
    let i18n = server::build_i18n(&config).expect("Failed to build i18n");
    let routes = server::default_routes().page(
        "/broken",
        RouteModule::new("routes/broken", Some(RouteHandle::single("home"))),
        Arc::new(FailingPage),
    );
    server::router(AppState::new(config, i18n, routes))
}

// ==================== Locale Detection Tests ====================

#[tokio::test]
async fn test_search_param_selects_locale() {
    let temp_dir = TempDir::new().unwrap();
    create_fixture(&temp_dir);

    let response = get(app(create_test_config(&temp_dir, Environment::Production)), "/?lng=en", &[]).await;
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    assert!(html.contains("<html lang=\"en\">"));
    assert!(html.contains("Welcome"));
    assert!(html.contains("<title>Alternative transport</title>"));
}

#[tokio::test]
async fn test_cookie_selects_locale() {
    let temp_dir = TempDir::new().unwrap();
    create_fixture(&temp_dir);

    let response = get(
        app(create_test_config(&temp_dir, Environment::Production)),
        "/",
        &[("cookie", "lng=en")],
    )
    .await;
    let html = body_text(response).await;
    assert!(html.contains("<html lang=\"en\">"));
}

#[tokio::test]
async fn test_no_signal_uses_fallback() {
    let temp_dir = TempDir::new().unwrap();
    create_fixture(&temp_dir);

    let response = get(app(create_test_config(&temp_dir, Environment::Production)), "/", &[]).await;
    let html = body_text(response).await;
    assert!(html.contains("<html lang=\"nb\">"));
    assert!(html.contains("Velkommen"));
    assert!(html.contains("Finn bussen din"));
}

#[tokio::test]
async fn test_accept_language_header() {
    let temp_dir = TempDir::new().unwrap();
    create_fixture(&temp_dir);

    let response = get(
        app(create_test_config(&temp_dir, Environment::Production)),
        "/",
        &[("accept-language", "en-US,en;q=0.9,nb;q=0.5")],
    )
    .await;
    let html = body_text(response).await;
    assert!(html.contains("<html lang=\"en\">"));
}

#[tokio::test]
async fn test_unknown_region_loose_matches() {
    let temp_dir = TempDir::new().unwrap();
    create_fixture(&temp_dir);

    let response = get(app(create_test_config(&temp_dir, Environment::Production)), "/?lng=en-ZZ", &[]).await;
    let html = body_text(response).await;
    assert!(html.contains("<html lang=\"en\">"));
}

#[tokio::test]
async fn test_page_styles_are_inlined() {
    let temp_dir = TempDir::new().unwrap();
    create_fixture(&temp_dir);

    let response = get(app(create_test_config(&temp_dir, Environment::Production)), "/", &[]).await;
    let html = body_text(response).await;
    assert!(html.contains("<style data-emotion=\"css home-main home-title\">"));
}

// ==================== Static File Tests ====================

#[tokio::test]
async fn test_assets_are_immutable() {
    let temp_dir = TempDir::new().unwrap();
    create_fixture(&temp_dir);

    let response = get(
        app(create_test_config(&temp_dir, Environment::Production)),
        "/assets/app-1a2b3c.js",
        &[],
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CACHE_CONTROL).unwrap(),
        ASSETS_CACHE_CONTROL
    );
    assert_eq!(body_text(response).await, "console.log('app');");
}

#[tokio::test]
async fn test_assets_not_cached_in_development() {
    let temp_dir = TempDir::new().unwrap();
    create_fixture(&temp_dir);

    let response = get(
        app(create_test_config(&temp_dir, Environment::Development)),
        "/assets/app-1a2b3c.js",
        &[],
    )
    .await;
    assert_eq!(response.headers().get(header::CACHE_CONTROL).unwrap(), "no-cache");
}

#[tokio::test]
async fn test_public_files_short_lived() {
    let temp_dir = TempDir::new().unwrap();
    create_fixture(&temp_dir);

    let response = get(app(create_test_config(&temp_dir, Environment::Production)), "/robots.txt", &[]).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CACHE_CONTROL).unwrap(),
        PUBLIC_CACHE_CONTROL
    );
}

#[tokio::test]
async fn test_assets_prefix_matches_whole_segment() {
    let temp_dir = TempDir::new().unwrap();
    create_fixture(&temp_dir);

    let response = get(
        app(create_test_config(&temp_dir, Environment::Production)),
        "/assets-manifest.json",
        &[],
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CACHE_CONTROL).unwrap(),
        PUBLIC_CACHE_CONTROL
    );
}

#[tokio::test]
async fn test_every_response_is_noindex() {
    let temp_dir = TempDir::new().unwrap();
    create_fixture(&temp_dir);

    for uri in ["/", "/robots.txt", "/assets/app-1a2b3c.js", "/missing"] {
        let response = get(app(create_test_config(&temp_dir, Environment::Production)), uri, &[]).await;
        assert_eq!(
            response.headers().get("x-robots-tag").unwrap(),
            "noindex, nofollow",
            "missing X-Robots-Tag on {}",
            uri
        );
        assert!(response.headers().get("x-powered-by").is_none());
    }
}

// ==================== Error View Tests ====================

#[tokio::test]
async fn test_unknown_path_renders_localized_fallback() {
    let temp_dir = TempDir::new().unwrap();
    create_fixture(&temp_dir);

    let response = get(
        app(create_test_config(&temp_dir, Environment::Production)),
        "/nowhere?lng=en",
        &[],
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let html = body_text(response).await;
    assert!(html.contains("Something broke"));
    assert!(html.contains("Write to support@example.no"));
    assert!(!html.contains("Not Found"));
}

#[tokio::test]
async fn test_render_failure_in_production_hides_stack() {
    let temp_dir = TempDir::new().unwrap();
    create_fixture(&temp_dir);

    let response = get(
        app_with_failing_page(create_test_config(&temp_dir, Environment::Production)),
        "/broken",
        &[],
    )
    .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let html = body_text(response).await;
    assert!(html.contains("Loader exploded"));
    assert!(html.contains("Skriv til support@example.no"));
    assert!(!html.contains("routes/broken.rs"));
}

#[tokio::test]
async fn test_render_failure_in_development_shows_stack() {
    let temp_dir = TempDir::new().unwrap();
    create_fixture(&temp_dir);

    let response = get(
        app_with_failing_page(create_test_config(&temp_dir, Environment::Development)),
        "/broken",
        &[],
    )
    .await;
    let html = body_text(response).await;
    assert!(html.contains("There was an error"));
    assert!(html.contains("routes/broken.rs"));
}

#[tokio::test]
async fn test_custom_detection_without_lookup_fails_request() {
    let temp_dir = TempDir::new().unwrap();
    create_fixture(&temp_dir);

    let mut config = create_test_config(&temp_dir, Environment::Production);
    config.detection_order = Some(vec![DetectionMethod::Custom]);

    let response = get(app(config), "/", &[]).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

// ==================== Configuration Tests ====================

#[test]
fn test_cookie_only_order_is_accepted_with_cookie() {
    let temp_dir = TempDir::new().unwrap();
    let mut config = create_test_config(&temp_dir, Environment::Test);
    config.detection_order = Some(vec![DetectionMethod::Cookie]);
    assert!(server::build_i18n(&config).is_ok());
}

#[test]
fn test_session_only_order_is_rejected_without_storage() {
    let temp_dir = TempDir::new().unwrap();
    let mut config = create_test_config(&temp_dir, Environment::Test);
    config.detection_order = Some(vec![DetectionMethod::Session]);
    assert!(server::build_i18n(&config).is_err());
}
