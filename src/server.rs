//! HTTP server: static files, per-request rendering, response headers and
//! request logging.

use crate::config::Config;
use crate::i18n::{
    DetectionOptions, FsBackend, I18nServer, I18nServerOptions, InstanceOptions, LanguageStrings,
    LocaleCookie, LocaleOrRequest,
};
use crate::render::{
    render_document, render_error_boundary, DocumentProps, ErrorStrings, HomePage, PageContext,
    RenderFailure, RouteHandle, RouteModule, RouteTable, StyleCollector,
};
use anyhow::{Context, Result};
use axum::{
    body::Body,
    extract::State,
    http::{
        header::{self, HeaderName, HeaderValue},
        request::Parts,
        Method, Request, StatusCode,
    },
    middleware::{self, Next},
    response::{Html, IntoResponse, Response},
    Router,
};
use serde_json::json;
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tower::ServiceExt;
use tower_http::{
    compression::CompressionLayer, services::ServeDir, set_header::SetResponseHeaderLayer,
};
use tracing::{error, info, warn};

/// Cache lifetime for fingerprinted build assets.
pub const ASSETS_CACHE_CONTROL: &str = "public, max-age=31536000, immutable";
/// Cache lifetime for every other static file.
pub const PUBLIC_CACHE_CONTROL: &str = "public, max-age=3600";

const ASSETS_PREFIX: &str = "/assets";
const CLIENT_ENTRY: &str = "/assets/entry.client.js";
const ROOT_STYLESHEET: &str = "/assets/root.css";

/// Shared, read-only state for all requests.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub i18n: Arc<I18nServer>,
    pub routes: Arc<RouteTable>,
}

impl AppState {
    pub fn new(config: Config, i18n: I18nServer, routes: RouteTable) -> Self {
        Self {
            config: Arc::new(config),
            i18n: Arc::new(i18n),
            routes: Arc::new(routes),
        }
    }

    /// State with the filesystem translation backend and the default routes.
    pub fn from_config(config: Config) -> Result<Self> {
        let i18n = build_i18n(&config)?;
        Ok(Self::new(config, i18n, default_routes()))
    }
}

/// Locale detection from query, cookie and header, translations from
/// `locales_dir`.
pub fn build_i18n(config: &Config) -> Result<I18nServer> {
    let mut detection = DetectionOptions::new(
        config.supported_languages.clone(),
        config.fallback_language.clone(),
    )
    .with_cookie(Arc::new(LocaleCookie::new(config.locale_cookie.clone())));

    if let Some(order) = &config.detection_order {
        detection = detection.with_order(order.clone());
    }

    let options = I18nServerOptions::new(detection)
        .with_backend(Arc::new(FsBackend::new(config.locales_dir.clone())))
        .with_instance_options(InstanceOptions {
            default_ns: Some("common".to_string()),
            fallback_lng: Some(config.fallback_language.clone()),
            ..Default::default()
        });

    I18nServer::new(options).context("Invalid locale detection configuration")
}

/// Root layout needing `common`, and the landing page needing `home`.
pub fn default_routes() -> RouteTable {
    RouteTable::new(RouteModule::new("root", Some(RouteHandle::single("common")))).page(
        "/",
        RouteModule::new("routes/_index", Some(RouteHandle::single("home"))),
        Arc::new(HomePage),
    )
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .fallback(handle_request)
        .with_state(state)
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-robots-tag"),
            HeaderValue::from_static("noindex, nofollow"),
        ))
        .layer(CompressionLayer::new())
        .layer(middleware::from_fn(log_request))
}

/// Bind, serve until SIGINT/SIGTERM, then drop the listener.
///
/// Requests still in flight when the signal arrives are not waited for.
pub async fn serve(config: Config) -> Result<()> {
    let port = config.port;
    let app = router(AppState::from_config(config)?);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("✅ App server running on http://localhost:{}", port);

    tokio::select! {
        result = axum::serve(listener, app).into_future() => {
            result.context("Server error")?;
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received, closing listener");
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Unable to listen for SIGINT: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Unable to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

async fn handle_request(State(state): State<AppState>, req: Request<Body>) -> Response {
    let (parts, _body) = req.into_parts();

    if parts.method == Method::GET || parts.method == Method::HEAD {
        if let Some(response) = serve_static(&state, &parts).await {
            return response;
        }
    }

    render_page(&state, &parts).await
}

/// Serve a file from the client build, or `None` when there is none.
///
/// `/assets/*` is served from the assets root, everything else from the
/// public root.
async fn serve_static(state: &AppState, parts: &Parts) -> Option<Response> {
    let path = parts.uri.path();
    let (root, file_path, cache_control) = match path.strip_prefix(ASSETS_PREFIX) {
        Some(rest) if rest.starts_with('/') => {
            let cache_control = if state.config.environment.is_development() {
                "no-cache"
            } else {
                ASSETS_CACHE_CONTROL
            };
            (state.config.assets_dir(), rest, cache_control)
        }
        _ => (state.config.public_dir(), path, PUBLIC_CACHE_CONTROL),
    };

    let mut builder = Request::builder()
        .method(parts.method.clone())
        .uri(file_path);
    for name in [
        header::ACCEPT_ENCODING,
        header::IF_MODIFIED_SINCE,
        header::IF_UNMODIFIED_SINCE,
        header::RANGE,
    ] {
        if let Some(value) = parts.headers.get(&name) {
            builder = builder.header(name, value.clone());
        }
    }
    let static_req = builder.body(Body::empty()).ok()?;

    let response = match ServeDir::new(root).oneshot(static_req).await {
        Ok(response) => response,
        Err(never) => match never {},
    };

    if response.status() == StatusCode::NOT_FOUND {
        return None;
    }

    let mut response = response.into_response();
    if response.status().is_success() || response.status() == StatusCode::NOT_MODIFIED {
        response
            .headers_mut()
            .insert(header::CACHE_CONTROL, HeaderValue::from_static(cache_control));
    }
    Some(response)
}

async fn render_page(state: &AppState, parts: &Parts) -> Response {
    let config = &state.config;
    let matched = state.routes.match_path(parts.uri.path());
    let namespaces = state.i18n.get_route_namespaces(&matched.context);

    let t = match state
        .i18n
        .get_fixed_t(
            LocaleOrRequest::Request(parts),
            Some(namespaces.as_slice()),
            InstanceOptions::default(),
        )
        .await
    {
        Ok(t) => t,
        Err(e) => {
            error!("Locale detection failed: {}", e);
            let failure = RenderFailure::from(anyhow::Error::from(e));
            let strings = ErrorStrings::resolve(None, &config.fallback_language, &config.support_email);
            let body = render_error_boundary(&failure, config.environment, &strings);
            let props = document_props(&config.fallback_language, None, body);
            let html = render_document(&props, &Default::default());
            return (StatusCode::INTERNAL_SERVER_ERROR, Html(html)).into_response();
        }
    };

    let mut styles = StyleCollector::new();
    let rendered = match &matched.page {
        Some(page) => {
            let mut ctx = PageContext {
                path: parts.uri.path(),
                t: &t,
                styles: &mut styles,
            };
            page.renderer
                .render(&mut ctx)
                .map_err(|failure| (StatusCode::INTERNAL_SERVER_ERROR, failure))
        }
        None => Err((
            StatusCode::NOT_FOUND,
            RenderFailure::other(json!({ "status": 404, "statusText": "Not Found" })),
        )),
    };

    let (status, body) = match rendered {
        Ok(body) => (StatusCode::OK, body),
        Err((status, failure)) => {
            if status.is_server_error() {
                error!(path = %parts.uri.path(), "Page render failed: {:?}", failure);
            }
            let strings = ErrorStrings::resolve(Some(&t), t.language(), &config.support_email);
            (status, render_error_boundary(&failure, config.environment, &strings))
        }
    };

    let title = t
        .try_t("common:title")
        .unwrap_or_else(|| LanguageStrings::for_code(t.language()).document_title.to_string());
    let props = document_props(t.language(), Some(title), body);
    let html = render_document(&props, &styles.finish());

    (status, Html(html)).into_response()
}

fn document_props(lang: &str, title: Option<String>, children: String) -> DocumentProps {
    DocumentProps {
        lang: lang.to_string(),
        title: title.unwrap_or_else(|| LanguageStrings::for_code(lang).document_title.to_string()),
        links: vec![ROOT_STYLESHEET.to_string()],
        scripts: vec![CLIENT_ENTRY.to_string()],
        children,
    }
}

/// One compact line per request: `GET /path 200 512 - 1.234 ms`.
async fn log_request(req: Request<Body>, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let start = Instant::now();

    let response = next.run(req).await;

    let length = response
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();
    info!(
        "{} {} {} {} - {:.3} ms",
        method,
        uri,
        response.status().as_u16(),
        length,
        start.elapsed().as_secs_f64() * 1000.0
    );

    response
}
