//! The parts of an incoming request that locale detection looks at.

use axum::http::{header, request::Parts, HeaderMap, Request, Uri};

/// Capabilities a request exposes to the locale detector.
///
/// Detection never needs the body, so anything that carries a URI and headers
/// can be a source: a full `Request`, its `Parts`, or a test double.
pub trait LocaleSource: Send + Sync {
    /// Value of a query parameter, `None` when the key is absent.
    fn query_param(&self, key: &str) -> Option<String>;

    /// Raw `Cookie` header.
    fn cookie_header(&self) -> Option<&str>;

    /// Every `Accept-Language` header value, in arrival order.
    fn accept_language(&self) -> Vec<&str>;
}

fn query_param_from_uri(uri: &Uri, key: &str) -> Option<String> {
    form_urlencoded::parse(uri.query()?.as_bytes())
        .find(|(name, _)| name == key)
        .map(|(_, value)| value.into_owned())
}

fn cookie_from_headers(headers: &HeaderMap) -> Option<&str> {
    headers.get(header::COOKIE)?.to_str().ok()
}

fn accept_language_from_headers(headers: &HeaderMap) -> Vec<&str> {
    headers
        .get_all(header::ACCEPT_LANGUAGE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .collect()
}

impl<B: Send + Sync> LocaleSource for Request<B> {
    fn query_param(&self, key: &str) -> Option<String> {
        query_param_from_uri(self.uri(), key)
    }

    fn cookie_header(&self) -> Option<&str> {
        cookie_from_headers(self.headers())
    }

    fn accept_language(&self) -> Vec<&str> {
        accept_language_from_headers(self.headers())
    }
}

impl LocaleSource for Parts {
    fn query_param(&self, key: &str) -> Option<String> {
        query_param_from_uri(&self.uri, key)
    }

    fn cookie_header(&self) -> Option<&str> {
        cookie_from_headers(&self.headers)
    }

    fn accept_language(&self) -> Vec<&str> {
        accept_language_from_headers(&self.headers)
    }
}
