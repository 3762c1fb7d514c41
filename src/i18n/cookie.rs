//! Cookie codecs used by locale detection.

use anyhow::Result;
use futures::future::BoxFuture;
use percent_encoding::percent_decode_str;
use serde_json::Value;

/// Decodes a value out of a raw `Cookie` header.
pub trait CookieCodec: Send + Sync {
    /// Cookie name this codec reads.
    fn name(&self) -> &str;

    /// Decode the cookie's value. `Ok(None)` means the cookie is absent.
    fn parse<'a>(&'a self, cookie_header: Option<&'a str>) -> BoxFuture<'a, Result<Option<Value>>>;
}

/// Find `name` in a `Cookie` header and return its raw value.
pub fn find_cookie<'a>(cookie_header: &'a str, name: &str) -> Option<&'a str> {
    cookie_header.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key.trim() == name).then_some(value.trim())
    })
}

/// A cookie holding a bare locale (`lng=nb`), or a JSON-encoded string
/// (`lng=%22nb%22`) as written by frameworks that serialize cookie values.
#[derive(Debug, Clone)]
pub struct LocaleCookie {
    name: String,
}

impl LocaleCookie {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl CookieCodec for LocaleCookie {
    fn name(&self) -> &str {
        &self.name
    }

    fn parse<'a>(&'a self, cookie_header: Option<&'a str>) -> BoxFuture<'a, Result<Option<Value>>> {
        Box::pin(async move {
            let Some(raw) = cookie_header.and_then(|header| find_cookie(header, &self.name)) else {
                return Ok(None);
            };

            let decoded = percent_decode_str(raw.trim_matches('"'))
                .decode_utf8_lossy()
                .into_owned();
            let value = match serde_json::from_str::<Value>(&decoded) {
                Ok(json @ Value::String(_)) => json,
                _ => Value::String(decoded),
            };
            Ok(Some(value))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_cookie() {
        let header = "theme=dark; lng=en; other=1";
        assert_eq!(find_cookie(header, "lng"), Some("en"));
        assert_eq!(find_cookie(header, "missing"), None);
    }

    #[test]
    fn test_find_cookie_ignores_name_prefixes() {
        assert_eq!(find_cookie("xlng=sv; lng=nb", "lng"), Some("nb"));
    }

    #[tokio::test]
    async fn test_locale_cookie_plain_value() {
        let cookie = LocaleCookie::new("lng");
        let value = cookie.parse(Some("lng=nb")).await.unwrap();
        assert_eq!(value, Some(Value::String("nb".to_string())));
    }

    #[tokio::test]
    async fn test_locale_cookie_json_value() {
        let cookie = LocaleCookie::new("lng");
        let value = cookie.parse(Some("lng=%22en%22")).await.unwrap();
        assert_eq!(value, Some(Value::String("en".to_string())));
    }

    #[tokio::test]
    async fn test_locale_cookie_keeps_plus_sign() {
        let cookie = LocaleCookie::new("lng");
        let value = cookie.parse(Some("lng=a+b")).await.unwrap();
        assert_eq!(value, Some(Value::String("a+b".to_string())));
    }

    #[tokio::test]
    async fn test_locale_cookie_absent() {
        let cookie = LocaleCookie::new("lng");
        assert_eq!(cookie.parse(Some("theme=dark")).await.unwrap(), None);
        assert_eq!(cookie.parse(None).await.unwrap(), None);
    }
}
