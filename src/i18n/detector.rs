//! Server-side locale detection.
//!
//! A [`LanguageDetector`] walks an ordered list of detection methods and
//! returns the first candidate that matches a supported language. When no
//! method yields a match it returns the fallback language, so detection
//! never comes back empty-handed.

use crate::error::{ConfigError, DetectionError};
use crate::i18n::cookie::CookieCodec;
use crate::i18n::parser::{client_locales, pick};
use crate::i18n::request::LocaleSource;
use crate::i18n::session::SessionStorage;
use anyhow::Result;
use futures::future::BoxFuture;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

/// One strategy for extracting a candidate locale from a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DetectionMethod {
    SearchParams,
    Cookie,
    Session,
    Header,
    Custom,
}

impl DetectionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SearchParams => "searchParams",
            Self::Cookie => "cookie",
            Self::Session => "session",
            Self::Header => "header",
            Self::Custom => "custom",
        }
    }
}

impl fmt::Display for DetectionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DetectionMethod {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "searchParams" => Ok(Self::SearchParams),
            "cookie" => Ok(Self::Cookie),
            "session" => Ok(Self::Session),
            "header" => Ok(Self::Header),
            "custom" => Ok(Self::Custom),
            other => Err(ConfigError::UnknownMethod(other.to_string())),
        }
    }
}

/// Caller-supplied locale lookup for the `custom` method.
///
/// Returning several locales is allowed; they are treated as a preference
/// list in the given order.
pub trait FindLocale: Send + Sync {
    fn find_locale<'a>(&'a self, request: &'a dyn LocaleSource)
        -> BoxFuture<'a, Result<Vec<String>>>;
}

/// Settings for a [`LanguageDetector`].
#[derive(Clone)]
pub struct DetectionOptions {
    /// Methods to try, in order. `None` selects [`LanguageDetector::default_order`].
    pub order: Option<Vec<DetectionMethod>>,
    pub search_param_key: String,
    pub session_key: String,
    pub supported_languages: Vec<String>,
    pub fallback_language: String,
    pub cookie: Option<Arc<dyn CookieCodec>>,
    pub session_storage: Option<Arc<dyn SessionStorage>>,
    pub find_locale: Option<Arc<dyn FindLocale>>,
}

impl DetectionOptions {
    pub const DEFAULT_KEY: &'static str = "lng";

    pub fn new(supported_languages: Vec<String>, fallback_language: impl Into<String>) -> Self {
        Self {
            order: None,
            search_param_key: Self::DEFAULT_KEY.to_string(),
            session_key: Self::DEFAULT_KEY.to_string(),
            supported_languages,
            fallback_language: fallback_language.into(),
            cookie: None,
            session_storage: None,
            find_locale: None,
        }
    }

    pub fn with_order(mut self, order: Vec<DetectionMethod>) -> Self {
        self.order = Some(order);
        self
    }

    pub fn with_search_param_key(mut self, key: impl Into<String>) -> Self {
        self.search_param_key = key.into();
        self
    }

    pub fn with_session_key(mut self, key: impl Into<String>) -> Self {
        self.session_key = key.into();
        self
    }

    pub fn with_cookie(mut self, cookie: Arc<dyn CookieCodec>) -> Self {
        self.cookie = Some(cookie);
        self
    }

    pub fn with_session_storage(mut self, storage: Arc<dyn SessionStorage>) -> Self {
        self.session_storage = Some(storage);
        self
    }

    pub fn with_find_locale(mut self, find_locale: Arc<dyn FindLocale>) -> Self {
        self.find_locale = Some(find_locale);
        self
    }
}

/// Detects the preferred locale of a request.
#[derive(Clone)]
pub struct LanguageDetector {
    options: DetectionOptions,
}

impl LanguageDetector {
    /// Build a detector, rejecting single-method orders whose backing store
    /// is missing.
    pub fn new(options: DetectionOptions) -> Result<Self, ConfigError> {
        if options.supported_languages.is_empty() {
            return Err(ConfigError::NoSupportedLanguages);
        }

        if let Some(order) = &options.order {
            if order.as_slice() == [DetectionMethod::Session] && options.session_storage.is_none() {
                return Err(ConfigError::MissingSessionStorage);
            }
            if order.as_slice() == [DetectionMethod::Cookie] && options.cookie.is_none() {
                return Err(ConfigError::MissingCookie);
            }
        }

        Ok(Self { options })
    }

    pub fn options(&self) -> &DetectionOptions {
        &self.options
    }

    /// `searchParams, cookie, session, header`, with `custom` first when a
    /// custom lookup is configured.
    pub fn default_order(&self) -> Vec<DetectionMethod> {
        let mut order = vec![
            DetectionMethod::SearchParams,
            DetectionMethod::Cookie,
            DetectionMethod::Session,
            DetectionMethod::Header,
        ];
        if self.options.find_locale.is_some() {
            order.insert(0, DetectionMethod::Custom);
        }
        order
    }

    /// The order actually used by [`detect`](Self::detect).
    pub fn order(&self) -> Vec<DetectionMethod> {
        self.options
            .order
            .clone()
            .unwrap_or_else(|| self.default_order())
    }

    /// Detect the locale of `request`, falling back to the configured
    /// fallback language when no method matches.
    pub async fn detect(&self, request: &dyn LocaleSource) -> Result<String, DetectionError> {
        for method in self.order() {
            let locale = match method {
                DetectionMethod::SearchParams => self.from_search_params(request),
                DetectionMethod::Cookie => self.from_cookie(request).await?,
                DetectionMethod::Session => self.from_session(request).await?,
                DetectionMethod::Header => self.from_header(request),
                DetectionMethod::Custom => self.from_custom(request).await?,
            };

            if let Some(locale) = locale {
                debug!(method = %method, locale = %locale, "Detected locale");
                return Ok(locale);
            }
        }

        debug!(
            locale = %self.options.fallback_language,
            "No detection method matched, using fallback"
        );
        Ok(self.options.fallback_language.clone())
    }

    fn from_search_params(&self, request: &dyn LocaleSource) -> Option<String> {
        let value = request.query_param(&self.options.search_param_key)?;
        self.from_supported(&value)
    }

    async fn from_cookie(&self, request: &dyn LocaleSource) -> Result<Option<String>, DetectionError> {
        let Some(cookie) = &self.options.cookie else {
            return Ok(None);
        };

        let value = cookie
            .parse(request.cookie_header())
            .await
            .map_err(DetectionError::Cookie)?;

        Ok(match value {
            Some(Value::String(lng)) if !lng.is_empty() => self.from_supported(&lng),
            _ => None,
        })
    }

    async fn from_session(&self, request: &dyn LocaleSource) -> Result<Option<String>, DetectionError> {
        let Some(storage) = &self.options.session_storage else {
            return Ok(None);
        };

        let session = storage
            .get_session(request.cookie_header())
            .await
            .map_err(DetectionError::Session)?;

        Ok(match session.get(&self.options.session_key) {
            Some(Value::String(lng)) if !lng.is_empty() => self.from_supported(lng),
            _ => None,
        })
    }

    fn from_header(&self, request: &dyn LocaleSource) -> Option<String> {
        let locales = client_locales(&request.accept_language())?;
        self.from_supported(&locales.join(","))
    }

    async fn from_custom(&self, request: &dyn LocaleSource) -> Result<Option<String>, DetectionError> {
        let Some(find_locale) = &self.options.find_locale else {
            return Err(DetectionError::MissingFindLocale);
        };

        let locales = find_locale
            .find_locale(request)
            .await
            .map_err(DetectionError::Custom)?;

        if locales.is_empty() {
            return Ok(None);
        }
        Ok(self.from_supported(&locales.join(",")))
    }

    /// Exact pass first, then loose.
    fn from_supported(&self, language: &str) -> Option<String> {
        let supported = &self.options.supported_languages;
        pick(supported, language, false).or_else(|| pick(supported, language, true))
    }
}
