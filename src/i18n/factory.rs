//! Per-request translation setup: locale resolution, route namespaces and
//! fixed translators.

use crate::error::{ConfigError, DetectionError};
use crate::i18n::backend::Backend;
use crate::i18n::detector::{DetectionOptions, LanguageDetector};
use crate::i18n::instance::{FixedT, I18nInstance, InstanceOptions, Plugin, DEFAULT_NAMESPACE};
use crate::i18n::request::LocaleSource;
use crate::render::RenderContext;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// Everything an [`I18nServer`] is built from.
#[derive(Clone)]
pub struct I18nServerOptions {
    pub detection: DetectionOptions,
    /// Base options for every instance; per-call options are layered on top.
    pub instance: InstanceOptions,
    pub backend: Option<Arc<dyn Backend>>,
    pub plugins: Vec<Arc<dyn Plugin>>,
}

impl I18nServerOptions {
    pub fn new(detection: DetectionOptions) -> Self {
        Self {
            detection,
            instance: InstanceOptions::default(),
            backend: None,
            plugins: Vec::new(),
        }
    }

    pub fn with_instance_options(mut self, instance: InstanceOptions) -> Self {
        self.instance = instance;
        self
    }

    pub fn with_backend(mut self, backend: Arc<dyn Backend>) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn with_plugin(mut self, plugin: Arc<dyn Plugin>) -> Self {
        debug!(plugin = plugin.name(), "Registered post-processor");
        self.plugins.push(plugin);
        self
    }
}

/// Either a locale already known, or a request to detect it from.
#[derive(Clone, Copy)]
pub enum LocaleOrRequest<'a> {
    Locale(&'a str),
    Request(&'a dyn LocaleSource),
}

impl<'a> From<&'a str> for LocaleOrRequest<'a> {
    fn from(locale: &'a str) -> Self {
        Self::Locale(locale)
    }
}

impl<'a> From<&'a dyn LocaleSource> for LocaleOrRequest<'a> {
    fn from(request: &'a dyn LocaleSource) -> Self {
        Self::Request(request)
    }
}

/// Builds fresh, fixed-language translators for each request.
///
/// Nothing is cached between calls: every `get_fixed_t` creates and loads
/// its own [`I18nInstance`].
#[derive(Clone)]
pub struct I18nServer {
    options: I18nServerOptions,
    detector: LanguageDetector,
}

impl I18nServer {
    pub fn new(options: I18nServerOptions) -> Result<Self, ConfigError> {
        let detector = LanguageDetector::new(options.detection.clone())?;
        Ok(Self { options, detector })
    }

    pub fn detector(&self) -> &LanguageDetector {
        &self.detector
    }

    /// Detect the locale of `request`.
    pub async fn get_locale(&self, request: &dyn LocaleSource) -> Result<String, DetectionError> {
        self.detector.detect(request).await
    }

    /// Namespaces declared by the routes taking part in a render, deduplicated
    /// in first-seen order.
    pub fn get_route_namespaces(&self, context: &RenderContext) -> Vec<String> {
        let mut seen = HashSet::new();
        context
            .route_modules()
            .filter_map(|route| route.handle.as_ref())
            .flat_map(|handle| handle.namespaces())
            .filter(|ns| seen.insert(ns.clone()))
            .collect()
    }

    /// A fresh engine instance with the configured backend and plugins.
    pub fn create_instance(&self, options: &InstanceOptions) -> I18nInstance {
        I18nInstance::new(
            self.options.instance.merged_with(options),
            self.options.backend.clone(),
            self.options.plugins.clone(),
        )
    }

    /// Resolve the locale, load the namespaces and return a translator bound
    /// to them.
    ///
    /// Without namespaces the instance's default namespace is loaded, or
    /// `translation` when none is configured.
    pub async fn get_fixed_t(
        &self,
        target: LocaleOrRequest<'_>,
        namespaces: Option<&[String]>,
        options: InstanceOptions,
    ) -> Result<FixedT, DetectionError> {
        let mut instance = self.create_instance(&options);
        let locale = match target {
            LocaleOrRequest::Locale(locale) => locale.to_string(),
            LocaleOrRequest::Request(request) => self.get_locale(request).await?,
        };

        instance.change_language(&locale);

        let requested: Vec<String> = namespaces.map(<[String]>::to_vec).unwrap_or_default();
        if !requested.is_empty() {
            instance.load_namespaces(&requested).await;
        } else {
            let default_ns = instance
                .options()
                .default_ns
                .clone()
                .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string());
            instance.load_namespaces(&[default_ns]).await;
        }

        debug!(locale = %locale, namespaces = ?requested, "Created fixed translator");

        let key_prefix = instance.options().key_prefix.clone();
        Ok(instance.into_fixed_t(&locale, requested, key_prefix))
    }
}
