//! Per-request translation engine.
//!
//! An [`I18nInstance`] owns the resources loaded for one request. Once the
//! language and namespaces are settled it is turned into a [`FixedT`], a
//! cheap-to-clone translator bound to that language and those namespaces.

use crate::i18n::backend::{Backend, Resource};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, warn};

/// Namespace used when nothing else is configured.
pub const DEFAULT_NAMESPACE: &str = "translation";

/// Engine settings.
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceOptions {
    /// Namespace loaded and searched when the caller names none.
    pub default_ns: Option<String>,
    /// Language consulted after the requested one and its base language.
    pub fallback_lng: Option<String>,
    pub key_separator: char,
    pub ns_separator: char,
    /// Prepended (with `key_separator`) to every key looked up through a `FixedT`.
    pub key_prefix: Option<String>,
}

impl Default for InstanceOptions {
    fn default() -> Self {
        Self {
            default_ns: None,
            fallback_lng: None,
            key_separator: '.',
            ns_separator: ':',
            key_prefix: None,
        }
    }
}

impl InstanceOptions {
    /// Overlay `overrides` on `self`; set fields in `overrides` win.
    pub fn merged_with(&self, overrides: &InstanceOptions) -> InstanceOptions {
        let defaults = InstanceOptions::default();
        InstanceOptions {
            default_ns: overrides.default_ns.clone().or_else(|| self.default_ns.clone()),
            fallback_lng: overrides
                .fallback_lng
                .clone()
                .or_else(|| self.fallback_lng.clone()),
            key_separator: if overrides.key_separator != defaults.key_separator {
                overrides.key_separator
            } else {
                self.key_separator
            },
            ns_separator: if overrides.ns_separator != defaults.ns_separator {
                overrides.ns_separator
            } else {
                self.ns_separator
            },
            key_prefix: overrides.key_prefix.clone().or_else(|| self.key_prefix.clone()),
        }
    }
}

/// Post-processor applied to every resolved translation.
pub trait Plugin: Send + Sync {
    fn name(&self) -> &str;

    fn process(&self, key: &str, value: String) -> String;
}

type Store = HashMap<String, HashMap<String, Resource>>;

/// A localization engine instance. One per request.
pub struct I18nInstance {
    options: InstanceOptions,
    backend: Option<Arc<dyn Backend>>,
    plugins: Vec<Arc<dyn Plugin>>,
    language: Option<String>,
    store: Store,
    attempted: HashSet<(String, String)>,
}

impl I18nInstance {
    pub fn new(
        options: InstanceOptions,
        backend: Option<Arc<dyn Backend>>,
        plugins: Vec<Arc<dyn Plugin>>,
    ) -> Self {
        Self {
            options,
            backend,
            plugins,
            language: None,
            store: HashMap::new(),
            attempted: HashSet::new(),
        }
    }

    pub fn options(&self) -> &InstanceOptions {
        &self.options
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    pub fn change_language(&mut self, language: &str) {
        debug!(language, "Changing instance language");
        self.language = Some(language.to_string());
    }

    /// Language codes consulted for `language`: itself, its primary subtag
    /// when different, then the fallback language.
    pub fn languages_for(&self, language: &str) -> Vec<String> {
        let mut codes = vec![language.to_string()];
        if let Some((base, _)) = language.split_once('-') {
            codes.push(base.to_string());
        }
        if let Some(fallback) = &self.options.fallback_lng {
            codes.push(fallback.clone());
        }

        let mut seen = HashSet::new();
        codes.retain(|code| seen.insert(code.clone()));
        codes
    }

    /// Load `namespaces` for the current language from the backend.
    ///
    /// Each `(language, namespace)` pair is read at most once per instance.
    /// Missing resources and backend failures are logged and skipped.
    pub async fn load_namespaces<S: AsRef<str>>(&mut self, namespaces: &[S]) {
        let Some(backend) = self.backend.clone() else {
            return;
        };
        let Some(language) = self.language.clone() else {
            return;
        };

        for code in self.languages_for(&language) {
            for namespace in namespaces {
                let namespace = namespace.as_ref();
                if !self.attempted.insert((code.clone(), namespace.to_string())) {
                    continue;
                }

                match backend.read(&code, namespace).await {
                    Ok(Some(resource)) => self.add_resource_bundle(&code, namespace, resource),
                    Ok(None) => debug!(language = %code, namespace, "No translation resource"),
                    Err(e) => warn!(
                        language = %code,
                        namespace,
                        "Failed to load translation resource: {}",
                        e
                    ),
                }
            }
        }
    }

    pub fn add_resource_bundle(&mut self, language: &str, namespace: &str, resource: Resource) {
        self.store
            .entry(language.to_string())
            .or_default()
            .insert(namespace.to_string(), resource);
    }

    /// Freeze the instance into a translator bound to `language`.
    ///
    /// `namespaces` empty means the default namespace.
    pub fn into_fixed_t(self, language: &str, namespaces: Vec<String>, key_prefix: Option<String>) -> FixedT {
        let namespaces = if namespaces.is_empty() {
            vec![self
                .options
                .default_ns
                .clone()
                .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string())]
        } else {
            namespaces
        };

        FixedT {
            language: language.to_string(),
            languages: self.languages_for(language),
            namespaces,
            key_prefix: key_prefix.or_else(|| self.options.key_prefix.clone()),
            key_separator: self.options.key_separator,
            ns_separator: self.options.ns_separator,
            store: Arc::new(self.store),
            plugins: self.plugins,
        }
    }
}

/// Translator bound to one language, a namespace list and an optional key
/// prefix.
#[derive(Clone)]
pub struct FixedT {
    language: String,
    languages: Vec<String>,
    namespaces: Vec<String>,
    key_prefix: Option<String>,
    key_separator: char,
    ns_separator: char,
    store: Arc<Store>,
    plugins: Vec<Arc<dyn Plugin>>,
}

impl FixedT {
    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn namespaces(&self) -> &[String] {
        &self.namespaces
    }

    /// Translation for `key`, or `None` when no loaded resource has it.
    ///
    /// `ns:key` restricts the lookup to namespace `ns`.
    pub fn try_t(&self, key: &str) -> Option<String> {
        let (namespaces, key) = match key.split_once(self.ns_separator) {
            Some((ns, rest)) if !ns.is_empty() => (vec![ns.to_string()], rest),
            _ => (self.namespaces.clone(), key),
        };

        let full_key = match &self.key_prefix {
            Some(prefix) => format!("{}{}{}", prefix, self.key_separator, key),
            None => key.to_string(),
        };

        for namespace in &namespaces {
            for code in &self.languages {
                let Some(resource) = self.store.get(code).and_then(|ns| ns.get(namespace)) else {
                    continue;
                };
                if let Some(value) = lookup(resource, &full_key, self.key_separator) {
                    let processed = self
                        .plugins
                        .iter()
                        .fold(value, |acc, plugin| plugin.process(&full_key, acc));
                    return Some(processed);
                }
            }
        }

        None
    }

    /// Translation for `key`, or `key` itself when unresolved.
    pub fn t(&self, key: &str) -> String {
        self.try_t(key).unwrap_or_else(|| key.to_string())
    }

    /// Like [`t`](Self::t) with `{{name}}` placeholders replaced.
    pub fn t_with(&self, key: &str, vars: &[(&str, &str)]) -> String {
        interpolate(&self.t(key), vars)
    }
}

fn lookup(resource: &Resource, key: &str, separator: char) -> Option<String> {
    if let Some(value) = resource.get(key).and_then(leaf_to_string) {
        return Some(value);
    }

    let mut parts = key.split(separator);
    let mut current = resource.get(parts.next()?)?;
    for part in parts {
        current = current.as_object()?.get(part)?;
    }
    leaf_to_string(current)
}

fn leaf_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Replace `{{name}}` (spaces inside the braces allowed) with the matching
/// value. Unknown placeholders are left alone.
pub fn interpolate(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = template.to_string();
    for (name, value) in vars {
        out = out
            .replace(&format!("{{{{{}}}}}", name), value)
            .replace(&format!("{{{{ {} }}}}", name), value);
    }
    out
}
