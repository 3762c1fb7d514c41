use crate::i18n::{DetectionMethod, LanguageRegistry};
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::str::FromStr;

/// Deployment mode, read from `NODE_ENV`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
    Test,
    /// `NODE_ENV` unset or unrecognised
    Unspecified,
}

impl Environment {
    /// Full error diagnostics are only shown here.
    pub fn is_development(self) -> bool {
        self == Environment::Development
    }
}

impl FromStr for Environment {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim() {
            "development" => Environment::Development,
            "production" => Environment::Production,
            "test" => Environment::Test,
            _ => Environment::Unspecified,
        })
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub port: u16,
    pub environment: Environment,

    // Static files
    pub build_dir: PathBuf,

    // Localization
    pub locales_dir: PathBuf,
    pub fallback_language: String,
    pub supported_languages: Vec<String>,
    pub detection_order: Option<Vec<DetectionMethod>>,
    pub locale_cookie: String,

    // Error view
    pub support_email: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let registry = LanguageRegistry::get();

        Ok(Self {
            // Server
            port: match std::env::var("PORT") {
                Ok(port) => port
                    .parse()
                    .with_context(|| format!("PORT is not a valid port: {}", port))?,
                Err(_) => 3000,
            },
            environment: std::env::var("NODE_ENV")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(Environment::Unspecified),

            // Static files
            build_dir: std::env::var("BUILD_DIR")
                .unwrap_or_else(|_| "build".to_string())
                .into(),

            // Localization
            locales_dir: std::env::var("LOCALES_DIR")
                .unwrap_or_else(|_| "public/locales".to_string())
                .into(),
            fallback_language: std::env::var("FALLBACK_LANGUAGE")
                .unwrap_or_else(|_| registry.canonical().code.to_string()),
            supported_languages: std::env::var("SUPPORTED_LANGUAGES")
                .ok()
                .map(|v| parse_list(&v))
                .filter(|langs| !langs.is_empty())
                .unwrap_or_else(|| registry.enabled_codes()),
            detection_order: std::env::var("DETECTION_ORDER")
                .ok()
                .map(|v| {
                    parse_list(&v)
                        .iter()
                        .map(|m| m.parse::<DetectionMethod>())
                        .collect::<Result<Vec<_>, _>>()
                })
                .transpose()
                .context("DETECTION_ORDER contains an unknown method")?,
            locale_cookie: std::env::var("LOCALE_COOKIE").unwrap_or_else(|_| "lng".to_string()),

            // Error view
            support_email: std::env::var("SUPPORT_EMAIL")
                .unwrap_or_else(|_| "team-alternativ-transport@vy.no".to_string()),
        })
    }

    /// Fingerprinted build output, served with a long immutable lifetime.
    pub fn assets_dir(&self) -> PathBuf {
        self.build_dir.join("client").join("assets")
    }

    /// Everything else in the client build.
    pub fn public_dir(&self) -> PathBuf {
        self.build_dir.join("client")
    }
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
