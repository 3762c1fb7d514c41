//! Error types for locale detection and translation loading.
//!
//! Construction problems (`ConfigError`) surface when a detector is built.
//! Everything that can go wrong while serving a request is a
//! `DetectionError` or a `BackendError`.

use thiserror::Error;

/// Invalid detector configuration, raised at construction time.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("You need a session storage if you want to only get the locale from the session")]
    MissingSessionStorage,

    #[error("You need a cookie if you want to only get the locale from the cookie")]
    MissingCookie,

    #[error("Supported languages must not be empty")]
    NoSupportedLanguages,

    #[error("Unknown detection method: '{0}'")]
    UnknownMethod(String),
}

/// Failure while detecting the locale of a single request.
#[derive(Debug, Error)]
pub enum DetectionError {
    #[error(
        "Tried to find a locale using a custom lookup but none is configured. \
         Remove `custom` from the detection order or provide a lookup"
    )]
    MissingFindLocale,

    #[error("Failed to decode locale cookie: {0}")]
    Cookie(anyhow::Error),

    #[error("Failed to load session: {0}")]
    Session(anyhow::Error),

    #[error("Custom locale lookup failed: {0}")]
    Custom(anyhow::Error),
}

/// Failure while reading a translation resource.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid translation JSON in {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Translation resource {language}/{namespace} is not an object")]
    NotAnObject { language: String, namespace: String },
}
