//! Server-rendered front-end: request locale detection, per-request
//! translations, HTML document rendering and static file serving.

pub mod config;
pub mod error;
pub mod i18n;
pub mod render;
pub mod server;
