//! Internationalization (i18n) module.
//!
//! # Architecture
//!
//! - `parser`: Accept-language parsing and supported-language matching
//! - `request`: What detection can see of a request
//! - `cookie` / `session`: Backing stores for the cookie and session methods
//! - `detector`: Ordered, first-match-wins locale detection with fallback
//! - `backend` / `instance`: Translation resources and the per-request engine
//! - `factory`: `I18nServer`, tying detection and translation together
//! - `registry` / `strings`: Shipped languages and built-in UI strings
//!
//! # Example
//!
//! ```rust,ignore
//! let server = I18nServer::new(I18nServerOptions::new(detection))?;
//! let namespaces = server.get_route_namespaces(&context);
//! let t = server
//!     .get_fixed_t(LocaleOrRequest::Request(&parts), Some(&namespaces), Default::default())
//!     .await?;
//! ```

pub mod backend;
pub mod cookie;
pub mod detector;
pub mod factory;
pub mod instance;
pub mod parser;
pub mod request;
pub mod session;

mod registry;
mod strings;

pub use backend::{Backend, FsBackend, MemoryBackend};
pub use cookie::{CookieCodec, LocaleCookie};
pub use detector::{DetectionMethod, DetectionOptions, FindLocale, LanguageDetector};
pub use factory::{I18nServer, I18nServerOptions, LocaleOrRequest};
pub use instance::{FixedT, I18nInstance, InstanceOptions, Plugin};
pub use registry::{LanguageConfig, LanguageRegistry};
pub use request::LocaleSource;
pub use session::{MemorySessionStorage, Session, SessionStorage};
pub use strings::LanguageStrings;
