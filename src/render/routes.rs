//! Route modules, their handle metadata, and the set of routes active in
//! one render.

use crate::render::pages::PageRenderer;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Translation namespaces declared by a route: one name or a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Namespaces {
    One(String),
    Many(Vec<String>),
}

/// Per-route metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RouteHandle {
    /// Namespaces the route needs. Any shape other than a string or an
    /// array of strings reads as no declaration.
    #[serde(default, deserialize_with = "lenient_namespaces")]
    pub i18n: Option<Namespaces>,
}

fn lenient_namespaces<'de, D>(deserializer: D) -> Result<Option<Namespaces>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

impl RouteHandle {
    pub fn single(namespace: impl Into<String>) -> Self {
        Self {
            i18n: Some(Namespaces::One(namespace.into())),
        }
    }

    pub fn many<I, S>(namespaces: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            i18n: Some(Namespaces::Many(namespaces.into_iter().map(Into::into).collect())),
        }
    }

    pub fn namespaces(&self) -> Vec<String> {
        match &self.i18n {
            Some(Namespaces::One(ns)) => vec![ns.clone()],
            Some(Namespaces::Many(list)) => list.clone(),
            None => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteModule {
    pub id: String,
    pub handle: Option<RouteHandle>,
}

impl RouteModule {
    pub fn new(id: impl Into<String>, handle: Option<RouteHandle>) -> Self {
        Self {
            id: id.into(),
            handle,
        }
    }
}

/// Route modules taking part in one render, outermost first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderContext {
    routes: Vec<RouteModule>,
}

impl RenderContext {
    pub fn new(routes: Vec<RouteModule>) -> Self {
        Self { routes }
    }

    pub fn route_modules(&self) -> impl Iterator<Item = &RouteModule> {
        self.routes.iter()
    }
}

/// A page route: its module and what renders it.
#[derive(Clone)]
pub struct PageRoute {
    pub path: String,
    pub module: RouteModule,
    pub renderer: Arc<dyn PageRenderer>,
}

/// A root layout route plus exact-path page routes.
#[derive(Clone)]
pub struct RouteTable {
    root: RouteModule,
    pages: Vec<PageRoute>,
}

/// Result of matching a path.
pub struct RouteMatch {
    pub context: RenderContext,
    pub page: Option<PageRoute>,
}

impl RouteTable {
    pub fn new(root: RouteModule) -> Self {
        Self {
            root,
            pages: Vec::new(),
        }
    }

    pub fn page(
        mut self,
        path: impl Into<String>,
        module: RouteModule,
        renderer: Arc<dyn PageRenderer>,
    ) -> Self {
        self.pages.push(PageRoute {
            path: path.into(),
            module,
            renderer,
        });
        self
    }

    /// The root is always active. A trailing slash is ignored except for `/`.
    pub fn match_path(&self, path: &str) -> RouteMatch {
        let normalized = match path.trim_end_matches('/') {
            "" => "/",
            trimmed => trimmed,
        };

        let page = self.pages.iter().find(|p| p.path == normalized).cloned();
        let mut routes = vec![self.root.clone()];
        if let Some(page) = &page {
            routes.push(page.module.clone());
        }

        RouteMatch {
            context: RenderContext::new(routes),
            page,
        }
    }
}
