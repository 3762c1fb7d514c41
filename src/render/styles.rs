//! Server-computed styles and their one-time handoff to the client.
//!
//! The server collects style fragments while rendering a page and emits them
//! as inline `<style>` tags. After the document mounts on the client, the
//! same fragments are re-registered with the client style sheet exactly once.
//! Both sides get an explicit context object instead of a global.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Styles registered under one cache key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleFragment {
    pub key: String,
    pub ids: Vec<String>,
    pub css: String,
}

impl StyleFragment {
    /// Value of the `data-emotion` attribute: the key followed by the ids.
    pub fn data_attribute(&self) -> String {
        std::iter::once(self.key.as_str())
            .chain(self.ids.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Collects fragments while a page renders.
#[derive(Debug, Default)]
pub struct StyleCollector {
    fragments: Vec<StyleFragment>,
}

impl StyleCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `css` under `key` with id `id`. Ids already registered for
    /// the key are skipped.
    pub fn insert(&mut self, key: &str, id: &str, css: &str) {
        match self.fragments.iter_mut().find(|f| f.key == key) {
            Some(fragment) if fragment.ids.iter().any(|existing| existing == id) => {}
            Some(fragment) => {
                fragment.ids.push(id.to_string());
                fragment.css.push_str(css);
            }
            None => self.fragments.push(StyleFragment {
                key: key.to_string(),
                ids: vec![id.to_string()],
                css: css.to_string(),
            }),
        }
    }

    /// Freeze what was collected.
    pub fn finish(self) -> ServerStyleContext {
        ServerStyleContext::new(self.fragments)
    }
}

/// Styles computed during one server render. Read-only once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerStyleContext {
    fragments: Vec<StyleFragment>,
}

impl ServerStyleContext {
    pub fn new(fragments: Vec<StyleFragment>) -> Self {
        Self { fragments }
    }

    pub fn fragments(&self) -> &[StyleFragment] {
        &self.fragments
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}

/// Where a style sheet inserts its tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetContainer {
    /// Not attached to a live document (e.g. the head was replaced).
    Detached,
    DocumentHead,
}

/// Client-side style sheet: the tags it owns and where they live.
#[derive(Debug, Clone)]
pub struct StyleSheet {
    container: SheetContainer,
    tags: Vec<StyleFragment>,
}

impl StyleSheet {
    pub fn new(container: SheetContainer, tags: Vec<StyleFragment>) -> Self {
        Self { container, tags }
    }

    pub fn container(&self) -> SheetContainer {
        self.container
    }

    pub fn set_container(&mut self, container: SheetContainer) {
        self.container = container;
    }

    pub fn tags(&self) -> &[StyleFragment] {
        &self.tags
    }

    /// Remove all tags, returning them.
    pub fn flush(&mut self) -> Vec<StyleFragment> {
        std::mem::take(&mut self.tags)
    }

    pub fn insert_tag(&mut self, tag: StyleFragment) {
        self.tags.push(tag);
    }
}

/// Client-side style state. `reset` asks the style engine to re-apply
/// global styles.
#[derive(Debug, Default)]
pub struct ClientStyleContext {
    resets: AtomicUsize,
}

impl ClientStyleContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&self) {
        self.resets.fetch_add(1, Ordering::Relaxed);
    }

    pub fn reset_count(&self) -> usize {
        self.resets.load(Ordering::Relaxed)
    }
}
