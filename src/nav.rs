//! Navigation targets for cards.
//!
//! A card never hardcodes the URL of the page it links to. It asks a
//! [`NavTarget`] instead, and the router registers the detail page from the
//! same [`PathTemplate`] so both sides agree on the convention.

use crate::card::MovieId;

pub const DEFAULT_DETAIL_PREFIX: &str = "/movie/";

pub trait NavTarget: Send + Sync {
    fn target(&self, id: &MovieId) -> String;
}

impl<F> NavTarget for F
where
    F: Fn(&MovieId) -> String + Send + Sync,
{
    fn target(&self, id: &MovieId) -> String {
        self(id)
    }
}

/// `prefix` + literal identifier, e.g. `/movie/42`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    prefix: String,
}

impl PathTemplate {
    /// Builds a template from a prefix, forcing a leading and trailing `/`.
    pub fn new(prefix: &str) -> Self {
        let trimmed = prefix.trim().trim_matches('/');
        let prefix = if trimmed.is_empty() {
            "/".to_string()
        } else {
            format!("/{trimmed}/")
        };
        Self { prefix }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Route pattern for axum, matching every target this template builds.
    pub fn route_pattern(&self) -> String {
        format!("{}:id", self.prefix)
    }
}

impl Default for PathTemplate {
    fn default() -> Self {
        Self::new(DEFAULT_DETAIL_PREFIX)
    }
}

impl NavTarget for PathTemplate {
    fn target(&self, id: &MovieId) -> String {
        format!("{}{}", self.prefix, id)
    }
}
