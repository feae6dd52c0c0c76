use crate::card::AltText;
use crate::nav::{PathTemplate, DEFAULT_DETAIL_PREFIX};
use anyhow::{anyhow, bail, Context, Result};
use std::env;
use std::net::SocketAddr;

const DEFAULT_BIND: &str = "0.0.0.0:3146";

#[derive(Debug, Clone)]
pub struct Config {
    pub tmdb_api_key: String,
    pub bind: SocketAddr,
    pub nav: PathTemplate,
    pub alt_text: AltText,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let tmdb_api_key =
            get("TMDB_API_KEY").ok_or_else(|| anyhow!("TMDB_API_KEY must be set"))?;

        let bind_raw = get("CINECARD_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind: SocketAddr = bind_raw
            .trim()
            .parse()
            .with_context(|| format!("CINECARD_BIND is not a socket address: {bind_raw}"))?;

        let prefix =
            get("CINECARD_DETAIL_PREFIX").unwrap_or_else(|| DEFAULT_DETAIL_PREFIX.to_string());
        let nav = PathTemplate::new(&prefix);
        if nav.prefix() == "/" {
            bail!("CINECARD_DETAIL_PREFIX must name a path segment, got {prefix:?}");
        }

        let alt_text = match get("CINECARD_ALT_TEXT") {
            None => AltText::default(),
            Some(v) => parse_alt_text(&v)?,
        };

        Ok(Self {
            tmdb_api_key,
            bind,
            nav,
            alt_text,
        })
    }
}

fn parse_alt_text(value: &str) -> Result<AltText> {
    match value.trim().to_lowercase().as_str() {
        "title" => Ok(AltText::Title),
        "empty" | "none" => Ok(AltText::Empty),
        other => Err(anyhow!(
            "CINECARD_ALT_TEXT must be 'title' or 'empty', got '{}'",
            other
        )),
    }
}
