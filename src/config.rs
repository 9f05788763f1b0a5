use once_cell::sync::Lazy;
use url::Url;

use crate::error::ConfigError;
use crate::probe::ProbeEndpoint;

// ── Constants ────────────────────────────────────────────────────────────────

pub const INSECURE_ENV: &str = "REEL_EXTRACTOR_INSECURE_SSL";
pub const DEFAULT_BACKEND_URL: &str =
    "https://surprising-eagerness.up.railway.app/api/extract-reel";
pub const DEFAULT_DISPLAY_BUDGET: usize = 200;

static DEFAULT_BACKEND: Lazy<Url> = Lazy::new(|| Url::parse(DEFAULT_BACKEND_URL).unwrap());

// ── Source resolution ────────────────────────────────────────────────────────

/// One place a setting may come from. `value` is `None` when the source is
/// not set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSource {
    pub label: &'static str,
    pub value: Option<String>,
}

impl ConfigSource {
    pub fn new(label: &'static str, value: Option<impl Into<String>>) -> Self {
        Self {
            label,
            value: value.map(Into::into),
        }
    }
}

/// First source whose value is present and not blank.
pub fn first_present(sources: &[ConfigSource]) -> Option<(&'static str, &str)> {
    sources.iter().find_map(|s| {
        s.value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(|v| (s.label, v))
    })
}

/// Backend address sources in priority order: the value baked in at build
/// time, then the runtime override.
pub fn backend_sources(runtime_override: Option<&str>) -> Vec<ConfigSource> {
    vec![
        ConfigSource::new("build-time env", option_env!("REEL_EXTRACTOR_BACKEND_URL")),
        ConfigSource::new("override", runtime_override),
    ]
}

pub fn resolve_backend(sources: &[ConfigSource]) -> Result<Url, ConfigError> {
    match first_present(sources) {
        Some((label, value)) => {
            let url = Url::parse(value).map_err(|reason| ConfigError::InvalidBackendUrl {
                value: value.to_string(),
                source_label: label,
                reason,
            })?;
            tracing::debug!(source = label, backend = %url, "backend address resolved");
            Ok(url)
        }
        None => Ok(DEFAULT_BACKEND.clone()),
    }
}

// ── Settings ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Settings {
    pub backend_url: Url,
    pub display_budget: usize,
    pub probe_endpoints: Vec<ProbeEndpoint>,
    pub insecure_tls: bool,
}

impl Settings {
    /// Settings for this process. `backend_override` is the `--backend`
    /// flag; `extra_proxies` are prepended to the default probe endpoints.
    pub fn load(
        backend_override: Option<&str>,
        display_budget: Option<usize>,
        extra_proxies: &[String],
    ) -> Result<Self, ConfigError> {
        let backend_url = resolve_backend(&backend_sources(backend_override))?;

        let display_budget = display_budget.unwrap_or(DEFAULT_DISPLAY_BUDGET);
        if display_budget == 0 {
            return Err(ConfigError::ZeroBudget);
        }

        let mut probe_endpoints = extra_proxies
            .iter()
            .map(|p| ProbeEndpoint::proxy(p))
            .collect::<Result<Vec<_>, _>>()?;
        probe_endpoints.extend(ProbeEndpoint::defaults());

        let insecure_tls = std::env::var(INSECURE_ENV).as_deref() == Ok("1");

        Ok(Self {
            backend_url,
            display_budget,
            probe_endpoints,
            insecure_tls,
        })
    }
}
