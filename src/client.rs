use serde_json::Value;
use url::Url;

use crate::error::ExtractError;
use crate::models::{ExtractionRequest, ExtractionResponse};
use crate::probe::{self, ProbeEndpoint};
use crate::transport::{RawResponse, Transport};
use crate::ui::{Notification, Session, Surface, UiIntent};

const UNKNOWN_BACKEND_ERROR: &str = "Unknown backend error";

// ── Public result types ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedVideo {
    pub video_url: Option<String>,
    pub shortcode: Option<String>,
}

/// Result of a raw backend check: the status, and the body if it was JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckReport {
    pub status: u16,
    pub json: Option<Value>,
}

// ── Input handling ───────────────────────────────────────────────────────────

pub fn normalize_input(raw: &str) -> Result<String, ExtractError> {
    let url = raw.trim();
    if url.is_empty() {
        return Err(ExtractError::EmptyInput);
    }
    Ok(url.to_string())
}

// ── Response interpretation ──────────────────────────────────────────────────

/// Turn a raw backend reply into an outcome. Pure; no I/O.
pub fn interpret_response(resp: &RawResponse) -> Result<ExtractedVideo, ExtractError> {
    let value: Value = match serde_json::from_str(&resp.body) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(status = resp.status, error = %e, body = %resp.body, "backend response not JSON");
            return Err(ExtractError::MalformedResponse {
                status: resp.status,
                body: resp.body.clone(),
            });
        }
    };
    tracing::debug!(status = resp.status, json = %value, "backend response");

    let parsed = ExtractionResponse::from_value(&value);
    if resp.is_success() && parsed.success {
        return Ok(ExtractedVideo {
            video_url: parsed.video_url,
            shortcode: parsed.shortcode,
        });
    }

    let message = match parsed.error {
        Some(err) => err,
        None if crate::models::is_truthy(&value) => value.to_string(),
        None => UNKNOWN_BACKEND_ERROR.to_string(),
    };
    Err(ExtractError::BackendError(message))
}

// ── Client ───────────────────────────────────────────────────────────────────

pub struct ExtractionClient<T: Transport> {
    transport: T,
    backend: Url,
}

impl<T: Transport> ExtractionClient<T> {
    pub fn new(transport: T, backend: Url) -> Self {
        Self { transport, backend }
    }

    pub fn backend(&self) -> &Url {
        &self.backend
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn build_request(url: &str) -> Vec<u8> {
        ExtractionRequest {
            url: url.to_string(),
        }
        .to_body()
    }

    /// One request/response cycle with the backend. Empty input fails
    /// before anything is sent.
    pub async fn extract(&self, raw: &str) -> Result<ExtractedVideo, ExtractError> {
        let url = normalize_input(raw)?;
        let body = Self::build_request(&url);

        tracing::info!(backend = %self.backend, url = %url, "POST extraction request");
        let resp = self.transport.post_json(&self.backend, body).await?;
        tracing::info!(status = resp.status, "extraction request complete");

        interpret_response(&resp)
    }

    /// Send the input as-is and report what came back, for debugging a
    /// backend by hand.
    pub async fn check(&self, raw: &str) -> Result<CheckReport, ExtractError> {
        if raw.is_empty() {
            return Err(ExtractError::EmptyInput);
        }
        let body = Self::build_request(raw);
        let resp = self.transport.post_json(&self.backend, body).await?;
        let json = serde_json::from_str(&resp.body).ok();
        Ok(CheckReport {
            status: resp.status,
            json,
        })
    }
}

// ── UI-driving cycles ────────────────────────────────────────────────────────

/// Full extract cycle against a session. Loading is cleared on every path
/// and every failure produces an error notification.
pub async fn run_extract<T, S>(
    client: &ExtractionClient<T>,
    session: &mut Session<S>,
    raw: &str,
) -> Result<ExtractedVideo, ExtractError>
where
    T: Transport,
    S: Surface,
{
    let url = match normalize_input(raw) {
        Ok(url) => url,
        Err(e) => {
            session.notify(Notification::error(e.to_string()));
            return Err(e);
        }
    };

    session.apply(UiIntent::Begin);
    let outcome = client.extract(&url).await;
    match &outcome {
        Ok(video) => {
            session.apply(UiIntent::Extracted {
                video_url: video.video_url.clone(),
            });
            session.notify(Notification::info("Success! Backend extracted the URL."));
        }
        Err(e) => session.notify(Notification::error(e.to_string())),
    }
    session.apply(UiIntent::Finish);
    outcome
}

/// Quick-test cycle. Returns the winning hit, or `None` when every
/// candidate failed; exhaustion is silent.
pub async fn run_probe<T, S>(
    transport: &T,
    endpoints: &[ProbeEndpoint],
    display_budget: usize,
    session: &mut Session<S>,
    raw: &str,
) -> Result<Option<probe::ProbeHit>, ExtractError>
where
    T: Transport + ?Sized,
    S: Surface,
{
    let url = match normalize_input(raw) {
        Ok(url) => url,
        Err(e) => {
            session.notify(Notification::error(e.to_string()));
            return Err(e);
        }
    };

    session.apply(UiIntent::Begin);
    let candidates = probe::build_candidates(&url, endpoints);
    for candidate in &candidates {
        let Some(hit) = probe::attempt(transport, candidate).await else {
            // Loading clears after every failed attempt too.
            session.apply(UiIntent::Finish);
            continue;
        };
        session.apply(UiIntent::ProbeText(probe::truncate_for_display(
            &hit.body,
            display_budget,
        )));
        session.apply(UiIntent::Finish);
        session.notify(Notification::info(format!(
            "Quick test returned data from {}.",
            hit.endpoint
        )));
        return Ok(Some(hit));
    }
    session.apply(UiIntent::Finish);
    Ok(None)
}
