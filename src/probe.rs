//! Quick-test probing of public oEmbed endpoints.
//!
//! Nothing here is part of the backend contract. Candidates are tried in
//! order and the first 2xx body wins; every failure is logged and skipped.

use url::Url;

use crate::error::ConfigError;
use crate::transport::Transport;

pub const OEMBED_URL: &str = "https://api.instagram.com/oembed";
pub const ALLORIGINS_RAW: &str = "https://api.allorigins.win/raw?url=";
pub const TRUNCATION_MARKER: &str = "\n\n(...truncated...)";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeEndpoint {
    /// The oEmbed query is URL-encoded and appended to `prefix`.
    Proxy { prefix: String },
    /// The oEmbed query itself.
    Direct,
}

impl ProbeEndpoint {
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::Proxy {
                prefix: ALLORIGINS_RAW.to_string(),
            },
            Self::Direct,
        ]
    }

    pub fn proxy(prefix: &str) -> Result<Self, ConfigError> {
        let parsed =
            Url::parse(prefix).map_err(|_| ConfigError::InvalidProxy(prefix.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidProxy(prefix.to_string()));
        }
        Ok(Self::Proxy {
            prefix: prefix.to_string(),
        })
    }

    pub fn candidate(&self, oembed: &Url) -> Option<Url> {
        match self {
            Self::Direct => Some(oembed.clone()),
            Self::Proxy { prefix } => {
                let encoded: String =
                    url::form_urlencoded::byte_serialize(oembed.as_str().as_bytes()).collect();
                Url::parse(&format!("{}{}", prefix, encoded)).ok()
            }
        }
    }
}

/// `https://api.instagram.com/oembed?url=<reel>`
pub fn oembed_query(reel_url: &str) -> Option<Url> {
    Url::parse_with_params(OEMBED_URL, &[("url", reel_url)]).ok()
}

pub fn build_candidates(reel_url: &str, endpoints: &[ProbeEndpoint]) -> Vec<Url> {
    let Some(oembed) = oembed_query(reel_url) else {
        return Vec::new();
    };
    endpoints
        .iter()
        .filter_map(|e| e.candidate(&oembed))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeHit {
    pub endpoint: Url,
    pub body: String,
}

pub async fn first_success<T>(transport: &T, candidates: &[Url]) -> Option<ProbeHit>
where
    T: Transport + ?Sized,
{
    for candidate in candidates {
        if let Some(hit) = attempt(transport, candidate).await {
            return Some(hit);
        }
    }
    None
}

/// One GET against one candidate. Failures are logged and come back as
/// `None`.
pub async fn attempt<T>(transport: &T, candidate: &Url) -> Option<ProbeHit>
where
    T: Transport + ?Sized,
{
    tracing::info!(endpoint = %candidate, "trying probe endpoint");
    match transport.get(candidate).await {
        Ok(resp) if resp.is_success() => {
            tracing::debug!(
                endpoint = %candidate,
                head = %truncate_for_display(&resp.body, 200),
                "probe endpoint answered"
            );
            Some(ProbeHit {
                endpoint: candidate.clone(),
                body: resp.body,
            })
        }
        Ok(resp) => {
            tracing::warn!(endpoint = %candidate, status = resp.status, "non-OK status, trying next");
            None
        }
        Err(e) => {
            tracing::warn!(endpoint = %candidate, error = %e, "probe endpoint failed");
            None
        }
    }
}

/// Keep the first `budget` characters, appending [`TRUNCATION_MARKER`] when
/// anything was cut.
pub fn truncate_for_display(text: &str, budget: usize) -> String {
    match text.char_indices().nth(budget) {
        Some((cut, _)) => format!("{}{}", &text[..cut], TRUNCATION_MARKER),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::transport::fake::{Call, FakeTransport};

    const REEL: &str = "https://www.instagram.com/reel/Cabc123/";

    fn urls(list: &[&str]) -> Vec<Url> {
        list.iter().map(|u| Url::parse(u).unwrap()).collect()
    }

    #[test]
    fn proxy_candidate_encodes_oembed_query() {
        let candidates = build_candidates(REEL, &ProbeEndpoint::defaults());
        assert_eq!(candidates.len(), 2);

        let proxied = candidates[0].as_str();
        assert!(proxied.starts_with(ALLORIGINS_RAW));
        let (_, inner) = candidates[0]
            .query_pairs()
            .find(|(k, _)| k == "url")
            .unwrap();
        let inner = Url::parse(&inner).unwrap();
        assert_eq!(inner.host_str(), Some("api.instagram.com"));
        assert_eq!(
            inner.query_pairs().find(|(k, _)| k == "url").unwrap().1,
            REEL
        );

        assert_eq!(candidates[1], oembed_query(REEL).unwrap());
    }

    #[test]
    fn proxy_rejects_non_http_prefix() {
        assert!(ProbeEndpoint::proxy("ftp://x/?u=").is_err());
        assert!(ProbeEndpoint::proxy("not a url").is_err());
    }

    #[tokio::test]
    async fn first_failure_skipped_and_iteration_stops() {
        let transport = FakeTransport::new()
            .reply(500, "nope")
            .reply(200, "hello")
            .reply(200, "third");
        let candidates = urls(&["https://a/", "https://b/", "https://c/"]);

        let hit = first_success(&transport, &candidates).await.unwrap();
        assert_eq!(hit.body, "hello");
        assert_eq!(hit.endpoint.as_str(), "https://b/");
        assert_eq!(
            transport.calls(),
            vec![
                Call::Get { url: "https://a/".into() },
                Call::Get { url: "https://b/".into() },
            ]
        );
    }

    #[tokio::test]
    async fn transport_errors_are_swallowed() {
        let transport = FakeTransport::new()
            .fail(TransportError::Connect("refused".into()))
            .reply(200, "ok");
        let hit = first_success(&transport, &urls(&["https://a/", "https://b/"])).await;
        assert_eq!(hit.map(|h| h.body).as_deref(), Some("ok"));
    }

    #[tokio::test]
    async fn exhaustion_returns_none() {
        let transport = FakeTransport::new().reply(404, "").reply(503, "");
        assert!(first_success(&transport, &urls(&["https://a/", "https://b/"]))
            .await
            .is_none());
    }

    #[test]
    fn truncation_appends_marker() {
        let text = "x".repeat(250);
        let shown = truncate_for_display(&text, 200);
        assert_eq!(shown.len(), 200 + TRUNCATION_MARKER.len());
        assert!(shown.ends_with(TRUNCATION_MARKER));
    }

    #[test]
    fn short_text_untouched() {
        assert_eq!(truncate_for_display("hello", 200), "hello");
        assert_eq!(truncate_for_display(&"y".repeat(200), 200), "y".repeat(200));
    }

    #[test]
    fn truncation_counts_characters() {
        let shown = truncate_for_display("ééééé", 3);
        assert_eq!(shown, format!("ééé{}", TRUNCATION_MARKER));
    }
}
