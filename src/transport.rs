use async_trait::async_trait;
use url::Url;

use crate::error::{ConfigError, TransportError};

const USER_AGENT: &str = "reel-extractor/0.1";

/// Status and raw body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The only place the crate talks to the network.
#[async_trait]
pub trait Transport: Send + Sync {
    /// POST `body` with `Content-Type: application/json`.
    async fn post_json(&self, url: &Url, body: Vec<u8>) -> Result<RawResponse, TransportError>;

    async fn get(&self, url: &Url) -> Result<RawResponse, TransportError>;
}

// ── reqwest implementation ───────────────────────────────────────────────────

pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// No request timeout is set; the client waits as long as reqwest does.
    pub fn new(insecure: bool) -> Result<Self, ConfigError> {
        let mut builder = reqwest::ClientBuilder::new()
            .redirect(reqwest::redirect::Policy::limited(10))
            .user_agent(USER_AGENT);

        if insecure {
            tracing::warn!("TLS certificate verification disabled");
            builder = builder.danger_accept_invalid_certs(true);
        }

        let client = builder
            .build()
            .map_err(|e| ConfigError::Client(e.to_string()))?;
        Ok(Self { client })
    }

    async fn finish(response: reqwest::Response) -> Result<RawResponse, TransportError> {
        let status = response.status().as_u16();
        let body = response.text().await.map_err(classify)?;
        Ok(RawResponse { status, body })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post_json(&self, url: &Url, body: Vec<u8>) -> Result<RawResponse, TransportError> {
        let response = self
            .client
            .post(url.clone())
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(classify)?;
        Self::finish(response).await
    }

    async fn get(&self, url: &Url) -> Result<RawResponse, TransportError> {
        let response = self.client.get(url.clone()).send().await.map_err(classify)?;
        Self::finish(response).await
    }
}

fn classify(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout(e.to_string())
    } else if e.is_connect() {
        TransportError::Connect(e.to_string())
    } else {
        TransportError::Request(e.to_string())
    }
}

// ── Test double ──────────────────────────────────────────────────────────────
