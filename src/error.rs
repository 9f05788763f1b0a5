// ── Extraction errors ────────────────────────────────────────────────────────

/// Failure of one extraction cycle. `Display` is the message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractError {
    #[error("Please paste an Instagram URL in the input field.")]
    EmptyInput,
    #[error("Backend response was not JSON (HTTP {status}).")]
    MalformedResponse { status: u16, body: String },
    #[error("Backend error: {0}")]
    BackendError(String),
    #[error("Backend connection failed: {0}")]
    ConnectionFailure(String),
}

impl ExtractError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::EmptyInput => "empty_input",
            Self::MalformedResponse { .. } => "malformed_response",
            Self::BackendError(_) => "backend_error",
            Self::ConnectionFailure(_) => "connection_failure",
        }
    }
}

// ── Transport errors ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("TimeoutError: {0}")]
    Timeout(String),
    #[error("ConnectError: {0}")]
    Connect(String),
    #[error("RequestError: {0}")]
    Request(String),
}

impl From<TransportError> for ExtractError {
    fn from(e: TransportError) -> Self {
        ExtractError::ConnectionFailure(e.to_string())
    }
}

// ── Configuration errors ─────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid backend URL {value:?} from {source_label}: {reason}")]
    InvalidBackendUrl {
        value: String,
        source_label: &'static str,
        reason: url::ParseError,
    },
    #[error("invalid probe proxy {0:?}: must be an absolute http(s) URL prefix")]
    InvalidProxy(String),
    #[error("display budget must be greater than zero")]
    ZeroBudget,
    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

// ── Asset cache errors ───────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("asset {0} not found")]
    NotFound(String),
    #[error("failed to read asset {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("install of cache {cache} failed: {source}")]
    Install {
        cache: String,
        #[source]
        source: Box<CacheError>,
    },
}
