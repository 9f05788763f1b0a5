use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionRequest {
    pub url: String,
}

impl ExtractionRequest {
    /// JSON body `{"url": ...}`.
    pub fn to_body(&self) -> Vec<u8> {
        json!({ "url": self.url }).to_string().into_bytes()
    }
}

/// Backend reply. Every field is optional on the wire; `success` may be any
/// JSON value and is read with JavaScript truthiness. Deserializing goes
/// through [`ExtractionResponse::from_value`], so both paths agree.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(from = "Value")]
pub struct ExtractionResponse {
    pub success: bool,
    pub video_url: Option<String>,
    pub error: Option<String>,
    pub shortcode: Option<String>,
    pub timestamp: Option<i64>,
}

impl ExtractionResponse {
    /// Read a response out of an arbitrary JSON value. Fields of the wrong
    /// type and empty strings are treated as absent rather than failing the
    /// whole body.
    pub fn from_value(value: &Value) -> Self {
        let string_field = |key: &str| {
            value
                .get(key)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        Self {
            success: value.get("success").map(is_truthy).unwrap_or(false),
            video_url: string_field("video_url"),
            error: string_field("error"),
            shortcode: string_field("shortcode"),
            timestamp: value.get("timestamp").and_then(Value::as_i64),
        }
    }
}

impl From<Value> for ExtractionResponse {
    fn from(value: Value) -> Self {
        Self::from_value(&value)
    }
}

pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
