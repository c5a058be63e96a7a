use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One chart analysis request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartRequest {
    pub request_id: Uuid,
    /// Base64-encoded JPEG, already resized by the transport layer.
    pub image_b64_jpeg: String,
    pub symbol_hint: Option<String>,
    pub timeframe_hint: Option<String>,
}

impl ChartRequest {
    pub fn new(image_b64_jpeg: String) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            image_b64_jpeg,
            symbol_hint: None,
            timeframe_hint: None,
        }
    }
}

/// The record we ask the model to emit. Only used to embed a JSON schema in
/// the prompt; actual responses go through the loose extractor, since the
/// model does not reliably honor the schema.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ChartReadout {
    /// One of "Bullish", "Bearish", "Neutral".
    pub market_state: String,
    /// One of "BUY", "SELL", "WAIT".
    pub signal: String,
    /// Integer 0-100.
    pub confidence: i64,
    /// A price or a low-high range, e.g. "4420.0 - 4424.0".
    pub entry_zone: String,
    pub tp1: String,
    pub tp2: String,
    pub tp3: String,
    pub sl: String,
    /// Short conditions to watch when no trade is active.
    pub triggers: Vec<String>,
    pub note: String,
}

#[derive(Debug, thiserror::Error)]
pub enum VisionError {
    #[error("API request failed: {0}")]
    Api(String),
    #[error("HTTP status {status}: {body}")]
    HttpStatus { status: u16, body: String },
    #[error("Timeout")]
    Timeout,
    #[error("model returned no text output")]
    EmptyOutput,
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
