use crate::types::{ChartReadout, ChartRequest, VisionError};
use reqwest::Client;
use serde_json::json;
use std::time::Duration;
use tokio::time::sleep;
use tracing::instrument;

const OPENAI_RESPONSES_URL: &str = "https://api.openai.com/v1/responses";

pub struct VisionClient {
    client: Client,
    api_key: String,
    model: String,
    max_retries: u32,
}

impl VisionClient {
    pub fn new(
        api_key: String,
        model: String,
        timeout_ms: u64,
        max_retries: u32,
    ) -> Result<Self, VisionError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .map_err(|e| VisionError::Api(e.to_string()))?;

        Ok(Self {
            client,
            api_key,
            model,
            max_retries,
        })
    }

    fn build_prompt() -> Result<String, VisionError> {
        let schema = schemars::schema_for!(ChartReadout);
        let schema_json = serde_json::to_string_pretty(&schema)?;

        Ok(format!(
            r#"You are a trading assistant analyzing a chart screenshot.
Return STRICT JSON ONLY (no markdown, no extra text) conforming to the schema below.

JSON Schema:
{schema_json}

Rules:
- If the chart is unclear, still give a CONDITIONAL setup and lower confidence.
- Use visible prices from the chart when possible.
- Keep TP/SL realistic relative to entry.
- Do NOT mention policy, do NOT mention that you are an AI.
"#
        ))
    }

    /// Collects the text blocks of a Responses API payload.
    fn extract_output_text(body: &serde_json::Value) -> Result<String, VisionError> {
        let mut out = String::new();
        if let Some(items) = body.get("output").and_then(|o| o.as_array()) {
            for item in items {
                if let Some(contents) = item.get("content").and_then(|c| c.as_array()) {
                    for c in contents {
                        let is_text = matches!(
                            c.get("type").and_then(|t| t.as_str()),
                            Some("output_text") | Some("text")
                        );
                        if is_text {
                            if let Some(text) = c.get("text").and_then(|t| t.as_str()) {
                                out.push_str(text);
                            }
                        }
                    }
                }
            }
        }
        let out = out.trim().to_string();
        if out.is_empty() {
            return Err(VisionError::EmptyOutput);
        }
        Ok(out)
    }

    /// Posts the chart image and returns the raw model text. The caller runs
    /// the extractor over it; nothing is parsed here beyond the envelope.
    #[instrument(skip(self, request), fields(request_id = %request.request_id))]
    pub async fn analyze_chart(&self, request: &ChartRequest) -> Result<String, VisionError> {
        let prompt = Self::build_prompt()?;
        let payload = json!({
            "model": self.model,
            "input": [
                {
                    "role": "user",
                    "content": [
                        {"type": "input_text", "text": prompt},
                        {
                            "type": "input_image",
                            "image_url": format!("data:image/jpeg;base64,{}", request.image_b64_jpeg)
                        }
                    ],
                }
            ],
            "max_output_tokens": 500,
        });

        let mut attempt = 0u32;
        loop {
            let send_result = self
                .client
                .post(OPENAI_RESPONSES_URL)
                .bearer_auth(&self.api_key)
                .header("content-type", "application/json")
                .json(&payload)
                .send()
                .await;

            match send_result {
                Ok(response) => {
                    let status = response.status();
                    if !status.is_success() {
                        let body = response.text().await.unwrap_or_default();
                        if status.as_u16() == 429 && attempt < self.max_retries {
                            attempt += 1;
                            sleep(Duration::from_millis(150 * u64::from(attempt))).await;
                            continue;
                        }
                        return Err(VisionError::HttpStatus {
                            status: status.as_u16(),
                            body,
                        });
                    }

                    let body: serde_json::Value = response
                        .json()
                        .await
                        .map_err(|e| VisionError::Api(e.to_string()))?;
                    return Self::extract_output_text(&body);
                }
                Err(e) => {
                    if attempt < self.max_retries {
                        attempt += 1;
                        sleep(Duration::from_millis(150 * u64::from(attempt))).await;
                        continue;
                    }
                    if e.is_timeout() {
                        return Err(VisionError::Timeout);
                    }
                    return Err(VisionError::Api(e.to_string()));
                }
            }
        }
    }
}
