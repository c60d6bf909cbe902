//! HTTP client for the reasoning backend and tolerant response parsing.

use std::time::Duration;

use dealmemo_core::{ExtractionResult, FieldSchema};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;

use crate::directive::build_directive;
use crate::ExtractionError;

/// Deterministic-leaning sampling; field extraction is not a creative task.
const TEMPERATURE: f32 = 0.1;
/// Output ceiling to bound cost and truncation risk.
const MAX_TOKENS: u32 = 4096;

const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Connection settings for an OpenAI-compatible chat-completions backend.
/// Identity and authentication are environment-supplied (see the CLI).
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Base URL up to the API root, e.g. `https://api.openai.com/v1`.
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl BackendConfig {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    response_format: ResponseFormat,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// Client for one-shot structured field extraction.
pub struct FieldExtractor {
    client: Client,
    config: BackendConfig,
}

impl FieldExtractor {
    pub fn new(config: BackendConfig) -> Result<Self, ExtractionError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    /// Send normalized document text to the backend and reconcile the
    /// response against `schema`.
    ///
    /// One call, fully awaited before parsing, no internal retry: a failure
    /// propagates as a single terminal error for the request.
    pub async fn extract_fields(
        &self,
        schema: &FieldSchema,
        document_text: &str,
    ) -> Result<ExtractionResult, ExtractionError> {
        let url = format!("{}/chat/completions", self.config.base_url);

        info!(
            chars = document_text.len(),
            schema = schema.name(),
            model = %self.config.model,
            "sending document text to reasoning backend"
        );

        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: build_directive(schema),
                },
                ChatMessage {
                    role: "user",
                    content: format!(
                        "Extract deal information from the following document text:\n\n{document_text}"
                    ),
                },
            ],
            response_format: ResponseFormat {
                format_type: "json_object",
            },
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ExtractionError::Backend {
                status: status.as_u16(),
                body,
            });
        }

        let chat: ChatResponse = response.json().await?;
        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(ExtractionError::EmptyBackendResponse)?;

        parse_extraction(schema, &content)
    }
}

/// Parse backend content into a schema-complete [`ExtractionResult`].
///
/// Two response shapes are tolerated: an object already split into
/// `fields`/`confidence`, or (degenerate fallback) a flat object treated
/// entirely as fields with an empty confidence map. Either way the parsed
/// mapping passes through [`FieldSchema::project`], so the caller always
/// receives exactly the schema key set.
pub fn parse_extraction(
    schema: &FieldSchema,
    content: &str,
) -> Result<ExtractionResult, ExtractionError> {
    let parsed: Value = serde_json::from_str(content)
        .map_err(|e| ExtractionError::MalformedBackendResponse(e.to_string()))?;

    let Value::Object(object) = parsed else {
        return Err(ExtractionError::MalformedBackendResponse(
            "expected a JSON object at the top level".to_string(),
        ));
    };

    let (fields, confidence) = match object.get("fields") {
        Some(Value::Object(fields)) => {
            let confidence = match object.get("confidence") {
                Some(Value::Object(confidence)) => confidence.clone(),
                _ => Map::new(),
            };
            (fields.clone(), confidence)
        }
        _ => (object, Map::new()),
    };

    Ok(schema.project(&fields, &confidence))
}
