//! Google Gemini API provider.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::error::AskwebError;
use crate::models::GoogleModel;
use crate::types::*;

use super::http::shared_client;
use super::{ModelProvider, ProviderRequest, ProviderResponse};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub struct GoogleProvider {
    model: GoogleModel,
    api_key: String,
    base_url: String,
}

impl GoogleProvider {
    pub fn new(model: GoogleModel, api_key: String) -> Self {
        Self {
            model,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Point the provider at a different endpoint (proxies, tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn build_request_body(&self, request: &ProviderRequest) -> Value {
        let mut system_texts = Vec::new();
        let mut contents: Vec<Value> = Vec::new();
        let mut last_was_tool_result = false;

        for msg in &request.messages {
            match msg.role {
                Role::System => system_texts.push(msg.text()),
                Role::User => {
                    contents.push(json!({
                        "role": "user",
                        "parts": [{"text": msg.text()}],
                    }));
                }
                Role::Assistant => {
                    let parts = model_parts(&msg.content);
                    if !parts.is_empty() {
                        contents.push(json!({ "role": "model", "parts": parts }));
                    }
                }
                Role::Tool => {
                    let mut parts: Vec<Value> = msg
                        .content
                        .iter()
                        .filter_map(|part| match part {
                            ContentPart::ToolResult(tr) => Some(json!({
                                "functionResponse": {
                                    "name": tr.tool_name,
                                    "response": function_response_payload(&tr.result),
                                }
                            })),
                            _ => None,
                        })
                        .collect();
                    if parts.is_empty() {
                        continue;
                    }
                    // Every response to one model turn's calls goes in a single user turn.
                    if last_was_tool_result {
                        if let Some(prev) = contents
                            .last_mut()
                            .and_then(|c| c.get_mut("parts"))
                            .and_then(Value::as_array_mut)
                        {
                            prev.append(&mut parts);
                            continue;
                        }
                    }
                    contents.push(json!({ "role": "user", "parts": parts }));
                    last_was_tool_result = true;
                    continue;
                }
            }
            last_was_tool_result = false;
        }

        let mut body = Map::new();
        body.insert("contents".into(), Value::Array(contents));

        if !system_texts.is_empty() {
            body.insert(
                "systemInstruction".into(),
                json!({ "parts": [{ "text": system_texts.join("\n\n") }] }),
            );
        }

        let mut gen_config = Map::new();
        if let Some(max) = request.settings.max_tokens {
            gen_config.insert("maxOutputTokens".into(), max.into());
        }
        if let Some(temp) = request.settings.temperature {
            gen_config.insert("temperature".into(), temp.into());
        }
        if let Some(top_p) = request.settings.top_p {
            gen_config.insert("topP".into(), top_p.into());
        }
        if let Some(top_k) = request.settings.top_k {
            gen_config.insert("topK".into(), top_k.into());
        }
        if let Some(ref stops) = request.settings.stop_sequences {
            gen_config.insert("stopSequences".into(), json!(stops));
        }
        if !gen_config.is_empty() {
            body.insert("generationConfig".into(), Value::Object(gen_config));
        }

        if let Some(ref tools) = request.tools {
            if !tools.is_empty() {
                let fn_decls: Vec<Value> = tools
                    .iter()
                    .map(|t| {
                        json!({
                            "name": t.name,
                            "description": t.description,
                            "parameters": t.parameters,
                        })
                    })
                    .collect();
                body.insert(
                    "tools".into(),
                    json!([{ "functionDeclarations": fn_decls }]),
                );
            }
        }

        Value::Object(body)
    }
}

#[async_trait]
impl ModelProvider for GoogleProvider {
    fn provider_name(&self) -> &str {
        "google"
    }

    fn model_id(&self) -> &str {
        self.model.as_str()
    }

    async fn generate_text(&self, request: &ProviderRequest) -> Result<ProviderResponse, AskwebError> {
        let body = self.build_request_body(request);
        let url = format!(
            "{}/models/{}:generateContent",
            self.base_url,
            self.model.as_str()
        );

        debug!(model = self.model.as_str(), messages = request.messages.len(), "Google generate_text");

        let resp = shared_client()
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status().as_u16();
        if status != 200 {
            let body_text = resp.text().await.unwrap_or_default();
            return Err(super::http::status_to_error(status, &body_text));
        }

        let data: GeminiResponse = resp.json().await?;
        parse_response(data)
    }
}

fn parse_response(data: GeminiResponse) -> Result<ProviderResponse, AskwebError> {
    let Some(candidate) = data.candidates.into_iter().next() else {
        let reason = data
            .prompt_feedback
            .and_then(|f| f.block_reason)
            .unwrap_or_else(|| "no candidates returned".to_string());
        return Err(AskwebError::Provider {
            provider: "google".into(),
            message: format!("Gemini returned no answer: {reason}"),
        });
    };

    let mut content = Vec::new();
    let mut tool_calls = Vec::new();

    for part in candidate.content.parts {
        if let Some(text) = part.text {
            if part.thought.unwrap_or(false) {
                content.push(ContentPart::Thinking { text });
            } else {
                content.push(ContentPart::Text { text });
            }
        }
        if let Some(fc) = part.function_call {
            tool_calls.push(AgentToolCall {
                id: uuid::Uuid::new_v4().to_string(),
                name: fc.name,
                arguments: fc.args.unwrap_or_else(|| Value::Object(Map::new())),
            });
        }
    }

    if tool_calls.is_empty() && !content.iter().any(is_answer_text) {
        let reason = candidate
            .finish_reason
            .unwrap_or_else(|| "no content".to_string());
        return Err(AskwebError::Provider {
            provider: "google".into(),
            message: format!("Gemini returned an empty answer: {reason}"),
        });
    }

    let finish_reason = if !tool_calls.is_empty() {
        Some(FinishReason::ToolCalls)
    } else {
        match candidate.finish_reason.as_deref() {
            Some("STOP") => Some(FinishReason::Stop),
            Some("MAX_TOKENS") => Some(FinishReason::Length),
            Some("SAFETY") | Some("RECITATION") | Some("BLOCKLIST") => {
                Some(FinishReason::ContentFilter)
            }
            Some(_) => Some(FinishReason::Error),
            None => None,
        }
    };

    let usage = data
        .usage_metadata
        .map(|u| Usage {
            input_tokens: u.prompt_token_count,
            output_tokens: u.candidates_token_count,
            total_tokens: u.total_token_count,
            reasoning_tokens: u.thoughts_token_count,
        })
        .unwrap_or_default();

    Ok(ProviderResponse {
        content,
        tool_calls,
        usage,
        finish_reason,
    })
}

fn is_answer_text(part: &ContentPart) -> bool {
    matches!(part, ContentPart::Text { text } if !text.trim().is_empty())
}

fn model_parts(content: &[ContentPart]) -> Vec<Value> {
    content
        .iter()
        .filter_map(|part| match part {
            ContentPart::Text { text } if !text.is_empty() => Some(json!({ "text": text })),
            ContentPart::ToolCall(tc) => Some(json!({
                "functionCall": { "name": tc.name, "args": tc.arguments }
            })),
            _ => None,
        })
        .collect()
}

// functionResponse.response must be a JSON object.
fn function_response_payload(result: &Value) -> Value {
    match result {
        Value::Object(_) => result.clone(),
        other => json!({ "result": other }),
    }
}

// Internal Gemini response types

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    usage_metadata: Option<GeminiUsage>,
    prompt_feedback: Option<GeminiPromptFeedback>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: GeminiContent,
    finish_reason: Option<String>,
}

#[derive(Deserialize, Default)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPart {
    text: Option<String>,
    thought: Option<bool>,
    function_call: Option<GeminiFunctionCall>,
}

#[derive(Deserialize)]
struct GeminiFunctionCall {
    name: String,
    args: Option<Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsage {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    total_token_count: u32,
    thoughts_token_count: Option<u32>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPromptFeedback {
    block_reason: Option<String>,
}
