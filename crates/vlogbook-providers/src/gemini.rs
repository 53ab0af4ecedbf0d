//! Google Gemini provider implementation.
//!
//! One client serves both collaborators: structured JSON generation for
//! [`ContentGenerator`] and audio generation for [`SpeechSynthesizer`].

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use async_trait::async_trait;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::instrument;

use vlogbook_core::model::{GeneratedContent, SelectionAnalysis, SelectionKind};
use vlogbook_core::traits::{ContentGenerator, SpeechAudio, SpeechSynthesizer};

use crate::audio::{pcm16_from_le_bytes, sample_rate_from_mime, DEFAULT_SAMPLE_RATE};
use crate::error::ProviderError;
use crate::payload::{parse_script, parse_selection};
use crate::prompt;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_TTS_MODEL: &str = "gemini-2.5-flash-preview-tts";
pub const DEFAULT_VOICE: &str = "Kore";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Gemini API client.
pub struct GeminiProvider {
    api_key: String,
    base_url: String,
    model: String,
    tts_model: String,
    voice: String,
    temperature: Option<f64>,
    client: reqwest::Client,
}

impl GeminiProvider {
    pub fn new(api_key: &str, base_url: Option<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            api_key: api_key.to_string(),
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            model: DEFAULT_MODEL.to_string(),
            tts_model: DEFAULT_TTS_MODEL.to_string(),
            voice: DEFAULT_VOICE.to_string(),
            temperature: None,
            client,
        })
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_tts_model(mut self, model: impl Into<String>) -> Self {
        self.tts_model = model.into();
        self
    }

    pub fn with_voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = voice.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send a `generateContent` request and return the decoded reply.
    async fn call(
        &self,
        model: &str,
        body: &GeminiRequest,
    ) -> Result<GeminiResponse, ProviderError> {
        let start = Instant::now();
        let response = self
            .client
            .post(format!(
                "{}/v1beta/models/{}:generateContent",
                self.base_url, model
            ))
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout(DEFAULT_TIMEOUT_SECS)
                } else {
                    ProviderError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        if status == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(5)
                .saturating_mul(1000);
            return Err(ProviderError::RateLimited {
                retry_after_ms: retry_after,
            });
        }
        if status == 401 || status == 403 {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::AuthenticationFailed(error_message(body)));
        }
        if status == 404 {
            return Err(ProviderError::ModelNotFound(model.to_string()));
        }
        if status >= 400 {
            let body = response.text().await.unwrap_or_default();
            // An invalid key is reported as a plain 400.
            if body.contains("API_KEY_INVALID") {
                return Err(ProviderError::AuthenticationFailed(error_message(body)));
            }
            return Err(ProviderError::ApiError {
                status,
                message: error_message(body),
            });
        }

        let api_response: GeminiResponse = response.json().await.map_err(|e| {
            ProviderError::MalformedResponse(format!("failed to parse response: {e}"))
        })?;

        if let Some(usage) = &api_response.usage_metadata {
            tracing::debug!(
                model,
                prompt_tokens = usage.prompt_token_count,
                output_tokens = usage.candidates_token_count,
                latency_ms = start.elapsed().as_millis() as u64,
                "gemini call complete"
            );
        }
        Ok(api_response)
    }

    /// Ask the text model for JSON matching `schema` and return the raw text.
    async fn generate_json(
        &self,
        user_prompt: String,
        schema: Value,
    ) -> Result<String, ProviderError> {
        let body = GeminiRequest {
            contents: vec![GeminiContent::user(user_prompt)],
            system_instruction: Some(GeminiContent::system(prompt::SYSTEM_INSTRUCTION)),
            generation_config: GenerationConfig {
                response_mime_type: Some("application/json".into()),
                response_schema: Some(schema),
                temperature: self.temperature,
                ..Default::default()
            },
        };
        let response = self.call(&self.model, &body).await?;
        response
            .first_part()
            .and_then(|part| part.text)
            .filter(|text| !text.trim().is_empty())
            .ok_or(ProviderError::EmptyResponse)
    }
}

/// Pull `error.message` out of a Gemini error body, falling back to the raw body.
fn error_message(body: String) -> String {
    serde_json::from_str::<GeminiError>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<TextPart>,
}

impl GeminiContent {
    fn user(text: impl Into<String>) -> Self {
        Self {
            role: Some("user".into()),
            parts: vec![TextPart { text: text.into() }],
        }
    }

    fn system(text: impl Into<String>) -> Self {
        Self {
            role: None,
            parts: vec![TextPart { text: text.into() }],
        }
    }
}

#[derive(Serialize)]
struct TextPart {
    text: String,
}

#[derive(Serialize, Default)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_modalities: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    speech_config: Option<SpeechConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SpeechConfig {
    voice_config: VoiceConfig,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceConfig {
    prebuilt_voice_config: PrebuiltVoiceConfig,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PrebuiltVoiceConfig {
    voice_name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
}

impl GeminiResponse {
    fn first_part(self) -> Option<ResponsePart> {
        self.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
    }
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    inline_data: Option<InlineData>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    #[serde(default)]
    mime_type: String,
    data: String,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

#[derive(Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Deserialize)]
struct GeminiErrorBody {
    message: String,
}

#[async_trait]
impl ContentGenerator for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    #[instrument(skip(self, source_text), fields(model = %self.model))]
    async fn generate(&self, source_text: &str) -> Result<GeneratedContent> {
        let text = self
            .generate_json(prompt::script_prompt(source_text), prompt::script_schema())
            .await?;
        Ok(parse_script(&text)?)
    }

    #[instrument(skip(self, target_text, instruction), fields(model = %self.model))]
    async fn rewrite(&self, target_text: &str, instruction: &str) -> Result<GeneratedContent> {
        let text = self
            .generate_json(
                prompt::rewrite_prompt(target_text, instruction),
                prompt::script_schema(),
            )
            .await?;
        Ok(parse_script(&text)?)
    }

    #[instrument(skip(self, selection, context), fields(model = %self.model))]
    async fn analyze_selection(
        &self,
        selection: &str,
        context: &str,
        kind: SelectionKind,
    ) -> Result<SelectionAnalysis> {
        let text = self
            .generate_json(
                prompt::selection_prompt(selection, context, kind),
                prompt::selection_schema(kind),
            )
            .await?;
        Ok(parse_selection(&text, kind)?)
    }
}

#[async_trait]
impl SpeechSynthesizer for GeminiProvider {
    #[instrument(skip(self, text), fields(model = %self.tts_model, voice = %self.voice))]
    async fn synthesize(&self, text: &str) -> Result<SpeechAudio> {
        let body = GeminiRequest {
            contents: vec![GeminiContent::user(text)],
            system_instruction: None,
            generation_config: GenerationConfig {
                response_modalities: Some(vec!["AUDIO".into()]),
                speech_config: Some(SpeechConfig {
                    voice_config: VoiceConfig {
                        prebuilt_voice_config: PrebuiltVoiceConfig {
                            voice_name: self.voice.clone(),
                        },
                    },
                }),
                ..Default::default()
            },
        };

        let response = self.call(&self.tts_model, &body).await?;
        let inline = response
            .first_part()
            .and_then(|part| part.inline_data)
            .ok_or(ProviderError::EmptyResponse)?;

        let bytes = base64::engine::general_purpose::STANDARD
            .decode(inline.data.trim())
            .map_err(|e| ProviderError::MalformedResponse(format!("audio is not base64: {e}")))?;

        Ok(SpeechAudio {
            samples: pcm16_from_le_bytes(&bytes),
            sample_rate: sample_rate_from_mime(&inline.mime_type).unwrap_or(DEFAULT_SAMPLE_RATE),
            channels: 1,
        })
    }
}
