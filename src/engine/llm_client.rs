use reqwest::blocking::{Client, Response};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::AppConfig;
use crate::engine::error::GenerationFailure;

pub trait TextGenerator: Send {
    fn complete(&self, prompt: &str) -> Result<String, GenerationFailure>;

    fn test_connection(&self) -> Result<String, GenerationFailure> {
        Ok("Connection check not available for this service".to_string())
    }
}

pub trait SpeechSynthesizer: Send {
    /// Encoded audio (MP3) for the given text.
    fn synthesize(&self, text: &str) -> Result<Vec<u8>, GenerationFailure>;
}

pub trait ImageGenerator: Send {
    /// URL of the generated picture. `None` means the service answered
    /// without one.
    fn generate(&self, prompt: &str) -> Result<Option<String>, GenerationFailure>;

    fn fetch(&self, url: &str) -> Result<Vec<u8>, GenerationFailure>;
}

#[derive(Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
}

#[derive(Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Deserialize)]
pub struct ChatCompletionResponse {
    pub choices: Vec<Choice>,
}

#[derive(Deserialize)]
pub struct Choice {
    pub message: ChatMessageResponse,
}

#[derive(Deserialize)]
pub struct ChatMessageResponse {
    pub content: Option<String>,
}

#[derive(Serialize)]
pub struct SpeechRequest {
    pub model: String,
    pub voice: String,
    pub input: String,
}

#[derive(Serialize)]
pub struct ImageRequest {
    pub model: String,
    pub prompt: String,
    pub size: String,
}

#[derive(Deserialize)]
pub struct ImageResponse {
    #[serde(default)]
    pub data: Vec<ImageData>,
}

#[derive(Deserialize)]
pub struct ImageData {
    pub url: Option<String>,
}

/// OpenAI-compatible client covering chat, speech and images.
#[derive(Clone)]
pub struct OpenAiClient {
    http: Client,
    api_key: Option<String>,
    base_url: String,
    text_model: String,
    max_tokens: u32,
    speech_model: String,
    voice: String,
    image_model: String,
    image_size: String,
}

impl OpenAiClient {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            http: Client::new(),
            api_key: config.api_key(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            text_model: config.text_model.clone(),
            max_tokens: config.max_tokens,
            speech_model: config.speech_model.clone(),
            voice: config.voice.clone(),
            image_model: config.image_model.clone(),
            image_size: config.image_size.clone(),
        }
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint)
    }

    fn key(&self) -> Result<&str, GenerationFailure> {
        self.api_key.as_deref().ok_or(GenerationFailure::MissingApiKey)
    }

    fn post<T: Serialize>(&self, endpoint: &str, body: &T) -> Result<Response, GenerationFailure> {
        let resp = self
            .http
            .post(self.url(endpoint))
            .bearer_auth(self.key()?)
            .json(body)
            .send()?;

        check_status(resp)
    }
}

fn check_status(resp: Response) -> Result<Response, GenerationFailure> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.text().unwrap_or_default();
    warn!(status = status.as_u16(), "generation service returned an error");
    Err(GenerationFailure::Api {
        status: status.as_u16(),
        message: api_error_message(&body),
    })
}

/// `{"error": {"message": ...}}` when the service says why, otherwise the
/// body itself.
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

fn first_message(resp: ChatCompletionResponse) -> Result<String, GenerationFailure> {
    resp.choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| GenerationFailure::InvalidResponse("response contained no message".into()))
}

fn first_url(resp: ImageResponse) -> Option<String> {
    resp.data
        .into_iter()
        .next()
        .and_then(|d| d.url)
        .filter(|url| !url.trim().is_empty())
}

impl TextGenerator for OpenAiClient {
    fn complete(&self, prompt: &str) -> Result<String, GenerationFailure> {
        debug!(model = %self.text_model, prompt_len = prompt.len(), "requesting story segment");

        let req = ChatCompletionRequest {
            model: self.text_model.clone(),
            max_tokens: self.max_tokens,
            messages: vec![ChatMessage {
                role: "user".into(),
                content: prompt.to_string(),
            }],
        };

        let resp = self.post("chat/completions", &req)?.json::<ChatCompletionResponse>()?;
        first_message(resp)
    }

    fn test_connection(&self) -> Result<String, GenerationFailure> {
        let resp = self
            .http
            .get(self.url("models"))
            .bearer_auth(self.key()?)
            .send()?;

        let resp: serde_json::Value = check_status(resp)?.json()?;

        Ok(format!(
            "Connected ({} models available)",
            resp["data"].as_array().map(|a| a.len()).unwrap_or(0)
        ))
    }
}

impl SpeechSynthesizer for OpenAiClient {
    fn synthesize(&self, text: &str) -> Result<Vec<u8>, GenerationFailure> {
        debug!(model = %self.speech_model, voice = %self.voice, "requesting narration");

        let req = SpeechRequest {
            model: self.speech_model.clone(),
            voice: self.voice.clone(),
            input: text.to_string(),
        };

        let bytes = self.post("audio/speech", &req)?.bytes()?;
        Ok(bytes.to_vec())
    }
}

impl ImageGenerator for OpenAiClient {
    fn generate(&self, prompt: &str) -> Result<Option<String>, GenerationFailure> {
        debug!(model = %self.image_model, size = %self.image_size, "requesting illustration");

        let req = ImageRequest {
            model: self.image_model.clone(),
            prompt: prompt.to_string(),
            size: self.image_size.clone(),
        };

        let resp = self.post("images/generations", &req)?.json::<ImageResponse>()?;
        Ok(first_url(resp))
    }

    fn fetch(&self, url: &str) -> Result<Vec<u8>, GenerationFailure> {
        let resp = check_status(self.http.get(url).send()?)?;
        Ok(resp.bytes()?.to_vec())
    }
}
