//! Remix suggestion client.
//!
//! Asks a generative-language-model service for creative remix ideas
//! given the band names and the song's file name. The boundary is
//! deliberately fault-tolerant: a missing key, a network failure, or a
//! bad response all collapse into friendly fallback text, so the call
//! never surfaces an error to the host application.

use serde::{Deserialize, Serialize};

use crate::error::ServiceError;

/// Environment variable holding the service key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";
/// Model queried for remix ideas.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

const DISABLED_FALLBACK: &str = "The suggestion service is switched off because no API key is \
     configured. Check your settings to enable remix ideas.";
const FAILURE_FALLBACK: &str = "Something went wrong while fetching remix ideas. This may be a \
     connection or configuration problem — please try again.";

pub struct SuggestionClient {
    http: reqwest::Client,
    api_key: Option<String>,
    model: String,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f64,
    #[serde(rename = "topP")]
    top_p: f64,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

impl SuggestionClient {
    pub fn new(api_key: Option<String>) -> Self {
        SuggestionClient {
            http: reqwest::Client::new(),
            api_key: api_key.filter(|k| !k.is_empty()),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Read the key from `GEMINI_API_KEY`. An absent key does not fail
    /// construction; it only switches the client to fallback text.
    pub fn from_env() -> Self {
        SuggestionClient::new(std::env::var(API_KEY_ENV).ok())
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Fetch three remix ideas. Infallible at this boundary: every
    /// failure path returns fallback text instead of an error.
    pub async fn remix_ideas(&self, track_names: &[String], file_name: &str) -> String {
        if !self.is_configured() {
            return DISABLED_FALLBACK.to_string();
        }
        match self.request_ideas(track_names, file_name).await {
            Ok(text) => text,
            Err(e) => {
                log::warn!("suggestion request failed: {e}");
                FAILURE_FALLBACK.to_string()
            }
        }
    }

    async fn request_ideas(
        &self,
        track_names: &[String],
        file_name: &str,
    ) -> Result<String, ServiceError> {
        let key = self.api_key.as_deref().ok_or(ServiceError::MissingApiKey)?;
        let prompt = build_prompt(track_names, file_name);
        let body = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: &prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.9,
                top_p: 0.95,
            },
        };

        let url = format!("{API_BASE}/{}:generateContent?key={key}", self.model);
        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ServiceError::Network {
                detail: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ServiceError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateResponse =
            response.json().await.map_err(|e| ServiceError::Network {
                detail: e.to_string(),
            })?;
        extract_text(parsed)
    }
}

fn extract_text(response: GenerateResponse) -> Result<String, ServiceError> {
    let text: String = response
        .candidates
        .into_iter()
        .filter_map(|c| c.content)
        .flat_map(|c| c.parts)
        .map(|p| p.text)
        .collect();
    if text.trim().is_empty() {
        Err(ServiceError::EmptyResponse)
    } else {
        Ok(text)
    }
}

fn build_prompt(track_names: &[String], file_name: &str) -> String {
    let bands = track_names.join(", ");
    format!(
        "You are a warm, encouraging expert music producer speaking to a \
         beginner.\n\n\
         The app is a 4-band audio editor: it does NOT separate instruments, \
         but it gives real, precise control over frequency ranges of the song \
         \"{file_name}\". The controllable bands are named: {bands}.\n\
         They cover, in order: the deepest sub-bass rumble, the punch of the \
         main drum hits, the presence range of the lead voice, and the \
         highest sparkle and cymbal air. Each band also has its own reverb \
         send.\n\n\
         Suggest three simple, fun, creative remix ideas. For each one, \
         explain in plain language which bands to raise or lower (and where \
         a touch of reverb helps) and how that changes the feel of the song. \
         Keep the tone playful and empowering."
    )
}
