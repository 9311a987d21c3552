//! Minimal client for the Gemini `generateContent` REST endpoint.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

const ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: Client,
    api_key: Option<String>,
    pub(crate) estimate_model: String,
    pub(crate) speech_model: String,
    pub(crate) voice: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    text: Option<String>,
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct InlineData {
    #[serde(default)]
    pub mime_type: String,
    pub data: String,
}

impl GeminiClient {
    pub fn new(
        api_key: Option<String>,
        estimate_model: impl Into<String>,
        speech_model: impl Into<String>,
        voice: impl Into<String>,
    ) -> Result<Self, String> {
        let http = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| e.to_string())?;
        Ok(Self {
            http,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            estimate_model: estimate_model.into(),
            speech_model: speech_model.into(),
            voice: voice.into(),
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn generate(&self, model: &str, body: &Value) -> Result<Vec<Part>, String> {
        let key = self.api_key.as_deref().ok_or("no API key configured")?;
        debug!(%model, "calling generateContent");
        let response: GenerateResponse = self
            .http
            .post(format!("{ENDPOINT}/{model}:generateContent"))
            .header("x-goog-api-key", key)
            .json(body)
            .send()
            .and_then(|r| r.error_for_status())
            .and_then(|r| r.json())
            .map_err(|e| e.to_string())?;

        response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts)
            .filter(|parts| !parts.is_empty())
            .ok_or_else(|| "response had no content".to_string())
    }

    /// First text part of the answer.
    pub(crate) fn generate_text(&self, model: &str, body: &Value) -> Result<String, String> {
        self.generate(model, body)?
            .into_iter()
            .find_map(|p| p.text)
            .ok_or_else(|| "response had no text part".to_string())
    }

    /// First inline binary part of the answer.
    pub(crate) fn generate_inline(&self, model: &str, body: &Value) -> Result<InlineData, String> {
        self.generate(model, body)?
            .into_iter()
            .find_map(|p| p.inline_data)
            .ok_or_else(|| "response had no inline data".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_text_and_inline_parts() {
        let json = r#"{"candidates":[{"content":{"parts":[
            {"text":"hello"},
            {"inlineData":{"mimeType":"audio/L16;rate=24000","data":"AAA="}}
        ]}}]}"#;
        let response: GenerateResponse = serde_json::from_str(json).unwrap();
        let parts = &response.candidates[0].content.as_ref().unwrap().parts;
        assert_eq!(parts[0].text.as_deref(), Some("hello"));
        assert_eq!(parts[1].inline_data.as_ref().unwrap().data, "AAA=");
    }

    #[test]
    fn missing_key_fails_before_any_request() {
        let client = GeminiClient::new(Some("  ".into()), "m", "t", "v").unwrap();
        assert!(!client.has_api_key());
        let err = client.generate_text("m", &Value::Null).unwrap_err();
        assert_eq!(err, "no API key configured");
    }
}
