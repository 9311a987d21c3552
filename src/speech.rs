//! Speech synthesis for the motivational quote. Playback is left to the caller.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::json;
use tracing::{info, warn};

use crate::error::{PricingError, Result};
use crate::gemini::GeminiClient;
use crate::i18n::Language;

pub const DEFAULT_SAMPLE_RATE: u32 = 24_000;

/// Mono signed 16-bit PCM.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechClip {
    pub sample_rate: u32,
    pub samples: Vec<i16>,
}

impl SpeechClip {
    pub fn duration_secs(&self) -> f32 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f32 / self.sample_rate as f32
    }
}

pub trait Speaker: Send + Sync {
    fn speak(&self, text: &str, language: Language) -> Result<SpeechClip>;
}

pub(crate) fn speech_prompt(quote: &str, language: Language) -> String {
    match language {
        Language::En => format!("Read this encouraging quote for an entrepreneur: \"{quote}\""),
        Language::Ar => format!("اقرأ هذه الحكمة المشجعة لرائد أعمال بصوت واثق: \"{quote}\""),
    }
}

/// Reads `rate=NNNN` out of a mime type such as `audio/L16;codec=pcm;rate=24000`.
fn sample_rate(mime_type: &str) -> u32 {
    mime_type
        .split(';')
        .filter_map(|param| param.trim().strip_prefix("rate="))
        .find_map(|rate| rate.parse().ok())
        .unwrap_or(DEFAULT_SAMPLE_RATE)
}

pub(crate) fn decode_pcm(data: &str, mime_type: &str) -> Result<SpeechClip> {
    let bytes = STANDARD
        .decode(data.trim())
        .map_err(|e| PricingError::SpeechUnavailable(format!("bad audio payload: {e}")))?;
    let samples = bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    Ok(SpeechClip {
        sample_rate: sample_rate(mime_type),
        samples,
    })
}

impl Speaker for GeminiClient {
    fn speak(&self, text: &str, language: Language) -> Result<SpeechClip> {
        let body = json!({
            "contents": [{ "parts": [{ "text": speech_prompt(text, language) }] }],
            "generationConfig": {
                "responseModalities": ["AUDIO"],
                "speechConfig": {
                    "voiceConfig": { "prebuiltVoiceConfig": { "voiceName": self.voice } }
                },
            },
        });
        let audio = self
            .generate_inline(&self.speech_model, &body)
            .map_err(|e| {
                warn!(error = %e, "speech request failed");
                PricingError::SpeechUnavailable(e)
            })?;
        let clip = decode_pcm(&audio.data, &audio.mime_type)?;
        info!(secs = clip.duration_secs(), "speech clip received");
        Ok(clip)
    }
}
