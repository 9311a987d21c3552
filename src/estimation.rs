//! The estimation collaborator: free text in, suggested materials out.

use schemars::schema_for;
use serde_json::json;
use tracing::{info, warn};

use crate::error::{PricingError, Result};
use crate::gemini::GeminiClient;
use crate::suggestion::EstimatePayload;

pub trait Estimator: Send + Sync {
    fn estimate(&self, description: &str) -> Result<EstimatePayload>;
}

pub(crate) fn estimate_prompt(description: &str) -> String {
    let schema = serde_json::to_string(&schema_for!(EstimatePayload)).unwrap_or_default();
    format!(
        "Provide a structured cost estimation for a project: \"{description}\".\n\
         Include typical materials with estimated unit prices and quantities.\n\
         Estimate labor hours.\n\
         Suggest a standard industry profit margin percentage and a typical tax rate \
         for this specific industry and project type.\n\
         Provide a 'context' field explaining the reasoning behind the chosen margin and \
         tax rates.\n\
         Answer with a single JSON object matching this JSON Schema:\n{schema}"
    )
}

/// Strips a Markdown code fence if the model wrapped its JSON in one.
fn strip_fence(text: &str) -> &str {
    let text = text.trim();
    let Some(inner) = text.strip_prefix("```") else {
        return text;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

pub(crate) fn parse_payload(text: &str) -> Result<EstimatePayload> {
    let payload: EstimatePayload = serde_json::from_str(strip_fence(text))
        .map_err(|e| PricingError::EstimationUnavailable(format!("malformed answer: {e}")))?;
    let empty = payload.materials.is_empty()
        && payload.suggested_margin.is_none()
        && payload.suggested_tax.is_none();
    if empty {
        return Err(PricingError::EstimationUnavailable("empty answer".into()));
    }
    Ok(payload)
}

impl Estimator for GeminiClient {
    fn estimate(&self, description: &str) -> Result<EstimatePayload> {
        let description = description.trim();
        if description.is_empty() {
            return Err(PricingError::EstimationUnavailable("empty description".into()));
        }
        let body = json!({
            "contents": [{ "parts": [{ "text": estimate_prompt(description) }] }],
            "generationConfig": { "responseMimeType": "application/json" },
        });
        let text = self
            .generate_text(&self.estimate_model, &body)
            .map_err(|e| {
                warn!(error = %e, "estimation request failed");
                PricingError::EstimationUnavailable(e)
            })?;
        let payload = parse_payload(&text)?;
        info!(materials = payload.materials.len(), "estimation received");
        Ok(payload)
    }
}
