//! Client for a pretrained text-classification model served over HTTP
//! (Hugging Face inference API shape). The model is used as a frozen oracle.

use reqwest::blocking::Client;
use serde_json::{json, Value};
use tracing::debug;

use super::{ClassifyError, Label, Sentiment, SentimentClassifier};
use crate::settings::Settings;

/// Classified once during construction to prove the model answers.
const WARMUP_TEXT: &str = "This is fine.";

pub struct ModelClassifier {
    client: Client,
    endpoint: String,
    token: Option<String>,
    max_input_chars: usize,
}

impl ModelClassifier {
    /// Build the client and run one warm-up classification. Any failure here
    /// means the model is unusable for this run.
    pub fn connect(settings: &Settings) -> Result<Self, ClassifyError> {
        let endpoint = settings
            .model_endpoint
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .ok_or_else(|| ClassifyError::Unavailable("no model endpoint configured".into()))?
            .to_string();

        let client = Client::builder().timeout(settings.timeout()).build()?;
        let model = Self {
            client,
            endpoint,
            token: settings.model_token.clone().filter(|t| !t.is_empty()),
            max_input_chars: settings.max_input_chars,
        };

        model
            .classify(WARMUP_TEXT)
            .map_err(|e| ClassifyError::Unavailable(format!("warm-up classification failed: {e}")))?;
        debug!("Sentiment model reachable at {}", model.endpoint);
        Ok(model)
    }
}

impl SentimentClassifier for ModelClassifier {
    fn classify(&self, text: &str) -> Result<Sentiment, ClassifyError> {
        let body = json!({
            "inputs": truncate(text, self.max_input_chars),
            "parameters": { "truncation": true },
        });

        let mut req = self.client.post(&self.endpoint).json(&body);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        let value: Value = req.send()?.error_for_status()?.json()?;
        parse_response(&value)
    }
}

/// First `max` characters of `text`, on a char boundary.
pub fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Accepts `[{label, score}, ...]` or `[[{label, score}, ...]]` and keeps
/// the highest-scoring entry.
pub fn parse_response(value: &Value) -> Result<Sentiment, ClassifyError> {
    if let Some(err) = value.get("error").and_then(|e| e.as_str()) {
        return Err(ClassifyError::UnexpectedResponse(err.to_string()));
    }

    let candidates = match value.as_array() {
        Some(outer) => match outer.first() {
            Some(Value::Array(inner)) => inner,
            _ => outer,
        },
        None => return Err(ClassifyError::UnexpectedResponse(value.to_string())),
    };

    let (label, score) = candidates
        .iter()
        .filter_map(|c| {
            let label = c.get("label")?.as_str()?;
            let score = c.get("score")?.as_f64()?;
            Some((label, score))
        })
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .ok_or_else(|| ClassifyError::UnexpectedResponse(value.to_string()))?;

    Ok(Sentiment {
        label: map_label(label)?,
        confidence: score.clamp(0.0, 1.0),
    })
}

fn map_label(raw: &str) -> Result<Label, ClassifyError> {
    match raw.to_ascii_uppercase().as_str() {
        "POSITIVE" | "POS" | "LABEL_1" => Ok(Label::Positive),
        "NEGATIVE" | "NEG" | "LABEL_0" => Ok(Label::Negative),
        _ => Err(ClassifyError::UnknownLabel(raw.to_string())),
    }
}
