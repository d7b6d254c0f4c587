pub mod heuristic;
pub mod model;

use std::fmt;

use serde::Serialize;
use tracing::{info, warn};

use crate::settings::Settings;
use heuristic::HeuristicClassifier;
use model::ModelClassifier;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Label {
    Positive,
    Negative,
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Label::Positive => "POSITIVE",
            Label::Negative => "NEGATIVE",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sentiment {
    pub label: Label,
    /// In `[0, 1]`.
    pub confidence: f64,
}

/// Which classifier backs the current run. Decided once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ClassificationMode {
    Model,
    Heuristic,
}

impl fmt::Display for ClassificationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            ClassificationMode::Model => "MODEL",
            ClassificationMode::Heuristic => "HEURISTIC",
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ClassifyError {
    #[error("model unavailable: {0}")]
    Unavailable(String),
    #[error("inference request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected inference response: {0}")]
    UnexpectedResponse(String),
    #[error("unknown sentiment label {0:?}")]
    UnknownLabel(String),
}

pub trait SentimentClassifier {
    fn classify(&self, text: &str) -> Result<Sentiment, ClassifyError>;
}

/// Classification context built once per process and passed to every
/// caller. The mode cannot change after construction.
pub struct SentimentEngine<M = ModelClassifier> {
    model: Option<M>,
    heuristic: HeuristicClassifier,
}

impl SentimentEngine<ModelClassifier> {
    pub fn from_settings(settings: &Settings) -> Self {
        Self::select(
            settings.low_memory,
            || ModelClassifier::connect(settings),
            HeuristicClassifier::from_entropy(),
        )
    }
}

impl<M: SentimentClassifier> SentimentEngine<M> {
    /// With `low_memory` set the loader is never called. Otherwise any
    /// loader error selects the heuristic for the rest of the run.
    pub fn select<F>(low_memory: bool, load: F, heuristic: HeuristicClassifier) -> Self
    where
        F: FnOnce() -> Result<M, ClassifyError>,
    {
        let model = if low_memory {
            info!("Resource-constrained environment, skipping model load");
            None
        } else {
            match load() {
                Ok(m) => Some(m),
                Err(e) => {
                    warn!("Sentiment model could not be loaded, using heuristic: {}", e);
                    None
                }
            }
        };

        let engine = Self { model, heuristic };
        info!("Classification mode: {}", engine.mode());
        engine
    }

    pub fn mode(&self) -> ClassificationMode {
        if self.model.is_some() {
            ClassificationMode::Model
        } else {
            ClassificationMode::Heuristic
        }
    }

    /// Never fails: a model error on one text is answered by the heuristic.
    /// Also returns which classifier actually produced the answer.
    pub fn classify_with_source(&self, text: &str) -> (Sentiment, ClassificationMode) {
        if let Some(model) = &self.model {
            match model.classify(text) {
                Ok(s) => return (s, ClassificationMode::Model),
                Err(e) => warn!("Model failed on one text, falling back to heuristic: {}", e),
            }
        }
        (self.heuristic.judge(text), ClassificationMode::Heuristic)
    }

    pub fn classify(&self, text: &str) -> Sentiment {
        self.classify_with_source(text).0
    }
}
