use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use super::client::{ClassifierClient, RawClassification};
use super::descriptor::ClassifierDescriptor;
use super::error::ClassifierError;

#[derive(Debug, Clone)]
enum MockBehavior {
    Respond(Vec<RawClassification>),
    ColdStart,
    Status(u16),
    Malformed,
    Hang(Duration),
}

/// Scripted in-memory classifier transport keyed by model name.
///
/// Models without a script fail with a transport error. Every call is recorded in order.
#[derive(Debug, Default)]
pub struct MockClassifierClient {
    behaviors: HashMap<String, MockBehavior>,
    delays: HashMap<String, Duration>,
    calls: Mutex<Vec<String>>,
}

impl MockClassifierClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// `model` answers with `classifications`.
    pub fn respond(mut self, model: &str, classifications: Vec<RawClassification>) -> Self {
        self.behaviors
            .insert(model.to_string(), MockBehavior::Respond(classifications));
        self
    }

    /// `model` answers with a single `{label, score}` entry.
    pub fn respond_one(self, model: &str, label: &str, score: f64) -> Self {
        self.respond(model, vec![RawClassification::new(label, score)])
    }

    pub fn cold_start(mut self, model: &str) -> Self {
        self.behaviors
            .insert(model.to_string(), MockBehavior::ColdStart);
        self
    }

    pub fn status(mut self, model: &str, status: u16) -> Self {
        self.behaviors
            .insert(model.to_string(), MockBehavior::Status(status));
        self
    }

    pub fn malformed(mut self, model: &str) -> Self {
        self.behaviors
            .insert(model.to_string(), MockBehavior::Malformed);
        self
    }

    /// `model` never answers within `duration`.
    pub fn hang(mut self, model: &str, duration: Duration) -> Self {
        self.behaviors
            .insert(model.to_string(), MockBehavior::Hang(duration));
        self
    }

    /// Delays `model`'s scripted answer by `duration`.
    pub fn delay(mut self, model: &str, duration: Duration) -> Self {
        self.delays.insert(model.to_string(), duration);
        self
    }

    /// Model names in the order they were called.
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|calls| calls.len()).unwrap_or(0)
    }
}

impl ClassifierClient for MockClassifierClient {
    async fn classify(
        &self,
        classifier: &ClassifierDescriptor,
        _media_base64: &str,
    ) -> Result<Vec<RawClassification>, ClassifierError> {
        let model = classifier.name.clone();
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(model.clone());
        }

        if let Some(delay) = self.delays.get(&model) {
            tokio::time::sleep(*delay).await;
        }

        match self.behaviors.get(&model).cloned() {
            Some(MockBehavior::Respond(list)) if list.is_empty() => {
                Err(ClassifierError::MalformedResponse {
                    model,
                    reason: "empty classification array".to_string(),
                })
            }
            Some(MockBehavior::Respond(list)) => Ok(list),
            Some(MockBehavior::ColdStart) => Err(ClassifierError::ColdStart { model }),
            Some(MockBehavior::Status(status)) => {
                Err(ClassifierError::UpstreamStatus { model, status })
            }
            Some(MockBehavior::Malformed) => Err(ClassifierError::MalformedResponse {
                model,
                reason: "mock malformed body".to_string(),
            }),
            Some(MockBehavior::Hang(duration)) => {
                tokio::time::sleep(duration).await;
                Err(ClassifierError::Transport {
                    model,
                    message: "mock hang elapsed".to_string(),
                })
            }
            None => Err(ClassifierError::Transport {
                model,
                message: "no mock behavior registered".to_string(),
            }),
        }
    }
}
