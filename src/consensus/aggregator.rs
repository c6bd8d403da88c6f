use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use futures_util::stream::FuturesUnordered;
use tracing::{debug, info, instrument, warn};

use crate::classifier::{
    ClassifierCatalog, ClassifierClient, ClassifierDescriptor, ClassifierError, MediaKind,
    strongest,
};
use crate::constants::{
    DEFAULT_CLASSIFIER_TIMEOUT, DEFAULT_HIGH_CONFIDENCE_THRESHOLD, DEFAULT_RESULT_QUOTA,
};
use crate::interpret::{LabelInterpreter, confidence_percent};

use super::error::ConsensusError;
use super::policy::{PolicyKind, VerdictPolicy};
use super::types::{ConsensusOutcome, NormalizedResult, Verdict, VoteTally};

/// Tunables for one [`ConsensusAggregator`].
#[derive(Debug, Clone, PartialEq)]
pub struct ConsensusSettings {
    /// Successful results collected before querying stops. Values below 1 are treated as 1.
    pub quota: usize,
    /// Per-classifier call timeout.
    pub timeout: Duration,
    pub high_confidence_threshold: f64,
    pub policy: PolicyKind,
}

impl Default for ConsensusSettings {
    fn default() -> Self {
        Self {
            quota: DEFAULT_RESULT_QUOTA,
            timeout: DEFAULT_CLASSIFIER_TIMEOUT,
            high_confidence_threshold: DEFAULT_HIGH_CONFIDENCE_THRESHOLD,
            policy: PolicyKind::default(),
        }
    }
}

impl ConsensusSettings {
    pub fn quota(mut self, quota: usize) -> Self {
        self.quota = quota;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn high_confidence_threshold(mut self, threshold: f64) -> Self {
        self.high_confidence_threshold = threshold;
        self
    }

    pub fn policy(mut self, policy: PolicyKind) -> Self {
        self.policy = policy;
        self
    }
}

/// Queries classifiers in priority order and reduces their answers to one verdict.
///
/// Calls run concurrently, but only `quota - accepted` are ever in flight and results are
/// consumed in priority order. The accepted set is therefore the first `quota` successes in
/// catalog order, and when every classifier succeeds exactly `quota` calls are made. Once the
/// quota is met the remaining futures are dropped.
pub struct ConsensusAggregator<C: ClassifierClient> {
    client: C,
    catalog: ClassifierCatalog,
    settings: ConsensusSettings,
    interpreter: LabelInterpreter,
    policy: Arc<dyn VerdictPolicy>,
}

impl<C: ClassifierClient> std::fmt::Debug for ConsensusAggregator<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsensusAggregator")
            .field("catalog", &self.catalog)
            .field("settings", &self.settings)
            .field("policy", &self.policy.name())
            .finish()
    }
}

impl<C: ClassifierClient> ConsensusAggregator<C> {
    pub fn new(client: C, catalog: ClassifierCatalog, settings: ConsensusSettings) -> Self {
        let interpreter = LabelInterpreter::new(settings.high_confidence_threshold);
        let policy = settings.policy.build();
        Self {
            client,
            catalog,
            settings,
            interpreter,
            policy,
        }
    }

    /// Replaces the configured policy with a custom one.
    pub fn with_policy(mut self, policy: Arc<dyn VerdictPolicy>) -> Self {
        self.policy = policy;
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn catalog(&self) -> &ClassifierCatalog {
        &self.catalog
    }

    pub fn settings(&self) -> &ConsensusSettings {
        &self.settings
    }

    pub fn policy_name(&self) -> &'static str {
        self.policy.name()
    }

    /// Classifies `media_base64` (bare base64, no data-URL prefix) and returns the consensus.
    #[instrument(skip(self, media_base64), fields(payload_len = media_base64.len()))]
    pub async fn analyze(
        &self,
        media_kind: MediaKind,
        media_base64: &str,
    ) -> Result<ConsensusOutcome, ConsensusError> {
        let candidates = self.catalog.candidates(media_kind);
        let results = self.collect(&candidates, media_base64).await?;
        let outcome = reduce(self.policy.as_ref(), results)?;

        info!(
            verdict = %outcome.verdict,
            score = outcome.score,
            models = outcome.model_details.len(),
            policy = outcome.policy,
            "Consensus reached"
        );
        Ok(outcome)
    }

    /// Keeps at most `quota - accepted` calls in flight. A failure immediately starts the next
    /// candidate, so every launched call is a prefix of `candidates` and the accepted set is the
    /// first `quota` successes in priority order, whatever order they arrive in.
    async fn collect(
        &self,
        candidates: &[&ClassifierDescriptor],
        media_base64: &str,
    ) -> Result<Vec<NormalizedResult>, ConsensusError> {
        let quota = self.settings.quota.max(1);
        let mut pending = candidates.iter().copied().enumerate();
        let mut in_flight = FuturesUnordered::new();
        let mut accepted: BTreeMap<usize, NormalizedResult> = BTreeMap::new();
        let mut attempted = 0usize;
        let mut cold_start = false;

        for (rank, descriptor) in pending.by_ref().take(quota) {
            in_flight.push(self.ranked_query(rank, descriptor, media_base64));
            attempted += 1;
        }

        while let Some((rank, outcome)) = in_flight.next().await {
            match outcome {
                Ok(result) => {
                    accepted.insert(rank, result);
                }
                Err(err) => {
                    cold_start |= err.is_cold_start();
                    warn!(error = %err, "Skipping classifier");

                    if let Some((rank, next)) = pending.next() {
                        in_flight.push(self.ranked_query(rank, next, media_base64));
                        attempted += 1;
                    }
                }
            }
        }

        if accepted.is_empty() {
            return Err(ConsensusError::NoClassifiersAvailable {
                attempted,
                cold_start,
            });
        }

        debug!(attempted, accepted = accepted.len(), "Collection finished");
        Ok(accepted.into_values().collect())
    }

    async fn ranked_query(
        &self,
        rank: usize,
        descriptor: &ClassifierDescriptor,
        media_base64: &str,
    ) -> (usize, Result<NormalizedResult, ClassifierError>) {
        (rank, self.query(descriptor, media_base64).await)
    }

    async fn query(
        &self,
        descriptor: &ClassifierDescriptor,
        media_base64: &str,
    ) -> Result<NormalizedResult, ClassifierError> {
        let call = self.client.classify(descriptor, media_base64);
        let classifications = tokio::time::timeout(self.settings.timeout, call)
            .await
            .map_err(|_| ClassifierError::Timeout {
                model: descriptor.name.clone(),
                after: self.settings.timeout,
            })??;

        let top = strongest(&classifications).ok_or_else(|| ClassifierError::MalformedResponse {
            model: descriptor.name.clone(),
            reason: "empty classification array".to_string(),
        })?;

        let result = self.normalize(&descriptor.name, &top.label, top.score);
        debug!(
            model = %result.model_name,
            label = %result.label,
            verdict = %result.verdict,
            confidence = result.confidence,
            high_confidence = result.high_confidence,
            "Classifier result"
        );
        Ok(result)
    }

    fn normalize(&self, model_name: &str, label: &str, score: f64) -> NormalizedResult {
        let interpretation = self.interpreter.interpret(label, score);
        NormalizedResult {
            model_name: model_name.to_string(),
            verdict: interpretation.verdict,
            confidence: confidence_percent(score),
            label: label.to_string(),
            high_confidence: interpretation.high_confidence,
        }
    }
}

/// Reduces accumulated results to a [`ConsensusOutcome`] using `policy`.
///
/// Fails on an empty list instead of inventing a verdict.
pub fn reduce(
    policy: &dyn VerdictPolicy,
    results: Vec<NormalizedResult>,
) -> Result<ConsensusOutcome, ConsensusError> {
    if results.is_empty() {
        return Err(ConsensusError::NoClassifiersAvailable {
            attempted: 0,
            cold_start: false,
        });
    }

    let tally = VoteTally::from_results(&results);
    let verdict = policy.decide(&tally, &results);
    let score = mean_confidence(&results);

    Ok(ConsensusOutcome {
        verdict,
        score,
        summary_text: summarize(verdict, &tally),
        model_details: results,
        policy: policy.name(),
    })
}

fn mean_confidence(results: &[NormalizedResult]) -> u8 {
    let sum: u32 = results.iter().map(|r| u32::from(r.confidence)).sum();
    (f64::from(sum) / results.len() as f64).round() as u8
}

fn summarize(verdict: Verdict, tally: &VoteTally) -> String {
    let total = tally.total();
    let noun = if total == 1 { "model" } else { "models" };
    match verdict {
        Verdict::Ai => format!(
            "Likely AI-generated: {} of {} {} flagged synthetic content",
            tally.ai_votes, total, noun
        ),
        Verdict::Real => format!(
            "Likely authentic: {} of {} {} found no signs of AI generation",
            tally.real_votes, total, noun
        ),
    }
}
