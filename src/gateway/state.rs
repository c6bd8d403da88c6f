use std::sync::Arc;

use crate::annotate::{CosmeticAnnotator, NoDecoration, RandomAnnotator};
use crate::classifier::ClassifierClient;
use crate::config::{Config, ConfigError};
use crate::consensus::ConsensusAggregator;

pub struct HandlerState<C: ClassifierClient + 'static> {
    pub aggregator: Arc<ConsensusAggregator<C>>,

    pub annotator: Arc<dyn CosmeticAnnotator>,

    pub max_media_bytes: usize,
}

impl<C: ClassifierClient + 'static> Clone for HandlerState<C> {
    fn clone(&self) -> Self {
        Self {
            aggregator: Arc::clone(&self.aggregator),
            annotator: Arc::clone(&self.annotator),
            max_media_bytes: self.max_media_bytes,
        }
    }
}

impl<C: ClassifierClient + 'static> HandlerState<C> {
    pub fn new(
        aggregator: Arc<ConsensusAggregator<C>>,
        annotator: Arc<dyn CosmeticAnnotator>,
        max_media_bytes: usize,
    ) -> Self {
        Self {
            aggregator,
            annotator,
            max_media_bytes,
        }
    }

    /// Wires an aggregator around `client` using the catalog and tunables in `config`.
    pub fn from_config(config: &Config, client: C) -> Result<Self, ConfigError> {
        let catalog = config.classifier_catalog()?;
        let aggregator = ConsensusAggregator::new(client, catalog, config.consensus_settings());

        let annotator: Arc<dyn CosmeticAnnotator> = if config.decorate {
            Arc::new(RandomAnnotator::new())
        } else {
            Arc::new(NoDecoration)
        };

        Ok(Self::new(
            Arc::new(aggregator),
            annotator,
            config.max_media_bytes,
        ))
    }
}
