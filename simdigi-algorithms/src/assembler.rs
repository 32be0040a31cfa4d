//! Event assembly: partition, cluster per channel, merge.

use crate::config::{DigitizationConfig, Thresholds};
use crate::partition::{partition_channels, ChannelClassifier, RpcAboveClassifier};
use crate::threshold::{ChannelClusterer, WindowedThresholdClusterer};
use simdigi_core::{DigitizedEvent, Event};

/// Builds a [`DigitizedEvent`] from a raw [`Event`].
#[derive(Debug, Clone)]
pub struct EventAssembler<C = WindowedThresholdClusterer, K = RpcAboveClassifier> {
    clusterer: C,
    classifier: K,
    thresholds: Thresholds,
}

impl EventAssembler {
    /// Creates an assembler from a configuration.
    #[must_use]
    pub fn from_config(config: &DigitizationConfig) -> Self {
        Self::new(config.clusterer(), config.classifier(), config.thresholds)
    }
}

impl Default for EventAssembler {
    fn default() -> Self {
        Self::from_config(&DigitizationConfig::default())
    }
}

impl<C, K> EventAssembler<C, K>
where
    C: ChannelClusterer,
    K: ChannelClassifier,
{
    /// Creates an assembler from its parts.
    pub fn new(clusterer: C, classifier: K, thresholds: Thresholds) -> Self {
        Self {
            clusterer,
            classifier,
            thresholds,
        }
    }

    /// Returns the clusterer.
    pub fn clusterer(&self) -> &C {
        &self.clusterer
    }

    /// Returns the channel classifier.
    pub fn classifier(&self) -> &K {
        &self.classifier
    }

    /// Digitizes one event.
    ///
    /// Channels are processed once each in ascending channel order and
    /// their pulses concatenated without re-sorting. Generator metadata and
    /// extras are copied unchanged.
    pub fn assemble(&self, event: &Event) -> DigitizedEvent {
        let mut pulses = Vec::new();
        for channel in partition_channels(&event.hits, &self.classifier) {
            let threshold = self.thresholds.for_type(channel.detector_type);
            let channel_pulses = self.clusterer.cluster(&channel.hits, threshold);
            log::trace!(
                "channel {} ({}): {} hits -> {} pulses",
                channel.channel,
                channel.detector_type,
                channel.hits.len(),
                channel_pulses.len()
            );
            pulses.extend(channel_pulses);
        }

        DigitizedEvent {
            pulses,
            generator: event.generator.clone(),
            extras: event.extras.clone(),
            generator_columns: event.generator_columns.clone(),
        }
    }
}
