//! Channel partitioning and detector-type classification.

use serde::{Deserialize, Serialize};
use simdigi_core::{ChannelId, Hit};
use std::collections::BTreeMap;
use std::fmt;

/// Detector technology of a channel; selects the energy threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectorType {
    /// Plastic scintillator bar.
    Scintillator,
    /// Resistive plate chamber.
    Rpc,
}

impl fmt::Display for DetectorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DetectorType::Scintillator => write!(f, "scintillator"),
            DetectorType::Rpc => write!(f, "rpc"),
        }
    }
}

/// Assigns a [`DetectorType`] to a channel.
///
/// Implemented for [`RpcAboveClassifier`] and for any
/// `Fn(ChannelId) -> DetectorType`.
pub trait ChannelClassifier {
    /// Classifies one channel.
    fn classify(&self, channel: ChannelId) -> DetectorType;
}

impl<F> ChannelClassifier for F
where
    F: Fn(ChannelId) -> DetectorType,
{
    fn classify(&self, channel: ChannelId) -> DetectorType {
        self(channel)
    }
}

/// Classifies channels with an ID strictly above a boundary as RPC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RpcAboveClassifier {
    /// Largest scintillator channel ID.
    pub rpc_channel_min: i64,
}

impl Default for RpcAboveClassifier {
    fn default() -> Self {
        Self {
            rpc_channel_min: 1000,
        }
    }
}

impl RpcAboveClassifier {
    /// Creates a classifier with the given boundary.
    #[must_use]
    pub fn new(rpc_channel_min: i64) -> Self {
        Self { rpc_channel_min }
    }
}

impl ChannelClassifier for RpcAboveClassifier {
    #[inline]
    fn classify(&self, channel: ChannelId) -> DetectorType {
        if channel.as_i64() > self.rpc_channel_min {
            DetectorType::Rpc
        } else {
            DetectorType::Scintillator
        }
    }
}

/// The hits of one channel, sorted by time.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelHits {
    /// Channel identifier.
    pub channel: ChannelId,
    /// Classification of the channel.
    pub detector_type: DetectorType,
    /// Hits on the channel in time order.
    pub hits: Vec<Hit>,
}

/// Groups hits by channel.
///
/// Returns one entry per distinct channel, in ascending channel order. Hits
/// within a channel are sorted by time; equal times keep their input order.
pub fn partition_channels<C>(hits: &[Hit], classifier: &C) -> Vec<ChannelHits>
where
    C: ChannelClassifier + ?Sized,
{
    let mut channels: BTreeMap<ChannelId, Vec<Hit>> = BTreeMap::new();
    for hit in hits {
        channels.entry(hit.detector).or_default().push(*hit);
    }

    channels
        .into_iter()
        .map(|(channel, mut hits)| {
            hits.sort_by(|a, b| a.time.total_cmp(&b.time));
            ChannelHits {
                channel,
                detector_type: classifier.classify(channel),
                hits,
            }
        })
        .collect()
}
