//! simdigi-algorithms: Digitization of simulated detector hits.
//!
//! This crate turns the raw hits of one event into detector pulses:
//! - **Partition** - group hits by channel, classify each channel
//! - **Windowed threshold** - accumulate energy in fixed time windows per channel
//! - **Assembly** - concatenate channel pulses, carry generator data through
//!
#![warn(missing_docs)]

mod assembler;
mod config;
mod partition;
mod processing;
pub mod threshold;

pub use assembler::EventAssembler;
pub use config::{ConsumePolicy, DigitizationConfig, EnergyField, Thresholds, WindowBound};
pub use partition::{
    partition_channels, ChannelClassifier, ChannelHits, DetectorType, RpcAboveClassifier,
};
pub use processing::{DigitizationStatistics, DigitizedRecord, Digitizer};
pub use threshold::{ChannelClusterer, WindowScan, WindowedThresholdClusterer};
