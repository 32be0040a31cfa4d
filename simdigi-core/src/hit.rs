//! Raw hit types for simulated detector data.

use crate::units::{Energy, Time};
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Physical detector channel identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChannelId(pub i64);

impl ChannelId {
    /// Creates a new channel identifier.
    #[inline]
    #[must_use]
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw identifier.
    #[inline]
    #[must_use]
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Spatial position of a hit (simulation length units, typically mm).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    #[inline]
    #[must_use]
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Energy and momentum of the particle that produced a hit.
///
/// Momentum components share the unit of the energy column (MeV after decoding).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FourMomentum {
    pub e: Energy,
    pub px: f64,
    pub py: f64,
    pub pz: f64,
}

impl FourMomentum {
    #[inline]
    #[must_use]
    pub fn new(e: Energy, px: f64, py: f64, pz: f64) -> Self {
        Self { e, px, py, pz }
    }
}

/// A single raw energy deposit in a detector channel.
///
/// The same type is used for digitized pulses: a pulse carries the summed
/// deposit of its cluster and the cluster's earliest time, with every other
/// field taken from the hit that crossed threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Hit {
    /// Deposited energy.
    pub deposit: Energy,
    /// Time of the deposit.
    pub time: Time,
    /// Channel the deposit was recorded in.
    pub detector: ChannelId,
    /// PDG particle code.
    pub pdg: i32,
    /// Track identifier.
    pub track: i32,
    /// Parent track identifier.
    pub parent: i32,
    /// Hit position.
    pub position: Position,
    /// Particle four-momentum.
    pub momentum: FourMomentum,
    /// Event weight.
    pub weight: f64,
}

/// A digitized hit.
pub type Pulse = Hit;

impl Hit {
    /// Creates a hit with the given deposit, time and channel.
    ///
    /// Particle information is zeroed and the weight set to one; use the
    /// `with_*` methods to fill it in.
    #[must_use]
    pub fn new(deposit: Energy, time: Time, detector: ChannelId) -> Self {
        Self {
            deposit,
            time,
            detector,
            pdg: 0,
            track: 0,
            parent: 0,
            position: Position::default(),
            momentum: FourMomentum::default(),
            weight: 1.0,
        }
    }

    /// Sets the particle lineage.
    #[must_use]
    pub fn with_particle(mut self, pdg: i32, track: i32, parent: i32) -> Self {
        self.pdg = pdg;
        self.track = track;
        self.parent = parent;
        self
    }

    /// Sets the hit position.
    #[must_use]
    pub fn with_position(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    /// Sets the particle four-momentum.
    #[must_use]
    pub fn with_momentum(mut self, momentum: FourMomentum) -> Self {
        self.momentum = momentum;
        self
    }

    /// Sets the weight.
    #[must_use]
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_builder() {
        let hit = Hit::new(Energy::from_mev(0.8), Time::from_ns(12.5), ChannelId::new(1002))
            .with_particle(13, 4, 1)
            .with_position(Position::new(1.0, 2.0, 3.0))
            .with_weight(0.5);

        assert_eq!(hit.detector.as_i64(), 1002);
        assert_eq!(hit.pdg, 13);
        assert_eq!(hit.track, 4);
        assert_eq!(hit.parent, 1);
        assert!((hit.position.z - 3.0).abs() < f64::EPSILON);
        assert!((hit.weight - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_channel_ordering() {
        let mut channels = vec![ChannelId::new(1001), ChannelId::new(3), ChannelId::new(-1)];
        channels.sort();
        assert_eq!(
            channels,
            vec![ChannelId::new(-1), ChannelId::new(3), ChannelId::new(1001)]
        );
    }
}
