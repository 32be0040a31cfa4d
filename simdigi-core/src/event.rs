//! Event-level types: raw events and digitized events.

use crate::hit::{Hit, Pulse};
use crate::record::{Record, Value};
use crate::units::{Energy, Time};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One particle of the generator history that produced an event.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GeneratorParticle {
    pub pdg: i32,
    pub track: i32,
    pub parent: i32,
    pub t: Time,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub e: Energy,
    pub px: f64,
    pub py: f64,
    pub pz: f64,
    pub weight: f64,
}

/// A named auxiliary event field, e.g. an air-shower summary quantity.
///
/// The stored value is kept as read, scalar or array, integer or float.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ExtraField {
    /// Logical name of the field.
    pub name: String,
    /// Stored value.
    pub value: Value,
}

impl ExtraField {
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A raw simulated event.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Event {
    /// Raw hits, in stored order.
    pub hits: Vec<Hit>,
    /// Generator particle history.
    pub generator: Vec<GeneratorParticle>,
    /// Auxiliary event-scoped fields.
    pub extras: Vec<ExtraField>,
    /// Generator columns as stored, keyed by storage name.
    ///
    /// Encoding writes these back verbatim instead of re-deriving them from
    /// `generator`. Empty for events built in memory.
    pub generator_columns: Record,
}

impl Event {
    /// Returns the number of raw hits.
    #[must_use]
    pub fn n_hits(&self) -> usize {
        self.hits.len()
    }

    /// Returns the number of generator particles.
    #[must_use]
    pub fn n_gen(&self) -> usize {
        self.generator.len()
    }
}

/// The digitized form of one [`Event`].
///
/// Owns all of its data; nothing refers back to the raw event.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DigitizedEvent {
    /// Pulses of all channels, concatenated in channel order.
    pub pulses: Vec<Pulse>,
    /// Generator particle history, unmodified.
    pub generator: Vec<GeneratorParticle>,
    /// Auxiliary event-scoped fields, unmodified.
    pub extras: Vec<ExtraField>,
    /// Generator columns as stored, unmodified.
    pub generator_columns: Record,
}

impl DigitizedEvent {
    /// Number of pulses.
    #[must_use]
    pub fn n_hits(&self) -> usize {
        self.pulses.len()
    }

    /// Number of generator particles.
    #[must_use]
    pub fn n_gen(&self) -> usize {
        self.generator.len()
    }

    /// Returns true if no channel produced a pulse.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pulses.is_empty()
    }
}
