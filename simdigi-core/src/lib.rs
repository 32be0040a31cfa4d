//! simdigi-core: Core types for digitizing simulated detector hits.
//!
//! This crate provides the hit and event model, typed energy/time
//! quantities, named-field records, and the schema that maps between them.
//!

pub mod error;
pub mod event;
pub mod hit;
pub mod record;
pub mod schema;
pub mod units;

pub use error::{Error, Result};
pub use event::{DigitizedEvent, Event, ExtraField, GeneratorParticle};
pub use hit::{ChannelId, FourMomentum, Hit, Position, Pulse};
pub use record::{Record, Value};
pub use schema::{
    FieldSpec, GeneratorField, HitField, ResolvedSchema, Schema, Units, N_GEN, N_HITS,
};
pub use units::{Energy, EnergyUnit, Time, TimeUnit};
