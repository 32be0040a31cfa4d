//! High-level processing helpers that combine decoding, assembly and encoding.

use crate::assembler::EventAssembler;
use crate::config::DigitizationConfig;
use crate::partition::{ChannelClassifier, RpcAboveClassifier};
use crate::threshold::{ChannelClusterer, WindowedThresholdClusterer};
use simdigi_core::{DigitizedEvent, Event, Record, ResolvedSchema, Result};

/// Counters accumulated while digitizing events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DigitizationStatistics {
    /// Events processed.
    pub events: usize,
    /// Raw hits read.
    pub raw_hits: usize,
    /// Pulses written.
    pub pulses: usize,
    /// Events that produced no pulse.
    pub empty_events: usize,
}

impl DigitizationStatistics {
    /// Records one processed event.
    pub fn record(&mut self, raw_hits: usize, pulses: usize) {
        self.events += 1;
        self.raw_hits += raw_hits;
        self.pulses += pulses;
        if pulses == 0 {
            self.empty_events += 1;
        }
    }

    /// Adds another set of counters to this one.
    pub fn merge(&mut self, other: &Self) {
        self.events += other.events;
        self.raw_hits += other.raw_hits;
        self.pulses += other.pulses;
        self.empty_events += other.empty_events;
    }
}

/// An encoded output record with the counts needed for statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct DigitizedRecord {
    /// The output record.
    pub record: Record,
    /// Number of hits in the input event.
    pub raw_hits: usize,
    /// Number of pulses in the output event.
    pub pulses: usize,
}

/// Digitizes records of one input stream.
///
/// Holds the schema resolved against the stream's field names and the
/// assembler built from the configuration.
#[derive(Debug, Clone)]
pub struct Digitizer<C = WindowedThresholdClusterer, K = RpcAboveClassifier> {
    schema: ResolvedSchema,
    assembler: EventAssembler<C, K>,
}

impl Digitizer {
    /// Validates `config` and resolves its schema against the available fields.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid or a required field
    /// has no matching name in `available`.
    pub fn from_config<I, S>(config: &DigitizationConfig, available: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        config.validate()?;
        let schema = config.schema().resolve(available)?;
        log::debug!(
            "resolved schema: {} output fields, spacing {}",
            schema.output_field_names().len(),
            config.spacing()
        );
        Ok(Self::new(schema, EventAssembler::from_config(config)))
    }
}

impl<C, K> Digitizer<C, K>
where
    C: ChannelClusterer,
    K: ChannelClassifier,
{
    /// Creates a digitizer from a resolved schema and an assembler.
    pub fn new(schema: ResolvedSchema, assembler: EventAssembler<C, K>) -> Self {
        Self { schema, assembler }
    }

    /// Returns the resolved schema.
    pub fn schema(&self) -> &ResolvedSchema {
        &self.schema
    }

    /// Returns the assembler.
    pub fn assembler(&self) -> &EventAssembler<C, K> {
        &self.assembler
    }

    /// Digitizes an already decoded event.
    pub fn digitize_event(&self, event: &Event) -> DigitizedEvent {
        self.assembler.assemble(event)
    }

    /// Decodes, digitizes and encodes one record.
    ///
    /// # Errors
    /// Returns an error if the record does not match the resolved schema.
    pub fn process(&self, record: &Record) -> Result<DigitizedRecord> {
        let event = self.schema.decode(record)?;
        let digitized = self.digitize_event(&event);
        log::debug!(
            "event: {} hits -> {} pulses, {} generator particles",
            event.n_hits(),
            digitized.n_hits(),
            digitized.n_gen()
        );
        Ok(DigitizedRecord {
            record: self.schema.encode(&digitized),
            raw_hits: event.n_hits(),
            pulses: digitized.n_hits(),
        })
    }

    /// Processes a sequence of records, stopping at the first error.
    ///
    /// # Errors
    /// Returns the first decoding error encountered.
    pub fn process_all<'a, I>(&self, records: I) -> Result<(Vec<Record>, DigitizationStatistics)>
    where
        I: IntoIterator<Item = &'a Record>,
    {
        let mut stats = DigitizationStatistics::default();
        let mut output = Vec::new();
        for record in records {
            let digitized = self.process(record)?;
            stats.record(digitized.raw_hits, digitized.pulses);
            output.push(digitized.record);
        }
        Ok((output, stats))
    }
}
