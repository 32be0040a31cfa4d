//! Field schema and its resolution against concrete storage names.
//!
//! Input files from different simulation versions name some fields
//! differently (e.g. `EXTRA_00` vs `COSMIC_EVENT_ID`). A [`Schema`] lists the
//! accepted names for every logical field; [`Schema::resolve`] binds each
//! logical field to exactly one concrete name, once, before any event is
//! processed. The resulting [`ResolvedSchema`] decodes input [`Record`]s
//! into [`Event`]s and encodes [`DigitizedEvent`]s back into records with the
//! same field names and units.

use crate::error::{Error, Result};
use crate::event::{DigitizedEvent, Event, ExtraField, GeneratorParticle};
use crate::hit::{ChannelId, FourMomentum, Hit, Position};
use crate::record::{Record, Value};
use crate::units::{EnergyUnit, TimeUnit};
use std::collections::HashSet;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Name of the pulse-count field written to digitized records.
pub const N_HITS: &str = "N_HITS";
/// Name of the generator-count field written to digitized records.
pub const N_GEN: &str = "N_GEN";

/// Per-hit fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HitField {
    Deposit,
    Time,
    Detector,
    Pdg,
    Track,
    Parent,
    X,
    Y,
    Z,
    E,
    Px,
    Py,
    Pz,
    Weight,
}

impl HitField {
    /// All hit fields in storage order.
    pub const ALL: [HitField; 14] = [
        HitField::Deposit,
        HitField::Time,
        HitField::Detector,
        HitField::Pdg,
        HitField::Track,
        HitField::Parent,
        HitField::X,
        HitField::Y,
        HitField::Z,
        HitField::E,
        HitField::Px,
        HitField::Py,
        HitField::Pz,
        HitField::Weight,
    ];

    /// Canonical storage name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            HitField::Deposit => "Deposit",
            HitField::Time => "Time",
            HitField::Detector => "Detector",
            HitField::Pdg => "PDG",
            HitField::Track => "Track",
            HitField::Parent => "Parent",
            HitField::X => "X",
            HitField::Y => "Y",
            HitField::Z => "Z",
            HitField::E => "E",
            HitField::Px => "PX",
            HitField::Py => "PY",
            HitField::Pz => "PZ",
            HitField::Weight => "WEIGHT",
        }
    }
}

/// Per-generator-particle fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeneratorField {
    Pdg,
    Track,
    Parent,
    T,
    X,
    Y,
    Z,
    E,
    Px,
    Py,
    Pz,
    Weight,
}

impl GeneratorField {
    /// All generator fields in storage order.
    pub const ALL: [GeneratorField; 12] = [
        GeneratorField::Pdg,
        GeneratorField::Track,
        GeneratorField::Parent,
        GeneratorField::T,
        GeneratorField::X,
        GeneratorField::Y,
        GeneratorField::Z,
        GeneratorField::E,
        GeneratorField::Px,
        GeneratorField::Py,
        GeneratorField::Pz,
        GeneratorField::Weight,
    ];

    /// Canonical storage name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            GeneratorField::Pdg => "GEN_PDG",
            GeneratorField::Track => "GEN_Track",
            GeneratorField::Parent => "GEN_Parent",
            GeneratorField::T => "GEN_T",
            GeneratorField::X => "GEN_X",
            GeneratorField::Y => "GEN_Y",
            GeneratorField::Z => "GEN_Z",
            GeneratorField::E => "GEN_E",
            GeneratorField::Px => "GEN_PX",
            GeneratorField::Py => "GEN_PY",
            GeneratorField::Pz => "GEN_PZ",
            GeneratorField::Weight => "GEN_WEIGHT",
        }
    }
}

// Numbered extras and the descriptive names used by cosmic-shower inputs.
const EXTRA_ALIASES: [(&str, Option<&str>); 16] = [
    ("EXTRA_00", Some("COSMIC_EVENT_ID")),
    ("EXTRA_01", Some("COSMIC_CORE_X")),
    ("EXTRA_02", Some("COSMIC_CORE_Y")),
    ("EXTRA_03", Some("COSMIC_GEN_PRIMARY_ENERGY")),
    ("EXTRA_04", Some("COSMIC_GEN_THETA")),
    ("EXTRA_05", Some("COSMIC_GEN_PHI")),
    ("EXTRA_06", Some("COSMIC_GEN_FIRST_HEIGHT")),
    ("EXTRA_07", Some("COSMIC_GEN_ELECTRON_COUNT")),
    ("EXTRA_08", Some("COSMIC_GEN_MUON_COUNT")),
    ("EXTRA_09", Some("COSMIC_GEN_HADRON_COUNT")),
    ("EXTRA_10", Some("COSMIC_GEN_PRIMARY_ID")),
    ("EXTRA_11", None),
    ("EXTRA_12", None),
    ("EXTRA_13", None),
    ("EXTRA_14", None),
    ("EXTRA_15", None),
];

/// A logical field and the storage names accepted for it, in preference order.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FieldSpec {
    /// Logical name.
    pub name: String,
    /// Accepted storage names; the first one present wins.
    pub aliases: Vec<String>,
}

impl FieldSpec {
    /// A field stored under its own name only.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            aliases: vec![name.clone()],
            name,
        }
    }

    /// Adds an accepted storage name.
    #[must_use]
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    fn resolve(&self, available: &HashSet<&str>) -> Result<String> {
        self.aliases
            .iter()
            .find(|alias| available.contains(alias.as_str()))
            .cloned()
            .ok_or_else(|| Error::schema_mismatch(&self.name, &self.aliases))
    }
}

/// Storage units of energy-like and time-like columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Units {
    /// Unit of deposits, energies and momenta.
    pub energy: EnergyUnit,
    /// Unit of hit and generator times.
    pub time: TimeUnit,
}

/// Unresolved schema: accepted names for every logical field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    hit: Vec<FieldSpec>,
    generator: Vec<FieldSpec>,
    extras: Vec<FieldSpec>,
    units: Units,
}

impl Default for Schema {
    fn default() -> Self {
        let extras = EXTRA_ALIASES
            .iter()
            .map(|&(name, alias)| match alias {
                Some(alias) => FieldSpec::new(name).with_alias(alias),
                None => FieldSpec::new(name),
            })
            .collect();

        Self {
            hit: HitField::ALL
                .iter()
                .map(|f| FieldSpec::new(f.name()))
                .collect(),
            generator: GeneratorField::ALL
                .iter()
                .map(|f| FieldSpec::new(f.name()))
                .collect(),
            extras,
            units: Units::default(),
        }
    }
}

impl Schema {
    /// Creates the standard schema (canonical names, MeV and ns).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the storage units.
    #[must_use]
    pub fn with_units(mut self, units: Units) -> Self {
        self.units = units;
        self
    }

    /// Accepts an additional storage name for a hit field.
    #[must_use]
    pub fn with_hit_alias(mut self, field: HitField, alias: impl Into<String>) -> Self {
        self.hit[field as usize].aliases.push(alias.into());
        self
    }

    /// Accepts an additional storage name for a generator field.
    #[must_use]
    pub fn with_generator_alias(mut self, field: GeneratorField, alias: impl Into<String>) -> Self {
        self.generator[field as usize].aliases.push(alias.into());
        self
    }

    /// Replaces the list of extra fields.
    #[must_use]
    pub fn with_extras(mut self, extras: Vec<FieldSpec>) -> Self {
        self.extras = extras;
        self
    }

    /// Returns the storage units.
    #[must_use]
    pub fn units(&self) -> Units {
        self.units
    }

    /// Returns the extra field specifications.
    #[must_use]
    pub fn extras(&self) -> &[FieldSpec] {
        &self.extras
    }

    /// Binds every logical field to one of the available storage names.
    ///
    /// # Errors
    /// Returns [`Error::SchemaMismatch`] for the first logical field none of
    /// whose accepted names is available.
    pub fn resolve<I, S>(&self, available: I) -> Result<ResolvedSchema>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let owned: Vec<S> = available.into_iter().collect();
        let available: HashSet<&str> = owned.iter().map(|name| name.as_ref()).collect();

        let hit = self
            .hit
            .iter()
            .map(|spec| spec.resolve(&available))
            .collect::<Result<Vec<_>>>()?;
        let generator = self
            .generator
            .iter()
            .map(|spec| spec.resolve(&available))
            .collect::<Result<Vec<_>>>()?;
        let extras = self
            .extras
            .iter()
            .map(|spec| Ok((spec.name.clone(), spec.resolve(&available)?)))
            .collect::<Result<Vec<_>>>()?;

        Ok(ResolvedSchema {
            hit,
            generator,
            extras,
            units: self.units,
        })
    }
}

/// A schema whose logical fields are bound to concrete storage names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSchema {
    hit: Vec<String>,
    generator: Vec<String>,
    extras: Vec<(String, String)>,
    units: Units,
}

impl ResolvedSchema {
    /// Storage name bound to a hit field.
    #[must_use]
    pub fn hit_name(&self, field: HitField) -> &str {
        &self.hit[field as usize]
    }

    /// Storage name bound to a generator field.
    #[must_use]
    pub fn generator_name(&self, field: GeneratorField) -> &str {
        &self.generator[field as usize]
    }

    /// Storage units.
    #[must_use]
    pub fn units(&self) -> Units {
        self.units
    }

    /// Storage names of all bound fields, plus the count fields written on output.
    #[must_use]
    pub fn output_field_names(&self) -> Vec<String> {
        self.hit
            .iter()
            .chain(self.generator.iter())
            .chain(self.extras.iter().map(|(_, stored)| stored))
            .cloned()
            .chain([N_HITS.to_string(), N_GEN.to_string()])
            .collect()
    }

    /// Decodes one input record into an [`Event`] in base units.
    ///
    /// # Errors
    /// Returns [`Error::SchemaMismatch`] if a bound field is absent from this
    /// record, and a column error if any column is malformed.
    #[allow(clippy::similar_names)]
    pub fn decode(&self, record: &Record) -> Result<Event> {
        let energy = self.units.energy;
        let time = self.units.time;

        let deposit = self.hit_floats(record, HitField::Deposit, None)?;
        let n = Some(deposit.len());
        let times = self.hit_floats(record, HitField::Time, n)?;
        let detector = self.hit_ints(record, HitField::Detector, n)?;
        let pdg = narrow(self.hit_name(HitField::Pdg), self.hit_ints(record, HitField::Pdg, n)?)?;
        let track = narrow(
            self.hit_name(HitField::Track),
            self.hit_ints(record, HitField::Track, n)?,
        )?;
        let parent = narrow(
            self.hit_name(HitField::Parent),
            self.hit_ints(record, HitField::Parent, n)?,
        )?;
        let x = self.hit_floats(record, HitField::X, n)?;
        let y = self.hit_floats(record, HitField::Y, n)?;
        let z = self.hit_floats(record, HitField::Z, n)?;
        let e = self.hit_floats(record, HitField::E, n)?;
        let px = self.hit_floats(record, HitField::Px, n)?;
        let py = self.hit_floats(record, HitField::Py, n)?;
        let pz = self.hit_floats(record, HitField::Pz, n)?;
        let weight = self.hit_floats(record, HitField::Weight, n)?;

        let scale = energy.in_mev();
        let hits = (0..deposit.len())
            .map(|i| Hit {
                deposit: energy.to_energy(deposit[i]),
                time: time.to_time(times[i]),
                detector: ChannelId::new(detector[i]),
                pdg: pdg[i],
                track: track[i],
                parent: parent[i],
                position: Position::new(x[i], y[i], z[i]),
                momentum: FourMomentum::new(
                    energy.to_energy(e[i]),
                    px[i] * scale,
                    py[i] * scale,
                    pz[i] * scale,
                ),
                weight: weight[i],
            })
            .collect();

        let generator = self.decode_generator(record)?;
        let generator_columns = self
            .generator
            .iter()
            .map(|stored| Ok((stored.clone(), record.require(stored)?.clone())))
            .collect::<Result<Record>>()?;

        let extras = self
            .extras
            .iter()
            .map(|(name, stored)| {
                Ok(ExtraField::new(name.clone(), record.require(stored)?.clone()))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Event {
            hits,
            generator,
            extras,
            generator_columns,
        })
    }

    fn decode_generator(&self, record: &Record) -> Result<Vec<GeneratorParticle>> {
        let energy = self.units.energy;
        let time = self.units.time;

        let pdg_name = self.generator_name(GeneratorField::Pdg);
        let pdg = narrow(pdg_name, record.require(pdg_name)?.to_ints(pdg_name)?)?;
        let n = Some(pdg.len());
        let track = narrow(
            self.generator_name(GeneratorField::Track),
            self.gen_ints(record, GeneratorField::Track, n)?,
        )?;
        let parent = narrow(
            self.generator_name(GeneratorField::Parent),
            self.gen_ints(record, GeneratorField::Parent, n)?,
        )?;
        let t = self.gen_floats(record, GeneratorField::T, n)?;
        let x = self.gen_floats(record, GeneratorField::X, n)?;
        let y = self.gen_floats(record, GeneratorField::Y, n)?;
        let z = self.gen_floats(record, GeneratorField::Z, n)?;
        let e = self.gen_floats(record, GeneratorField::E, n)?;
        let px = self.gen_floats(record, GeneratorField::Px, n)?;
        let py = self.gen_floats(record, GeneratorField::Py, n)?;
        let pz = self.gen_floats(record, GeneratorField::Pz, n)?;
        let weight = self.gen_floats(record, GeneratorField::Weight, n)?;

        let scale = energy.in_mev();
        Ok((0..pdg.len())
            .map(|i| GeneratorParticle {
                pdg: pdg[i],
                track: track[i],
                parent: parent[i],
                t: time.to_time(t[i]),
                x: x[i],
                y: y[i],
                z: z[i],
                e: energy.to_energy(e[i]),
                px: px[i] * scale,
                py: py[i] * scale,
                pz: pz[i] * scale,
                weight: weight[i],
            })
            .collect())
    }

    /// Encodes a digitized event into a record with the input's field names
    /// and units, plus [`N_HITS`] and [`N_GEN`].
    #[must_use]
    pub fn encode(&self, event: &DigitizedEvent) -> Record {
        let energy = self.units.energy;
        let time = self.units.time;
        let scale = energy.in_mev();
        let pulses = &event.pulses;
        let generator = &event.generator;

        let mut record = Record::new();

        let hit_floats = |f: fn(&Hit) -> f64| -> Value {
            Value::FloatArray(pulses.iter().map(f).collect())
        };
        record.insert(
            self.hit_name(HitField::Deposit),
            Value::FloatArray(pulses.iter().map(|p| energy.from_energy(p.deposit)).collect()),
        );
        record.insert(
            self.hit_name(HitField::Time),
            Value::FloatArray(pulses.iter().map(|p| time.from_time(p.time)).collect()),
        );
        record.insert(
            self.hit_name(HitField::Detector),
            Value::IntArray(pulses.iter().map(|p| p.detector.as_i64()).collect()),
        );
        record.insert(
            self.hit_name(HitField::Pdg),
            Value::IntArray(pulses.iter().map(|p| i64::from(p.pdg)).collect()),
        );
        record.insert(
            self.hit_name(HitField::Track),
            Value::IntArray(pulses.iter().map(|p| i64::from(p.track)).collect()),
        );
        record.insert(
            self.hit_name(HitField::Parent),
            Value::IntArray(pulses.iter().map(|p| i64::from(p.parent)).collect()),
        );
        record.insert(self.hit_name(HitField::X), hit_floats(|p| p.position.x));
        record.insert(self.hit_name(HitField::Y), hit_floats(|p| p.position.y));
        record.insert(self.hit_name(HitField::Z), hit_floats(|p| p.position.z));
        record.insert(
            self.hit_name(HitField::E),
            Value::FloatArray(
                pulses
                    .iter()
                    .map(|p| energy.from_energy(p.momentum.e))
                    .collect(),
            ),
        );
        record.insert(
            self.hit_name(HitField::Px),
            Value::FloatArray(pulses.iter().map(|p| p.momentum.px / scale).collect()),
        );
        record.insert(
            self.hit_name(HitField::Py),
            Value::FloatArray(pulses.iter().map(|p| p.momentum.py / scale).collect()),
        );
        record.insert(
            self.hit_name(HitField::Pz),
            Value::FloatArray(pulses.iter().map(|p| p.momentum.pz / scale).collect()),
        );
        record.insert(self.hit_name(HitField::Weight), hit_floats(|p| p.weight));

        let gen_ints = |f: fn(&GeneratorParticle) -> i32| -> Value {
            Value::IntArray(generator.iter().map(|g| i64::from(f(g))).collect())
        };
        let gen_floats = |f: &dyn Fn(&GeneratorParticle) -> f64| -> Value {
            Value::FloatArray(generator.iter().map(f).collect())
        };
        record.insert(self.generator_name(GeneratorField::Pdg), gen_ints(|g| g.pdg));
        record.insert(self.generator_name(GeneratorField::Track), gen_ints(|g| g.track));
        record.insert(self.generator_name(GeneratorField::Parent), gen_ints(|g| g.parent));
        record.insert(
            self.generator_name(GeneratorField::T),
            gen_floats(&|g| time.from_time(g.t)),
        );
        record.insert(self.generator_name(GeneratorField::X), gen_floats(&|g| g.x));
        record.insert(self.generator_name(GeneratorField::Y), gen_floats(&|g| g.y));
        record.insert(self.generator_name(GeneratorField::Z), gen_floats(&|g| g.z));
        record.insert(
            self.generator_name(GeneratorField::E),
            gen_floats(&|g| energy.from_energy(g.e)),
        );
        record.insert(
            self.generator_name(GeneratorField::Px),
            gen_floats(&|g| g.px / scale),
        );
        record.insert(
            self.generator_name(GeneratorField::Py),
            gen_floats(&|g| g.py / scale),
        );
        record.insert(
            self.generator_name(GeneratorField::Pz),
            gen_floats(&|g| g.pz / scale),
        );
        record.insert(
            self.generator_name(GeneratorField::Weight),
            gen_floats(&|g| g.weight),
        );

        // Stored generator columns win over the re-encoded particles.
        for stored in &self.generator {
            if let Some(raw) = event.generator_columns.get(stored) {
                record.insert(stored.clone(), raw.clone());
            }
        }

        for (name, stored) in &self.extras {
            let value = event
                .extras
                .iter()
                .find(|extra| &extra.name == name)
                .map_or_else(|| Value::FloatArray(Vec::new()), |extra| extra.value.clone());
            record.insert(stored.clone(), value);
        }

        record.insert(N_HITS, Value::Int(count(event.n_hits())));
        record.insert(N_GEN, Value::Int(count(event.n_gen())));

        record
    }

    fn hit_floats(&self, record: &Record, field: HitField, len: Option<usize>) -> Result<Vec<f64>> {
        let name = self.hit_name(field);
        let values = record.require(name)?.to_floats(name)?;
        check_len(name, len, values.len())?;
        Ok(values)
    }

    fn hit_ints(&self, record: &Record, field: HitField, len: Option<usize>) -> Result<Vec<i64>> {
        let name = self.hit_name(field);
        let values = record.require(name)?.to_ints(name)?;
        check_len(name, len, values.len())?;
        Ok(values)
    }

    fn gen_floats(
        &self,
        record: &Record,
        field: GeneratorField,
        len: Option<usize>,
    ) -> Result<Vec<f64>> {
        let name = self.generator_name(field);
        let values = record.require(name)?.to_floats(name)?;
        check_len(name, len, values.len())?;
        Ok(values)
    }

    fn gen_ints(
        &self,
        record: &Record,
        field: GeneratorField,
        len: Option<usize>,
    ) -> Result<Vec<i64>> {
        let name = self.generator_name(field);
        let values = record.require(name)?.to_ints(name)?;
        check_len(name, len, values.len())?;
        Ok(values)
    }
}

fn check_len(field: &str, expected: Option<usize>, found: usize) -> Result<()> {
    match expected {
        Some(expected) if expected != found => Err(Error::ColumnLength {
            field: field.to_string(),
            expected,
            found,
        }),
        _ => Ok(()),
    }
}

fn narrow(field: &str, values: Vec<i64>) -> Result<Vec<i32>> {
    values
        .into_iter()
        .enumerate()
        .map(|(index, value)| {
            i32::try_from(value).map_err(|_| Error::OutOfRange {
                field: field.to_string(),
                index,
                value,
            })
        })
        .collect()
}

fn count(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}
