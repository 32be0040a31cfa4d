//! Event file header.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use simdigi_core::{N_GEN, N_HITS};

/// First line of every event file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileHeader {
    /// Name of the event collection.
    pub tree: String,
    /// Field names present in the records.
    pub branches: Vec<String>,
    /// Set on files written by the digitizer.
    #[serde(default)]
    pub digitized: bool,
    /// Auxiliary objects carried alongside the events, copied verbatim.
    #[serde(default)]
    pub objects: Map<String, Value>,
}

impl FileHeader {
    /// Creates a header for raw (undigitized) events.
    pub fn new(tree: impl Into<String>, branches: Vec<String>) -> Self {
        Self {
            tree: tree.into(),
            branches,
            digitized: false,
            objects: Map::new(),
        }
    }

    /// Adds an auxiliary object.
    #[must_use]
    pub fn with_object(mut self, name: impl Into<String>, value: Value) -> Self {
        self.objects.insert(name.into(), value);
        self
    }

    /// Header of the digitizer output for this input.
    ///
    /// The tree name gains a `_digi` suffix and the count fields are added
    /// to `fields` if missing. Auxiliary objects are kept.
    #[must_use]
    pub fn digitized(&self, mut fields: Vec<String>) -> Self {
        for count in [N_HITS, N_GEN] {
            if !fields.iter().any(|f| f == count) {
                fields.push(count.to_string());
            }
        }
        Self {
            tree: format!("{}_digi", self.tree),
            branches: fields,
            digitized: true,
            objects: self.objects.clone(),
        }
    }
}
