use serde::Serialize;
use std::fmt;

/// Opaque lot/plan token, e.g. `2SP335900`. Sent to the API verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ParcelIdentifier(String);

impl ParcelIdentifier {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParcelIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ParcelIdentifier {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Descriptive attributes of the first feature matching a parcel identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParcelAttributes {
    pub lot_plan: String,
    pub address: String,
    pub suburb: String,
    pub lga: String,
    pub area: String,
    pub tenure: String,
}

/// Parcel geometry as returned by the lot/plan lookup. Only ever forwarded.
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry(serde_json::Value);

impl Geometry {
    pub fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    pub fn as_json(&self) -> &serde_json::Value {
        &self.0
    }
}

pub type LayerId = i64;

/// Regulatory overlay subsystem queried for intersecting layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subsystem {
    Ims,
    Dams,
}

impl Subsystem {
    /// Fixed resolution order: IMS layers are always listed before DAMS layers.
    pub const ORDER: [Subsystem; 2] = [Subsystem::Ims, Subsystem::Dams];
}

impl fmt::Display for Subsystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subsystem::Ims => f.write_str("IMS"),
            Subsystem::Dams => f.write_str("DAMS"),
        }
    }
}

pub const OVERLAY_SEPARATOR: &str = " / ";

/// Ordered, human-readable overlay names for one parcel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct OverlayDescription(String);

impl OverlayDescription {
    pub fn from_names(names: &[String]) -> Self {
        Self(names.join(OVERLAY_SEPARATOR))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for OverlayDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of resolving a single identifier within a batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ResultRecord {
    Success {
        identifier: ParcelIdentifier,
        attributes: ParcelAttributes,
        overlays: OverlayDescription,
    },
    Failure {
        identifier: ParcelIdentifier,
        error: String,
    },
}

impl ResultRecord {
    pub fn identifier(&self) -> &ParcelIdentifier {
        match self {
            ResultRecord::Success { identifier, .. } | ResultRecord::Failure { identifier, .. } => {
                identifier
            }
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ResultRecord::Success { .. })
    }
}

/// Tabular rendering of a batch, ready to be written out.
#[derive(Debug, Clone)]
pub struct ExtractReport {
    pub records: Vec<ResultRecord>,
    pub csv_output: String,
    pub tsv_output: String,
    pub json_output: String,
    pub xlsx_output: Vec<u8>,
    pub succeeded: usize,
    pub failed: usize,
}
