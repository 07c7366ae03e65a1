use crate::core::Storage;
use crate::domain::model::{LayerId, Subsystem};
use crate::utils::error::{ExtractError, Result};
use serde::Deserialize;
use std::collections::HashMap;

/// One record of a layer register export: `{"id": 12, "name": "..."}`.
#[derive(Debug, Clone, Deserialize)]
pub struct LayerRecord {
    pub id: LayerId,
    pub name: String,
}

/// Read-only mapping from layer id to display name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayerTable {
    names: HashMap<LayerId, String>,
}

impl LayerTable {
    /// Later records replace earlier ones with the same id.
    pub fn from_records(records: impl IntoIterator<Item = LayerRecord>) -> Self {
        let names = records.into_iter().map(|r| (r.id, r.name)).collect();
        Self { names }
    }

    pub fn from_json_slice(data: &[u8]) -> std::result::Result<Self, serde_json::Error> {
        let records: Vec<LayerRecord> = serde_json::from_slice(data)?;
        Ok(Self::from_records(records))
    }

    pub fn get(&self, id: LayerId) -> Option<&str> {
        self.names.get(&id).map(String::as_str)
    }

    /// Display name for `id`, or `Unknown <id>` when the register has no entry.
    pub fn display_name(&self, id: LayerId) -> String {
        self.get(id)
            .map(str::to_string)
            .unwrap_or_else(|| format!("Unknown {}", id))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(LayerId, S)> for LayerTable {
    fn from_iter<T: IntoIterator<Item = (LayerId, S)>>(iter: T) -> Self {
        Self {
            names: iter.into_iter().map(|(id, name)| (id, name.into())).collect(),
        }
    }
}

/// The IMS and DAMS registers, loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct LayerTables {
    pub ims: LayerTable,
    pub dams: LayerTable,
}

impl LayerTables {
    pub fn new(ims: LayerTable, dams: LayerTable) -> Self {
        Self { ims, dams }
    }

    pub fn for_subsystem(&self, subsystem: Subsystem) -> &LayerTable {
        match subsystem {
            Subsystem::Ims => &self.ims,
            Subsystem::Dams => &self.dams,
        }
    }

    pub async fn load<S: Storage>(storage: &S, ims_path: &str, dams_path: &str) -> Result<Self> {
        let ims = load_table(storage, ims_path).await?;
        let dams = load_table(storage, dams_path).await?;

        tracing::info!(
            "📚 Loaded layer registers: {} IMS layers, {} DAMS layers",
            ims.len(),
            dams.len()
        );
        Ok(Self { ims, dams })
    }
}

async fn load_table<S: Storage>(storage: &S, path: &str) -> Result<LayerTable> {
    let data = storage
        .read_file(path)
        .await
        .map_err(|e| ExtractError::LayerTable {
            path: path.to_string(),
            message: e.to_string(),
        })?;

    let table = LayerTable::from_json_slice(&data).map_err(|e| ExtractError::LayerTable {
        path: path.to_string(),
        message: e.to_string(),
    })?;

    if table.is_empty() {
        tracing::warn!("Layer register {} is empty, every id will render as unknown", path);
    }
    Ok(table)
}
