use crate::core::layers::LayerTables;
use crate::core::PlanningApi;
use crate::domain::model::{Geometry, OverlayDescription, Subsystem};
use crate::utils::error::{ExtractError, Result};
use std::sync::Arc;

/// Queries the IMS and DAMS intersection services for a geometry and names
/// the returned layers.
pub struct OverlayResolver<A: PlanningApi> {
    api: Arc<A>,
    tables: Arc<LayerTables>,
}

impl<A: PlanningApi> OverlayResolver<A> {
    pub fn new(api: Arc<A>, tables: Arc<LayerTables>) -> Self {
        Self { api, tables }
    }

    pub async fn resolve_overlays(&self, geometry: &Geometry) -> Result<OverlayDescription> {
        let mut names = Vec::new();

        for subsystem in Subsystem::ORDER {
            let layer_ids = self
                .api
                .intersect(subsystem, geometry)
                .await
                .map_err(|e| ExtractError::Resolution {
                    subsystem,
                    source: Box::new(e),
                })?;

            tracing::debug!("{} intersect returned {} layers", subsystem, layer_ids.len());

            let table = self.tables.for_subsystem(subsystem);
            names.extend(layer_ids.into_iter().map(|id| table.display_name(id)));
        }

        Ok(OverlayDescription::from_names(&names))
    }
}
