use crate::core::{ParcelFeature, PlanningApi};
use crate::domain::model::{Geometry, ParcelAttributes, ParcelIdentifier};
use crate::utils::error::{ExtractError, Result};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Resolves a lot/plan identifier to its attributes and geometry.
pub struct ParcelResolver<A: PlanningApi> {
    api: Arc<A>,
}

impl<A: PlanningApi> ParcelResolver<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self { api }
    }

    pub async fn resolve(
        &self,
        identifier: &ParcelIdentifier,
    ) -> Result<(ParcelAttributes, Geometry)> {
        tracing::debug!("Looking up parcel {}", identifier);
        let features = self.api.lookup_lot_plan(identifier).await?;

        if features.len() > 1 {
            tracing::debug!(
                "{} features matched {}, using the first",
                features.len(),
                identifier
            );
        }

        let ParcelFeature {
            attributes,
            geometry,
        } = features
            .into_iter()
            .next()
            .ok_or_else(|| ExtractError::NotFound {
                identifier: identifier.to_string(),
            })?;

        let geometry = geometry.filter(|g| !g.is_null()).ok_or_else(|| {
            ExtractError::remote(
                "lot_plan_geo",
                format!("feature for {} has no geometry", identifier),
            )
        })?;

        Ok((attributes_from_map(&attributes), Geometry::new(geometry)))
    }
}

pub fn attributes_from_map(attributes: &Map<String, Value>) -> ParcelAttributes {
    ParcelAttributes {
        lot_plan: field_text(attributes, "LOT_PLAN"),
        address: field_text(attributes, "ADDRESS"),
        suburb: field_text(attributes, "LOCALITY"),
        lga: field_text(attributes, "LGA_NAME"),
        area: field_text(attributes, "LOT_AREA"),
        tenure: field_text(attributes, "TENURE"),
    }
}

fn field_text(attributes: &Map<String, Value>, key: &str) -> String {
    match attributes.get(key) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
