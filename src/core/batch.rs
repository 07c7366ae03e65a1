use crate::core::layers::LayerTables;
use crate::core::overlay_resolver::OverlayResolver;
use crate::core::parcel_resolver::ParcelResolver;
use crate::core::PlanningApi;
use crate::domain::model::{ParcelIdentifier, ResultRecord};
use crate::utils::error::{ExtractError, Result};
use std::sync::Arc;

/// Split a comma-separated identifier list, dropping blank entries.
pub fn parse_identifiers(input: &str) -> Result<Vec<ParcelIdentifier>> {
    prepare_identifiers(input.split(','))
}

/// Trim entries and drop the blank ones, preserving order.
///
/// Returns [`ExtractError::EmptyInput`] when nothing is left.
pub fn prepare_identifiers<I, S>(entries: I) -> Result<Vec<ParcelIdentifier>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let identifiers: Vec<ParcelIdentifier> = entries
        .into_iter()
        .filter_map(|entry| {
            let trimmed = entry.as_ref().trim();
            (!trimmed.is_empty()).then(|| ParcelIdentifier::new(trimmed))
        })
        .collect();

    if identifiers.is_empty() {
        return Err(ExtractError::EmptyInput);
    }
    Ok(identifiers)
}

/// Resolves identifiers one after another, isolating per-parcel failures.
pub struct BatchOrchestrator<A: PlanningApi> {
    parcels: ParcelResolver<A>,
    overlays: OverlayResolver<A>,
}

impl<A: PlanningApi> BatchOrchestrator<A> {
    pub fn new(api: Arc<A>, tables: Arc<LayerTables>) -> Self {
        Self {
            parcels: ParcelResolver::new(Arc::clone(&api)),
            overlays: OverlayResolver::new(api, tables),
        }
    }

    /// One record per identifier, in input order. Never fails as a whole.
    pub async fn resolve_all(&self, identifiers: &[ParcelIdentifier]) -> Vec<ResultRecord> {
        let mut records = Vec::with_capacity(identifiers.len());

        for (index, identifier) in identifiers.iter().enumerate() {
            tracing::info!(
                "🔎 [{}/{}] Resolving parcel {}",
                index + 1,
                identifiers.len(),
                identifier
            );

            let record = match self.resolve_one(identifier).await {
                Ok(record) => record,
                Err(e) => {
                    tracing::warn!("⚠️ Parcel {} failed: {}", identifier, e);
                    ResultRecord::Failure {
                        identifier: identifier.clone(),
                        error: e.to_string(),
                    }
                }
            };
            records.push(record);
        }

        records
    }

    /// Resolve a single identifier. Overlay failure discards the attributes.
    pub async fn resolve_one(&self, identifier: &ParcelIdentifier) -> Result<ResultRecord> {
        let (attributes, geometry) = self.parcels.resolve(identifier).await?;
        let overlays = self.overlays.resolve_overlays(&geometry).await?;

        Ok(ResultRecord::Success {
            identifier: identifier.clone(),
            attributes,
            overlays,
        })
    }
}
