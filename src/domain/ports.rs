use crate::domain::model::{
    ExtractReport, Geometry, LayerId, ParcelIdentifier, ResultRecord, Subsystem,
};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn api_base_url(&self) -> &str;
    fn request_timeout(&self) -> Duration;
    fn ims_layers_path(&self) -> &str;
    fn dams_layers_path(&self) -> &str;
    fn output_path(&self) -> &str;
    fn output_formats(&self) -> &[String];
    fn output_filename(&self) -> &str;
    fn compress_output(&self) -> bool;
    /// Raw identifier entries, before trimming and blank filtering.
    fn parcel_entries(&self) -> Vec<String>;
}

/// One entry of the lot/plan lookup's `features` array.
#[derive(Debug, Clone, Default)]
pub struct ParcelFeature {
    pub attributes: serde_json::Map<String, serde_json::Value>,
    pub geometry: Option<serde_json::Value>,
}

/// The three upstream planning endpoints.
#[async_trait]
pub trait PlanningApi: Send + Sync {
    /// Features matching the search term, in the order the service returns them.
    async fn lookup_lot_plan(&self, identifier: &ParcelIdentifier) -> Result<Vec<ParcelFeature>>;

    /// Layer ids whose geometry intersects `geometry`. An absent layer list is empty.
    async fn intersect(&self, subsystem: Subsystem, geometry: &Geometry) -> Result<Vec<LayerId>>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<ResultRecord>>;
    async fn transform(&self, records: Vec<ResultRecord>) -> Result<ExtractReport>;
    async fn load(&self, report: ExtractReport) -> Result<String>;
}
