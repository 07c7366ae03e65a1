pub mod batch;
pub mod engine;
pub mod layers;
pub mod overlay_resolver;
pub mod parcel_resolver;
pub mod report;

pub use crate::domain::model::{ExtractReport, ResultRecord};
pub use crate::domain::ports::{ConfigProvider, ParcelFeature, Pipeline, PlanningApi, Storage};
pub use crate::utils::error::Result;
