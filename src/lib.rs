pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::http::PlanningApiClient;
pub use app::pipelines::extract_pipeline::ExtractPipeline;
pub use config::{cli::LocalStorage, toml_config::TomlConfig};
pub use crate::core::{batch::BatchOrchestrator, engine::ExtractEngine, layers::LayerTables};
pub use domain::model::{ParcelIdentifier, ResultRecord};
pub use utils::error::{ExtractError, Result};
