pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::adapters::http::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
#[cfg(feature = "cli")]
use crate::core::ConfigProvider;
#[cfg(feature = "cli")]
use crate::utils::error::{ExtractError, Result};
#[cfg(feature = "cli")]
use crate::utils::validation::{self, Validate};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};
#[cfg(feature = "cli")]
use std::time::Duration;

pub const SUPPORTED_FORMATS: [&str; 4] = ["csv", "tsv", "json", "xlsx"];
pub const LAYER_FILE_EXTENSIONS: [&str; 2] = ["json", "txt"];
pub const DEFAULT_OUTPUT_FILENAME: &str = "planning_extract";

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "parcel-extract")]
#[command(about = "Queensland planning report extractor: parcel attributes and SPP overlays")]
pub struct CliConfig {
    /// Parcel numbers separated by commas, e.g. "2SP335900, 3SP335900"
    #[arg(short, long, default_value = "")]
    pub parcels: String,

    /// File with parcel numbers separated by commas or newlines
    #[arg(long)]
    pub parcels_file: Option<String>,

    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub api_base_url: String,

    #[arg(long, default_value = "layers_rep_IMS.txt")]
    pub ims_layers: String,

    #[arg(long, default_value = "layers_rep_DAMS.txt")]
    pub dams_layers: String,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, value_delimiter = ',', default_value = "csv,json", help = "Any of csv, tsv, json, xlsx")]
    pub formats: Vec<String>,

    #[arg(long, help = "Write plain files instead of a ZIP archive")]
    pub no_zip: bool,

    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_seconds: u64,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log CPU and memory usage per phase")]
    pub monitor: bool,

    #[arg(skip)]
    #[serde(skip)]
    file_entries: Vec<String>,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// Read `--parcels-file`, if given, so its entries join the batch.
    pub fn load_parcels_file(&mut self) -> Result<()> {
        if let Some(path) = &self.parcels_file {
            let content = std::fs::read_to_string(path)?;
            self.file_entries = content
                .split(|c: char| c == ',' || c == '\n')
                .map(|s| s.trim().to_string())
                .collect();
            tracing::debug!("Read {} entries from {}", self.file_entries.len(), path);
        }
        Ok(())
    }
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    fn ims_layers_path(&self) -> &str {
        &self.ims_layers
    }

    fn dams_layers_path(&self) -> &str {
        &self.dams_layers
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn output_formats(&self) -> &[String] {
        &self.formats
    }

    fn output_filename(&self) -> &str {
        DEFAULT_OUTPUT_FILENAME
    }

    fn compress_output(&self) -> bool {
        !self.no_zip
    }

    fn parcel_entries(&self) -> Vec<String> {
        self.parcels
            .split(',')
            .map(str::to_string)
            .chain(self.file_entries.iter().cloned())
            .collect()
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("api_base_url", &self.api_base_url)?;
        validation::validate_path("output_path", &self.output_path)?;
        validation::validate_file_extensions(
            "layers",
            &[self.ims_layers.clone(), self.dams_layers.clone()],
            &LAYER_FILE_EXTENSIONS,
        )?;
        validation::validate_output_formats("formats", &self.formats, &SUPPORTED_FORMATS)?;
        validation::validate_range("timeout_seconds", self.timeout_seconds, 1, 300)?;

        if self.parcels.trim().is_empty() && self.parcels_file.is_none() {
            return Err(ExtractError::MissingConfig {
                field: "parcels".to_string(),
            });
        }
        Ok(())
    }
}
