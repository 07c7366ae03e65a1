use crate::core::batch::{prepare_identifiers, BatchOrchestrator};
use crate::core::report::build_report;
use crate::core::{ConfigProvider, ExtractReport, Pipeline, PlanningApi, ResultRecord, Storage};
use crate::utils::error::Result;
use std::io::Write;
use zip::write::{SimpleFileOptions, ZipWriter};

/// Planning extract: resolve every configured parcel, tabulate, write out.
pub struct ExtractPipeline<A: PlanningApi, S: Storage, C: ConfigProvider> {
    orchestrator: BatchOrchestrator<A>,
    storage: S,
    config: C,
}

impl<A: PlanningApi, S: Storage, C: ConfigProvider> ExtractPipeline<A, S, C> {
    pub fn new(orchestrator: BatchOrchestrator<A>, storage: S, config: C) -> Self {
        Self {
            orchestrator,
            storage,
            config,
        }
    }

    /// (file name, contents) for every configured output format. A format
    /// listed twice is written once.
    fn output_files<'a>(&self, report: &'a ExtractReport) -> Vec<(String, &'a [u8])> {
        let stem = self.config.output_filename();
        let mut files: Vec<(String, &'a [u8])> = Vec::new();
        for format in self.config.output_formats() {
            let contents = match format.as_str() {
                "csv" => report.csv_output.as_bytes(),
                "tsv" => report.tsv_output.as_bytes(),
                "json" => report.json_output.as_bytes(),
                "xlsx" => report.xlsx_output.as_slice(),
                other => {
                    tracing::warn!("Skipping unsupported output format: {}", other);
                    continue;
                }
            };
            let name = format!("{}.{}", stem, format);
            if files.iter().any(|(existing, _)| *existing == name) {
                tracing::debug!("Output format {} listed more than once", format);
                continue;
            }
            files.push((name, contents));
        }
        files
    }
}

#[async_trait::async_trait]
impl<A, S, C> Pipeline for ExtractPipeline<A, S, C>
where
    A: PlanningApi,
    S: Storage,
    C: ConfigProvider,
{
    async fn extract(&self) -> Result<Vec<ResultRecord>> {
        let identifiers = prepare_identifiers(self.config.parcel_entries())?;
        tracing::info!("📋 {} parcel identifiers to resolve", identifiers.len());

        Ok(self.orchestrator.resolve_all(&identifiers).await)
    }

    async fn transform(&self, records: Vec<ResultRecord>) -> Result<ExtractReport> {
        tracing::info!("🔧 Building report from {} records", records.len());
        build_report(records, chrono::Utc::now())
    }

    async fn load(&self, report: ExtractReport) -> Result<String> {
        let files = self.output_files(&report);
        let stem = self.config.output_filename();

        if self.config.compress_output() {
            let archive_name = format!("{}.zip", stem);
            tracing::debug!("Creating ZIP file with {} files", files.len());

            let zip_data = {
                let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
                for (name, contents) in &files {
                    zip.start_file(name.as_str(), SimpleFileOptions::default())?;
                    zip.write_all(contents)?;
                }
                // 完成並取回底層 Vec<u8>
                zip.finish()?.into_inner()
            };

            tracing::debug!("Writing ZIP file ({} bytes) to storage", zip_data.len());
            self.storage.write_file(&archive_name, &zip_data).await?;

            let output_path = format!("{}/{}", self.config.output_path(), archive_name);
            tracing::info!("📦 Report saved: {}", output_path);
            return Ok(output_path);
        }

        for (name, contents) in &files {
            self.storage.write_file(name, contents).await?;
            tracing::debug!("Wrote {}", name);
        }

        let output_path = match files.as_slice() {
            [(name, _)] => format!("{}/{}", self.config.output_path(), name),
            _ => self.config.output_path().to_string(),
        };
        tracing::info!("💾 Report saved: {}", output_path);
        Ok(output_path)
    }
}
