use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

pub struct ExtractEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> ExtractEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("🚀 Starting planning extract");
        self.monitor.log_stats("Start");

        // Extract
        let records = self.pipeline.extract().await?;
        tracing::info!("Resolved {} parcels", records.len());
        self.monitor.log_stats("Resolve");

        // Transform
        let report = self.pipeline.transform(records).await?;
        tracing::info!(
            "Built report: {} rows, {} succeeded, {} failed",
            report.records.len(),
            report.succeeded,
            report.failed
        );
        self.monitor.log_stats("Report");

        // Load
        let output_path = self.pipeline.load(report).await?;
        tracing::info!("Output saved to: {}", output_path);
        self.monitor.log_final_stats();

        Ok(output_path)
    }
}
