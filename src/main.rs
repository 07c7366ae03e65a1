use clap::Parser;
use parcel_extract::core::ConfigProvider;
use parcel_extract::utils::error::{ErrorSeverity, ExtractError};
use parcel_extract::utils::{logger, validation::Validate};
use parcel_extract::{
    BatchOrchestrator, CliConfig, ExtractEngine, ExtractPipeline, LayerTables, LocalStorage,
    PlanningApiClient,
};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let mut config = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting parcel-extract CLI");
    tracing::debug!("CLI config: {:?}", config);

    match run(&mut config).await {
        Ok(output_path) => {
            tracing::info!("✅ Planning extract completed successfully!");
            println!("✅ Planning extract completed successfully!");
            println!("📁 Output saved to: {}", output_path);
        }
        Err(e) => exit_with(e),
    }
}

async fn run(config: &mut CliConfig) -> parcel_extract::Result<String> {
    config.validate()?;
    config.load_parcels_file()?;

    if config.monitor {
        tracing::info!("🔍 System monitoring enabled");
    }

    // 查找表只在啟動時載入一次
    let tables = LayerTables::load(
        &LocalStorage::current_dir(),
        config.ims_layers_path(),
        config.dams_layers_path(),
    )
    .await?;

    let api = PlanningApiClient::from_config(&*config)?;
    let orchestrator = BatchOrchestrator::new(Arc::new(api), Arc::new(tables));

    let storage = LocalStorage::new(config.output_path.clone());
    let monitor_enabled = config.monitor;
    let pipeline = ExtractPipeline::new(orchestrator, storage, config.clone());

    ExtractEngine::new_with_monitoring(pipeline, monitor_enabled)
        .run()
        .await
}

fn exit_with(e: ExtractError) -> ! {
    // 記錄詳細錯誤信息
    tracing::error!(
        "❌ Planning extract failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    // 根據錯誤嚴重程度決定退出碼
    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}
