use anyhow::Context;
use clap::Parser;
use parcel_extract::core::batch::prepare_identifiers;
use parcel_extract::core::ConfigProvider;
use parcel_extract::utils::error::ErrorSeverity;
use parcel_extract::utils::{logger, validation::Validate};
use parcel_extract::{
    BatchOrchestrator, ExtractEngine, ExtractPipeline, LayerTables, LocalStorage,
    PlanningApiClient, TomlConfig,
};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "toml-extract")]
#[command(about = "Planning extract driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "parcel-extract.toml")]
    config: String,

    /// Parcel numbers separated by commas; replaces `extract.parcels`
    #[arg(short, long)]
    parcels: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Dry run - show what would be processed without executing
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 初始化日誌
    if args.log_json {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🚀 Starting TOML-based planning extract");
    tracing::info!("📁 Loading configuration from: {}", args.config);

    // 載入 TOML 配置
    let mut config = TomlConfig::from_file(&args.config)
        .with_context(|| format!("failed to load config file '{}'", args.config))?;

    // 應用命令列覆蓋設定
    if let Some(parcels) = &args.parcels {
        config.extract.parcels = parcels.split(',').map(str::to_string).collect();
        tracing::info!("🔧 Parcels overridden from command line");
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!("✅ Configuration loaded and validated successfully");
    display_config_summary(&config, &args);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No requests will be sent");
        perform_dry_run(&config)?;
        return Ok(());
    }

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());

    let tables = LayerTables::load(
        &LocalStorage::current_dir(),
        config.ims_layers_path(),
        config.dams_layers_path(),
    )
    .await
    .context("failed to load layer registers")?;

    let api = PlanningApiClient::with_extra_headers(
        config.api_base_url(),
        config.request_timeout(),
        &config.extra_headers(),
    )?;
    let orchestrator = BatchOrchestrator::new(Arc::new(api), Arc::new(tables));
    let storage = LocalStorage::new(config.output_path().to_string());
    let pipeline = ExtractPipeline::new(orchestrator, storage, config);

    let engine = ExtractEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ Planning extract completed successfully!");
            println!("✅ Planning extract completed successfully!");
            println!("📁 Output saved to: {}", output_path);
        }
        Err(e) => {
            tracing::error!(
                "❌ Planning extract failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig, args: &Args) {
    println!("📋 Configuration Summary:");
    println!("  Extract: {}", config.extract.name);
    if let Some(description) = &config.extract.description {
        println!("  Description: {}", description);
    }
    println!("  API: {}", config.api_base_url());
    println!("  Timeout: {:?}", config.request_timeout());
    println!("  Output: {}", config.output_path());
    println!("  Formats: {}", config.output_formats().join(", "));

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

fn perform_dry_run(config: &TomlConfig) -> anyhow::Result<()> {
    println!("🔍 Dry Run Analysis:");
    println!();

    // 輸入分析
    println!("📋 Parcels:");
    match prepare_identifiers(config.parcel_entries()) {
        Ok(identifiers) => {
            for identifier in &identifiers {
                println!("  {}", identifier);
            }
            println!("  📊 {} parcels, 3 requests each", identifiers.len());
        }
        Err(e) => println!("  ⚠️ {}", e.user_friendly_message()),
    }

    println!();
    println!("📚 Layer Registers:");
    println!("  IMS: {}", config.ims_layers_path());
    println!("  DAMS: {}", config.dams_layers_path());

    let extra_headers = config.extra_headers();
    if !extra_headers.is_empty() {
        println!();
        println!("📡 Extra Headers:");
        for name in extra_headers.keys() {
            println!("  {}", name);
        }
    }

    // 輸出分析
    println!();
    println!("💾 Output Configuration:");
    println!("  Path: {}", config.output_path());
    if config.compress_output() {
        println!("  Compression: {}.zip (ZIP)", config.output_filename());
    } else {
        println!("  Files: {}.<format>", config.output_filename());
    }

    println!();
    println!("✅ Dry run analysis complete. Use --verbose for more details during actual run.");

    Ok(())
}
