use clap::Parser;
use ulcer_etl::core::preflight;
use ulcer_etl::core::ConfigProvider;
use ulcer_etl::utils::error::{EtlError, ErrorSeverity};
use ulcer_etl::utils::{logger, validation::Validate};
use ulcer_etl::{CliConfig, EtlEngine, LocalStorage, OllamaClient, UlcerPipeline};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting ulcer-etl CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let storage = LocalStorage::current_dir();
    let client = OllamaClient::new(config.ollama_endpoint());

    if config.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No inference will be performed");
        match preflight::dry_run(&storage, &config, &client).await {
            Ok(report) => report.print(),
            Err(e) => exit_with(e),
        }
        return Ok(());
    }

    let monitor_enabled = config.monitor;
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let pipeline = UlcerPipeline::new(storage, config, client);
    let engine = EtlEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(summary) => {
            tracing::info!(
                "✅ Extraction completed: {} succeeded, {} failed",
                summary.processed,
                summary.failed
            );
            println!("📁 Output saved to: {}", summary.output_path);
        }
        Err(e) => exit_with(e),
    }

    Ok(())
}

fn exit_with(e: EtlError) {
    tracing::error!(
        "❌ Extraction failed: {} (Category: {:?}, Severity: {:?})",
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

    if exit_code > 0 {
        std::process::exit(exit_code);
    }
}
