use anyhow::Context;
use clap::Parser;
use ulcer_etl::core::preflight;
use ulcer_etl::core::ConfigProvider;
use ulcer_etl::utils::{logger, validation::Validate};
use ulcer_etl::{EtlEngine, LocalStorage, OllamaClient, TomlConfig, UlcerPipeline};

#[derive(Parser)]
#[command(name = "toml-extract")]
#[command(about = "Ulcer parameter extraction driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "ulcer-etl.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Check input and model availability without running inference
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    logger::init_cli_logger(args.verbose);

    tracing::info!("🚀 Starting TOML-based ulcer extraction");
    tracing::info!("📁 Loading configuration from: {}", args.config);

    let config = TomlConfig::from_file(&args.config)
        .with_context(|| format!("failed to load config file '{}'", args.config))?;

    if let Err(e) = config.validate() {
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        return Err(e).context("configuration validation failed");
    }

    tracing::info!("✅ Configuration loaded and validated successfully");
    display_config_summary(&config, &args);

    let storage = LocalStorage::current_dir();
    let client = OllamaClient::new(config.ollama_endpoint());

    if args.dry_run {
        let report = preflight::dry_run(&storage, &config, &client)
            .await
            .context("dry run failed")?;
        report.print();
        return Ok(());
    }

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let pipeline = UlcerPipeline::new(storage, config, client);
    let engine = EtlEngine::new_with_monitoring(pipeline, monitor_enabled);

    let summary = engine.run().await.map_err(|e| {
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
        anyhow::Error::new(e).context("extraction failed")
    })?;

    println!(
        "✅ {} notes extracted, {} skipped",
        summary.processed, summary.failed
    );
    println!("📁 Output saved to: {}", summary.output_path);
    Ok(())
}

fn display_config_summary(config: &TomlConfig, args: &Args) {
    println!("📋 Configuration Summary:");
    println!(
        "  Pipeline: {} v{}",
        config.pipeline.name, config.pipeline.version
    );
    if let Some(description) = &config.pipeline.description {
        println!("  Description: {}", description);
    }
    println!("  Input: {} (column '{}')", config.input_path(), config.note_column());
    println!("  Model: {} @ {}", config.model(), config.ollama_endpoint());
    println!("  Output: {}", config.output_path());

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}
