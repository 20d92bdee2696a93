use clap::Parser;
use ipcard::server::run_server;
use ipcard::utils::{logger, validation::Validate};
use ipcard::{build_orchestrator, AppSettings, CardError, ServerConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = ServerConfig::parse();

    // 初始化日誌
    logger::init_logger(cli.verbose, cli.log_json);

    tracing::info!("Starting ipcard server");

    // 設定有誤就不啟動
    let settings = match AppSettings::load(&cli).and_then(|s| s.validate().map(|_| s)) {
        Ok(settings) => settings,
        Err(e) => fail_startup(e),
    };
    if cli.verbose {
        tracing::debug!(
            "Settings: bind={}, source={:?}, geo={}, address={}, timeout={:?}, routes={:?}",
            settings.bind,
            settings.address_source,
            settings.geo_endpoint,
            settings.address_endpoint,
            settings.timeout,
            settings.routes
        );
    }

    let orchestrator = match build_orchestrator(&settings) {
        Ok(orchestrator) => orchestrator,
        Err(e) => fail_startup(e),
    };

    run_server(orchestrator, &settings.routes, &settings.bind).await?;

    tracing::info!("👋 Server stopped");
    Ok(())
}

fn fail_startup(e: CardError) -> ! {
    tracing::error!(
        "❌ Configuration validation failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    std::process::exit(e.severity().exit_code());
}
