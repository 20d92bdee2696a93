use clap::Parser;
use ipcard::utils::{logger, validation::Validate};
use ipcard::{build_orchestrator, AppSettings, ServerConfig};
use std::path::PathBuf;

/// 不啟動 HTTP 服務，直接替指定 IP 產生一張圖片
#[derive(Parser)]
#[command(name = "render-card")]
#[command(about = "Render the IP card for one address to a PNG file")]
struct Args {
    /// IP address to describe
    #[arg(long)]
    ip: String,

    /// Where to write the PNG
    #[arg(short, long, default_value = "./card.png")]
    output: PathBuf,

    #[command(flatten)]
    server: ServerConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    logger::init_logger(args.server.verbose, args.server.log_json);

    let settings = AppSettings::load(&args.server)?;
    if let Err(e) = settings.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(e.severity().exit_code());
    }

    let orchestrator = build_orchestrator(&settings)?;

    match orchestrator.handle(&args.ip).await {
        Ok(report) => {
            tokio::fs::write(&args.output, report.as_bytes()).await?;
            tracing::info!("📁 Output saved to: {}", args.output.display());
            println!("✅ Card for {} saved to {}", args.ip, args.output.display());
        }
        Err(e) => {
            tracing::error!(
                "❌ Rendering failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e);
            eprintln!("💡 建議: {}", e.recovery_suggestion());
            std::process::exit(e.severity().exit_code());
        }
    }

    Ok(())
}
