use clap::Parser;
use freshscan::{cli, config, error, file, session, client};
use cli::{Cli, Commands};
use client::{AnalysisClient, AnalyzeOptions};
use config::Config;
use error::{FreshScanError, Result};
use file::SelectedFile;
use freshscan_common::AnalysisResult;
use session::AnalyzerSession;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();

    let config = Config::load()?;

    match cli.command {
        Commands::Analyze { image, output, timeout_ms } => {
            println!("🍎 freshscan - 鮮度解析\n");

            let client = AnalysisClient::new(&config)?;
            match client.base() {
                Some(base) => println!("解析API: {}", base),
                None => println!("モックモード（ベースURL未設定）"),
            }

            let mut session = AnalyzerSession::new(client);
            let selected = SelectedFile::from_path(&image).await?;
            if !session.set_file(selected) {
                return Err(FreshScanError::InvalidFile(session.error().unwrap_or_default()));
            }

            // Ctrl+Cでリクエストを中断
            let cancel = CancellationToken::new();
            let relay = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    relay.cancel();
                }
            });

            let mut options = AnalyzeOptions::default().with_cancel(cancel);
            if let Some(ms) = timeout_ms {
                options = options.with_timeout(Duration::from_millis(ms));
            }

            println!("解析中...");
            session.analyze_with(options).await;

            if let Some(message) = session.error() {
                return Err(FreshScanError::Analysis(message));
            }

            if let Some(result) = session.result() {
                print_result(&result);

                if let Some(path) = output {
                    client::save_assessment(&path, &result).await?;
                    println!("✔ 結果を保存: {}", path.display());
                }
            }
        }

        Commands::Load { input } => {
            let client = AnalysisClient::new(&config)?;
            let mut session = AnalyzerSession::new(client);

            let selected = SelectedFile::from_path(&input).await?;
            session.load_assessment(&selected).await;

            if let Some(message) = session.error() {
                return Err(FreshScanError::Analysis(message));
            }
            if let Some(result) = session.result() {
                print_result(&result);
            }
        }

        Commands::Config { set_api_base, clear_api_base, show } => {
            let mut config = config;

            if let Some(base) = set_api_base {
                config.set_api_base(Some(base));
                config.save()?;
                println!("✔ ベースURLを設定しました");
            }

            if clear_api_base {
                config.set_api_base(None);
                config.save()?;
                println!("✔ ベースURLを削除しました（モックモード）");
            }

            if show {
                println!("設定:");
                println!("  ベースURL: {}", config.api_base().unwrap_or_else(|| "未設定（モックモード）".into()));
                println!("  タイムアウト: {}ms", config.timeout_ms);
            }
        }
    }

    Ok(())
}

fn print_result(result: &AnalysisResult) {
    println!("\n判定: {}", result.quality);
    println!("信頼度: {:.0}%", result.confidence * 100.0);
    for indicator in &result.indicators {
        match &indicator.unit {
            Some(unit) => println!("  {}: {} {}", indicator.name, indicator.value, unit),
            None => println!("  {}: {}", indicator.name, indicator.value),
        }
    }
}
