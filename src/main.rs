use clap::Parser;
use docgen::Config;
use docgen::cli::{Cli, run};
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// `RUST_LOG` if set, else `LOG_LEVEL`, else `info`.
fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| {
            let level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into());
            EnvFilter::try_new(level.trim().to_ascii_lowercase())
        })
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(env_filter())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let result = match Config::from_env() {
        Ok(config) => run(cli.command, &config).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!("{:?}", e);
            eprintln!("error: {e}");
            ExitCode::from(e.exit_code())
        },
    }
}
