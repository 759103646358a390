use anyhow::Context;
use bookly_kernel::settings::Settings;
use clap::{Parser, Subcommand};

/// Bookly book records service
#[derive(Debug, Parser)]
#[command(name = "bookly", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP API until interrupted
    Serve,
    /// Apply pending database migrations and exit
    Migrate,
    /// Print the resolved configuration
    Config,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load().with_context(|| "failed to load Bookly settings")?;

    match cli.command {
        Command::Config => print_config(&settings),
        Command::Serve => {
            bookly_telemetry::init(&settings.telemetry)?;
            runtime()?.block_on(bookly_app::bootstrap::serve(settings))
        }
        Command::Migrate => {
            bookly_telemetry::init(&settings.telemetry)?;
            let applied = runtime()?.block_on(bookly_app::bootstrap::migrate_only(&settings))?;
            tracing::info!(applied, "migrate finished");
            Ok(())
        }
    }
}

fn runtime() -> anyhow::Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new().context("failed to start tokio runtime")
}

fn print_config(settings: &Settings) -> anyhow::Result<()> {
    let mut resolved = serde_json::to_value(settings).context("failed to serialize settings")?;
    resolved["database"]["url"] = bookly_db::redact_url(&settings.database.url).into();
    resolved["database"]["test_url"] = bookly_db::redact_url(&settings.database.test_url).into();
    resolved["database"]["selected_url"] = bookly_db::redact_url(&settings.database_url()).into();

    let rendered =
        serde_json::to_string_pretty(&resolved).context("failed to render settings")?;
    println!("{}", rendered);
    Ok(())
}
