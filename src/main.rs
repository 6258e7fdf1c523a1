// Statsheet entry point.
//
// Startup sequence:
// 1. Parse the command line
// 2. Initialize tracing (log to file, stdout carries command output)
// 3. Load config
// 4. Open database and restore the saved rows
// 5. Run the command

use statsheet::app;
use statsheet::cli::Cli;
use statsheet::config;
use statsheet::db;

use anyhow::Context;
use clap::Parser;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing()?;
    info!("statsheet starting: {:?}", cli.command);

    let config = config::load_config().context("failed to load configuration")?;

    let db = db::Database::open(&config.session.db_path).context("failed to open database")?;
    info!("Database opened at {}", config.session.db_path);

    let mut state = app::AppState::new(config, db)?;
    app::restore_session(&mut state)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    app::execute(&mut state, cli.command, &mut out).await?;

    info!("statsheet finished");
    Ok(())
}

/// Initialize tracing to log to a file so stdout stays clean for output.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("statsheet.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("statsheet=info,warn")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
