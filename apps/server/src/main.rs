use anyhow::Context;
use clap::{Parser, Subcommand};
use parlor_chat::HistoryStore;
use parlor_config::load as load_config;
use parlor_gateway::{create_router, GatewayState};
use parlor_runtime::{shutdown_signal, telemetry, Services};
use tokio::net::TcpListener;
use tracing::info;

#[derive(Parser)]
#[command(name = "parlor-server")]
#[command(about = "Parlor chat relay (serves by default)")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the chat relay server
    Serve,
    /// Print the persisted chat history per room
    DumpHistory,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => run_server().await,
        Commands::DumpHistory => dump_history().await,
    }
}

async fn run_server() -> anyhow::Result<()> {
    telemetry::init_tracing().context("failed to initialise tracing")?;

    info!("starting Parlor chat relay");

    let config = load_config().context("failed to load configuration")?;

    let services = Services::initialise(&config)
        .await
        .context("failed to initialise relay services")?;

    let state = GatewayState::new(services.chat.clone(), config.storage.upload_dir.clone());
    let app = create_router(state);

    let address = format!("{}:{}", config.http.address, config.http.port);
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind http listener on {address}"))?;

    info!(%address, "http server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("http server error")?;

    info!("relay shut down");
    Ok(())
}

async fn dump_history() -> anyhow::Result<()> {
    let config = load_config().context("failed to load configuration")?;
    let history = HistoryStore::load(&config.storage.history_file).await;

    for (room, count) in history.room_summaries() {
        println!("== {room} ({count} messages)");
        for message in history.history_for(&room) {
            println!("  [{:?}] {}: {}", message.kind, message.username, message.body);
        }
    }

    Ok(())
}
