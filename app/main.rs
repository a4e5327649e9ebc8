use clap::Parser as _;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, filter::LevelFilter, layer::SubscriberExt as _,
};

mod app;
mod chain_client;
mod cli;
mod rpc_server;

use app::App;

const LOG_FILE_PREFIX: &str = "dispute_ledger.log";

/// The returned guard must be held until exit, or buffered file logs are
/// lost
fn set_tracing_subscriber(
    config: &cli::Config,
) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::builder()
        .with_default_directive(
            LevelFilter::from_level(config.log_level).into(),
        )
        .from_env_lossy();
    let (json_layer, stdout_layer) = if config.log_json {
        let json_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_file(true)
            .with_line_number(true);
        (Some(json_layer), None)
    } else {
        let stdout_layer = tracing_subscriber::fmt::layer()
            .with_ansi(std::io::IsTerminal::is_terminal(&std::io::stdout()))
            .with_file(true)
            .with_line_number(true);
        (None, Some(stdout_layer))
    };
    let (file_layer, guard) = match &config.log_dir {
        None => (None, None),
        Some(log_dir) => {
            let appender =
                tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let file_layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer);
            (Some(file_layer), Some(guard))
        }
    };
    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(stdout_layer)
        .with(file_layer);
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(guard)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = cli::Cli::parse().get_config()?;
    let _log_guard = set_tracing_subscriber(&config)?;
    let app = App::new(&config).await?;
    let (rpc_addr, handle) =
        rpc_server::run_server(app.clone(), config.rpc_addr).await?;
    tracing::info!(
        %rpc_addr,
        datadir = %config.datadir.display(),
        "serving RPC"
    );
    tokio::select! {
        res = tokio::signal::ctrl_c() => {
            res?;
            tracing::info!("received interrupt");
        }
        () = app.shutdown_requested() => {
            tracing::info!("shutdown requested over RPC");
        }
    }
    handle.stop()?;
    handle.stopped().await;
    tracing::info!("stopped");
    Ok(())
}
