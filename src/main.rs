use std::io;

use clap::Parser;
use tokio::io::AsyncReadExt;

use mapcam::config::{CameraConfig, ConfigError};
use mapcam::engine::CameraCore;
use mapcam::replay::{self, JsonLinesSurface, Pace, ReplayError};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to read script {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Replay(#[from] ReplayError),
}

#[derive(Parser, Debug)]
#[command(name = "mapcam", about = "Replay camera events through the coordination core")]
struct Cli {
    #[arg(long, default_value = "-", help = "Script file path, or - for stdin")]
    script: String,

    #[arg(long, env = "MAPCAM_REALTIME", default_value_t = false, help = "Sleep until each event's offset")]
    realtime: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt().with_writer(io::stderr).init();

    let cli = Cli::parse();
    let config = CameraConfig::from_env()?;
    let text = read_script(&cli.script).await?;
    let script = replay::parse_script(text.as_bytes())?;
    tracing::info!(events = script.len(), realtime = cli.realtime, "script loaded");

    let pace = if cli.realtime { Pace::Realtime } else { Pace::Virtual };
    let mut core = CameraCore::new(JsonLinesSurface::new(io::stdout().lock()), config);
    replay::run_script(&mut core, &script, pace).await;

    let surface = core.into_surface();
    let written = surface.written();
    surface.finish()?;
    tracing::info!(commands = written, "replay complete");
    Ok(())
}

async fn read_script(path: &str) -> Result<String, CliError> {
    let read = if path == "-" {
        let mut text = String::new();
        tokio::io::stdin().read_to_string(&mut text).await.map(|_| text)
    } else {
        tokio::fs::read_to_string(path).await
    };
    read.map_err(|source| CliError::Read { path: path.to_owned(), source })
}
