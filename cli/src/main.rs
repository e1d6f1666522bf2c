mod commands;
mod terminal;

use commands::{CommandLine, Commands, discover, request};
use terminal::logging;
use tokio_util::sync::CancellationToken;
use tracing::warn;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();

    if commands.options.no_color {
        colored::control::set_override(false);
    }
    logging::init(commands.options.quiet);

    let cfg = commands.options.to_config()?;
    let quiet = commands.options.quiet;

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, remaining targets will be skipped");
            on_interrupt.cancel();
        }
    });

    match commands.command {
        Commands::Discover(args) => discover::discover(args, cfg, quiet, &cancel).await,
        Commands::Request { file } => request::request(file, cfg, &cancel).await,
    }
}
