mod arm;
mod config;
mod create;
pub(crate) mod helpers;
mod ping;
mod trigger;
pub(crate) mod version;
mod watch;

use anyhow::Result;
use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    /// Create an alert bound to an artifact identity
    Create(create::CreateArgs),
    /// Enable an alert
    Arm(arm::ModifyArgs),
    /// Disable an alert
    Disarm(arm::ModifyArgs),
    /// Send one heartbeat
    Ping(ping::PingArgs),
    /// Fire the notification now
    Trigger(trigger::TriggerArgs),
    /// Heartbeat periodically until interrupted
    Watch(watch::WatchArgs),
    #[command(subcommand)]
    Config(config::ConfigCmd),
    Version,
}

pub async fn run(opts: crate::Opts) -> Result<()> {
    let mode = opts.output_mode();
    match opts.cmd {
        Commands::Create(args) => create::execute(args, mode, opts.server, opts.config).await,
        Commands::Arm(args) => arm::execute(args, true, mode, opts.server, opts.config).await,
        Commands::Disarm(args) => arm::execute(args, false, mode, opts.server, opts.config).await,
        Commands::Ping(args) => ping::execute(args, mode, opts.server, opts.config).await,
        Commands::Trigger(args) => trigger::execute(args, mode, opts.server, opts.config).await,
        Commands::Watch(args) => watch::execute(args, mode, opts.server, opts.config).await,
        Commands::Config(cmd) => config::execute(cmd, mode, opts.server, opts.config),
        Commands::Version => version::execute(mode),
    }
}
