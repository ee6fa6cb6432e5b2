use anyhow::Result;
use clap::Args;

use watchdog_core::HeartbeatStatus;

use super::helpers;
use crate::output::{print_json, print_success, print_warning, spinner, OutputMode};

#[derive(Args)]
pub struct PingArgs {
    #[arg(help = "Alert UUID")]
    pub(crate) uuid: String,
}

pub async fn execute(
    args: PingArgs,
    mode: OutputMode,
    server: Option<String>,
    config_path: Option<String>,
) -> Result<()> {
    let session = helpers::connect(server.as_deref(), config_path.as_deref())?;

    let sp = match mode {
        OutputMode::Human => Some(spinner::create("Pinging...")),
        OutputMode::Json => None,
    };
    let result = session.orchestrator.heartbeat(&args.uuid).await;
    if let Some(sp) = &sp {
        spinner::finish_clear(sp);
    }
    let status = result.map_err(helpers::explain)?;

    match mode {
        OutputMode::Json => print_json(&serde_json::json!({
            "uuid": args.uuid,
            "status": status,
        }))?,
        OutputMode::Human => match status {
            HeartbeatStatus::Alive => print_success("alive"),
            HeartbeatStatus::AlreadyTriggered => {
                print_warning("already triggered: the notification has been sent")
            }
        },
    }

    Ok(())
}
