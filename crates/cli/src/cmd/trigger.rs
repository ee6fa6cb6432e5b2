use anyhow::Result;
use clap::Args;

use watchdog_core::FireOutcome;

use super::helpers;
use crate::output::{confirm, print_json, print_note, print_success, spinner, OutputMode};

#[derive(Args)]
pub struct TriggerArgs {
    #[arg(help = "Alert UUID")]
    pub(crate) uuid: String,

    #[arg(long, help = "Skip confirmation prompt")]
    pub(crate) yes: bool,
}

pub async fn execute(
    args: TriggerArgs,
    mode: OutputMode,
    server: Option<String>,
    config_path: Option<String>,
) -> Result<()> {
    let session = helpers::connect(server.as_deref(), config_path.as_deref())?;

    if mode == OutputMode::Human && !args.yes {
        let msg = format!("Send the notification for {} now?", args.uuid);
        if !confirm::confirm_action(&msg) {
            print_note("Cancelled.");
            return Ok(());
        }
    }

    let sp = match mode {
        OutputMode::Human => Some(spinner::create("Triggering...")),
        OutputMode::Json => None,
    };
    let result = session.orchestrator.fire_now(&args.uuid).await;
    if let Some(sp) = &sp {
        spinner::finish_clear(sp);
    }
    let outcome = result.map_err(helpers::explain)?;

    match mode {
        OutputMode::Json => print_json(&serde_json::json!({
            "uuid": args.uuid,
            "outcome": outcome,
        }))?,
        OutputMode::Human => match outcome {
            FireOutcome::Fired => print_success("Notification sent"),
            FireOutcome::AlreadyFired => print_success("Notification was already sent"),
        },
    }

    Ok(())
}
