use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;

use watchdog_core::scheduler::{HeartbeatSettings, StopReason};

use super::helpers;
use crate::output::{print_json, print_success, print_warning, spinner, theme, OutputMode};
use crate::shutdown;

#[derive(Args)]
pub struct WatchArgs {
    #[arg(help = "Alert UUID")]
    pub(crate) uuid: String,

    #[arg(long, value_parser = clap::value_parser!(u64).range(1..), help = "Seconds between pings (overrides config)")]
    pub(crate) interval_secs: Option<u64>,
}

const POLL: Duration = Duration::from_millis(250);

pub async fn execute(
    args: WatchArgs,
    mode: OutputMode,
    server: Option<String>,
    config_path: Option<String>,
) -> Result<()> {
    let session = helpers::connect(server.as_deref(), config_path.as_deref())?;

    let mut settings = HeartbeatSettings::from(&session.config.heartbeat);
    if let Some(secs) = args.interval_secs {
        settings.interval = Duration::from_secs(secs);
    }

    let handle = session.orchestrator.watch(&args.uuid, settings);
    let sp = match mode {
        OutputMode::Human => Some(spinner::create(&format!(
            "Watching {} every {}s, Ctrl-C to stop",
            args.uuid,
            settings.interval.as_secs()
        ))),
        OutputMode::Json => None,
    };

    let signal = shutdown::wait_for_shutdown();
    tokio::pin!(signal);
    let mut poll = tokio::time::interval(POLL);
    loop {
        tokio::select! {
            r = &mut signal => {
                r.context("installing signal handler")?;
                break;
            }
            _ = poll.tick() => {
                if handle.is_finished() {
                    break;
                }
                if let Some(sp) = &sp {
                    sp.set_message(format!("Watching {} ({} pings)", args.uuid, handle.pings()));
                }
            }
        }
    }

    let report = handle.stop().await;
    if let Some(sp) = &sp {
        spinner::finish_clear(sp);
    }

    let reason = match &report.reason {
        StopReason::Cancelled => "cancelled",
        StopReason::Triggered => "triggered",
        StopReason::Failed(_) => "failed",
    };

    match mode {
        OutputMode::Json => print_json(&serde_json::json!({
            "uuid": args.uuid,
            "pings": report.pings,
            "reason": reason,
            "error": match &report.reason {
                StopReason::Failed(e) => Some(e.to_string()),
                _ => None,
            },
        }))?,
        OutputMode::Human => {
            match &report.reason {
                StopReason::Cancelled => print_success("Heartbeat stopped"),
                StopReason::Triggered => {
                    print_warning("Alert already triggered, heartbeat stopped")
                }
                StopReason::Failed(_) => {}
            }
            theme::print_field("Pings sent", &report.pings.to_string());
        }
    }

    match report.reason {
        StopReason::Failed(e) => Err(helpers::explain(e)),
        _ => Ok(()),
    }
}
