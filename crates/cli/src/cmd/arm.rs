use anyhow::Result;
use clap::Args;
use serde_json::Value;

use watchdog_core::alert::Metadata;

use super::helpers;
use crate::output::{print_json, print_note, print_success, spinner, theme, OutputMode};

#[derive(Args)]
pub struct ModifyArgs {
    #[arg(help = "Alert UUID")]
    pub(crate) uuid: String,

    #[arg(long = "meta", value_parser = helpers::parse_meta_pair, help = "Replace metadata with these key=value entries")]
    pub(crate) meta: Vec<(String, Value)>,

    #[arg(long, conflicts_with = "meta", help = "Replace metadata with an empty object")]
    pub(crate) clear_metadata: bool,
}

impl ModifyArgs {
    /// `None` leaves the stored metadata alone.
    pub(crate) fn metadata(&self) -> Option<Metadata> {
        if self.clear_metadata {
            Some(Metadata::new())
        } else if self.meta.is_empty() {
            None
        } else {
            Some(helpers::collect_meta(self.meta.clone()))
        }
    }
}

pub async fn execute(
    args: ModifyArgs,
    enabled: bool,
    mode: OutputMode,
    server: Option<String>,
    config_path: Option<String>,
) -> Result<()> {
    let session = helpers::connect(server.as_deref(), config_path.as_deref())?;
    let o = &session.orchestrator;
    let metadata = args.metadata();
    let replaced = metadata.is_some();

    let sp = match mode {
        OutputMode::Human => Some(spinner::create(if enabled {
            "Arming alert..."
        } else {
            "Disarming alert..."
        })),
        OutputMode::Json => None,
    };

    let result = match (enabled, metadata) {
        (true, None) => o.arm(&args.uuid).await,
        (false, None) => o.disarm(&args.uuid).await,
        (true, Some(m)) => o.arm_with_metadata(&args.uuid, m).await,
        (false, Some(m)) => o.disarm_with_metadata(&args.uuid, m).await,
    };

    if let Some(sp) = &sp {
        spinner::finish_clear(sp);
    }
    result.map_err(helpers::explain)?;

    match mode {
        OutputMode::Json => print_json(&serde_json::json!({
            "uuid": args.uuid,
            "enabled": enabled,
            "metadata_replaced": replaced,
        }))?,
        OutputMode::Human => {
            print_success(if enabled { "Alert armed" } else { "Alert disarmed" });
            theme::print_field("UUID", &args.uuid);
            if replaced {
                print_note("metadata replaced");
            }
        }
    }

    Ok(())
}
