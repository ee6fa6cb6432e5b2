use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use serde_json::Value;

use watchdog_core::identity::{ArtifactHasher, ArtifactIdentity, ArtifactRef, FileHasher};

use super::helpers;
use crate::output::{print_json, print_success, spinner, theme, OutputMode};

#[derive(Args)]
#[command(group(clap::ArgGroup::new("artifact").required(true).args(["hash", "file"])))]
pub struct CreateArgs {
    #[arg(long, help = "Artifact content hash")]
    pub(crate) hash: Option<String>,

    #[arg(long, help = "Hash this local file (docker:<image> is not supported)")]
    pub(crate) file: Option<ArtifactRef>,

    #[arg(long, help = "Commitment produced when the artifact was signed")]
    pub(crate) meta_hash: String,

    #[arg(long = "meta", value_parser = helpers::parse_meta_pair, help = "Metadata entry key=value (repeatable)")]
    pub(crate) meta: Vec<(String, Value)>,

    #[arg(long, help = "Create the alert disabled")]
    pub(crate) disabled: bool,
}

#[derive(Serialize)]
struct CreateOutput {
    uuid: String,
    artifact_hash: String,
    artifact_meta_hash: String,
    enabled: bool,
}

pub async fn execute(
    args: CreateArgs,
    mode: OutputMode,
    server: Option<String>,
    config_path: Option<String>,
) -> Result<()> {
    let session = helpers::connect(server.as_deref(), config_path.as_deref())?;

    let hash = match (&args.hash, &args.file) {
        (Some(h), _) => h.clone(),
        (None, Some(artifact)) => FileHasher
            .hash(artifact)
            .with_context(|| format!("hashing {artifact}"))?,
        (None, None) => anyhow::bail!("one of --hash or --file is required"),
    };
    let identity = ArtifactIdentity::new(hash, args.meta_hash);
    let metadata = helpers::collect_meta(args.meta);
    let enabled = !args.disabled;

    let sp = match mode {
        OutputMode::Human => Some(spinner::create("Creating alert...")),
        OutputMode::Json => None,
    };

    let result = session
        .orchestrator
        .create_with(&identity, enabled, metadata)
        .await;

    if let Some(sp) = &sp {
        spinner::finish_clear(sp);
    }
    let uuid = result.map_err(helpers::explain)?;

    let out = CreateOutput {
        uuid,
        artifact_hash: identity.hash,
        artifact_meta_hash: identity.meta_hash,
        enabled,
    };

    match mode {
        OutputMode::Json => print_json(&out)?,
        OutputMode::Human => {
            print_success("Alert created");
            theme::print_field("UUID", &out.uuid);
            theme::print_field("Artifact hash", &out.artifact_hash);
            theme::print_field("Commitment", &out.artifact_meta_hash);
            theme::print_field_toned(
                "State",
                if enabled { "armed" } else { "disabled" },
                theme::Tone::from_ok(enabled),
            );
        }
    }

    Ok(())
}
