use anyhow::Result;
use serde::Serialize;

use crate::output::{print_json, theme, OutputMode};

#[derive(Serialize)]
struct VersionInfo {
    name: &'static str,
    version: &'static str,
    core: &'static str,
    arch: &'static str,
    os: &'static str,
}

pub fn execute(mode: OutputMode) -> Result<()> {
    let info = VersionInfo {
        name: "watchdog",
        version: env!("CARGO_PKG_VERSION"),
        core: watchdog_core::VERSION,
        arch: std::env::consts::ARCH,
        os: std::env::consts::OS,
    };

    match mode {
        OutputMode::Json => print_json(&info)?,
        OutputMode::Human => {
            theme::print_title(info.name);
            theme::print_field("Version", info.version);
            theme::print_field("Core", info.core);
            theme::print_field("Arch", info.arch);
            theme::print_field("OS", info.os);
            println!();
        }
    }

    Ok(())
}
