use anyhow::Result;
use clap::Subcommand;

use watchdog_core::identity::TOKEN_ENV;

use super::helpers;
use crate::output::{print_json, theme, OutputMode};

#[derive(Subcommand)]
pub enum ConfigCmd {
    /// Print the resolved configuration, token redacted
    Show,
    /// Print the config file location
    Path,
}

pub fn execute(
    cmd: ConfigCmd,
    mode: OutputMode,
    server: Option<String>,
    config_path: Option<String>,
) -> Result<()> {
    match cmd {
        ConfigCmd::Show => show(mode, server, config_path),
        ConfigCmd::Path => path(mode, config_path),
    }
}

fn show(mode: OutputMode, server: Option<String>, config_path: Option<String>) -> Result<()> {
    let cfg = helpers::load_config(config_path.as_deref(), server.as_deref())?.redacted();
    let env_token = std::env::var(TOKEN_ENV).is_ok_and(|t| !t.trim().is_empty());

    match mode {
        OutputMode::Json => print_json(&serde_json::json!({
            "config": cfg,
            "token_from_env": env_token,
        }))?,
        OutputMode::Human => {
            theme::print_title("Watchdog Configuration");

            theme::print_section("API");
            theme::print_field("Endpoint", &cfg.api.endpoint);
            let token = match (env_token, cfg.api.token.as_deref()) {
                (true, _) => format!("<from {TOKEN_ENV}>"),
                (false, Some(t)) => t.to_string(),
                (false, None) => "<not set>".to_string(),
            };
            theme::print_field_toned(
                "Token",
                &token,
                theme::Tone::from_ok(env_token || cfg.api.token.is_some()),
            );
            theme::print_field("Timeout", &format!("{} ms", cfg.api.timeout_ms));

            theme::print_section("Heartbeat");
            theme::print_field("Interval", &format!("{}s", cfg.heartbeat.interval_seconds));
            theme::print_field("Jitter", &format!("{:.0}%", cfg.heartbeat.jitter_fraction * 100.0));
            theme::print_field_toned(
                "Stop on trigger",
                &cfg.heartbeat.stop_on_triggered.to_string(),
                theme::Tone::from_ok(cfg.heartbeat.stop_on_triggered),
            );
            println!();
        }
    }

    Ok(())
}

fn path(mode: OutputMode, config_path: Option<String>) -> Result<()> {
    let p = helpers::resolve_config_path(config_path.as_deref());
    match mode {
        OutputMode::Json => print_json(&serde_json::json!({ "path": p }))?,
        OutputMode::Human => println!("{}", p.display()),
    }
    Ok(())
}
