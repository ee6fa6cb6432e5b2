mod cmd;
mod output;
mod shutdown;

use std::process::ExitCode;

use clap::Parser;
use cmd::Commands;
use output::OutputMode;
use tracing_subscriber::EnvFilter;
use watchdog_core::AlertError;

#[derive(Parser)]
#[command(name = "watchdog", version, about = "Dead-man's-switch alerts for signed artifacts")]
pub struct Opts {
    #[clap(subcommand)]
    cmd: Commands,

    #[arg(long, global = true, help = "Output as JSON")]
    json: bool,

    #[arg(long, global = true, help = "API base URL (overrides config)")]
    server: Option<String>,

    #[arg(long, global = true, help = "Path to watchdog config file")]
    config: Option<String>,

    #[arg(long, global = true, help = "Emit logs as JSON")]
    log_json: bool,
}

impl Opts {
    pub fn output_mode(&self) -> OutputMode {
        if self.json {
            OutputMode::Json
        } else {
            OutputMode::Human
        }
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn report_error(mode: OutputMode, err: &anyhow::Error) {
    let kind = err
        .downcast_ref::<AlertError>()
        .map_or("error", AlertError::kind);
    match mode {
        OutputMode::Json => {
            let body = serde_json::json!({ "error": kind, "message": format!("{err:#}") });
            if output::print_json(&body).is_err() {
                output::print_error(&format!("{err:#}"));
            }
        }
        OutputMode::Human => output::print_error(&format!("{err:#}")),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let opts = Opts::parse();
    init_tracing(opts.log_json);
    let mode = opts.output_mode();
    match cmd::run(opts).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report_error(mode, &e);
            ExitCode::FAILURE
        }
    }
}
