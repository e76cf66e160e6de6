use daytrack_lib::config::AppConfig;
use log::{error, LevelFilter};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};
use std::process::ExitCode;

fn log_level() -> LevelFilter {
    std::env::var("DAYTRACK_LOG")
        .ok()
        .and_then(|level| level.parse().ok())
        .unwrap_or(LevelFilter::Info)
}

#[tokio::main]
async fn main() -> ExitCode {
    if TermLogger::init(log_level(), Config::default(), TerminalMode::Mixed, ColorChoice::Auto).is_err() {
        return ExitCode::FAILURE;
    }

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };

    match daytrack_lib::run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("daytrack failed: {e}");
            ExitCode::FAILURE
        }
    }
}
