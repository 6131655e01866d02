use std::process::ExitCode;

use dotenvy::dotenv;
use tracing::{error, info};

fn init_logging() {
    dotenv().ok();
    let json = configs::AppConfig::load_and_validate().map(|c| c.logging.json).unwrap_or(false);
    common::utils::logging::init_logging(json);
    info!(service = "devserver", event = "logger_init", "tracing subscriber initialized");
}

fn main() -> ExitCode {
    init_logging();

    let pid = std::process::id();
    let version = env!("CARGO_PKG_VERSION");

    std::panic::set_hook(Box::new(move |info| {
        error!(service = "devserver", event = "panic", pid, message = %info, "unhandled panic occurred");
    }));

    let rt = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(service = "devserver", event = "runtime_build_failed", error = %e, "failed to build tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    info!(service = "devserver", event = "start", pid, version, "development backend starting");

    rt.block_on(async move {
        let server_task = tokio::spawn(server::run());
        tokio::select! {
            res = server_task => match res {
                Ok(Ok(())) => {
                    info!(service = "devserver", event = "stop", pid, "development backend stopped");
                    ExitCode::SUCCESS
                }
                Ok(Err(e)) => {
                    error!(service = "devserver", event = "run_failed", error = %e, "server::run returned error");
                    ExitCode::FAILURE
                }
                Err(e) => {
                    error!(service = "devserver", event = "task_join_error", error = %e, "server task join error");
                    ExitCode::FAILURE
                }
            },
            _ = tokio::signal::ctrl_c() => {
                info!(service = "devserver", event = "shutdown_signal", pid, "received Ctrl+C, shutting down");
                ExitCode::SUCCESS
            }
        }
    })
}
