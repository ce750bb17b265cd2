//! email-alert - send one HA-Lizard alert email and exit.

use std::time::Duration;

use anyhow::Result;
use tracing::{error, info};

use halizard_alert::cli::{Cli, LogFormat, usage_banner};
use halizard_alert::hostname::local_hostname;
use halizard_alert::logging::init_logging;
use halizard_alert::{AlertRequest, Transport, TransportConfig, echo_lines, send_alert};

/// Grace period for blocking tasks (a stuck DNS lookup) when the runtime shuts down.
const RUNTIME_SHUTDOWN_GRACE: Duration = Duration::from_millis(100);

fn main() -> Result<()> {
    let args: Vec<_> = std::env::args_os().collect();
    let program = args
        .first()
        .map(|a| a.to_string_lossy().into_owned())
        .unwrap_or_else(|| "email-alert".to_string());

    // Wrong argument count: usage only, no network activity.
    let cli = match Cli::try_from_args(args) {
        Ok(cli) => cli,
        Err(_) => {
            println!("{}", usage_banner(&program));
            std::process::exit(1);
        }
    };

    init_logging(LogFormat::from_env());

    let request = match AlertRequest::try_from(cli) {
        Ok(r) => r,
        Err(e) => {
            error!(error = %e, "Invalid alert arguments");
            println!("Error occurred: {}", e);
            std::process::exit(1);
        }
    };

    let hostname = local_hostname();
    for line in echo_lines(&request, &hostname) {
        println!("{}", line);
    }

    let transport = Transport::new(TransportConfig::default());

    // Single-threaded: one blocking send attempt, then exit.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(send_alert(&request, &hostname, &transport));
    runtime.shutdown_timeout(RUNTIME_SHUTDOWN_GRACE);

    match result {
        Ok(()) => {
            info!(to = %request.to_email, "email-alert finished");
            Ok(())
        }
        Err(e) => {
            println!("Failed to send email: {}", e);
            std::process::exit(1);
        }
    }
}
