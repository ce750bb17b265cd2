//! post-version - report the installed HA-Lizard version once, at install time.

use anyhow::Result;

use halizard_alert::cli::{LogFormat, PostVersionCli, post_version_usage};
use halizard_alert::logging::init_logging;
use halizard_alert::usage_report::{DEFAULT_REPORT_ENDPOINT, REPORT_TIMEOUT, UsageReporter};

fn main() -> Result<()> {
    let args: Vec<_> = std::env::args_os().collect();
    let program = args
        .first()
        .map(|a| a.to_string_lossy().into_owned())
        .unwrap_or_else(|| "post-version".to_string());

    let cli = match PostVersionCli::try_from_args(args) {
        Ok(cli) => cli,
        Err(_) => {
            eprintln!("{}", post_version_usage(&program));
            std::process::exit(1);
        }
    };

    init_logging(LogFormat::from_env());

    let reporter = UsageReporter::new(DEFAULT_REPORT_ENDPOINT, REPORT_TIMEOUT)?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    match runtime.block_on(reporter.report(&cli.version)) {
        Ok(()) => {
            println!(
                "Usage statistics sent successfully for version {}.",
                cli.version
            );
            Ok(())
        }
        Err(e) => {
            eprintln!("Failed to send usage statistics: {}", e);
            std::process::exit(1);
        }
    }
}
