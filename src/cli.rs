//! Command-line interface for `email-alert` using clap.
//!
//! The supervisor passes ten positional values and nothing else. Every value is
//! data, so clap's help and version flags are disabled and the arguments are
//! fed to the parser behind a `--` separator: a message body such as `--` or
//! `-v` is kept verbatim.

use std::ffi::OsString;

use clap::{Parser, ValueEnum};

use crate::error::UsageError;

/// Number of positional arguments, excluding the program name.
pub const ARG_COUNT: usize = 10;

/// Environment variable selecting the log format.
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Log output format for the stderr subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable text format (default).
    #[default]
    Text,
    /// Structured JSON format for log aggregation.
    Json,
}

impl LogFormat {
    /// Read the format from `LOG_FORMAT`, falling back to text when the
    /// variable is unset or holds an unknown value.
    pub fn from_env() -> Self {
        std::env::var(LOG_FORMAT_ENV)
            .ok()
            .and_then(|v| LogFormat::from_str(&v, true).ok())
            .unwrap_or_default()
    }
}

/// Positional arguments of one alert invocation, in supervisor order.
#[derive(Parser, Debug)]
#[command(name = "email-alert")]
#[command(disable_help_flag = true, disable_version_flag = true)]
pub struct Cli {
    pub from_email: String,
    pub to_email: String,
    pub subject: String,
    pub timestamp: String,
    pub process_name: String,
    pub message_body: String,
    pub smtp_server: String,
    pub smtp_port: String,
    pub smtp_user: String,
    pub smtp_pass: String,
}

impl Cli {
    /// Parse a full argv (program name first).
    ///
    /// The count is checked before clap sees anything so that a wrong count
    /// always maps to [`UsageError::WrongArgumentCount`].
    pub fn try_from_args<I, T>(args: I) -> Result<Self, UsageError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let mut args: Vec<OsString> = args.into_iter().map(Into::into).collect();
        let got = args.len().saturating_sub(1);
        if got != ARG_COUNT {
            return Err(UsageError::WrongArgumentCount {
                expected: ARG_COUNT,
                got,
            });
        }

        args.insert(1, OsString::from("--"));
        Cli::try_parse_from(args).map_err(|e| UsageError::Malformed(e.to_string()))
    }
}

/// Arguments of the install-time `post-version` reporter.
#[derive(Parser, Debug)]
#[command(name = "post-version")]
#[command(disable_help_flag = true, disable_version_flag = true)]
pub struct PostVersionCli {
    /// Version string reported to the counting endpoint.
    pub version: String,
}

impl PostVersionCli {
    pub fn try_from_args<I, T>(args: I) -> Result<Self, UsageError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let mut args: Vec<OsString> = args.into_iter().map(Into::into).collect();
        let got = args.len().saturating_sub(1);
        if got != 1 {
            return Err(UsageError::WrongArgumentCount { expected: 1, got });
        }

        args.insert(1, OsString::from("--"));
        PostVersionCli::try_parse_from(args).map_err(|e| UsageError::Malformed(e.to_string()))
    }
}

/// Usage line printed to stderr by `post-version`.
pub fn post_version_usage(program: &str) -> String {
    format!("Usage: {program} <version_number>")
}

/// Usage banner printed to stdout when the argument count is wrong.
pub fn usage_banner(program: &str) -> String {
    format!(
        "HA-Lizard email alert sender. Version 1.0 www.halizard.com\n\
         Pass in all command line arguments as follows\n\
         {program} from_email to_email subject timestamp process_name message_body smtp_server smtp_port smtp_user smtp_pass"
    )
}
