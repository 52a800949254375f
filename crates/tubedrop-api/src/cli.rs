//! Command line flags for the `tubedrop` binary.

use clap::{ArgAction, Parser};
use tubedrop_core::Config;

/// Download media from a URL and publish it behind a short-lived link.
#[derive(Debug, Parser)]
#[command(name = "tubedrop", version, about)]
pub struct Cli {
    /// Publish into a local directory served by this process instead of S3.
    #[arg(long)]
    pub local: bool,

    /// S3 bucket to publish into.
    #[arg(long, env = "S3_BUCKET")]
    pub bucket: Option<String>,

    /// Port to listen on (overrides PORT).
    #[arg(long)]
    pub port: Option<u16>,

    /// Increase log verbosity (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Apply the flags on top of environment configuration.
    pub fn apply(&self, config: &mut Config) {
        if let Some(port) = self.port {
            config.set_server_port(port);
        }
        if let Some(bucket) = &self.bucket {
            config.set_s3_bucket(bucket.clone());
        }
        if self.local {
            config.use_local_storage();
        }
    }

    /// Log filter used when RUST_LOG is not set.
    pub fn default_log_filter(&self) -> String {
        let level = match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        };
        [
            "tubedrop",
            "tubedrop_api",
            "tubedrop_services",
            "tubedrop_processing",
            "tubedrop_container",
            "tubedrop_storage",
            "tower_http",
        ]
        .iter()
        .fold("warn".to_string(), |filter, target| {
            format!("{},{}={}", filter, target, level)
        })
    }
}
