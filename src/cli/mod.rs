//! CLI module - argument definitions and entry points for both binaries

pub mod index;
pub mod query;

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{Config, Credential, Settings};

/// Exit status for usage errors
pub const USAGE_EXIT: u8 = 1;

/// Initialize tracing on stderr; stdout carries only results
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "docrag=info,warn".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

/// Parse arguments, mapping every usage error to [`USAGE_EXIT`]
fn parse_args<T: Parser>() -> Result<T, ExitCode> {
    T::try_parse().map_err(|e| {
        let _ = e.print();
        if e.use_stderr() {
            ExitCode::from(USAGE_EXIT)
        } else {
            // --help and --version
            ExitCode::SUCCESS
        }
    })
}

/// Read the credential, then the config file, into one [`Settings`].
///
/// The credential check comes first so a missing key fails before any
/// other file is touched.
pub fn load_settings(
    config_path: Option<&Path>,
    api_base: Option<String>,
) -> anyhow::Result<Settings> {
    dotenv::dotenv().ok();
    let credential = Credential::from_env()?;
    let config = Config::load(config_path)?;
    Ok(Settings::new(credential, config).with_api_base(api_base))
}

fn finish(result: anyhow::Result<()>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
