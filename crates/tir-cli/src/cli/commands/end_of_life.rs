//! `tir end-of-life` - Show the deprecation date for this registry version.

use anyhow::Result;
use chrono::SecondsFormat;
use tir_registry::TrustedIssuerRegistry;

use super::registry_config;
use crate::cli::args::GlobalArgs;
use crate::exit_codes;

pub async fn run(global: &GlobalArgs) -> Result<i32> {
    let registry = TrustedIssuerRegistry::new(registry_config(global)?)?;

    match registry.end_of_life().await? {
        Some(at) => println!(
            "Registry version {} reaches end of life at {}",
            TrustedIssuerRegistry::minor_version(),
            at.to_rfc3339_opts(SecondsFormat::Secs, true)
        ),
        None => println!(
            "No end of life announced for registry version {}",
            TrustedIssuerRegistry::minor_version()
        ),
    }
    Ok(exit_codes::SUCCESS)
}
