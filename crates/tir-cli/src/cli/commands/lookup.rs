//! `tir lookup` - Resolve an AKI to a verified issuer record.

use anyhow::Result;
use tir_registry::TrustedIssuerRegistry;

use super::registry_config;
use crate::cli::args::{GlobalArgs, LookupArgs};
use crate::exit_codes;

pub async fn run(args: LookupArgs, global: &GlobalArgs) -> Result<i32> {
    let registry = TrustedIssuerRegistry::new(registry_config(global)?)?;

    match registry.lookup(&args.aki).await {
        Some(record) => {
            println!("{}", serde_json::to_string_pretty(&record)?);
            Ok(exit_codes::SUCCESS)
        }
        None => {
            eprintln!("issuer not found: {}", args.aki);
            Ok(exit_codes::FAILURE)
        }
    }
}
