//! `tir sign` - Sign issuer records with the registry key.

use anyhow::{Context, Result};
use tir_publish::config::signed_roots;
use tir_publish::{sign_issuers, RecordSigningKey};

use super::verification_certificate;
use crate::cli::args::{GlobalArgs, SignArgs};
use crate::exit_codes;

pub async fn run(args: SignArgs, global: &GlobalArgs) -> Result<i32> {
    let key_pem = std::fs::read_to_string(&args.key)
        .with_context(|| format!("failed to read key file: {}", args.key.display()))?;
    let key = RecordSigningKey::from_sec1_pem(&key_pem)?;
    let certificate = verification_certificate(global)?;

    let summary = sign_issuers(&signed_roots(&global.root), &key, &certificate).await?;

    println!(
        "Signing complete! Processed {} of {} files, {} newly signed.",
        summary.processed, summary.total, summary.signed
    );
    Ok(exit_codes::SUCCESS)
}
