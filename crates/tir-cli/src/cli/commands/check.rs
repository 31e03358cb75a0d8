//! `tir check-signatures` - Validate every issuer record on disk.

use anyhow::Result;
use tir_publish::config::signed_roots;
use tir_publish::{check_signatures, PublishError};

use super::verification_certificate;
use crate::cli::args::GlobalArgs;
use crate::exit_codes;

pub async fn run(global: &GlobalArgs) -> Result<i32> {
    let certificate = verification_certificate(global)?;

    match check_signatures(&signed_roots(&global.root), &certificate).await {
        Ok(summary) => {
            println!(
                "Signature validation passed: {} valid files checked.",
                summary.valid
            );
            Ok(exit_codes::SUCCESS)
        }
        Err(PublishError::InvalidSignatures { failures }) => {
            eprintln!("Signature validation failed for the following files:");
            for failure in &failures {
                eprintln!("   {}: {}", failure.path.display(), failure.reason);
            }
            eprintln!("{} files have invalid signatures", failures.len());
            Ok(exit_codes::FAILURE)
        }
        Err(e) => Err(e.into()),
    }
}
