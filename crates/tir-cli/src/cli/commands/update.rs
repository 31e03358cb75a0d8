//! `tir update` - Refresh issuer records from the external trust lists.

use anyhow::Result;
use tir_publish::{update_issuers, PublishConfig, X509Inspector};

use crate::cli::args::GlobalArgs;
use crate::exit_codes;

pub async fn run(global: &GlobalArgs) -> Result<i32> {
    let config = PublishConfig::from_env().with_root(global.root.clone());
    let report = update_issuers(&config, &X509Inspector).await?;

    for (source, stats) in &report.sources {
        println!(
            "{source}: ingested {} certificate(s), {} without CRL",
            stats.ingested, stats.missing_crl
        );
    }
    println!("Total issuers collected from sources: {}", report.issuers);

    let summary = report.reconcile;
    if summary.is_unchanged() {
        println!("No changes made to issuer files");
    } else {
        println!(
            "Deleted {}, created {}, updated {} issuer file(s)",
            summary.deleted, summary.created, summary.updated
        );
    }
    Ok(exit_codes::SUCCESS)
}
