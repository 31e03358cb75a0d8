use anyhow::{Context, Result};
use tir_registry::{RegistryConfig, PINNED_ROOT_CERTIFICATE};

use super::args::{Cli, Command, GlobalArgs};

pub mod check;
pub mod deprecate;
pub mod end_of_life;
pub mod lookup;
pub mod sign;
pub mod update;

pub async fn dispatch(cli: Cli) -> Result<i32> {
    let global = cli.global;
    match cli.cmd {
        Command::Lookup(args) => lookup::run(args, &global).await,
        Command::EndOfLife => end_of_life::run(&global).await,
        Command::Update => update::run(&global).await,
        Command::Sign(args) => sign::run(args, &global).await,
        Command::CheckSignatures => check::run(&global).await,
        Command::Deprecate(args) => deprecate::run(args, &global).await,
    }
}

/// Certificate signatures are verified against.
pub(crate) fn verification_certificate(global: &GlobalArgs) -> Result<String> {
    match &global.certificate {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read certificate: {}", path.display())),
        None => Ok(PINNED_ROOT_CERTIFICATE.to_string()),
    }
}

/// Registry client settings from the environment plus global flags.
pub(crate) fn registry_config(global: &GlobalArgs) -> Result<RegistryConfig> {
    let mut config =
        RegistryConfig::from_env().with_pinned_certificate(verification_certificate(global)?);
    if global.test_data {
        config = config.with_test_data(true);
    }
    if global.no_cache {
        config = config.with_cache(false);
    }
    Ok(config)
}
