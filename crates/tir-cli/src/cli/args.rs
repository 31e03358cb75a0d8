use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "tir",
    version,
    about = "Trusted issuer registry: verified AKI lookups and registry publishing"
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Registry project root (holds issuers/ and test/issuers/)
    #[arg(long, global = true, env = "TIR_ROOT", default_value = ".")]
    pub root: PathBuf,

    /// Read the registry's test data set
    #[arg(long, global = true)]
    pub test_data: bool,

    /// Disable the lookup cache
    #[arg(long, global = true)]
    pub no_cache: bool,

    /// PEM certificate to verify signatures with (default: pinned root)
    #[arg(long, global = true, env = "TIR_CERTIFICATE")]
    pub certificate: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve an AKI to its verified issuer record
    Lookup(LookupArgs),
    /// Show the announced end of life for this registry version
    EndOfLife,
    /// Fetch the trust lists and reconcile issuers/x509_aki
    Update,
    /// Sign issuer records whose signature is missing or stale
    Sign(SignArgs),
    /// Verify the signature of every issuer record
    CheckSignatures,
    /// Write deprecation_notice.json for this minor version
    Deprecate(DeprecateArgs),
}

#[derive(Args, Debug)]
pub struct LookupArgs {
    /// Base64url AKI (no padding)
    pub aki: String,
}

#[derive(Args, Debug)]
pub struct SignArgs {
    /// EC private key file (SEC1 PEM, P-256 or P-384)
    #[arg(long, short)]
    pub key: PathBuf,
}

#[derive(Args, Debug)]
pub struct DeprecateArgs {
    /// End-of-life date, YYYY-MM-DD (UTC)
    pub date: String,
}
