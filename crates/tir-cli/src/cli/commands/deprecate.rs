//! `tir deprecate` - Announce the end of life of this registry version.

use anyhow::Result;
use tir_publish::add_deprecation_notice;

use crate::cli::args::{DeprecateArgs, GlobalArgs};
use crate::exit_codes;

pub async fn run(args: DeprecateArgs, global: &GlobalArgs) -> Result<i32> {
    let (path, notice) = add_deprecation_notice(&global.root, &args.date).await?;

    println!("Deprecation file created successfully!");
    println!("File: {}", path.display());
    println!("Date: {} (UTC)", args.date.trim());
    println!("Epoch time: {}", notice.end_of_life);
    Ok(exit_codes::SUCCESS)
}
