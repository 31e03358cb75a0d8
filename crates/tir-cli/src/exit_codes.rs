//! Process exit codes.

pub const SUCCESS: i32 = 0;
/// The command ran but the answer is negative (issuer not found, bad signatures).
pub const FAILURE: i32 = 1;
/// Configuration, I/O or upstream error.
pub const ERROR: i32 = 2;
