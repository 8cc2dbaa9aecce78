//! Stable exit codes for `conform` commands.

/// Every selected entry passed (or the command has nothing to report).
pub const OK: i32 = 0;
/// Invalid configuration, unknown entry selector, or another usage error.
pub const INVALID: i32 = 1;
/// `conform check` found at least one entry violating a rule.
pub const FAILED: i32 = 2;
