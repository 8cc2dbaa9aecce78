//! Conformance harness for small script entries.
//!
//! An entry is a directory under `entries/` holding exactly one script. The
//! harness checks each entry against a fixed set of rules: a recognized file
//! name, a byte-size ceiling, a ban on loop keywords, a ban on self-recursive
//! functions, and an exact count of a target literal on stdout.
//!
//! - **[`core`]**: Pure text checks (comment stripping, brace scanning, rules,
//!   output counting). No I/O.
//! - **[`io`]**: Configuration, directory scanning and child processes.
//!
//! [`validate`] ties both together into the per-entry pipeline.

pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logging;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
pub mod validate;
