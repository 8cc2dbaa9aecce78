//! Deterministic, pure logic behind the conformance checks.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! text and return deterministic outputs suitable for tests.

pub mod output;
pub mod rules;
pub mod source;
pub mod types;
