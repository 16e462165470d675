//! Daemon library surface
//!
//! The orchestrator is exposed as a library so integration tests can drive
//! single control cycles without a running binary.

pub mod monitor;
