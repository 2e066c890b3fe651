//! Operator workflows: deploy, invoke and clean up a runtime.
//!
//! Each workflow is a fixed, sequential series of service calls. They take
//! the service traits from [`crate::cloud`] and return reports; the binaries
//! print them.

pub mod cleanup;
pub mod deploy;
pub mod invoke;
