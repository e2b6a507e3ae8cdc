//! Verification utilities for copyable footprints
//!
//! This crate checks the footprints computed by `copyable-footprints` against
//! independent reference oracles and, when a GPU is available, against the
//! copies a real device accepts.

pub mod compare;
pub mod device_validator;
pub mod fixture_oracle;
pub mod manifest;
mod oracle;
pub mod wgpu_helpers;
pub mod wgpu_oracle;

pub use oracle::{OracleError, ReferenceOracle};
