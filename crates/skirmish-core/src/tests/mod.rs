//! Crate-level tests.
//!
//! - `determinism.rs`: seeded fights replay exactly
//! - `integration.rs`: whole fights through [`crate::fight::Fight`]
//! - `properties.rs`: invariants checked over many inputs
//! - `helpers.rs`: shared fixtures

mod determinism;
pub(crate) mod helpers;
mod integration;
