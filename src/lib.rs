//! VALUEBET — Monte Carlo value-bet detector
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod config;
pub mod types;
pub mod odds;
pub mod simulator;
pub mod strategy;
pub mod data;
pub mod engine;
