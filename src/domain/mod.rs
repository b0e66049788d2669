//! Core domain types and logic.

pub mod error;
pub mod price_series;
pub mod stats;
pub mod cash_flow;
pub mod strategy;
pub mod accumulator;
pub mod metrics;
pub mod analysis;
pub mod portfolio;
pub mod config_validation;
