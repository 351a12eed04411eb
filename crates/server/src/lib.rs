//! HTTP front door for the laptop price estimator
//!
//! The binary loads configuration, option domains and the pipeline once,
//! then serves the estimate function and the probes through [`api`].

pub mod api;
pub mod config;
