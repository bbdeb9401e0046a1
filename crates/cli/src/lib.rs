//! Operator tooling for walletlink configurations.

pub mod cli;
