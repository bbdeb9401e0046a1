//! Shared types for the walletlink crates: errors, chain and address
//! primitives, the file-level [`config::Config`], and structured trace events.

pub mod address;
pub mod chain;
pub mod config;
pub mod error;
pub mod trace;

pub use address::Address;
pub use chain::{ChainDescriptor, ChainId};
pub use error::{Error, ErrorKind, Result};
