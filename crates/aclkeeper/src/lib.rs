#![warn(
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub,
    clippy::pedantic
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![forbid(unsafe_code)]

mod config;

pub mod api;
pub mod implementations;
pub mod server;
pub mod service;

pub use config::{CONFIG, DynAppConfig, IdentifierConfig, RevokeConfig};
pub use service::{
    authz::{AccessControl, Privilege, PrivilegeSet},
    metadata::Metadata,
    transaction::TransactionManager,
};

pub use async_trait;
pub use tracing;

#[cfg(any(test, feature = "test-utils"))]
pub mod tests;
