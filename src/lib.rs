//! # oVirt Flex Driver Client Library
//!
//! Authenticates against the oVirt engine REST API, caches the access token
//! for its declared lifetime, and attaches disks to hosts on behalf of a
//! storage orchestrator.
//!
//! Modules:
//! - `session`: connection + request client + cached token aggregate
//! - `auth`: token reuse/refresh and the SSO token exchange
//! - `attach`: disk attachment request and response mapping
//! - `config`: YAML driver configuration, defaults and validation
//! - `parser`: lenient number/bool field parsing for engine payloads

pub mod attach;
pub mod auth;
pub mod cache;
pub mod config;
pub mod error;
pub mod observability;
pub mod parser;
pub mod session;
pub mod transport;
pub mod utils;

#[cfg(test)]
pub mod tests;


pub use crate::attach::types::{AttachRequest, AttachResponse, Status};
pub use crate::cache::token::Token;
pub use crate::config::connection::{Connection, DriverConfig};
pub use crate::error::{ClientError, Result};
pub use crate::session::Session;
