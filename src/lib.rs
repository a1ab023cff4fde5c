//! stoker-link - StokerCloud pellet boiler client
//!
//! Logs in with an ephemeral token, polls controller data and menu sections
//! concurrently, normalizes the vendor's inconsistent payload shapes and
//! writes control parameters back.

pub mod config;
pub mod error;
pub mod models;
pub mod stoker;
pub mod transport;

pub use crate::config::{Config, StokerConfig};
pub use crate::error::ClientError;
pub use crate::models::{NormalizedSection, Snapshot, WriteTarget};
pub use crate::stoker::StokerClient;
pub use crate::transport::{HttpReply, HttpTransport, ReqwestTransport};
