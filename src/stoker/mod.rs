//! StokerCloud integration module
//!
//! - `value`: raw reading codec
//! - `schema`: section shape normalization
//! - `session`: token lifecycle
//! - `sections`: controller payload and concurrent menu aggregation
//! - `write`: parameter write resolution and confirmation
//! - `client`: façade tying the above together

pub mod client;
pub mod schema;
pub mod sections;
pub mod session;
pub mod value;
pub mod write;

pub use client::StokerClient;
pub use session::WriteAuth;
