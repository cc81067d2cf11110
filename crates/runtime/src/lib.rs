//! Async host for the simulation.
//!
//! [`Runtime`] loads content through `realm-content`, runs every area on a
//! background tokio task and exposes a cloneable [`RuntimeHandle`] for clients.
pub mod api;
pub mod config;
pub mod logging;
pub mod runtime;
pub mod workers;
pub mod world;

pub use api::{Result, RuntimeError, RuntimeHandle};
pub use config::RuntimeConfig;
pub use runtime::Runtime;
pub use world::World;
