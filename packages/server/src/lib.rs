//! Read-only query API over the district performance store.

pub mod config;
pub mod server;

pub use config::Config;
pub use server::build_app;
