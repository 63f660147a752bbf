//! Wire types and configuration shared by the building-management API
//! client and anything that speaks the same backend protocol.

pub mod config;
pub mod types;

pub use self::config::load_config;
