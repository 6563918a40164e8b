//! Shared checker runtime services.

pub mod cancel;
pub mod config;
pub mod error;
pub mod logging;
pub mod paths;
