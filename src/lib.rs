pub mod api;
pub mod config;
pub mod error;
pub mod hooks;
pub mod logging;
pub mod persistence;
pub mod policy;
pub mod store;
pub mod types;
pub mod validation;
