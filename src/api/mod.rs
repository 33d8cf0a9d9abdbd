pub mod auth;
pub mod error;
pub mod extract;
pub mod hooks;
pub mod profiles;
pub mod routes;
pub mod trades;
