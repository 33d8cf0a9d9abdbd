pub mod profile;
pub mod subject;
pub mod trade;
