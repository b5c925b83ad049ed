// Library exports for hoopboard
// This allows integration tests and the binary to share the modules

pub mod config;
pub mod db;
pub mod error;
pub mod import;
pub mod routes;
pub mod state;
