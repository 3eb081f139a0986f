pub mod alerts;
pub mod cache;
pub mod clients;
pub mod config;
pub mod errors;
pub mod rate_limit;
pub mod routes;
pub mod state;
pub mod stores;
