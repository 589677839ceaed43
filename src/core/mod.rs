pub mod aggregator;
pub mod config;
pub mod error;
pub mod formatter;
pub mod job;
pub mod models;
pub mod period;
pub mod services;
