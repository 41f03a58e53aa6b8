//! Support-ticket analytics over a card board's audit log.

pub mod analytics;
pub mod board;
pub mod cache;
pub mod config;
pub mod dashboard;
pub mod logging;
pub mod report;
