//! # Innkeeper Library
//!
//! Core of the Innkeeper guest-management service: configuration, database
//! access, the RFID/room stay logic, the checkout scheduler and the HTTP API.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod scheduler;
pub mod server;
pub mod stay;
pub mod telemetry;
pub use migration;

#[cfg(test)]
pub(crate) mod test_support;
