//! Configuration and the shared record model.

pub mod config;
pub mod models;
