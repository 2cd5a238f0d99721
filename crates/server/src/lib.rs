//! Price Server - HTTP front end for the laptop price pipeline

pub mod api;
pub mod config;
