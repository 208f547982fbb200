//! Library exports for wellstride, shared between the binary and tests.

pub mod auth;
pub mod client;
pub mod config;
pub mod features;
pub mod models;
pub mod startup;
pub mod state;
pub mod store;
pub mod ui;
pub mod utils;
