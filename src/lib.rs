// src/lib.rs
pub mod api;
pub mod config;
pub mod engine;
pub mod signal;
pub mod types;
