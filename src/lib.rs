// src/lib.rs

pub mod config;
pub mod docs;
pub mod error;
pub mod events;
pub mod handlers;
pub mod models;
pub mod quiz;
pub mod repository;
pub mod routes;
pub mod state;
pub mod stats;
pub mod utils;

pub use routes::create_router;
