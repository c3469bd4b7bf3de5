// src/handlers/mod.rs

pub mod auth;
pub mod catalog;
pub mod dashboard;
pub mod quiz;
pub mod system;
