// src/models/mod.rs

pub mod course;
pub mod dashboard;
pub mod enrollment;
pub mod lesson;
pub mod progress;
pub mod question;
pub mod user;
