// src/quiz/mod.rs

pub mod controller;
pub mod notice;
pub mod registry;
pub mod score;
pub mod service;
pub mod session;
pub mod ticker;

pub use controller::{Persistence, QuizController, SessionContext, SessionView};
pub use registry::SessionRegistry;
pub use service::{QuizOpen, QuizService};
pub use session::{Phase, QuizSession, SessionError};
