// src/lib.rs

pub mod api;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod models;
pub mod session;
pub mod utils;

// Re-export specific items for convenience if needed
pub use dashboard::SkillsDashboard;
pub use error::AppError;
