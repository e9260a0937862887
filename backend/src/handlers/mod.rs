// src/handlers/mod.rs

pub mod analytics;
pub mod exam;
pub mod results;
pub mod student;
