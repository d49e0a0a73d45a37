pub mod app;
pub mod arc;
pub mod config;
pub mod events;
pub mod glow;
pub mod ray;
pub mod sys;
