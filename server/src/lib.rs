//! Local viewer server for captured LLM traffic

pub mod api;
pub mod app;
pub mod core;
pub mod data;
pub mod utils;
