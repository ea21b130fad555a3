// src/services/mod.rs

pub mod assembly;
pub mod generator;
pub mod session_store;
