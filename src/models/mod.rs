// src/models/mod.rs
pub mod academics;
pub mod accounts;
pub mod fitness;
pub mod hr;
pub mod locations;
pub mod statistics;
