// src/services/mod.rs
pub mod academics_service;
pub mod account_service;
pub mod auth_service;
pub mod crud;
pub mod fitness_service;
pub mod hr_service;
pub mod location_service;
pub mod statistics_service;
