// src/lib.rs
pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod seed;
pub mod services;
pub mod state;
pub mod templates;
pub mod views;
pub mod web;
