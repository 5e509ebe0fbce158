pub mod cache;
pub mod client;
pub mod config;
pub mod errors;
pub mod models;
pub mod service;
pub mod web;
