pub mod api;
pub mod assembly;
pub mod config;
pub mod screens;
pub mod service;
pub mod tmdb;
