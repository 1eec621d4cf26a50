//! Domain services and repository traits for fleet management

pub mod repository;
pub mod service;
