//! Configuration and collaborator models.
pub mod auth;
pub mod config;
