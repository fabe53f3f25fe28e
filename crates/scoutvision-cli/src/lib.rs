//! Operator CLI for the ScoutVision token service.
//!
//! The binary loads [`config::AppConfig`] from `scoutvision.toml` and
//! `SCOUTVISION__*` environment variables, builds an
//! [`AuthService`](scoutvision_auth::AuthService) over the configured cache
//! and runs one command against it.

pub mod cli;
pub mod commands;
pub mod config;
pub mod observability;
pub mod output;
