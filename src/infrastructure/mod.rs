//! Infrastructure layer - External service implementations

pub mod account;
pub mod auth;
pub mod generation;
pub mod logging;
pub mod observability;
pub mod services;
pub mod storage;
pub mod text;
pub mod usage;
