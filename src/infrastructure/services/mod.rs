//! Infrastructure services

mod account_service;
mod humanize_service;

pub use account_service::{AccountService, UsageSummary};
pub use humanize_service::{HumanizeOutcome, HumanizeService};
