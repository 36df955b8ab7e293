//! Account domain

mod entity;
mod repository;

pub use entity::{normalize_email, Account, AccountId, PLACEHOLDER_EMAIL_DOMAIN};
pub use repository::AccountRepository;

#[cfg(test)]
pub use repository::mock::MockAccountRepository;
