//! Account entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::tier::Tier;
use crate::domain::DomainError;

const MAX_ACCOUNT_ID_LENGTH: usize = 255;

/// Domain of the placeholder address given to accounts without an email
pub const PLACEHOLDER_EMAIL_DOMAIN: &str = "no-email.local";

/// External identity id of an account
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountId(String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into();

        if id.trim().is_empty() {
            return Err(DomainError::validation("Account ID cannot be empty"));
        }

        if id.len() > MAX_ACCOUNT_ID_LENGTH {
            return Err(DomainError::validation(format!(
                "Account ID cannot exceed {} characters",
                MAX_ACCOUNT_ID_LENGTH
            )));
        }

        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for AccountId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AccountId> for String {
    fn from(id: AccountId) -> Self {
        id.0
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lowercased address when `email` looks like one, otherwise a per-account placeholder
pub fn normalize_email(id: &AccountId, email: Option<&str>) -> String {
    match email.map(str::trim) {
        Some(email) if email.contains('@') => email.to_lowercase(),
        _ => format!("{}@{}", id.as_str(), PLACEHOLDER_EMAIL_DOMAIN),
    }
}

/// A tiered account, created lazily on first use
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    id: AccountId,
    email: String,
    /// Raw persisted tier value; interpreted through [`Tier::clamp`]
    tier: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Account {
    /// New account on the free tier
    pub fn new(id: AccountId, email: impl Into<String>) -> Self {
        let now = Utc::now();

        Self {
            id,
            email: email.into(),
            tier: Tier::Free.as_str().to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Rebuild an account from persisted values
    pub fn restore(
        id: AccountId,
        email: impl Into<String>,
        tier: impl Into<String>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            email: email.into(),
            tier: tier.into(),
            created_at,
            updated_at,
        }
    }

    pub fn with_tier(mut self, tier: Tier) -> Self {
        self.tier = tier.as_str().to_string();
        self
    }

    pub fn id(&self) -> &AccountId {
        &self.id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn raw_tier(&self) -> &str {
        &self.tier
    }

    /// Effective tier; unknown stored values count as free
    pub fn tier(&self) -> Tier {
        Tier::clamp(&self.tier)
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn set_email(&mut self, email: impl Into<String>) {
        self.email = email.into();
        self.touch();
    }

    pub fn set_tier(&mut self, tier: Tier) {
        self.tier = tier.as_str().to_string();
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account_id(id: &str) -> AccountId {
        AccountId::new(id).unwrap()
    }

    #[test]
    fn test_account_id_validation() {
        assert!(AccountId::new("user_2abc").is_ok());
        assert!(AccountId::new("").is_err());
        assert!(AccountId::new("   ").is_err());
        assert!(AccountId::new("a".repeat(256)).is_err());
    }

    #[test]
    fn test_normalize_email() {
        let id = account_id("user-1");

        assert_eq!(normalize_email(&id, Some("Jane@Example.COM")), "jane@example.com");
        assert_eq!(normalize_email(&id, Some("  jane@example.com ")), "jane@example.com");
        assert_eq!(normalize_email(&id, Some("not-an-email")), "user-1@no-email.local");
        assert_eq!(normalize_email(&id, None), "user-1@no-email.local");
    }

    #[test]
    fn test_new_account_defaults_to_free() {
        let account = Account::new(account_id("user-1"), "jane@example.com");

        assert_eq!(account.raw_tier(), "free");
        assert_eq!(account.tier(), Tier::Free);
        assert_eq!(account.created_at(), account.updated_at());
    }

    #[test]
    fn test_unknown_stored_tier_is_clamped() {
        let now = Utc::now();
        let account = Account::restore(account_id("user-1"), "a@b.c", "platinum", now, now);

        assert_eq!(account.raw_tier(), "platinum");
        assert_eq!(account.tier(), Tier::Free);
    }

    #[test]
    fn test_setters_touch_updated_at() {
        let past = Utc::now() - chrono::Duration::days(1);
        let mut account = Account::restore(account_id("user-1"), "old@example.com", "free", past, past);

        account.set_email("new@example.com");
        account.set_tier(Tier::Pro);

        assert_eq!(account.email(), "new@example.com");
        assert_eq!(account.tier(), Tier::Pro);
        assert!(account.updated_at() > past);
        assert_eq!(account.created_at(), past);
    }
}
