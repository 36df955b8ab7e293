//! Domain layer - Core business logic and entities

pub mod account;
pub mod error;
pub mod generation;
pub mod identity;
pub mod resilience;
pub mod text;
pub mod tier;
pub mod usage;
pub mod words;

pub use account::{normalize_email, Account, AccountId, AccountRepository};
pub use error::DomainError;
pub use generation::GenerationEngine;
pub use identity::{Identity, IdentityVerifier};
pub use resilience::{
    classify, ConcurrencyGate, FailureClass, GatePermit, ResilientInvoker, RetryPolicy,
    TimeoutGuard,
};
pub use text::{HumanizedText, Page, PageRequest, TextRepository};
pub use tier::{Tier, TierConfig};
pub use usage::{
    Admission, Period, QuotaGuard, QuotaRejection, UsageLedgerEntry, UsageLedgerRepository,
};
pub use words::word_count;
