//! Usage domain: ledger entries, accounting periods and quota checks

mod entry;
mod period;
mod quota;
mod repository;

pub use entry::UsageLedgerEntry;
pub use period::{offset_from_minutes, Period};
pub use quota::{Admission, QuotaGuard, QuotaRejection};
pub use repository::UsageLedgerRepository;

#[cfg(test)]
pub use repository::mock::MockUsageLedgerRepository;
