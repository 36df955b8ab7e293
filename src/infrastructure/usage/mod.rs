//! Usage ledger storage and the request-path writer

mod in_memory;
mod postgres_repository;
mod recorder;

pub use in_memory::InMemoryUsageLedgerRepository;
pub use postgres_repository::PostgresUsageLedgerRepository;
pub use recorder::UsageRecorder;
