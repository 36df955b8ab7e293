//! Account storage implementations

mod in_memory;
mod postgres_repository;

pub use in_memory::InMemoryAccountRepository;
pub use postgres_repository::PostgresAccountRepository;
