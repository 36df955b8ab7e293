//! Humanized text history storage

mod in_memory;
mod postgres_repository;

pub use in_memory::InMemoryTextRepository;
pub use postgres_repository::PostgresTextRepository;
