//! Humanized text history domain

mod entity;
mod repository;

pub use entity::{HumanizedText, Page, PageRequest};
pub use repository::TextRepository;

#[cfg(test)]
pub use repository::mock::MockTextRepository;
