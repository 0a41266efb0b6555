//! Reference implementations of the catalog collaborators.
pub mod in_memory;

pub use in_memory::InMemoryCatalog;
