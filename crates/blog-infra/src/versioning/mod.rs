//! Snapshot stores. The SQL store lives in [`crate::database`].

mod memory;

pub use memory::InMemoryVersionRepository;
