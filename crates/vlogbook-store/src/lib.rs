//! vlogbook-store — Local entry persistence.
//!
//! Implements the `EntryStore` trait with a JSON file on disk and an
//! in-memory map for tests.

pub mod file;
pub mod memory;

pub use file::JsonFileStore;
pub use memory::MemoryStore;
