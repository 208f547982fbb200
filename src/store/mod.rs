pub mod base;
pub mod file_store;
pub mod memory_store;
pub mod session;

// Re-export the primary Store items so code outside can do
// "use crate::store::{SessionStore, create_storage};"
pub use base::{create_storage, Storage, StoreError};
pub use file_store::FileStorage;
pub use memory_store::MemoryStorage;
pub use session::SessionStore;
