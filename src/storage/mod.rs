pub mod file;
pub mod memory;
pub mod traits;

pub use file::FileStorage;
pub use memory::{MemoryBackend, MemoryStorage};
pub use traits::{ContextId, ExternalChanges, StorageEvent, StorageProvider};
