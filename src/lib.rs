pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod recommend;
pub mod storage;
pub mod store;
pub mod sync;

pub use config::Config;
pub use error::{AppError, ValidationError};
pub use models::{Furnishing, Notification, Property, PropertyDraft, PropertyType, Role, User};
pub use recommend::FilterCriteria;
pub use storage::{FileStorage, MemoryBackend, MemoryStorage, StorageProvider};
pub use store::SharedState;
pub use sync::RentalApp;
