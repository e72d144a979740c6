// Service exports
pub mod appwrite;
pub mod cache;
pub mod emitter;
pub mod postgres;

pub use appwrite::{AppwriteClient, AppwriteCollections, AppwriteError, DocumentSet};
pub use cache::{CacheManager, CacheKey, CacheError};
pub use emitter::{MatchEmitter, MatchAnchor, EmitReport, notification_message};
pub use postgres::{PostgresClient, PostgresError};
