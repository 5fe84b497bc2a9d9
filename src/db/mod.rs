pub mod feedback;
pub mod memory;
pub mod redis;

pub use feedback::FeedbackStore;
pub use memory::InMemoryFeedbackStore;
pub use self::redis::{create_redis_client, RedisFeedbackStore};
