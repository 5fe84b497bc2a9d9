pub mod feedback;

pub use feedback::create_redis_client;
pub use feedback::FeedbackKey;
pub use feedback::RedisFeedbackStore;
